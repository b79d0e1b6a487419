#[cfg(feature = "backend-anthropic")]
pub mod anthropic;

#[cfg(feature = "backend-ollama")]
pub mod ollama;

#[cfg(any(feature = "backend-anthropic", feature = "backend-ollama"))]
pub(crate) mod http {
    //! Error mapping shared by the reqwest transports.

    use reqwest::StatusCode;

    use crate::ProviderError;

    pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::timeout(err.to_string())
        } else if err.is_connect() {
            ProviderError::unavailable(err.to_string())
        } else {
            ProviderError::transport(err.to_string())
        }
    }

    pub(crate) fn classify_status(status: StatusCode, message: String) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::NOT_FOUND => ProviderError::not_found(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }

    /// Drains complete `\n`-terminated lines from `buffer`, trimmed.
    ///
    /// Splitting happens on raw bytes, so a multibyte character cut across
    /// two network chunks stays in the buffer until its line is complete.
    pub(crate) fn drain_lines(buffer: &mut Vec<u8>) -> Result<Vec<String>, ProviderError> {
        let mut lines = Vec::new();
        while let Some(newline_index) = buffer.iter().position(|byte| *byte == b'\n') {
            let line = buffer.drain(..=newline_index).collect::<Vec<u8>>();
            let line = decode_line(&line)?;
            if !line.is_empty() {
                lines.push(line);
            }
        }

        Ok(lines)
    }

    pub(crate) fn decode_line(bytes: &[u8]) -> Result<String, ProviderError> {
        std::str::from_utf8(bytes)
            .map(|text| text.trim().to_string())
            .map_err(|err| ProviderError::transport(err.to_string()))
    }

}
