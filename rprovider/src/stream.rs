//! Fragment stream contracts and in-memory stream utilities.
//!
//! ```rust
//! use rprovider::{FragmentStream, VecFragmentStream};
//!
//! let stream = VecFragmentStream::new(vec![Ok("hello".into())]);
//! let _boxed: FragmentStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{Message, ProviderError, Role};

/// Backend fragment stream contract.
///
/// Invariants for consumers:
/// - Fragments are emitted in upstream arrival order.
/// - An `Err` item ends the stream; no further items follow it.
/// - Once the stream yields `None`, it must not yield additional items.
pub type FragmentStream<'a> =
    Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send + 'a>>;

/// One normalized unit of gateway output, shaped `{message: {content}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatChunk {
    pub message: Message,
}

impl ChatChunk {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message: Message::new(Role::Assistant, content),
        }
    }

    pub fn content(&self) -> &str {
        &self.message.content
    }

    pub fn into_content(self) -> String {
        self.message.content
    }
}

pub type ChatChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ChatChunk, ProviderError>> + Send + 'a>>;

#[derive(Debug)]
pub struct VecFragmentStream {
    fragments: VecDeque<Result<String, ProviderError>>,
}

impl VecFragmentStream {
    pub fn new(fragments: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            fragments: fragments.into(),
        }
    }
}

impl Stream for VecFragmentStream {
    type Item = Result<String, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<String, ProviderError>>> {
        Poll::Ready(self.fragments.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn vec_fragment_stream_yields_fragments_in_order() {
        let mut stream = VecFragmentStream::new(vec![Ok("one".into()), Ok("two".into())]);

        assert_eq!(stream.next().await, Some(Ok("one".to_string())));
        assert_eq!(stream.next().await, Some(Ok("two".to_string())));
        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn chat_chunk_exposes_assistant_content() {
        let chunk = ChatChunk::new("partial");

        assert_eq!(chunk.message.role, Role::Assistant);
        assert_eq!(chunk.content(), "partial");
        assert_eq!(chunk.into_content(), "partial");
    }
}
