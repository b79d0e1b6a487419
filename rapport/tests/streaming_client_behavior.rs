#![cfg(feature = "backend-ollama")]

use std::time::Duration;

use futures_util::StreamExt;
use rapport::rprovider::ChatRequest;
use rapport::{GatewayConfig, Message, Role, build_backends};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Streams NDJSON lines from a loopback port, waiting `gap` before each one.
async fn slow_ollama(lines: Vec<String>, gap: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("loopback bind should succeed");
    let address = listener.local_addr().expect("local address");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept should succeed");
        let mut received = Vec::new();
        let mut buffer = [0_u8; 4096];
        while !received.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = socket.read(&mut buffer).await.expect("request read");
            if read == 0 {
                return;
            }
            received.extend_from_slice(&buffer[..read]);
        }

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\n\
                  transfer-encoding: chunked\r\nconnection: close\r\n\r\n",
            )
            .await
            .expect("headers");
        for line in lines {
            tokio::time::sleep(gap).await;
            let chunk = format!("{line}\n");
            let framed = format!("{:x}\r\n{chunk}\r\n", chunk.len());
            if socket.write_all(framed.as_bytes()).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
        }
        let _ = socket.write_all(b"0\r\n\r\n").await;
        let _ = socket.shutdown().await;
    });

    format!("http://{address}")
}

fn fragment(text: &str, done: bool) -> String {
    format!(r#"{{"message":{{"role":"assistant","content":"{text}"}},"done":{done}}}"#)
}

fn request() -> ChatRequest {
    ChatRequest::new("llama3:latest", vec![Message::new(Role::User, "Count")])
}

#[tokio::test]
async fn generations_may_outlast_the_configured_timeout_while_data_flows() {
    let lines = vec![
        fragment("t0 ", false),
        fragment("t1 ", false),
        fragment("t2 ", false),
        fragment("t3", false),
        fragment("", true),
    ];
    let host = slow_ollama(lines, Duration::from_millis(400)).await;
    let config = GatewayConfig::new()
        .with_ollama_host(host)
        .with_timeout(Duration::from_secs(1));
    let backends = build_backends(&config).expect("backends should build");

    let mut stream = backends[0].chat(request()).await.expect("chat should start");
    let mut output = String::new();
    while let Some(fragment) = stream.next().await {
        output.push_str(&fragment.expect("slow but steady stream must not time out"));
    }

    assert_eq!(output, "t0 t1 t2 t3");
}

#[tokio::test]
async fn a_stalled_stream_still_fails() {
    let lines = vec![fragment("first", false), fragment("late", false)];
    let host = slow_ollama(lines, Duration::from_millis(1500)).await;
    let config = GatewayConfig::new()
        .with_ollama_host(host)
        .with_timeout(Duration::from_millis(300));
    let backends = build_backends(&config).expect("backends should build");

    let outcome = match backends[0].chat(request()).await {
        Err(error) => Err(error),
        Ok(mut stream) => loop {
            match stream.next().await {
                Some(Ok(_)) => continue,
                Some(Err(error)) => break Err(error),
                None => break Ok(()),
            }
        },
    };

    assert!(outcome.is_err(), "an idle stream must hit the read timeout");
}
