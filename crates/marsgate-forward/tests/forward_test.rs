//! Forwarder tests against a minimal local HTTP endpoint.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use marsgate_core::AggregateRecord;
use marsgate_forward::{ForwardError, Forwarder};

fn record() -> AggregateRecord {
    AggregateRecord {
        temperature: 25.0,
        radiation: 6,
        solar_flare: false,
    }
}

/// Serve exactly one request with the given status line, returning the
/// raw request text through the channel.
async fn one_shot_controller(status_line: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        // Read until the body is complete (headers + declared length).
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text
                    .lines()
                    .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(str::trim).map(str::to_owned))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= split + 4 + content_length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });

    (format!("http://{addr}/api/readings"), rx)
}

#[tokio::test]
async fn accepted_on_200_with_auth_header_and_body() {
    let (url, rx) = one_shot_controller("HTTP/1.1 200 OK").await;
    let forwarder = Forwarder::new(url, "hunter2".into()).unwrap();

    forwarder.forward(&record()).await.expect("200 is accepted");

    let request = rx.await.unwrap();
    assert!(request.starts_with("POST /api/readings"));
    assert!(request.to_ascii_lowercase().contains("x-auth-token: hunter2"));
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let sent: AggregateRecord = serde_json::from_str(body).unwrap();
    assert_eq!(sent, record());
}

#[tokio::test]
async fn rejected_on_400() {
    let (url, _rx) = one_shot_controller("HTTP/1.1 400 Bad Request").await;
    let forwarder = Forwarder::new(url, "hunter2".into()).unwrap();

    let err = forwarder.forward(&record()).await.unwrap_err();
    assert!(matches!(err, ForwardError::Rejected));
}

#[tokio::test]
async fn unknown_failure_on_other_status() {
    let (url, _rx) = one_shot_controller("HTTP/1.1 503 Service Unavailable").await;
    let forwarder = Forwarder::new(url, "hunter2".into()).unwrap();

    let err = forwarder.forward(&record()).await.unwrap_err();
    match err {
        ForwardError::UnknownStatus(status) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected unknown status, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_on_refused_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let forwarder = Forwarder::new(format!("http://{addr}/api/readings"), "hunter2".into()).unwrap();
    let err = forwarder.forward(&record()).await.unwrap_err();
    assert!(matches!(err, ForwardError::Transport(_)));
}

#[tokio::test]
async fn failed_forward_does_not_poison_the_next_attempt() {
    let (bad_url, _rx) = one_shot_controller("HTTP/1.1 400 Bad Request").await;
    let forwarder = Forwarder::new(bad_url, "hunter2".into()).unwrap();
    assert!(forwarder.forward(&record()).await.is_err());

    // A fresh aggregate on a healthy endpoint goes through untouched.
    let (good_url, _rx) = one_shot_controller("HTTP/1.1 200 OK").await;
    let forwarder = Forwarder::new(good_url, "hunter2".into()).unwrap();
    forwarder.forward(&record()).await.expect("next cycle succeeds");
}
