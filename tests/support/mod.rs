//! Shared helpers for integration tests: a recording observer, a relay
//! config pointed at a mock server, canned Drime API mocks, and a raw HTTP
//! responder for framings wiremock cannot produce.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use relay_core::{ApiToken, RelayConfig, RelayEvent, RelayObserver, TransferProgress};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

/// Collects every event a run emits.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RelayEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<RelayEvent> {
        self.events.lock().expect("observer lock poisoned").clone()
    }

    pub fn progress(&self) -> Vec<TransferProgress> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RelayEvent::Progress(progress) => Some(progress),
                _ => None,
            })
            .collect()
    }
}

impl RelayObserver for RecordingObserver {
    fn notify(&self, event: &RelayEvent) {
        self.events
            .lock()
            .expect("observer lock poisoned")
            .push(event.clone());
    }
}

/// Config whose API base lives on `server` and whose staging dirs go under `staging`.
pub fn test_config(server: &MockServer, staging: &Path) -> RelayConfig {
    RelayConfig::new(ApiToken::new(TEST_TOKEN).expect("non-blank token"))
        .with_api_base(format!("{}/api/v1", server.uri()))
        .with_staging_root(staging)
}

/// Serves `body` for GET `route`.
pub async fn mount_source(server: &MockServer, route: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Accepts any upload and answers with `entry_id`.
pub async fn mount_upload_success(server: &MockServer, entry_id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/uploads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "fileEntry": { "id": entry_id, "name": "ignored" }
        })))
        .mount(server)
        .await;
}

/// Answers the share-link call for `entry_id` with `share_url`.
pub async fn mount_share_link(server: &MockServer, entry_id: &str, share_url: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/file-entries/{entry_id}/shareable-link")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": share_url })))
        .mount(server)
        .await;
}

/// Number of entries left under a staging root.
pub fn staging_entries(staging: &Path) -> usize {
    std::fs::read_dir(staging)
        .expect("staging root should exist")
        .count()
}

/// Answers every connection with `head`, followed by `body` for GET
/// requests. Returns the URL of `route` on the listener.
async fn serve_raw(route: &str, head: String, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let head = head.clone();
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0_u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let mut response = head.into_bytes();
                if request.starts_with(b"GET") {
                    response.extend_from_slice(&body);
                }
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}{route}")
}

/// Chunked transfer encoding, no `Content-Length`.
pub async fn serve_chunked(route: &str, body: Vec<u8>) -> String {
    let mut encoded = Vec::new();
    for piece in body.chunks(3000) {
        encoded.extend_from_slice(format!("{:x}\r\n", piece.len()).as_bytes());
        encoded.extend_from_slice(piece);
        encoded.extend_from_slice(b"\r\n");
    }
    encoded.extend_from_slice(b"0\r\n\r\n");
    let head =
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n".to_string();
    serve_raw(route, head, encoded).await
}

/// Declares `declared` bytes but sends only `body` before closing.
pub async fn serve_truncated(route: &str, declared: u64, body: Vec<u8>) -> String {
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n"
    );
    serve_raw(route, head, body).await
}
