//! Single-attempt network probes with a bounded deadline.

use anyhow::Result;
use std::time::Duration;
use tracing::debug;

use super::types::Outcome;
use crate::models::{Check, HttpMethod};

/// Issues one outbound request per check and classifies the result.
///
/// The client carries no timeout of its own; every probe sets a per-request
/// deadline from the check's `timeout_seconds`. reqwest resolves each request
/// to exactly one terminal event, so a late response after the deadline is
/// already discarded. Redirects are never followed: a probe is a single
/// request, and a 3xx is itself the response code the check is judged on.
pub struct ProbeEngine {
    client: reqwest::Client,
}

impl ProbeEngine {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Probe a check once. Never fails: every transport condition maps to an
    /// [`Outcome`].
    pub async fn probe(&self, check: &Check) -> Outcome {
        let method = match check.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let deadline = Duration::from_millis(check.timeout_seconds * 1000);

        let request = self.client.request(method, check.target()).timeout(deadline);

        match request.send().await {
            Ok(response) => Outcome::response(response.status().as_u16()),
            Err(e) if e.is_timeout() => Outcome::timeout(),
            Err(e) => {
                debug!(check = %check.id, error = %e, "probe transport failure");
                Outcome::network_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckState, Protocol};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn check_for(url: String, timeout_seconds: u64) -> Check {
        Check {
            id: "a".repeat(20),
            user_phone: "5551234567".to_string(),
            protocol: Protocol::Http,
            url,
            method: HttpMethod::Get,
            success_codes: vec![200],
            timeout_seconds,
            state: CheckState::Down,
            last_checked: None,
        }
    }

    /// Bind a local listener that answers one request with the given status
    /// line and returns its host:port.
    async fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response =
                    format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("127.0.0.1:{}", addr.port())
    }

    #[tokio::test]
    async fn response_outcome_carries_the_status_code() {
        let engine = ProbeEngine::new().unwrap();

        let addr = serve_once("200 OK").await;
        let outcome = engine.probe(&check_for(addr, 2)).await;
        assert_eq!(outcome, Outcome::response(200));

        let addr = serve_once("503 Service Unavailable").await;
        let outcome = engine.probe(&check_for(addr, 2)).await;
        assert_eq!(outcome, Outcome::response(503));
    }

    #[tokio::test]
    async fn redirect_is_reported_as_its_own_status_not_followed() {
        let engine = ProbeEngine::new().unwrap();

        // A 200-answering target the redirect points at; the probe must never
        // reach it.
        let target = serve_once("200 OK").await;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 301 Moved Permanently\r\nlocation: http://{target}/\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        let outcome = engine.probe(&check_for(addr, 2)).await;
        assert_eq!(outcome, Outcome::response(301));
    }

    #[tokio::test]
    async fn refused_connection_classifies_as_network_error() {
        let engine = ProbeEngine::new().unwrap();

        // Grab a free port, then close the listener before probing it.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
        drop(listener);

        let outcome = engine.probe(&check_for(addr, 2)).await;
        assert_eq!(outcome, Outcome::network_error());
    }

    #[tokio::test]
    async fn stalled_server_classifies_as_timeout() {
        let engine = ProbeEngine::new().unwrap();

        // Accept the connection but never respond.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            }
        });

        let outcome = engine.probe(&check_for(addr, 1)).await;
        assert_eq!(outcome, Outcome::timeout());
    }
}
