//! Remote quote source over HTTP.
//!
//! The remote is an opaque collaborator: `GET` yields a JSON array of
//! title-bearing records, `POST` accepts one quote and its answer is ignored.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::domain::{AppError, QuoteRecord, RemoteConfig, RemotePost, Result, SyncError};

/// Source of remote records and sink for pushed quotes.
pub trait RemoteSource: Send + Sync {
    /// Fetch the full remote list.
    fn fetch(&self) -> impl Future<Output = std::result::Result<Vec<RemotePost>, SyncError>> + Send;

    /// Submit one local quote. The response body is not inspected.
    fn push(
        &self,
        quote: &QuoteRecord,
    ) -> impl Future<Output = std::result::Result<(), SyncError>> + Send;
}

/// `RemoteSource` backed by a JSON HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    url: String,
}

impl HttpRemote {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Endpoint this client talks to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn network_error(err: &reqwest::Error) -> SyncError {
    SyncError::Network(err.to_string())
}

impl RemoteSource for HttpRemote {
    async fn fetch(&self) -> std::result::Result<Vec<RemotePost>, SyncError> {
        tracing::debug!(url = %self.url, "Fetching remote quotes");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| network_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| network_error(&e))?;

        serde_json::from_str(&body).map_err(|e| SyncError::Malformed(e.to_string()))
    }

    async fn push(&self, quote: &QuoteRecord) -> std::result::Result<(), SyncError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .json(quote)
            .send()
            .await
            .map_err(|e| network_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        tracing::debug!(id = quote.id, status = status.as_u16(), "Pushed quote");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Accept one connection, answer with `status` and `body`, return the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (HttpRemote, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = RemoteConfig {
            url: format!("http://{}/posts", listener.local_addr().unwrap()),
            timeout_secs: 5,
            ..Default::default()
        };

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (HttpRemote::new(&config).unwrap(), server)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        line.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_new_uses_configured_url() {
        let config = RemoteConfig {
            url: "http://127.0.0.1:9/posts".into(),
            ..Default::default()
        };
        let remote = HttpRemote::new(&config).unwrap();
        assert_eq!(remote.url(), "http://127.0.0.1:9/posts");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_network_error() {
        // Port 9 (discard) is not listening on loopback in test environments
        let config = RemoteConfig {
            url: "http://127.0.0.1:9/posts".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let remote = HttpRemote::new(&config).unwrap();

        let result = remote.fetch().await;
        assert!(matches!(result, Err(SyncError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_status() {
        let (remote, server) = serve_once("503 Service Unavailable", "").await;

        assert_eq!(remote.fetch().await.unwrap_err(), SyncError::Status(503));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_non_array_is_malformed() {
        let (remote, server) = serve_once("200 OK", r#"{"not":"array"}"#).await;

        assert!(matches!(remote.fetch().await, Err(SyncError::Malformed(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_without_title_is_malformed() {
        let (remote, server) = serve_once("200 OK", r#"[{"id":1}]"#).await;

        assert!(matches!(remote.fetch().await, Err(SyncError::Malformed(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_parses_posts_and_ignores_extra_fields() {
        let (remote, server) = serve_once(
            "200 OK",
            r#"[{"userId":1,"id":1,"title":"Hello","body":"x"},{"id":2,"title":"World"}]"#,
        )
        .await;

        let posts = remote.fetch().await.unwrap();
        assert_eq!(
            posts.iter().map(|p| (p.id, p.title.as_str())).collect::<Vec<_>>(),
            vec![(1, "Hello"), (2, "World")]
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /posts "));
    }

    #[tokio::test]
    async fn test_push_posts_quote_as_json() {
        let (remote, server) = serve_once("201 Created", r#"{"id":101}"#).await;
        let quote = QuoteRecord::new(7, "Ship it", "Work").unwrap();

        remote.push(&quote).await.unwrap();

        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /posts "));
        assert!(lower.contains("content-type: application/json"));

        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let sent: QuoteRecord = serde_json::from_str(body).unwrap();
        assert_eq!(sent, quote);
    }

    #[tokio::test]
    async fn test_push_rejected_is_status() {
        let (remote, server) = serve_once("500 Internal Server Error", "").await;
        let quote = QuoteRecord::new(7, "Ship it", "Work").unwrap();

        assert_eq!(remote.push(&quote).await.unwrap_err(), SyncError::Status(500));
        server.await.unwrap();
    }
}
