//! Remote quote source.
//!
//! The remote side is a mock JSON API: reading it yields a list of posts whose
//! titles become quotes, and writing posts the whole local collection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AppError, Quote, QuoteCollection, RemoteConfig, Result};

/// Remote endpoint the sync engine reconciles against.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Read the remote quote set.
    ///
    /// # Errors
    /// Returns `AppError::Network` on transport failure or non-2xx status.
    async fn fetch(&self) -> Result<QuoteCollection>;

    /// Send the full local collection. Callers treat this as best-effort.
    async fn push(&self, quotes: &[Quote]) -> Result<()>;
}

/// Item returned by the remote endpoint. Only `title` is used.
#[derive(Debug, Deserialize)]
struct RemotePost {
    title: String,
}

#[derive(Debug, Serialize)]
struct PushBody<'a> {
    quotes: &'a [Quote],
}

/// `RemoteMirror` over HTTP.
pub struct HttpRemoteMirror {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemoteMirror {
    /// Build a client with the given per-request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(config: RemoteConfig, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quote-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AppError::network)?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl RemoteMirror for HttpRemoteMirror {
    async fn fetch(&self) -> Result<QuoteCollection> {
        tracing::debug!(endpoint = %self.config.endpoint, "Fetching remote quotes");

        let resp = self
            .client
            .get(&self.config.endpoint)
            .send()
            .await
            .map_err(AppError::network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Network {
                message: format!("GET {} returned HTTP {status}", self.config.endpoint),
                source: None,
            });
        }

        let posts: Vec<RemotePost> = resp.json().await.map_err(AppError::network)?;

        Ok(posts_to_quotes(
            posts,
            self.config.fetch_limit,
            &self.config.category,
        ))
    }

    async fn push(&self, quotes: &[Quote]) -> Result<()> {
        let resp = self
            .client
            .post(&self.config.push_endpoint)
            .json(&PushBody { quotes })
            .send()
            .await
            .map_err(AppError::network)?;

        tracing::debug!(status = %resp.status(), count = quotes.len(), "Pushed local quotes");

        Ok(())
    }
}

/// Keep the first `limit` posts and tag them with `category`.
fn posts_to_quotes(posts: Vec<RemotePost>, limit: usize, category: &str) -> QuoteCollection {
    posts
        .into_iter()
        .take(limit)
        .map(|post| Quote::new(post.title, category))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    /// Read one request head off the socket.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Serve one connection with `response`, or hold it open without replying
    /// when `response` is `None`. Returns the endpoint URL.
    async fn serve_once(response: Option<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            match response {
                Some(response) => {
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.ok();
                }
                None => tokio::time::sleep(Duration::from_secs(30)).await,
            }
        });

        format!("http://{addr}/posts")
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn mirror_for(endpoint: String, timeout: Duration) -> HttpRemoteMirror {
        let config = RemoteConfig {
            endpoint,
            ..RemoteConfig::default()
        };
        HttpRemoteMirror::new(config, timeout).unwrap()
    }

    #[test]
    fn test_posts_to_quotes_takes_limit() {
        let body = r#"[
            {"userId": 1, "id": 1, "title": "first", "body": "x"},
            {"id": 2, "title": "second"},
            {"id": 3, "title": "third"}
        ]"#;
        let posts: Vec<RemotePost> = serde_json::from_str(body).unwrap();

        let quotes = posts_to_quotes(posts, 2, "ServerSync");

        assert_eq!(
            quotes,
            vec![
                Quote::new("first", "ServerSync"),
                Quote::new("second", "ServerSync"),
            ]
        );
    }

    #[test]
    fn test_push_body_shape() {
        let quotes = vec![Quote::new("A", "B")];
        let json = serde_json::to_string(&PushBody { quotes: &quotes }).unwrap();
        assert_eq!(json, r#"{"quotes":[{"text":"A","category":"B"}]}"#);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_network_error() {
        let config = RemoteConfig {
            endpoint: "http://127.0.0.1:9/posts".to_string(),
            ..RemoteConfig::default()
        };
        let mirror =
            HttpRemoteMirror::new(config, std::time::Duration::from_millis(500)).unwrap();

        let err = mirror.fetch().await.unwrap_err();
        assert!(matches!(err, AppError::Network { .. }));
    }

    #[tokio::test]
    async fn test_fetch_keeps_only_fetch_limit_posts() {
        let posts: Vec<String> = (1..=8)
            .map(|i| format!(r#"{{"id": {i}, "title": "post {i}", "body": "x"}}"#))
            .collect();
        let body = format!("[{}]", posts.join(","));
        let endpoint = serve_once(Some(http_response("200 OK", &body))).await;

        let quotes = mirror_for(endpoint, Duration::from_secs(5))
            .fetch()
            .await
            .unwrap();

        assert_eq!(quotes.len(), 5);
        assert_eq!(quotes[0], Quote::new("post 1", "ServerSync"));
        assert_eq!(quotes[4], Quote::new("post 5", "ServerSync"));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_network_error() {
        let endpoint = serve_once(Some(http_response(
            "500 Internal Server Error",
            r#"{"error":"boom"}"#,
        )))
        .await;

        let err = mirror_for(endpoint, Duration::from_secs(5))
            .fetch()
            .await
            .unwrap_err();

        match err {
            AppError::Network { message, .. } => assert!(message.contains("500")),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_network_error() {
        let endpoint = serve_once(None).await;

        let err = mirror_for(endpoint, Duration::from_millis(200))
            .fetch()
            .await
            .unwrap_err();

        match err {
            AppError::Network { message, .. } => assert!(message.contains("timed out")),
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
