use crate::error::TransportError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

type TransportResult<T> = std::result::Result<T, TransportError>;

/// Raw JSON exchange with the inference server.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, path: &str, payload: &Value) -> TransportResult<Map<String, Value>>;
    async fn get(&self, path: &str) -> TransportResult<Map<String, Value>>;
}

#[derive(Clone)]
pub struct APIClient {
    client: Client,
    endpoint: String,
}

impl APIClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(APIClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    async fn read_object(response: reqwest::Response) -> TransportResult<Map<String, Value>> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(TransportError::InvalidBody(format!(
                "expected a JSON object, got: {}",
                body
            ))),
            Err(e) => Err(TransportError::InvalidBody(format!("{}: {}", e, body))),
        }
    }
}

#[async_trait]
impl Transport for APIClient {
    async fn post(&self, path: &str, payload: &Value) -> TransportResult<Map<String, Value>> {
        let url = self.url(path);
        debug!("POST {}", url);
        let started = Instant::now();
        let body = serde_json::to_string(payload)
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let result = Self::read_object(response).await;

        debug!("POST {} finished in {:?}", url, started.elapsed());
        result
    }

    async fn get(&self, path: &str) -> TransportResult<Map<String, Value>> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::read_object(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and hands back the raw request it received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let header_end = match text.find("\r\n\r\n") {
            Some(i) => i + 4,
            None => return false,
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        request.len() >= header_end + content_length
    }

    #[tokio::test]
    async fn test_post_sends_compact_json() {
        let (endpoint, server) = serve_once("200 OK", r#"{"response":"hi"}"#).await;
        let client = APIClient::new(&format!("{}/", endpoint), 5).unwrap();

        let map = client
            .post("/api/generate", &json!({"model": "m", "stream": false}))
            .await
            .unwrap();
        assert_eq!(map["response"], json!("hi"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/generate HTTP/1.1"));
        assert!(request.to_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"model":"m","stream":false}"#));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (endpoint, _server) = serve_once("404 Not Found", r#"{"error":"model not found"}"#).await;
        let client = APIClient::new(&endpoint, 5).unwrap();

        match client.get("/api/tags").await {
            Err(TransportError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("model not found"));
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let (endpoint, _server) = serve_once("200 OK", "<html>proxy</html>").await;
        let client = APIClient::new(&endpoint, 5).unwrap();
        assert!(matches!(
            client.get("/api/tags").await,
            Err(TransportError::InvalidBody(_))
        ));
    }

    #[tokio::test]
    async fn test_non_object_body() {
        let (endpoint, _server) = serve_once("200 OK", "[1,2]").await;
        let client = APIClient::new(&endpoint, 5).unwrap();
        assert!(matches!(
            client.get("/api/tags").await,
            Err(TransportError::InvalidBody(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = APIClient::new(&format!("http://{}", addr), 2).unwrap();
        assert!(matches!(
            client.get("/api/tags").await,
            Err(TransportError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept the connection but never answer.
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let client = APIClient::new(&format!("http://{}", addr), 1).unwrap();
        let started = Instant::now();
        assert!(matches!(
            client.get("/api/tags").await,
            Err(TransportError::Network(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_url_joining() {
        let client = APIClient::new("http://localhost:11434/", 1).unwrap();
        assert_eq!(client.url("/api/tags"), "http://localhost:11434/api/tags");
        assert_eq!(client.url("api/generate"), "http://localhost:11434/api/generate");
    }
}
