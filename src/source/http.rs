//! HTTP data source.
//!
//! Polls the watchdog backend's `/api/connection-data` endpoint.

use std::time::Duration;

use async_trait::async_trait;

use super::{decode_payload, FetchError, Sample, SampleSource};

/// Path of the connection history endpoint, relative to the base URL.
pub const ENDPOINT_PATH: &str = "/api/connection-data";

/// A data source that fetches the sample history over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    description: String,
}

impl HttpSource {
    /// Create a source for the given base URL (e.g. `http://localhost:8080`).
    ///
    /// The timeout bounds the whole request, body included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let url = format!("{}{}", base_url.trim_end_matches('/'), ENDPOINT_PATH);
        let description = format!("http: {}", url);

        Ok(Self {
            client,
            url,
            timeout,
            description,
        })
    }

    /// Returns the full endpoint URL being polled.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl SampleSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Sample>, FetchError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.map_error(e))?;
        decode_payload(&body)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response and return the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
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
        });

        format!("http://{}", addr)
    }

    /// Accept one connection and never answer it.
    async fn serve_silently() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_http_source_url() {
        let source = HttpSource::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.url(), "http://localhost:8080/api/connection-data");
        assert_eq!(source.description(), "http: http://localhost:8080/api/connection-data");
    }

    #[tokio::test]
    async fn test_http_source_fetches_samples() {
        let base = serve_once("200 OK", r#"[{"status":"UP","latency":"12"}]"#).await;
        let source = HttpSource::new(&base, Duration::from_secs(5)).unwrap();

        let samples = source.fetch().await.unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].latency.as_ref().unwrap().as_integer(), Some(12));
    }

    #[tokio::test]
    async fn test_http_source_non_success_status() {
        let base = serve_once("500 Internal Server Error", "Unable to read log file").await;
        let source = HttpSource::new(&base, Duration::from_secs(5)).unwrap();

        assert_eq!(source.fetch().await.unwrap_err(), FetchError::Status(500));
    }

    #[tokio::test]
    async fn test_http_source_unreachable() {
        // Bind then drop to get a port nobody is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpSource::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        assert!(matches!(source.fetch().await, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_http_source_timeout() {
        let base = serve_silently().await;
        let timeout = Duration::from_millis(200);
        let source = HttpSource::new(&base, timeout).unwrap();

        assert_eq!(source.fetch().await.unwrap_err(), FetchError::Timeout(timeout));
    }
}
