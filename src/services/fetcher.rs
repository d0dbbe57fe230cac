use crate::error::{ReadableError, Result};
use crate::types::{HttpSettings, RawDocument};
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use std::sync::LazyLock;
use tracing::{debug, info};
use url::Url;

static HTML_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(text/html|application/xhtml\+xml)\s*(;|$)")
        .expect("content-type pattern should compile")
});

/// Direct HTTP fetch, no script execution.
pub struct ContentFetcher {
    client: reqwest::Client,
}

impl ContentFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &Url) -> Result<RawDocument> {
        info!("Fetching content from URL: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ReadableError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !Self::is_html(content_type) {
                return Err(ReadableError::NotHtml {
                    content_type: content_type.to_string(),
                });
            }
        }

        let final_url = response.url().clone();
        if &final_url != url {
            debug!("Redirected to {}", final_url);
        }

        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), final_url);

        Ok(RawDocument {
            html,
            base_url: Some(final_url),
        })
    }

    fn is_html(content_type: &str) -> bool {
        HTML_CONTENT_TYPE.is_match(content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(status_line: &'static str, content_type: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                content_type,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        Url::parse(&format!("http://{}/article", addr)).unwrap()
    }

    fn fetcher() -> ContentFetcher {
        ContentFetcher::new(&HttpSettings {
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_html_content_types() {
        assert!(ContentFetcher::is_html("text/html"));
        assert!(ContentFetcher::is_html("text/html; charset=utf-8"));
        assert!(ContentFetcher::is_html("Application/XHTML+xml"));
        assert!(!ContentFetcher::is_html("application/json"));
        assert!(!ContentFetcher::is_html("text/htmlx"));
        assert!(!ContentFetcher::is_html("application/pdf"));
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let url = serve_once("200 OK", "text/html; charset=utf-8", "<html><body><p>hello</p></body></html>").await;

        let document = fetcher().fetch(&url).await.unwrap();

        assert!(document.html.contains("<p>hello</p>"));
        assert_eq!(document.base_url, Some(url));
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let url = serve_once("404 Not Found", "text/html", "<p>missing</p>").await;

        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err, ReadableError::HttpStatus { status: 404, .. }));
        assert_eq!(err.exit_code(), ReadableError::EXIT_FAILURE);
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let url = serve_once("200 OK", "application/json", "{\"a\":1}").await;

        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err, ReadableError::NotHtml { .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err, ReadableError::Http(_)));
    }
}
