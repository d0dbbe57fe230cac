//! # Article Extractor Library
//!
//! Fetches a web page, either directly over HTTP or rendered in a headless
//! browser, and extracts the readable article from it.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use article_extractor::{ExtractSettings, InputResolver, Source};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = InputResolver::parse_target("https://example.com/post")?;
//!     let article = article_extractor::run(Source::Url(url), &ExtractSettings::default()).await?;
//!
//!     println!("{}", article.title.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod services;
pub mod types;

pub use error::{ReadableError, Result};
pub use services::{
    ArticleExtractor, ContentFetcher, Emitter, HeadlessRenderer, InputRequest, InputResolver,
};
pub use types::{
    Article, ErrorRecord, ExtractSettings, FetchStrategy, HttpSettings, RawDocument,
    ReadabilitySettings, RenderSettings, SettleSettings, Source,
};

use tracing::info;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fetch (if needed) and extract the article for a resolved source.
pub async fn run(source: Source, settings: &ExtractSettings) -> Result<Article> {
    let document = match source {
        Source::Html { html, base_url } => RawDocument { html, base_url },
        Source::Url(url) => match settings.strategy {
            FetchStrategy::Direct => ContentFetcher::new(&settings.http)?.fetch(&url).await?,
            FetchStrategy::Rendered => {
                info!("Rendering {} in headless browser", url);
                HeadlessRenderer::new(settings.render.clone())
                    .render(&url)
                    .await?
            }
        },
    };

    ArticleExtractor::new(settings.readability.clone()).extract(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const PAGE: &str = r#"<html><head><title>Field Notes: Tidal Pools</title></head><body>
<nav><a href="/">Home</a> <a href="/about">About</a></nav>
<article>
<h1>Field Notes: Tidal Pools</h1>
<p>The rocks at low tide hold a surprising amount of life. Anemones close up when the water recedes, and small crabs retreat under ledges until the sea returns to cover them again.</p>
<p>Spending an afternoon watching one pool shows how much changes with the light. Snails graze the algae film, hermit crabs trade shells, and the occasional sculpin darts between the weeds.</p>
<p><img src="/images/pool.jpg" alt="A tidal pool"></p>
</article>
<footer>Copyright</footer>
</body></html>"#;

    async fn serve_page() -> url::Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                PAGE.len(),
                PAGE
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        url::Url::parse(&format!("http://{}/notes/tidal-pools", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_direct_fetch_workflow() {
        let url = serve_page().await;

        let article = run(Source::Url(url.clone()), &ExtractSettings::default())
            .await
            .unwrap();

        assert_eq!(article.title.as_deref(), Some("Field Notes: Tidal Pools"));
        assert!(article.content.contains("hermit crabs"));
        assert!(!article.content.contains("Copyright"));

        let expected_img = url.join("/images/pool.jpg").unwrap();
        assert!(article.content.contains(expected_img.as_str()));
    }

    #[tokio::test]
    async fn test_html_source_skips_fetch() {
        let source = Source::Html {
            html: PAGE.to_string(),
            base_url: Some(url::Url::parse("https://notes.example.org/tidal").unwrap()),
        };

        let article = run(source, &ExtractSettings::default()).await.unwrap();

        assert!(article.content.contains("https://notes.example.org/images/pool.jpg"));
    }

    #[test]
    fn test_default_settings() {
        let settings = ExtractSettings::default();

        assert_eq!(settings.strategy, FetchStrategy::Direct);
        assert!(settings.http.user_agent.starts_with("extract-article/"));
        assert_eq!(settings.readability.char_threshold, 500);
        assert!(settings.render.settle.max_wait >= settings.render.settle.min_delay);
    }
}
