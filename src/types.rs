use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Where the HTML comes from once the command line has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(Url),
    Html { html: String, base_url: Option<Url> },
}

/// Fetched markup, before extraction.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub html: String,
    pub base_url: Option<Url>,
}

/// Extracted article, as printed on standard output.
///
/// Every key is always serialized; absent values are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub dir: Option<String>,
    pub lang: Option<String>,
    pub content: String,
    pub text_content: String,
    pub length: usize,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
    pub url: Option<String>,
}

/// Printed instead of an [`Article`] when the page has no extractable body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
    pub message: String,
}

impl ErrorRecord {
    pub const NO_ARTICLE: &'static str = "no-article-found";

    pub fn no_article(message: impl Into<String>) -> Self {
        Self {
            error: Self::NO_ARTICLE.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Direct,
    Rendered,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("extract-article/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// When a rendered page counts as settled.
#[derive(Debug, Clone)]
pub struct SettleSettings {
    /// Never capture before this much time has passed.
    pub min_delay: Duration,
    /// Capture whatever is there once this much time has passed.
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl SettleSettings {
    pub fn new(min_delay: Duration, max_wait: Duration) -> Self {
        Self {
            min_delay,
            max_wait: max_wait.max(min_delay),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl Default for SettleSettings {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_secs(30))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    pub settle: SettleSettings,
    pub chrome_executable: Option<PathBuf>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReadabilitySettings {
    pub char_threshold: usize,
    /// 0 means no limit.
    pub max_elements: usize,
}

impl Default for ReadabilitySettings {
    fn default() -> Self {
        Self {
            char_threshold: 500,
            max_elements: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub strategy: FetchStrategy,
    pub http: HttpSettings,
    pub render: RenderSettings,
    pub readability: ReadabilitySettings,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::Direct,
            http: HttpSettings::default(),
            render: RenderSettings::default(),
            readability: ReadabilitySettings::default(),
        }
    }
}
