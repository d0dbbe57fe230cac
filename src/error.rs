use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadableError {
    #[error("{reason}")]
    Usage { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported URL scheme '{scheme}', expected http or https")]
    UnsupportedScheme { scheme: String },

    #[error("HTTP status error: {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Response is not HTML (content-type: {content_type})")]
    NotHtml { content_type: String },

    #[error("Browser error: {reason}")]
    Browser { reason: String },

    #[error("Timed out after {waited:?} {stage}")]
    RenderTimeout {
        stage: String,
        waited: std::time::Duration,
    },

    #[error("Extraction failed: {reason}")]
    Extraction { reason: String },

    #[error("No article found: {reason}")]
    NoArticle { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

impl ReadableError {
    pub const EXIT_USAGE: i32 = 1;
    pub const EXIT_FAILURE: i32 = 2;
    pub const EXIT_NO_ARTICLE: i32 = 3;

    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } | Self::InvalidUrl(_) | Self::UnsupportedScheme { .. } => {
                Self::EXIT_USAGE
            }
            Self::NoArticle { .. } => Self::EXIT_NO_ARTICLE,
            _ => Self::EXIT_FAILURE,
        }
    }

    pub fn usage(reason: impl Into<String>) -> Self {
        Self::Usage {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReadableError>;
