use crate::error::{ReadableError, Result};
use crate::types::Source;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};
use url::Url;

/// What the command line asked for, before standard input is touched.
#[derive(Debug, Clone, Default)]
pub struct InputRequest {
    pub url: Option<String>,
    pub read_stdin: bool,
    pub stdin_is_terminal: bool,
}

pub struct InputResolver;

impl InputResolver {
    pub async fn resolve<R>(request: &InputRequest, stdin: R) -> Result<Source>
    where
        R: AsyncRead + Unpin,
    {
        let implicit_stdin = request.url.is_none() && !request.stdin_is_terminal;

        if request.read_stdin || implicit_stdin {
            let base_url = request.url.as_deref().map(Self::parse_target).transpose()?;
            let html = Self::read_all(stdin).await?;

            if html.trim().is_empty() {
                return Err(ReadableError::usage(
                    "no HTML received on standard input; pass a URL or pipe a document",
                ));
            }

            info!("Read {} bytes of HTML from standard input", html.len());
            return Ok(Source::Html { html, base_url });
        }

        match request.url.as_deref() {
            Some(url) => Ok(Source::Url(Self::parse_target(url)?)),
            None => Err(ReadableError::usage(
                "no URL given; pass a URL or pipe HTML with --stdin",
            )),
        }
    }

    /// Parse a fetch target, accepting only absolute http(s) URLs.
    pub fn parse_target(raw: &str) -> Result<Url> {
        let url = Url::parse(raw.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ReadableError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }

    async fn read_all<R>(mut stdin: R) -> Result<String>
    where
        R: AsyncRead + Unpin,
    {
        let mut bytes = Vec::new();
        stdin.read_to_end(&mut bytes).await?;
        debug!("Standard input closed after {} bytes", bytes.len());

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
