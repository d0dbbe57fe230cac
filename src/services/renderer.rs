//! Rendered fetch: load the page in headless Chromium and capture the DOM
//! once client-side rendering has settled.

use crate::error::{ReadableError, Result};
use crate::types::{RawDocument, RenderSettings, SettleSettings};
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// A loaded page whose serialized markup can be sampled.
#[async_trait]
pub trait RenderedPage: Send + Sync {
    async fn snapshot(&self) -> Result<String>;
}

/// Poll `page` until its markup stops changing, and return the final markup.
///
/// Never returns before `settle.min_delay`. Returns the latest snapshot once
/// `settle.max_wait` has passed even if the markup is still changing. A
/// snapshot still pending at `settle.max_wait` is a `RenderTimeout`.
pub async fn wait_for_settle<P>(page: &P, settle: &SettleSettings) -> Result<String>
where
    P: RenderedPage + ?Sized,
{
    let started = Instant::now();
    let deadline = started + settle.max_wait;
    let mut previous = snapshot_before(page, deadline, started).await?;
    let mut polls = 0usize;

    loop {
        tokio::time::sleep_until((Instant::now() + settle.poll_interval).min(deadline)).await;
        let current = snapshot_before(page, deadline, started).await?;
        let elapsed = started.elapsed();
        polls += 1;

        if elapsed >= settle.min_delay && current == previous {
            debug!("Page settled after {:?} ({} polls)", elapsed, polls);
            return Ok(current);
        }

        if elapsed >= settle.max_wait {
            warn!(
                "Page still changing after {:?}, capturing current markup",
                elapsed
            );
            return Ok(current);
        }

        previous = current;
    }
}

async fn snapshot_before<P>(page: &P, deadline: Instant, started: Instant) -> Result<String>
where
    P: RenderedPage + ?Sized,
{
    match tokio::time::timeout_at(deadline, page.snapshot()).await {
        Ok(snapshot) => snapshot,
        Err(_) => Err(ReadableError::RenderTimeout {
            stage: "reading page markup".to_string(),
            waited: started.elapsed(),
        }),
    }
}

pub struct HeadlessRenderer {
    #[cfg_attr(not(feature = "headless"), allow(dead_code))]
    settings: RenderSettings,
}

impl HeadlessRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    #[cfg(feature = "headless")]
    pub async fn render(&self, url: &Url) -> Result<RawDocument> {
        let session = chrome::BrowserSession::launch(&self.settings).await?;
        let outcome = session.capture(url, &self.settings).await;
        session.close().await;

        let (html, final_url) = outcome?;
        Ok(RawDocument {
            html,
            base_url: Some(final_url),
        })
    }

    #[cfg(not(feature = "headless"))]
    pub async fn render(&self, url: &Url) -> Result<RawDocument> {
        Err(ReadableError::Browser {
            reason: format!(
                "cannot render {}: headless support not compiled, rebuild with --features headless",
                url
            ),
        })
    }
}

#[cfg(feature = "headless")]
mod chrome {
    use super::{wait_for_settle, RenderedPage};
    use crate::error::{ReadableError, Result};
    use crate::types::RenderSettings;
    use anyhow::{anyhow, Context};
    use async_trait::async_trait;
    use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tracing::{debug, info, warn};
    use url::Url;

    const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

    #[async_trait]
    impl RenderedPage for Page {
        async fn snapshot(&self) -> Result<String> {
            self.content().await.map_err(|e| ReadableError::Browser {
                reason: format!("failed to read page content: {}", e),
            })
        }
    }

    /// One browser process plus the task driving its CDP connection.
    pub(super) struct BrowserSession {
        browser: Browser,
        handler: JoinHandle<()>,
    }

    impl BrowserSession {
        pub(super) async fn launch(settings: &RenderSettings) -> Result<Self> {
            info!("Launching headless browser");

            let mut builder = BrowserConfig::builder();
            if let Some(ref path) = settings.chrome_executable {
                builder = builder.chrome_executable(path);
            }

            builder = builder
                .arg("--disable-dev-shm-usage")
                .arg("--disable-gpu")
                .arg("--no-first-run")
                .arg("--no-default-browser-check")
                .arg("--no-sandbox");

            let config = builder
                .build()
                .map_err(|e| anyhow!("Failed to build browser config: {}", e))?;

            let (browser, mut handler) = Browser::launch(config)
                .await
                .context("Failed to launch browser")?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            Ok(Self { browser, handler })
        }

        /// Navigate, wait for the page to settle and return its markup and final URL.
        pub(super) async fn capture(
            &self,
            url: &Url,
            settings: &RenderSettings,
        ) -> Result<(String, Url)> {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| ReadableError::Browser {
                    reason: format!("failed to open page: {}", e),
                })?;

            let outcome = Self::load(&page, url, settings).await;

            if let Err(e) = page.close().await {
                warn!("Failed to close page: {}", e);
            }

            outcome
        }

        async fn load(page: &Page, url: &Url, settings: &RenderSettings) -> Result<(String, Url)> {
            if let Some(ref user_agent) = settings.user_agent {
                page.execute(SetUserAgentOverrideParams::new(user_agent.clone()))
                    .await
                    .map_err(|e| ReadableError::Browser {
                        reason: format!("failed to set user agent: {}", e),
                    })?;
            }

            info!("Navigating to {}", url);
            let budget = settings.settle.max_wait;
            match tokio::time::timeout(budget, page.goto(url.as_str())).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    return Err(ReadableError::Browser {
                        reason: format!("navigation to {} failed: {}", url, e),
                    })
                }
                Err(_) => {
                    return Err(ReadableError::RenderTimeout {
                        stage: format!("navigating to {}", url),
                        waited: budget,
                    })
                }
            }

            let html = wait_for_settle(page, &settings.settle).await?;

            let final_url = match page.url().await {
                Ok(Some(current)) => Url::parse(&current).unwrap_or_else(|_| url.clone()),
                _ => url.clone(),
            };
            debug!("Captured {} bytes from {}", html.len(), final_url);

            Ok((html, final_url))
        }

        /// Close the browser and reap its process. Called on every path out of a render.
        pub(super) async fn close(mut self) {
            match tokio::time::timeout(CLOSE_TIMEOUT, self.browser.close()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("Failed to close browser: {}", e),
                Err(_) => warn!("Browser did not close within {:?}", CLOSE_TIMEOUT),
            }

            match tokio::time::timeout(CLOSE_TIMEOUT, self.browser.wait()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("Failed to wait for browser exit: {}", e),
                Err(_) => {
                    warn!("Browser still running after {:?}, killing it", CLOSE_TIMEOUT);
                    if let Some(Err(e)) = self.browser.kill().await {
                        warn!("Failed to kill browser: {}", e);
                    }
                }
            }

            self.handler.abort();
            debug!("Browser session closed");
        }
    }
}
