use article_extractor::{
    ExtractSettings, FetchStrategy, HttpSettings, InputRequest, ReadabilitySettings,
    RenderSettings, SettleSettings,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "extract-article")]
#[command(about = "Fetch a web page and print its readable article as JSON")]
#[command(version)]
pub struct Cli {
    /// Page to fetch; with --stdin, the base URL for relative links
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Render the page in a headless browser before extracting
    #[arg(long, conflicts_with = "stdin")]
    pub headless: bool,

    /// Read the HTML document from standard input instead of fetching
    #[arg(long)]
    pub stdin: bool,

    /// Minimum time to let client-side rendering run, in milliseconds
    #[arg(long, env = "EXTRACT_ARTICLE_DELAY_MS", default_value = "1000")]
    pub delay_ms: u64,

    /// Upper bound for navigation and for settling, in seconds
    #[arg(long, env = "EXTRACT_ARTICLE_RENDER_TIMEOUT", default_value = "30")]
    pub render_timeout: u64,

    /// HTTP request timeout for direct fetches, in seconds
    #[arg(long, env = "EXTRACT_ARTICLE_TIMEOUT", default_value = "10")]
    pub timeout: u64,

    /// User-Agent header for direct fetches and rendered pages
    #[arg(long, env = "EXTRACT_ARTICLE_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Chrome/Chromium executable to launch
    #[arg(long, env = "CHROME", value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Minimum article length in characters before readability relaxes its filters
    #[arg(long, default_value = "500")]
    pub char_threshold: usize,

    /// Refuse documents with more elements than this (0 = no limit)
    #[arg(long, default_value = "0")]
    pub max_elements: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn input_request(&self, stdin_is_terminal: bool) -> InputRequest {
        InputRequest {
            url: self.url.clone(),
            read_stdin: self.stdin,
            stdin_is_terminal,
        }
    }

    pub fn settings(&self) -> ExtractSettings {
        let mut http = HttpSettings {
            timeout: Duration::from_secs(self.timeout),
            ..Default::default()
        };
        if let Some(ref user_agent) = self.user_agent {
            http.user_agent = user_agent.clone();
        }

        ExtractSettings {
            strategy: if self.headless {
                FetchStrategy::Rendered
            } else {
                FetchStrategy::Direct
            },
            render: RenderSettings {
                settle: SettleSettings::new(
                    Duration::from_millis(self.delay_ms),
                    Duration::from_secs(self.render_timeout),
                ),
                chrome_executable: self.chrome.clone(),
                user_agent: self.user_agent.clone(),
            },
            http,
            readability: ReadabilitySettings {
                char_threshold: self.char_threshold,
                max_elements: self.max_elements,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["extract-article", "https://example.com/"]).unwrap();
        let settings = cli.settings();

        assert_eq!(cli.url.as_deref(), Some("https://example.com/"));
        assert_eq!(settings.strategy, FetchStrategy::Direct);
        assert_eq!(settings.http.timeout, Duration::from_secs(10));
        assert_eq!(settings.render.settle.min_delay, Duration::from_millis(1000));
        assert_eq!(settings.render.settle.max_wait, Duration::from_secs(30));
        assert!(settings.render.user_agent.is_none());
    }

    #[test]
    fn test_user_agent_applies_to_both_strategies() {
        let cli = Cli::try_parse_from([
            "extract-article",
            "--user-agent",
            "reader-bot/2",
            "https://example.com/",
        ])
        .unwrap();
        let settings = cli.settings();

        assert_eq!(settings.http.user_agent, "reader-bot/2");
        assert_eq!(settings.render.user_agent.as_deref(), Some("reader-bot/2"));
    }

    #[test]
    fn test_headless_flags() {
        let cli = Cli::try_parse_from([
            "extract-article",
            "--headless",
            "--delay-ms",
            "2500",
            "--render-timeout",
            "1",
            "https://example.com/",
        ])
        .unwrap();
        let settings = cli.settings();

        assert_eq!(settings.strategy, FetchStrategy::Rendered);
        assert_eq!(settings.render.settle.min_delay, Duration::from_millis(2500));
        assert_eq!(settings.render.settle.max_wait, Duration::from_millis(2500));
    }

    #[test]
    fn test_headless_conflicts_with_stdin() {
        let result = Cli::try_parse_from(["extract-article", "--headless", "--stdin"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_request() {
        let cli = Cli::try_parse_from(["extract-article", "--stdin", "https://example.com/"])
            .unwrap();
        let request = cli.input_request(false);

        assert!(request.read_stdin);
        assert_eq!(request.url.as_deref(), Some("https://example.com/"));
    }
}
