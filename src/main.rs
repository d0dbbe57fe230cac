mod cli;

use article_extractor::{Emitter, ErrorRecord, InputResolver, ReadableError, Result};
use clap::Parser;
use cli::Cli;
use std::io::IsTerminal;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(ReadableError::EXIT_USAGE);
        }
        Err(e) => e.exit(),
    };

    // Initialize logging; stdout is reserved for JSON
    let default_filter = if cli.verbose {
        "article_extractor=debug,extract_article=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let code = match handle_extract(&cli).await {
        Ok(()) => 0,
        Err(e) => report_failure(&e),
    };

    std::process::exit(code);
}

async fn handle_extract(cli: &Cli) -> Result<()> {
    let request = cli.input_request(std::io::stdin().is_terminal());
    let source = InputResolver::resolve(&request, tokio::io::stdin()).await?;

    let article = article_extractor::run(source, &cli.settings()).await?;
    debug!(
        "Emitting article '{}' ({} characters)",
        article.title.as_deref().unwrap_or(""),
        article.length
    );

    Emitter::emit(std::io::stdout().lock(), &article)
}

fn report_failure(err: &ReadableError) -> i32 {
    if let ReadableError::NoArticle { reason } = err {
        let record = ErrorRecord::no_article(reason.as_str());
        if let Err(e) = Emitter::emit(std::io::stdout().lock(), &record) {
            error!("Failed to write error record: {}", e);
        }
    }

    error!("{}", err);
    err.exit_code()
}
