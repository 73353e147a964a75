use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use apify_client::ApifyClient;
use serper_client::SerperClient;
use text_source::{BingSearch, Config, FinderConfig, SearchRequest, SourceFinder};

#[derive(Parser)]
#[command(name = "text-source", about = "Find where a text passage was published on the web")]
struct Cli {
    /// Passage to search for. Repeat for a batch; omit to read one from stdin.
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Candidates to request per passage
    #[arg(long, default_value_t = 10)]
    max_results: usize,

    /// Per-page fetch timeout
    #[arg(long, default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Time after which unfinished fetches are abandoned
    #[arg(long, default_value_t = 90)]
    batch_deadline_secs: u64,

    /// Maximum simultaneous page fetches
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Where to write the JSON result
    #[arg(long, default_value = "sources.json")]
    output: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("text_source=info,apify_client=info"));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    let config = Config::from_env()?;

    let texts = if cli.texts.is_empty() {
        vec![read_stdin_text()?]
    } else {
        cli.texts
    };
    let request = SearchRequest::from_texts(texts);

    let finder_config = FinderConfig {
        fetch_timeout: Duration::from_secs(cli.fetch_timeout_secs),
        batch_deadline: Duration::from_secs(cli.batch_deadline_secs),
        max_concurrent_fetches: cli.concurrency,
        ..Default::default()
    };

    let apify = ApifyClient::new(config.apify_api_key.clone());
    let search = BingSearch::new(apify, &config.market_code);
    let fetcher = SerperClient::new(&config.serper_api_key);
    let finder = SourceFinder::new(Arc::new(search), Arc::new(fetcher), finder_config)?;

    let is_batch = request.is_batch();
    let sessions = finder.find(request, cli.max_results).await?;

    let json = if is_batch {
        let artifacts: Vec<_> = sessions.iter().map(|s| s.artifact()).collect();
        serde_json::to_vec_pretty(&artifacts)?
    } else {
        let session = sessions.first().context("Search returned no session")?;
        serde_json::to_vec_pretty(&session.artifact())?
    };
    std::fs::write(&cli.output, json)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    for session in &sessions {
        match session.best_match() {
            Some(best) => info!(
                link = %best.website_link,
                score = best.source_score.unwrap_or_default(),
                "Best match"
            ),
            None => info!("No candidate could be scored"),
        }
    }
    info!(output = %cli.output.display(), sessions = sessions.len(), "Results written");

    Ok(())
}

fn read_stdin_text() -> Result<String> {
    eprintln!("Text:");
    io::stderr().flush().ok();

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    let text = text.trim().to_string();
    if text.is_empty() {
        bail!("No text given: pass --text or pipe a passage on stdin");
    }
    Ok(text)
}
