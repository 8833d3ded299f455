use clap::Parser;
use tracing_subscriber::EnvFilter;

mod apis;
mod config;
mod render;
mod search;

use config::Config;

/// Simple script to fetch papers on provided date from arxiv.org, biorxiv.org
#[derive(Parser, Debug)]
#[command(name = "preprint-digest", version, about, long_about = None)]
struct Cli {
    /// Search term
    #[arg(short, long)]
    query: String,

    /// Paper posted date. (Currently not supported for arxiv, biorxiv)
    #[arg(short, long, default_value_t = today(), value_parser = parse_date)]
    date: String,

    /// Only query these sources (repeatable); defaults to all, arxiv first
    #[arg(short, long = "source", value_name = "NAME", value_parser = config::SOURCE_ORDER)]
    sources: Vec<String>,

    /// Increase log verbosity on stderr (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn parse_date(s: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::from_env()?;
    if !cli.sources.is_empty() {
        config.set_sources(cli.sources.clone())?;
    }
    let sources = config.build_sources()?;
    tracing::info!(sources = sources.len(), query = %cli.query, date = %cli.date, "Starting search");

    let mut out = std::io::stdout();
    search::run(&sources, &cli.query, &cli.date, &mut out).await?;
    Ok(())
}
