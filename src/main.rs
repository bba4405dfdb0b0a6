use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use threadpulse_core::{AppConfig, CoreError, ErrorExt, SortBy, TimeFilter};
use tokio_util::sync::CancellationToken;
use trend_service::TrendService;

/// Threadpulse - trending Reddit posts and comment sentiment
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "THREADPULSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show trending posts, served from cache while fresh
    Trending,
    /// Drop the trending cache and fetch again
    Refresh,
    /// Search posts by topic, or list a subreddit with `r/<name>`
    Search {
        topic: String,
        #[arg(long, default_value = "hot")]
        sort_by: SortBy,
        #[arg(long, default_value = "all")]
        time_filter: TimeFilter,
    },
    /// Score the comments of a post and summarize its pain points
    Analyze { permalink: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    let service = TrendService::from_config(&config).context("building service")?;

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    tracing::info!("Running {:?}", args.command);
    let result = match args.command {
        Command::Trending => print(service.get_trending_with_cancel(&token).await),
        Command::Refresh => print(service.refresh_trending_with_cancel(&token).await),
        Command::Search {
            topic,
            sort_by,
            time_filter,
        } => print(
            service
                .search_with_cancel(&topic, sort_by, time_filter, &token)
                .await,
        ),
        Command::Analyze { permalink } => {
            print(service.analyze_with_cancel(&permalink, &token).await)
        }
    };

    if let Err(e) = result {
        e.log_error();
        eprintln!("[{}] {}", e.error_code(), e.user_friendly_message());
        std::process::exit(1);
    }
    Ok(())
}

fn print<T: Serialize>(result: Result<T, CoreError>) -> Result<(), CoreError> {
    let value = result?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
