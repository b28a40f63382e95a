// ABOUTME: CLI for the podcast feed pipeline and its JSON API.
// ABOUTME: Parses local feed files, queries a remote feed through the API envelope, or runs the server.

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use podcast_api::{serve_with_shutdown, ApiRequest, PodcastService, ServiceConfig};
use podcast_feed::parse_feed_str;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Parse podcast RSS feeds and serve them as JSON.
#[derive(Parser, Debug)]
#[command(name = "podcast-cli")]
#[command(about = "Parse podcast RSS feeds and serve them as JSON", long_about = None)]
struct Args {
    /// Podcast RSS feed URL (http/https).
    #[arg(long, env = "RSS_FEED_URL", global = true)]
    feed_url: Option<String>,

    /// Upstream request timeout in seconds.
    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value_t = 10, global = true)]
    timeout: u64,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a local feed document ("-" reads stdin) and print podcast and episodes.
    Parse {
        input: String,
    },
    /// Fetch the feed and print one page of episodes.
    Episodes {
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,
    },
    /// Fetch the feed and print podcast metadata.
    Info,
    /// Run the HTTP API.
    Serve {
        /// Listen address; defaults to 0.0.0.0 on PORT.
        #[arg(long)]
        addr: Option<SocketAddr>,

        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,

        /// Feed cache lifetime in seconds; 0 disables caching.
        #[arg(long, env = "CACHE_TTL_SECS", default_value_t = 300)]
        cache_ttl: u64,

        #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
        cors_origin: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let args = Args::parse();

    match &args.command {
        Command::Parse { input } => {
            let xml = load_input(input)?;
            let feed = parse_feed_str(&xml).with_context(|| format!("failed to parse {input}"))?;
            print_json(&serde_json::to_value(&feed)?, args.compact)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Episodes { limit, offset } => {
            let mut query = HashMap::new();
            if let Some(limit) = limit {
                query.insert("limit".to_string(), limit.clone());
            }
            if let Some(offset) = offset {
                query.insert("offset".to_string(), offset.clone());
            }
            query_api(&args, "/api/episodes", query).await
        }
        Command::Info => query_api(&args, "/api/podcast-info", HashMap::new()).await,
        Command::Serve {
            addr,
            port,
            cache_ttl,
            cors_origin,
        } => {
            let config = service_config(&args)
                .cache_ttl(Duration::from_secs(*cache_ttl))
                .allowed_origin(cors_origin.clone())
                .build();
            let addr = addr.unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], *port)));
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;

            let service = Arc::new(PodcastService::new(config));
            serve_with_shutdown(listener, service, shutdown_on(tokio::signal::ctrl_c())).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolves when `signal` fires. If the handler cannot be installed, never resolves.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("interrupt received"),
        Err(err) => {
            warn!(error = %err, "failed to install interrupt handler, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn service_config(args: &Args) -> podcast_api::ServiceConfigBuilder {
    let builder = ServiceConfig::builder().timeout(Duration::from_secs(args.timeout));
    match &args.feed_url {
        Some(url) => builder.feed_url(url.clone()),
        None => builder,
    }
}

/// Runs one request through the API and prints its envelope.
async fn query_api(args: &Args, path: &str, query: HashMap<String, String>) -> Result<ExitCode> {
    let service = PodcastService::new(service_config(args).cache_ttl(Duration::ZERO).build());
    let request = ApiRequest {
        method: "GET".to_string(),
        path: path.to_string(),
        query,
    };
    let response = service.handle(&request).await;

    let envelope: Value = serde_json::from_str(&response.body)
        .with_context(|| format!("invalid response body for {path}"))?;
    print_json(&envelope, args.compact)?;

    if envelope.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(input).with_context(|| format!("file not found: {input}"))
}
