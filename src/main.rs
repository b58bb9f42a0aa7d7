// src/main.rs

//! mensasync: canteen feed synchronizer CLI.
//!
//! Registers feeds, runs the synchronization pipeline against them and
//! inspects the resulting audit logs.

use clap::{Parser, Subcommand};

use mensasync::error::Result;
use mensasync::models::{Config, Subject};
use mensasync::pipeline::{FeedLocks, sync_all, sync_feed};
use mensasync::services::FetchOptions;
use mensasync::storage::{LocalStore, Store};
use mensasync::utils::http::HttpTransport;

#[derive(Parser, Debug)]
#[command(
    name = "mensasync",
    version,
    about = "Canteen feed index synchronizer"
)]
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synchronize a single feed
    Sync {
        /// Feed id
        feed: i64,
    },
    /// Synchronize every known feed
    SyncAll,
    /// Register a new feed
    AddFeed { name: String, index_url: String },
    /// List known feeds
    Feeds,
    /// Show a feed's audit log, most recent first
    Messages {
        /// Feed id
        feed: i64,
        /// Only show error messages
        #[arg(long)]
        errors: bool,
    },
    /// Validate the configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let store = LocalStore::open(&config.storage.data_dir).await?;

    match cli.command {
        Command::Sync { feed } => {
            let transport = HttpTransport::new(&config.fetcher)?;
            let locks = FeedLocks::new();
            let options = FetchOptions::from(&config.fetcher);
            let outcome = sync_feed(&store, &transport, options, &locks, feed).await?;
            println!(
                "success: {} ({} new, {} updated, {} archived)",
                outcome.success, outcome.stats.new, outcome.stats.updated, outcome.stats.archived
            );
        }
        Command::SyncAll => {
            let transport = HttpTransport::new(&config.fetcher)?;
            let locks = FeedLocks::new();
            let summary = sync_all(&store, &transport, &config, &locks).await?;
            println!(
                "{} feeds, {} failures ({} new, {} updated, {} archived)",
                summary.feeds,
                summary.failures,
                summary.stats.new,
                summary.stats.updated,
                summary.stats.archived
            );
        }
        Command::AddFeed { name, index_url } => {
            let feed = store.add_feed(&name, &index_url).await?;
            println!("added feed {} '{}' <{}>", feed.id, feed.name, feed.index_url);
        }
        Command::Feeds => {
            for feed in store.feeds().await? {
                let sources = store.sources_by_feed(feed.id).await?;
                println!(
                    "{:>4}  {} <{}> ({} sources)",
                    feed.id,
                    feed.name,
                    feed.index_url,
                    sources.len()
                );
            }
        }
        Command::Messages { feed, errors } => {
            for message in store.messages(Subject::Feed(feed)).await? {
                if errors && !message.body.is_error() {
                    continue;
                }
                println!("{}  {}", message.created_at.to_rfc3339(), message.body);
            }
        }
        Command::Validate => {
            println!("configuration ok");
            println!("  user agent: {}", config.fetcher.user_agent);
            println!("  timeout: {}s", config.fetcher.timeout_secs);
            println!(
                "  redirects: follow={} depth={} update={}",
                config.fetcher.follow, config.fetcher.depth, config.fetcher.update
            );
            println!("  max concurrent feeds: {}", config.sync.max_concurrent);
            println!("  data dir: {}", config.storage.data_dir);
        }
    }

    Ok(())
}
