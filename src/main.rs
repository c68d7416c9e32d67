use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use preen::{Config, FeedStore};

/// Get the data directory path (~/.config/preen/)
fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("preen"))
}

#[derive(Parser, Debug)]
#[command(name = "preen", about = "Fetch, normalize, and track feeds")]
struct Args {
    /// Override the data directory (default ~/.config/preen)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Subscribe to a feed URL
    Add { url: String },
    /// Remove a subscription by URL
    Remove { url: String },
    /// List subscriptions with unread counts
    List,
    /// Re-fetch every subscription, preserving read/starred state
    Refresh,
    /// Decode HTML entities in a text fragment
    Decode { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if let Command::Decode { text } = &args.command {
        println!("{}", preen::decode_entities(text));
        return Ok(());
    }

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

    let config =
        Config::load(&data_dir.join("config.toml")).context("Failed to load configuration")?;
    let state_path = data_dir.join("feeds.json");
    let mut store = FeedStore::load(&state_path, &config).context("Failed to load feed state")?;

    match args.command {
        Command::Add { url } => {
            let source = store
                .add_source(&url)
                .await
                .with_context(|| format!("Failed to add feed {url}"))?;
            println!(
                "Added \"{}\" ({} articles)",
                source.title,
                source.articles.len()
            );
        }
        Command::Remove { url } => {
            let id = store
                .sources()
                .iter()
                .find(|s| s.url.as_str() == url)
                .map(|s| s.id);
            match id.and_then(|id| store.remove_source(id)) {
                Some(source) => println!("Removed \"{}\"", source.title),
                None => anyhow::bail!("No subscription with URL {url}"),
            }
        }
        Command::List => {
            for source in store.sources() {
                println!(
                    "{:4} unread  {}  {}",
                    source.unread_count(),
                    source.title,
                    source.url
                );
            }
        }
        Command::Refresh => {
            store.refresh_all().await;
            let articles: usize = store.sources().iter().map(|s| s.articles.len()).sum();
            println!("{} sources, {} articles", store.sources().len(), articles);
        }
        Command::Decode { .. } => unreachable!("handled before state is loaded"),
    }

    store.save(&state_path).context("Failed to save feed state")?;
    Ok(())
}
