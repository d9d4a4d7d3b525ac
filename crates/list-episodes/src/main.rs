use anyhow::{Context, Result};
use clap::Parser;
use shared::{resolve_database_path, Config, EpisodeRecord, EpisodeStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "list-episodes")]
#[command(about = "Browse previously generated AI news podcast episodes")]
struct Args {
    /// Episode database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// How many episodes to list
    #[arg(short, long, default_value = "20")]
    limit: usize,

    /// Show a single episode, including its script
    #[arg(long)]
    id: Option<i64>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let database_path = resolve_database_path(args.database, Config::database_path_from_env())?;
    let store = match EpisodeStore::open_existing(&database_path)
        .with_context(|| format!("Failed to open episode database {}", database_path.display()))?
    {
        Some(store) => store,
        None => {
            println!("No database at {}", database_path.display());
            return Ok(());
        }
    };

    if let Some(id) = args.id {
        let episode = store
            .get(id)?
            .ok_or_else(|| anyhow::anyhow!("No episode with id {}", id))?;
        print_episode(&episode);
        return Ok(());
    }

    let episodes = store.list_recent(args.limit)?;
    if episodes.is_empty() {
        println!("No episodes found in {}", database_path.display());
        return Ok(());
    }

    println!("Episodes in {}:\n", database_path.display());
    for episode in &episodes {
        println!("{}", summary_line(episode));
    }

    Ok(())
}

fn audio_marker(mp3_file: &str) -> &'static str {
    if Path::new(mp3_file).exists() {
        "✓"
    } else {
        "✗ missing"
    }
}

fn summary_line(episode: &EpisodeRecord) -> String {
    format!(
        "  #{} {} | {} min | {} | {}\n     {} ({})",
        episode.id,
        episode.created_at,
        episode.duration,
        episode.depth,
        episode.topics,
        episode.mp3_file,
        audio_marker(&episode.mp3_file)
    )
}

fn print_episode(episode: &EpisodeRecord) {
    println!("Episode #{}", episode.id);
    println!("  Created:  {}", episode.created_at);
    println!("  Topics:   {}", episode.topics);
    println!("  Duration: {} minutes", episode.duration);
    println!("  Depth:    {}", episode.depth);
    println!(
        "  Audio:    {} ({})",
        episode.mp3_file,
        audio_marker(&episode.mp3_file)
    );
    println!("\n{}", episode.script);
}
