use anyhow::{Context, Result};
use clap::Parser;
use shared::{
    copy_episode, ensure_dir, get_default_episodes_dir, resolve_database_path, Config,
    ContentExtractor, DeepgramClient, Depth, EpisodeParams, EpisodeRequest, EpisodeStore,
    GeminiClient, NewsApiClient, Phase, Pipeline,
};
use std::io::{self as stdio, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn prompt_topics() -> Result<String> {
    println!("Enter topics of interest (comma-separated, e.g., machine learning, robotics):");
    print!("> ");
    stdio::stdout().flush()?;

    let mut input = String::new();
    stdio::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

#[derive(Parser)]
#[command(name = "generate-episode")]
#[command(about = "Create a custom AI news podcast from the latest articles on your topics")]
struct Args {
    /// Topics of interest, comma-separated (prompted for if omitted)
    #[arg(short, long)]
    topics: Option<String>,

    /// Podcast duration in minutes
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u32).range(5..=60))]
    duration: u32,

    /// Depth level: starter, mid or deep
    #[arg(long, default_value = "mid")]
    depth: Depth,

    /// Directory for the finished MP3 (defaults to the local data directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Episode database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Open the episode in the default audio player when done
    #[arg(long)]
    play: bool,

    /// Also copy the finished MP3 to this file or directory
    #[arg(long)]
    copy_to: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(stdio::stderr)
        .init();
}

fn play(audio: &Path) {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    match Command::new(opener).arg(audio).spawn() {
        Ok(_) => println!("▶ Playing {}", audio.display()),
        Err(e) => warn!(error = %e, opener, "Could not launch audio player"),
    }
}

fn report(phase: Phase) {
    match phase {
        Phase::FetchingNews => println!("\n📰 Fetching latest AI news..."),
        Phase::NewsReady { topics, summaries } => {
            println!("✓ Summarized {} articles across {} topics", summaries, topics)
        }
        Phase::ComposingScript => println!("\n📝 Generating podcast script..."),
        Phase::SynthesizingAudio => println!("\n🎙  Converting script to audio..."),
        Phase::SynthesizingChunk {
            index,
            total,
            chars,
        } => println!(
            "  Processing chunk {}/{} ({} characters)",
            index, total, chars
        ),
        Phase::AudioReady(path) => {
            println!("\n✅ Podcast generated successfully!");
            println!("   {}", path.display());
        }
        Phase::Saved(id) => println!("✓ Saved as episode #{}", id),
        Phase::SaveFailed(_) => println!("⚠ Episode audio is ready but could not be saved"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = Config::from_env()?;

    let topics_input = match args.topics {
        Some(topics) => topics,
        None => prompt_topics()?,
    };
    let params = EpisodeParams::new(args.duration, args.depth)?;

    let output_dir = match args.output_dir.or(config.output_dir.clone()) {
        Some(dir) => ensure_dir(&dir)?,
        None => get_default_episodes_dir()?,
    };
    let database_path = resolve_database_path(args.database, config.database_path.clone())?;

    // A store that cannot be opened only costs us the record, not the episode.
    let store = match EpisodeStore::open(&database_path) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Database unavailable, episode will not be saved");
            None
        }
    };

    let news = NewsApiClient::with_base_url(config.newsapi_api_key, config.newsapi_base_url)?;
    let extractor = ContentExtractor::new()?;
    let gemini =
        GeminiClient::with_endpoint(config.gemini_api_key, config.gemini_base_url, config.gemini_model)?;
    let deepgram = DeepgramClient::with_endpoint(
        config.deepgram_api_key,
        config.deepgram_base_url,
        config.deepgram_model,
    )?;

    let mut pipeline = Pipeline::new(&news, &extractor, &gemini, &deepgram, output_dir);
    if let Some(store) = store.as_ref() {
        pipeline = pipeline.with_store(store);
    }

    println!(
        "🎧 {}-minute episode, {} depth",
        params.duration_minutes, params.depth
    );
    let request = EpisodeRequest {
        topics_input,
        params,
    };
    let episode = pipeline.run(&request, report).await?;

    if let Some(destination) = args.copy_to {
        let copied = copy_episode(&episode.audio_path, &destination)
            .context("Failed to download episode")?;
        println!("✓ Copied to {}", copied.display());
    }

    if args.play {
        play(&episode.audio_path);
    }

    Ok(())
}
