// Public modules
pub mod config;
pub mod error;
pub mod extractor;
pub mod generative;
pub mod io;
pub mod models;
pub mod news;
pub mod pipeline;
pub mod script;
pub mod speech;
pub mod store;
pub mod summarizer;

// Re-export commonly used types
pub use config::Config;
pub use error::{GenerationError, PipelineError, SpeechError};
pub use extractor::{ArticleSource, ContentExtractor};
pub use generative::{GeminiClient, TextGenerator};
pub use io::{
    copy_episode, ensure_dir, get_default_database_path, get_default_episodes_dir,
    resolve_database_path,
};
pub use models::{parse_topics, Depth, EpisodeParams, EpisodeRecord, NewEpisode, SummaryBook};
pub use news::{NewsApiClient, NewsSource};
pub use pipeline::{Episode, EpisodeRequest, Phase, Pipeline};
pub use script::{ComposedScript, ScriptComposer};
pub use speech::{DeepgramClient, SpeechSynthesizer};
pub use store::EpisodeStore;
pub use summarizer::{ArticleSummarizer, Summary};
