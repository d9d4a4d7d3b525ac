use async_trait::async_trait;
use chrono::NaiveDate;
use shared::script::target_word_count;
use shared::{
    ArticleSource, Depth, EpisodeParams, EpisodeRequest, EpisodeStore, GenerationError,
    NewsSource, Phase, Pipeline, PipelineError, SpeechError, SpeechSynthesizer, TextGenerator,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

const SCRIPT_PROMPT_PREFIX: &str = "You are an AI news reporter.";

#[derive(Default)]
struct FakeNews {
    urls: HashMap<String, Vec<String>>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeNews {
    fn with(mut self, topic: &str, urls: &[&str]) -> Self {
        self.urls
            .insert(topic.to_string(), urls.iter().map(|u| u.to_string()).collect());
        self
    }
}

#[async_trait]
impl NewsSource for FakeNews {
    async fn article_urls(&self, topic: &str, _since: NaiveDate) -> anyhow::Result<Vec<String>> {
        self.calls.lock().unwrap().push(topic.to_string());
        if self.failing.iter().any(|t| t == topic) {
            anyhow::bail!("NewsAPI returned error: 500");
        }
        Ok(self.urls.get(topic).cloned().unwrap_or_default())
    }
}

/// Article text keyed by URL; `None` means an empty page, missing means a failed fetch
#[derive(Default)]
struct FakeArticles {
    pages: HashMap<String, Option<String>>,
}

impl FakeArticles {
    fn page(mut self, url: &str, text: Option<&str>) -> Self {
        self.pages.insert(url.to_string(), text.map(str::to_string));
        self
    }
}

#[async_trait]
impl ArticleSource for FakeArticles {
    async fn fetch_article_text(&self, url: &str) -> anyhow::Result<Option<String>> {
        match self.pages.get(url) {
            Some(text) => Ok(text.clone()),
            None => anyhow::bail!("HTTP error: 404 Not Found"),
        }
    }
}

struct FakeGenerator {
    summary: Option<String>,
    script: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    fn new(summary: Option<&str>, script: Option<&str>) -> Self {
        Self {
            summary: summary.map(str::to_string),
            script: script.map(str::to_string),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn script_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.starts_with(SCRIPT_PROMPT_PREFIX))
            .cloned()
            .collect()
    }

    fn summary_prompt_count(&self) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.starts_with("Summarize"))
            .count()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = if prompt.starts_with(SCRIPT_PROMPT_PREFIX) {
            &self.script
        } else {
            &self.summary
        };
        reply
            .clone()
            .ok_or_else(|| GenerationError::MalformedResponse("no candidates".to_string()))
    }
}

#[derive(Default)]
struct FakeSpeech {
    fail_on_call: Option<usize>,
    chunks: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>> {
        let mut chunks = self.chunks.lock().unwrap();
        chunks.push(text.to_string());
        let call = chunks.len();
        if self.fail_on_call == Some(call) {
            anyhow::bail!("Deepgram API error: 500");
        }
        Ok(format!("audio-{}", call).into_bytes())
    }
}

fn request(topics: &str, duration: u32, depth: Depth) -> EpisodeRequest {
    EpisodeRequest {
        topics_input: topics.to_string(),
        params: EpisodeParams::new(duration, depth).unwrap(),
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn row_count(store: &EpisodeStore) -> usize {
    store.list_recent(100).unwrap().len()
}

#[tokio::test]
async fn no_articles_aborts_before_composing() {
    let dir = tempfile::tempdir().unwrap();
    let news = FakeNews::default().with("robotics", &[]);
    let articles = FakeArticles::default();
    let generator = FakeGenerator::new(Some("summary"), Some("script"));
    let speech = FakeSpeech::default();
    let store = EpisodeStore::open_in_memory().unwrap();

    let pipeline =
        Pipeline::new(&news, &articles, &generator, &speech, dir.path()).with_store(&store);
    let err = pipeline
        .run(&request("robotics", 5, Depth::Mid), |_| {})
        .await
        .unwrap_err();

    assert_eq!(target_word_count(5), 750);
    assert!(matches!(err, PipelineError::NoSummaries));
    assert!(err.to_string().contains("No news summaries available"));
    assert!(generator.prompts.lock().unwrap().is_empty());
    assert!(speech.chunks.lock().unwrap().is_empty());
    assert_eq!(row_count(&store), 0);
}

#[tokio::test]
async fn long_script_keeps_only_first_chunk_audio() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!("{}{}{}", "a".repeat(2000), "b".repeat(2000), "c".repeat(1000));
    let news = FakeNews::default().with("robotics", &["https://news.test/1"]);
    let articles = FakeArticles::default().page("https://news.test/1", Some("Robots everywhere."));
    let generator = FakeGenerator::new(Some("Robots summary."), Some(&script));
    let speech = FakeSpeech::default();
    let store = EpisodeStore::open_in_memory().unwrap();

    let pipeline =
        Pipeline::new(&news, &articles, &generator, &speech, dir.path()).with_store(&store);
    let mut phases = Vec::new();
    let episode = pipeline
        .run(&request("robotics", 5, Depth::Starter), |phase| phases.push(phase))
        .await
        .unwrap();

    let sizes: Vec<usize> = speech.chunks.lock().unwrap().iter().map(|c| c.len()).collect();
    assert_eq!(sizes, vec![2000, 2000, 1000]);

    let files = files_in(dir.path());
    assert_eq!(files.len(), 1, "leftover files: {:?}", files);
    assert!(files[0].starts_with("episode_") && files[0].ends_with(".mp3"));
    assert_eq!(fs::read(&episode.audio_path).unwrap(), b"audio-1");
    assert_eq!(episode.script, script);

    assert_eq!(
        phases,
        vec![
            Phase::FetchingNews,
            Phase::NewsReady {
                topics: 1,
                summaries: 1
            },
            Phase::ComposingScript,
            Phase::SynthesizingAudio,
            Phase::SynthesizingChunk {
                index: 1,
                total: 3,
                chars: 2000
            },
            Phase::SynthesizingChunk {
                index: 2,
                total: 3,
                chars: 2000
            },
            Phase::SynthesizingChunk {
                index: 3,
                total: 3,
                chars: 1000
            },
            Phase::AudioReady(episode.audio_path.clone()),
            Phase::Saved(episode.record_id.unwrap()),
        ]
    );
}

#[tokio::test]
async fn script_failure_aborts_before_synthesis_and_store() {
    let dir = tempfile::tempdir().unwrap();
    let news = FakeNews::default().with("ai", &["https://news.test/1"]);
    let articles = FakeArticles::default().page("https://news.test/1", Some("Body"));
    let generator = FakeGenerator::new(Some("Summary."), None);
    let speech = FakeSpeech::default();
    let store = EpisodeStore::open_in_memory().unwrap();

    let pipeline =
        Pipeline::new(&news, &articles, &generator, &speech, dir.path()).with_store(&store);
    let err = pipeline
        .run(&request("ai", 10, Depth::Mid), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::ScriptFailed(_)));
    assert!(speech.chunks.lock().unwrap().is_empty());
    assert_eq!(row_count(&store), 0);
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn generated_script_mentioning_failure_is_still_synthesized() {
    let dir = tempfile::tempdir().unwrap();
    let news = FakeNews::default().with("space", &["https://news.test/1"]);
    let articles = FakeArticles::default().page("https://news.test/1", Some("Body"));
    let generator = FakeGenerator::new(
        Some("Summary."),
        Some("The rocket test failed, but the AI guidance worked."),
    );
    let speech = FakeSpeech::default();

    let pipeline = Pipeline::new(&news, &articles, &generator, &speech, dir.path());
    let episode = pipeline
        .run(&request("space", 5, Depth::Deep), |_| {})
        .await
        .unwrap();

    assert_eq!(speech.chunks.lock().unwrap().len(), 1);
    assert!(episode.audio_path.exists());
    assert_eq!(episode.record_id, None);

    let files = files_in(dir.path());
    assert_eq!(files.len(), 1, "leftover files: {:?}", files);
    assert!(files[0].starts_with("episode_"));
}

#[tokio::test]
async fn bad_articles_are_skipped_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let news = FakeNews {
        failing: vec!["broken".to_string()],
        ..FakeNews::default()
    }
    .with(
        "robotics",
        &["https://news.test/missing", "https://news.test/empty", "https://news.test/ok"],
    )
    .with("chips", &["https://news.test/empty"]);
    let articles = FakeArticles::default()
        .page("https://news.test/empty", None)
        .page("https://news.test/ok", Some("Real article body."));
    let generator = FakeGenerator::new(Some("Robot summary."), Some("Script text."));
    let speech = FakeSpeech::default();

    let pipeline = Pipeline::new(&news, &articles, &generator, &speech, dir.path());
    let episode = pipeline
        .run(&request("robotics, broken, chips", 5, Depth::Mid), |_| {})
        .await
        .unwrap();

    assert_eq!(
        *news.calls.lock().unwrap(),
        vec!["robotics", "broken", "chips"]
    );
    assert_eq!(generator.summary_prompt_count(), 1);
    assert_eq!(episode.summaries.len(), 1);
    assert_eq!(episode.summaries.get("robotics").unwrap().len(), 1);
    assert!(episode.summaries.get("chips").is_none());
    assert_eq!(episode.topics, vec!["robotics", "broken", "chips"]);
}

#[tokio::test]
async fn summary_fallback_is_included_in_script_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let news = FakeNews::default().with("ai", &["https://news.test/1"]);
    let articles = FakeArticles::default().page("https://news.test/1", Some("Body"));
    let generator = FakeGenerator::new(None, Some("Script text."));
    let speech = FakeSpeech::default();

    let pipeline = Pipeline::new(&news, &articles, &generator, &speech, dir.path());
    let episode = pipeline
        .run(&request("ai", 20, Depth::Starter), |_| {})
        .await
        .unwrap();

    let prompts = generator.script_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("ai: Summary unavailable due to API error."));
    assert!(prompts[0].contains("approximately 3000 words"));
    assert!(prompts[0].contains("Starter level of understanding"));
    assert_eq!(episode.summaries.total_summaries(), 1);
}

#[tokio::test]
async fn chunk_failure_aborts_and_leaves_earlier_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let news = FakeNews::default().with("ai", &["https://news.test/1"]);
    let articles = FakeArticles::default().page("https://news.test/1", Some("Body"));
    let script = "x".repeat(4500);
    let generator = FakeGenerator::new(Some("Summary."), Some(&script));
    let speech = FakeSpeech {
        fail_on_call: Some(2),
        ..FakeSpeech::default()
    };
    let store = EpisodeStore::open_in_memory().unwrap();

    let pipeline =
        Pipeline::new(&news, &articles, &generator, &speech, dir.path()).with_store(&store);
    let err = pipeline
        .run(&request("ai", 10, Depth::Mid), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::AudioFailed(SpeechError::Chunk { chunk: 2, .. })
    ));
    assert_eq!(speech.chunks.lock().unwrap().len(), 2);
    let files = files_in(dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("chunk_0_"));
    assert_eq!(row_count(&store), 0);
}

#[tokio::test]
async fn blank_topics_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let news = FakeNews::default();
    let articles = FakeArticles::default();
    let generator = FakeGenerator::new(None, None);
    let speech = FakeSpeech::default();

    let pipeline = Pipeline::new(&news, &articles, &generator, &speech, dir.path());
    let err = pipeline
        .run(&request(" , ,", 10, Depth::Mid), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoTopics));
    assert!(news.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn saved_record_keeps_raw_topic_input() {
    let dir = tempfile::tempdir().unwrap();
    let news = FakeNews::default()
        .with("ai", &["https://news.test/1"])
        .with("robotics", &["https://news.test/2"]);
    let articles = FakeArticles::default()
        .page("https://news.test/1", Some("One"))
        .page("https://news.test/2", Some("Two"));
    let generator = FakeGenerator::new(Some("Summary."), Some("Full script."));
    let speech = FakeSpeech::default();
    let store = EpisodeStore::open_in_memory().unwrap();

    let pipeline =
        Pipeline::new(&news, &articles, &generator, &speech, dir.path()).with_store(&store);
    let episode = pipeline
        .run(&request("ai, robotics", 10, Depth::Mid), |_| {})
        .await
        .unwrap();

    let record = store.get(episode.record_id.unwrap()).unwrap().unwrap();
    assert_eq!(record.topics, "ai, robotics");
    assert_eq!(record.duration, 10);
    assert_eq!(record.depth, "Mid");
    assert_eq!(record.script, "Full script.");
    assert_eq!(record.mp3_file, episode.audio_path.display().to_string());
    assert!(!record.created_at.is_empty());
}
