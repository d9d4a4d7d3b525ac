use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::error::{PipelineError, SpeechError};
use crate::extractor::ArticleSource;
use crate::generative::TextGenerator;
use crate::models::{parse_topics, EpisodeParams, NewEpisode, SummaryBook};
use crate::news::{retrieve_article_urls, yesterday, NewsSource};
use crate::script::{ComposedScript, ScriptComposer};
use crate::speech::{synthesize_episode, SpeechSynthesizer};
use crate::store::EpisodeStore;
use crate::summarizer::ArticleSummarizer;

/// Progress reported to whoever drives a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    FetchingNews,
    NewsReady { topics: usize, summaries: usize },
    ComposingScript,
    SynthesizingAudio,
    SynthesizingChunk { index: usize, total: usize, chars: usize },
    AudioReady(PathBuf),
    Saved(i64),
    SaveFailed(String),
}

/// What the user asked for
#[derive(Debug, Clone)]
pub struct EpisodeRequest {
    /// Raw comma-separated topic list as typed
    pub topics_input: String,
    pub params: EpisodeParams,
}

/// A finished run
#[derive(Debug, Clone)]
pub struct Episode {
    pub topics: Vec<String>,
    pub summaries: SummaryBook,
    pub script: String,
    pub audio_path: PathBuf,
    /// `None` when the audio was produced but saving the record failed
    pub record_id: Option<i64>,
}

pub struct Pipeline<'a> {
    news: &'a dyn NewsSource,
    articles: &'a dyn ArticleSource,
    generator: &'a dyn TextGenerator,
    speech: &'a dyn SpeechSynthesizer,
    store: Option<&'a EpisodeStore>,
    output_dir: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        news: &'a dyn NewsSource,
        articles: &'a dyn ArticleSource,
        generator: &'a dyn TextGenerator,
        speech: &'a dyn SpeechSynthesizer,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            news,
            articles,
            generator,
            speech,
            store: None,
            output_dir: output_dir.into(),
        }
    }

    pub fn with_store(mut self, store: &'a EpisodeStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Run every stage once, in order, stopping at the first fatal failure.
    pub async fn run(
        &self,
        request: &EpisodeRequest,
        mut on_phase: impl FnMut(Phase),
    ) -> Result<Episode, PipelineError> {
        let topics = parse_topics(&request.topics_input);
        if topics.is_empty() {
            return Err(PipelineError::NoTopics);
        }

        on_phase(Phase::FetchingNews);
        let summaries = self.gather_summaries(&topics).await;
        if summaries.is_empty() {
            return Err(PipelineError::NoSummaries);
        }
        on_phase(Phase::NewsReady {
            topics: summaries.len(),
            summaries: summaries.total_summaries(),
        });

        on_phase(Phase::ComposingScript);
        let script = match ScriptComposer::new(self.generator)
            .compose(&topics, &request.params, &summaries)
            .await
        {
            ComposedScript::Generated(script) => script,
            ComposedScript::Failed(cause) => return Err(PipelineError::ScriptFailed(cause)),
        };

        on_phase(Phase::SynthesizingAudio);
        let audio_path = synthesize_episode(self.speech, &script, &self.output_dir, |index, total, chars| {
            on_phase(Phase::SynthesizingChunk { index, total, chars })
        })
        .await?;
        if !audio_path.exists() {
            return Err(SpeechError::MissingOutput(audio_path.display().to_string()).into());
        }
        info!(file = %audio_path.display(), "Podcast generated successfully");
        on_phase(Phase::AudioReady(audio_path.clone()));

        let record_id = self.save(request, &script, &audio_path, &mut on_phase);

        Ok(Episode {
            topics,
            summaries,
            script,
            audio_path,
            record_id,
        })
    }

    /// Fetch, extract and summarize up to three articles per topic.
    ///
    /// Topics and articles that fail are skipped with a warning.
    pub async fn gather_summaries(&self, topics: &[String]) -> SummaryBook {
        let summarizer = ArticleSummarizer::new(self.generator);
        let mut book = SummaryBook::new();

        for (topic, urls) in retrieve_article_urls(self.news, topics, yesterday()).await {
            let mut topic_summaries = Vec::new();

            for url in &urls {
                match self.articles.fetch_article_text(url).await {
                    Ok(Some(text)) => {
                        topic_summaries.push(summarizer.summarize_article(&text).await);
                    }
                    Ok(None) => {
                        warn!(url = %url, "No content extracted for article");
                    }
                    Err(e) => {
                        warn!(url = %url, error = %format!("{:#}", e), "Failed to process article");
                    }
                }
            }

            if topic_summaries.is_empty() {
                warn!(topic = %topic, "No summaries generated for topic");
            } else {
                book.insert(topic, topic_summaries);
            }
        }

        book
    }

    fn save(
        &self,
        request: &EpisodeRequest,
        script: &str,
        audio_path: &std::path::Path,
        on_phase: &mut impl FnMut(Phase),
    ) -> Option<i64> {
        let store = self.store?;
        let episode = NewEpisode {
            topics: request.topics_input.clone(),
            duration: request.params.duration_minutes,
            depth: request.params.depth,
            script: script.to_string(),
            mp3_file: audio_path.display().to_string(),
        };

        match store.insert(&episode) {
            Ok(id) => {
                on_phase(Phase::Saved(id));
                Some(id)
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "Database error");
                on_phase(Phase::SaveFailed(format!("{:#}", e)));
                None
            }
        }
    }
}
