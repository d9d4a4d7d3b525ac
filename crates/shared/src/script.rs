use tracing::error;

use crate::generative::TextGenerator;
use crate::models::{EpisodeParams, SummaryBook};

/// Average speaking rate used to size the script
pub const WORDS_PER_MINUTE: u32 = 150;

pub const SCRIPT_FALLBACK: &str = "Script generation failed due to API error.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposedScript {
    Generated(String),
    /// Generation failed; carries the cause
    Failed(String),
}

impl ComposedScript {
    pub fn text(&self) -> &str {
        match self {
            ComposedScript::Generated(text) => text,
            ComposedScript::Failed(_) => SCRIPT_FALLBACK,
        }
    }
}

pub fn target_word_count(duration_minutes: u32) -> u32 {
    duration_minutes * WORDS_PER_MINUTE
}

/// One `topic: summary, summary` line per topic
pub fn format_summaries(summaries: &SummaryBook) -> String {
    summaries
        .iter()
        .map(|entry| {
            let joined = entry
                .summaries
                .iter()
                .map(|summary| summary.text())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", entry.topic, joined)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_script_prompt(
    topics: &[String],
    params: &EpisodeParams,
    summaries: &SummaryBook,
) -> String {
    format!(
        r#"You are an AI news reporter. Create a podcast script for a {duration}-minute episode on the latest AI news about {topics}.
The audience has a {depth} level of understanding. Use the following news summaries:

{summaries}

The script should be approximately {words} words, structured with an introduction, main content, and conclusion.
Make it engaging with a conversational tone, including rhetorical questions or examples where appropriate."#,
        duration = params.duration_minutes,
        topics = topics.join(", "),
        depth = params.depth,
        summaries = format_summaries(summaries),
        words = target_word_count(params.duration_minutes),
    )
}

pub struct ScriptComposer<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> ScriptComposer<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    pub async fn compose(
        &self,
        topics: &[String],
        params: &EpisodeParams,
        summaries: &SummaryBook,
    ) -> ComposedScript {
        let prompt = build_script_prompt(topics, params, summaries);

        match self.generator.generate(&prompt).await {
            Ok(script) if !script.trim().is_empty() => ComposedScript::Generated(script),
            Ok(_) => {
                error!("Gemini API script generation returned empty text");
                ComposedScript::Failed("empty response".to_string())
            }
            Err(e) => {
                error!(error = %e, "Gemini API script generation failed");
                ComposedScript::Failed(e.to_string())
            }
        }
    }
}
