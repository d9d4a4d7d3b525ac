use tracing::error;

use crate::generative::TextGenerator;

/// Characters of article text sent for summarization
pub const MAX_ARTICLE_CHARS: usize = 4000;

pub const SUMMARY_FALLBACK: &str = "Summary unavailable due to API error.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Generated(String),
    /// The API call failed; carries the cause. Still counts as a summary.
    Unavailable(String),
}

impl Summary {
    pub fn text(&self) -> &str {
        match self {
            Summary::Generated(text) => text,
            Summary::Unavailable(_) => SUMMARY_FALLBACK,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Summary::Generated(_))
    }
}

pub struct ArticleSummarizer<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> ArticleSummarizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Summarize one article. Never fails: API errors become
    /// [`Summary::Unavailable`].
    pub async fn summarize_article(&self, content: &str) -> Summary {
        let prompt = build_summary_prompt(content);

        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => Summary::Generated(text),
            Ok(_) => {
                error!("Gemini API summarization returned empty text");
                Summary::Unavailable("empty response".to_string())
            }
            Err(e) => {
                error!(error = %e, "Gemini API summarization failed");
                Summary::Unavailable(e.to_string())
            }
        }
    }
}

pub fn build_summary_prompt(content: &str) -> String {
    format!(
        "Summarize the following article in 2-3 sentences, focusing on AI-related points: {}",
        truncate_chars(content, MAX_ARTICLE_CHARS)
    )
}

/// The first `max_chars` characters of `text`, cut on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
