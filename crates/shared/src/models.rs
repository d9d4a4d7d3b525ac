use std::fmt;
use std::str::FromStr;

use crate::summarizer::Summary;

pub const MIN_DURATION_MINUTES: u32 = 5;
pub const MAX_DURATION_MINUTES: u32 = 60;
pub const DEFAULT_DURATION_MINUTES: u32 = 10;

/// Split a comma-separated topic list, dropping blank entries
pub fn parse_topics(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .map(str::to_string)
        .collect()
}

/// How much background knowledge the listener is assumed to have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    Starter,
    #[default]
    Mid,
    Deep,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Starter => "Starter",
            Depth::Mid => "Mid",
            Depth::Deep => "Deep",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Depth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "starter" => Ok(Depth::Starter),
            "mid" => Ok(Depth::Mid),
            "deep" => Ok(Depth::Deep),
            other => anyhow::bail!("Invalid depth: {}. Use 'starter', 'mid', or 'deep'", other),
        }
    }
}

/// Length and audience level for one episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeParams {
    pub duration_minutes: u32,
    pub depth: Depth,
}

impl EpisodeParams {
    pub fn new(duration_minutes: u32, depth: Depth) -> anyhow::Result<Self> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            anyhow::bail!(
                "Duration must be between {} and {} minutes, got {}",
                MIN_DURATION_MINUTES,
                MAX_DURATION_MINUTES,
                duration_minutes
            );
        }
        Ok(Self {
            duration_minutes,
            depth,
        })
    }
}

impl Default for EpisodeParams {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_DURATION_MINUTES,
            depth: Depth::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopicSummaries {
    pub topic: String,
    pub summaries: Vec<Summary>,
}

/// Summaries keyed by topic, in the order topics were processed.
///
/// Only topics that produced at least one summary are kept.
#[derive(Debug, Clone, Default)]
pub struct SummaryBook {
    entries: Vec<TopicSummaries>,
}

impl SummaryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the summaries for a topic. A repeated topic replaces its
    /// earlier entry without moving it.
    pub fn insert(&mut self, topic: impl Into<String>, summaries: Vec<Summary>) {
        let topic = topic.into();
        if summaries.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|entry| entry.topic == topic) {
            Some(entry) => entry.summaries = summaries,
            None => self.entries.push(TopicSummaries { topic, summaries }),
        }
    }

    pub fn get(&self, topic: &str) -> Option<&[Summary]> {
        self.entries
            .iter()
            .find(|entry| entry.topic == topic)
            .map(|entry| entry.summaries.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicSummaries> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn total_summaries(&self) -> usize {
        self.entries.iter().map(|entry| entry.summaries.len()).sum()
    }
}

/// Fields written to the store for a finished episode
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub topics: String,
    pub duration: u32,
    pub depth: Depth,
    pub script: String,
    pub mp3_file: String,
}

/// A row of the `episodes` table
#[derive(Debug, Clone)]
pub struct EpisodeRecord {
    pub id: i64,
    pub topics: String,
    pub duration: u32,
    pub depth: String,
    pub script: String,
    pub mp3_file: String,
    pub created_at: String,
}
