use anyhow::Context;
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::error::SpeechError;

/// Longest text the speech API accepts in one request
pub const MAX_TTS_CHARS: usize = 2000;

#[derive(Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
}

/// Turns a bounded chunk of text into audio bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>>;
}

pub struct DeepgramClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: Option<String>,
}

impl DeepgramClient {
    pub fn with_endpoint(
        api_key: String,
        base_url: impl Into<String>,
        model: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for DeepgramClient {
    async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>> {
        let url = match &self.model {
            Some(model) => format!(
                "{}/v1/speak?model={}",
                self.base_url,
                urlencoding::encode(model)
            ),
            None => format!("{}/v1/speak", self.base_url),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("content-type", "application/json")
            .json(&SpeakRequest { text })
            .send()
            .await
            .context("Failed to send request to Deepgram API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Deepgram API error: {} - {}", status, error_text);
        }

        let audio = response
            .bytes()
            .await
            .context("Failed to read Deepgram audio")?;

        Ok(audio.to_vec())
    }
}

/// Cut `text` into consecutive windows of at most `max_chars` characters.
///
/// Hard cut with no regard for words; the pieces concatenate back to `text`.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    if max_chars == 0 {
        return chunks;
    }

    let mut rest = text;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }

    chunks
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Synthesize a script into a single episode file inside `output_dir`.
///
/// Each chunk is written as `chunk_<i>_<timestamp>.mp3`. On success the first
/// chunk becomes `episode_<timestamp>.mp3` and the other chunk files are
/// removed, so only the first chunk's narration ends up in the episode. If a
/// chunk fails, files written so far are left behind.
pub async fn synthesize_episode(
    synthesizer: &dyn SpeechSynthesizer,
    script: &str,
    output_dir: &Path,
    mut on_chunk: impl FnMut(usize, usize, usize),
) -> Result<PathBuf, SpeechError> {
    let chunks = split_into_chunks(script, MAX_TTS_CHARS);
    if chunks.is_empty() {
        return Err(SpeechError::EmptyScript);
    }
    if chunks.len() > 1 {
        info!(
            chars = script.chars().count(),
            chunks = chunks.len(),
            "Script too long, splitting into chunks"
        );
    }

    let mut audio_files = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        on_chunk(index + 1, chunks.len(), chunk.chars().count());

        let audio = synthesizer.synthesize(chunk).await.map_err(|e| {
            error!(chunk = index + 1, error = %format!("{:#}", e), "Deepgram API text-to-speech failed");
            SpeechError::Chunk {
                chunk: index + 1,
                message: format!("{:#}", e),
            }
        })?;

        let chunk_file = output_dir.join(format!("chunk_{}_{}.mp3", index, timestamp()));
        fs::write(&chunk_file, &audio)?;
        debug!(file = %chunk_file.display(), bytes = audio.len(), "Wrote audio chunk");
        audio_files.push(chunk_file);
    }

    let final_mp3 = output_dir.join(format!("episode_{}.mp3", timestamp()));
    fs::rename(&audio_files[0], &final_mp3)?;
    for extra_file in &audio_files[1..] {
        fs::remove_file(extra_file)?;
    }

    Ok(final_mp3)
}
