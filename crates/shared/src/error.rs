use thiserror::Error;

/// Why a generative-text request produced no usable text
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Why speech synthesis produced no episode audio
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("nothing to synthesize: script is empty")]
    EmptyScript,
    #[error("text-to-speech failed for chunk {chunk}: {message}")]
    Chunk { chunk: usize, message: String },
    #[error("final audio file is missing: {0}")]
    MissingOutput(String),
    #[error("failed to write audio: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal outcomes that stop an episode run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Please enter at least one topic.")]
    NoTopics,
    #[error("No news summaries available to generate the podcast.")]
    NoSummaries,
    #[error("Script generation failed: {0}")]
    ScriptFailed(String),
    #[error("Audio generation failed: {0}")]
    AudioFailed(#[from] SpeechError),
}
