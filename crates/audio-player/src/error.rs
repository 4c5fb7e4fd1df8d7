use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("audio output unavailable: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("failed to decode clip: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("playback failed: {0}")]
    Playback(String),
}
