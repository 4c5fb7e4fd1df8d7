use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::{Stream, StreamExt};
use radiolog_feed::{Transcription, TranscriptionResponse, decode_event_payload};
use url::Url;

use crate::error::Error;
use crate::sse::SseDecoder;
use crate::{BASE_URL_ENV, DEFAULT_BASE_URL};

/// Read-only client for the transcription backend: the two historical
/// queries, audio retrieval, and the live event subscription. No retries,
/// no caching; failures propagate to the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        // Parse for validation only; paths are formatted onto the
        // normalized string form.
        Url::parse(base_url)?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        })
    }

    /// Base address from `RADIOLOG_BASE_URL`, falling back to the local
    /// development default.
    pub fn from_env() -> Result<Self, Error> {
        let base = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base)
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `GET /api/transcriptions/recent` — the initial historical page.
    pub async fn fetch_recent(&self) -> Result<TranscriptionResponse, Error> {
        self.get_page(format!("{}/api/transcriptions/recent", self.base))
            .await
    }

    /// `GET /api/transcriptions/before/{timestamp}` — the page strictly
    /// preceding `before`; the item exactly at `before` is never included.
    pub async fn fetch_before(
        &self,
        before: DateTime<Utc>,
    ) -> Result<TranscriptionResponse, Error> {
        let cursor = before.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        self.get_page(format!("{}/api/transcriptions/before/{cursor}", self.base))
            .await
    }

    /// URL of one audio clip, keyed by its content hash.
    pub fn audio_url(&self, audio_hash: &str) -> String {
        format!("{}/api/audio/{audio_hash}", self.base)
    }

    /// Retrieves the MP3 bytes of one clip for local playback.
    pub async fn fetch_audio(&self, audio_hash: &str) -> Result<Vec<u8>, Error> {
        let response = self.http.get(self.audio_url(audio_hash)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Opens the live event stream at `/api/events`.
    ///
    /// The future resolves once the response headers arrive — that is the
    /// stream-open handshake callers key their `Establishing -> Live`
    /// transition on. Each yielded item is one transcription; payloads that
    /// fail to decode are dropped with a warning rather than terminating
    /// the subscription. Dropping the stream tears the subscription down.
    pub async fn subscribe(
        &self,
    ) -> Result<impl Stream<Item = Result<Transcription, Error>> + Send + use<>, Error> {
        let response = self
            .http
            .get(format!("{}/api/events", self.base))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let mut chunks = response.bytes_stream();
        Ok(async_stream::stream! {
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = chunks.next().await {
                match chunk {
                    Ok(bytes) => {
                        for payload in decoder.feed(&bytes) {
                            match decode_event_payload(&payload) {
                                Ok(transcription) => yield Ok(transcription),
                                Err(error) => {
                                    tracing::warn!(%error, "dropping undecodable event payload");
                                }
                            }
                        }
                    }
                    Err(error) => {
                        yield Err(Error::Http(error));
                        break;
                    }
                }
            }
        })
    }

    async fn get_page(&self, url: String) -> Result<TranscriptionResponse, Error> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
