use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// One transcribed utterance as delivered by the backend. Immutable once
/// received; `timestamp` doubles as the ordering and pagination key, and
/// `audio_hash` is both the playback key and the audio URL path segment.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transcription {
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
    pub text: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub translation: Option<String>,
    pub audio_hash: String,
}

/// Page shape shared by the `recent` and `before/{timestamp}` queries.
/// The backend returns pages chronologically ascending (oldest first).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TranscriptionResponse {
    pub transcriptions: Vec<Transcription>,
}

/// Parses a backend timestamp. The server writes naive-UTC ISO 8601
/// (`2025-03-01T12:30:00.123456`, no offset); offset-bearing RFC 3339 is
/// accepted too and normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
}

mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

// The backend stores a failed translation as an empty string.
fn empty_as_none<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(d)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
