use crate::types::Transcription;

/// Decodes one live-event payload into a [`Transcription`].
///
/// Depending on the transport path the payload may arrive either as bare
/// JSON or still carrying its `data: ` framing marker, so the marker is
/// stripped defensively before decoding. A payload that fails to decode is
/// an error for the caller to drop (never a reason to tear the
/// subscription down).
pub fn decode_event_payload(raw: &str) -> Result<Transcription, serde_json::Error> {
    let payload = raw.trim_start();
    let payload = payload
        .strip_prefix("data:")
        .map(str::trim_start)
        .unwrap_or(payload);
    serde_json::from_str(payload)
}
