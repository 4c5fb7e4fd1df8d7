mod client;
mod error;
mod sse;

pub use client::ApiClient;
pub use error::Error;
pub use sse::SseDecoder;

/// Fallback base address for local development, matching the original
/// backend's default bind.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment override for the backend base address.
pub const BASE_URL_ENV: &str = "RADIOLOG_BASE_URL";
