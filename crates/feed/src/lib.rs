pub mod input;
pub mod types;
pub mod view;

pub use input::decode_event_payload;
pub use types::{Transcription, TranscriptionResponse, parse_timestamp};
pub use view::{
    ConnectionStatus, DEFAULT_NEAR_BOTTOM_THRESHOLD, DEFAULT_RETAIN_MAX, FeedView, LiveArrival,
    LoadState, ScrollMode,
};
