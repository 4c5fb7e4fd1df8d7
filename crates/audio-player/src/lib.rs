//! Single-playback audio coordination.
//!
//! At most one clip plays at any time, across every list item that can
//! trigger playback. The coordinator is an explicit, injectable value (not
//! a module-level singleton) generic over an [`AudioOutput`], so feeds can
//! coexist in tests with fake outputs. One shared output resource is
//! created per coordinator and reused for every clip — never one per item.

mod coordinator;
mod error;
mod output;
mod player;

pub use coordinator::{AudioOutput, Coordinator};
pub use error::Error;
pub use output::RodioOutput;
pub use player::{Player, PlayerEvent, PlayerHandle};
