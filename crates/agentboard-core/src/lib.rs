//! Domain types shared across the agentboard crates: windows, transcripts, sessions,
//! and the enums that drive status and match rejection.

pub mod adapters;
pub mod error;
pub mod types;

pub use adapters::{EventKind, EventRole, ExtractedEvent, extract_event};
pub use error::CoreError;
pub use types::*;
