pub mod stream_presence;

pub use stream_presence::{CycleReport, StreamPresenceService};
