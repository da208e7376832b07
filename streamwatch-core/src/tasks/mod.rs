pub mod stream_presence;

pub use stream_presence::{run_stream_presence_loop, spawn_stream_presence_task};
