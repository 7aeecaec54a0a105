//! Log sink implementations.

mod recording;
mod tracing_sink;

pub use recording::{RecordingSink, SinkRecord};
pub use tracing_sink::TracingSink;
