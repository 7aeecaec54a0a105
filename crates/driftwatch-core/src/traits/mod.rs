mod distance;
mod log_sink;
mod measurable;
mod state_cache;

pub use distance::IDistance;
pub use log_sink::{ILogSink, Labels};
pub use measurable::IMeasurable;
pub use state_cache::IStateCache;
