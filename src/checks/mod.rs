mod aggregate;
mod duration;
mod runner;
mod threshold;

pub use aggregate::MonitoringStatus;
pub use duration::format_duration;
pub use runner::AgentCheck;
pub use threshold::{ThresholdPair, evaluate};
