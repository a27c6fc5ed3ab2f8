mod status;
mod summary;

pub use status::{CheckResult, Severity};
pub use summary::{RunSummary, TimeSection, VersionSection};
