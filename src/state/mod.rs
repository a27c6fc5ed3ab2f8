mod reader;

pub use reader::{check_lock_marker, load_run_summary, read_disabled_reason};
