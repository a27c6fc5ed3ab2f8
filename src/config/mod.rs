mod settings;

pub use settings::{CheckConfig, FilesConfig, ThresholdsConfig};
