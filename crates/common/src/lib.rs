pub mod analysis;
pub mod artifacts;
pub mod backend;
pub mod config;
pub mod error;

pub use analysis::AnalysisResult;
pub use artifacts::{ImageAsset, ProjectFiles};
pub use backend::GenerationBackend;
pub use config::{AppConfig, ConfigParser, Features};
pub use error::RemoteError;
