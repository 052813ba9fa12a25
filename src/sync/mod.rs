mod config;
mod error;
mod synchronizer;

pub use config::SyncConfig;
pub use error::SetupError;
pub use synchronizer::ImageTrackingSynchronizer;
