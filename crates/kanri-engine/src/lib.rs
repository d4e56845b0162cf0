pub mod config;
pub mod engine;
pub mod error;
pub mod files;

pub use config::EngineConfig;
pub use engine::ChangeEngine;
pub use error::EngineError;
pub use files::{FileStorage, LocalFileStorage};
