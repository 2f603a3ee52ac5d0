//! Configuration module

pub mod settings;

pub use settings::{ApiConfig, LoggingConfig, OutputConfig, Settings};
