//! CLI library for testing purposes

pub mod config;
pub mod convert;
pub mod edit;
pub mod logging;
pub mod stats;
pub mod validation;
pub mod view;

pub use config::Config;
pub use logging::{LogConfig, init_logging};
