//! Utility functions and types.
//!
//! This module provides logging levels and editor configuration.

pub mod config;
pub mod logging;

pub use config::EditorConfig;
pub use logging::LogLevel;
