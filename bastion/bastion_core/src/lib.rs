//! # Bastion Core
//!
//! `bastion_core` holds the pieces shared by every Bastion crate: the error
//! hierarchy, typed identifiers, logging helpers and the editor
//! configuration.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all Bastion components
//! - **id**: Typed numeric identifiers for policies and services
//! - **utils**: Log levels and configuration
//! - **macros**: `log_event!` for structured log lines

pub mod error;
pub mod id;
pub mod macros;
pub mod utils;

#[doc(hidden)]
pub use log;

pub use error::{Error, Result};
pub use id::{PolicyId, ServiceId};
pub use utils::{EditorConfig, LogLevel};
