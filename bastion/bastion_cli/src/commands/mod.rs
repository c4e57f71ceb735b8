//! Command implementations.

pub mod policy;
