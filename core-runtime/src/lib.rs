//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the service crates:
//! - Configuration loading and validation
//! - Logging and tracing setup
//! - Event bus for sync lifecycle events

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
