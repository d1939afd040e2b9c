//! # Native Bridge Implementations
//!
//! Server-side implementations of the generic bridge traits.
//!
//! - [`ReqwestHttpClient`]: `HttpClient` on top of `reqwest` with retry of
//!   5xx/429 responses
//! - [`RotatingFileSink`]: `LoggerSink` writing `app.log` / `error.log` with
//!   size-based rotation
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_native::{ReqwestHttpClient, RotatingFileSink};
//! use bridge_traits::LogLevel;
//! use std::time::Duration;
//!
//! let http = ReqwestHttpClient::with_timeout(Duration::from_secs(30))?;
//! let sink = RotatingFileSink::new("logs", LogLevel::Info).await?;
//! ```

mod file_sink;
mod http;

pub use file_sink::{RotatingFileSink, DEFAULT_BACKUPS, DEFAULT_MAX_BYTES};
pub use http::ReqwestHttpClient;
