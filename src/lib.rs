//! Diagnostic HTTP service.
//!
//! Reports host metadata, answers with caller-chosen status codes and echoes
//! JSON payloads. Useful for checking that load balancers, proxies and
//! monitors pass traffic and status lines through unchanged.
//!
//! # Routes
//!
//! ```text
//! GET  /               {host, at}
//! GET  /details        hostname, arch, platform, cpus, totalmem, networkInterfaces
//! GET  /status         {status: "ok"}
//! GET  /status/{code}  answers with status `code`
//! PUT  /echo           the JSON body, unchanged
//! POST /echo           the JSON body, unchanged
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`host`]: Host information provider
//! - [`status`]: Forced status code classification
//! - [`format`]: Size and date formatting
//! - [`api`]: HTTP router and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`ops`]: Periodic process metrics
//! - [`server`]: Server lifecycle
//! - [`shutdown`]: Termination signal handling

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod metrics;
pub mod ops;
pub mod server;
pub mod shutdown;
pub mod status;

pub use config::Config;
pub use error::{ApiError, Result, ServerError};
