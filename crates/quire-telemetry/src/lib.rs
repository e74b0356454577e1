//! Quire Telemetry - Logging setup for quire.
//!
//! Installs a global `tracing` subscriber built from a [`LogConfig`]:
//! an `EnvFilter` from the level plus per-target directives, and one
//! `fmt` layer in the chosen format writing to stdout, stderr or a daily
//! rolling file.
//!
//! Decision audit events are emitted on the `quire::audit` target, so
//! they can be routed or silenced with a directive such as
//! `quire::audit=off`.
//!
//! # Example
//!
//! ```rust,no_run
//! use quire_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), quire_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("quire_authz=debug");
//!
//! // Keep the guard alive for the lifetime of the process.
//! let _guard = setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, LoggingGuard, setup_logging};
