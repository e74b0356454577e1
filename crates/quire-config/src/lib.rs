//! Quire Config - Layered configuration for quire.
//!
//! Configuration is assembled from, in increasing precedence:
//! 1. the embedded `defaults.toml`
//! 2. `/etc/quire/config.toml`
//! 3. `~/.quire/config.toml`
//! 4. a file named explicitly by the caller
//! 5. `QUIRE_*` environment variables
//!
//! Tables merge key by key; scalars and arrays replace. The result is
//! deserialized into [`Config`] and validated.
//!
//! # Example
//!
//! ```
//! use quire_config::{LoadOptions, load_with};
//!
//! let resolved = load_with(
//!     &LoadOptions::isolated().with_env("QUIRE_CACHE_ENABLED", "true"),
//! )
//! .unwrap();
//! assert!(resolved.config.cache.enabled);
//! assert_eq!(resolved.config.engine.everyone_principal, "everyone");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod env;
mod error;
mod loader;
mod merge;
mod types;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadOptions, ResolvedConfig, load, load_file, load_with};
pub use types::{AuditConfig, AuditSinkKind, CacheConfig, Config, EngineConfig, LoggingConfig};
pub use validate::validate;
