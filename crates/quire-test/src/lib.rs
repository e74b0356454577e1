//! Quire Test - Shared test utilities for the quire crates.
//!
//! This crate provides a canonical repository fixture, requester builders,
//! and failing or instrumented storage mocks. It is meant to be used as a
//! dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! quire-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use quire_core::Operation;
//! use quire_test::{test_engine, test_path, test_reader, test_roles_repository};
//!
//! #[tokio::test]
//! async fn test_reader_can_read_open_parent() {
//!     let repo = test_roles_repository();
//!     let engine = test_engine(&repo);
//!     let decision = engine
//!         .decide(&test_reader(), &test_path("/testparent1"), Operation::Read)
//!         .await
//!         .unwrap();
//!     assert!(decision.is_allowed());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
