//! Structured logging facility for eavstore
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured boundary macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use eavstore_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```
//!
//! Boundary events are owned by the engine layer. The store and the codec
//! only emit `tracing::debug!` for internals and `tracing::warn!` when a
//! legacy tolerance (skipped aggregate entry, missing value stored for
//! unparsable input) kicks in.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
