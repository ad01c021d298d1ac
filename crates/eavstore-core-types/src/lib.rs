//! Core types shared across eavstore facilities
//!
//! This crate provides the canonical field keys and event names used by
//! both the error facility and the logging facility, so every crate in the
//! workspace emits the same structured shape.

pub mod schema;
