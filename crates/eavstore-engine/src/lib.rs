//! eavstore engine - command orchestration
//!
//! Provides the logged command boundary that coordinates the value codec in
//! `eavstore-core` with the registry and item store in `eavstore-store`.

pub mod commands;
