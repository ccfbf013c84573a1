//! Sprayer controller library.
//!
//! Exposes the control core, parameter decoding and adapters for
//! integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
mod link_shims;
pub mod params;
pub mod pins;
