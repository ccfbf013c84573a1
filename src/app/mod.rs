//! Application core — mode control, zero direct I/O.
//!
//! This module contains the business rules for the sprayer controller:
//! mode selection, command gating and the lifecycle of the control loops.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer testable without real relays.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
