//! Control core — the mode-driven loop engine.
//!
//! ```text
//!   ModeController ──▶ CancelDomain ──token──▶ runners
//!                                              │
//!   OutputBank ◀──── guarded writes ───────────┘
//! ```
//!
//! Runners never touch the [`OutputPort`](crate::app::ports::OutputPort)
//! directly: every write goes through [`bank::OutputBank`], which checks
//! the writer's [`scope::CancelToken`] under the same lock that the
//! mode-switch teardown holds.  A superseded loop therefore cannot write
//! after the teardown has forced the outputs off.

pub mod bank;
pub mod duty_cycle;
pub mod level;
pub mod manual;
pub mod mode;
pub mod purge;
pub mod rotation;
pub mod runner;
pub mod scope;
pub mod settings;
