//! Remote parameters.
//!
//! The controller is driven entirely through named, remotely-settable
//! parameters grouped in nodes (`node/property`):
//!
//! | Node                  | Properties                                                   |
//! |-----------------------|--------------------------------------------------------------|
//! | `mode-selector`       | `mode`                                                       |
//! | `manual-control`      | `sprayer{i}`                                                 |
//! | `timed-control`       | `sprayer{i}-ontime`, `sprayer{i}-offtime`, `sprayer{i}-startstop` |
//! | `sequential-control`  | `sequential-ontime`, `sequential-startstop`                  |
//! | `alltogether-control` | `alltogether-ontime`, `alltogether-offtime`, `alltogether-startstop` |
//! | `purgeall-control`    | `purgeall-startstop`                                         |
//!
//! A transport thread decodes updates into [`Command`](crate::app::commands::Command)s
//! and hands them to the controller through a bounded [`queue::CommandQueue`];
//! transport callbacks never touch control state directly.

pub mod decode;
pub mod pump;
pub mod queue;
pub mod table;
