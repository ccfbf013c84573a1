//! Outbound application events.
//!
//! The [`ModeController`](super::service::ModeController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them: log to serial, publish channel
//! state to the broker, etc.

use heapless::Vec;
use serde::Serialize;

use crate::control::level::Level;
use crate::control::mode::{Mode, Program};
use crate::error::OutputError;
use crate::pins::MAX_CHANNELS;

use super::commands::Command;

/// Upper bound on simultaneously running programs (one duty cycle per
/// channel, plus the rotation and the shared cycle).
pub const MAX_PROGRAMS: usize = MAX_CHANNELS + 2;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller has started with every output forced off.
    Started { mode: Mode, channels: usize },

    /// The active mode changed.  Outputs were forced off in between.
    ModeChanged { from: Mode, to: Mode },

    /// A program was started under the live cancellation domain.
    ProgramStarted(Program),

    /// The domain was torn down; `runners` loops were stopped.
    ProgramsStopped { runners: usize },

    /// An action arrived for a mode that is not active.
    CommandIgnored { command: Command, active: Mode },

    /// An output write failed.  `None` for writes outside a runner.
    OutputFault {
        program: Option<Program>,
        error: OutputError,
    },

    /// A runner thread panicked.
    RunnerCrashed(Program),

    /// Periodic state snapshot.
    Telemetry(Telemetry),
}

/// A point-in-time snapshot suitable for logging or publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Telemetry {
    pub mode: Mode,
    pub levels: Vec<Level, MAX_CHANNELS>,
    pub running: Vec<Program, MAX_PROGRAMS>,
}

impl Telemetry {
    /// JSON payload for a transport to publish.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn high_count(&self) -> usize {
        self.levels.iter().filter(|l| l.is_high()).count()
    }
}
