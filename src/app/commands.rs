//! Inbound commands to the mode controller.
//!
//! These are decoded remote parameter updates (see
//! [`params::decode`](crate::params::decode)).  Actions are gated on the
//! active mode; timing values are plain data and are stored in any mode.

use crate::control::mode::{Mode, Program};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch mode.  Always accepted; always tears down first.
    SelectMode(Mode),

    /// Drive one channel directly (Manual mode only).
    SetManual { channel: usize, on: bool },

    /// Start a program (only while its mode is active).
    Start(Program),

    /// Stop every running program and force outputs off (only while the
    /// program's mode is active).
    Stop(Program),

    /// Timed-mode ON duration for one channel.
    SetTimedOn { channel: usize, secs: u32 },

    /// Timed-mode OFF duration for one channel.
    SetTimedOff { channel: usize, secs: u32 },

    /// Sequential-mode ON duration shared by every slot.
    SetSequentialOn(u32),

    /// All-together ON duration.
    SetAllTogetherOn(u32),

    /// All-together OFF duration.
    SetAllTogetherOff(u32),

    /// Tear down and leave the command loop.
    Shutdown,
}

impl Command {
    /// Mode that must be active for this command to take effect, or `None`
    /// if it is accepted in any mode.
    pub const fn governing_mode(&self) -> Option<Mode> {
        match self {
            Self::SetManual { .. } => Some(Mode::Manual),
            Self::Start(program) | Self::Stop(program) => Some(program.mode()),
            Self::SelectMode(_)
            | Self::SetTimedOn { .. }
            | Self::SetTimedOff { .. }
            | Self::SetSequentialOn(_)
            | Self::SetAllTogetherOn(_)
            | Self::SetAllTogetherOff(_)
            | Self::Shutdown => None,
        }
    }
}
