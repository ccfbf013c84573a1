//! Operating modes.
//!
//! Exactly one mode is active at any instant.  The labels are the choice
//! values of the remote `mode-selector/mode` parameter.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mode {
    /// Direct per-channel ON/OFF.
    #[default]
    Manual = 0,
    /// Independent duty cycle per channel.
    Timed = 1,
    /// One channel at a time, round-robin.
    Sequential = 2,
    /// One shared duty cycle driving every channel.
    AllTogether = 3,
    /// Every channel ON until stopped.
    Purge = 4,
}

impl Mode {
    pub const COUNT: usize = 5;

    pub const ALL: [Mode; Self::COUNT] = [
        Mode::Manual,
        Mode::Timed,
        Mode::Sequential,
        Mode::AllTogether,
        Mode::Purge,
    ];

    /// Remote choice label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Timed => "Timed",
            Self::Sequential => "Sequential",
            Self::AllTogether => "All together",
            Self::Purge => "Purge",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.label() == s.trim())
            .ok_or(ParamError::InvalidChoice)
    }
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

/// A startable/stoppable control program.  Each one is governed by
/// exactly one mode and only accepts Start/Stop while that mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Program {
    /// Duty cycle on one channel (registry index).
    Timed(usize),
    /// Round-robin rotation over every channel.
    Sequential,
    /// One duty cycle shared by every channel.
    AllTogether,
    /// Every channel ON.
    Purge,
}

impl Program {
    /// The mode this program belongs to.
    pub const fn mode(self) -> Mode {
        match self {
            Self::Timed(_) => Mode::Timed,
            Self::Sequential => Mode::Sequential,
            Self::AllTogether => Mode::AllTogether,
            Self::Purge => Mode::Purge,
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timed(ch) => write!(f, "timed[{ch}]"),
            Self::Sequential => f.write_str("sequential"),
            Self::AllTogether => f.write_str("all-together"),
            Self::Purge => f.write_str("purge"),
        }
    }
}
