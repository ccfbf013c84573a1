//! Output level of a channel.

use embedded_hal::digital::PinState;
use serde::{Deserialize, Serialize};

/// Level last written to a channel.  The written value is authoritative;
/// there is no read-back from the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Level {
    High,
    #[default]
    Low,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

impl From<bool> for Level {
    fn from(on: bool) -> Self {
        if on { Self::High } else { Self::Low }
    }
}

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::High => PinState::High,
            Level::Low => PinState::Low,
        }
    }
}
