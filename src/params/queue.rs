//! Bounded command queue between the parameter transport and the
//! controller.
//!
//! ```text
//! ┌──────────────┐  Command   ┌──────────────────┐
//! │  Param pump  │───────────▶│  ModeController  │
//! │  (Pro core)  │            │  (command loop)  │
//! └──────────────┘            └──────────────────┘
//! ```
//!
//! Commands are applied strictly in arrival order by a single consumer.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::Command;

/// Queue depth.  Parameter traffic is human-paced; the depth only has to
/// absorb a burst of retained values at connect time.
pub const COMMAND_QUEUE_DEPTH: usize = 16;

pub struct CommandQueue {
    channel: Channel<CriticalSectionRawMutex, Command, COMMAND_QUEUE_DEPTH>,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without waiting.  Returns `false` (and drops `cmd`) when the
    /// queue is full.
    pub fn post(&self, cmd: Command) -> bool {
        if self.channel.try_send(cmd).is_err() {
            warn!("command queue full, dropping {:?}", cmd);
            return false;
        }
        true
    }

    /// Enqueue, waiting for room.
    pub async fn send(&self, cmd: Command) {
        self.channel.send(cmd).await;
    }

    /// Wait for the next command.
    pub async fn receive(&self) -> Command {
        self.channel.receive().await
    }

    pub fn try_receive(&self) -> Option<Command> {
        self.channel.try_receive().ok()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
