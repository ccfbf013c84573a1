//! Shared plumbing for the control loops.
//!
//! A [`RunnerCtx`] bundles what every loop needs: the bank it writes to,
//! the token it writes under, the tick length, and the sink for faults.
//! Output faults are reported and the loop carries on with its next sleep;
//! one broken relay must not stop the others.

use core::time::Duration;
use std::sync::Arc;

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, OutputPort};
use crate::error::OutputError;

use super::bank::{OutputBank, Write};
use super::level::Level;
use super::mode::Program;
use super::scope::CancelToken;

/// Which channels a write addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Channel(usize),
    All,
}

pub struct RunnerCtx<O, S: ?Sized> {
    pub program: Program,
    pub bank: Arc<OutputBank<O>>,
    pub sink: Arc<S>,
    pub token: CancelToken,
    pub tick: Duration,
}

impl<O: OutputPort, S: EventSink + ?Sized> RunnerCtx<O, S> {
    /// Guarded write; faults are reported, stale writes dropped silently.
    pub fn apply(&self, target: Target, level: Level) -> Option<Write> {
        let result = match target {
            Target::Channel(channel) => self.bank.write(&self.token, channel, level),
            Target::All => self.bank.write_all(&self.token, level),
        };
        match result {
            Ok(write) => Some(write),
            Err(error) => {
                self.fault(error);
                None
            }
        }
    }

    pub fn fault(&self, error: OutputError) {
        warn!("{}: output fault: {}", self.program, error);
        self.sink.emit(&AppEvent::OutputFault {
            program: Some(self.program),
            error,
        });
    }

    /// Sleep `ticks` ticks.  Returns `false` once the token is canceled.
    pub fn sleep_ticks(&self, ticks: u32) -> bool {
        self.token.sleep(self.tick.saturating_mul(ticks))
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }
}
