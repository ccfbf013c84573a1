//! Channel Registry.
//!
//! Owns the [`OutputPort`] for the fixed, ordered list of channels and
//! remembers the level last written to each one.  Every write made on
//! behalf of a runner carries that runner's [`CancelToken`]; the token is
//! checked while the bank lock is held, and [`OutputBank::teardown`]
//! cancels the domain under the same lock.  Once a teardown returns, no
//! write from an earlier generation can reach the hardware.

use std::sync::{Mutex, MutexGuard, PoisonError};

use heapless::Vec;

use crate::app::ports::OutputPort;
use crate::error::OutputError;
use crate::pins::MAX_CHANNELS;

use super::level::Level;
use super::scope::{CancelDomain, CancelToken};

/// Result of a guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    /// The level reached the output.
    Applied,
    /// The writer's generation was superseded; nothing was written.
    Stale,
}

struct BankInner<O> {
    port: O,
    levels: Vec<Level, MAX_CHANNELS>,
}

impl<O: OutputPort> BankInner<O> {
    fn write(&mut self, channel: usize, level: Level) -> Result<(), OutputError> {
        let slot = self
            .levels
            .get_mut(channel)
            .ok_or(OutputError::NoSuchChannel(channel))?;
        self.port.write(channel, level)?;
        *slot = level;
        Ok(())
    }

    /// Drive every channel to `level`.  A failing channel does not stop the
    /// pass; the first failure is returned once every channel was tried.
    fn write_every(&mut self, level: Level) -> Result<(), OutputError> {
        let mut first_err = None;
        for channel in 0..self.levels.len() {
            if let Err(e) = self.write(channel, level) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

pub struct OutputBank<O> {
    inner: Mutex<BankInner<O>>,
}

impl<O: OutputPort> OutputBank<O> {
    /// Wrap an opened port.  Channels beyond [`MAX_CHANNELS`] are ignored.
    pub fn new(port: O) -> Self {
        let count = port.channel_count().min(MAX_CHANNELS);
        let mut levels = Vec::new();
        for _ in 0..count {
            let _ = levels.push(Level::Low);
        }
        Self {
            inner: Mutex::new(BankInner { port, levels }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BankInner<O>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn channel_count(&self) -> usize {
        self.lock().levels.len()
    }

    /// Last written level of every channel, in registry order.
    pub fn levels(&self) -> Vec<Level, MAX_CHANNELS> {
        self.lock().levels.clone()
    }

    pub fn level(&self, channel: usize) -> Option<Level> {
        self.lock().levels.get(channel).copied()
    }

    /// Write one channel if `token` is still live.
    pub fn write(
        &self,
        token: &CancelToken,
        channel: usize,
        level: Level,
    ) -> Result<Write, OutputError> {
        let mut inner = self.lock();
        if token.is_canceled() {
            return Ok(Write::Stale);
        }
        inner.write(channel, level)?;
        Ok(Write::Applied)
    }

    /// Write every channel in one pass if `token` is still live.
    ///
    /// Every channel is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub fn write_all(&self, token: &CancelToken, level: Level) -> Result<Write, OutputError> {
        let mut inner = self.lock();
        if token.is_canceled() {
            return Ok(Write::Stale);
        }
        inner.write_every(level).map(|()| Write::Applied)
    }

    /// Cancel `domain` and force every channel LOW, atomically with
    /// respect to guarded writes.
    ///
    /// Every channel is attempted even if an earlier one fails; the first
    /// failure is returned.  Returns the new live generation otherwise.
    pub fn teardown(&self, domain: &CancelDomain) -> Result<u64, OutputError> {
        let mut inner = self.lock();
        let generation = domain.cancel();
        inner.write_every(Level::Low).map(|()| generation)
    }
}
