//! Remotely-set timing values shared with the runners.
//!
//! The controller stores updates here in any mode; runners re-read them
//! (duty cycles every tick, the rotation at the start of each ON phase),
//! so edits reshape a running program without a restart.

use core::sync::atomic::{AtomicU32, Ordering};

use heapless::Vec;

use crate::pins::MAX_CHANNELS;

/// Snapshot of one duty-cycle timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseTimes {
    pub on_secs: u32,
    pub off_secs: u32,
}

impl PhaseTimes {
    pub const fn new(on_secs: u32, off_secs: u32) -> Self {
        Self { on_secs, off_secs }
    }

    /// Cycle length in ticks.
    pub const fn period(self) -> u32 {
        self.on_secs.saturating_add(self.off_secs)
    }
}

/// Live duty-cycle timing, editable while a runner reads it.
#[derive(Debug, Default)]
pub struct DutySpec {
    on_secs: AtomicU32,
    off_secs: AtomicU32,
}

impl DutySpec {
    pub fn new(times: PhaseTimes) -> Self {
        Self {
            on_secs: AtomicU32::new(times.on_secs),
            off_secs: AtomicU32::new(times.off_secs),
        }
    }

    pub fn load(&self) -> PhaseTimes {
        PhaseTimes {
            on_secs: self.on_secs.load(Ordering::Relaxed),
            off_secs: self.off_secs.load(Ordering::Relaxed),
        }
    }

    pub fn set_on(&self, secs: u32) {
        self.on_secs.store(secs, Ordering::Relaxed);
    }

    pub fn set_off(&self, secs: u32) {
        self.off_secs.store(secs, Ordering::Relaxed);
    }
}

/// Every timing parameter the controller exposes.
#[derive(Debug)]
pub struct Settings {
    timed: Vec<DutySpec, MAX_CHANNELS>,
    all_together: DutySpec,
    sequential_on_secs: AtomicU32,
}

impl Settings {
    /// All durations start at `default_secs`.
    pub fn new(channels: usize, default_secs: u32) -> Self {
        let defaults = PhaseTimes::new(default_secs, default_secs);
        let mut timed = Vec::new();
        for _ in 0..channels.min(MAX_CHANNELS) {
            let _ = timed.push(DutySpec::new(defaults));
        }
        Self {
            timed,
            all_together: DutySpec::new(defaults),
            sequential_on_secs: AtomicU32::new(default_secs),
        }
    }

    /// Per-channel spec used by Timed mode.
    pub fn timed(&self, channel: usize) -> Option<&DutySpec> {
        self.timed.get(channel)
    }

    /// Shared spec used by All-together mode.
    pub fn all_together(&self) -> &DutySpec {
        &self.all_together
    }

    pub fn sequential_on_secs(&self) -> u32 {
        self.sequential_on_secs.load(Ordering::Relaxed)
    }

    pub fn set_sequential_on_secs(&self, secs: u32) {
        self.sequential_on_secs.store(secs, Ordering::Relaxed);
    }
}
