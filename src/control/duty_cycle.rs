//! Duty-Cycle Runner.
//!
//! Drives one channel (Timed mode) or every channel together (All-together
//! mode) through alternating ON/OFF phases, evaluated once per tick:
//!
//! ```text
//!   on=3 off=2   tick: 0 1 2 3 4 | 5 6 7 8 9 | …
//!               level: H H H L L | H H H L L | …
//! ```
//!
//! Phase times are re-read every tick, so remote edits reshape a running cycle.
//! The counter is not renormalised on an edit; a mid-cycle change may give
//! one irregular phase before the new pattern settles.  A counter that has
//! run past a shortened period wraps on the next tick.

use log::info;

use crate::app::ports::{EventSink, OutputPort};

use super::level::Level;
use super::runner::{RunnerCtx, Target};
use super::settings::{DutySpec, PhaseTimes};

/// Pure tick-by-tick duty-cycle state.
#[derive(Debug, Clone, Default)]
pub struct DutyCycle {
    count: u32,
}

impl DutyCycle {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Level for the current tick, then advance.
    ///
    /// `on_secs == 0` never yields HIGH; `off_secs == 0` with a non-zero
    /// on time never yields LOW.
    pub fn step(&mut self, times: PhaseTimes) -> Level {
        if self.count >= times.period() {
            self.count = 0;
        }
        let level = Level::from(self.count < times.on_secs);
        self.count = self.count.saturating_add(1);
        level
    }

    /// Ticks elapsed in the current cycle.
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Loop until the token is canceled.
pub fn run<O, S>(ctx: &RunnerCtx<O, S>, target: Target, spec: &DutySpec)
where
    O: OutputPort,
    S: EventSink + ?Sized,
{
    info!("{}: duty cycle started ({:?})", ctx.program, spec.load());
    let mut cycle = DutyCycle::new();
    while !ctx.is_canceled() {
        let level = cycle.step(spec.load());
        ctx.apply(target, level);
        if !ctx.sleep_ticks(1) {
            break;
        }
    }
    info!("{}: duty cycle stopped", ctx.program);
}
