//! Sequential Rotation Runner.
//!
//! Exactly one channel is HIGH at a time.  Channels take turns in registry
//! order, wrapping after the last one.  The ON duration is read once when
//! each ON phase begins; an edit made mid-phase applies from the next slot.
//! An ON duration of zero energises nothing and idles the slot for one tick.

use log::info;

use crate::app::ports::{EventSink, OutputPort};

use super::level::Level;
use super::runner::{RunnerCtx, Target};
use super::settings::Settings;

/// Round-robin cursor over the channel registry.
#[derive(Debug, Clone)]
pub struct Rotation {
    current: usize,
    len: usize,
}

impl Rotation {
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    /// Channel owning the current slot, `None` for an empty registry.
    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.current)
    }

    /// Move to the next slot.
    pub fn advance(&mut self) {
        if self.len > 0 {
            self.current = (self.current + 1) % self.len;
        }
    }
}

/// Loop until the token is canceled.
pub fn run<O, S>(ctx: &RunnerCtx<O, S>, settings: &Settings)
where
    O: OutputPort,
    S: EventSink + ?Sized,
{
    let mut rotation = Rotation::new(ctx.bank.channel_count());
    info!(
        "{}: rotation started over {} channels",
        ctx.program,
        ctx.bank.channel_count()
    );

    while let Some(channel) = rotation.current() {
        if ctx.is_canceled() {
            break;
        }
        let on_secs = settings.sequential_on_secs();
        if on_secs == 0 {
            if !ctx.sleep_ticks(1) {
                break;
            }
            rotation.advance();
            continue;
        }

        ctx.apply(Target::Channel(channel), Level::High);
        if !ctx.sleep_ticks(on_secs) {
            // Teardown has already forced the channel LOW.
            break;
        }
        ctx.apply(Target::Channel(channel), Level::Low);
        rotation.advance();
    }
    info!("{}: rotation stopped", ctx.program);
}
