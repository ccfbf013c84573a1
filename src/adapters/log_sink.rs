//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A broker adapter publishing channel state would implement the same
//! trait.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let levels: heapless::String<8> =
                    t.levels.iter().map(|l| if l.is_high() { 'H' } else { 'L' }).collect();
                info!(
                    "TELEM | mode={} | outputs={} ({} on) | running={}",
                    t.mode,
                    levels,
                    t.high_count(),
                    t.running.len(),
                );
            }
            AppEvent::Started { mode, channels } => {
                info!("START | mode={} | channels={} | all LOW", mode, channels);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {} -> {}", from, to);
            }
            AppEvent::ProgramStarted(program) => {
                info!("PROG  | {} started", program);
            }
            AppEvent::ProgramsStopped { runners } => {
                info!("PROG  | stopped ({} runners joined), all LOW", runners);
            }
            AppEvent::CommandIgnored { command, active } => {
                debug!("MODE  | ignored {:?} while {}", command, active);
            }
            AppEvent::OutputFault { program, error } => match program {
                Some(p) => warn!("FAULT | {}: {}", p, error),
                None => warn!("FAULT | {}", error),
            },
            AppEvent::RunnerCrashed(program) => {
                error!("FAULT | runner {} crashed", program);
            }
        }
    }
}
