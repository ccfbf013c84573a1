//! Mock hardware adapters for integration tests.
//!
//! Records every output write so tests can assert on the full write
//! history without touching real GPIO registers.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sprayer::app::events::AppEvent;
use sprayer::app::ports::{EventSink, OutputPort};
use sprayer::app::service::ModeController;
use sprayer::config::SprayerConfig;
use sprayer::control::level::Level;
use sprayer::error::OutputError;

// ── MockOutputs ───────────────────────────────────────────────

/// Shared write log: `(channel, level)` in the order the port saw them.
pub type WriteLog = Arc<Mutex<Vec<(usize, Level)>>>;

/// Same log with the instant of every write.
pub type StampedLog = Arc<Mutex<Vec<(Instant, usize, Level)>>>;

pub struct MockOutputs {
    channels: usize,
    log: WriteLog,
    stamped: StampedLog,
    broken: Option<usize>,
    panics_on: Option<usize>,
}

#[allow(dead_code)]
impl MockOutputs {
    pub fn new(channels: usize) -> (Self, WriteLog) {
        let log = WriteLog::default();
        (
            Self {
                channels,
                log: Arc::clone(&log),
                stamped: StampedLog::default(),
                broken: None,
                panics_on: None,
            },
            log,
        )
    }

    /// Handle on the timestamped copy of the write log.
    pub fn stamped(&self) -> StampedLog {
        Arc::clone(&self.stamped)
    }

    /// Any write to `channel` panics (a crashing driver).
    pub fn with_panic_on(mut self, channel: usize) -> Self {
        self.panics_on = Some(channel);
        self
    }

    /// Every write to `channel` fails.
    pub fn with_broken(mut self, channel: usize) -> Self {
        self.broken = Some(channel);
        self
    }
}

impl OutputPort for MockOutputs {
    fn channel_count(&self) -> usize {
        self.channels
    }

    fn write(&mut self, channel: usize, level: Level) -> Result<(), OutputError> {
        if channel >= self.channels {
            return Err(OutputError::NoSuchChannel(channel));
        }
        if self.broken == Some(channel) {
            return Err(OutputError::WriteFailed(channel));
        }
        if self.panics_on == Some(channel) && level == Level::High {
            panic!("driver fault on channel {channel}");
        }
        self.log.lock().unwrap().push((channel, level));
        self.stamped.lock().unwrap().push((Instant::now(), channel, level));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AppEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Helpers ───────────────────────────────────────────────────

pub type TestController = ModeController<MockOutputs, RecordingSink>;

/// Config with a 1 ms tick and telemetry off.
pub fn fast_config() -> SprayerConfig {
    let mut config = SprayerConfig::default();
    config.tick_ms = 1;
    config.telemetry_interval_secs = 0;
    config
}

#[allow(dead_code)]
pub fn started(outputs: MockOutputs) -> (TestController, Arc<RecordingSink>) {
    started_with(outputs, &fast_config())
}

#[allow(dead_code)]
pub fn started_with(
    outputs: MockOutputs,
    config: &SprayerConfig,
) -> (TestController, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let mut controller = ModeController::new(outputs, Arc::clone(&sink), config);
    controller.start();
    (controller, sink)
}

/// Poll `cond` until it holds or two seconds pass.
#[allow(dead_code)]
pub fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

#[allow(dead_code)]
pub fn len(log: &WriteLog) -> usize {
    log.lock().unwrap().len()
}

#[allow(dead_code)]
pub fn snapshot(log: &WriteLog) -> Vec<(usize, Level)> {
    log.lock().unwrap().clone()
}
