//! Mode controller — the hexagonal core.
//!
//! [`ModeController`] owns the active [`Mode`], the cancellation domain and
//! the handles of every running control loop.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! construction, making the whole controller testable with mock adapters.
//!
//! ```text
//!  CommandQueue ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                   │      ModeController       │
//!   OutputPort ◀────│ gate · teardown · spawn   │
//!                   └──────────────────────────┘
//! ```
//!
//! Every mode switch and every `Stop` goes through one teardown path:
//! cancel the domain and force all outputs LOW (atomically with respect to
//! runner writes), then join every runner.  A command is only processed
//! after the previous teardown has finished, so a superseded loop can
//! never race a freshly started one for the same output.

use core::time::Duration;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::config::SprayerConfig;
use crate::control::bank::{OutputBank, Write};
use crate::control::duty_cycle;
use crate::control::manual;
use crate::control::mode::{Mode, Program};
use crate::control::purge;
use crate::control::rotation;
use crate::control::runner::{RunnerCtx, Target};
use crate::control::scope::CancelDomain;
use crate::control::settings::Settings;
use crate::drivers::task_pin;
use crate::error::{Error, OutputError, ParamError};
use crate::params::queue::CommandQueue;

use super::commands::Command;
use super::events::{AppEvent, Telemetry};
use super::ports::{EventSink, OutputPort};

/// What became of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command took effect.
    Applied,
    /// The command's mode is not active; nothing happened.
    Ignored,
    /// The command was accepted but could not be carried out.
    Failed(Error),
    /// Shutdown was requested; outputs are off and runners joined.
    Shutdown,
}

/// A supervised control loop.
struct RunnerHandle {
    program: Program,
    generation: u64,
    join: JoinHandle<()>,
}

// ───────────────────────────────────────────────────────────────
// ModeController
// ───────────────────────────────────────────────────────────────

pub struct ModeController<O: OutputPort, S: EventSink + ?Sized> {
    mode: Mode,
    bank: Arc<OutputBank<O>>,
    domain: CancelDomain,
    settings: Arc<Settings>,
    sink: Arc<S>,
    tick: Duration,
    telemetry_every: Option<Duration>,
    runners: Vec<RunnerHandle>,
}

impl<O, S> ModeController<O, S>
where
    O: OutputPort + 'static,
    S: EventSink + ?Sized + 'static,
{
    /// Construct the controller around an opened output port.
    ///
    /// Does **not** touch the outputs; call [`start`](Self::start) next.
    pub fn new(port: O, sink: Arc<S>, config: &SprayerConfig) -> Self {
        let bank = OutputBank::new(port);
        let settings = Settings::new(bank.channel_count(), config.default_phase_secs);
        let telemetry_every = (config.telemetry_interval_secs > 0)
            .then(|| Duration::from_secs(u64::from(config.telemetry_interval_secs)));

        Self {
            mode: Mode::default(),
            bank: Arc::new(bank),
            domain: CancelDomain::new(),
            settings: Arc::new(settings),
            sink,
            tick: config.tick(),
            telemetry_every,
            runners: Vec::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Force every output off and announce the initial mode.
    pub fn start(&mut self) {
        self.teardown();
        self.sink.emit(&AppEvent::Started {
            mode: self.mode,
            channels: self.bank.channel_count(),
        });
        info!(
            "ModeController started in {} with {} channels",
            self.mode,
            self.bank.channel_count()
        );
    }

    /// Drain `queue` until a [`Command::Shutdown`] arrives.
    ///
    /// Emits telemetry every `telemetry_interval_secs` while waiting.
    pub fn run(&mut self, queue: &CommandQueue) {
        let mut next_report = self.telemetry_every.map(|every| Instant::now() + every);

        loop {
            let command = match next_report {
                None => futures_lite::future::block_on(queue.receive()),
                Some(due) => {
                    let wait = due.saturating_duration_since(Instant::now());
                    let next = futures_lite::future::block_on(futures_lite::future::or(
                        async { Some(queue.receive().await) },
                        async {
                            async_io_mini::Timer::after(wait).await;
                            None
                        },
                    ));
                    if Instant::now() >= due {
                        self.sink.emit(&AppEvent::Telemetry(self.telemetry()));
                        next_report = self.telemetry_every.map(|every| due + every);
                    }
                    match next {
                        Some(command) => command,
                        None => continue,
                    }
                }
            };

            if self.handle(command) == Outcome::Shutdown {
                info!("ModeController: shutdown");
                return;
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one command.
    ///
    /// Actions whose governing mode is not active are ignored without
    /// error: stale traffic from an inactive mode's controls is routine.
    pub fn handle(&mut self, command: Command) -> Outcome {
        self.reap();

        if let Some(required) = command.governing_mode() {
            if required != self.mode {
                debug!("ignored {:?} (active mode: {})", command, self.mode);
                self.sink.emit(&AppEvent::CommandIgnored {
                    command,
                    active: self.mode,
                });
                return Outcome::Ignored;
            }
        }

        let result = match command {
            Command::SelectMode(mode) => {
                self.set_mode(mode);
                Ok(())
            }
            Command::SetManual { channel, on } => {
                let token = self.domain.token();
                self.report(manual::set(&self.bank, &token, channel, on))
            }
            Command::Start(program) => self.start_program(program),
            Command::Stop(program) => {
                info!("{}: stop requested", program);
                self.teardown();
                Ok(())
            }
            Command::SetTimedOn { channel, secs } => self
                .timed_spec(channel)
                .map(|spec| spec.set_on(secs)),
            Command::SetTimedOff { channel, secs } => self
                .timed_spec(channel)
                .map(|spec| spec.set_off(secs)),
            Command::SetSequentialOn(secs) => {
                self.settings.set_sequential_on_secs(secs);
                Ok(())
            }
            Command::SetAllTogetherOn(secs) => {
                self.settings.all_together().set_on(secs);
                Ok(())
            }
            Command::SetAllTogetherOff(secs) => {
                self.settings.all_together().set_off(secs);
                Ok(())
            }
            Command::Shutdown => {
                self.teardown();
                return Outcome::Shutdown;
            }
        };

        match result {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                warn!("{:?} failed: {}", command, e);
                Outcome::Failed(e)
            }
        }
    }

    /// Switch mode.  Any mode may follow any other, and every switch passes
    /// through the forced-off teardown, including reselecting the same mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.teardown();
        let from = self.mode;
        self.mode = mode;
        info!("Mode: {} -> {}", from, mode);
        self.sink.emit(&AppEvent::ModeChanged { from, to: mode });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Live programs under the current domain.
    pub fn running(&self) -> impl Iterator<Item = Program> + '_ {
        let generation = self.domain.generation();
        self.runners
            .iter()
            .filter(move |r| r.generation == generation && !r.join.is_finished())
            .map(|r| r.program)
    }

    pub fn is_running(&self, program: Program) -> bool {
        self.running().any(|p| p == program)
    }

    /// Shared timing values (for read-back).
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn telemetry(&self) -> Telemetry {
        let mut running = heapless::Vec::new();
        for program in self.running() {
            let _ = running.push(program);
        }
        Telemetry {
            mode: self.mode,
            levels: self.bank.levels(),
            running,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn start_program(&mut self, program: Program) -> Result<(), Error> {
        if self.is_running(program) {
            debug!("{}: already running", program);
            return Ok(());
        }

        let token = self.domain.token();
        let name = match program {
            Program::Purge => {
                info!("purge: all channels on");
                self.report(purge::start(&self.bank, &token))?;
                self.sink.emit(&AppEvent::ProgramStarted(program));
                return Ok(());
            }
            Program::Timed(channel) => {
                self.timed_spec(channel)?;
                "timed\0"
            }
            Program::AllTogether => "all-together\0",
            Program::Sequential => "sequential\0",
        };

        let generation = token.generation();
        let ctx = RunnerCtx {
            program,
            bank: Arc::clone(&self.bank),
            sink: Arc::clone(&self.sink),
            token,
            tick: self.tick,
        };
        let settings = Arc::clone(&self.settings);

        let join = task_pin::spawn_runner(name, move || match program {
            Program::Timed(channel) => {
                if let Some(spec) = settings.timed(channel) {
                    duty_cycle::run(&ctx, Target::Channel(channel), spec);
                }
            }
            Program::AllTogether => duty_cycle::run(&ctx, Target::All, settings.all_together()),
            Program::Sequential => rotation::run(&ctx, &settings),
            Program::Purge => {}
        })
        .map_err(|e| {
            error!("{}: runner spawn failed: {}", program, e);
            Error::Spawn("runner thread")
        })?;

        self.runners.push(RunnerHandle {
            program,
            generation,
            join,
        });
        info!("{}: started (generation {})", program, generation);
        self.sink.emit(&AppEvent::ProgramStarted(program));
        Ok(())
    }

    /// Cancel the domain, force every output off, and join every runner.
    fn teardown(&mut self) {
        match self.bank.teardown(&self.domain) {
            Ok(generation) => debug!("teardown: generation {} live", generation),
            Err(error) => {
                warn!("teardown: output fault: {}", error);
                self.sink.emit(&AppEvent::OutputFault {
                    program: None,
                    error,
                });
            }
        }

        let runners = self.runners.len();
        for runner in self.runners.drain(..) {
            join_runner(&*self.sink, runner);
        }
        if runners > 0 {
            self.sink.emit(&AppEvent::ProgramsStopped { runners });
        }
    }

    /// Join runners that exited on their own (only a panic does that).
    fn reap(&mut self) {
        let mut i = 0;
        while i < self.runners.len() {
            if self.runners[i].join.is_finished() {
                let runner = self.runners.swap_remove(i);
                join_runner(&*self.sink, runner);
            } else {
                i += 1;
            }
        }
    }

    fn timed_spec(&self, channel: usize) -> Result<&crate::control::settings::DutySpec, Error> {
        self.settings
            .timed(channel)
            .ok_or(Error::Param(ParamError::NoSuchChannel(channel)))
    }

    /// Surface a single-pass write failure as an event.
    fn report(&self, result: Result<Write, OutputError>) -> Result<(), Error> {
        match result {
            Ok(Write::Applied | Write::Stale) => Ok(()),
            Err(error) => {
                self.sink.emit(&AppEvent::OutputFault {
                    program: None,
                    error,
                });
                Err(error.into())
            }
        }
    }
}

/// Join a runner, reporting a panic as [`AppEvent::RunnerCrashed`].
fn join_runner<S: EventSink + ?Sized>(sink: &S, runner: RunnerHandle) {
    if runner.join.join().is_err() {
        error!("{}: runner panicked", runner.program);
        sink.emit(&AppEvent::RunnerCrashed(runner.program));
    }
}

impl<O: OutputPort, S: EventSink + ?Sized> Drop for ModeController<O, S> {
    fn drop(&mut self) {
        // Runners exit once the domain is canceled; outputs are left as the
        // last teardown wrote them.
        self.domain.cancel();
        for runner in self.runners.drain(..) {
            join_runner(&*self.sink, runner);
        }
    }
}
