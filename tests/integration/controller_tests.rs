//! Integration tests for the ModeController → runners → outputs pipeline.
//!
//! Runners tick every millisecond; assertions are made on the recorded
//! write history rather than on wall-clock timing.

use std::time::{Duration, Instant};

use sprayer::app::commands::Command;
use sprayer::app::events::AppEvent;
use sprayer::app::service::Outcome;
use sprayer::control::level::Level::{self, High as H, Low as L};
use sprayer::control::mode::{Mode, Program};
use sprayer::error::{Error, OutputError};

use super::mock_hw::{
    MockOutputs, StampedLog, TestController, fast_config, len, snapshot, started, started_with,
    wait_for,
};

const ALL_LOW: [(usize, Level); 3] = [(0, L), (1, L), (2, L)];

fn all_actions() -> [Command; 9] {
    [
        Command::SetManual { channel: 0, on: true },
        Command::Start(Program::Timed(0)),
        Command::Stop(Program::Timed(0)),
        Command::Start(Program::Sequential),
        Command::Stop(Program::Sequential),
        Command::Start(Program::AllTogether),
        Command::Stop(Program::AllTogether),
        Command::Start(Program::Purge),
        Command::Stop(Program::Purge),
    ]
}

fn assert_quiescent(c: &TestController, log: &super::mock_hw::WriteLog) {
    assert_eq!(c.telemetry().high_count(), 0, "every output must be LOW");
    assert_eq!(c.running().count(), 0, "no runner may survive teardown");
    let frozen = len(log);
    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(len(log), frozen, "no write may follow teardown");
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_forces_every_output_low() {
    let (outputs, log) = MockOutputs::new(3);
    let (c, sink) = started(outputs);
    assert_eq!(c.mode(), Mode::Manual);
    assert_eq!(snapshot(&log), ALL_LOW);
    assert!(matches!(
        sink.events().first(),
        Some(AppEvent::Started { mode: Mode::Manual, channels: 3 })
    ));
}

// ── Timed ─────────────────────────────────────────────────────

#[test]
fn timed_channel_follows_on_off_pattern() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, _sink) = started(outputs);
    c.handle(Command::SelectMode(Mode::Timed));
    c.handle(Command::SetTimedOn { channel: 0, secs: 3 });
    c.handle(Command::SetTimedOff { channel: 0, secs: 2 });

    let base = len(&log);
    assert_eq!(c.handle(Command::Start(Program::Timed(0))), Outcome::Applied);
    assert!(c.is_running(Program::Timed(0)));
    assert!(wait_for(|| len(&log) >= base + 12));
    c.handle(Command::Stop(Program::Timed(0)));

    let writes = snapshot(&log);
    let (runner, tail) = writes[base..].split_at(writes.len() - base - 3);
    assert_eq!(tail, ALL_LOW);
    let pattern = [H, H, H, L, L];
    for (i, (channel, level)) in runner.iter().enumerate() {
        assert_eq!(*channel, 0);
        assert_eq!(*level, pattern[i % pattern.len()], "tick {i}");
    }
    assert_quiescent(&c, &log);
}

#[test]
fn timed_channels_run_independently_and_stop_together() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, _sink) = started(outputs);
    c.handle(Command::SelectMode(Mode::Timed));
    c.handle(Command::SetTimedOn { channel: 1, secs: 0 });
    c.handle(Command::Start(Program::Timed(0)));
    c.handle(Command::Start(Program::Timed(1)));
    assert_eq!(c.running().count(), 2);

    let base = len(&log);
    assert!(wait_for(|| {
        let w = snapshot(&log);
        w[base..].iter().filter(|(ch, _)| *ch == 1).count() >= 5
    }));
    // Channel 1 has a zero on time and is never energised.
    assert!(snapshot(&log)[base..].iter().all(|w| *w != (1, H)));

    // Stop is domain-wide within the mode.
    c.handle(Command::Stop(Program::Timed(1)));
    assert_quiescent(&c, &log);
}

#[test]
fn starting_a_running_program_is_a_no_op() {
    let (outputs, _log) = MockOutputs::new(3);
    let (mut c, sink) = started(outputs);
    c.handle(Command::SelectMode(Mode::Timed));
    c.handle(Command::Start(Program::Timed(2)));
    c.handle(Command::Start(Program::Timed(2)));
    assert_eq!(c.running().count(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ProgramStarted(Program::Timed(2)))),
        1
    );
}

// ── Sequential ────────────────────────────────────────────────

#[test]
fn sequential_rotates_one_channel_at_a_time() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, _sink) = started(outputs);
    c.handle(Command::SelectMode(Mode::Sequential));
    c.handle(Command::SetSequentialOn(1));

    let base = len(&log);
    c.handle(Command::Start(Program::Sequential));
    assert!(wait_for(|| len(&log) >= base + 14));
    c.handle(Command::Stop(Program::Sequential));

    let writes = snapshot(&log);
    let runner = &writes[base..writes.len() - 3];
    let pattern = [(0, H), (0, L), (1, H), (1, L), (2, H), (2, L)];
    for (i, write) in runner.iter().enumerate() {
        assert_eq!(*write, pattern[i % pattern.len()], "write {i}");
    }
    assert_quiescent(&c, &log);
}

/// Instant of the first `(channel, level)` write at or after index `from`.
fn first_write(log: &StampedLog, from: usize, write: (usize, Level)) -> Option<Instant> {
    log.lock()
        .unwrap()
        .iter()
        .skip(from)
        .find(|(_, ch, lvl)| (*ch, *lvl) == write)
        .map(|(at, _, _)| *at)
}

#[test]
fn sequential_phases_last_their_on_time_with_one_channel_high() {
    let mut config = fast_config();
    config.tick_ms = 10;
    let (outputs, log) = MockOutputs::new(3);
    let stamped = outputs.stamped();
    let (mut c, _sink) = started_with(outputs, &config);
    c.handle(Command::SelectMode(Mode::Sequential));
    c.handle(Command::SetSequentialOn(2));

    let base = len(&log);
    c.handle(Command::Start(Program::Sequential));
    assert!(wait_for(|| len(&log) >= base + 8));
    c.handle(Command::Stop(Program::Sequential));

    let writes = snapshot(&log);
    let runner = &writes[base..writes.len() - 3];
    let pattern = [(0, H), (0, L), (1, H), (1, L), (2, H), (2, L)];
    for (i, write) in runner.iter().enumerate() {
        assert_eq!(*write, pattern[i % pattern.len()], "write {i}");
    }

    // At most one channel is HIGH after every write.
    let mut levels = [L; 3];
    for (i, (ch, level)) in writes.iter().enumerate() {
        levels[*ch] = *level;
        assert!(levels.iter().filter(|l| **l == H).count() <= 1, "write {i}");
    }

    // Every completed ON phase spans two ticks.
    let stamped = stamped.lock().unwrap();
    for pair in stamped[base..stamped.len() - 3].chunks_exact(2) {
        let ((on_at, on_ch, on_lvl), (off_at, off_ch, off_lvl)) = (pair[0], pair[1]);
        assert_eq!((on_ch, on_lvl, off_ch, off_lvl), (on_ch, H, on_ch, L));
        assert!(off_at - on_at >= Duration::from_millis(20));
    }
}

#[test]
fn sequential_on_time_edit_applies_from_the_next_phase() {
    let mut config = fast_config();
    config.tick_ms = 10;
    let (outputs, _log) = MockOutputs::new(3);
    let stamped = outputs.stamped();
    let (mut c, _sink) = started_with(outputs, &config);
    c.handle(Command::SelectMode(Mode::Sequential));
    c.handle(Command::SetSequentialOn(10));

    let base = stamped.lock().unwrap().len();
    c.handle(Command::Start(Program::Sequential));
    assert!(wait_for(|| first_write(&stamped, base, (0, H)).is_some()));
    c.handle(Command::SetSequentialOn(1));
    assert!(wait_for(|| first_write(&stamped, base, (1, L)).is_some()));
    c.handle(Command::Stop(Program::Sequential));

    let on0 = first_write(&stamped, base, (0, H)).unwrap();
    let off0 = first_write(&stamped, base, (0, L)).unwrap();
    let on1 = first_write(&stamped, base, (1, H)).unwrap();
    let off1 = first_write(&stamped, base, (1, L)).unwrap();
    assert!(off0 - on0 >= Duration::from_millis(100), "phase in flight keeps 10 ticks");
    assert!(off1 - on1 < Duration::from_millis(100), "next phase uses 1 tick");
}

#[test]
fn sequential_with_zero_on_time_energises_nothing() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, _sink) = started(outputs);
    c.handle(Command::SelectMode(Mode::Sequential));
    c.handle(Command::SetSequentialOn(0));
    let base = len(&log);
    c.handle(Command::Start(Program::Sequential));
    std::thread::sleep(Duration::from_millis(20));
    assert!(c.is_running(Program::Sequential));
    assert_eq!(len(&log), base);
    c.handle(Command::Stop(Program::Sequential));
    assert_quiescent(&c, &log);
}

// ── All together ──────────────────────────────────────────────

#[test]
fn all_together_drives_every_channel_in_step() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, _sink) = started(outputs);
    c.handle(Command::SelectMode(Mode::AllTogether));
    c.handle(Command::SetAllTogetherOn(1));
    c.handle(Command::SetAllTogetherOff(1));

    let base = len(&log);
    c.handle(Command::Start(Program::AllTogether));
    assert!(wait_for(|| len(&log) >= base + 12));
    c.handle(Command::Stop(Program::AllTogether));

    let writes = snapshot(&log);
    let runner = &writes[base..writes.len() - 3];
    for (pass, chunk) in runner.chunks(3).enumerate() {
        let level = if pass % 2 == 0 { H } else { L };
        let expected: Vec<_> = (0..chunk.len()).map(|ch| (ch, level)).collect();
        assert_eq!(chunk, expected.as_slice(), "pass {pass}");
    }
    assert_quiescent(&c, &log);
}

#[test]
fn all_together_keeps_driving_channels_past_a_broken_one() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, sink) = started(outputs.with_broken(0));
    c.handle(Command::SelectMode(Mode::AllTogether));
    c.handle(Command::SetAllTogetherOn(1));
    c.handle(Command::SetAllTogetherOff(0));

    let base = len(&log);
    c.handle(Command::Start(Program::AllTogether));
    assert!(wait_for(|| snapshot(&log)[base..].contains(&(2, H))));
    assert_eq!(c.telemetry().levels.as_slice(), &[L, H, H]);
    assert!(sink.count(|e| matches!(
        e,
        AppEvent::OutputFault {
            program: Some(Program::AllTogether),
            error: OutputError::WriteFailed(0)
        }
    )) >= 1);

    c.handle(Command::Stop(Program::AllTogether));
    assert_quiescent(&c, &log);
}

// ── Purge ─────────────────────────────────────────────────────

#[test]
fn purge_opens_everything_until_stopped() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, sink) = started(outputs);
    c.handle(Command::SelectMode(Mode::Purge));
    assert_eq!(c.handle(Command::Start(Program::Purge)), Outcome::Applied);
    assert_eq!(c.telemetry().high_count(), 3);
    assert_eq!(&snapshot(&log)[len(&log) - 3..], &[(0, H), (1, H), (2, H)]);

    assert_eq!(c.handle(Command::Stop(Program::Purge)), Outcome::Applied);
    assert_eq!(c.handle(Command::Stop(Program::Purge)), Outcome::Applied);
    assert_quiescent(&c, &log);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ProgramStarted(Program::Purge))),
        1
    );
}

#[test]
fn purge_opens_the_channels_that_still_work() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, _sink) = started(outputs.with_broken(0));
    c.handle(Command::SelectMode(Mode::Purge));
    assert_eq!(
        c.handle(Command::Start(Program::Purge)),
        Outcome::Failed(Error::Output(OutputError::WriteFailed(0)))
    );
    assert_eq!(c.telemetry().levels.as_slice(), &[L, H, H]);

    c.handle(Command::Stop(Program::Purge));
    assert_quiescent(&c, &log);
}

// ── Manual ────────────────────────────────────────────────────

#[test]
fn manual_writes_are_immediate_and_cleared_on_switch() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, _sink) = started(outputs);
    c.handle(Command::SetManual { channel: 2, on: true });
    c.handle(Command::SetManual { channel: 0, on: true });
    c.handle(Command::SetManual { channel: 0, on: false });
    assert_eq!(
        c.telemetry().levels.as_slice(),
        &[L, L, H],
        "manual levels hold until changed"
    );
    c.handle(Command::SelectMode(Mode::Timed));
    assert_quiescent(&c, &log);
}

// ── Gating ────────────────────────────────────────────────────

#[test]
fn actions_for_inactive_modes_are_ignored() {
    for mode in Mode::ALL {
        let (outputs, log) = MockOutputs::new(3);
        let (mut c, sink) = started(outputs);
        c.handle(Command::SelectMode(mode));
        let mut ignored = 0;
        for action in all_actions() {
            if action.governing_mode() == Some(mode) {
                continue;
            }
            assert_eq!(c.handle(action), Outcome::Ignored, "{action:?} in {mode}");
            ignored += 1;
        }
        assert_eq!(
            sink.count(|e| matches!(e, AppEvent::CommandIgnored { active, .. } if *active == mode)),
            ignored
        );
        assert_quiescent(&c, &log);
    }
}

#[test]
fn settings_are_stored_in_any_mode() {
    let (outputs, _log) = MockOutputs::new(3);
    let (mut c, _sink) = started(outputs);
    assert_eq!(c.mode(), Mode::Manual);
    assert_eq!(
        c.handle(Command::SetTimedOn { channel: 1, secs: 7 }),
        Outcome::Applied
    );
    assert_eq!(c.handle(Command::SetSequentialOn(4)), Outcome::Applied);
    assert_eq!(c.settings().timed(1).unwrap().load().on_secs, 7);
    assert_eq!(c.settings().sequential_on_secs(), 4);
}

// ── Mode switching ────────────────────────────────────────────

#[test]
fn reselecting_the_active_mode_still_tears_down() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, sink) = started(outputs);
    c.handle(Command::SelectMode(Mode::AllTogether));
    c.handle(Command::Start(Program::AllTogether));
    assert!(c.is_running(Program::AllTogether));

    c.handle(Command::SelectMode(Mode::AllTogether));
    assert_quiescent(&c, &log);
    assert!(sink.events().iter().any(|e| matches!(
        e,
        AppEvent::ModeChanged { from: Mode::AllTogether, to: Mode::AllTogether }
    )));
}

#[test]
fn rapid_switching_never_leaves_a_stray_write() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, sink) = started(outputs);
    c.handle(Command::SetAllTogetherOn(1));
    c.handle(Command::SetAllTogetherOff(0));
    c.handle(Command::SetSequentialOn(1));

    for i in 0..40u64 {
        c.handle(Command::SelectMode(Mode::AllTogether));
        c.handle(Command::Start(Program::AllTogether));
        std::thread::sleep(Duration::from_millis(i % 3));

        c.handle(Command::SelectMode(Mode::Sequential));
        c.handle(Command::Start(Program::Sequential));
        std::thread::sleep(Duration::from_millis(i % 2));

        c.handle(Command::SelectMode(Mode::Timed));
        c.handle(Command::Start(Program::Timed(0)));
        c.handle(Command::Start(Program::Timed(2)));

        c.handle(Command::SelectMode(Mode::Manual));
        assert_eq!(c.telemetry().high_count(), 0, "iteration {i}");
        assert_eq!(&snapshot(&log)[len(&log) - 3..], ALL_LOW, "iteration {i}");
    }
    assert_quiescent(&c, &log);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RunnerCrashed(_))), 0);
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn broken_channel_is_reported_and_others_keep_running() {
    let (outputs, log) = MockOutputs::new(3);
    let (mut c, sink) = started(outputs.with_broken(1));

    // Startup teardown reached channel 2 despite channel 1.
    assert_eq!(snapshot(&log), [(0, L), (2, L)]);
    assert!(sink.events().iter().any(|e| matches!(
        e,
        AppEvent::OutputFault { program: None, error: OutputError::WriteFailed(1) }
    )));

    assert_eq!(
        c.handle(Command::SetManual { channel: 1, on: true }),
        Outcome::Failed(Error::Output(OutputError::WriteFailed(1)))
    );

    c.handle(Command::SelectMode(Mode::Timed));
    c.handle(Command::Start(Program::Timed(1)));
    c.handle(Command::Start(Program::Timed(0)));
    let base = len(&log);
    assert!(wait_for(|| {
        sink.count(|e| {
            matches!(e, AppEvent::OutputFault { program: Some(Program::Timed(1)), .. })
        }) >= 3
    }));
    assert!(wait_for(|| snapshot(&log)[base..].contains(&(0, H))));
    assert!(c.is_running(Program::Timed(1)), "a faulting runner keeps going");
}

#[test]
fn runner_crash_is_reported_when_the_controller_drops() {
    let (outputs, _log) = MockOutputs::new(3);
    let (mut c, sink) = started(outputs.with_panic_on(0));
    c.handle(Command::SelectMode(Mode::Timed));
    c.handle(Command::Start(Program::Timed(0)));
    assert!(wait_for(|| c.running().count() == 0), "runner died on its first write");

    drop(c);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RunnerCrashed(Program::Timed(0)))),
        1
    );
}
