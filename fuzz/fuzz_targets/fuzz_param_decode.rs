//! Fuzz target: `parse_line` + `decode`
//!
//! Drives arbitrary text through the line parser and the parameter
//! decoder and asserts that neither panics and that every accepted number
//! respects the configured bound.
//!
//! cargo fuzz run fuzz_param_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use sprayer::adapters::line_transport::parse_line;
use sprayer::app::commands::Command;
use sprayer::params::decode::{Limits, decode};

const LIMITS: Limits = Limits {
    channels: 3,
    max_phase_secs: 3600,
};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    for line in text.lines() {
        let Some(update) = parse_line(line) else {
            continue;
        };
        match decode(&update.param, &update.value, &LIMITS) {
            Ok(
                Command::SetTimedOn { channel, secs } | Command::SetTimedOff { channel, secs },
            ) => {
                assert!(channel < LIMITS.channels);
                assert!(secs <= LIMITS.max_phase_secs);
            }
            Ok(
                Command::SetSequentialOn(secs)
                | Command::SetAllTogetherOn(secs)
                | Command::SetAllTogetherOff(secs),
            ) => assert!(secs <= LIMITS.max_phase_secs),
            Ok(Command::SetManual { channel, .. }) => assert!(channel < LIMITS.channels),
            Ok(_) | Err(_) => {}
        }
    }
});
