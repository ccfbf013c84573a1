//! Parameter update decoding.
//!
//! Turns a `(node/property, value)` pair into a [`Command`].  Channel
//! numbers in property ids are 1-based (`sprayer1` is channel 0).  Numbers
//! must be non-negative integers within `0..=max_phase_secs`; a fractional
//! part is accepted only if it is zero, since some transports render
//! integer properties as `"5.0"`.

use crate::app::commands::Command;
use crate::config::SprayerConfig;
use crate::control::mode::{Mode, Program};
use crate::error::ParamError;

/// Bounds the decoder checks against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub channels: usize,
    pub max_phase_secs: u32,
}

impl Limits {
    pub fn from_config(config: &SprayerConfig) -> Self {
        Self {
            channels: config.channel_count(),
            max_phase_secs: config.max_phase_secs,
        }
    }
}

/// Decode one update.
pub fn decode(param: &str, value: &str, limits: &Limits) -> Result<Command, ParamError> {
    let (node, property) = param.split_once('/').ok_or(ParamError::UnknownParameter)?;
    let value = value.trim();

    match (node, property) {
        ("mode-selector", "mode") => value.parse::<Mode>().map(Command::SelectMode),

        ("manual-control", property) => {
            let channel = sprayer_channel(property, limits)?;
            Ok(Command::SetManual {
                channel,
                on: on_off(value)?,
            })
        }

        ("timed-control", property) => {
            let (sprayer, field) = property
                .split_once('-')
                .ok_or(ParamError::UnknownParameter)?;
            let channel = sprayer_channel(sprayer, limits)?;
            match field {
                "ontime" => Ok(Command::SetTimedOn {
                    channel,
                    secs: seconds(value, limits)?,
                }),
                "offtime" => Ok(Command::SetTimedOff {
                    channel,
                    secs: seconds(value, limits)?,
                }),
                "startstop" => start_stop(Program::Timed(channel), value),
                _ => Err(ParamError::UnknownParameter),
            }
        }

        ("sequential-control", "sequential-ontime") => {
            seconds(value, limits).map(Command::SetSequentialOn)
        }
        ("sequential-control", "sequential-startstop") => start_stop(Program::Sequential, value),

        ("alltogether-control", "alltogether-ontime") => {
            seconds(value, limits).map(Command::SetAllTogetherOn)
        }
        ("alltogether-control", "alltogether-offtime") => {
            seconds(value, limits).map(Command::SetAllTogetherOff)
        }
        ("alltogether-control", "alltogether-startstop") => {
            start_stop(Program::AllTogether, value)
        }

        ("purgeall-control", "purgeall-startstop") => start_stop(Program::Purge, value),

        _ => Err(ParamError::UnknownParameter),
    }
}

/// `sprayer{i}` → channel `i - 1`.
fn sprayer_channel(property: &str, limits: &Limits) -> Result<usize, ParamError> {
    let number: usize = property
        .strip_prefix("sprayer")
        .and_then(|n| n.parse().ok())
        .filter(|n| *n > 0)
        .ok_or(ParamError::UnknownParameter)?;
    let channel = number - 1;
    if channel >= limits.channels {
        return Err(ParamError::NoSuchChannel(channel));
    }
    Ok(channel)
}

fn on_off(value: &str) -> Result<bool, ParamError> {
    match value {
        "ON" => Ok(true),
        "OFF" => Ok(false),
        _ => Err(ParamError::InvalidChoice),
    }
}

fn start_stop(program: Program, value: &str) -> Result<Command, ParamError> {
    match value {
        "Start" => Ok(Command::Start(program)),
        "Stop" => Ok(Command::Stop(program)),
        _ => Err(ParamError::InvalidChoice),
    }
}

fn seconds(value: &str, limits: &Limits) -> Result<u32, ParamError> {
    let whole = match value.split_once('.') {
        Some((whole, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => whole,
        Some(_) => return Err(ParamError::NotANumber),
        None => value,
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParamError::NotANumber);
    }
    let out_of_range = ParamError::OutOfRange {
        min: 0,
        max: limits.max_phase_secs,
    };
    let secs: u32 = whole.parse().map_err(|_| out_of_range)?;
    if secs > limits.max_phase_secs {
        return Err(out_of_range);
    }
    Ok(secs)
}
