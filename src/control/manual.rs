//! Manual Control Handler.
//!
//! Writes the requested level to one channel straight away.  The token is
//! consulted once, at dispatch; a single pin write is effectively
//! instantaneous so there is nothing to abort afterwards.

use crate::app::ports::OutputPort;
use crate::error::OutputError;

use super::bank::{OutputBank, Write};
use super::level::Level;
use super::scope::CancelToken;

pub fn set<O: OutputPort>(
    bank: &OutputBank<O>,
    token: &CancelToken,
    channel: usize,
    on: bool,
) -> Result<Write, OutputError> {
    bank.write(token, channel, Level::from(on))
}
