//! Purge Handler.
//!
//! `Start` drives every channel HIGH in one pass and returns; a broken
//! channel does not keep the others closed.  Nothing re-asserts the level
//! afterwards.  Stopping goes through the controller's domain-wide teardown
//! like every other program.

use crate::app::ports::OutputPort;
use crate::error::OutputError;

use super::bank::{OutputBank, Write};
use super::level::Level;
use super::scope::CancelToken;

pub fn start<O: OutputPort>(
    bank: &OutputBank<O>,
    token: &CancelToken,
) -> Result<Write, OutputError> {
    bank.write_all(token, Level::High)
}
