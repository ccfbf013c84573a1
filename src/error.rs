//! Unified error types for the sprayer firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level wiring uniform.  All variants are `Copy` so they can be passed
//! through runner threads and event sinks without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An output line could not be opened or written.
    Output(OutputError),
    /// A remote parameter update could not be decoded.
    Param(ParamError),
    /// Configuration is invalid.
    Config(&'static str),
    /// A runner thread could not be started.
    Spawn(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Param(e) => write!(f, "param: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Spawn(name) => write!(f, "spawn: {name}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// Channel index is outside the registry.
    NoSuchChannel(usize),
    /// The GPIO line behind a channel could not be opened.
    OpenFailed(i32),
    /// Writing a level to the channel failed.
    WriteFailed(usize),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchChannel(ch) => write!(f, "no such channel {ch}"),
            Self::OpenFailed(gpio) => write!(f, "GPIO {gpio} open failed"),
            Self::WriteFailed(ch) => write!(f, "channel {ch} write failed"),
        }
    }
}

impl std::error::Error for OutputError {}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Parameter errors
// ---------------------------------------------------------------------------

/// Why a `(parameterId, value)` update was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    /// No parameter with this id exists.
    UnknownParameter,
    /// The value is not one of the parameter's choices.
    InvalidChoice,
    /// A number parameter received a non-integer value.
    NotANumber,
    /// A number parameter received a value outside its bounds.
    OutOfRange { min: u32, max: u32 },
    /// The parameter addresses a channel the registry does not have.
    NoSuchChannel(usize),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParameter => write!(f, "unknown parameter"),
            Self::InvalidChoice => write!(f, "invalid choice"),
            Self::NotANumber => write!(f, "not a number"),
            Self::OutOfRange { min, max } => write!(f, "out of range ({min}..={max})"),
            Self::NoSuchChannel(ch) => write!(f, "no such channel {ch}"),
        }
    }
}

impl std::error::Error for ParamError {}

impl From<ParamError> for Error {
    fn from(e: ParamError) -> Self {
        Self::Param(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
