//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ModeController (domain)
//! ```
//!
//! Driven adapters (output lines, event sinks, parameter transports)
//! implement these traits.  The [`ModeController`](super::service::ModeController)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use heapless::String;

use crate::control::level::Level;
use crate::error::OutputError;

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → relays)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the channel outputs.
///
/// Lines are opened when the adapter is constructed.  Writes to distinct
/// channels may come from different threads; the
/// [`OutputBank`](crate::control::bank::OutputBank) serialises them.
pub trait OutputPort: Send {
    /// Number of opened output lines.
    fn channel_count(&self) -> usize;

    /// Drive one channel to `level`.
    fn write(&mut self, channel: usize, level: Level) -> Result<(), OutputError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Fire-and-forget; runners emit from their own
/// threads, hence `&self`.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Parameter transport port (driving adapter: remote → domain)
// ───────────────────────────────────────────────────────────────

/// Maximum length of a `node/property` parameter id.
pub const PARAM_ID_LEN: usize = 64;

/// Maximum length of a parameter value.
pub const PARAM_VALUE_LEN: usize = 32;

/// One remote change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamUpdate {
    /// `node/property`, e.g. `timed-control/sprayer2-ontime`.
    pub param: String<PARAM_ID_LEN>,
    pub value: String<PARAM_VALUE_LEN>,
}

impl ParamUpdate {
    /// Build an update; `None` if either part exceeds its capacity.
    pub fn new(param: &str, value: &str) -> Option<Self> {
        let mut p = String::new();
        p.push_str(param).ok()?;
        let mut v = String::new();
        v.push_str(value).ok()?;
        Some(Self { param: p, value: v })
    }
}

/// Source of remote parameter changes.  Connectivity, retained values and
/// reconnection belong to the implementation.
pub trait ParamTransport {
    /// Block until the next update.  `None` once the transport is closed.
    fn poll(&mut self) -> Option<ParamUpdate>;
}
