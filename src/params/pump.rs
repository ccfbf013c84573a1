//! Parameter pump: transport → decoder → command queue.
//!
//! Runs on its own thread so a slow or blocking transport never stalls the
//! controller.  Rejected updates are logged and dropped; the controller
//! only ever sees well-formed [`Command`]s.  A full queue drops the update
//! with a warning rather than back-pressuring the transport.

use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, info, warn};

use super::decode::{Limits, decode};
use super::queue::CommandQueue;
use crate::app::commands::Command;
use crate::app::ports::ParamTransport;
use crate::drivers::task_pin::{self, Core};
use crate::error::{Error, Result};

/// Pump task priority (below the control runners).
pub const PUMP_PRIORITY: u8 = 5;
/// Pump task stack (KB).
pub const PUMP_STACK_KB: usize = 8;

/// Forward updates until the transport closes.  Returns the number of
/// commands enqueued.
pub fn pump<T: ParamTransport>(transport: &mut T, queue: &CommandQueue, limits: &Limits) -> usize {
    let mut forwarded = 0;
    while let Some(update) = transport.poll() {
        match decode(&update.param, &update.value, limits) {
            Ok(cmd) => {
                debug!("PARAM {}={} -> {:?}", update.param, update.value, cmd);
                if queue.post(cmd) {
                    forwarded += 1;
                }
            }
            Err(e) => warn!("PARAM {}={} rejected: {}", update.param, update.value, e),
        }
    }
    forwarded
}

/// Run [`pump`] on the protocol core.  When the transport closes the
/// controller is asked to shut down; that request waits for room instead
/// of being dropped.
pub fn spawn_pump<T>(
    mut transport: T,
    queue: Arc<CommandQueue>,
    limits: Limits,
) -> Result<JoinHandle<usize>>
where
    T: ParamTransport + Send + 'static,
{
    task_pin::spawn_on_core(Core::Pro, PUMP_PRIORITY, PUMP_STACK_KB, "param-pump\0", move || {
        let forwarded = pump(&mut transport, &queue, &limits);
        info!("Parameter transport closed after {} commands", forwarded);
        futures_lite::future::block_on(queue.send(Command::Shutdown));
        forwarded
    })
    .map_err(|_| Error::Spawn("param-pump"))
}
