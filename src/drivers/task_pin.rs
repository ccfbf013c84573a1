//! Core-pinned thread spawning for ESP32-S3 dual-core.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread` creates a FreeRTOS
//! task pinned to a specific CPU core with explicit priority and stack
//! size.  Control-loop runners go on the application core; the parameter
//! transport pump shares the protocol core with the network stack.  On
//! non-ESP targets, falls back to plain thread spawn.
//!
//! # ESP-IDF Threading Model
//!
//! ESP-IDF implements `std::thread` via pthreads, which are thin wrappers
//! around FreeRTOS tasks. `esp_pthread_set_cfg()` sets thread-local
//! configuration that applies to the *next* `pthread_create()` call from
//! the calling thread. This means the config→spawn pair must not be
//! interleaved with other thread creation on the same thread.

use std::io;
use std::thread::JoinHandle;

/// CPU core identifiers for the ESP32-S3 Xtensa LX7 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU) — protocol stacks (WiFi, lwIP, parameter transport).
    Pro = 0,
    /// Core 1 (APP_CPU) — control loops.
    App = 1,
}

/// Priority of control-loop runner tasks.
pub const RUNNER_PRIORITY: u8 = 10;
/// Stack size of control-loop runner tasks (KB).
pub const RUNNER_STACK_KB: usize = 6;

/// Spawn a thread pinned to a specific core with explicit priority and stack.
///
/// The `name` parameter must be a null-terminated string (e.g. `"timed\0"`).
#[cfg(target_os = "espidf")]
pub fn spawn_on_core<T: Send + 'static>(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() -> T + Send + 'static,
) -> io::Result<JoinHandle<T>> {
    // SAFETY: the config is thread-local and consumed by the spawn below;
    // `name` is a static null-terminated string.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core as i32;
        cfg.prio = priority as i32;
        cfg.stack_size = (stack_kb * 1024) as i32;
        cfg.thread_name = name.as_ptr() as *const _;
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
        }
    }

    let display_name = name.trim_end_matches('\0');
    log::debug!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        core,
        priority,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
}

/// Simulation fallback: ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core<T: Send + 'static>(
    _core: Core,
    _priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() -> T + Send + 'static,
) -> io::Result<JoinHandle<T>> {
    let display_name = name.trim_end_matches('\0');
    log::debug!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        display_name,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}

/// Spawn a control-loop runner on the application core.
pub fn spawn_runner(
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    spawn_on_core(Core::App, RUNNER_PRIORITY, RUNNER_STACK_KB, name, f)
}
