//! Runtime symbol providers for third-party crates.
//!
//! `async-io-mini` timers sit on the `embassy-time` driver interface, which
//! expects the final binary to export `_embassy_time_now` and
//! `_embassy_time_schedule_wake`.  `embassy-sync` channels likewise need a
//! `critical-section` implementation.  Ticks are microseconds.
//!
//! On host builds the critical section comes from the `critical-section`
//! crate's `std` implementation instead.

use core::time::Duration;

#[cfg(target_os = "espidf")]
use core::cell::{Cell, RefCell};
#[cfg(target_os = "espidf")]
use std::sync::{Mutex, MutexGuard, PoisonError};

// ── Critical section (ESP-IDF) ───────────────────────────────

#[cfg(target_os = "espidf")]
static CRITICAL_SECTION_MUTEX: Mutex<()> = Mutex::new(());

#[cfg(target_os = "espidf")]
thread_local! {
    static CRITICAL_SECTION_DEPTH: Cell<u8> = const { Cell::new(0) };
    static CRITICAL_SECTION_GUARD: RefCell<Option<MutexGuard<'static, ()>>> =
        const { RefCell::new(None) };
}

/// Re-entrant acquire for `critical-section` 1.x.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
    CRITICAL_SECTION_DEPTH.with(|depth| {
        let d = depth.get();
        if d == 0 {
            let lock = CRITICAL_SECTION_MUTEX
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            CRITICAL_SECTION_GUARD.with(|guard| *guard.borrow_mut() = Some(lock));
        }
        let next = d.saturating_add(1);
        depth.set(next);
        next
    })
}

#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_release(_token: u8) {
    CRITICAL_SECTION_DEPTH.with(|depth| {
        let d = depth.get();
        if d == 0 {
            return;
        }
        depth.set(d - 1);
        if d == 1 {
            CRITICAL_SECTION_GUARD.with(|guard| *guard.borrow_mut() = None);
        }
    });
}

// ── Time driver ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    // SAFETY: esp_timer_get_time reads the monotonic system timer.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

/// Microseconds since the first call in this process.
#[cfg(not(target_os = "espidf"))]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_micros() as u64
}

/// Wake `waker` once the clock reaches `at`.
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_schedule_wake(at: u64, waker: *mut core::ffi::c_void) {
    if waker.is_null() {
        return;
    }

    // SAFETY: embassy-time passes a valid `Waker` pointer for the duration of
    // the call; it is cloned before the call returns.
    let waker = unsafe { (*(waker as *const core::task::Waker)).clone() };
    std::thread::spawn(move || {
        let now = _embassy_time_now();
        if at > now {
            std::thread::sleep(Duration::from_micros(at - now));
        }
        waker.wake();
    });
}
