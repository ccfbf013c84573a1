//! Cancellation domain.
//!
//! One [`CancelDomain`] lives for the whole process and carries a
//! generation counter.  A [`CancelToken`] captures the generation that was
//! live when it was issued; canceling the domain bumps the counter, which
//! terminates every outstanding token at once and installs the next
//! generation for new work.
//!
//! ```text
//!   gen 4 ── token ── runner A ─┐
//!         └─ token ── runner B ─┤  cancel()  ──▶  gen 5 ── token ── runner C
//!                               └─ both observe is_canceled()
//! ```
//!
//! [`CancelToken::sleep`] is the only suspension point a runner has.  It
//! waits on a condition variable, so a cancel wakes sleepers immediately
//! instead of after their remaining tick.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct Shared {
    generation: Mutex<u64>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The single revocable execution scope.
pub struct CancelDomain {
    shared: Arc<Shared>,
}

impl Default for CancelDomain {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelDomain {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                generation: Mutex::new(0),
                wake: Condvar::new(),
            }),
        }
    }

    /// Issue a token bound to the live generation.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            shared: Arc::clone(&self.shared),
            generation: *self.shared.lock(),
        }
    }

    /// Cancel every outstanding token and install a fresh generation.
    /// Returns the new live generation.
    pub fn cancel(&self) -> u64 {
        let mut generation = self.shared.lock();
        *generation += 1;
        self.shared.wake.notify_all();
        *generation
    }

    /// The live generation.
    pub fn generation(&self) -> u64 {
        *self.shared.lock()
    }
}

/// Observer handle held by a running loop.
#[derive(Clone)]
pub struct CancelToken {
    shared: Arc<Shared>,
    generation: u64,
}

impl CancelToken {
    pub fn is_canceled(&self) -> bool {
        *self.shared.lock() != self.generation
    }

    /// Generation this token was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sleep for `duration` unless canceled first.
    ///
    /// Returns `true` if the token is still live when the sleep ends.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut generation = self.shared.lock();
        loop {
            if *generation != self.generation {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let (guard, _) = self
                .shared
                .wake
                .wait_timeout(generation, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            generation = guard;
        }
    }
}

impl core::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CancelToken")
            .field("generation", &self.generation)
            .field("canceled", &self.is_canceled())
            .finish()
    }
}
