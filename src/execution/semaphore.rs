use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A small, blocking counting semaphore.
///
/// Bounds the number of reports rendered at once, independent of the pool size.
pub struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

impl Semaphore {
    /// Semaphore with `permits` permits (minimum 1).
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits.max(1)),
            cv: Condvar::new(),
        }
    }

    /// Acquire one permit, blocking until available.
    ///
    /// Returns the time spent waiting (zero if no wait was required).
    pub fn acquire(&self) -> Duration {
        let start = Instant::now();
        let mut waited = false;
        let mut g = self.permits.lock();
        while *g == 0 {
            waited = true;
            self.cv.wait(&mut g);
        }
        *g -= 1;
        if waited { start.elapsed() } else { Duration::ZERO }
    }

    /// Release one permit.
    pub fn release(&self) {
        let mut g = self.permits.lock();
        *g += 1;
        self.cv.notify_one();
    }
}
