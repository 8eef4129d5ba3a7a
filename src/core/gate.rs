//! Pool-wide start/end gate
//!
//! A [`StartEndGate`] carries two independent one-shot transitions shared by
//! every worker of a pool:
//!
//! - **start**: released by the controller on the first submitted item, no
//!   matter which worker's queue received it
//! - **end**: raised once by the controller to stop every worker
//!
//! # Example
//!
//! ```rust
//! use rust_dispatch_pool::StartEndGate;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let gate = Arc::new(StartEndGate::new());
//! let waiter = Arc::clone(&gate);
//!
//! let handle = thread::spawn(move || waiter.wait_for_start());
//!
//! gate.signal_start();
//! assert!(handle.join().unwrap());
//! ```

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct GateState {
    started: bool,
    ended: bool,
}

/// Shared two-phase start/end signal.
///
/// Both transitions are idempotent and broadcast to every waiter. Waits
/// re-check their predicate under the lock, so spurious wake-ups are absorbed.
#[derive(Debug, Default)]
pub struct StartEndGate {
    state: Mutex<GateState>,
    start_cv: Condvar,
    end_cv: Condvar,
}

impl StartEndGate {
    /// Create a gate that is neither started nor ended
    pub fn new() -> Self {
        Self::default()
    }

    /// Release every thread blocked in [`wait_for_start`](Self::wait_for_start).
    pub fn signal_start(&self) {
        let mut state = self.state.lock();
        if state.started {
            return;
        }
        state.started = true;
        drop(state);
        self.start_cv.notify_all();
    }

    /// Block until the gate is started.
    ///
    /// Returns `true` once started. If the gate is ended before it was ever
    /// started the wait is released as well and returns `false`; a pool shut
    /// down before its first submission must not leave workers parked here.
    pub fn wait_for_start(&self) -> bool {
        let mut state = self.state.lock();
        while !state.started && !state.ended {
            self.start_cv.wait(&mut state);
        }
        state.started
    }

    /// Raise the end flag and wake all waiters of both transitions.
    pub fn signal_end(&self) {
        let mut state = self.state.lock();
        if state.ended {
            return;
        }
        state.ended = true;
        drop(state);
        self.end_cv.notify_all();
        self.start_cv.notify_all();
    }

    /// Block until the gate is ended or `timeout` elapses.
    ///
    /// Never fails; the returned flag is the end state observed on return.
    pub fn wait_for_end(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        while !state.ended {
            match deadline {
                Some(deadline) => {
                    if self.end_cv.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                None => self.end_cv.wait(&mut state),
            }
        }
        state.ended
    }

    /// Whether the start transition has happened
    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    /// Whether the end transition has happened
    pub fn is_ended(&self) -> bool {
        self.state.lock().ended
    }
}
