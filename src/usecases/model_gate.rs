//! One-time model initialization gate.
//!
//! States: Uninitialized -> Loading -> Ready | Failed. The first caller runs
//! the loader; concurrent callers wait on the same load. `Failed` is terminal
//! for the process and callers get `None` (degraded behavior).

use crate::domain::DomainError;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

enum GateState<T> {
    Uninitialized,
    /// Receiver fires when the in-flight load settles or is abandoned.
    Loading(watch::Receiver<()>),
    Ready(Arc<T>),
    Failed(String),
}

pub struct ModelGate<T> {
    name: &'static str,
    state: Mutex<GateState<T>>,
}

/// Resets an abandoned load (loader future dropped) back to Uninitialized.
struct LoadingGuard<'a, T> {
    gate: &'a ModelGate<T>,
    done: bool,
    _tx: watch::Sender<()>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            let mut state = self.gate.lock();
            if matches!(*state, GateState::Loading(_)) {
                *state = GateState::Uninitialized;
            }
        }
        // _tx dropped after this, waking waiters.
    }
}

enum Step<T> {
    Done(Option<Arc<T>>),
    Wait(watch::Receiver<()>),
    Load(watch::Sender<()>),
}

impl<T> ModelGate<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(GateState::Uninitialized),
        }
    }

    /// Gate that starts Ready. Used when a model is supplied directly.
    pub fn ready(name: &'static str, value: T) -> Self {
        Self {
            name,
            state: Mutex::new(GateState::Ready(Arc::new(value))),
        }
    }

    /// Gate that starts Failed: callers always get the degraded path.
    pub fn disabled(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(GateState::Failed("no artifact source configured".into())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState<T>> {
        // A poisoned lock only means a panic elsewhere; the state itself is always valid.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self) -> GateStatus {
        match *self.lock() {
            GateState::Uninitialized => GateStatus::Uninitialized,
            GateState::Loading(_) => GateStatus::Loading,
            GateState::Ready(_) => GateStatus::Ready,
            GateState::Failed(_) => GateStatus::Failed,
        }
    }

    /// Loaded value if Ready, without triggering a load.
    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.lock() {
            GateState::Ready(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    /// Failure reason if Failed.
    pub fn failure(&self) -> Option<String> {
        match &*self.lock() {
            GateState::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Returns the loaded value, running `loader` if nobody has yet.
    /// Safe to call redundantly and concurrently; at most one load runs at a time.
    pub async fn get_or_init<F, Fut>(&self, loader: F) -> Option<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        loop {
            let step = {
                let mut state = self.lock();
                match &*state {
                    GateState::Ready(v) => Step::Done(Some(Arc::clone(v))),
                    GateState::Failed(_) => Step::Done(None),
                    GateState::Loading(rx) => Step::Wait(rx.clone()),
                    GateState::Uninitialized => {
                        let (tx, rx) = watch::channel(());
                        *state = GateState::Loading(rx);
                        Step::Load(tx)
                    }
                }
            };

            match step {
                Step::Done(v) => return v,
                Step::Wait(mut rx) => {
                    // Err means the loader was dropped; loop re-reads the state either way.
                    let _ = rx.changed().await;
                }
                Step::Load(tx) => {
                    // This arm always returns, so `loader` is moved at most once.
                    let mut guard = LoadingGuard {
                        gate: self,
                        done: false,
                        _tx: tx,
                    };
                    let result = loader().await;
                    let out = {
                        let mut state = self.lock();
                        match result {
                            Ok(value) => {
                                let value = Arc::new(value);
                                *state = GateState::Ready(Arc::clone(&value));
                                info!(model = self.name, "model ready");
                                Some(value)
                            }
                            Err(e) => {
                                warn!(model = self.name, error = %e, "model load failed; using fallback behavior");
                                *state = GateState::Failed(e.to_string());
                                None
                            }
                        }
                    };
                    guard.done = true;
                    drop(guard);
                    return out;
                }
            }
        }
    }
}
