//! Cooperative cancellation for logic units.
//!
//! Each unit owns a [`CancelState`]: its [`UnitStatus`] plus the sender half
//! of a `watch` channel. Hooks receive the receiver half as a
//! [`CancelSignal`] and are expected to observe it at their await points.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;

/// Returned by [`CancelSignal::guard`] and recognised by the pipeline as a
/// cooperative exit rather than a failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("logic unit canceled")]
pub struct Canceled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Active,
    /// Canceled by its cancel-trigger action or a non-fatal poison pill.
    /// The next action the unit handles makes it active again.
    Canceled,
    /// Killed by a fatal poison pill. Terminal.
    Killed,
}

/// Receiver side of a unit's cancellation.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that is never canceled.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_canceled(&self) -> bool {
        *self.rx.borrow()
    }

    /// `Err(Canceled)` if cancellation has been requested.
    pub fn check(&self) -> Result<(), Canceled> {
        if self.is_canceled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }

    /// Resolves once cancellation is requested. Pending forever if the
    /// signal can no longer be canceled.
    pub async fn canceled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Race `future` against cancellation.
    pub async fn guard<F: Future>(&self, future: F) -> Result<F::Output, Canceled> {
        tokio::select! {
            biased;
            _ = self.canceled() => Err(Canceled),
            output = future => Ok(output),
        }
    }
}

struct Inner {
    status: UnitStatus,
    tx: watch::Sender<bool>,
}

/// The per-unit state machine.
///
/// `Active -> Canceled` on [`cancel(false)`](Self::cancel), back to `Active`
/// on [`begin`](Self::begin); any state `-> Killed` on `cancel(true)`, after
/// which `begin` and `current` return `None` forever.
pub(crate) struct CancelState {
    inner: Mutex<Inner>,
}

impl CancelState {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Mutex::new(Inner {
                status: UnitStatus::Active,
                tx,
            }),
        }
    }

    pub(crate) fn status(&self) -> UnitStatus {
        self.lock().status
    }

    /// Start handling a new action. A canceled unit gets a fresh signal; an
    /// active one keeps its current signal so in-flight work stays
    /// cancelable.
    pub(crate) fn begin(&self) -> Option<CancelSignal> {
        let mut inner = self.lock();
        match inner.status {
            UnitStatus::Killed => None,
            UnitStatus::Canceled => {
                let (tx, rx) = watch::channel(false);
                inner.tx = tx;
                inner.status = UnitStatus::Active;
                Some(CancelSignal { rx })
            }
            UnitStatus::Active => {
                if *inner.tx.borrow() {
                    inner.tx = watch::channel(false).0;
                }
                Some(CancelSignal {
                    rx: inner.tx.subscribe(),
                })
            }
        }
    }

    /// The signal for the action currently being handled.
    pub(crate) fn current(&self) -> Option<CancelSignal> {
        let inner = self.lock();
        match inner.status {
            UnitStatus::Killed => None,
            _ => Some(CancelSignal {
                rx: inner.tx.subscribe(),
            }),
        }
    }

    pub(crate) fn cancel(&self, kill: bool) {
        let mut inner = self.lock();
        inner.tx.send_replace(true);
        inner.status = match (inner.status, kill) {
            (_, true) | (UnitStatus::Killed, false) => UnitStatus::Killed,
            _ => UnitStatus::Canceled,
        };
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn guard_returns_output_when_not_canceled() {
        let state = CancelState::new();
        let signal = state.begin().unwrap();
        assert_eq!(signal.guard(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn cancel_interrupts_guarded_future() {
        let state = CancelState::new();
        let signal = state.begin().unwrap();

        let waiting = tokio::spawn({
            let signal = signal.clone();
            async move { signal.guard(tokio::time::sleep(Duration::from_secs(60))).await }
        });
        tokio::task::yield_now().await;
        state.cancel(false);

        let result = tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(Canceled));
        assert!(signal.is_canceled());
        assert_eq!(state.status(), UnitStatus::Canceled);
    }

    #[test]
    fn canceled_unit_resumes_with_a_fresh_signal() {
        let state = CancelState::new();
        let first = state.begin().unwrap();
        state.cancel(false);
        assert!(first.is_canceled());

        let second = state.begin().unwrap();
        assert!(!second.is_canceled());
        assert_eq!(state.status(), UnitStatus::Active);
        assert!(first.is_canceled());
    }

    #[test]
    fn kill_is_terminal() {
        let state = CancelState::new();
        state.cancel(true);
        assert_eq!(state.status(), UnitStatus::Killed);
        assert!(state.begin().is_none());
        assert!(state.current().is_none());

        state.cancel(false);
        assert_eq!(state.status(), UnitStatus::Killed);
    }

    #[test]
    fn active_unit_shares_its_signal_across_actions() {
        let state = CancelState::new();
        let first = state.begin().unwrap();
        let second = state.begin().unwrap();
        state.cancel(false);
        assert!(first.is_canceled());
        assert!(second.is_canceled());
    }

    #[test]
    fn never_is_never_canceled() {
        let signal = CancelSignal::never();
        assert!(!signal.is_canceled());
        assert!(signal.check().is_ok());
    }
}
