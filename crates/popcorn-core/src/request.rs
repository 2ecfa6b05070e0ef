use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Handle for one issued request
///
/// The generation identifies the request when its result comes back; the
/// token is handed to the lookup client so a superseded request stops waiting.
#[derive(Debug, Clone)]
pub(crate) struct RequestTicket {
    pub generation: u64,
    pub cancel: CancellationToken,
}

struct CellInner<S> {
    generation: u64,
    in_flight: Option<CancellationToken>,
    state: S,
}

/// Published state plus the single request allowed to change it
///
/// Starting a request cancels the previous one. Results are applied only
/// while their generation is still current, and the check happens under the
/// same lock that publishes state, so a late result can never overwrite a
/// newer one even if its request ignored cancellation.
pub(crate) struct FetchCell<S> {
    inner: Mutex<CellInner<S>>,
    tx: watch::Sender<S>,
}

impl<S: Clone> FetchCell<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _) = watch::channel(initial.clone());
        Self {
            inner: Mutex::new(CellInner {
                generation: 0,
                in_flight: None,
                state: initial,
            }),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellInner<S>> {
        // State stays consistent even if a holder panicked mid-update
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> S {
        self.lock().state.clone()
    }

    /// Cancel whatever is outstanding and retire its generation
    pub fn cancel(&self) {
        let mut inner = self.lock();
        Self::supersede(&mut inner);
    }

    /// Cancel the outstanding request, then update and publish state
    pub fn reset(&self, update: impl FnOnce(&mut S)) {
        let mut inner = self.lock();
        Self::supersede(&mut inner);
        update(&mut inner.state);
        self.tx.send_replace(inner.state.clone());
    }

    /// Supersede the outstanding request with a new one
    pub fn begin(&self, update: impl FnOnce(&mut S)) -> RequestTicket {
        let mut inner = self.lock();
        let generation = Self::supersede(&mut inner);
        let cancel = CancellationToken::new();
        inner.in_flight = Some(cancel.clone());
        update(&mut inner.state);
        self.tx.send_replace(inner.state.clone());
        RequestTicket { generation, cancel }
    }

    /// Apply a finished request's outcome if it is still the current one
    ///
    /// Returns false, leaving state untouched, for superseded generations.
    pub fn complete(&self, generation: u64, update: impl FnOnce(&mut S)) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        inner.in_flight = None;
        update(&mut inner.state);
        self.tx.send_replace(inner.state.clone());
        true
    }

    #[cfg(test)]
    pub fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    fn supersede(inner: &mut CellInner<S>) -> u64 {
        if let Some(token) = inner.in_flight.take() {
            token.cancel();
        }
        inner.generation += 1;
        inner.generation
    }
}

impl<S> Drop for FetchCell<S> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(token) = inner.in_flight.take() {
            token.cancel();
        }
    }
}
