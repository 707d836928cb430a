//! Hand-off point between fragment producers and the registrar.
//!
//! Producers may start submitting before any registrar exists, so the bridge
//! buffers early fragments and replays them in submission order the moment a
//! registrar attaches. From then on fragments flow straight through.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::traits::DynRegistrar;

/// Where the bridge currently stands. Stages only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStage {
    /// Nothing submitted, nobody attached.
    Empty,
    /// Fragments queued ahead of a registrar.
    Buffering,
    /// Registrar attached; fragments flow through directly.
    Active,
}

/// What became of one submitted fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Queued until a registrar attaches.
    Buffered,
    /// Handed to the registrar before this call returned. A registrar that
    /// rejects the fragment logs it; the outcome stays `Delivered`.
    Delivered,
    /// Queued behind a drain running further up the call stack; that drain
    /// delivers it before the outermost call returns.
    Deferred,
    /// Lost to a poisoned state lock.
    Dropped,
}

enum State<F> {
    Empty,
    Buffering(VecDeque<F>),
    Active {
        registrar: DynRegistrar<F>,
        /// Fragments awaiting the running drain. Empty whenever `draining`
        /// is false.
        backlog: VecDeque<F>,
        draining: bool,
    },
}

/// Buffers fragments until a registrar attaches, then forwards every fragment
/// exactly once, in submission order.
///
/// All paths take the state lock only for queue bookkeeping and release it
/// around every `ingest` call, so a registrar is free to submit further
/// fragments from inside `ingest` without deadlocking.
pub struct RegistryBridge<F> {
    state: Mutex<State<F>>,
}

impl<F> RegistryBridge<F> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Empty),
        }
    }

    /// Hands a fragment to the registrar, or queues it if none is attached
    /// yet.
    pub fn submit(&self, fragment: F) -> SubmitOutcome {
        let registrar = {
            let mut state = match self.state.lock() {
                Ok(guard) => guard,
                Err(_) => {
                    warn!("Dropping fragment: registry state lock poisoned");
                    return SubmitOutcome::Dropped;
                }
            };
            match &mut *state {
                State::Empty => {
                    let mut queue = VecDeque::new();
                    queue.push_back(fragment);
                    *state = State::Buffering(queue);
                    debug!("No registrar attached yet; buffering fragment (queued=1)");
                    return SubmitOutcome::Buffered;
                }
                State::Buffering(queue) => {
                    queue.push_back(fragment);
                    debug!(
                        "No registrar attached yet; buffering fragment (queued={})",
                        queue.len()
                    );
                    return SubmitOutcome::Buffered;
                }
                State::Active {
                    registrar,
                    backlog,
                    draining,
                } => {
                    backlog.push_back(fragment);
                    if *draining {
                        return SubmitOutcome::Deferred;
                    }
                    *draining = true;
                    Arc::clone(registrar)
                }
            }
        };

        self.drain(&registrar);
        SubmitOutcome::Delivered
    }

    /// Attaches the registrar, first replaying anything buffered, in
    /// submission order. Returns how many fragments the attach drained.
    ///
    /// Exactly one registrar can ever attach; later calls fail with
    /// [`RegistryError::AlreadyAttached`] and leave the first attachment
    /// untouched.
    pub fn attach(&self, registrar: DynRegistrar<F>) -> Result<usize, RegistryError> {
        {
            let mut state = self.state.lock().map_err(|_| RegistryError::Poisoned)?;
            let backlog = match &mut *state {
                State::Active { .. } => return Err(RegistryError::AlreadyAttached),
                State::Empty => VecDeque::new(),
                State::Buffering(queue) => std::mem::take(queue),
            };
            debug!(
                "Registrar attached with {} buffered fragment(s)",
                backlog.len()
            );
            *state = State::Active {
                registrar: Arc::clone(&registrar),
                backlog,
                draining: true,
            };
        }

        Ok(self.drain(&registrar))
    }

    /// Current stage; moves from empty through buffering to active, never
    /// backwards.
    pub fn stage(&self) -> BridgeStage {
        let state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &*state {
            State::Empty => BridgeStage::Empty,
            State::Buffering(_) => BridgeStage::Buffering,
            State::Active { .. } => BridgeStage::Active,
        }
    }

    /// Fragments currently queued: the pre-attach buffer, or an active
    /// drain's outstanding backlog.
    pub fn queued_len(&self) -> usize {
        let state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &*state {
            State::Empty => 0,
            State::Buffering(queue) => queue.len(),
            State::Active { backlog, .. } => backlog.len(),
        }
    }

    /// Pops and ingests backlog fragments one at a time until none remain.
    ///
    /// The backlog is re-read under the lock on every iteration, so fragments
    /// submitted from inside `ingest` are picked up by this same loop instead
    /// of starting a nested drain. The `draining` flag keeps concurrent
    /// submitters from racing a second loop.
    fn drain(&self, registrar: &DynRegistrar<F>) -> usize {
        let mut delivered = 0;
        loop {
            let fragment = {
                let mut state = match self.state.lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        warn!("Drain stopped: registry state lock poisoned");
                        return delivered;
                    }
                };
                match &mut *state {
                    State::Active {
                        backlog, draining, ..
                    } => match backlog.pop_front() {
                        Some(fragment) => fragment,
                        None => {
                            *draining = false;
                            return delivered;
                        }
                    },
                    // Attach is permanent, so only Active is reachable here.
                    _ => return delivered,
                }
            };

            if let Err(err) = registrar.ingest(fragment) {
                warn!("Registrar rejected fragment: {}", err);
            }
            delivered += 1;
        }
    }
}

impl<F> Default for RegistryBridge<F> {
    fn default() -> Self {
        Self::new()
    }
}
