//! The single forecast slot read by the presentation layer.
//!
//! Every change goes through [`reduce`]. Cycles are numbered; a finished
//! cycle only lands if no newer cycle was started in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::{
    error::ForecastError,
    model::{ForecastReady, ForecastResult},
};

/// Current slot contents, tagged with the cycle that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub cycle: u64,
    pub result: ForecastResult,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self { cycle: 0, result: ForecastResult::Loading }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    CycleStarted { cycle: u64 },
    CycleFinished { cycle: u64, outcome: Result<ForecastReady, ForecastError> },
}

/// Transition function. Returns `None` when the event does not apply.
pub fn reduce(state: &Snapshot, event: StoreEvent) -> Option<Snapshot> {
    match event {
        StoreEvent::CycleStarted { cycle } if cycle > state.cycle => {
            Some(Snapshot { cycle, result: ForecastResult::Loading })
        }
        StoreEvent::CycleFinished { cycle, outcome }
            if cycle == state.cycle && state.result.is_loading() =>
        {
            let result = match outcome {
                Ok(ready) => ForecastResult::Ready(ready),
                Err(err) => ForecastResult::Error { message: err.to_string() },
            };
            Some(Snapshot { cycle, result })
        }
        _ => None,
    }
}

#[derive(Debug)]
pub struct ForecastStore {
    state: watch::Sender<Snapshot>,
    dispatched: AtomicU64,
}

impl Default for ForecastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self { state, dispatched: AtomicU64::new(0) }
    }

    /// Start a new cycle and return its number. The slot goes back to `Loading`.
    pub fn begin_cycle(&self) -> u64 {
        let cycle = self.dispatched.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch(StoreEvent::CycleStarted { cycle });
        cycle
    }

    /// Publish the outcome of `cycle`. Returns `false` when it was stale.
    pub fn complete(&self, cycle: u64, outcome: Result<ForecastReady, ForecastError>) -> bool {
        let applied = self.dispatch(StoreEvent::CycleFinished { cycle, outcome });
        if !applied {
            debug!(cycle, latest = self.latest_cycle(), "discarding stale forecast cycle");
        }
        applied
    }

    pub fn latest_cycle(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> ForecastResult {
        self.state.borrow().result.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    fn dispatch(&self, event: StoreEvent) -> bool {
        self.state.send_if_modified(|state| match reduce(state, event) {
            Some(next) => {
                *state = next;
                true
            }
            None => false,
        })
    }
}
