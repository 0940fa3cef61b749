//! Minimum spacing between consecutive charger lookups.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ProviderError;
use crate::model::{ChargerCandidate, Coordinate};
use crate::traits::ChargerDirectory;

/// Wraps a directory so that calls are at least `min_interval` apart.
#[derive(Debug)]
pub struct Throttled<D> {
    inner: D,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl<D> Throttled<D> {
    pub fn new(inner: D, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn wait_turn(&self) {
        let mut last_call = match self.last_call.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let pause = self.min_interval - elapsed;
                tracing::trace!(pause_ms = pause.as_millis() as u64, "throttling charger lookup");
                thread::sleep(pause);
            }
        }
        *last_call = Some(Instant::now());
    }
}

impl<D: ChargerDirectory> ChargerDirectory for Throttled<D> {
    fn chargers_near(&self, at: Coordinate) -> Result<Vec<ChargerCandidate>, ProviderError> {
        self.wait_turn();
        self.inner.chargers_near(at)
    }
}
