//! Choosing executors for functions and the pin protocol.

use ::std::collections::BTreeSet;

use ::cirrus_common::{
    executor::{pin_message, ExecutorLocation},
    function::FunctionName,
    kvs::KvsClient,
};
use ::tokio::time::timeout;
use ::tracing::{error, info, warn};

use super::Scheduler;
use crate::executor::ExecutorClient;

/// Pins acquired so far by one DAG creation.
/// A slot may appear several times, once per function pinned to it.
#[derive(Debug, Default)]
pub struct PlacementLog {
    pins: Vec<(ExecutorLocation, FunctionName)>,
}

impl PlacementLog {
    pub(crate) fn record(&mut self, location: ExecutorLocation, function: FunctionName) {
        self.pins.push((location, function));
    }

    /// Number of functions this placement pinned to `location`.
    pub(crate) fn staged_count(&self, location: &ExecutorLocation) -> usize {
        self.pins.iter().filter(|(l, _)| l == location).count()
    }

    pub(crate) fn pins(&self) -> &[(ExecutorLocation, FunctionName)] {
        &self.pins
    }

    pub(crate) fn into_pins(self) -> Vec<(ExecutorLocation, FunctionName)> {
        self.pins
    }
}

/// The candidate with the smallest load.
/// Ties go to the lowest location, candidates being iterated in ascending order.
pub(crate) fn select_least_loaded<F>(
    candidates: &BTreeSet<ExecutorLocation>,
    load: F,
) -> Option<&ExecutorLocation>
where
    F: Fn(&ExecutorLocation) -> usize,
{
    candidates.iter().min_by_key(|candidate| load(candidate))
}

impl<K, E> Scheduler<K, E>
where
    K: KvsClient,
    E: ExecutorClient,
{
    /// Pin `function` to one of the `candidates`.
    ///
    /// A candidate that rejects the pin, or cannot be reached, is removed from `candidates`.
    /// A candidate that does not take the request or answer it in time stays, it may only be slow.
    /// # Return
    /// - `Some(location)` of the executor that accepted the pin.
    /// - `None` if `candidates` is exhausted.
    pub(super) async fn pin_function(
        &mut self,
        function: &str,
        candidates: &mut BTreeSet<ExecutorLocation>,
        log: &PlacementLog,
    ) -> Option<ExecutorLocation> {
        loop {
            let cluster = &self.cluster;
            let location = select_least_loaded(candidates, |candidate| {
                cluster.pinned_count(candidate) + log.staged_count(candidate)
            })?
            .clone();

            info!("Pinning function {} to {}", function, location);
            self.pin_acceptor.discard_pending();
            let send = self
                .executor_client
                .send_pin(&location, pin_message(&self.options.ip, function));
            match timeout(self.options.pin_timeout, send).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Cannot send pin request to {}: {}", location, e);
                    candidates.remove(&location);
                    continue;
                }
                Err(_) => {
                    warn!("Pin request to {} timed out. Retrying.", location);
                    continue;
                }
            }

            match self
                .pin_acceptor
                .wait_for(&location, self.options.pin_timeout)
                .await
            {
                Some(true) => {
                    info!("Function {} pinned to {}", function, location);
                    return Some(location);
                }
                Some(false) => {
                    error!(
                        "Executor {} rejected pin operation for {}. Retrying.",
                        location, function
                    );
                    candidates.remove(&location);
                }
                None => {
                    warn!("Pin operation to {} timed out. Retrying.", location);
                }
            }
        }
    }

    /// Undo every pin of a failed placement. Best effort.
    /// A pin that an earlier DAG already holds on the same slot is kept,
    /// unpinning it would leave that DAG with a stale location.
    pub(super) fn rollback(&self, log: &PlacementLog) {
        for (location, function) in log.pins() {
            if self
                .cluster
                .locations_of(function)
                .is_some_and(|locations| locations.contains(location))
            {
                info!(
                    "Keep pin of {} on {}, it is used by another DAG",
                    function, location
                );
                continue;
            }
            info!("Rolling back pin of {} on {}", function, location);
            self.executor_client.send_unpin(location, function);
        }
    }
}
