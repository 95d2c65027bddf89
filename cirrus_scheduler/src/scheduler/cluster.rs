//! Bookkeeping of where functions are pinned.

use ::std::collections::{BTreeMap, BTreeSet};

use ::cirrus_common::{executor::ExecutorLocation, function::FunctionName};

use super::placement::PlacementLog;

/// Cluster-wide placement state of one scheduler.
/// Only the placement engine mutates it.
#[derive(Debug, Default)]
pub struct ClusterState {
    function_locations: BTreeMap<FunctionName, BTreeSet<ExecutorLocation>>,
    call_frequency: BTreeMap<FunctionName, u64>,
    /// Slots that can be pinned.
    executors: BTreeSet<ExecutorLocation>,
}

impl ClusterState {
    pub fn executors(&self) -> &BTreeSet<ExecutorLocation> {
        &self.executors
    }

    pub fn locations_of(&self, function: &str) -> Option<&BTreeSet<ExecutorLocation>> {
        self.function_locations.get(function)
    }

    pub fn call_frequency_of(&self, function: &str) -> Option<u64> {
        self.call_frequency.get(function).copied()
    }

    pub fn function_locations(&self) -> &BTreeMap<FunctionName, BTreeSet<ExecutorLocation>> {
        &self.function_locations
    }

    pub fn call_frequency(&self) -> &BTreeMap<FunctionName, u64> {
        &self.call_frequency
    }

    /// Number of functions pinned to `location`.
    pub fn pinned_count(&self, location: &ExecutorLocation) -> usize {
        self.function_locations
            .values()
            .filter(|locations| locations.contains(location))
            .count()
    }

    /// Return `false` if the slot was already known.
    pub(crate) fn add_executor(&mut self, location: ExecutorLocation) -> bool {
        self.executors.insert(location)
    }

    pub(crate) fn remove_executor(&mut self, location: &ExecutorLocation) -> bool {
        self.executors.remove(location)
    }

    /// Record every pin of a successful placement.
    pub(crate) fn commit(&mut self, log: PlacementLog) {
        for (location, function) in log.into_pins() {
            self.call_frequency.entry(function.clone()).or_insert(0);
            self.function_locations
                .entry(function)
                .or_default()
                .insert(location);
        }
    }

    /// Forget a function and return the locations it was pinned to.
    pub(crate) fn remove_function(&mut self, function: &str) -> BTreeSet<ExecutorLocation> {
        self.call_frequency.remove(function);
        self.function_locations.remove(function).unwrap_or_default()
    }

    /// Return the new call count, or `None` if the function is not pinned.
    pub(crate) fn record_call(&mut self, function: &str) -> Option<u64> {
        self.call_frequency.get_mut(function).map(|count| {
            *count += 1;
            *count
        })
    }
}
