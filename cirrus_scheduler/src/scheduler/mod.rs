//! The placement engine.
//!
//! A [Scheduler] owns the cluster bookkeeping, the DAG registry, the store client
//! and the executor transport. Every operation takes `&mut self`, so one scheduler
//! handles one control request at a time and a DAG creation is never interleaved
//! with another registry write.

mod cluster;
mod placement;
mod registry;

use ::std::{num::NonZeroUsize, time::Duration};

use ::cirrus_common::{
    anyhow::anyhow,
    dag::{Dag, DagInfo, DagName},
    error::{CirrusError, Result},
    executor::ExecutorLocation,
    function::{CreateFunctionRequest, FunctionName, FunctionPlacement},
    kvs::KvsClient,
    lattice::LatticeValue,
};
use ::tracing::{error, info};

pub use cluster::ClusterState;
pub use registry::DagRegistry;

use crate::executor::{ExecutorClient, PinAcceptor};
use placement::PlacementLog;

/// Parameters of the placement engine.
#[derive(Debug, Clone)]
pub struct PlacementOptions {
    /// Address of this scheduler, sent along with pin requests.
    pub ip: String,
    /// How long to wait for an executor to answer a pin request.
    pub pin_timeout: Duration,
    /// Replication factor of DAGs created without an explicit one.
    pub default_num_replicas: NonZeroUsize,
}

pub struct Scheduler<K, E> {
    kvs: K,
    executor_client: E,
    pin_acceptor: PinAcceptor,
    options: PlacementOptions,
    cluster: ClusterState,
    dags: DagRegistry,
}

impl<K, E> Scheduler<K, E>
where
    K: KvsClient,
    E: ExecutorClient,
{
    pub fn new(
        kvs: K,
        executor_client: E,
        pin_acceptor: PinAcceptor,
        options: PlacementOptions,
    ) -> Self {
        Self {
            kvs,
            executor_client,
            pin_acceptor,
            options,
            cluster: ClusterState::default(),
            dags: DagRegistry::default(),
        }
    }

    pub fn cluster(&self) -> &ClusterState {
        &self.cluster
    }

    pub fn dags(&self) -> &DagRegistry {
        &self.dags
    }

    /// Store the function body and add the function to the function list.
    pub async fn create_function(&mut self, request: CreateFunctionRequest) -> Result<()> {
        registry::create_function(&self.kvs, request).await
    }

    pub async fn list_functions(&self) -> Result<Vec<FunctionName>> {
        registry::list_functions(&self.kvs).await
    }

    /// Create a DAG and pin each of its functions to `num_replicas` distinct executors.
    ///
    /// Functions are placed in order, one replica at a time. If any replica cannot be
    /// placed, every pin made by this call is undone and nothing is registered.
    /// # Return
    /// - `Ok(())` if the DAG is registered and fully placed.
    /// - `Err(_)` with `DagAlreadyExists` if the name is taken, nothing changes.
    /// - `Err(_)` with `NoResources` if there are not enough executors.
    pub async fn create_dag(&mut self, dag: Dag, num_replicas: Option<NonZeroUsize>) -> Result<()> {
        if self.dags.contains(&dag.name) {
            return Err(CirrusError::dag_already_exists(&dag.name));
        }
        dag.validate()?;
        let num_replicas = num_replicas.unwrap_or(self.options.default_num_replicas);
        info!(
            "Creating DAG {} with {} replicas per function.",
            dag.name, num_replicas
        );

        let serialized = serde_json::to_vec(&dag).map_err(CirrusError::fail_to_update_store)?;
        self.kvs
            .put(&dag.name, LatticeValue::lww(serialized))
            .await?;

        let mut log = PlacementLog::default();
        for function in &dag.functions {
            let mut candidates = self.cluster.executors().clone();
            for _ in 0..num_replicas.get() {
                match self.pin_function(function, &mut candidates, &log).await {
                    Some(location) => {
                        candidates.remove(&location);
                        log.record(location, function.clone());
                    }
                    None => {
                        error!(
                            "Creating DAG {} failed: not enough executors for {}.",
                            dag.name, function
                        );
                        self.rollback(&log);
                        return Err(CirrusError::no_resources(anyhow!(
                            "Not enough executors to place {} replicas of {} in DAG {}",
                            num_replicas,
                            function,
                            dag.name
                        )));
                    }
                }
            }
        }

        self.cluster.commit(log);
        info!("DAG {} created.", dag.name);
        self.dags.insert(DagInfo::from(dag));
        Ok(())
    }

    /// Unpin every function of a DAG and forget it.
    /// The slots that held its functions leave the executor pool.
    /// Definitions in the store are kept.
    pub async fn delete_dag(&mut self, name: &str) -> Result<()> {
        let info = self
            .dags
            .get(name)
            .cloned()
            .ok_or_else(|| CirrusError::no_such_dag(name))?;

        for function in &info.dag.functions {
            for location in self.cluster.remove_function(function) {
                self.executor_client.send_unpin(&location, function);
                self.cluster.remove_executor(&location);
            }
        }

        self.dags.remove(name);
        info!("DAG {} deleted.", name);
        Ok(())
    }

    pub fn get_dag(&self, name: &str) -> Result<DagInfo> {
        self.dags
            .get(name)
            .cloned()
            .ok_or_else(|| CirrusError::no_such_dag(name))
    }

    pub fn list_dags(&self) -> Vec<DagName> {
        self.dags.names()
    }

    /// Add an executor slot to the pool. Registering a known slot does nothing.
    pub fn register_executor(&mut self, location: ExecutorLocation) {
        let description = location.to_string();
        if self.cluster.add_executor(location) {
            info!("Executor {} joins the pool", description);
        }
    }

    /// Remove an executor slot from the pool. Functions already pinned to it stay pinned.
    pub fn deregister_executor(&mut self, location: &ExecutorLocation) {
        if self.cluster.remove_executor(location) {
            info!("Executor {} leaves the pool", location);
        }
    }

    pub fn list_executors(&self) -> Vec<ExecutorLocation> {
        self.cluster.executors().iter().cloned().collect()
    }

    pub fn get_function_placement(&self, function: &str) -> Result<FunctionPlacement> {
        match (
            self.cluster.locations_of(function),
            self.cluster.call_frequency_of(function),
        ) {
            (Some(locations), Some(call_frequency)) => Ok(FunctionPlacement {
                locations: locations.clone(),
                call_frequency,
            }),
            _ => Err(CirrusError::no_such_function(function)),
        }
    }

    /// Count one call of a pinned function and return the new count.
    pub fn record_call(&mut self, function: &str) -> Result<u64> {
        self.cluster
            .record_call(function)
            .ok_or_else(|| CirrusError::no_such_function(function))
    }
}
