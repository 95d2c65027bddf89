//! DAG of functions.

use ::std::{collections::BTreeSet, num::NonZeroUsize};

use ::anyhow::anyhow;
use ::serde::{Deserialize, Serialize};

use crate::{
    error::{CirrusError, Result},
    function::{FunctionName, FUNC_PREFIX},
};

pub type DagName = String;

/// Output of `source` is the input of `sink`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Connection {
    pub source: FunctionName,
    pub sink: FunctionName,
}

impl Connection {
    pub fn new(source: impl Into<FunctionName>, sink: impl Into<FunctionName>) -> Self {
        Self {
            source: source.into(),
            sink: sink.into(),
        }
    }
}

/// A directed acyclic graph of functions.
/// Acyclicity is the caller's responsibility and is not checked here.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Dag {
    pub name: DagName,
    /// Functions in the order they are placed.
    pub functions: Vec<FunctionName>,
    pub connections: Vec<Connection>,
}

impl Dag {
    /// Functions without incoming connections, where arguments enter the DAG.
    pub fn sources(&self) -> BTreeSet<FunctionName> {
        self.functions
            .iter()
            .filter(|function| !self.connections.iter().any(|c| &c.sink == *function))
            .cloned()
            .collect()
    }

    /// Check the DAG is well formed before anything is placed.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CirrusError::illegal_argument(anyhow!(
                "DAG name cannot be empty."
            )));
        }
        // DAG definitions share the store keyspace with functions
        if self.name.starts_with(FUNC_PREFIX) {
            return Err(CirrusError::illegal_argument(anyhow!(
                "DAG name {} cannot start with {}.",
                self.name,
                FUNC_PREFIX
            )));
        }
        if self.functions.is_empty() {
            return Err(CirrusError::illegal_argument(anyhow!(
                "DAG {} has no function.",
                self.name
            )));
        }
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = self.functions.iter().find(|f| !seen.insert(*f)) {
            return Err(CirrusError::illegal_argument(anyhow!(
                "Function {} appears more than once in DAG {}.",
                duplicate,
                self.name
            )));
        }
        match self
            .connections
            .iter()
            .flat_map(|c| [&c.source, &c.sink])
            .find(|f| !seen.contains(f))
        {
            Some(unknown) => Err(CirrusError::illegal_argument(anyhow!(
                "Connection endpoint {} is not a function of DAG {}.",
                unknown,
                self.name
            ))),
            None => Ok(()),
        }
    }
}

/// Request body to create a DAG.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreateDagRequest {
    pub name: DagName,
    pub functions: Vec<FunctionName>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Number of executors each function is pinned to. Falls back to the scheduler default.
    #[serde(default)]
    pub num_replicas: Option<NonZeroUsize>,
}

impl CreateDagRequest {
    pub fn into_parts(self) -> (Dag, Option<NonZeroUsize>) {
        let Self {
            name,
            functions,
            connections,
            num_replicas,
        } = self;
        (
            Dag {
                name,
                functions,
                connections,
            },
            num_replicas,
        )
    }
}

/// A registered DAG with its source functions.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DagInfo {
    pub dag: Dag,
    pub sources: BTreeSet<FunctionName>,
}

impl From<Dag> for DagInfo {
    fn from(dag: Dag) -> Self {
        let sources = dag.sources();
        Self { dag, sources }
    }
}
