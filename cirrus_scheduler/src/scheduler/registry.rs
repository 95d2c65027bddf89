//! Registries of functions and DAGs.

use ::std::collections::BTreeMap;

use ::cirrus_common::{
    anyhow::anyhow,
    dag::{DagInfo, DagName},
    error::{CirrusError, Result},
    function::{function_key, function_name, CreateFunctionRequest, FunctionName, FUNC_LIST_KEY},
    kvs::KvsClient,
    lattice::LatticeValue,
};
use ::tracing::{debug, info};

/// Write the function body under its key, then add the key to the function list.
/// The read-modify-write of the list is only safe because the scheduler handles
/// one registry write at a time.
pub(crate) async fn create_function<K: KvsClient>(
    kvs: &K,
    request: CreateFunctionRequest,
) -> Result<()> {
    let CreateFunctionRequest {
        name,
        body,
        consistency,
    } = request;
    if name.is_empty() {
        return Err(CirrusError::illegal_argument(anyhow!(
            "Function name cannot be empty."
        )));
    }
    let key = function_key(&name);
    info!("Creating function {}.", key);
    kvs.put(&key, LatticeValue::from_payload(consistency, body))
        .await?;

    let mut keys = read_function_list(kvs).await?;
    if keys.contains(&key) {
        debug!("Function {} is already in the function list", key);
        return Ok(());
    }
    keys.push(key);
    let payload = serde_json::to_vec(&keys).map_err(CirrusError::fail_to_update_store)?;
    kvs.put(FUNC_LIST_KEY, LatticeValue::lww(payload)).await
}

/// Names of every registered function, in registration order.
pub(crate) async fn list_functions<K: KvsClient>(kvs: &K) -> Result<Vec<FunctionName>> {
    let keys = read_function_list(kvs).await?;
    Ok(keys
        .iter()
        .filter_map(|key| function_name(key))
        .map(str::to_owned)
        .collect())
}

async fn read_function_list<K: KvsClient>(kvs: &K) -> Result<Vec<String>> {
    match kvs.get(FUNC_LIST_KEY).await? {
        None => Ok(vec![]),
        Some(value) => {
            let payload = value.lww_payload().ok_or_else(|| {
                CirrusError::fail_to_read_store(anyhow!(
                    "Function list is not a last-writer-wins value"
                ))
            })?;
            serde_json::from_slice(payload).map_err(CirrusError::fail_to_read_store)
        }
    }
}

/// DAGs known by this scheduler.
#[derive(Debug, Default)]
pub struct DagRegistry {
    dags: BTreeMap<DagName, DagInfo>,
}

impl DagRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.dags.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DagInfo> {
        self.dags.get(name)
    }

    /// Sorted DAG names
    pub fn names(&self) -> Vec<DagName> {
        self.dags.keys().cloned().collect()
    }

    pub(crate) fn insert(&mut self, info: DagInfo) {
        self.dags.insert(info.dag.name.clone(), info);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<DagInfo> {
        self.dags.remove(name)
    }
}
