//! Key-value store holding function bodies, DAG definitions and the function list.

pub mod surrealdb_client;

use ::core::future::Future;

use crate::error::Result;
use crate::lattice::LatticeValue;

/// Client of the shared key-value store.
/// Conflicting writes to the same key are resolved by merging lattice values in the store.
pub trait KvsClient: Sized + Send + Sync + 'static {
    /// Write `value` under `key`, merging it with the value already stored.
    /// # Return
    /// - `Ok(())` if the value is stored.
    /// - `Err(_)` if any error occurs in the store.
    fn put(&self, key: &str, value: LatticeValue) -> impl Future<Output = Result<()>> + Send;

    /// Return `Ok(None)` if nothing is stored under `key`
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<LatticeValue>>> + Send;
}
