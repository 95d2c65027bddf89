//! Client of SurrealDB

use ::surrealdb::{
    engine::any::{connect, Any},
    opt::auth::Root,
    Surreal,
};
use ::tracing::debug;

use super::KvsClient;
use crate::{
    config::{Credentials, StoreConfig, StoreVariant},
    error::{CirrusError, Result},
    lattice::LatticeValue,
};

/// Store lattice values in a SurrealDB table, one record per key.
/// Values are kept as JSON strings so the lattice encoding stays under our control.
#[derive(Clone)]
pub struct SurrealKvsClient {
    client: Surreal<Any>,
}

impl SurrealKvsClient {
    const TABLE: &'static str = "kvs";
    const NAMESPACE: &'static str = "cirrus";
    const DATABASE: &'static str = "cirrus";
    const EMBEDDED_ENDPOINT: &'static str = "mem://";

    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let endpoint = match &config.variant {
            StoreVariant::Embedded => Self::EMBEDDED_ENDPOINT,
            StoreVariant::Remote { uri } => uri.as_str(),
        };
        let client = connect(endpoint)
            .await
            .map_err(CirrusError::fail_to_connect_store)?;
        if let (StoreVariant::Remote { .. }, Some(Credentials { username, password })) =
            (&config.variant, &config.credentials)
        {
            client
                .signin(Root { username, password })
                .await
                .map_err(CirrusError::fail_to_connect_store)?;
        }
        client
            .use_ns(Self::NAMESPACE)
            .use_db(Self::DATABASE)
            .await
            .map_err(CirrusError::fail_to_connect_store)?;
        debug!("Connected to store at {}", endpoint);
        Ok(Self { client })
    }
}

impl KvsClient for SurrealKvsClient {
    async fn put(&self, key: &str, value: LatticeValue) -> Result<()> {
        // The merge happens on this side, so concurrent writers to one key may still race.
        let merged = match self.get(key).await? {
            Some(current) => current.merge(value),
            None => value,
        };
        let encoded = serde_json::to_string(&merged).map_err(CirrusError::fail_to_update_store)?;
        let sql = r#"
            UPSERT type::thing($tb, $key) SET value = $value;
        "#;
        self.client
            .query(sql)
            .bind(("tb", Self::TABLE))
            .bind(("key", key.to_owned()))
            .bind(("value", encoded))
            .await
            .map_err(CirrusError::fail_to_update_store)?
            .check()
            .map_err(CirrusError::fail_to_update_store)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<LatticeValue>> {
        let sql = r#"
            SELECT VALUE value
            FROM ONLY type::thing($tb, $key);
        "#;
        let encoded: Option<String> = self
            .client
            .query(sql)
            .bind(("tb", Self::TABLE))
            .bind(("key", key.to_owned()))
            .await
            .map_err(CirrusError::fail_to_read_store)?
            .take(0)
            .map_err(CirrusError::fail_to_read_store)?;
        encoded
            .map(|encoded| serde_json::from_str(&encoded))
            .transpose()
            .map_err(CirrusError::fail_to_read_store)
    }
}
