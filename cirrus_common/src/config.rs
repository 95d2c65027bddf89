//! Configuration shared by the Cirrus binaries.

use crate::error::{CirrusError, Result};
use ::clap::Parser;
use ::serde::{de::DeserializeOwned, Deserialize};
use ::serde_json::from_reader;
use ::std::{fs::File, io::BufReader};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Command line arguments for the Cirrus scheduler.
pub struct Args {
    /// path to the config file
    #[arg(long)]
    pub config_path: String,
}

impl Args {
    /// helper function for exporting the `clap::Parser::parse` function
    pub fn parse_args() -> Self {
        Args::parse()
    }
}

/// Credentials for signing in to a remote store.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Where the function and DAG definitions are persisted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub enum StoreVariant {
    /// In-memory store living in the scheduler process. Lost on restart.
    Embedded,
    /// Store server reached over WebSocket, e.g. `ws://127.0.0.1:8000`
    Remote { uri: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub credentials: Option<Credentials>,
    pub variant: StoreVariant,
}

/// Load a JSON configuration file into `C`.
pub fn load_config<C: DeserializeOwned>(path: &str) -> Result<C> {
    let file = File::open(path).map_err(CirrusError::fail_to_load_config)?;
    let reader = BufReader::new(file);
    from_reader(reader).map_err(CirrusError::fail_to_load_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CirrusErrorType;
    use ::anyhow::Result;
    use ::serde_json::{from_value, json};

    #[test]
    fn deserialize_embedded_store() -> Result<()> {
        let config = json!(
            {
                "credentials": null,
                "variant": "Embedded"
            }
        );
        let result = from_value::<StoreConfig>(config)?;
        assert_eq!(
            result,
            StoreConfig {
                credentials: None,
                variant: StoreVariant::Embedded
            }
        );
        Ok(())
    }

    #[test]
    fn deserialize_remote_store() -> Result<()> {
        let config = json!(
            {
                "credentials": {
                    "username": "admin",
                    "password": "admin"
                },
                "variant": {
                    "Remote": {
                        "uri": "ws://127.0.0.1:8000"
                    }
                }
            }
        );
        let result = from_value::<StoreConfig>(config)?;
        assert_eq!(
            result,
            StoreConfig {
                credentials: Some(Credentials {
                    username: "admin".to_owned(),
                    password: "admin".to_owned()
                }),
                variant: StoreVariant::Remote {
                    uri: "ws://127.0.0.1:8000".to_owned()
                }
            }
        );
        Ok(())
    }

    #[test]
    fn missing_field_variant() {
        let config = json!(
            {
                "credentials": null
            }
        );
        let result = from_value::<StoreConfig>(config);
        assert_eq!(result.unwrap_err().to_string(), "missing field `variant`");
    }

    #[test]
    fn deny_unknown_fields() {
        let config = json!(
            {
                "credentials": null,
                "variant": "Embedded",
                "unknown_field": "unknown"
            }
        );
        let result = from_value::<StoreConfig>(config);
        assert_eq!(
            result.unwrap_err().to_string(),
            "unknown field `unknown_field`, expected `credentials` or `variant`"
        );
    }

    #[test]
    fn load_config_from_missing_file() {
        let result = load_config::<StoreConfig>("/not/exist/config.json");
        assert!(result.is_err_and(|e| e.get_error_type() == CirrusErrorType::FailToLoadConfig));
    }
}
