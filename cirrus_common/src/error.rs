use ::core::fmt::Display;

use ::anyhow::{anyhow, Error};

pub type Result<T> = std::result::Result<T, CirrusError>;

/// Kinds of failures surfaced by the control plane.
/// Each kind is returned to the caller as an explicit response, never as a process failure.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CirrusErrorType {
    IllegalArgument,
    DagAlreadyExists,
    NoSuchDag,
    NoSuchFunction,
    /// Not enough executors left to place every replica of a DAG.
    NoResources,
    FailToContactExecutor,
    FailToConnectStore,
    FailToUpdateStore,
    FailToReadStore,
    FailToLoadConfig,
    FailToStartServer,
}

impl Display for CirrusErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::IllegalArgument => "Illegal argument",
            Self::DagAlreadyExists => "DAG already exists",
            Self::NoSuchDag => "No such DAG",
            Self::NoSuchFunction => "No such function",
            Self::NoResources => "No resources",
            Self::FailToContactExecutor => "Fail to contact executor",
            Self::FailToConnectStore => "Fail to connect store",
            Self::FailToUpdateStore => "Fail to update store",
            Self::FailToReadStore => "Fail to read store",
            Self::FailToLoadConfig => "Fail to load config",
            Self::FailToStartServer => "Fail to start server",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
pub struct CirrusError {
    error_type: CirrusErrorType,
    cause: Error,
}

macro_rules! define_constructor {
    ($name: ident, $error_type: ident) => {
        pub fn $name<E: Into<Error>>(cause: E) -> Self {
            Self::new(CirrusErrorType::$error_type, cause.into())
        }
    };
}

impl CirrusError {
    fn new(error_type: CirrusErrorType, cause: Error) -> Self {
        Self { error_type, cause }
    }

    pub fn get_error_type(&self) -> CirrusErrorType {
        self.error_type
    }

    define_constructor!(illegal_argument, IllegalArgument);
    define_constructor!(no_resources, NoResources);
    define_constructor!(fail_to_contact_executor, FailToContactExecutor);
    define_constructor!(fail_to_connect_store, FailToConnectStore);
    define_constructor!(fail_to_update_store, FailToUpdateStore);
    define_constructor!(fail_to_read_store, FailToReadStore);
    define_constructor!(fail_to_load_config, FailToLoadConfig);
    define_constructor!(fail_to_start_server, FailToStartServer);

    pub fn dag_already_exists(name: &str) -> Self {
        Self::new(
            CirrusErrorType::DagAlreadyExists,
            anyhow!("DAG {} is already registered", name),
        )
    }

    pub fn no_such_dag(name: &str) -> Self {
        Self::new(
            CirrusErrorType::NoSuchDag,
            anyhow!("DAG {} not found", name),
        )
    }

    pub fn no_such_function(name: &str) -> Self {
        Self::new(
            CirrusErrorType::NoSuchFunction,
            anyhow!("Function {} is not pinned anywhere", name),
        )
    }
}

impl Display for CirrusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type, self.cause)
    }
}

impl std::error::Error for CirrusError {}

impl<T> From<CirrusError> for Result<T> {
    fn from(val: CirrusError) -> Self {
        Result::Err(val)
    }
}
