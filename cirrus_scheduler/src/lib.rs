use ::std::{
    num::{NonZeroU64, NonZeroUsize},
    time::Duration,
};

use ::axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use ::cirrus_common::{config::StoreConfig, error::Result, kvs::KvsClient};
use ::serde::Deserialize;
use ::tower_http::trace::TraceLayer;
use executor::{ExecutorClient, PinSender};
use router::{
    dag::get_dag_router,
    executor::{get_executor_router, pin_accept},
    function::get_function_router,
};
use scheduler::{PlacementOptions, Scheduler};
use state::AppState;

pub(crate) mod error;
pub mod executor;
pub(crate) mod router;
pub mod scheduler;
pub(crate) mod state;

const DEFAULT_NUM_REPLICAS: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => unreachable!(),
};

fn default_num_replicas() -> NonZeroUsize {
    DEFAULT_NUM_REPLICAS
}

/// Configuration for cirrus scheduler
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Address executors use to reach this scheduler, sent with every pin request.
    pub ip: String,
    pub port: u16,
    pub pin_timeout_millis: NonZeroU64,
    #[serde(default = "default_num_replicas")]
    pub default_num_replicas: NonZeroUsize,
    pub store: StoreConfig,
}

impl SchedulerConfig {
    pub fn placement_options(&self) -> PlacementOptions {
        PlacementOptions {
            ip: self.ip.clone(),
            pin_timeout: Duration::from_millis(self.pin_timeout_millis.get()),
            default_num_replicas: self.default_num_replicas,
        }
    }
}

/// This is the only entry for users to get the cirrus scheduler.
/// `pin_sender` must feed the pin acceptor owned by `scheduler`.
/// # Return the router for the server
pub fn get_server<K, E>(scheduler: Scheduler<K, E>, pin_sender: PinSender) -> Result<Router>
where
    K: KvsClient,
    E: ExecutorClient,
{
    let app_state = AppState::new(scheduler, pin_sender);

    let router = Router::new()
        .route(
            "/",
            get(|_: State<AppState<K, E>>| async { "welcome to cirrus" }),
        )
        .nest("/function", get_function_router())
        .nest("/dag", get_dag_router())
        .nest("/executor", get_executor_router())
        .route("/pin_accept", post(pin_accept::<K, E>))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);
    Ok(router)
}
