//! Restful API for the executor pool and pin replies.

use ::axum::{
    extract::{Path, State},
    routing::{delete, post},
    Json, Router,
};
use ::cirrus_common::{
    executor::{ExecutorLocation, PinResponse},
    kvs::KvsClient,
};
use ::tokio::sync::mpsc::error::TrySendError;
use ::tracing::{debug, warn};

use crate::{executor::ExecutorClient, state::AppState};

async fn register_executor<K: KvsClient, E: ExecutorClient>(
    State(state): State<AppState<K, E>>,
    Json(location): Json<ExecutorLocation>,
) {
    state
        .get_scheduler()
        .lock()
        .await
        .register_executor(location);
}

async fn deregister_executor<K: KvsClient, E: ExecutorClient>(
    Path((node, slot)): Path<(String, u16)>,
    State(state): State<AppState<K, E>>,
) {
    let location = ExecutorLocation::new(node, slot);
    state
        .get_scheduler()
        .lock()
        .await
        .deregister_executor(&location);
}

async fn list_executors<K: KvsClient, E: ExecutorClient>(
    State(state): State<AppState<K, E>>,
) -> Json<Vec<ExecutorLocation>> {
    Json(state.get_scheduler().lock().await.list_executors())
}

/// Hand a pin reply over to the placement in progress.
/// Must not lock the scheduler: the placement waiting for this reply holds the lock.
pub(crate) async fn pin_accept<K: KvsClient, E: ExecutorClient>(
    State(state): State<AppState<K, E>>,
    Json(response): Json<PinResponse>,
) {
    debug!(
        "Pin reply from {}: success = {}",
        response.location, response.success
    );
    match state.get_pin_sender().try_send(response) {
        Ok(()) => {}
        Err(TrySendError::Full(response)) => {
            warn!("Too many pending pin replies, drop the one from {}", response.location)
        }
        Err(TrySendError::Closed(response)) => {
            warn!("Scheduler stopped, drop the pin reply from {}", response.location)
        }
    }
}

pub(crate) fn get_executor_router<K: KvsClient, E: ExecutorClient>() -> Router<AppState<K, E>> {
    Router::new()
        .route(
            "/",
            post(register_executor::<K, E>).get(list_executors::<K, E>),
        )
        .route("/:node/:slot", delete(deregister_executor::<K, E>))
}
