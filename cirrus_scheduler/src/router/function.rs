//! Restful API for function management.

use ::axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use ::cirrus_common::{
    function::{CreateFunctionRequest, FunctionName, FunctionPlacement},
    kvs::KvsClient,
};

use crate::{error::Result, executor::ExecutorClient, state::AppState};

async fn create_function<K: KvsClient, E: ExecutorClient>(
    State(state): State<AppState<K, E>>,
    Json(body): Json<CreateFunctionRequest>,
) -> Result<()> {
    state
        .get_scheduler()
        .lock()
        .await
        .create_function(body)
        .await?;
    Ok(())
}

async fn list_functions<K: KvsClient, E: ExecutorClient>(
    State(state): State<AppState<K, E>>,
) -> Result<Json<Vec<FunctionName>>> {
    let names = state.get_scheduler().lock().await.list_functions().await?;
    Ok(Json(names))
}

/// Where a function is pinned and how often it was called.
async fn get_function<K: KvsClient, E: ExecutorClient>(
    Path(name): Path<FunctionName>,
    State(state): State<AppState<K, E>>,
) -> Result<Json<FunctionPlacement>> {
    let placement = state
        .get_scheduler()
        .lock()
        .await
        .get_function_placement(&name)?;
    Ok(Json(placement))
}

async fn record_call<K: KvsClient, E: ExecutorClient>(
    Path(name): Path<FunctionName>,
    State(state): State<AppState<K, E>>,
) -> Result<Json<u64>> {
    let count = state.get_scheduler().lock().await.record_call(&name)?;
    Ok(Json(count))
}

pub(crate) fn get_function_router<K: KvsClient, E: ExecutorClient>() -> Router<AppState<K, E>> {
    Router::new()
        .route("/", post(create_function::<K, E>).get(list_functions::<K, E>))
        .route("/:name", get(get_function::<K, E>))
        .route("/:name/call", post(record_call::<K, E>))
}
