//! Restful API for DAG management.

use ::axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use ::cirrus_common::{
    dag::{CreateDagRequest, DagInfo, DagName},
    kvs::KvsClient,
};
use ::tracing::info;

use crate::{error::Result, executor::ExecutorClient, state::AppState};

/// Create a DAG and place its functions.
/// The scheduler stays locked until every replica is pinned or the placement is rolled back.
async fn create_dag<K: KvsClient, E: ExecutorClient>(
    State(state): State<AppState<K, E>>,
    Json(body): Json<CreateDagRequest>,
) -> Result<()> {
    let (dag, num_replicas) = body.into_parts();
    state
        .get_scheduler()
        .lock()
        .await
        .create_dag(dag, num_replicas)
        .await?;
    Ok(())
}

async fn delete_dag<K: KvsClient, E: ExecutorClient>(
    Path(name): Path<DagName>,
    State(state): State<AppState<K, E>>,
) -> Result<()> {
    info!("Deleting DAG {}", name);
    state.get_scheduler().lock().await.delete_dag(&name).await?;
    Ok(())
}

async fn get_dag<K: KvsClient, E: ExecutorClient>(
    Path(name): Path<DagName>,
    State(state): State<AppState<K, E>>,
) -> Result<Json<DagInfo>> {
    let info = state.get_scheduler().lock().await.get_dag(&name)?;
    Ok(Json(info))
}

async fn list_dags<K: KvsClient, E: ExecutorClient>(
    State(state): State<AppState<K, E>>,
) -> Json<Vec<DagName>> {
    Json(state.get_scheduler().lock().await.list_dags())
}

pub(crate) fn get_dag_router<K: KvsClient, E: ExecutorClient>() -> Router<AppState<K, E>> {
    Router::new()
        .route("/", post(create_dag::<K, E>).get(list_dags::<K, E>))
        .route("/:name", get(get_dag::<K, E>).delete(delete_dag::<K, E>))
}
