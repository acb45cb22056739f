//! HTTP handlers. Each entity gets the same five routes, mounted by
//! [`resource`] from one set of generic handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::error::ApiError;
use crate::seed;
use crate::store::{self, Entity};
use crate::Db;

/// Mount `GET|POST /{path}` and `GET|PUT|DELETE /{path}/{id}` for `E`.
pub(crate) fn resource<E: Entity>(router: Router<Db>) -> Router<Db> {
    let collection = format!("/{}", E::PATH);
    let item = format!("/{}/{{id}}", E::PATH);
    router
        .route(&collection, get(find_all::<E>).post(insert::<E>))
        .route(&item, get(find::<E>).put(update::<E>).delete(delete::<E>))
}

pub(crate) fn devmode(router: Router<Db>) -> Router<Db> {
    router
        .route("/devmode/populate", post(populate))
        .route("/devmode/depopulate", post(depopulate))
}

async fn find_all<E: Entity>(
    State(db): State<Db>,
    filter: Result<Query<E::Filter>, QueryRejection>,
) -> Result<Json<Vec<E>>, ApiError> {
    let Query(filter) = filter?;
    let library = db.read().await;
    Ok(Json(library.find_all::<E>(&filter)))
}

async fn find<E: Entity>(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<E>, ApiError> {
    let Path(id) = id?;
    let library = db.read().await;
    library.find::<E>(id).map(Json)
}

async fn insert<E: Entity>(
    State(db): State<Db>,
    payload: Result<Json<E::Payload>, JsonRejection>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let Json(payload) = payload?;
    let record = db.write().await.insert::<E>(payload)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update<E: Entity>(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<E::Payload>, JsonRejection>,
) -> Result<Json<E>, ApiError> {
    let Path(id) = id?;
    let mut library = db.write().await;
    // An unknown id wins over an undecodable body.
    if !library.contains::<E>(id) {
        return Err(store::not_found::<E>(id));
    }
    let Json(payload) = payload?;
    library.update::<E>(id, payload).map(Json)
}

async fn delete<E: Entity>(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    db.write().await.delete::<E>(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn populate(State(db): State<Db>) -> Result<StatusCode, ApiError> {
    seed::populate(&mut *db.write().await)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn depopulate(State(db): State<Db>) -> StatusCode {
    db.write().await.clear();
    tracing::info!("cleared catalog");
    StatusCode::NO_CONTENT
}
