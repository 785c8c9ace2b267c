use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{error::ApiError, food::FoodItem, nutrition::client::FoodDetail, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition/search", get(search))
        .route("/nutrition/id/:id", get(detail))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FoodItem>>, ApiError> {
    let items = state.nutrition.search(&params.q).await?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FoodDetail>, ApiError> {
    let detail = state.nutrition.detail(&id).await?;
    Ok(Json(detail))
}
