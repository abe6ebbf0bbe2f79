use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{NutrientsResponse, SearchQuery};
use super::repo_types::{FoodId, FoodRecord};
use crate::state::AppState;

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods/search", get(search_foods))
        .route("/foods/nutrients", get(list_nutrients))
        .route("/foods/:id", get(get_food))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Json<Vec<String>> {
    let names = state.catalog.search(&q.q, q.mode);
    debug!(matches = names.len(), "food search");
    Json(names)
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FoodRecord>, (StatusCode, String)> {
    state
        .catalog
        .get(FoodId(id))
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Food not found".into()))
}

pub async fn list_nutrients(State(state): State<AppState>) -> Json<NutrientsResponse> {
    Json(NutrientsResponse {
        nutrients: state.catalog.nutrients().to_vec(),
    })
}
