use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{AddMacroRequest, MacrosResponse, RankingQuery, SummaryQuery, SummaryResponse};
use super::ranking::{rank, RankedMeal};
use super::summary::{join_and_summarize, pie_breakdown};
use crate::error::ValidationError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analysis/summary", get(get_summary))
        .route("/analysis/ranking", get(get_ranking))
        .route("/analysis/macros", get(list_macros).post(add_macro))
        .route("/analysis/macros/:index", delete(remove_macro))
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    Query(q): Query<SummaryQuery>,
) -> Json<SummaryResponse> {
    let selection = state.selection.read().await.clone();
    let summary = {
        let log = state.log.read().await;
        join_and_summarize(&state.catalog, &log, &selection, q.trusted_only)
    };
    let pie = pie_breakdown(&summary.macro_totals);
    Json(SummaryResponse {
        trusted_only: q.trusted_only,
        macros: selection.names().to_vec(),
        rows: summary.rows,
        macro_totals: summary.macro_totals,
        pie,
        correlation: summary.correlation,
    })
}

#[instrument(skip(state))]
pub async fn get_ranking(
    State(state): State<AppState>,
    Query(q): Query<RankingQuery>,
) -> Json<Vec<RankedMeal>> {
    let log = state.log.read().await;
    Json(rank(&log, q.trusted_only, q.ascending))
}

#[instrument(skip(state))]
pub async fn list_macros(State(state): State<AppState>) -> Json<MacrosResponse> {
    let selected = state.selection.read().await.names().to_vec();
    Json(MacrosResponse { selected })
}

#[instrument(skip(state, body))]
pub async fn add_macro(
    State(state): State<AppState>,
    Json(body): Json<AddMacroRequest>,
) -> Result<Json<MacrosResponse>, (StatusCode, String)> {
    let name = body.name.trim();
    if !state.catalog.has_nutrient(name) {
        let e = ValidationError::UnknownMacro(name.to_string());
        warn!(error = %e, "macro rejected");
        return Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }
    let mut selection = state.selection.write().await;
    *selection = selection.with(name);
    info!(macro_name = %name, selected = selection.len(), "macro selected");
    Ok(Json(MacrosResponse {
        selected: selection.names().to_vec(),
    }))
}

#[instrument(skip(state))]
pub async fn remove_macro(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<MacrosResponse>, (StatusCode, String)> {
    let mut selection = state.selection.write().await;
    let Some(next) = selection.without_index(index) else {
        return Err((StatusCode::NOT_FOUND, format!("no macro at position {index}")));
    };
    *selection = next;
    info!(index, selected = selection.len(), "macro removed");
    Ok(Json(MacrosResponse {
        selected: selection.names().to_vec(),
    }))
}
