use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{CreateMealRequest, CreatedMealResponse, MealListResponse, Pagination, ReloadResponse};
use super::services::{record_meal, reload_log, MealError};
use crate::error::PersistError;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/meals", get(list_meals))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/reload", post(reload_meals))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Json<MealListResponse> {
    let log = state.log.read().await;
    let entries = log
        .entries()
        .iter()
        .skip(p.offset)
        .take(p.limit)
        .cloned()
        .collect();
    Json(MealListResponse {
        total: log.len(),
        entries,
    })
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<CreatedMealResponse>), (StatusCode, String)> {
    match record_meal(&state, body).await {
        Ok(entry) => {
            let log_len = state.log.read().await.len();
            Ok((StatusCode::CREATED, Json(CreatedMealResponse { entry, log_len })))
        }
        Err(MealError::Invalid(e)) => {
            warn!(error = %e, "meal rejected");
            Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
        Err(MealError::Persist(e @ PersistError::Locked(_))) => {
            warn!(error = %e, "meal log busy");
            Err((StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
        Err(MealError::Persist(e)) => {
            error!(error = %e, "meal append failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn reload_meals(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    let entries = reload_log(&state).await.map_err(|e| {
        error!(error = %e, "reload failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(ReloadResponse { entries }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::state::AppState;

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn submit_then_list() {
        let (state, _dir) = AppState::fake();
        let app = build_app(state);

        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/meals",
                serde_json::json!({
                    "date": "14.02.2024",
                    "meal": "Dinner",
                    "rating": 4,
                    "trusted": true,
                    "foods": ["Apple", "Egg"]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), 201);

        let res = app
            .oneshot(Request::get("/api/v1/meals").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["entries"][0]["meal_list"], serde_json::json!(["Apple", "Egg"]));
        assert_eq!(json["entries"][0]["date"], "14.02.2024");
    }

    #[tokio::test]
    async fn unknown_food_is_unprocessable() {
        let (state, _dir) = AppState::fake();
        let res = build_app(state)
            .oneshot(post_json(
                "/api/v1/meals",
                serde_json::json!({
                    "date": "14.02.2024",
                    "meal": "Snack",
                    "rating": 2,
                    "foods": ["Kale"]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), 422);
    }
}
