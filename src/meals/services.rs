use time::Date;
use tracing::{info, warn};

use super::dto::CreateMealRequest;
use super::repo_types::{MealEntry, MealType};
use crate::catalog::{Catalog, FoodId};
use crate::error::{LoadError, PersistError, ValidationError};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum MealError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Build an entry whose ids all exist in `catalog`, naming the foods from it.
pub fn new_entry(
    catalog: &Catalog,
    ids: Vec<FoodId>,
    date: Date,
    meal: MealType,
    rating: u8,
    trusted: bool,
) -> Result<MealEntry, ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptyMeal);
    }
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::RatingOutOfRange(rating));
    }
    let meal_list = ids
        .iter()
        .map(|id| {
            catalog
                .get(*id)
                .map(|food| food.name.clone())
                .ok_or(ValidationError::UnknownId(*id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MealEntry {
        ids,
        date,
        meal,
        rating,
        trusted,
        meal_list,
    })
}

/// Validate a submission and append it to the store and the session log.
pub async fn record_meal(st: &AppState, req: CreateMealRequest) -> Result<MealEntry, MealError> {
    if req.foods.is_empty() {
        return Err(ValidationError::EmptyMeal.into());
    }
    let ids = st.catalog.resolve_names(&req.foods)?;
    let entry = new_entry(&st.catalog, ids, req.date, req.meal, req.rating, req.trusted)?;

    let (log, store, pending) = (st.log.clone(), st.store.clone(), entry.clone());
    let entries = tokio::task::spawn_blocking(move || {
        let mut log = log.blocking_write();
        log.append(store.as_ref(), pending).map(|_| log.len())
    })
    .await
    .map_err(PersistError::from)??;
    info!(entries, foods = entry.ids.len(), "meal recorded");
    Ok(entry)
}

/// Replace the session log with what the store currently holds.
pub async fn reload_log(st: &AppState) -> Result<usize, LoadError> {
    let store = st.store.clone();
    let fresh = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(LoadError::from)
        .and_then(|loaded| loaded)
        .map_err(|e| {
            warn!(error = %e, "meal log reload failed");
            e
        })?;
    let mut log = st.log.write().await;
    *log = fresh;
    Ok(log.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::services::fixtures::apple_and_egg;
    use time::macros::date;

    #[test]
    fn new_entry_names_foods_from_catalog() {
        let catalog = apple_and_egg();
        let entry = new_entry(
            &catalog,
            vec![FoodId(2), FoodId(1)],
            date!(2024 - 05 - 01),
            MealType::Breakfast,
            4,
            true,
        )
        .unwrap();
        assert_eq!(entry.meal_list, vec!["Egg", "Apple"]);
    }

    #[test]
    fn new_entry_rejects_unknown_id() {
        let catalog = apple_and_egg();
        let err = new_entry(
            &catalog,
            vec![FoodId(1), FoodId(99)],
            date!(2024 - 05 - 01),
            MealType::Lunch,
            3,
            false,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::UnknownId(FoodId(99)));
    }

    #[test]
    fn new_entry_rejects_bad_rating_and_empty_meal() {
        let catalog = apple_and_egg();
        let d = date!(2024 - 05 - 01);
        assert_eq!(
            new_entry(&catalog, vec![FoodId(1)], d, MealType::Snack, 0, true).unwrap_err(),
            ValidationError::RatingOutOfRange(0)
        );
        assert_eq!(
            new_entry(&catalog, vec![FoodId(1)], d, MealType::Snack, 6, true).unwrap_err(),
            ValidationError::RatingOutOfRange(6)
        );
        assert_eq!(
            new_entry(&catalog, Vec::new(), d, MealType::Snack, 3, true).unwrap_err(),
            ValidationError::EmptyMeal
        );
    }

    #[tokio::test]
    async fn failed_append_leaves_session_log_alone() {
        let (state, dir) = AppState::fake();
        std::fs::write(dir.path().join("meals.csv.lock"), b"").unwrap();

        let req = CreateMealRequest {
            date: date!(2024 - 05 - 01),
            meal: MealType::Dinner,
            rating: 4,
            trusted: true,
            foods: vec!["Apple".into()],
        };
        let err = record_meal(&state, req).await.unwrap_err();

        assert!(matches!(err, MealError::Persist(PersistError::Locked(_))));
        assert!(state.log.read().await.is_empty());
    }

    #[tokio::test]
    async fn recorded_meal_survives_reload() {
        let (state, _dir) = AppState::fake();
        let req = CreateMealRequest {
            date: date!(2024 - 05 - 01),
            meal: MealType::Lunch,
            rating: 5,
            trusted: false,
            foods: vec!["Egg".into(), "Apple".into()],
        };
        let entry = record_meal(&state, req).await.unwrap();
        assert_eq!(reload_log(&state).await.unwrap(), 1);
        assert_eq!(state.log.read().await.entries()[0], entry);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_records_all_land_in_store_and_log() {
        let (state, _dir) = AppState::fake();
        let tasks: Vec<_> = (1..=4u8)
            .map(|rating| {
                let st = state.clone();
                tokio::spawn(async move {
                    let req = CreateMealRequest {
                        date: date!(2024 - 05 - 02),
                        meal: MealType::Snack,
                        rating,
                        trusted: true,
                        foods: vec!["Apple".into()],
                    };
                    record_meal(&st, req).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(state.log.read().await.len(), 4);
        assert_eq!(reload_log(&state).await.unwrap(), 4);
    }
}
