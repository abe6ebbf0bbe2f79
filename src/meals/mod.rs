mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;
use time::Date;

pub use repo::{CsvMealStore, MealStore};
pub use repo_types::{MealEntry, MealLog, MealType};

// dd.mm.yyyy, the format the log store has always used
time::serde::format_description!(day_month_year, Date, "[day].[month].[year]");

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
