mod dto;
pub mod handlers;
pub mod ranking;
pub mod selection;
pub mod summary;

use crate::state::AppState;
use axum::Router;

pub use selection::MacroSelection;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
