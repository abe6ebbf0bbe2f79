use serde::{Deserialize, Serialize};

use super::services::MatchMode;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub mode: MatchMode,
}

#[derive(Debug, Serialize)]
pub struct NutrientsResponse {
    pub nutrients: Vec<String>,
}
