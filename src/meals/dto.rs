use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{MealEntry, MealType};

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    #[serde(with = "super::day_month_year")]
    pub date: Date,
    pub meal: MealType,
    pub rating: u8,
    #[serde(default)]
    pub trusted: bool,
    pub foods: Vec<String>, // display names as returned by /foods/search
}

#[derive(Debug, Serialize)]
pub struct CreatedMealResponse {
    pub entry: MealEntry,
    pub log_len: usize,
}

#[derive(Debug, Serialize)]
pub struct MealListResponse {
    pub total: usize,
    pub entries: Vec<MealEntry>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub entries: usize,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}
fn default_limit() -> usize { 100 }
