use serde::{Deserialize, Serialize};

use super::summary::{MacroCorrelation, MacroShare, MacroTotal};

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub trusted_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    #[serde(default)]
    pub trusted_only: bool,
    #[serde(default)]
    pub ascending: bool,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub trusted_only: bool,
    pub macros: Vec<String>,
    pub rows: usize,
    pub macro_totals: Vec<MacroTotal>,
    pub pie: Vec<MacroShare>,
    pub correlation: Vec<MacroCorrelation>,
}

#[derive(Debug, Deserialize)]
pub struct AddMacroRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MacrosResponse {
    pub selected: Vec<String>,
}
