use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_MACROS: &str = "Fat (g),Protein (g),Carbohydrate (g),Sugars (g),Fiber (g)";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    /// Preamble lines before the catalog header.
    pub catalog_header_row: usize,
    pub meals_path: PathBuf,
    pub default_macros: Vec<String>,
    pub diagnostic_log: PathBuf,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let catalog_path = std::env::var("CATALOG_PATH")
            .unwrap_or_else(|_| "./files/MyFoodData.csv".into())
            .into();
        let catalog_header_row = std::env::var("CATALOG_HEADER_ROW")
            .ok()
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("CATALOG_HEADER_ROW must be a non-negative integer")?
            .unwrap_or(3);
        let meals_path = std::env::var("MEALS_PATH")
            .unwrap_or_else(|_| "./files/MyMeals.csv".into())
            .into();
        let default_macros = parse_macro_list(
            &std::env::var("DEFAULT_MACROS").unwrap_or_else(|_| DEFAULT_MACROS.into()),
        );
        let diagnostic_log = std::env::var("DIAGNOSTIC_LOG")
            .unwrap_or_else(|_| "log.txt".into())
            .into();
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .context("APP_PORT must be a port number")?
            .unwrap_or(8080);

        Ok(Self {
            catalog_path,
            catalog_header_row,
            meals_path,
            default_macros,
            diagnostic_log,
            host,
            port,
        })
    }
}

fn parse_macro_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_macro_list_has_five_columns() {
        let macros = parse_macro_list(DEFAULT_MACROS);
        assert_eq!(macros.len(), 5);
        assert_eq!(macros[0], "Fat (g)");
    }

    #[test]
    fn macro_list_drops_blanks_and_duplicates() {
        let macros = parse_macro_list(" Fat (g) ,, Fiber (g),Fat (g)");
        assert_eq!(macros, vec!["Fat (g)", "Fiber (g)"]);
    }
}
