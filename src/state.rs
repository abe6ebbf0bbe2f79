use crate::analysis::MacroSelection;
use crate::catalog::{self, Catalog};
use crate::config::AppConfig;
use crate::meals::{CsvMealStore, MealLog, MealStore};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<Catalog>,
    pub store: Arc<dyn MealStore>,
    pub log: Arc<RwLock<MealLog>>,
    pub selection: Arc<RwLock<MacroSelection>>,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let catalog = catalog::repo::load(&config.catalog_path, config.catalog_header_row)
            .with_context(|| format!("load catalog {}", config.catalog_path.display()))?;
        if catalog.is_empty() {
            warn!(path = %config.catalog_path.display(), "catalog has no foods");
        }

        let store = CsvMealStore::open(&config.meals_path)
            .with_context(|| format!("open meal log {}", config.meals_path.display()))?;
        info!(path = %store.path().display(), "meal log opened");

        Self::from_parts(config, catalog, Arc::new(store))
    }

    pub fn from_parts(
        config: AppConfig,
        catalog: Catalog,
        store: Arc<dyn MealStore>,
    ) -> anyhow::Result<Self> {
        let log = store.load().context("load meal log")?;

        let (selection, unknown) =
            MacroSelection::new(config.default_macros.iter().cloned()).partition_known(&catalog);
        if !unknown.is_empty() {
            warn!(?unknown, "default macros missing from catalog; skipped");
        }
        info!(
            foods = catalog.len(),
            meals = log.len(),
            macros = selection.len(),
            "session state ready"
        );

        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            store,
            log: Arc::new(RwLock::new(log)),
            selection: Arc::new(RwLock::new(selection)),
        })
    }

    /// Apple/Egg catalog and an empty meal log in a fresh temp dir. The dir
    /// is removed when the returned guard drops.
    #[cfg(test)]
    pub fn fake() -> (Self, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("temp dir");
        let meals_path = dir.path().join("meals.csv");
        let config = AppConfig {
            catalog_path: dir.path().join("foods.csv"),
            catalog_header_row: 3,
            meals_path: meals_path.clone(),
            default_macros: vec!["Fat".into(), "Protein".into(), "Carb".into()],
            diagnostic_log: dir.path().join("log.txt"),
            host: "127.0.0.1".into(),
            port: 0,
        };
        let store = CsvMealStore::open(meals_path).expect("meal store");
        let state = Self::from_parts(
            config,
            crate::catalog::services::fixtures::apple_and_egg(),
            Arc::new(store),
        )
        .expect("fake state");
        (state, dir)
    }
}
