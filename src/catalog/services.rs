use std::collections::HashMap;

use serde::Deserialize;

use super::repo_types::{Catalog, FoodId, FoodRecord};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Contains,
    StartsWith,
}

impl Catalog {
    /// Records for the requested ids; ids the catalog does not know are left out.
    pub fn lookup<'a, I>(&self, ids: I) -> HashMap<FoodId, &FoodRecord>
    where
        I: IntoIterator<Item = &'a FoodId>,
    {
        ids.into_iter()
            .filter_map(|id| self.get(*id).map(|food| (*id, food)))
            .collect()
    }

    /// Case-insensitive name search, sorted ascending. Names shared by several
    /// ids appear once per id.
    pub fn search(&self, query: &str, mode: MatchMode) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let mut names: Vec<String> = self
            .foods()
            .iter()
            .filter(|food| {
                let name = food.name.to_lowercase();
                match mode {
                    MatchMode::Contains => name.contains(&needle),
                    MatchMode::StartsWith => name.starts_with(&needle),
                }
            })
            .map(|food| food.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Map display names to ids, first catalog row wins for shared names.
    pub fn resolve_names(&self, names: &[String]) -> Result<Vec<FoodId>, ValidationError> {
        names
            .iter()
            .map(|name| {
                self.foods()
                    .iter()
                    .find(|food| food.name == *name)
                    .map(|food| food.id)
                    .ok_or_else(|| ValidationError::UnknownFood(name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeMap;

    use super::*;

    pub fn food(id: i64, name: &str, macros: &[(&str, f64)]) -> FoodRecord {
        FoodRecord {
            id: FoodId(id),
            name: name.to_string(),
            macros: macros
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    /// Apple and Egg with Fat/Protein/Carb columns.
    pub fn apple_and_egg() -> Catalog {
        Catalog::from_records(
            vec!["Fat".into(), "Protein".into(), "Carb".into()],
            vec![
                food(1, "Apple", &[("Fat", 0.0), ("Protein", 0.0), ("Carb", 20.0)]),
                food(2, "Egg", &[("Fat", 5.0), ("Protein", 6.0), ("Carb", 0.0)]),
            ],
        )
        .expect("fixture catalog")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{apple_and_egg, food};
    use super::*;

    fn named(names: &[&str]) -> Catalog {
        let foods = names
            .iter()
            .enumerate()
            .map(|(i, n)| food(i as i64 + 1, n, &[]))
            .collect();
        Catalog::from_records(Vec::new(), foods).unwrap()
    }

    #[test]
    fn starts_with_search_is_sorted() {
        let catalog = named(&["Banana", "Application", "Apple"]);
        assert_eq!(
            catalog.search("app", MatchMode::StartsWith),
            vec!["Apple", "Application"]
        );
    }

    #[test]
    fn contains_search_ignores_case() {
        let catalog = named(&["Pineapple", "Apple", "Banana"]);
        assert_eq!(
            catalog.search("APP", MatchMode::Contains),
            vec!["Apple", "Pineapple"]
        );
        assert!(catalog.search("pine", MatchMode::StartsWith) == vec!["Pineapple"]);
    }

    #[test]
    fn search_keeps_shared_names() {
        let catalog = named(&["Egg", "Egg", "Eggplant"]);
        assert_eq!(
            catalog.search("egg", MatchMode::StartsWith),
            vec!["Egg", "Egg", "Eggplant"]
        );
    }

    #[test]
    fn blank_query_matches_nothing() {
        let catalog = named(&["Apple"]);
        assert!(catalog.search("  ", MatchMode::Contains).is_empty());
    }

    #[test]
    fn lookup_skips_unknown_ids() {
        let catalog = apple_and_egg();
        let found = catalog.lookup(&[FoodId(1), FoodId(42)]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[&FoodId(1)].name, "Apple");
    }

    #[test]
    fn resolve_names_keeps_submission_order() {
        let catalog = apple_and_egg();
        let ids = catalog
            .resolve_names(&["Egg".to_string(), "Apple".to_string()])
            .unwrap();
        assert_eq!(ids, vec![FoodId(2), FoodId(1)]);
    }

    #[test]
    fn resolve_names_rejects_unknown_food() {
        let catalog = apple_and_egg();
        let err = catalog.resolve_names(&["Kale".to_string()]).unwrap_err();
        assert_eq!(err, ValidationError::UnknownFood("Kale".into()));
    }
}
