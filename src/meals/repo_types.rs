use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use super::repo::MealStore;
use crate::catalog::FoodId;
use crate::error::PersistError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    // older logs carry the misspelt label
    #[serde(alias = "Breakfeast")]
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        };
        f.write_str(s)
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" | "breakfeast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(format!("unknown meal type {s:?}")),
        }
    }
}

/// One submitted meal. `meal_list` mirrors the catalog names of `ids`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealEntry {
    pub ids: Vec<FoodId>,
    #[serde(with = "super::day_month_year")]
    pub date: Date,
    pub meal: MealType,
    pub rating: u8,
    pub trusted: bool,
    pub meal_list: Vec<String>,
}

/// Meal history in storage order. Only grows, and only after the store
/// accepted the new rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealLog {
    entries: Vec<MealEntry>,
}

impl MealLog {
    pub fn new(entries: Vec<MealEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MealEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, store: &dyn MealStore, entry: MealEntry) -> Result<(), PersistError> {
        if entry.ids.is_empty() {
            return Err(PersistError::EmptyEntry);
        }
        store.append(&entry)?;
        self.entries.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_type_reads_legacy_label() {
        assert_eq!("Breakfeast".parse::<MealType>(), Ok(MealType::Breakfast));
        assert_eq!("snack".parse::<MealType>(), Ok(MealType::Snack));
        assert!("Brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn meal_type_round_trips_through_display() {
        for meal in [
            MealType::Breakfast,
            MealType::Lunch,
            MealType::Dinner,
            MealType::Snack,
        ] {
            assert_eq!(meal.to_string().parse::<MealType>(), Ok(meal));
        }
    }

    /// Counts the entries it is handed.
    #[derive(Default)]
    struct CountingStore(std::sync::Mutex<usize>);

    impl MealStore for CountingStore {
        fn load(&self) -> Result<MealLog, crate::error::LoadError> {
            Ok(MealLog::default())
        }

        fn append(&self, _entry: &MealEntry) -> Result<(), PersistError> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn lunch(ids: Vec<FoodId>) -> MealEntry {
        MealEntry {
            ids,
            date: time::macros::date!(2024 - 03 - 05),
            meal: MealType::Lunch,
            rating: 3,
            trusted: true,
            meal_list: Vec::new(),
        }
    }

    #[test]
    fn append_without_foods_never_reaches_store() {
        let store = CountingStore::default();
        let mut log = MealLog::default();
        let err = log.append(&store, lunch(Vec::new())).unwrap_err();
        assert!(matches!(err, PersistError::EmptyEntry));
        assert!(log.is_empty());
        assert_eq!(*store.0.lock().unwrap(), 0);

        log.append(&store, lunch(vec![FoodId(1)])).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(*store.0.lock().unwrap(), 1);
    }

    #[test]
    fn entry_serializes_date_as_day_month_year() {
        let entry = MealEntry {
            ids: vec![FoodId(1)],
            date: time::macros::date!(2024 - 03 - 05),
            meal: MealType::Lunch,
            rating: 4,
            trusted: true,
            meal_list: vec!["Apple".into()],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "05.03.2024");
        assert_eq!(json["meal"], "Lunch");
        assert_eq!(json["ids"][0], 1);
    }
}
