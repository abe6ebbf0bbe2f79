use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(pub i64);

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the reference table. Cells left empty in the source are absent
/// from `macros`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodRecord {
    pub id: FoodId,
    pub name: String,
    pub macros: BTreeMap<String, f64>,
}

impl FoodRecord {
    /// Amount of `nutrient`, zero when the cell was empty or not a number.
    pub fn amount(&self, nutrient: &str) -> f64 {
        match self.macros.get(nutrient) {
            Some(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    foods: Vec<FoodRecord>,
    index: HashMap<FoodId, usize>,
    nutrients: Vec<String>,
}

impl Catalog {
    pub fn from_records(nutrients: Vec<String>, foods: Vec<FoodRecord>) -> Result<Self, LoadError> {
        let mut index = HashMap::with_capacity(foods.len());
        for (pos, food) in foods.iter().enumerate() {
            if index.insert(food.id, pos).is_some() {
                return Err(LoadError::DuplicateId(food.id));
            }
        }
        Ok(Self {
            foods,
            index,
            nutrients,
        })
    }

    pub fn get(&self, id: FoodId) -> Option<&FoodRecord> {
        self.index.get(&id).map(|&pos| &self.foods[pos])
    }

    pub fn foods(&self) -> &[FoodRecord] {
        &self.foods
    }

    /// Nutrient columns in source order.
    pub fn nutrients(&self) -> &[String] {
        &self.nutrients
    }

    pub fn has_nutrient(&self, name: &str) -> bool {
        self.nutrients.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}
