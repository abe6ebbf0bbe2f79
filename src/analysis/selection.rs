use serde::Serialize;

use crate::catalog::Catalog;

/// Ordered, duplicate-free list of nutrient columns taking part in the
/// summary. Every change returns a new selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MacroSelection(Vec<String>);

impl MacroSelection {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(Self::default(), |sel, name| sel.with(name))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Selection with `name` appended; unchanged when already present.
    pub fn with(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut next = self.0.clone();
        if !self.contains(&name) {
            next.push(name);
        }
        Self(next)
    }

    /// Selection without the entry at `index`, `None` when out of range.
    pub fn without_index(&self, index: usize) -> Option<Self> {
        if index >= self.0.len() {
            return None;
        }
        let mut next = self.0.clone();
        next.remove(index);
        Some(Self(next))
    }

    /// Splits into the columns `catalog` knows and the ones it does not.
    pub fn partition_known(&self, catalog: &Catalog) -> (Self, Vec<String>) {
        let (known, unknown): (Vec<String>, Vec<String>) =
            self.0.iter().cloned().partition(|n| catalog.has_nutrient(n));
        (Self(known), unknown)
    }
}
