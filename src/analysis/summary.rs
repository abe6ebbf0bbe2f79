use serde::Serialize;
use tracing::debug;

use super::selection::MacroSelection;
use crate::catalog::{Catalog, FoodId, FoodRecord};
use crate::meals::MealLog;

/// One referenced food of one log entry, matched against the catalog.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRow<'a> {
    pub id: FoodId,
    pub food: &'a FoodRecord,
    pub rating: u8,
    pub trusted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroTotal {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroShare {
    pub name: String,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroCorrelation {
    pub name: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Joined rows that took part, after trust filtering.
    pub rows: usize,
    /// Selection order.
    pub macro_totals: Vec<MacroTotal>,
    /// Strongest positive association with rating first.
    pub correlation: Vec<MacroCorrelation>,
}

/// Inner join of log entries to catalog rows. Ids the catalog does not know
/// are dropped.
pub fn join<'a>(catalog: &'a Catalog, log: &MealLog) -> Vec<JoinedRow<'a>> {
    let found = catalog.lookup(log.entries().iter().flat_map(|e| e.ids.iter()));
    let found = &found;
    log.entries()
        .iter()
        .flat_map(|entry| {
            entry.ids.iter().filter_map(move |id| {
                found.get(id).map(|food| JoinedRow {
                    id: *id,
                    food: *food,
                    rating: entry.rating,
                    trusted: entry.trusted,
                })
            })
        })
        .collect()
}

pub fn join_and_summarize(
    catalog: &Catalog,
    log: &MealLog,
    selection: &MacroSelection,
    trusted_only: bool,
) -> Summary {
    let rows: Vec<JoinedRow<'_>> = join(catalog, log)
        .into_iter()
        .filter(|row| !trusted_only || row.trusted)
        .collect();

    if selection.is_empty() {
        return Summary {
            rows: rows.len(),
            ..Summary::default()
        };
    }

    let ratings: Vec<f64> = rows.iter().map(|r| f64::from(r.rating)).collect();
    let mut macro_totals = Vec::with_capacity(selection.len());
    let mut correlation = Vec::with_capacity(selection.len());

    for name in selection.names() {
        let column: Vec<f64> = rows.iter().map(|r| r.food.amount(name)).collect();
        macro_totals.push(MacroTotal {
            name: name.clone(),
            total: column.iter().sum(),
        });
        if let Some(coefficient) = pearson(&column, &ratings) {
            correlation.push(MacroCorrelation {
                name: name.clone(),
                coefficient,
            });
        }
    }
    correlation.sort_by(|a, b| b.coefficient.total_cmp(&a.coefficient));

    debug!(
        rows = rows.len(),
        macros = selection.len(),
        correlated = correlation.len(),
        trusted_only,
        "summary computed"
    );
    Summary {
        rows: rows.len(),
        macro_totals,
        correlation,
    }
}

/// Each total's fraction of the grand total; empty when nothing was eaten.
pub fn pie_breakdown(totals: &[MacroTotal]) -> Vec<MacroShare> {
    let grand: f64 = totals.iter().map(|t| t.total).sum();
    if grand <= 0.0 || !grand.is_finite() {
        return Vec::new();
    }
    totals
        .iter()
        .map(|t| MacroShare {
            name: t.name.clone(),
            share: t.total / grand,
        })
        .collect()
}

/// Pearson correlation, `None` when undefined (fewer than two points or a
/// constant column).
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    if xs.iter().all(|x| *x == xs[0]) || ys.iter().all(|y| *y == ys[0]) {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}
