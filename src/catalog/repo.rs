use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use super::repo_types::{Catalog, FoodId, FoodRecord};
use crate::error::LoadError;

/// Load the reference table from a csv file whose header sits after
/// `header_row` preamble lines.
pub fn load(path: &Path, header_row: usize) -> Result<Catalog, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = from_reader(BufReader::new(file), header_row)?;
    info!(
        path = %path.display(),
        foods = catalog.len(),
        nutrients = catalog.nutrients().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

pub fn from_reader<R: Read>(reader: R, header_row: usize) -> Result<Catalog, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = rdr.records();

    for _ in 0..header_row {
        records
            .next()
            .ok_or(LoadError::MissingHeader { preamble: header_row })??;
    }
    let header = records
        .next()
        .ok_or(LoadError::MissingHeader { preamble: header_row })??;

    if !header
        .get(0)
        .is_some_and(|c| c.eq_ignore_ascii_case("id"))
    {
        return Err(LoadError::MissingColumn("id".into()));
    }
    let name_col = header
        .iter()
        .position(|c| c.eq_ignore_ascii_case("name"))
        .ok_or_else(|| LoadError::MissingColumn("name".into()))?;

    let rows = records
        .filter(|r| !matches!(r, Ok(rec) if rec.iter().all(str::is_empty)))
        .collect::<Result<Vec<StringRecord>, _>>()?;

    let nutrient_cols: Vec<usize> = (1..header.len())
        .filter(|&col| col != name_col && !header[col].is_empty())
        .filter(|&col| {
            rows.iter().all(|row| {
                let cell = row.get(col).unwrap_or("");
                cell.is_empty() || cell.parse::<f64>().is_ok()
            })
        })
        .collect();
    let skipped = header.len() - 1 - nutrient_cols.len();
    debug!(nutrients = nutrient_cols.len(), skipped, "catalog columns classified");

    let mut foods = Vec::with_capacity(rows.len());
    for row in &rows {
        let line = row.position().map(|p| p.line() as usize).unwrap_or_default();
        let raw_id = row.get(0).unwrap_or("");
        let id = raw_id.parse::<i64>().map_err(|_| LoadError::InvalidValue {
            row: line,
            column: header[0].to_string(),
            value: raw_id.to_string(),
        })?;

        let mut macros = BTreeMap::new();
        for &col in &nutrient_cols {
            if let Some(v) = row.get(col).filter(|c| !c.is_empty()) {
                // every non-empty cell in this column parsed during classification
                if let Ok(amount) = v.parse::<f64>() {
                    macros.insert(header[col].to_string(), amount);
                }
            }
        }
        foods.push(FoodRecord {
            id: FoodId(id),
            name: row.get(name_col).unwrap_or("").to_string(),
            macros,
        });
    }

    let nutrients = nutrient_cols.iter().map(|&c| header[c].to_string()).collect();
    Catalog::from_records(nutrients, foods)
}
