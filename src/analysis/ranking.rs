use std::collections::HashMap;

use serde::Serialize;

use crate::meals::MealLog;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMeal {
    pub meal_list: Vec<String>,
    pub average_rating: f64,
    pub entries: usize,
}

/// Average rating per distinct meal list, best first unless `ascending`.
/// Groups keep first-seen order among equal averages.
pub fn rank(log: &MealLog, trusted_only: bool, ascending: bool) -> Vec<RankedMeal> {
    let mut slots: HashMap<&[String], usize> = HashMap::new();
    let mut groups: Vec<(&[String], u32, usize)> = Vec::new();

    for entry in log
        .entries()
        .iter()
        .filter(|e| !trusted_only || e.trusted)
    {
        let key = entry.meal_list.as_slice();
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push((key, 0, 0));
            groups.len() - 1
        });
        groups[slot].1 += u32::from(entry.rating);
        groups[slot].2 += 1;
    }

    let mut ranked: Vec<RankedMeal> = groups
        .into_iter()
        .map(|(meal_list, sum, count)| RankedMeal {
            meal_list: meal_list.to_vec(),
            average_rating: f64::from(sum) / count as f64,
            entries: count,
        })
        .collect();

    if ascending {
        ranked.sort_by(|a, b| a.average_rating.total_cmp(&b.average_rating));
    } else {
        ranked.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    }
    ranked
}
