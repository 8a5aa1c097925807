//! Derived statistics that are computed on demand (report sections), never stored.

use std::collections::BTreeMap;

use crate::types::{EquipmentRecord, NumericField};

/// Spread statistics for one numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtendedStats {
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Population variance.
    pub variance: f64,
}

/// Per-type counts and averages.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeBreakdown {
    pub equipment_type: String,
    pub count: usize,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
}

/// Median, standard deviation and variance of `field`. `None` for empty input.
pub fn extended_stats(records: &[EquipmentRecord], field: NumericField) -> Option<ExtendedStats> {
    if records.is_empty() {
        return None;
    }
    let mut values: Vec<f64> = records.iter().map(|r| r.value(field)).collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };

    Some(ExtendedStats {
        median,
        std_dev: variance.sqrt(),
        variance,
    })
}

/// Group records by type, ordered by type name.
pub fn type_breakdown(records: &[EquipmentRecord]) -> Vec<TypeBreakdown> {
    let mut groups: BTreeMap<&str, (usize, [f64; 3])> = BTreeMap::new();
    for r in records {
        let (count, sums) = groups.entry(r.equipment_type.as_str()).or_insert((0, [0.0; 3]));
        *count += 1;
        sums[0] += r.flowrate;
        sums[1] += r.pressure;
        sums[2] += r.temperature;
    }

    groups
        .into_iter()
        .map(|(ty, (count, sums))| {
            let n = count as f64;
            TypeBreakdown {
                equipment_type: ty.to_owned(),
                count,
                avg_flowrate: sums[0] / n,
                avg_pressure: sums[1] / n,
                avg_temperature: sums[2] / n,
            }
        })
        .collect()
}
