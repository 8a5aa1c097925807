//! Summary statistics over equipment records.

use indexmap::IndexMap;

use crate::types::{EquipmentRecord, FieldSummary, NumericField, Statistics};

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
}

impl Accumulator {
    fn start(v: f64) -> Self {
        Self { min: v, max: v, sum: v }
    }

    fn push(&mut self, v: f64) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.sum += v;
    }

    fn finish(self, count: usize) -> FieldSummary {
        FieldSummary {
            min: self.min,
            max: self.max,
            avg: self.sum / count as f64,
        }
    }
}

/// Compute [`Statistics`] for `records` in a single pass.
///
/// - Returns `None` if `records` is empty.
/// - Averages are `sum / count` in plain `f64` arithmetic, summed in record order, so the same
///   input sequence always yields bit-identical results.
/// - `type_distribution` iterates in first-seen order.
pub fn summarize(records: &[EquipmentRecord]) -> Option<Statistics> {
    let (first, rest) = records.split_first()?;

    let mut acc = NumericField::ALL.map(|f| Accumulator::start(first.value(f)));
    let mut type_distribution: IndexMap<String, usize> = IndexMap::new();
    type_distribution.insert(first.equipment_type.clone(), 1);

    for record in rest {
        for (slot, field) in acc.iter_mut().zip(NumericField::ALL) {
            slot.push(record.value(field));
        }
        *type_distribution
            .entry(record.equipment_type.clone())
            .or_insert(0) += 1;
    }

    let count = records.len();
    let [flowrate, pressure, temperature] = acc.map(|a| a.finish(count));
    Some(Statistics {
        count,
        flowrate,
        pressure,
        temperature,
        type_distribution,
    })
}

#[cfg(test)]
mod tests {
    use super::summarize;
    use crate::types::EquipmentRecord;

    fn sample_records() -> Vec<EquipmentRecord> {
        vec![
            EquipmentRecord::new("V-1", "Valve", 30.0, 4.0, 95.5),
            EquipmentRecord::new("P-1", "Pump", 10.0, 2.0, 80.0),
            EquipmentRecord::new("V-2", "Valve", 20.0, 6.0, 70.5),
            EquipmentRecord::new("C-1", "Compressor", 40.0, 8.0, 110.0),
        ]
    }

    #[test]
    fn summarize_computes_min_max_avg_per_field() {
        let stats = summarize(&sample_records()).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.flowrate.min, 10.0);
        assert_eq!(stats.flowrate.max, 40.0);
        assert_eq!(stats.flowrate.avg, 25.0);
        assert_eq!(stats.pressure.avg, 5.0);
        assert_eq!(stats.temperature.min, 70.5);
        assert_eq!(stats.temperature.max, 110.0);
        assert_eq!(stats.temperature.avg, 89.0);
    }

    #[test]
    fn type_distribution_keeps_first_seen_order() {
        let stats = summarize(&sample_records()).unwrap();
        let order: Vec<(&str, usize)> = stats
            .type_distribution
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(order, vec![("Valve", 2), ("Pump", 1), ("Compressor", 1)]);
    }

    #[test]
    fn summarize_is_deterministic() {
        let records: Vec<EquipmentRecord> = (0..100)
            .map(|i| EquipmentRecord::new(format!("E-{i}"), format!("T{}", i % 7), 0.1 * i as f64, 1.0 / (i + 1) as f64, -3.3 * i as f64))
            .collect();
        let a = summarize(&records).unwrap();
        let b = summarize(&records).unwrap();
        assert_eq!(a.flowrate.avg.to_bits(), b.flowrate.avg.to_bits());
        assert_eq!(a.pressure.avg.to_bits(), b.pressure.avg.to_bits());
        assert_eq!(a.temperature.min.to_bits(), b.temperature.min.to_bits());
        assert!(a.type_distribution.iter().eq(b.type_distribution.iter()));
    }

    #[test]
    fn summarize_empty_is_none() {
        assert_eq!(summarize(&[]), None);
    }
}
