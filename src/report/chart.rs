//! Horizontal bar charts: the type distribution and the min/avg/max comparison.

use std::fmt::{self, Write};

use indexmap::IndexMap;

use super::table::truncate_chars;
use crate::types::{NumericField, Statistics};

/// Width of the longest bar, in characters.
pub const BAR_WIDTH: usize = 40;
const LABEL_MAX: usize = 20;

/// Render one bar per type, in the map's (first-seen) order.
///
/// Bar length is proportional to the count relative to the most frequent type; every
/// non-zero count gets at least one mark.
pub fn render_distribution(distribution: &IndexMap<String, usize>, out: &mut impl Write) -> fmt::Result {
    let total: usize = distribution.values().sum();
    let max = distribution.values().copied().max().unwrap_or(0);
    if total == 0 {
        return writeln!(out, "(no data)");
    }

    let bar_width = BAR_WIDTH;
    let label_width = distribution
        .keys()
        .map(|k| truncate_chars(k, LABEL_MAX).chars().count())
        .max()
        .unwrap_or(0);

    for (label, &count) in distribution {
        let len = ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
        let len = if count > 0 { len.max(1) } else { 0 };
        let pct = count as f64 / total as f64 * 100.0;
        writeln!(
            out,
            "{label:<label_width$} | {bar:<bar_width$} {count} ({pct:.1}%)",
            label = truncate_chars(label, LABEL_MAX),
            bar = "#".repeat(len),
        )?;
    }
    Ok(())
}

/// Render min/avg/max bars for every numeric field.
///
/// All bars share one scale, the largest magnitude across the three fields, so fields can be
/// compared with each other. Bars are drawn by magnitude; the printed value keeps its sign.
pub fn render_comparison(summary: &Statistics, out: &mut impl Write) -> fmt::Result {
    let scale = NumericField::ALL
        .iter()
        .flat_map(|&f| {
            let s = summary.field(f);
            [s.min.abs(), s.avg.abs(), s.max.abs()]
        })
        .fold(0.0_f64, f64::max);

    let bar_width = BAR_WIDTH;
    for field in NumericField::ALL {
        let s = summary.field(field);
        writeln!(out, "{}", field.label())?;
        for (label, value) in [("Minimum", s.min), ("Average", s.avg), ("Maximum", s.max)] {
            let len = if scale > 0.0 {
                (value.abs() / scale * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            writeln!(out, "  {label:<7} | {bar:<bar_width$} {value:.2}", bar = "#".repeat(len))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{BAR_WIDTH, render_comparison, render_distribution};
    use crate::processing::summarize;
    use crate::types::EquipmentRecord;

    #[test]
    fn bars_scale_to_most_frequent_type() {
        let mut dist = IndexMap::new();
        dist.insert("Pump".to_string(), 2);
        dist.insert("Valve".to_string(), 1);

        let mut out = String::new();
        render_distribution(&dist, &mut out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Pump  | "));
        assert_eq!(lines[0].matches('#').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('#').count(), BAR_WIDTH / 2);
        assert!(lines[0].ends_with("2 (66.7%)"));
        assert!(lines[1].ends_with("1 (33.3%)"));
    }

    #[test]
    fn empty_distribution_renders_placeholder() {
        let mut out = String::new();
        render_distribution(&IndexMap::new(), &mut out).unwrap();
        assert_eq!(out, "(no data)\n");
    }

    #[test]
    fn comparison_bars_share_the_largest_maximum() {
        let records = vec![
            EquipmentRecord::new("P-1", "Pump", 50.0, 2.0, 100.0),
            EquipmentRecord::new("P-2", "Pump", 150.0, 6.0, 200.0),
        ];
        let summary = summarize(&records).unwrap();

        let mut out = String::new();
        render_comparison(&summary, &mut out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "Flowrate");
        assert_eq!(lines[4], "Pressure");
        assert_eq!(lines[8], "Temperature");

        // temperature max (200) is the scale
        assert_eq!(lines[11].matches('#').count(), BAR_WIDTH);
        assert!(lines[11].starts_with("  Maximum | "));
        assert!(lines[11].ends_with(" 200.00"));
        assert_eq!(lines[1].matches('#').count(), BAR_WIDTH / 4);
        assert_eq!(lines[2].matches('#').count(), BAR_WIDTH / 2);
        assert!(lines[2].ends_with(" 100.00"));
    }
}
