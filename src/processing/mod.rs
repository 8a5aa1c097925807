//! Statistics over parsed equipment records.
//!
//! - [`summarize()`]: the stored per-dataset summary (count, min/max/avg, type distribution)
//! - [`extended_stats()`] / [`type_breakdown()`]: report-only figures derived on demand
//!
//! ## Example
//!
//! ```rust
//! use equipment_analytics::processing::summarize;
//! use equipment_analytics::types::EquipmentRecord;
//!
//! let records = vec![
//!     EquipmentRecord::new("P-101", "Pump", 120.0, 5.5, 80.0),
//!     EquipmentRecord::new("V-201", "Valve", 60.0, 4.5, 75.0),
//!     EquipmentRecord::new("P-102", "Pump", 150.0, 6.5, 85.0),
//! ];
//!
//! let stats = summarize(&records).unwrap();
//! assert_eq!(stats.count, 3);
//! assert_eq!(stats.flowrate.max, 150.0);
//! assert_eq!(stats.type_distribution["Pump"], 2);
//! ```

pub mod extended;
pub mod stats;

pub use extended::{ExtendedStats, TypeBreakdown, extended_stats, type_breakdown};
pub use stats::summarize;
