//! `equipment-analytics` ingests CSV files of chemical equipment readings, summarizes them,
//! keeps a bounded history of recent uploads and renders text reports from any retained
//! upload.
//!
//! The primary entrypoint is [`service::EquipmentService`], which exposes the operations a
//! transport layer needs (upload, list, get, report, delete) together with their JSON
//! representations.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ─► schema check ─► row parsing ─► summary ─► NewDataset ─► RetentionManager::insert
//!                                                                   │
//!                                         ReportComposer::compose ◄─┘ (on demand)
//! ```
//!
//! **Required CSV columns** (case-insensitive, any order, extra columns ignored):
//! `Equipment Name`, `Type`, `Flowrate`, `Pressure`, `Temperature`.
//!
//! Rows with an empty name/type or a numeric cell that is not a finite number are dropped and
//! counted; the upload fails only if no row survives. A failed upload never changes the
//! history.
//!
//! ## Quick example
//!
//! ```rust
//! use equipment_analytics::service::EquipmentService;
//!
//! # fn main() -> Result<(), equipment_analytics::PipelineError> {
//! let service = EquipmentService::default();
//! let csv = "\
//! Equipment Name,Type,Flowrate,Pressure,Temperature
//! Pump-1,Pump,120,5.2,110
//! Valve-1,Valve,60,4.1,95
//! Pump-2,Pump,not-a-number,5.0,100
//! ";
//!
//! let dataset = service.upload("plant.csv", csv.as_bytes())?;
//! assert_eq!(dataset.total_records, 2);
//! assert_eq!(dataset.summary.max_flowrate, 120.0);
//!
//! let report = service.report(dataset.id)?;
//! assert!(String::from_utf8_lossy(&report.bytes).contains("Summary Statistics"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: header validation, typed row parsing and the upload entrypoint
//! - [`processing`]: summary and report-only statistics
//! - [`retention`]: bounded, upload-time ordered dataset history
//! - [`report`]: paginated text reports
//! - [`execution`]: parallel batch report rendering
//! - [`service`]: boundary operations and JSON representations
//! - [`types`]: records, statistics and datasets
//! - [`config`]: pipeline options
//! - [`error`]: error types used across the crate
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] and never installs a subscriber. Upload outcomes can
//! also be routed to an [`ingestion::UploadObserver`] via [`config::PipelineOptions::observer`].

pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod report;
pub mod retention;
pub mod service;
pub mod types;

pub use error::{ErrorKind, PipelineError, PipelineResult};
