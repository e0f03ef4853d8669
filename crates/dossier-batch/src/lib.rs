//! Dossier Batch - Batch orchestration and cross-document correlation
//!
//! Drives a whole batch through the pipeline with per-file failure
//! isolation, correlates entities across the successfully analyzed
//! documents, and assembles the final report.

pub mod crossref;
pub mod orchestrator;
pub mod overview;

pub use crossref::build_cross_references;
pub use orchestrator::BatchProcessor;
pub use overview::build_overview;
