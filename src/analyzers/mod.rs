//! Regional aggregation, confidence scoring and the run orchestrator.
//!
//! This module groups readings by region, scores how far each result can be
//! trusted, assigns qualitative grades, and optionally uploads the finished
//! report as JSON to S3.

pub mod aggregate;
pub mod analyzer;
pub mod confidence;
pub mod grade;
pub mod types;
pub mod utility;
pub mod writetos3;
