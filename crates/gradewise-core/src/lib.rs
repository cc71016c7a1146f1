//! gradewise-core — answer grading, OCR answer segmentation, and marking.
//!
//! This crate defines the data model, the [`traits::SymbolicEngine`] seam,
//! the answer equivalence grader, the answer segmenter, and the marking
//! engine that ties them together.

pub mod algebra;
pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod grader;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod segmenter;
pub mod statistics;
pub mod traits;
