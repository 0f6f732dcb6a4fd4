//! Admission prediction engine for NEET/JEE counseling.
//!
//! The engine turns a student's exam score into a comparable rank, matches it
//! against historical closing ranks, and returns colleges ranked by admission
//! probability and overall suitability. Everything outside that pipeline
//! (forms, chat formatting, exports) is expected to call into
//! [`prediction::PredictionService`] and render its output.

pub mod config;
pub mod error;
pub mod prediction;
pub mod telemetry;
