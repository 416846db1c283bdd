//! bench-core - shared library for email classification benchmarks.
//!
//! Reads the per-model JSON-lines logs written by the email classifier,
//! scores each model against the known category of its emails, and renders
//! the cross-model comparison table.

pub mod parse;
pub mod record;
pub mod report;
pub mod scan;
pub mod score;
