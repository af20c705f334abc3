//! Titanic survival analysis library
//!
//! Loads the passenger list, profiles it, cleans it into a typed modeling
//! table, and compares a logistic regression against a random forest on a
//! held-out evaluation sample.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
