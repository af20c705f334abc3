//! Read-only profiling of the loaded passenger table
//!
//! Nothing here feeds later stages; the output informs the cleaning decisions
//! and is printed or exported for the reader.

use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use serde::Serialize;

use super::error::PipelineResult;
use super::frame::{float_values, string_values};
use super::transform::cabin_deck;

/// Columns profiled for distinct and missing counts
pub const PROFILED_COLUMNS: [&str; 8] = [
    "Survived", "Pclass", "Sex", "SibSp", "Parch", "Ticket", "Cabin", "Embarked",
];

/// Five-number summary plus mean and missing count for a numeric column
#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    pub q3: f64,
    pub max: f64,
    pub missing: usize,
}

/// Distinct-value and missing-value counts for one column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub column: String,
    pub distinct: usize,
    pub missing: usize,
}

/// Missing values for a column across the whole table
#[derive(Debug, Clone, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
    pub ratio: f64,
}

/// Fare statistics for passengers sharing a cabin deck letter
#[derive(Debug, Clone, Serialize)]
pub struct DeckFareSummary {
    pub deck: char,
    pub passengers: usize,
    pub mean_fare: f64,
    pub std_fare: f64,
    pub min_fare: f64,
    pub max_fare: f64,
}

/// Everything the profiler reports
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub numeric: Vec<NumericSummary>,
    pub columns: Vec<ColumnProfile>,
    pub missing: Vec<MissingCount>,
    pub cabin_decks: Vec<DeckFareSummary>,
}

/// Profile a loaded passenger table
pub fn profile_dataset(df: &DataFrame) -> PipelineResult<DatasetProfile> {
    Ok(DatasetProfile {
        rows: df.height(),
        numeric: summarize_numeric(df)?,
        columns: profile_columns(df, &PROFILED_COLUMNS)?,
        missing: analyze_missing_values(df),
        cabin_decks: cabin_deck_fares(df)?,
    })
}

/// Summary statistics for every numeric column.
///
/// Columns with no observed value are skipped.
pub fn summarize_numeric(df: &DataFrame) -> PipelineResult<Vec<NumericSummary>> {
    let mut summaries = Vec::new();

    for column in df.get_columns() {
        if !column.dtype().is_primitive_numeric() {
            continue;
        }
        let name = column.name().to_string();
        let values = float_values(df, &name)?;
        let missing = values.iter().filter(|v| v.is_none()).count();

        let mut observed: Vec<f64> = values.into_iter().flatten().collect();
        if observed.is_empty() {
            continue;
        }
        observed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        summaries.push(NumericSummary {
            column: name,
            min: observed[0],
            q1: quantile_sorted(&observed, 0.25),
            median: quantile_sorted(&observed, 0.5),
            mean: observed.iter().sum::<f64>() / observed.len() as f64,
            q3: quantile_sorted(&observed, 0.75),
            max: observed[observed.len() - 1],
            missing,
        });
    }

    Ok(summaries)
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
///
/// Position `(n - 1) * q`, interpolating between neighbours.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Distinct (non-null) values and missing counts for the named columns
pub fn profile_columns(df: &DataFrame, columns: &[&str]) -> PipelineResult<Vec<ColumnProfile>> {
    columns
        .iter()
        .map(|name| {
            let values = string_values(df, name)?;
            let missing = values.iter().filter(|v| v.is_none()).count();
            let distinct = values.iter().flatten().collect::<HashSet<_>>().len();
            Ok(ColumnProfile {
                column: name.to_string(),
                distinct,
                missing,
            })
        })
        .collect()
}

/// Missing values for every column, sorted descending by count
pub fn analyze_missing_values(df: &DataFrame) -> Vec<MissingCount> {
    let rows = df.height();

    let mut counts: Vec<MissingCount> = df
        .get_columns()
        .iter()
        .map(|column| {
            let missing = column.null_count();
            MissingCount {
                column: column.name().to_string(),
                missing,
                ratio: if rows == 0 {
                    0.0
                } else {
                    missing as f64 / rows as f64
                },
            }
        })
        .collect();

    counts.sort_by(|a, b| b.missing.cmp(&a.missing));
    counts
}

/// Fare distribution per cabin deck letter.
///
/// Passengers without a cabin or fare are left out.
pub fn cabin_deck_fares(df: &DataFrame) -> PipelineResult<Vec<DeckFareSummary>> {
    let cabins = string_values(df, "Cabin")?;
    let fares = float_values(df, "Fare")?;

    let mut by_deck: BTreeMap<char, Vec<f64>> = BTreeMap::new();
    for (cabin, fare) in cabins.iter().zip(fares.iter()) {
        if let (Some(cabin), Some(fare)) = (cabin, fare) {
            if let Some(deck) = cabin_deck(cabin) {
                by_deck.entry(deck).or_default().push(*fare);
            }
        }
    }

    Ok(by_deck
        .into_iter()
        .map(|(deck, fares)| {
            let n = fares.len() as f64;
            let mean = fares.iter().sum::<f64>() / n;
            let variance = if fares.len() > 1 {
                fares.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / (n - 1.0)
            } else {
                0.0
            };
            DeckFareSummary {
                deck,
                passengers: fares.len(),
                mean_fare: mean,
                std_fare: variance.sqrt(),
                min_fare: fares.iter().copied().fold(f64::INFINITY, f64::min),
                max_fare: fares.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect())
}
