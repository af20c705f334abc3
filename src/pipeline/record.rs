//! Typed records for the modeling table
//!
//! Each categorical column is an explicit enum with a fixed level set. A
//! value outside that set is a schema error at cast time rather than a new
//! level discovered later.

use serde::Serialize;

use super::error::{PipelineError, PipelineResult};

/// A categorical column with a fixed, validated level set.
///
/// `LEVELS` is ordered; the first level is the reference level for
/// treatment coding in the logistic model.
pub trait Categorical: Sized + Copy + PartialEq {
    /// Column name in the passenger file
    const COLUMN: &'static str;
    /// All levels, reference level first
    const LEVELS: &'static [&'static str];

    /// Parse a raw cell into a level, `None` if the value is not a known level
    fn from_level(raw: &str) -> Option<Self>;

    /// Zero-based position of this value in `LEVELS`
    fn index(&self) -> usize;

    /// Level label
    fn level(&self) -> &'static str {
        Self::LEVELS[self.index()]
    }

    /// Parse a raw cell, failing with a schema error on an unseen level
    fn cast(raw: &str) -> PipelineResult<Self> {
        Self::from_level(raw.trim()).ok_or_else(|| {
            PipelineError::schema(
                Self::COLUMN,
                format!(
                    "unseen level '{}' (expected one of {:?})",
                    raw,
                    Self::LEVELS
                ),
            )
        })
    }
}

/// Survival indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Survival {
    Died,
    Survived,
}

impl Survival {
    /// Numeric response used by the logistic model
    pub fn as_response(&self) -> f64 {
        match self {
            Survival::Died => 0.0,
            Survival::Survived => 1.0,
        }
    }

    /// Two-level nominal relabeling used by the ensemble model
    pub fn label(&self) -> &'static str {
        match self {
            Survival::Died => "No",
            Survival::Survived => "Yes",
        }
    }
}

impl Categorical for Survival {
    const COLUMN: &'static str = "Survived";
    const LEVELS: &'static [&'static str] = &["0", "1"];

    fn from_level(raw: &str) -> Option<Self> {
        match raw {
            "0" => Some(Survival::Died),
            "1" => Some(Survival::Survived),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Survival::Died => 0,
            Survival::Survived => 1,
        }
    }
}

/// Ticket class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

impl Categorical for PassengerClass {
    const COLUMN: &'static str = "Pclass";
    const LEVELS: &'static [&'static str] = &["1", "2", "3"];

    fn from_level(raw: &str) -> Option<Self> {
        match raw {
            "1" => Some(PassengerClass::First),
            "2" => Some(PassengerClass::Second),
            "3" => Some(PassengerClass::Third),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            PassengerClass::First => 0,
            PassengerClass::Second => 1,
            PassengerClass::Third => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sex {
    Female,
    Male,
}

impl Categorical for Sex {
    const COLUMN: &'static str = "Sex";
    const LEVELS: &'static [&'static str] = &["female", "male"];

    fn from_level(raw: &str) -> Option<Self> {
        match raw {
            "female" => Some(Sex::Female),
            "male" => Some(Sex::Male),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }
}

/// Embarkation port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Port {
    Cherbourg,
    Queenstown,
    Southampton,
}

impl Categorical for Port {
    const COLUMN: &'static str = "Embarked";
    const LEVELS: &'static [&'static str] = &["C", "Q", "S"];

    fn from_level(raw: &str) -> Option<Self> {
        match raw {
            "C" => Some(Port::Cherbourg),
            "Q" => Some(Port::Queenstown),
            "S" => Some(Port::Southampton),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Port::Cherbourg => 0,
            Port::Queenstown => 1,
            Port::Southampton => 2,
        }
    }
}

/// One fully cleaned passenger row. Every field is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedRecord {
    pub survived: Survival,
    pub pclass: PassengerClass,
    pub sex: Sex,
    /// Age in years, mean-imputed where missing
    pub age: f64,
    /// `ln(SibSp + 1)`
    pub sibsp: f64,
    /// `ln(Parch + 1)`
    pub parch: f64,
    /// `ln(Fare + 1)`
    pub fare: f64,
    pub embarked: Port,
}

/// The modeling table: an ordered, immutable sequence of cleaned rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelingTable {
    records: Vec<TransformedRecord>,
}

impl ModelingTable {
    pub fn new(records: Vec<TransformedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TransformedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True survival labels in row order
    pub fn outcomes(&self) -> Vec<Survival> {
        self.records.iter().map(|r| r.survived).collect()
    }

    /// Build a new table from the rows at `indices`, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }
}

impl FromIterator<TransformedRecord> for ModelingTable {
    fn from_iter<I: IntoIterator<Item = TransformedRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
