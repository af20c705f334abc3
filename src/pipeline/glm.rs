//! Binomial generalized linear model (logistic regression)
//!
//! Fitted by iteratively reweighted least squares on a treatment-coded design
//! matrix. Each categorical predictor contributes one indicator column per
//! non-reference level; an intercept is always present.

use std::fmt;
use std::str::FromStr;

use faer::prelude::SpSolver;
use faer::{Mat, Side};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use super::error::{PipelineError, PipelineResult};
use super::record::{
    Categorical, ModelingTable, PassengerClass, Port, Sex, Survival, TransformedRecord,
};

/// Log-odds cutoff for predicting survival.
///
/// This is a threshold on the linear predictor, not on the probability
/// (`eta > 1` is `p > 0.731`). Changing it changes reported accuracy.
pub const LOG_ODDS_THRESHOLD: f64 = 1.0;

/// Default IRLS iteration cap
pub const DEFAULT_MAX_ITERATIONS: usize = 25;

/// Default relative deviance tolerance
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Relative tolerance for detecting linearly dependent design columns
const RANK_TOLERANCE: f64 = 1e-7;

/// Bound on fitted probabilities inside the log-likelihood
const PROBABILITY_EPSILON: f64 = 1e-15;

/// A predictor available to the logistic model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Predictor {
    Pclass,
    Sex,
    Age,
    SibSp,
    Parch,
    Fare,
    Embarked,
}

impl Predictor {
    /// Every predictor, in canonical column order
    pub const ALL: [Predictor; 7] = [
        Predictor::Pclass,
        Predictor::Sex,
        Predictor::Age,
        Predictor::SibSp,
        Predictor::Parch,
        Predictor::Fare,
        Predictor::Embarked,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Predictor::Pclass => PassengerClass::COLUMN,
            Predictor::Sex => Sex::COLUMN,
            Predictor::Age => "Age",
            Predictor::SibSp => "SibSp",
            Predictor::Parch => "Parch",
            Predictor::Fare => "Fare",
            Predictor::Embarked => Port::COLUMN,
        }
    }

    /// Design-matrix column names contributed by this predictor
    fn term_names(&self) -> Vec<String> {
        let dummies = |levels: &[&str]| -> Vec<String> {
            levels[1..]
                .iter()
                .map(|level| format!("{}{}", self.name(), level))
                .collect()
        };
        match self {
            Predictor::Pclass => dummies(PassengerClass::LEVELS),
            Predictor::Sex => dummies(Sex::LEVELS),
            Predictor::Embarked => dummies(Port::LEVELS),
            _ => vec![self.name().to_string()],
        }
    }

    /// Append this predictor's design values for one record
    fn push_values(&self, record: &TransformedRecord, row: &mut Vec<f64>) {
        fn indicators<T: Categorical>(value: T, row: &mut Vec<f64>) {
            for level in 1..T::LEVELS.len() {
                row.push(if value.index() == level { 1.0 } else { 0.0 });
            }
        }
        match self {
            Predictor::Pclass => indicators(record.pclass, row),
            Predictor::Sex => indicators(record.sex, row),
            Predictor::Embarked => indicators(record.embarked, row),
            Predictor::Age => row.push(record.age),
            Predictor::SibSp => row.push(record.sibsp),
            Predictor::Parch => row.push(record.parch),
            Predictor::Fare => row.push(record.fare),
        }
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Predictor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Predictor::ALL
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unknown predictor: '{}'. Use one of: Pclass, Sex, Age, SibSp, Parch, Fare, Embarked",
                    s.trim()
                )
            })
    }
}

/// The right-hand side of a survival model: which predictors enter it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Formula {
    predictors: Vec<Predictor>,
}

impl Formula {
    /// Build a formula; duplicates are removed and order is canonical
    pub fn new(predictors: impl IntoIterator<Item = Predictor>) -> Self {
        let mut predictors: Vec<Predictor> = predictors.into_iter().collect();
        predictors.sort();
        predictors.dedup();
        Self { predictors }
    }

    /// All seven predictors
    pub fn full() -> Self {
        Self::new(Predictor::ALL)
    }

    /// The refined model: the full model without Parch and Embarked
    pub fn reduced() -> Self {
        Self::full().without(&[Predictor::Parch, Predictor::Embarked])
    }

    pub fn without(&self, dropped: &[Predictor]) -> Self {
        Self::new(
            self.predictors
                .iter()
                .copied()
                .filter(|p| !dropped.contains(p)),
        )
    }

    pub fn predictors(&self) -> &[Predictor] {
        &self.predictors
    }

    /// True if every predictor of `self` also appears in `other`
    pub fn is_nested_in(&self, other: &Formula) -> bool {
        self.predictors.iter().all(|p| other.predictors.contains(p))
    }

    /// Design-matrix column names, intercept first
    pub fn term_names(&self) -> Vec<String> {
        std::iter::once("(Intercept)".to_string())
            .chain(self.predictors.iter().flat_map(|p| p.term_names()))
            .collect()
    }

    /// Design-matrix row for one record, intercept first
    pub fn design_row(&self, record: &TransformedRecord) -> Vec<f64> {
        let mut row = Vec::with_capacity(1 + self.predictors.len() * 2);
        row.push(1.0);
        for predictor in &self.predictors {
            predictor.push_values(record, &mut row);
        }
        row
    }

    fn design_matrix(&self, table: &ModelingTable) -> Mat<f64> {
        let rows: Vec<Vec<f64>> = table.records().iter().map(|r| self.design_row(r)).collect();
        let p = self.term_names().len();
        Mat::from_fn(rows.len(), p, |i, j| rows[i][j])
    }
}

impl Default for Formula {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rhs: Vec<&str> = self.predictors.iter().map(|p| p.name()).collect();
        if rhs.is_empty() {
            write!(f, "Survived ~ 1")
        } else {
            write!(f, "Survived ~ {}", rhs.join(" + "))
        }
    }
}

impl FromStr for Formula {
    type Err = String;

    /// Accepts `"Survived ~ Pclass + Sex"`, `"Pclass + Sex"`, `"."` (all) or `"1"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rhs = match s.split_once('~') {
            Some((lhs, rhs)) => {
                if lhs.trim() != Survival::COLUMN {
                    return Err(format!(
                        "Formula response must be '{}', got '{}'",
                        Survival::COLUMN,
                        lhs.trim()
                    ));
                }
                rhs
            }
            None => s,
        }
        .trim();

        match rhs {
            "." => Ok(Formula::full()),
            "1" | "" => Ok(Formula::new([])),
            _ => rhs
                .split('+')
                .map(str::parse::<Predictor>)
                .collect::<Result<Vec<_>, _>>()
                .map(Formula::new),
        }
    }
}

/// IRLS settings
#[derive(Debug, Clone, Copy)]
pub struct GlmConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for GlmConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// One row of the coefficient table
#[derive(Debug, Clone, Serialize)]
pub struct Coefficient {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
}

/// A fitted logistic model
#[derive(Debug, Clone, Serialize)]
pub struct LogisticModel {
    pub formula: Formula,
    pub coefficients: Vec<Coefficient>,
    /// Residual deviance
    pub deviance: f64,
    pub null_deviance: f64,
    pub df_residual: usize,
    pub df_null: usize,
    pub aic: f64,
    pub iterations: usize,
}

impl LogisticModel {
    /// Number of estimated parameters, intercept included
    pub fn parameter_count(&self) -> usize {
        self.coefficients.len()
    }

    pub fn estimates(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.estimate).collect()
    }

    pub fn coefficient(&self, term: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.term == term)
    }
}

fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

fn binomial_deviance(y: &[f64], mu: &[f64]) -> f64 {
    -2.0 * y
        .iter()
        .zip(mu.iter())
        .map(|(&yi, &mi)| {
            let m = mi.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
            yi * m.ln() + (1.0 - yi) * (1.0 - m).ln()
        })
        .sum::<f64>()
}

/// Numerical column rank: singular values above `RANK_TOLERANCE` times the largest
fn column_rank(x: &Mat<f64>) -> usize {
    let singular = x.singular_values();
    let largest = singular.iter().copied().fold(0.0f64, f64::max);
    if largest == 0.0 {
        return 0;
    }
    singular
        .iter()
        .filter(|&&s| s > RANK_TOLERANCE * largest)
        .count()
}

/// Fit a logistic model predicting survival from `formula` on `training`.
///
/// Fails if the design matrix is rank deficient or the deviance does not
/// settle within `config.max_iterations` iterations.
pub fn fit_logistic(
    training: &ModelingTable,
    formula: &Formula,
    config: &GlmConfig,
) -> PipelineResult<LogisticModel> {
    let x = formula.design_matrix(training);
    let terms = formula.term_names();
    let (n, p) = (x.nrows(), x.ncols());

    if n <= p {
        return Err(PipelineError::fit(format!(
            "{} rows cannot identify {} parameters",
            n, p
        )));
    }
    let rank = column_rank(&x);
    if rank < p {
        return Err(PipelineError::fit(format!(
            "design matrix is rank deficient (rank {} < {} columns)",
            rank, p
        )));
    }

    let y: Vec<f64> = training.records().iter().map(|r| r.survived.as_response()).collect();

    // Start from mu = (y + 0.5) / 2, the usual binomial starting point.
    let mut eta: Vec<f64> = y
        .iter()
        .map(|yi| {
            let mu = (yi + 0.5) / 2.0;
            (mu / (1.0 - mu)).ln()
        })
        .collect();
    let mut mu: Vec<f64> = eta.iter().map(|&e| sigmoid(e)).collect();
    let mut deviance = binomial_deviance(&y, &mu);

    let mut beta = Mat::<f64>::zeros(p, 1);
    let mut information = Mat::<f64>::zeros(p, p);
    let mut converged = false;
    let mut iterations = 0;

    for iteration in 1..=config.max_iterations {
        iterations = iteration;

        let weights: Vec<f64> = mu
            .iter()
            .map(|m| (m * (1.0 - m)).max(PROBABILITY_EPSILON))
            .collect();
        let working = Mat::from_fn(n, 1, |i, _| eta[i] + (y[i] - mu[i]) / weights[i]);
        let weighted_x = Mat::from_fn(n, p, |i, j| weights[i] * x[(i, j)]);

        // Normal equations X'WX beta = X'Wz
        let xtwx = weighted_x.transpose() * &x;
        let xtwz = weighted_x.transpose() * &working;

        let cholesky = xtwx.cholesky(Side::Lower).map_err(|_| {
            PipelineError::fit(format!(
                "weighted information matrix is singular at iteration {}",
                iteration
            ))
        })?;
        beta = cholesky.solve(&xtwz);
        information = xtwx;

        let x_beta = &x * &beta;
        eta = (0..n).map(|i| x_beta[(i, 0)]).collect();
        mu = eta.iter().map(|&e| sigmoid(e)).collect();

        let new_deviance = binomial_deviance(&y, &mu);
        let change = (new_deviance - deviance).abs() / (new_deviance.abs() + 0.1);
        deviance = new_deviance;

        if !deviance.is_finite() {
            return Err(PipelineError::fit("deviance diverged"));
        }
        if change < config.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(PipelineError::fit(format!(
            "IRLS did not converge within {} iterations",
            config.max_iterations
        )));
    }

    let covariance = information
        .cholesky(Side::Lower)
        .map_err(|_| PipelineError::fit("information matrix is singular at the solution"))?
        .solve(&Mat::<f64>::identity(p, p));

    let normal = Normal::new(0.0, 1.0).map_err(|e| PipelineError::fit(e.to_string()))?;
    let coefficients = terms
        .into_iter()
        .enumerate()
        .map(|(j, term)| {
            let estimate = beta[(j, 0)];
            let std_error = covariance[(j, j)].max(0.0).sqrt();
            let z_value = estimate / std_error;
            Coefficient {
                term,
                estimate,
                std_error,
                z_value,
                p_value: 2.0 * normal.sf(z_value.abs()),
            }
        })
        .collect();

    let y_bar = y.iter().sum::<f64>() / n as f64;
    let null_deviance = binomial_deviance(&y, &vec![y_bar; n]);

    Ok(LogisticModel {
        formula: formula.clone(),
        coefficients,
        deviance,
        null_deviance,
        df_residual: n - p,
        df_null: n - 1,
        aic: deviance + 2.0 * p as f64,
        iterations,
    })
}

/// Linear predictor (log-odds) for each row of `table`
pub fn predict_log_odds(model: &LogisticModel, table: &ModelingTable) -> Vec<f64> {
    let beta = model.estimates();
    table
        .records()
        .iter()
        .map(|record| {
            model
                .formula
                .design_row(record)
                .iter()
                .zip(beta.iter())
                .map(|(x, b)| x * b)
                .sum()
        })
        .collect()
}

/// Apply the log-odds decision rule: survived iff `eta > LOG_ODDS_THRESHOLD`
pub fn classify_log_odds(log_odds: &[f64]) -> Vec<Survival> {
    log_odds
        .iter()
        .map(|&eta| {
            if eta > LOG_ODDS_THRESHOLD {
                Survival::Survived
            } else {
                Survival::Died
            }
        })
        .collect()
}

/// Outcome of a likelihood-ratio test between nested models
#[derive(Debug, Clone, Serialize)]
pub struct LikelihoodRatioTest {
    pub restricted: String,
    pub full: String,
    /// Restricted deviance minus full deviance
    pub statistic: f64,
    pub df: usize,
    pub p_value: f64,
}

/// Compare two nested models fitted on the same rows.
///
/// The argument order does not matter; the model with fewer parameters is
/// treated as the restricted one.
pub fn likelihood_ratio_test(
    a: &LogisticModel,
    b: &LogisticModel,
) -> PipelineResult<LikelihoodRatioTest> {
    let (restricted, full) = if a.parameter_count() <= b.parameter_count() {
        (a, b)
    } else {
        (b, a)
    };

    if restricted.df_null != full.df_null {
        return Err(PipelineError::fit(
            "models were fitted on different numbers of rows",
        ));
    }
    if !restricted.formula.is_nested_in(&full.formula) {
        return Err(PipelineError::fit(format!(
            "'{}' is not nested in '{}'",
            restricted.formula, full.formula
        )));
    }

    let df = full.parameter_count() - restricted.parameter_count();
    if df == 0 {
        return Err(PipelineError::fit(
            "models have the same number of parameters",
        ));
    }

    let statistic = (restricted.deviance - full.deviance).max(0.0);
    let chi_squared =
        ChiSquared::new(df as f64).map_err(|e| PipelineError::fit(e.to_string()))?;

    Ok(LikelihoodRatioTest {
        restricted: restricted.formula.to_string(),
        full: full.formula.to_string(),
        statistic,
        df,
        p_value: chi_squared.sf(statistic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_parsing() {
        let f: Formula = "Survived ~ Sex + Pclass".parse().unwrap();
        assert_eq!(f.predictors(), &[Predictor::Pclass, Predictor::Sex]);

        let f: Formula = "age + fare".parse().unwrap();
        assert_eq!(f.predictors(), &[Predictor::Age, Predictor::Fare]);

        assert_eq!(".".parse::<Formula>().unwrap(), Formula::full());
        assert!("Survived ~ Deck".parse::<Formula>().is_err());
        assert!("Fare ~ Age".parse::<Formula>().is_err());
    }

    #[test]
    fn test_formula_display_round_trips() {
        let reduced = Formula::reduced();
        assert_eq!(reduced.to_string(), "Survived ~ Pclass + Sex + Age + SibSp + Fare");
        assert_eq!(reduced.to_string().parse::<Formula>().unwrap(), reduced);
    }

    #[test]
    fn test_term_names_use_treatment_coding() {
        let terms = Formula::full().term_names();
        assert_eq!(
            terms,
            vec![
                "(Intercept)",
                "Pclass2",
                "Pclass3",
                "Sexmale",
                "Age",
                "SibSp",
                "Parch",
                "Fare",
                "EmbarkedQ",
                "EmbarkedS",
            ]
        );
    }

    #[test]
    fn test_design_row_matches_terms() {
        let record = TransformedRecord {
            survived: Survival::Died,
            pclass: PassengerClass::Third,
            sex: Sex::Male,
            age: 22.0,
            sibsp: 0.5,
            parch: 0.0,
            fare: 2.1,
            embarked: Port::Queenstown,
        };
        let row = Formula::full().design_row(&record);
        assert_eq!(row, vec![1.0, 0.0, 1.0, 1.0, 22.0, 0.5, 0.0, 2.1, 1.0, 0.0]);
    }

    #[test]
    fn test_nesting() {
        assert!(Formula::reduced().is_nested_in(&Formula::full()));
        assert!(!Formula::full().is_nested_in(&Formula::reduced()));
    }

    #[test]
    fn test_classify_uses_log_odds_cutoff() {
        let labels = classify_log_odds(&[0.9, 1.0, 1.0001, -3.0, 4.0]);
        assert_eq!(
            labels,
            vec![
                Survival::Died,
                Survival::Died,
                Survival::Survived,
                Survival::Died,
                Survival::Survived,
            ]
        );
    }

    #[test]
    fn test_column_rank_detects_duplicates() {
        let x = Mat::from_fn(4, 3, |i, j| match j {
            0 => 1.0,
            _ => i as f64,
        });
        assert_eq!(column_rank(&x), 2);

        let x = Mat::from_fn(4, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        assert_eq!(column_rank(&x), 2);

        let x = Mat::from_fn(5, 2, |i, j| if j == 0 { 1.0 + i as f64 } else { 0.0 });
        assert_eq!(column_rank(&x), 1);
    }

    #[test]
    fn test_binomial_deviance_of_perfect_fit_is_near_zero() {
        let y = [0.0, 1.0];
        let mu = [0.0, 1.0];
        assert!(binomial_deviance(&y, &mu) < 1e-10);
    }
}
