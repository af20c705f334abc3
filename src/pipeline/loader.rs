//! Dataset loader for the passenger CSV file

use std::path::Path;

use polars::prelude::*;

use super::error::{PipelineError, PipelineResult};

/// Exact header of the passenger file, in order.
pub const EXPECTED_COLUMNS: [&str; 12] = [
    "PassengerId",
    "Survived",
    "Pclass",
    "Name",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Ticket",
    "Fare",
    "Cabin",
    "Embarked",
];

/// Integer-typed raw columns
const INTEGER_COLUMNS: [&str; 5] = ["PassengerId", "Survived", "Pclass", "SibSp", "Parch"];

/// Float-typed raw columns
const FLOAT_COLUMNS: [&str; 2] = ["Age", "Fare"];

/// String-typed raw columns. These are never coerced to categorical on load.
const STRING_COLUMNS: [&str; 5] = ["Name", "Sex", "Ticket", "Cabin", "Embarked"];

/// A loaded passenger table together with its basic shape statistics
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub df: DataFrame,
    pub rows: usize,
    pub cols: usize,
    pub memory_mb: f64,
}

/// Read only the header of a CSV file
pub fn get_column_names(path: &Path) -> PipelineResult<Vec<String>> {
    ensure_csv(path)?;

    let schema = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()
        .and_then(|mut lf| lf.collect_schema())
        .map_err(|e| PipelineError::data_load(path, format!("could not read header: {}", e)))?;

    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

/// Load the passenger file into a typed `DataFrame`.
///
/// Numeric columns are cast strictly, so a non-numeric value in e.g. `Age`
/// fails the load instead of silently becoming null. Empty fields are read as
/// missing values.
///
/// # Arguments
/// * `path` - Path to the CSV file
/// * `infer_schema_length` - Rows used for type inference (0 = full scan)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> PipelineResult<LoadedDataset> {
    ensure_csv(path)?;

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let raw = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(schema_length)
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| PipelineError::data_load(path, format!("could not parse CSV: {}", e)))?;

    validate_header(path, &raw)?;

    let casts: Vec<Expr> = INTEGER_COLUMNS
        .iter()
        .map(|name| col(*name).strict_cast(DataType::Int64))
        .chain(
            FLOAT_COLUMNS
                .iter()
                .map(|name| col(*name).strict_cast(DataType::Float64)),
        )
        .chain(
            STRING_COLUMNS
                .iter()
                .map(|name| col(*name).cast(DataType::String)),
        )
        .collect();

    let df = raw
        .lazy()
        .with_columns(casts)
        .collect()
        .map_err(|e| {
            PipelineError::data_load(path, format!("column type mismatch: {}", e))
        })?;

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    Ok(LoadedDataset {
        df,
        rows,
        cols,
        memory_mb,
    })
}

fn ensure_csv(path: &Path) -> PipelineResult<()> {
    if !path.exists() {
        return Err(PipelineError::data_load(path, "file not found"));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension != "csv" {
        return Err(PipelineError::data_load(
            path,
            format!("unsupported file format '{}', expected csv", extension),
        ));
    }

    Ok(())
}

fn validate_header(path: &Path, df: &DataFrame) -> PipelineResult<()> {
    let actual: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    if actual.len() != EXPECTED_COLUMNS.len() {
        return Err(PipelineError::data_load(
            path,
            format!(
                "expected {} columns, found {}: {:?}",
                EXPECTED_COLUMNS.len(),
                actual.len(),
                actual
            ),
        ));
    }

    for (position, (found, expected)) in actual.iter().zip(EXPECTED_COLUMNS.iter()).enumerate() {
        if found != expected {
            return Err(PipelineError::data_load(
                path,
                format!(
                    "column {} should be '{}' but is '{}'",
                    position + 1,
                    expected,
                    found
                ),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_header_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "bad.csv",
            &[
                "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Embarked,Cabin",
                "1,0,3,\"Braund, Mr. Owen\",male,22,1,0,A/5 21171,7.25,S,",
            ],
        );

        let err = load_dataset(&path, 100).unwrap_err();
        assert_eq!(err.kind(), "DataLoadError");
        assert!(err.to_string().contains("Cabin"));
    }

    #[test]
    fn test_wrong_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "data.txt", &["a,b", "1,2"]);

        let err = load_dataset(&path, 100).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }
}
