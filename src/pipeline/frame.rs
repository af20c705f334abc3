//! Column extraction helpers between polars frames and plain vectors

use polars::prelude::*;

use super::error::{PipelineError, PipelineResult};

fn column<'a>(df: &'a DataFrame, name: &str) -> PipelineResult<&'a Column> {
    df.column(name)
        .map_err(|_| PipelineError::schema(name, "column not found"))
}

/// Read a numeric column as `f64`, keeping nulls
pub fn float_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<f64>>> {
    let col = column(df, name)?;
    if !col.dtype().is_primitive_numeric() {
        return Err(PipelineError::schema(
            name,
            format!("expected a numeric column, found {}", col.dtype()),
        ));
    }

    let cast = col
        .cast(&DataType::Float64)
        .map_err(|e| PipelineError::schema(name, e.to_string()))?;
    let values = cast
        .f64()
        .map_err(|e| PipelineError::schema(name, e.to_string()))?
        .into_iter()
        .collect();

    Ok(values)
}

/// Read any column as strings, keeping nulls. Integers render without a
/// decimal point so that `Pclass` reads as `"3"`, not `"3.0"`.
pub fn string_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<String>>> {
    let col = column(df, name)?;

    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()
            .map_err(|e| PipelineError::schema(name, e.to_string()))?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let cast = col
                .cast(&DataType::Int64)
                .map_err(|e| PipelineError::schema(name, e.to_string()))?;
            cast.i64()
                .map_err(|e| PipelineError::schema(name, e.to_string()))?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        _ => {
            let cast = col
                .cast(&DataType::String)
                .map_err(|e| PipelineError::schema(name, e.to_string()))?;
            cast.str()
                .map_err(|e| PipelineError::schema(name, e.to_string()))?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Replace (or add) a float column, returning a new frame
pub fn with_float_column(
    df: &DataFrame,
    name: &str,
    values: Vec<Option<f64>>,
) -> PipelineResult<DataFrame> {
    let mut out = df.clone();
    out.with_column(Column::new(name.into(), values))
        .map_err(|e| PipelineError::schema(name, e.to_string()))?;
    Ok(out)
}
