//! One-hot expansion of categorical columns

use crate::error::{PipelineError, Result};
use ndarray::{Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Column data type as seen by the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Numbers and booleans, passed through as `f64`
    Numeric,
    /// Anything else, expanded into indicator columns
    Categorical,
}

impl ColumnType {
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => ColumnType::Numeric,
            _ => ColumnType::Categorical,
        }
    }
}

/// How one input column maps to output feature columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnEncoding {
    Passthrough { column: String },
    OneHot { column: String, categories: Vec<String> },
}

impl ColumnEncoding {
    fn output_names(&self) -> Vec<String> {
        match self {
            ColumnEncoding::Passthrough { column } => vec![column.clone()],
            ColumnEncoding::OneHot { column, categories } => categories
                .iter()
                .map(|category| format!("{}_{}", column, category))
                .collect(),
        }
    }
}

/// Numeric feature matrix with its column names
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(PipelineError::FeatureShapeMismatch {
                expected: names.len(),
                actual: values.ncols(),
            });
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Copy out the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            names: self.names.clone(),
            values: self.values.select(Axis(0), indices),
        }
    }
}

/// One-hot encoder.
///
/// Categories are enumerated in lexicographic order and columns keep their
/// input order, so fitting twice on the same frame gives the same layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    encodings: Vec<ColumnEncoding>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the column layout from a frame
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let mut encodings = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let name = column.name().to_string();
            let encoding = match ColumnType::of(column.dtype()) {
                ColumnType::Numeric => ColumnEncoding::Passthrough { column: name },
                ColumnType::Categorical => {
                    let as_text = column.as_materialized_series().cast(&DataType::String)?;
                    let categories: BTreeSet<String> = as_text
                        .str()?
                        .into_iter()
                        .flatten()
                        .map(|v| v.to_string())
                        .collect();
                    ColumnEncoding::OneHot {
                        column: name,
                        categories: categories.into_iter().collect(),
                    }
                }
            };
            encodings.push(encoding);
        }

        self.encodings = encodings;
        Ok(self)
    }

    /// Output column names in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        self.encodings
            .iter()
            .flat_map(|encoding| encoding.output_names())
            .collect()
    }

    pub fn encodings(&self) -> &[ColumnEncoding] {
        &self.encodings
    }

    /// Build the numeric matrix for a frame with the fitted layout.
    ///
    /// Categorical values not seen during `fit` leave every indicator at 0.
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let n_rows = df.height();
        let names = self.feature_names();
        let mut values = Array2::<f64>::zeros((n_rows, names.len()));

        let mut offset = 0;
        for encoding in &self.encodings {
            match encoding {
                ColumnEncoding::Passthrough { column } => {
                    let series = df
                        .column(column)?
                        .as_materialized_series()
                        .cast(&DataType::Float64)?;
                    for (row, value) in series.f64()?.into_iter().enumerate() {
                        values[[row, offset]] = value.ok_or_else(|| {
                            PipelineError::UnreadableInput(format!(
                                "column '{}' has a missing value at row {}",
                                column, row
                            ))
                        })?;
                    }
                    offset += 1;
                }
                ColumnEncoding::OneHot { column, categories } => {
                    let series = df
                        .column(column)?
                        .as_materialized_series()
                        .cast(&DataType::String)?;
                    for (row, value) in series.str()?.into_iter().enumerate() {
                        if let Some(value) = value {
                            if let Ok(pos) = categories.binary_search_by(|c| c.as_str().cmp(value)) {
                                values[[row, offset + pos]] = 1.0;
                            }
                        }
                    }
                    offset += categories.len();
                }
            }
        }

        FeatureMatrix::new(names, values)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<FeatureMatrix> {
        self.fit(df)?;
        self.transform(df)
    }
}
