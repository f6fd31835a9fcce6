//! Similarity index: dumb storage for the precomputed pairwise score
//! matrix. Beyond "array of arrays of numbers" no structure is validated
//! here; the outer dimension is checked against the catalog by the engine
//! that consumes it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::{AppError, Result};

/// Square matrix of pairwise similarity scores, `rows[i][j]` = similarity
/// between catalog rows i and j. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// Decode a raw payload into the matrix. Accepts only an array of
    /// numeric arrays.
    pub fn from_value(raw: &Value) -> Result<SimilarityMatrix> {
        let outer = raw
            .as_array()
            .ok_or_else(|| AppError::Schema("similarity payload is not an array".to_string()))?;

        let mut rows = Vec::with_capacity(outer.len());
        for (i, row) in outer.iter().enumerate() {
            let cells = row.as_array().ok_or_else(|| {
                AppError::Schema(format!("similarity row {} is not an array", i))
            })?;
            let mut scores = Vec::with_capacity(cells.len());
            for (j, cell) in cells.iter().enumerate() {
                let score = cell.as_f64().ok_or_else(|| {
                    AppError::Schema(format!(
                        "similarity entry [{}][{}] is not a number",
                        i, j
                    ))
                })?;
                scores.push(score);
            }
            rows.push(scores);
        }
        Ok(SimilarityMatrix { rows })
    }

    /// Read and decode a matrix file, then coerce it.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<SimilarityMatrix> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AppError::Schema(format!(
                "cannot open similarity file {}: {}",
                path.display(),
                e
            ))
        })?;
        let raw: Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AppError::Schema(format!("similarity file is not valid JSON: {}", e)))?;

        let matrix = SimilarityMatrix::from_value(&raw)?;
        info!(rows = matrix.len(), path = %path.display(), "Similarity matrix loaded");
        Ok(matrix)
    }

    /// Outer dimension (number of rows).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.rows.get(i).map(Vec::as_slice)
    }
}
