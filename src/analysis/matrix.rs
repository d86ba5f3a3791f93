use crate::data::model::{CellValue, Tabular};

// ---------------------------------------------------------------------------
// PivotMatrix – labelled dense numeric matrix
// ---------------------------------------------------------------------------

/// Dense row-major matrix with a label per row and per column.
///
/// `index_name` names the row-label column when the matrix is shown or
/// exported as a flat table (e.g. `Label` or `peakLabel`); `columns_name`
/// names the category the column labels belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    pub index_name: String,
    pub columns_name: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl PivotMatrix {
    /// Panics if `values` is not `row_labels.len()` × `col_labels.len()`.
    pub fn new(
        index_name: impl Into<String>,
        columns_name: impl Into<String>,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Self {
        assert_eq!(values.len(), row_labels.len(), "row count mismatch");
        assert!(
            values.iter().all(|r| r.len() == col_labels.len()),
            "column count mismatch"
        );
        PivotMatrix {
            index_name: index_name.into(),
            columns_name: columns_name.into(),
            row_labels,
            col_labels,
            values,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0 || self.n_cols() == 0
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        self.values.iter().map(|r| r[col]).collect()
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().flatten().all(|v| v.is_finite())
    }

    pub fn map_values(&self, f: impl Fn(usize, usize, f64) -> f64) -> Self {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, row)| row.iter().enumerate().map(|(j, &v)| f(i, j, v)).collect())
            .collect();
        PivotMatrix {
            values,
            ..self.clone()
        }
    }

    /// Rows in the order given by `order` (indices into the current rows).
    pub fn select_rows(&self, order: &[usize]) -> Self {
        PivotMatrix {
            row_labels: order.iter().map(|&i| self.row_labels[i].clone()).collect(),
            values: order.iter().map(|&i| self.values[i].clone()).collect(),
            ..self.clone()
        }
    }

    /// Columns in the order given by `order` (indices into the current columns).
    pub fn select_columns(&self, order: &[usize]) -> Self {
        PivotMatrix {
            index_name: self.index_name.clone(),
            columns_name: self.columns_name.clone(),
            row_labels: self.row_labels.clone(),
            col_labels: order.iter().map(|&j| self.col_labels[j].clone()).collect(),
            values: self
                .values
                .iter()
                .map(|row| order.iter().map(|&j| row[j]).collect())
                .collect(),
        }
    }
}

impl Tabular for PivotMatrix {
    fn headers(&self) -> Vec<String> {
        std::iter::once(self.index_name.clone())
            .chain(self.col_labels.iter().cloned())
            .collect()
    }

    fn records(&self) -> Vec<Vec<CellValue>> {
        self.row_labels
            .iter()
            .zip(&self.values)
            .map(|(label, row)| {
                std::iter::once(CellValue::Text(label.clone()))
                    .chain(row.iter().map(|&v| CellValue::Number(v)))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PivotMatrix {
        PivotMatrix::new(
            "Label",
            "peakLabel",
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into(), "z".into()],
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        )
    }

    #[test]
    fn selects_rows_and_columns() {
        let m = sample().select_rows(&[1, 0]).select_columns(&[2, 0]);
        assert_eq!(m.row_labels, vec!["b", "a"]);
        assert_eq!(m.col_labels, vec!["z", "x"]);
        assert_eq!(m.rows(), &[vec![6.0, 4.0], vec![3.0, 1.0]]);
    }

    #[test]
    fn flat_table_has_index_column_first() {
        let m = sample();
        assert_eq!(m.headers(), vec!["Label", "x", "y", "z"]);
        assert_eq!(m.records()[1][0], CellValue::Text("b".into()));
        assert_eq!(m.records()[1][3], CellValue::Number(6.0));
    }

    #[test]
    #[should_panic(expected = "column count mismatch")]
    fn ragged_values_are_rejected() {
        PivotMatrix::new("L", "C", vec!["a".into()], vec!["x".into()], vec![vec![1.0, 2.0]]);
    }
}
