use super::matrix::PivotMatrix;
use crate::options::MatrixOptions;

/// Divide every column by its maximum. Cells whose quotient is not finite
/// (all-zero columns) become `0.0`.
pub fn normalize(m: &PivotMatrix) -> PivotMatrix {
    let maxima: Vec<f64> = (0..m.n_cols())
        .map(|j| m.column(j).into_iter().fold(f64::NEG_INFINITY, f64::max))
        .collect();
    m.map_values(|_, j, v| {
        let q = v / maxima[j];
        if q.is_finite() {
            q
        } else {
            0.0
        }
    })
}

pub fn transpose(m: &PivotMatrix) -> PivotMatrix {
    let values = (0..m.n_cols()).map(|j| m.column(j)).collect();
    PivotMatrix::new(
        m.columns_name.clone(),
        m.index_name.clone(),
        m.col_labels.clone(),
        m.row_labels.clone(),
        values,
    )
}

/// Pearson correlation between every pair of rows.
///
/// The result is square with the row labels on both axes. A row without
/// variance correlates as `0.0` with everything, itself included.
pub fn correlate(m: &PivotMatrix) -> PivotMatrix {
    let n_cols = m.n_cols() as f64;
    let centered: Vec<Vec<f64>> = m
        .rows()
        .iter()
        .map(|row| {
            let mean = row.iter().sum::<f64>() / n_cols;
            row.iter().map(|v| v - mean).collect()
        })
        .collect();
    let norms: Vec<Option<f64>> = centered
        .iter()
        .zip(m.rows())
        .map(|(c, raw)| {
            let norm = c.iter().map(|v| v * v).sum::<f64>().sqrt();
            let scale = raw.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
            (norm > f64::EPSILON * scale * n_cols).then_some(norm)
        })
        .collect();

    let n = m.n_rows();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        let Some(ni) = norms[i] else { continue };
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let Some(nj) = norms[j] else { continue };
            let dot: f64 = centered[i].iter().zip(&centered[j]).map(|(a, b)| a * b).sum();
            let r = (dot / (ni * nj)).clamp(-1.0, 1.0);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    PivotMatrix::new(
        m.index_name.clone(),
        m.index_name.clone(),
        m.row_labels.clone(),
        m.row_labels.clone(),
        values,
    )
}

/// Apply the requested transforms in the fixed order normalize → transpose →
/// correlate. Clustering is not a transform; see [`super::cluster`].
pub fn apply_transforms(m: &PivotMatrix, opts: &MatrixOptions) -> PivotMatrix {
    let mut out = m.clone();
    if opts.normalized {
        out = normalize(&out);
    }
    if opts.transposed {
        out = transpose(&out);
    }
    if opts.correlated {
        out = correlate(&out);
    }
    out
}
