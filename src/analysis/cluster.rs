//! Hierarchical clustering of matrix rows.
//!
//! Rows are compared with the standardized Euclidean metric and merged by
//! complete linkage using the nearest-neighbour chain algorithm. Merges are
//! then sorted by distance and relabelled so that the linkage (and hence the
//! dendrogram leaf order) matches the conventional `(left, right, distance,
//! size)` encoding where merge `k` creates cluster `n + k` and `left < right`.

use super::matrix::PivotMatrix;
use crate::error::AnalysisError;

/// Horizontal spacing of dendrogram leaves; leaf `i` sits at `5 + 10 * i`.
pub const LEAF_SPACING: f64 = 10.0;

// ---------------------------------------------------------------------------
// Distances
// ---------------------------------------------------------------------------

/// Upper triangle (row-major, without the diagonal) of a symmetric distance matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CondensedDistances {
    n: usize,
    values: Vec<f64>,
}

impl CondensedDistances {
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i != j);
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.n * i - i * (i + 1) / 2 + (j - i - 1)
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            0.0
        } else {
            self.values[self.index(i, j)]
        }
    }

    fn set(&mut self, i: usize, j: usize, v: f64) {
        let idx = self.index(i, j);
        self.values[idx] = v;
    }
}

/// Pairwise standardized Euclidean distances between the rows of `m`: each
/// squared column difference is divided by that column's sample variance.
pub fn standardized_euclidean(m: &PivotMatrix) -> Result<CondensedDistances, AnalysisError> {
    let n = m.n_rows();
    if n < 2 {
        return Err(AnalysisError::degenerate(format!(
            "need at least 2 rows, got {n}"
        )));
    }
    if m.n_cols() == 0 {
        return Err(AnalysisError::degenerate("matrix has no columns"));
    }
    if !m.is_finite() {
        return Err(AnalysisError::degenerate("matrix contains non-finite values"));
    }

    let mut variances = Vec::with_capacity(m.n_cols());
    for j in 0..m.n_cols() {
        let col = m.column(j);
        let mean = col.iter().sum::<f64>() / n as f64;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        if var == 0.0 {
            return Err(AnalysisError::degenerate(format!(
                "column '{}' has zero variance",
                m.col_labels[j]
            )));
        }
        variances.push(var);
    }

    let rows = m.rows();
    let mut values = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for k in (i + 1)..n {
            let d2: f64 = rows[i]
                .iter()
                .zip(&rows[k])
                .zip(&variances)
                .map(|((a, b), var)| (a - b).powi(2) / var)
                .sum();
            values.push(d2.sqrt());
        }
    }
    if values.iter().any(|d| !d.is_finite()) {
        return Err(AnalysisError::degenerate("distances are not finite"));
    }
    Ok(CondensedDistances { n, values })
}

// ---------------------------------------------------------------------------
// Linkage
// ---------------------------------------------------------------------------

/// One agglomeration step. Clusters `0..n` are the leaves; merge `k` creates
/// cluster `n + k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Linkage {
    pub n_leaves: usize,
    pub merges: Vec<Merge>,
}

/// Union-find over cluster ids used to relabel slot-based merges.
struct LabelUnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
    next_label: usize,
}

impl LabelUnionFind {
    fn new(n: usize) -> Self {
        LabelUnionFind {
            parent: (0..2 * n - 1).collect(),
            size: std::iter::repeat(1).take(n).chain(std::iter::repeat(0).take(n - 1)).collect(),
            next_label: n,
        }
    }

    fn merge(&mut self, x: usize, y: usize) -> usize {
        self.parent[x] = self.next_label;
        self.parent[y] = self.next_label;
        let size = self.size[x] + self.size[y];
        self.size[self.next_label] = size;
        self.next_label += 1;
        size
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut x = x;
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }
}

/// Complete-linkage agglomerative clustering over condensed distances.
pub fn complete_linkage(distances: &CondensedDistances) -> Linkage {
    let n = distances.len();
    if n < 2 {
        return Linkage {
            n_leaves: n,
            merges: Vec::new(),
        };
    }
    let mut d = distances.clone();
    let mut size = vec![1_usize; n];
    let mut chain: Vec<usize> = Vec::with_capacity(n);
    let mut raw: Vec<Merge> = Vec::with_capacity(n - 1);

    for _ in 0..n - 1 {
        if chain.is_empty() {
            if let Some(first) = (0..n).find(|&i| size[i] > 0) {
                chain.push(first);
            }
        }

        // Walk nearest neighbours until two clusters are mutual neighbours.
        let (x, y, current_min) = loop {
            let x = chain[chain.len() - 1];
            let previous = (chain.len() > 1).then(|| chain[chain.len() - 2]);
            let (mut y, mut current_min) = match previous {
                Some(p) => (p, d.get(x, p)),
                None => (x, f64::INFINITY),
            };
            for i in 0..n {
                if size[i] == 0 || i == x {
                    continue;
                }
                let dist = d.get(x, i);
                if dist < current_min {
                    current_min = dist;
                    y = i;
                }
            }
            if previous == Some(y) {
                break (x, y, current_min);
            }
            chain.push(y);
        };
        chain.truncate(chain.len() - 2);

        let (x, y) = if x > y { (y, x) } else { (x, y) };
        let (nx, ny) = (size[x], size[y]);
        raw.push(Merge {
            left: x,
            right: y,
            distance: current_min,
            size: nx + ny,
        });
        size[x] = 0;
        size[y] = nx + ny;

        for i in 0..n {
            if size[i] == 0 || i == y {
                continue;
            }
            let merged = d.get(i, x).max(d.get(i, y));
            d.set(i, y, merged);
        }
    }

    // Stable sort by distance, then translate slots into cluster ids.
    raw.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    let mut uf = LabelUnionFind::new(n);
    let merges = raw
        .into_iter()
        .map(|m| {
            let (xr, yr) = (uf.find(m.left), uf.find(m.right));
            let (left, right) = if xr < yr { (xr, yr) } else { (yr, xr) };
            let size = uf.merge(xr, yr);
            Merge {
                left,
                right,
                distance: m.distance,
                size,
            }
        })
        .collect();

    Linkage { n_leaves: n, merges }
}

impl Linkage {
    /// Leaves in dendrogram order: depth-first from the root, left before right.
    pub fn leaves(&self) -> Vec<usize> {
        let n = self.n_leaves;
        if self.merges.is_empty() {
            return (0..n).collect();
        }
        let mut leaves = Vec::with_capacity(n);
        let mut stack = vec![n + self.merges.len() - 1];
        while let Some(node) = stack.pop() {
            if node < n {
                leaves.push(node);
            } else {
                let m = &self.merges[node - n];
                stack.push(m.right);
                stack.push(m.left);
            }
        }
        leaves
    }
}

// ---------------------------------------------------------------------------
// Reordering and dendrogram geometry
// ---------------------------------------------------------------------------

/// Clustering of matrix rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowClustering {
    pub linkage: Linkage,
    /// Row permutation: reordered row `i` is original row `order[i]`. This is
    /// the reversed leaf order so the first leaf ends up on the top row.
    pub order: Vec<usize>,
}

pub fn cluster_rows(m: &PivotMatrix) -> Result<RowClustering, AnalysisError> {
    let distances = standardized_euclidean(m)?;
    let linkage = complete_linkage(&distances);
    let mut order = linkage.leaves();
    order.reverse();
    log::debug!(
        "clustered {} rows in {} merges",
        m.n_rows(),
        linkage.merges.len()
    );
    Ok(RowClustering { linkage, order })
}

/// Reorder rows by the clustering. A correlation matrix also gets its columns
/// in the same order so it stays symmetric.
pub fn reorder(m: &PivotMatrix, clustering: &RowClustering, correlated: bool) -> PivotMatrix {
    let out = m.select_rows(&clustering.order);
    if correlated {
        out.select_columns(&clustering.order)
    } else {
        out
    }
}

/// One ⊓-shaped dendrogram link: four points as (position, height) pairs.
/// Positions run along the leaf axis, heights are merge distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DendrogramLink {
    pub positions: [f64; 4],
    pub heights: [f64; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    pub links: Vec<DendrogramLink>,
    /// Leaf positions; `tick_vals[i]` is the position of reordered row `i`.
    pub tick_vals: Vec<f64>,
    pub max_height: f64,
}

impl RowClustering {
    /// Dendrogram whose leaves line up with the reordered rows.
    pub fn dendrogram(&self) -> Dendrogram {
        let n = self.linkage.n_leaves;
        let leaf_pos = |i: usize| LEAF_SPACING / 2.0 + LEAF_SPACING * i as f64;

        // (position, height) of every cluster id.
        let mut nodes = vec![(0.0, 0.0); n + self.linkage.merges.len()];
        for (row, &leaf) in self.order.iter().enumerate() {
            nodes[leaf] = (leaf_pos(row), 0.0);
        }

        let mut links = Vec::with_capacity(self.linkage.merges.len());
        for (k, m) in self.linkage.merges.iter().enumerate() {
            let (pl, hl) = nodes[m.left];
            let (pr, hr) = nodes[m.right];
            links.push(DendrogramLink {
                positions: [pl, pl, pr, pr],
                heights: [hl, m.distance, m.distance, hr],
            });
            nodes[n + k] = ((pl + pr) / 2.0, m.distance);
        }

        Dendrogram {
            links,
            tick_vals: (0..n).map(leaf_pos).collect(),
            max_height: self
                .linkage
                .merges
                .iter()
                .map(|m| m.distance)
                .fold(0.0, f64::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(values: Vec<Vec<f64>>) -> PivotMatrix {
        let rows = (0..values.len()).map(|i| format!("r{i}")).collect();
        let cols = (0..values[0].len()).map(|j| format!("c{j}")).collect();
        PivotMatrix::new("Label", "peakLabel", rows, cols, values)
    }

    #[test]
    fn condensed_index_is_symmetric() {
        let m = matrix(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 2.0]]);
        let d = standardized_euclidean(&m).unwrap();
        assert_eq!(d.get(0, 2), d.get(2, 0));
        assert_eq!(d.get(1, 1), 0.0);
        // column variances are 1/3 and 4/3
        assert!((d.get(0, 1) - 3.0_f64.sqrt()).abs() < 1e-12);
        assert!((d.get(0, 2) - 3.0_f64.sqrt()).abs() < 1e-12);
        assert!((d.get(1, 2) - 6.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn rejects_degenerate_input() {
        let one_row = matrix(vec![vec![1.0, 2.0]]);
        assert!(matches!(
            cluster_rows(&one_row),
            Err(AnalysisError::DegenerateClusterInput { .. })
        ));
        let nan = matrix(vec![vec![1.0], vec![f64::NAN]]);
        assert!(cluster_rows(&nan).is_err());
        let constant = matrix(vec![vec![1.0, 5.0], vec![2.0, 5.0]]);
        let err = cluster_rows(&constant).unwrap_err();
        assert!(err.to_string().contains("c1"));
    }

    #[test]
    fn linkage_encodes_merges_in_distance_order() {
        // 1-D points: 0, 1, 10, 12
        let m = matrix(vec![vec![0.0], vec![1.0], vec![10.0], vec![12.0]]);
        let link = complete_linkage(&standardized_euclidean(&m).unwrap());
        let pairs: Vec<(usize, usize, usize)> =
            link.merges.iter().map(|m| (m.left, m.right, m.size)).collect();
        assert_eq!(pairs, vec![(0, 1, 2), (2, 3, 2), (4, 5, 4)]);
        let d: Vec<f64> = link.merges.iter().map(|m| m.distance).collect();
        assert!(d[0] < d[1] && d[1] < d[2]);
        // complete linkage: root height is the farthest pair (0 and 12)
        let sd = standardized_euclidean(&m).unwrap();
        assert_eq!(d[2], sd.get(0, 3));
        assert_eq!(link.leaves(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn interleaved_groups_give_a_fixed_leaf_order() {
        // rows 0 and 2 sit near 10, rows 1 and 3 near 0
        let m = matrix(vec![vec![10.0], vec![0.0], vec![11.0], vec![1.0]]);
        let c = cluster_rows(&m).unwrap();
        let pairs: Vec<(usize, usize, usize)> =
            c.linkage.merges.iter().map(|m| (m.left, m.right, m.size)).collect();
        assert_eq!(pairs, vec![(0, 2, 2), (1, 3, 2), (4, 5, 4)]);
        assert_eq!(c.linkage.leaves(), vec![0, 2, 1, 3]);
        assert_eq!(c.order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn order_is_reversed_leaf_order() {
        let m = matrix(vec![vec![10.0], vec![0.0], vec![11.0], vec![1.0]]);
        let c = cluster_rows(&m).unwrap();
        let mut leaves = c.linkage.leaves();
        leaves.reverse();
        assert_eq!(c.order, leaves);
        let r = reorder(&m, &c, false);
        // near rows end up adjacent
        let pos = |l: &str| r.row_labels.iter().position(|x| x == l).unwrap();
        assert_eq!((pos("r0") as i64 - pos("r2") as i64).abs(), 1);
        assert_eq!((pos("r1") as i64 - pos("r3") as i64).abs(), 1);
    }

    #[test]
    fn dendrogram_leaves_align_with_rows() {
        let m = matrix(vec![vec![0.0], vec![1.0], vec![10.0]]);
        let c = cluster_rows(&m).unwrap();
        let dendro = c.dendrogram();
        assert_eq!(dendro.tick_vals, vec![5.0, 15.0, 25.0]);
        assert_eq!(dendro.links.len(), 2);
        // every link foot at height 0 sits on a tick
        for link in &dendro.links {
            for (p, h) in link.positions.iter().zip(&link.heights) {
                if *h == 0.0 {
                    assert!(dendro.tick_vals.contains(p));
                }
            }
        }
        let root = dendro.links.last().unwrap();
        assert_eq!(root.heights[1], dendro.max_height);
    }
}
