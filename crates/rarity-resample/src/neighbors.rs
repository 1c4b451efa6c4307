//! Brute-force Euclidean nearest neighbours within one class.

use rayon::prelude::*;

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// For each row, the indices of its `k` nearest other rows.
///
/// Ties are broken by row index. Requires `k < rows.len()`.
pub(crate) fn k_nearest(rows: &[&[f64]], k: usize) -> Vec<Vec<usize>> {
    debug_assert!(k < rows.len(), "k must be smaller than the number of rows");
    (0..rows.len())
        .into_par_iter()
        .map(|i| {
            let mut candidates: Vec<(f64, usize)> = rows
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(j, row)| (squared_distance(rows[i], row), j))
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            candidates.truncate(k);
            candidates.into_iter().map(|(_, j)| j).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::k_nearest;

    #[test]
    fn neighbours_on_a_line() {
        let data = [vec![0.0], vec![1.0], vec![3.0], vec![10.0]];
        let rows: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let nn = k_nearest(&rows, 2);
        assert_eq!(nn[0], vec![1, 2]);
        assert_eq!(nn[1], vec![0, 2]);
        assert_eq!(nn[3], vec![2, 1]);
    }

    #[test]
    fn ties_go_to_lower_index() {
        let data = [vec![0.0], vec![-1.0], vec![1.0]];
        let rows: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let nn = k_nearest(&rows, 1);
        assert_eq!(nn[0], vec![1]);
    }

    #[test]
    fn never_returns_self() {
        let data = [vec![2.0, 2.0], vec![2.0, 2.0], vec![5.0, 5.0]];
        let rows: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        for (i, list) in k_nearest(&rows, 2).iter().enumerate() {
            assert!(!list.contains(&i));
        }
    }
}
