use ndarray::{Array1, Array2};

/// Ordinary least squares through the normal equations.
///
/// Returns `None` when `X'X` is numerically singular or the solution is not finite.
pub(crate) fn least_squares(design: &Array2<f64>, target: &Array1<f64>) -> Option<Array1<f64>> {
    let gram = design.t().dot(design);
    let rhs = design.t().dot(target);
    solve(gram, rhs)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    let scale = a.iter().fold(0.0_f64, |max, value| max.max(value.abs())).max(1.0);
    let tolerance = scale * 1e-12;

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() <= tolerance {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }

    x.iter().all(|value| value.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn recovers_exact_linear_relation() {
        let design = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let target = array![1.0, 3.0, 5.0, 7.0];

        let beta = least_squares(&design, &target).expect("solvable");
        assert!((beta[0] - 1.0).abs() < 1e-9);
        assert!((beta[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_columns_are_singular() {
        let design = array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        let target = array![1.0, 2.0, 3.0];
        assert!(least_squares(&design, &target).is_none());
    }
}
