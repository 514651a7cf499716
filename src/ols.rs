use linfa_linalg::qr::QR;
use ndarray::{Array1, Array2};

use crate::data::ensure_len;
use crate::types::ForecastError;

/// Split a solved coefficient vector into its first entry (by convention the intercept)
/// and the remaining coefficients.
///
/// An empty vector yields `(NaN, [])`.
pub(crate) fn split_coefficients(mut coef: Vec<f64>) -> (f64, Vec<f64>) {
    if coef.is_empty() {
        return (f64::NAN, Vec::new());
    }
    let rest = coef.split_off(1);
    (coef[0], rest)
}

/// Ordinary least squares through a QR factorisation.
///
/// Factors `X = QR`, projects `p = yᵀQ` and back-substitutes `Rc = p` from the last
/// coefficient to the first.
///
/// # Arguments
/// * `x` - Design matrix (m x n); an intercept column, if any, is the caller's and sits at 0
/// * `y` - Observations (length m)
///
/// # Returns
/// `(c[0], c[1..])`. With `n == 0` this is `(NaN, [])`.
///
/// `X` is assumed to have full column rank. Linearly dependent columns produce
/// non-finite coefficients rather than an error.
///
/// # Errors
/// Returns `ForecastError::DimensionMismatch` if `y.len() != m` and
/// `ForecastError::Linalg` if the factorisation fails (fewer rows than columns).
///
/// # Example
/// ```
/// use ndarray::{array, Array1};
/// use seasonal_lr::ols;
///
/// // y = 1 + 2x
/// let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0]];
/// let y: Array1<f64> = array![1.0, 3.0, 5.0];
/// let (intercept, coef) = ols(&x, &y).unwrap();
/// assert!((intercept - 1.0).abs() < 1e-9);
/// assert!((coef[0] - 2.0).abs() < 1e-9);
/// ```
pub fn ols(x: &Array2<f64>, y: &Array1<f64>) -> Result<(f64, Vec<f64>), ForecastError> {
    let (m, n) = x.dim();
    ensure_len("observations vs design matrix rows", m, y.len())?;
    if n == 0 {
        return Ok(split_coefficients(Vec::new()));
    }
    if m < n {
        return Err(ForecastError::Linalg(format!(
            "design matrix has {m} rows but {n} columns"
        )));
    }

    let qr = x.qr().map_err(|e| ForecastError::Linalg(e.to_string()))?;
    let q = qr.generate_q();
    let r = qr.into_r();
    let p = y.dot(&q);

    let mut c = vec![0.0; n];
    for i in (0..n).rev() {
        let mut acc = p[i];
        for j in (i + 1)..n {
            acc -= c[j] * r[[i, j]];
        }
        c[i] = acc / r[[i, i]];
    }

    Ok(split_coefficients(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linfa::dataset::Dataset;
    use linfa::traits::Fit;
    use linfa_linear::LinearRegression;
    use ndarray::{array, s, Axis};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn with_intercept(x: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::<f64>::ones((x.nrows(), x.ncols() + 1));
        out.slice_mut(s![.., 1..]).assign(x);
        out
    }

    #[test]
    fn test_ols_recovers_linear_relationship() {
        // y = 2*x1 + 3*x2 + 1
        let raw = array![[1.0, 1.0], [2.0, 1.0], [3.0, 2.0], [4.0, 3.0]];
        let y: Array1<f64> = raw.map_axis(Axis(1), |row| 2.0 * row[0] + 3.0 * row[1] + 1.0);

        let (intercept, coef) = ols(&with_intercept(&raw), &y).unwrap();

        assert!((intercept - 1.0).abs() < 1e-6);
        assert_eq!(coef.len(), 2);
        assert!((coef[0] - 2.0).abs() < 1e-6);
        assert!((coef[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_ols_single_column() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];
        let (first, rest) = ols(&x, &y).unwrap();
        assert!((first - 2.0).abs() < 1e-10);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_ols_no_columns() {
        let x = Array2::<f64>::zeros((3, 0));
        let y = array![1.0, 2.0, 3.0];
        let (first, rest) = ols(&x, &y).unwrap();
        assert!(first.is_nan());
        assert!(rest.is_empty());
    }

    #[test]
    fn test_ols_length_mismatch() {
        let x = array![[1.0, 0.0], [1.0, 1.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            ols(&x, &y),
            Err(ForecastError::DimensionMismatch {
                expected: 2,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_ols_wide_matrix_rejected() {
        let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let y = array![1.0, 2.0];
        assert!(matches!(ols(&x, &y), Err(ForecastError::Linalg(_))));
    }

    #[test]
    fn test_ols_matches_linfa_on_noisy_data() {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = 60;
        let mut raw = Array2::<f64>::zeros((rows, 3));
        let mut y = Array1::<f64>::zeros(rows);
        for i in 0..rows {
            let a: f64 = rng.gen_range(-5.0..5.0);
            let b: f64 = rng.gen_range(0.0..10.0);
            let c: f64 = rng.gen_range(-1.0..1.0);
            raw[[i, 0]] = a;
            raw[[i, 1]] = b;
            raw[[i, 2]] = c;
            y[i] = 4.0 - 1.5 * a + 0.7 * b + 3.0 * c + rng.gen_range(-0.3..0.3);
        }

        let (intercept, coef) = ols(&with_intercept(&raw), &y).unwrap();

        let reference = LinearRegression::new()
            .with_intercept(true)
            .fit(&Dataset::new(raw, y))
            .unwrap();
        assert!((intercept - reference.intercept()).abs() < 1e-6);
        for (ours, theirs) in coef.iter().zip(reference.params().iter()) {
            assert!((ours - theirs).abs() < 1e-6);
        }
    }
}
