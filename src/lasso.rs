use ndarray::{Array1, Array2};

use crate::data::ensure_len;
use crate::ols::split_coefficients;
use crate::types::{ForecastError, LassoOptions};

/// Result of a coordinate-descent solve.
#[derive(Clone, Debug)]
pub struct LassoOutcome {
    /// Coefficient of column 0 (the intercept when column 0 is all ones); NaN with no columns.
    pub first: f64,
    /// Coefficients of columns 1..n.
    pub rest: Vec<f64>,
    /// Number of sweeps performed.
    pub sweeps: usize,
    /// Whether the stopping rule fired before the iteration budget ran out.
    pub converged: bool,
}

impl LassoOutcome {
    pub fn into_parts(self) -> (f64, Vec<f64>) {
        (self.first, self.rest)
    }
}

/// Proximal operator of the L1 penalty: `sign(x) * max(0, |x| - gamma)`.
///
/// Exactly zero whenever `|x| <= gamma`.
pub fn soft_threshold(x: f64, gamma: f64) -> f64 {
    let shrunk = (x.abs() - gamma).max(0.0);
    if x.is_sign_negative() {
        -shrunk
    } else {
        shrunk
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// `acc += scale * col`
fn axpy(acc: &mut [f64], scale: f64, col: &[f64]) {
    for (a, &c) in acc.iter_mut().zip(col.iter()) {
        *a += scale * c;
    }
}

/// Lasso regression by cyclic coordinate descent over design-matrix columns.
///
/// Minimises `½‖y − Xβ‖² + λ‖β‖₁` one coordinate at a time. The fitted vector `Xβ` is
/// kept up to date by folding in the previous coordinate's change just before the next
/// coordinate reads it, so a sweep costs O(n·m) rather than O(n²·m).
///
/// Once a sweep after the first finds a coefficient at exactly zero, that coordinate is no
/// longer visited. Iteration stops when the largest update of a sweep falls below
/// `tolerance` times the largest (signed) coefficient of that sweep, or when a sweep
/// changes nothing.
///
/// # Arguments
/// * `columns` - Design-matrix columns, each of length `y.len()`
/// * `y` - Observations
/// * `opts` - Penalty, warm start and stopping settings
///
/// # Errors
/// Returns `ForecastError::DimensionMismatch` if a column length differs from `y.len()`
/// and `ForecastError::InvalidWarmStart` if the warm start does not have one entry per column.
pub fn lasso<C: AsRef<[f64]>>(
    columns: &[C],
    y: &[f64],
    opts: &LassoOptions,
) -> Result<LassoOutcome, ForecastError> {
    let n = columns.len();
    let m = y.len();
    for col in columns {
        ensure_len("design column vs observations", m, col.as_ref().len())?;
    }

    let mut beta = match &opts.warm_start {
        Some(warm) if warm.len() != n => {
            return Err(ForecastError::InvalidWarmStart {
                expected: n,
                actual: warm.len(),
            })
        }
        Some(warm) => warm.clone(),
        None => vec![0.0; n],
    };

    let xdot: Vec<f64> = columns
        .iter()
        .map(|col| {
            let col = col.as_ref();
            dot(col, col)
        })
        .collect();

    let mut fitted = vec![0.0; m];
    for (col, &b) in columns.iter().zip(beta.iter()) {
        if b != 0.0 {
            axpy(&mut fitted, b, col.as_ref());
        }
    }
    let mut residual = vec![0.0; m];
    // Coefficient change not yet folded into `fitted`.
    let mut pending: Option<(usize, f64)> = None;

    let mut sweeps = 0;
    let mut converged = false;

    for sweep in 0..opts.max_iterations {
        let mut max_coef: f64 = 0.0;
        let mut max_update: f64 = 0.0;

        for j in 0..n {
            let current = beta[j];
            if sweep != 0 && current == 0.0 {
                continue;
            }
            if xdot[j] == 0.0 {
                // all-zero column: contributes nothing to `fitted` whatever its coefficient
                max_update = max_update.max(current.abs());
                beta[j] = 0.0;
                continue;
            }

            if let Some((k, delta)) = pending.take() {
                axpy(&mut fitted, delta, columns[k].as_ref());
            }
            for ((r, &yi), &fi) in residual.iter_mut().zip(y.iter()).zip(fitted.iter()) {
                *r = yi - fi;
            }

            let col = columns[j].as_ref();
            let candidate = soft_threshold(
                dot(col, &residual) / xdot[j] + current,
                opts.lambda / xdot[j],
            );

            max_coef = max_coef.max(candidate);
            max_update = max_update.max((candidate - current).abs());
            pending = Some((j, candidate - current));
            beta[j] = candidate;
        }

        sweeps += 1;
        if max_update < opts.tolerance * max_coef || max_update == 0.0 {
            converged = true;
            break;
        }
    }

    if converged {
        tracing::debug!(sweeps, lambda = opts.lambda, "coordinate descent converged");
    } else {
        tracing::warn!(
            sweeps,
            lambda = opts.lambda,
            "coordinate descent stopped at the iteration limit"
        );
    }

    let (first, rest) = split_coefficients(beta);
    Ok(LassoOutcome {
        first,
        rest,
        sweeps,
        converged,
    })
}

/// [`lasso`] over a dense design matrix.
///
/// # Errors
/// Returns `ForecastError::DimensionMismatch` if `y.len()` differs from the row count and
/// `ForecastError::InvalidWarmStart` on a warm start of the wrong length.
pub fn lasso_matrix(
    x: &Array2<f64>,
    y: &Array1<f64>,
    opts: &LassoOptions,
) -> Result<LassoOutcome, ForecastError> {
    ensure_len("observations vs design matrix rows", x.nrows(), y.len())?;
    let columns: Vec<Vec<f64>> = x.columns().into_iter().map(|c| c.to_vec()).collect();
    lasso(&columns, &y.to_vec(), opts)
}
