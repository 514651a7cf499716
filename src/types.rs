use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_CD_MAX_ITER, DEFAULT_CD_TOL, DEFAULT_DAILY_ORDERS, DEFAULT_LASSO_LAMBDA,
    DEFAULT_LOWER_PERCENTILE, DEFAULT_OUTLIER_PASSES, DEFAULT_PRUNE_TOL, DEFAULT_RESIDUAL_WINDOW,
    DEFAULT_RESIDUAL_ZSCORE, DEFAULT_TUKEY_FACTOR, DEFAULT_UPPER_PERCENTILE,
    DEFAULT_WEEKLY_ORDERS,
};

/// Options for the coordinate-descent lasso solver.
///
/// `lambda = 0.0` makes the solver converge towards ordinary least squares.
///
/// # Example
/// ```
/// use seasonal_lr::LassoOptions;
/// let opts = LassoOptions {
///     lambda: 0.5,
///     ..Default::default()
/// };
/// assert!(opts.warm_start.is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LassoOptions {
    /// Initial coefficients, one per design-matrix column.
    pub warm_start: Option<Vec<f64>>,
    /// L1 penalty strength.
    pub lambda: f64,
    /// Maximum number of full sweeps over the coordinates.
    pub max_iterations: usize,
    /// Relative stopping tolerance on the largest coefficient update of a sweep.
    pub tolerance: f64,
}

impl Default for LassoOptions {
    fn default() -> Self {
        Self {
            warm_start: None,
            lambda: DEFAULT_LASSO_LAMBDA,
            max_iterations: DEFAULT_CD_MAX_ITER,
            tolerance: DEFAULT_CD_TOL,
        }
    }
}

/// Solver used by a [`Forecast`](crate::Forecast) to estimate its coefficients.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Solver {
    /// Exact least squares through a QR factorisation.
    #[default]
    Ols,
    /// L1-regularised coordinate descent. The intercept column is penalised too.
    Lasso {
        #[serde(default = "default_lasso_lambda")]
        lambda: f64,
        #[serde(default = "default_cd_max_iter")]
        max_iterations: usize,
        #[serde(default = "default_cd_tol")]
        tolerance: f64,
    },
}

fn default_lasso_lambda() -> f64 {
    DEFAULT_LASSO_LAMBDA
}

fn default_cd_max_iter() -> usize {
    DEFAULT_CD_MAX_ITER
}

fn default_cd_tol() -> f64 {
    DEFAULT_CD_TOL
}

impl Solver {
    /// Lasso with the default iteration budget and tolerance.
    pub fn lasso(lambda: f64) -> Self {
        Self::Lasso {
            lambda,
            max_iterations: DEFAULT_CD_MAX_ITER,
            tolerance: DEFAULT_CD_TOL,
        }
    }
}

/// A Fourier seasonality: `orders` harmonics of the named time feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityOption {
    /// Time feature name, e.g. `epoch_day` or `hour`.
    pub feature: String,
    pub orders: usize,
}

impl SeasonalityOption {
    pub fn new(feature: impl Into<String>, orders: usize) -> Self {
        Self {
            feature: feature.into(),
            orders,
        }
    }
}

/// Options for a single [`Forecast`](crate::Forecast) model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastOptions {
    pub seasonalities: Vec<SeasonalityOption>,
    /// Relative residual norm below which a Fourier column counts as linearly dependent.
    pub prune_tolerance: f64,
    pub solver: Solver,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            seasonalities: vec![
                SeasonalityOption::new("epoch_day", DEFAULT_DAILY_ORDERS),
                SeasonalityOption::new("epoch_week", DEFAULT_WEEKLY_ORDERS),
            ],
            prune_tolerance: DEFAULT_PRUNE_TOL,
            solver: Solver::default(),
        }
    }
}

/// Tukey-fence outlier removal settings.
///
/// For the classic IQR fence use `upper_percentile = 0.75`, `lower_percentile = 0.25`
/// and `tukey_factor = 1.5`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierOptions {
    pub num_passes: usize,
    pub upper_percentile: f64,
    pub lower_percentile: f64,
    pub tukey_factor: f64,
}

impl Default for OutlierOptions {
    fn default() -> Self {
        Self {
            num_passes: DEFAULT_OUTLIER_PASSES,
            upper_percentile: DEFAULT_UPPER_PERCENTILE,
            lower_percentile: DEFAULT_LOWER_PERCENTILE,
            tukey_factor: DEFAULT_TUKEY_FACTOR,
        }
    }
}

impl OutlierOptions {
    /// Clamps percentiles into [0, 1], orders them and forces a non-negative factor.
    pub fn validated(self) -> Self {
        let clamp = |p: f64| if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        let mut lower = clamp(self.lower_percentile);
        let mut upper = clamp(self.upper_percentile);
        if lower > upper {
            tracing::warn!(
                lower = self.lower_percentile,
                upper = self.upper_percentile,
                "outlier percentiles are inverted; swapping"
            );
            std::mem::swap(&mut lower, &mut upper);
        }
        if lower != self.lower_percentile || upper != self.upper_percentile {
            tracing::warn!(lower, upper, "outlier percentiles clamped");
        }
        let tukey_factor = if self.tukey_factor.is_finite() {
            self.tukey_factor.max(0.0)
        } else {
            DEFAULT_TUKEY_FACTOR
        };

        Self {
            num_passes: self.num_passes,
            upper_percentile: upper,
            lower_percentile: lower,
            tukey_factor,
        }
    }
}

/// Options for the [`Forecaster`](crate::Forecaster): outlier removal, the series
/// model and the residual (uncertainty) model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterOptions {
    pub series_options: ForecastOptions,
    pub residual_options: ForecastOptions,
    pub outlier_options: OutlierOptions,
    /// Number of residuals per rolling standard-deviation window.
    pub residual_window: usize,
    /// Multiplier applied to the rolling standard deviation to form the bands.
    pub residual_zscore: f64,
}

impl Default for ForecasterOptions {
    fn default() -> Self {
        Self {
            series_options: ForecastOptions::default(),
            residual_options: ForecastOptions::default(),
            outlier_options: OutlierOptions::default(),
            residual_window: DEFAULT_RESIDUAL_WINDOW,
            residual_zscore: DEFAULT_RESIDUAL_ZSCORE,
        }
    }
}

/// Library error type.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("no training data")]
    MissingInput,
    #[error("{context}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unknown time feature: {0}")]
    UnsupportedFeature(String),
    #[error("no model coefficients from fit")]
    UntrainedModel,
    #[error("warm start has {actual} coefficients but the design matrix has {expected} columns")]
    InvalidWarmStart { expected: usize, actual: usize },
    #[error("feature {0} from the fitted model is missing at prediction time")]
    LabelMismatch(String),
    #[error("linear algebra failure: {0}")]
    Linalg(String),
}

impl ForecastError {
    pub(crate) fn mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }
}
