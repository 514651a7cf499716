//! Default constants for feature generation, solvers and the forecaster.

pub const DEFAULT_DAILY_ORDERS: usize = 12;
pub const DEFAULT_WEEKLY_ORDERS: usize = 12;
pub const DEFAULT_PRUNE_TOL: f64 = 1e-6;

pub const DEFAULT_LASSO_LAMBDA: f64 = 1.0;
pub const DEFAULT_CD_MAX_ITER: usize = 1000;
pub const DEFAULT_CD_TOL: f64 = 1e-4;

pub const DEFAULT_OUTLIER_PASSES: usize = 3;
pub const DEFAULT_UPPER_PERCENTILE: f64 = 0.9;
pub const DEFAULT_LOWER_PERCENTILE: f64 = 0.1;
pub const DEFAULT_TUKEY_FACTOR: f64 = 1.0;

pub const DEFAULT_RESIDUAL_WINDOW: usize = 100;
pub const DEFAULT_RESIDUAL_ZSCORE: f64 = 4.0;
