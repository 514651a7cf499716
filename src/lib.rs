//! # seasonal_lr
//!
//! Seasonal linear-regression forecasting of time series.
//!
//! Timestamps are turned into Fourier harmonics of calendar cycles, laid out as a design
//! matrix in a deterministic column order and regressed against the series with one of two
//! solvers:
//!
//! * **OLS**: exact least squares through a QR factorisation
//! * **Lasso**: L1-penalised coordinate descent with warm starts
//!
//! [`Forecast`] fits a single series; [`Forecaster`] adds outlier removal and uncertainty
//! bands.
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use seasonal_lr::{Forecast, ForecastOptions, TimeDataset};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let t: Vec<_> = (0..24 * 14).map(|i| start + Duration::hours(i)).collect();
//! let y: Vec<f64> = (0..24 * 14)
//!     .map(|i| 20.0 + 4.0 * (std::f64::consts::TAU * (i % 24) as f64 / 24.0).sin())
//!     .collect();
//! let data = TimeDataset::new(t, y).unwrap();
//!
//! let mut forecast = Forecast::new(&ForecastOptions::default()).unwrap();
//! forecast.fit(&data).unwrap();
//!
//! let tomorrow: Vec<_> = (0..24).map(|i| start + Duration::hours(24 * 14 + i)).collect();
//! let predicted = forecast.predict(&tomorrow).unwrap();
//! assert!((predicted[6] - 24.0).abs() < 1e-6);
//! println!("{}", forecast.model_eq().unwrap());
//! ```

// Module declarations
pub mod data;
mod defaults;
pub mod feature;
pub mod featureset;
mod forecast;
mod forecaster;
pub mod labels;
mod lasso;
pub mod ols;
pub mod outlier;
mod scores;
pub mod seasonality;
mod types;

// Re-export public types
pub use data::TimeDataset;
pub use feature::{Feature, FeatureKind, FourierComponent, TimeFeature};
pub use featureset::{FeatureData, FeatureSet};
pub use forecast::{Forecast, TrainedModel};
pub use forecaster::{rolling_std, ForecastResults, Forecaster};
pub use labels::FeatureLabels;
pub use scores::Scores;
pub use seasonality::{FeaturePipeline, SeasonalFeatures};
pub use types::{
    ForecastError, ForecastOptions, ForecasterOptions, LassoOptions, OutlierOptions,
    SeasonalityOption, Solver,
};

// Re-export solvers
pub use lasso::{lasso, lasso_matrix, soft_threshold, LassoOutcome};
pub use ols::ols;
