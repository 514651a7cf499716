use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::TimeDataset;
use crate::forecast::Forecast;
use crate::outlier::{inlier_mask, tukey_fence};
use crate::types::{ForecastError, ForecasterOptions};

/// Point forecasts with uncertainty bands, one entry per requested timestamp.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastResults {
    pub t: Vec<DateTime<Utc>>,
    pub forecast: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Sample standard deviation of every run of `window` consecutive values.
///
/// Yields `values.len() - window + 1` entries; a window of 1 has deviation 0. Returns an
/// empty vector when `window` is 0 or longer than `values`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| {
            if w.len() < 2 {
                return 0.0;
            }
            let n = w.len() as f64;
            let mean = w.iter().sum::<f64>() / n;
            (w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        })
        .collect()
}

/// Series forecast with outlier removal and a second model for the width of its
/// uncertainty band.
///
/// The residual model is fitted on the rolling standard deviation of the series model's
/// residuals (scaled by `residual_zscore`), so the band follows the seasonality of the
/// error.
#[derive(Clone, Debug)]
pub struct Forecaster {
    opts: ForecasterOptions,
    series: Forecast,
    residual: Forecast,
    outliers_removed: usize,
}

impl Forecaster {
    /// # Errors
    /// Returns `ForecastError::UnsupportedFeature` if either model names an unknown time
    /// feature.
    pub fn new(opts: ForecasterOptions) -> Result<Self, ForecastError> {
        let opts = ForecasterOptions {
            outlier_options: opts.outlier_options.clone().validated(),
            ..opts
        };
        let series = Forecast::new(&opts.series_options)?;
        let residual = Forecast::new(&opts.residual_options)?;
        Ok(Self {
            opts,
            series,
            residual,
            outliers_removed: 0,
        })
    }

    /// Fit the series and residual models.
    ///
    /// Both models are replaced only when the whole fit succeeds.
    ///
    /// # Errors
    /// Returns `ForecastError::MissingInput` for an empty dataset and propagates errors from
    /// either model's fit.
    pub fn fit(&mut self, data: &TimeDataset) -> Result<(), ForecastError> {
        if data.is_empty() {
            return Err(ForecastError::MissingInput);
        }

        let mut series = Forecast::new(&self.opts.series_options)?;
        let cleaned = self.remove_outliers(&mut series, data)?;
        let removed = data.len() - cleaned.len();

        let (centres, band) = self.residual_band(&cleaned, &series.residuals());
        let mut residual = Forecast::new(&self.opts.residual_options)?;
        residual.fit(&TimeDataset::new(centres, band)?)?;

        tracing::info!(
            points = data.len(),
            outliers = removed,
            series_rmse = series.scores().rmse,
            "forecaster fitted"
        );
        self.series = series;
        self.residual = residual;
        self.outliers_removed = removed;
        Ok(())
    }

    /// Fits `series` to `data`, then repeatedly fences its residuals, drops the points
    /// outside and refits, for at most `num_passes` passes or until nothing is dropped.
    fn remove_outliers(
        &self,
        series: &mut Forecast,
        data: &TimeDataset,
    ) -> Result<TimeDataset, ForecastError> {
        let opts = &self.opts.outlier_options;
        let mut current = data.clone();
        series.fit(&current)?;

        for pass in 0..opts.num_passes {
            let residuals = series.residuals();
            let Some(fence) = tukey_fence(&residuals, opts) else {
                break;
            };
            let mask = inlier_mask(&residuals, &fence);
            let removed = mask.iter().filter(|keep| !**keep).count();
            tracing::debug!(
                pass,
                removed,
                lower = fence.lower,
                upper = fence.upper,
                "outlier pass"
            );
            if removed == 0 || removed == current.len() {
                break;
            }
            current = current.filter(&mask)?;
            series.fit(&current)?;
        }
        Ok(current)
    }

    /// Window-centre timestamps and `residual_zscore` times the rolling deviation.
    fn residual_band(
        &self,
        data: &TimeDataset,
        residuals: &[f64],
    ) -> (Vec<DateTime<Utc>>, Vec<f64>) {
        let mut window = self.opts.residual_window.max(1);
        if window > residuals.len() {
            tracing::warn!(
                window,
                points = residuals.len(),
                "residual window longer than the series; shrinking"
            );
            window = residuals.len();
        }

        let band: Vec<f64> = rolling_std(residuals, window)
            .into_iter()
            .map(|sd| sd * self.opts.residual_zscore)
            .collect();
        let centres = data
            .t()
            .iter()
            .skip(window / 2)
            .take(band.len())
            .copied()
            .collect();
        (centres, band)
    }

    /// Forecast with `upper = forecast + band` and `lower = forecast - band`.
    ///
    /// # Errors
    /// Returns `ForecastError::UntrainedModel` before a successful fit.
    pub fn predict(&self, t: &[DateTime<Utc>]) -> Result<ForecastResults, ForecastError> {
        let forecast = self.series.predict(t)?;
        let band = self.residual.predict(t)?;

        let (upper, lower) = forecast
            .iter()
            .zip(band.iter())
            .map(|(f, b)| {
                let b = b.max(0.0);
                (f + b, f - b)
            })
            .unzip();
        Ok(ForecastResults {
            t: t.to_vec(),
            forecast,
            upper,
            lower,
        })
    }

    pub fn options(&self) -> &ForecasterOptions {
        &self.opts
    }

    pub fn series_forecast(&self) -> &Forecast {
        &self.series
    }

    pub fn residual_forecast(&self) -> &Forecast {
        &self.residual
    }

    /// Points dropped as outliers by the last successful fit.
    pub fn outliers_removed(&self) -> usize {
        self.outliers_removed
    }
}
