use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ndarray::{s, Array1, Array2};

use crate::data::TimeDataset;
use crate::feature::Feature;
use crate::labels::FeatureLabels;
use crate::lasso::lasso;
use crate::ols::ols;
use crate::scores::Scores;
use crate::seasonality::{FeaturePipeline, SeasonalFeatures};
use crate::types::{ForecastError, ForecastOptions, LassoOptions, Solver};

/// Coefficients and fit diagnostics of a successfully fitted [`Forecast`].
///
/// `coef[i]` belongs to the i-th label; the label order is fixed when the model is fitted.
#[derive(Clone, Debug)]
pub struct TrainedModel {
    labels: FeatureLabels,
    coef: Vec<f64>,
    intercept: f64,
    residual: Vec<f64>,
    scores: Scores,
}

impl TrainedModel {
    pub fn labels(&self) -> &FeatureLabels {
        &self.labels
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// In-sample `predicted - actual`, one per training point.
    pub fn residuals(&self) -> &[f64] {
        &self.residual
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// `[intercept, coef...]`
    fn weights(&self) -> Array1<f64> {
        std::iter::once(self.intercept)
            .chain(self.coef.iter().copied())
            .collect()
    }
}

/// Linear regression of a series on generated features.
///
/// `fit` replaces the trained model only when it succeeds; a failed fit leaves any previous
/// model in place.
#[derive(Clone, Debug)]
pub struct Forecast<P = SeasonalFeatures> {
    pipeline: P,
    solver: Solver,
    model: Option<TrainedModel>,
}

impl Forecast<SeasonalFeatures> {
    /// Forecast over Fourier seasonality features.
    ///
    /// # Errors
    /// Returns `ForecastError::UnsupportedFeature` if a seasonality names an unknown time feature.
    pub fn new(opts: &ForecastOptions) -> Result<Self, ForecastError> {
        Ok(Self::with_pipeline(
            SeasonalFeatures::new(opts)?,
            opts.solver.clone(),
        ))
    }
}

impl<P: FeaturePipeline> Forecast<P> {
    pub fn with_pipeline(pipeline: P, solver: Solver) -> Self {
        Self {
            pipeline,
            solver,
            model: None,
        }
    }

    /// Fit the model to `data`.
    ///
    /// Generates and prunes features for the training timestamps, fixes their sorted order as
    /// the model's labels, solves for the intercept and coefficients, then scores the in-sample
    /// predictions and stores `predicted - actual` as residuals.
    ///
    /// # Errors
    /// Returns `ForecastError::MissingInput` for an empty dataset and propagates feature,
    /// matrix and solver errors.
    pub fn fit(&mut self, data: &TimeDataset) -> Result<(), ForecastError> {
        if data.is_empty() {
            return Err(ForecastError::MissingInput);
        }
        let rows = data.len();
        let y = data.y();

        let features = self.pipeline.prune(self.pipeline.generate(data.t())?);
        let labels = features.labels();
        tracing::debug!(features = labels.len(), rows, solver = ?self.solver, "fitting forecast");

        let (intercept, coef) = match &self.solver {
            Solver::Ols => {
                let x = features.matrix_for(&labels, rows, true)?;
                ols(&x, &Array1::from(y.to_vec()))?
            }
            Solver::Lasso {
                lambda,
                max_iterations,
                tolerance,
            } => {
                let opts = LassoOptions {
                    warm_start: self.warm_start(&labels),
                    lambda: *lambda,
                    max_iterations: *max_iterations,
                    tolerance: *tolerance,
                };
                let columns = features
                    .matrix_columns(true)?
                    .unwrap_or_else(|| vec![Cow::Owned(vec![1.0; rows])]);
                lasso(&columns, y, &opts)?.into_parts()
            }
        };

        let mut model = TrainedModel {
            labels,
            coef,
            intercept,
            residual: Vec::new(),
            scores: Scores::default(),
        };
        let predicted = self.predict_with(&model, data.t())?;
        model.scores = Scores::new(&predicted, y)?;
        model.residual = predicted.iter().zip(y.iter()).map(|(p, a)| p - a).collect();

        tracing::info!(
            features = model.labels.len(),
            rows,
            rmse = model.scores.rmse,
            r2 = model.scores.r2,
            "forecast fitted"
        );
        self.model = Some(model);
        Ok(())
    }

    /// Predict one value per timestamp, in input order.
    ///
    /// Features are generated for `t` and laid out in the label order fixed at fit time;
    /// generated columns the model was not fitted with are ignored.
    ///
    /// # Errors
    /// Returns `ForecastError::UntrainedModel` before a successful fit and
    /// `ForecastError::LabelMismatch` if a fitted feature cannot be generated for `t`.
    pub fn predict(&self, t: &[DateTime<Utc>]) -> Result<Vec<f64>, ForecastError> {
        let model = self.model.as_ref().ok_or(ForecastError::UntrainedModel)?;
        self.predict_with(model, t)
    }

    fn predict_with(
        &self,
        model: &TrainedModel,
        t: &[DateTime<Utc>],
    ) -> Result<Vec<f64>, ForecastError> {
        let features = self.pipeline.generate(t)?;
        let x = features.matrix_for(&model.labels, t.len(), false)?;

        // [1; featureRows]: one row per feature, one column per timestamp
        let mut design = Array2::<f64>::ones((x.ncols() + 1, x.nrows()));
        design.slice_mut(s![1.., ..]).assign(&x.t());

        Ok(model.weights().dot(&design).to_vec())
    }

    /// Previous coefficients, when the previous model was fitted on the same labels.
    fn warm_start(&self, labels: &FeatureLabels) -> Option<Vec<f64>> {
        self.model
            .as_ref()
            .filter(|m| m.labels.iter().eq(labels.iter()))
            .map(|m| m.weights().to_vec())
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Feature labels of the fitted model, empty before a fit.
    pub fn feature_labels(&self) -> Vec<Feature> {
        self.model
            .as_ref()
            .map(|m| m.labels.labels())
            .unwrap_or_default()
    }

    /// Coefficient per feature label.
    ///
    /// # Errors
    /// Returns `ForecastError::UntrainedModel` before a successful fit or when the fitted
    /// model has no feature coefficients.
    pub fn coefficients(&self) -> Result<BTreeMap<Feature, f64>, ForecastError> {
        let model = self.model.as_ref().ok_or(ForecastError::UntrainedModel)?;
        if model.labels.is_empty() || model.coef.is_empty() {
            return Err(ForecastError::UntrainedModel);
        }
        Ok(model
            .labels
            .iter()
            .cloned()
            .zip(model.coef.iter().copied())
            .collect())
    }

    /// Intercept of the fitted model, 0 before a fit.
    pub fn intercept(&self) -> f64 {
        self.model.as_ref().map_or(0.0, |m| m.intercept)
    }

    /// Model equation in label order, e.g. `y ~ 1.00+2.00*x1+3.00*x2`.
    ///
    /// # Errors
    /// Same conditions as [`Forecast::coefficients`].
    pub fn model_eq(&self) -> Result<String, ForecastError> {
        let coef = self.coefficients()?;
        let mut eq = format!("y ~ {:.2}", self.intercept());
        for label in self.feature_labels() {
            if let Some(c) = coef.get(&label) {
                eq.push_str(&format!("+{:.2}*{}", c, label));
            }
        }
        Ok(eq)
    }

    /// Fit scores, all zero before a fit.
    pub fn scores(&self) -> Scores {
        self.model.as_ref().map(|m| m.scores).unwrap_or_default()
    }

    /// Training residuals (`predicted - actual`), empty before a fit.
    pub fn residuals(&self) -> Vec<f64> {
        self.model
            .as_ref()
            .map(|m| m.residual.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{FourierComponent, TimeFeature};
    use crate::featureset::FeatureSet;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::TAU;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn hourly(from: i64, n: i64) -> Vec<DateTime<Utc>> {
        (from..from + n)
            .map(|i| start() + Duration::hours(i))
            .collect()
    }

    /// x1 = hours since start, x2 = x1 mod 5; x2 only when `min_len` points are requested.
    struct Ramp {
        min_len: usize,
    }

    impl FeaturePipeline for Ramp {
        fn generate(&self, t: &[DateTime<Utc>]) -> Result<FeatureSet, ForecastError> {
            let x1: Vec<f64> = t
                .iter()
                .map(|ts| (*ts - start()).num_hours() as f64)
                .collect();
            let mut set = FeatureSet::new();
            if t.len() >= self.min_len {
                set.insert(Feature::custom("x2"), x1.iter().map(|v| v % 5.0).collect());
            }
            set.insert(Feature::custom("x1"), x1);
            Ok(set)
        }
    }

    fn linear_data(n: i64) -> TimeDataset {
        let t = hourly(0, n);
        let y = (0..n)
            .map(|i| 1.0 + 2.0 * i as f64 + 3.0 * (i % 5) as f64)
            .collect();
        TimeDataset::new(t, y).unwrap()
    }

    fn ramp_forecast(solver: Solver) -> Forecast<Ramp> {
        Forecast::with_pipeline(Ramp { min_len: 0 }, solver)
    }

    #[test]
    fn test_untrained_accessors() {
        let forecast = ramp_forecast(Solver::Ols);
        assert!(!forecast.is_trained());
        assert_eq!(forecast.coefficients(), Err(ForecastError::UntrainedModel));
        assert_eq!(forecast.model_eq(), Err(ForecastError::UntrainedModel));
        assert_eq!(forecast.scores(), Scores::default());
        assert!(forecast.residuals().is_empty());
        assert!(forecast.feature_labels().is_empty());
        assert_eq!(forecast.intercept(), 0.0);
        assert_eq!(
            forecast.predict(&hourly(0, 3)),
            Err(ForecastError::UntrainedModel)
        );
    }

    #[test]
    fn test_fit_recovers_linear_model() {
        let mut forecast = ramp_forecast(Solver::Ols);
        forecast.fit(&linear_data(20)).unwrap();

        let coef = forecast.coefficients().unwrap();
        assert_eq!(coef.len(), forecast.feature_labels().len());
        assert!((coef[&Feature::custom("x1")] - 2.0).abs() < 1e-8);
        assert!((coef[&Feature::custom("x2")] - 3.0).abs() < 1e-8);
        assert!((forecast.intercept() - 1.0).abs() < 1e-8);
        assert_eq!(forecast.model_eq().unwrap(), "y ~ 1.00+2.00*x1+3.00*x2");
        assert!(forecast.scores().r2 > 0.999_999);
    }

    #[test]
    fn test_predict_extrapolates() {
        let mut forecast = ramp_forecast(Solver::Ols);
        forecast.fit(&linear_data(20)).unwrap();

        let t = hourly(100, 3);
        let predicted = forecast.predict(&t).unwrap();
        assert_eq!(predicted.len(), 3);
        for (k, p) in predicted.iter().enumerate() {
            let i = 100 + k as i64;
            let truth = 1.0 + 2.0 * i as f64 + 3.0 * (i % 5) as f64;
            assert!((p - truth).abs() < 1e-6);
        }
    }

    #[test]
    fn test_residuals_round_trip() {
        let mut rng = StdRng::seed_from_u64(3);
        let t = hourly(0, 30);
        let y: Vec<f64> = (0..30)
            .map(|i| 5.0 + 0.5 * i as f64 + rng.gen_range(-1.0..1.0))
            .collect();
        let data = TimeDataset::new(t.clone(), y.clone()).unwrap();

        let mut forecast = ramp_forecast(Solver::Ols);
        forecast.fit(&data).unwrap();
        let predicted = forecast.predict(&t).unwrap();
        let residuals = forecast.residuals();

        assert_eq!(residuals.len(), y.len());
        for i in 0..y.len() {
            assert!((residuals[i] - (predicted[i] - y[i])).abs() < 1e-9);
        }
        assert!(forecast.scores().mse > 0.0);
    }

    #[test]
    fn test_failed_fit_keeps_previous_model() {
        let mut forecast = ramp_forecast(Solver::Ols);
        forecast.fit(&linear_data(20)).unwrap();
        let before = forecast.coefficients().unwrap();

        assert_eq!(
            forecast.fit(&TimeDataset::default()),
            Err(ForecastError::MissingInput)
        );
        assert_eq!(forecast.coefficients().unwrap(), before);
    }

    #[test]
    fn test_predict_requires_fitted_labels() {
        let mut forecast = Forecast::with_pipeline(Ramp { min_len: 10 }, Solver::Ols);
        forecast.fit(&linear_data(20)).unwrap();

        let err = forecast.predict(&hourly(20, 3)).unwrap_err();
        assert_eq!(err, ForecastError::LabelMismatch("x2".to_string()));
        // labels stay as fitted
        assert_eq!(forecast.feature_labels().len(), 2);
    }

    #[test]
    fn test_lasso_solver_without_penalty_matches_ols() {
        let data = linear_data(40);
        let mut ols_forecast = ramp_forecast(Solver::Ols);
        ols_forecast.fit(&data).unwrap();

        let mut lasso_forecast = ramp_forecast(Solver::Lasso {
            lambda: 0.0,
            max_iterations: 200_000,
            tolerance: 1e-12,
        });
        lasso_forecast.fit(&data).unwrap();

        assert!((lasso_forecast.intercept() - ols_forecast.intercept()).abs() < 1e-3);
        let a = lasso_forecast.coefficients().unwrap();
        let b = ols_forecast.coefficients().unwrap();
        for (label, value) in &a {
            assert!((value - b[label]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_lasso_refit_warm_starts() {
        let data = linear_data(40);
        let mut forecast = ramp_forecast(Solver::Lasso {
            lambda: 0.0,
            max_iterations: 200_000,
            tolerance: 1e-12,
        });
        forecast.fit(&data).unwrap();
        let labels = forecast.model().unwrap().labels().clone();
        let warm = forecast.warm_start(&labels).unwrap();
        assert_eq!(warm.len(), 3);
        assert_eq!(warm[0], forecast.intercept());

        let other = FeatureLabels::new(vec![Feature::custom("x1")]);
        assert!(forecast.warm_start(&other).is_none());
    }

    #[test]
    fn test_seasonal_forecast() {
        let series = |i: i64| {
            let day = (i % 24) as f64 / 24.0;
            10.0 + 3.0 * (TAU * day).sin() + 1.5 * (2.0 * TAU * day).cos()
        };
        let t = hourly(0, 24 * 14);
        let y = (0..24 * 14).map(series).collect();
        let data = TimeDataset::new(t, y).unwrap();

        let mut forecast = Forecast::new(&ForecastOptions::default()).unwrap();
        forecast.fit(&data).unwrap();

        let coef = forecast.coefficients().unwrap();
        let sin1 = Feature::fourier(TimeFeature::EpochDay, FourierComponent::Sin, 1);
        let cos2 = Feature::fourier(TimeFeature::EpochDay, FourierComponent::Cos, 2);
        assert!((coef[&sin1] - 3.0).abs() < 1e-6);
        assert!((coef[&cos2] - 1.5).abs() < 1e-6);
        assert!((forecast.intercept() - 10.0).abs() < 1e-6);
        assert!(forecast.scores().r2 > 0.999_999);

        // a single future point: columns pruned at fit time are simply not used
        let next = hourly(24 * 14 + 6, 1);
        let predicted = forecast.predict(&next).unwrap();
        assert!((predicted[0] - series(24 * 14 + 6)).abs() < 1e-6);
    }
}
