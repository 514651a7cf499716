//! Time-feature and Fourier seasonality generation.
//!
//! [`SeasonalFeatures`] turns timestamps into sine/cosine harmonics of calendar cycles.
//! At fit time the harmonics are pruned so that the design matrix (with its intercept
//! column) has full column rank; at prediction time the unpruned set is generated and the
//! model picks out the columns it was fitted with.

use std::f64::consts::TAU;

use chrono::{DateTime, Utc};

use crate::feature::{Feature, FourierComponent, TimeFeature};
use crate::featureset::FeatureSet;
use crate::types::{ForecastError, ForecastOptions};

/// Source of regression features for a [`Forecast`](crate::Forecast).
pub trait FeaturePipeline {
    /// Feature columns for `t`, one value per timestamp.
    fn generate(&self, t: &[DateTime<Utc>]) -> Result<FeatureSet, ForecastError>;

    /// Remove columns that would make the fit-time design matrix rank deficient.
    fn prune(&self, set: FeatureSet) -> FeatureSet {
        set
    }
}

/// Evaluate calendar features at every timestamp.
pub fn time_features(t: &[DateTime<Utc>], features: &[TimeFeature]) -> FeatureSet {
    features
        .iter()
        .map(|tf| {
            let data: Vec<f64> = t.iter().map(|ts| tf.value(ts)).collect();
            (Feature::time(*tf), data)
        })
        .collect()
}

/// Sine and cosine harmonics `1..=orders` of each seasonality's time feature.
///
/// # Errors
/// Returns `ForecastError::UnsupportedFeature` if a seasonality's time feature is missing
/// from `time`.
pub fn fourier_features(
    time: &FeatureSet,
    seasonalities: &[(TimeFeature, usize)],
) -> Result<FeatureSet, ForecastError> {
    let mut out = FeatureSet::new();
    for &(source, orders) in seasonalities {
        let values = &time
            .get(&Feature::time(source))
            .ok_or_else(|| ForecastError::UnsupportedFeature(source.name().to_string()))?
            .data;
        let period = source.period();

        for order in 1..=orders {
            let scale = TAU * order as f64 / period;
            for component in [FourierComponent::Sin, FourierComponent::Cos] {
                let data = values.iter().map(|&v| component.apply(scale * v)).collect();
                out.insert(Feature::fourier(source, component, order), data);
            }
        }
    }
    Ok(out)
}

/// Drop columns that are (numerically) linear combinations of the intercept and the
/// columns kept before them.
///
/// Columns are visited in sorted label order and orthogonalised against the kept basis
/// (modified Gram–Schmidt). A column is dropped when its remaining norm is at most
/// `tolerance` times the larger of its own norm and the intercept column's norm, so
/// columns that are rounding noise around zero go as well.
pub fn prune_dependent(set: FeatureSet, tolerance: f64) -> FeatureSet {
    let Ok(rows) = set.observations() else {
        return set;
    };
    if rows == 0 {
        return set;
    }

    let intercept_norm = (rows as f64).sqrt();
    let mut basis: Vec<Vec<f64>> = vec![vec![1.0 / intercept_norm; rows]];
    let mut kept = FeatureSet::new();

    for label in set.labels().iter() {
        let Some(fd) = set.get(label) else {
            continue;
        };
        let norm = fd.data.iter().map(|v| v * v).sum::<f64>().sqrt();
        let mut v = fd.data.clone();
        for b in &basis {
            let proj: f64 = v.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
            for (vi, bi) in v.iter_mut().zip(b.iter()) {
                *vi -= proj * bi;
            }
        }
        let remaining = v.iter().map(|x| x * x).sum::<f64>().sqrt();

        if norm == 0.0 || remaining <= tolerance * norm.max(intercept_norm) {
            tracing::debug!(feature = %label, remaining, norm, "pruned dependent feature");
            continue;
        }
        for vi in v.iter_mut() {
            *vi /= remaining;
        }
        basis.push(v);
        kept.insert(fd.feature.clone(), fd.data.clone());
    }

    kept
}

/// Default [`FeaturePipeline`]: Fourier harmonics of calendar cycles.
#[derive(Clone, Debug)]
pub struct SeasonalFeatures {
    seasonalities: Vec<(TimeFeature, usize)>,
    prune_tolerance: f64,
}

impl SeasonalFeatures {
    /// # Errors
    /// Returns `ForecastError::UnsupportedFeature` if a seasonality names an unknown time feature.
    pub fn new(opts: &ForecastOptions) -> Result<Self, ForecastError> {
        let seasonalities = opts
            .seasonalities
            .iter()
            .map(|s| Ok((s.feature.parse::<TimeFeature>()?, s.orders)))
            .collect::<Result<Vec<_>, ForecastError>>()?;
        Ok(Self {
            seasonalities,
            prune_tolerance: opts.prune_tolerance,
        })
    }

    fn sources(&self) -> Vec<TimeFeature> {
        let mut sources: Vec<TimeFeature> = Vec::new();
        for (tf, _) in &self.seasonalities {
            if !sources.contains(tf) {
                sources.push(*tf);
            }
        }
        sources
    }
}

impl FeaturePipeline for SeasonalFeatures {
    fn generate(&self, t: &[DateTime<Utc>]) -> Result<FeatureSet, ForecastError> {
        let time = time_features(t, &self.sources());
        fourier_features(&time, &self.seasonalities)
    }

    fn prune(&self, set: FeatureSet) -> FeatureSet {
        prune_dependent(set, self.prune_tolerance)
    }
}
