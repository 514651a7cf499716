use serde::Serialize;

use crate::data::ensure_len;
use crate::types::ForecastError;

/// Goodness-of-fit summary of predictions against actual values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Scores {
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute percentage error over the non-zero actuals
    pub mape: f64,
    /// R² (coefficient of determination)
    pub r2: f64,
}

impl Scores {
    /// Score `predicted` against `actual`.
    ///
    /// # Errors
    /// Returns `ForecastError::DimensionMismatch` if the lengths differ and
    /// `ForecastError::MissingInput` if both are empty.
    pub fn new(predicted: &[f64], actual: &[f64]) -> Result<Self, ForecastError> {
        ensure_len("predicted vs actual", actual.len(), predicted.len())?;
        if actual.is_empty() {
            return Err(ForecastError::MissingInput);
        }
        let n = actual.len() as f64;

        let ss_res: f64 = actual
            .iter()
            .zip(predicted.iter())
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        let mse = ss_res / n;

        let mean = actual.iter().sum::<f64>() / n;
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
        let r2 = 1.0 - ss_res / ss_tot.max(1e-12);

        let (ape_sum, ape_count) = actual
            .iter()
            .zip(predicted.iter())
            .filter(|(a, _)| **a != 0.0)
            .fold((0.0, 0usize), |(sum, count), (a, p)| {
                (sum + ((a - p) / a).abs(), count + 1)
            });
        let mape = if ape_count > 0 {
            ape_sum / ape_count as f64
        } else {
            0.0
        };

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mape,
            r2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let scores = Scores::new(&y, &y).unwrap();
        assert_eq!(scores.mse, 0.0);
        assert_eq!(scores.rmse, 0.0);
        assert_eq!(scores.mape, 0.0);
        assert!((scores.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_errors() {
        let actual = vec![2.0, 4.0, 0.0, 8.0];
        let predicted = vec![1.0, 5.0, 1.0, 8.0];
        let scores = Scores::new(&predicted, &actual).unwrap();

        assert!((scores.mse - 0.75).abs() < 1e-12);
        assert!((scores.rmse - 0.75f64.sqrt()).abs() < 1e-12);
        // zero actual skipped: (0.5 + 0.25 + 0.0) / 3
        assert!((scores.mape - 0.25).abs() < 1e-12);
        assert!(scores.r2 < 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            Scores::new(&[1.0], &[1.0, 2.0]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty() {
        assert_eq!(Scores::new(&[], &[]), Err(ForecastError::MissingInput));
    }

    #[test]
    fn test_default_is_zero() {
        let scores = Scores::default();
        assert_eq!(scores.mse, 0.0);
        assert_eq!(scores.r2, 0.0);
    }
}
