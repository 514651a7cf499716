use chrono::{DateTime, Utc};

use crate::types::ForecastError;

/// Check that a vector has the length its paired series requires.
///
/// # Errors
/// Returns `ForecastError::DimensionMismatch` naming `context` when the lengths differ.
pub(crate) fn ensure_len(
    context: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ForecastError> {
    if expected != actual {
        return Err(ForecastError::mismatch(context, expected, actual));
    }
    Ok(())
}

/// A univariate time series: timestamps paired with observed values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeDataset {
    t: Vec<DateTime<Utc>>,
    y: Vec<f64>,
}

impl TimeDataset {
    /// Pair timestamps with values.
    ///
    /// # Errors
    /// Returns `ForecastError::DimensionMismatch` if `y` and `t` have different lengths.
    ///
    /// # Example
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use seasonal_lr::TimeDataset;
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let t: Vec<_> = (0..3).map(|i| start + Duration::hours(i)).collect();
    /// let data = TimeDataset::new(t, vec![1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(data.len(), 3);
    /// ```
    pub fn new(t: Vec<DateTime<Utc>>, y: Vec<f64>) -> Result<Self, ForecastError> {
        ensure_len("input data vs time", t.len(), y.len())?;
        Ok(Self { t, y })
    }

    pub fn t(&self) -> &[DateTime<Utc>] {
        &self.t
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Keep the points whose mask entry is `true`.
    ///
    /// # Errors
    /// Returns `ForecastError::DimensionMismatch` if the mask length differs from the series.
    pub fn filter(&self, keep: &[bool]) -> Result<Self, ForecastError> {
        ensure_len("filter mask", self.len(), keep.len())?;
        let (t, y) = self
            .t
            .iter()
            .zip(self.y.iter())
            .zip(keep.iter())
            .filter(|(_, keep)| **keep)
            .map(|((&t, &y), _)| (t, y))
            .unzip();
        Ok(Self { t, y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hours(n: i64) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::hours(i)).collect()
    }

    #[test]
    fn test_new_length_mismatch() {
        let result = TimeDataset::new(hours(3), vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_new_success() {
        let data = TimeDataset::new(hours(4), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(data.len(), 4);
        assert!(!data.is_empty());
        assert_eq!(data.y()[3], 4.0);
    }

    #[test]
    fn test_filter() {
        let data = TimeDataset::new(hours(4), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let kept = data.filter(&[true, false, true, false]).unwrap();
        assert_eq!(kept.y(), &[1.0, 3.0]);
        assert_eq!(kept.t()[1], data.t()[2]);
    }

    #[test]
    fn test_filter_mask_mismatch() {
        let data = TimeDataset::new(hours(2), vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            data.filter(&[true]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty() {
        assert!(TimeDataset::default().is_empty());
    }
}
