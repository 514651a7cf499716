use std::borrow::Cow;
use std::collections::HashMap;

use ndarray::{aview1, Array2};

use crate::data::ensure_len;
use crate::feature::Feature;
use crate::labels::FeatureLabels;
use crate::types::ForecastError;

/// One feature column: its identity and one value per observation.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureData {
    pub feature: Feature,
    pub data: Vec<f64>,
}

/// Feature columns keyed by canonical feature string.
///
/// Iteration order of the underlying map is unspecified; every ordered view
/// ([`FeatureSet::labels`], the matrix builders) goes through an explicit sort.
#[derive(Clone, Debug, Default)]
pub struct FeatureSet {
    features: HashMap<String, FeatureData>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column, returning the column previously stored under the same identity.
    pub fn insert(&mut self, feature: Feature, data: Vec<f64>) -> Option<FeatureData> {
        self.features
            .insert(feature.as_str().to_string(), FeatureData { feature, data })
    }

    pub fn get(&self, feature: &Feature) -> Option<&FeatureData> {
        self.features.get(feature.as_str())
    }

    pub fn remove(&mut self, feature: &Feature) -> Option<FeatureData> {
        self.features.remove(feature.as_str())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Columns in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureData> {
        self.features.values()
    }

    /// All feature identities sorted by canonical string.
    pub fn labels(&self) -> FeatureLabels {
        let mut labels: Vec<Feature> = self.iter().map(|fd| fd.feature.clone()).collect();
        labels.sort();
        FeatureLabels::new(labels)
    }

    /// Shared observation count of every column (0 for an empty set).
    ///
    /// # Errors
    /// Returns `ForecastError::DimensionMismatch` if the columns disagree in length.
    pub fn observations(&self) -> Result<usize, ForecastError> {
        let mut iter = self.iter();
        let Some(first) = iter.next() else {
            return Ok(0);
        };
        let m = first.data.len();
        for fd in iter {
            ensure_len("feature column", m, fd.data.len())?;
        }
        Ok(m)
    }

    /// Design matrix with one row per observation and one column per feature in sorted
    /// label order, preceded by a column of ones when `intercept` is set.
    ///
    /// Returns `Ok(None)` for an empty feature set.
    ///
    /// # Errors
    /// Returns `ForecastError::DimensionMismatch` if the columns disagree in length.
    pub fn matrix(&self, intercept: bool) -> Result<Option<Array2<f64>>, ForecastError> {
        if self.is_empty() {
            return Ok(None);
        }
        let rows = self.observations()?;
        self.matrix_for(&self.labels(), rows, intercept).map(Some)
    }

    /// Same layout as [`FeatureSet::matrix`] but as a list of columns, borrowing the
    /// stored vectors instead of copying them into a dense matrix.
    ///
    /// # Errors
    /// Returns `ForecastError::DimensionMismatch` if the columns disagree in length.
    pub fn matrix_columns(
        &self,
        intercept: bool,
    ) -> Result<Option<Vec<Cow<'_, [f64]>>>, ForecastError> {
        if self.is_empty() {
            return Ok(None);
        }
        let rows = self.observations()?;
        let labels = self.labels();

        let mut columns = Vec::with_capacity(labels.len() + usize::from(intercept));
        if intercept {
            columns.push(Cow::Owned(vec![1.0; rows]));
        }
        for label in labels.iter() {
            if let Some(fd) = self.get(label) {
                columns.push(Cow::Borrowed(fd.data.as_slice()));
            }
        }
        Ok(Some(columns))
    }

    /// Design matrix with `rows` observations whose feature columns follow `labels`.
    ///
    /// Used to lay out prediction-time features in the order a model was fitted with.
    ///
    /// # Errors
    /// Returns `ForecastError::LabelMismatch` if a label has no column in this set and
    /// `ForecastError::DimensionMismatch` if a column does not have `rows` values.
    pub fn matrix_for(
        &self,
        labels: &FeatureLabels,
        rows: usize,
        intercept: bool,
    ) -> Result<Array2<f64>, ForecastError> {
        let offset = usize::from(intercept);
        let cols = labels.iter().count() + offset;
        let mut x = Array2::<f64>::zeros((rows, cols));
        if intercept {
            x.column_mut(0).fill(1.0);
        }

        for (j, label) in labels.iter().enumerate() {
            let fd = self
                .get(label)
                .ok_or_else(|| ForecastError::LabelMismatch(label.to_string()))?;
            ensure_len("feature column", rows, fd.data.len())?;
            x.column_mut(j + offset).assign(&aview1(fd.data.as_slice()));
        }

        Ok(x)
    }
}

impl FromIterator<(Feature, Vec<f64>)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (Feature, Vec<f64>)>>(iter: I) -> Self {
        let mut set = FeatureSet::new();
        for (feature, data) in iter {
            set.insert(feature, data);
        }
        set
    }
}
