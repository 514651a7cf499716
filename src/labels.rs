use std::collections::HashMap;

use crate::feature::Feature;

/// Ordered feature identities with a lookup from identity to column position.
///
/// Built from a list that may contain duplicates: the position of a repeated identity is
/// the position of its *last* occurrence, while [`FeatureLabels::labels`] still returns
/// the list exactly as given.
#[derive(Clone, Debug, Default)]
pub struct FeatureLabels {
    idx: HashMap<Feature, usize>,
    labels: Vec<Feature>,
}

impl FeatureLabels {
    pub fn new(labels: Vec<Feature>) -> Self {
        let mut idx = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            idx.insert(label.clone(), i);
        }
        Self { idx, labels }
    }

    /// Number of distinct positions.
    pub fn len(&self) -> usize {
        self.idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Copy of the ordered identity list.
    pub fn labels(&self) -> Vec<Feature> {
        self.labels.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.labels.iter()
    }

    pub fn index_of(&self, label: &Feature) -> Option<usize> {
        self.idx.get(label).copied()
    }
}
