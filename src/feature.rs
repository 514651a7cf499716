//! Feature identities.
//!
//! A [`Feature`] names the semantic source of one design-matrix column. Two features are
//! the same column exactly when their canonical strings match, and features sort by that
//! string, so column order never depends on how a feature was constructed.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::types::ForecastError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calendar / time-domain features derived directly from a timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeFeature {
    /// Hour of day, 0..=23.
    HourOfDay,
    /// Day of week, Monday = 0.
    DayOfWeek,
    /// Month of year, January = 0.
    Month,
    /// Position within the UTC day, in [0, 1).
    EpochDay,
    /// Position within the week starting Monday 00:00 UTC, in [0, 1).
    EpochWeek,
}

impl TimeFeature {
    pub const ALL: [TimeFeature; 5] = [
        TimeFeature::HourOfDay,
        TimeFeature::DayOfWeek,
        TimeFeature::Month,
        TimeFeature::EpochDay,
        TimeFeature::EpochWeek,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimeFeature::HourOfDay => "hour",
            TimeFeature::DayOfWeek => "dow",
            TimeFeature::Month => "month",
            TimeFeature::EpochDay => "epoch_day",
            TimeFeature::EpochWeek => "epoch_week",
        }
    }

    /// Length of one seasonal cycle in the units of [`TimeFeature::value`].
    pub fn period(&self) -> f64 {
        match self {
            TimeFeature::HourOfDay => 24.0,
            TimeFeature::DayOfWeek => 7.0,
            TimeFeature::Month => 12.0,
            TimeFeature::EpochDay | TimeFeature::EpochWeek => 1.0,
        }
    }

    pub fn value(&self, t: &DateTime<Utc>) -> f64 {
        let day_fraction = t.num_seconds_from_midnight() as f64 / SECONDS_PER_DAY;
        match self {
            TimeFeature::HourOfDay => t.hour() as f64,
            TimeFeature::DayOfWeek => t.weekday().num_days_from_monday() as f64,
            TimeFeature::Month => t.month0() as f64,
            TimeFeature::EpochDay => day_fraction,
            TimeFeature::EpochWeek => {
                (t.weekday().num_days_from_monday() as f64 + day_fraction) / 7.0
            }
        }
    }
}

impl fmt::Display for TimeFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeFeature {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeFeature::ALL
            .into_iter()
            .find(|tf| tf.name() == s)
            .ok_or_else(|| ForecastError::UnsupportedFeature(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FourierComponent {
    Sin,
    Cos,
}

impl FourierComponent {
    pub fn apply(&self, radians: f64) -> f64 {
        match self {
            FourierComponent::Sin => radians.sin(),
            FourierComponent::Cos => radians.cos(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FeatureKind {
    Time(TimeFeature),
    Fourier {
        source: TimeFeature,
        component: FourierComponent,
        order: usize,
    },
    /// Caller-supplied column; the canonical string is the name itself.
    Custom,
}

/// Identity of one design-matrix column.
#[derive(Clone, Debug)]
pub struct Feature {
    key: String,
    kind: FeatureKind,
}

impl Feature {
    pub fn time(tf: TimeFeature) -> Self {
        Self {
            key: tf.name().to_string(),
            kind: FeatureKind::Time(tf),
        }
    }

    pub fn fourier(source: TimeFeature, component: FourierComponent, order: usize) -> Self {
        let tag = match component {
            FourierComponent::Sin => "sin",
            FourierComponent::Cos => "cos",
        };
        Self {
            key: format!("{}_{}{}", source.name(), tag, order),
            kind: FeatureKind::Fourier {
                source,
                component,
                order,
            },
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            key: name.into(),
            kind: FeatureKind::Custom,
        }
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &FeatureKind {
        &self.kind
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Feature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Feature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
