//! Tukey-fence outlier detection over model residuals.

use crate::types::OutlierOptions;

/// Inclusive bounds outside of which a value counts as an outlier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TukeyFence {
    pub lower: f64,
    pub upper: f64,
}

impl TukeyFence {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Percentile `p` (in [0, 1]) of ascending `sorted`, interpolating linearly between ranks.
///
/// Returns `None` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = p.clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// `[Q_lo - k*(Q_hi - Q_lo), Q_hi + k*(Q_hi - Q_lo)]` over the finite `values`.
///
/// Returns `None` when there is no finite value to fence.
pub fn tukey_fence(values: &[f64], opts: &OutlierOptions) -> Option<TukeyFence> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let q_lo = percentile(&sorted, opts.lower_percentile)?;
    let q_hi = percentile(&sorted, opts.upper_percentile)?;
    let spread = opts.tukey_factor * (q_hi - q_lo);
    Some(TukeyFence {
        lower: q_lo - spread,
        upper: q_hi + spread,
    })
}

/// `true` for every value inside the fence. Non-finite values are outliers.
pub fn inlier_mask(values: &[f64], fence: &TukeyFence) -> Vec<bool> {
    values.iter().map(|&v| fence.contains(v)).collect()
}
