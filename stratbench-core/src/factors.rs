//! Factor columns and the rolling primitives that compute them.
//!
//! A `FactorFrame` holds named `f64` columns parallel to the bar series.
//! Rows where a rolling window has insufficient history carry `f64::NAN` —
//! the explicit "not yet available" marker. Signal rules treat NaN as
//! "no signal possible"; they never read it as zero.
//!
//! Rolling conventions (matching the documented reference formulas):
//! - `rolling_std` uses the sample standard deviation (ddof = 1).
//! - `rolling_min`/`rolling_max` shrink the window at the front
//!   (min_periods = 1), so they are defined from the first row.
//! - `ewm_mean` is the span-based recursive EMA seeded at the first value
//!   (`adjust = false`), defined from the first row.

use thiserror::Error;

/// Errors from factor column access.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FactorError {
    #[error("unknown factor column '{0}'")]
    UnknownFactor(String),
    #[error("factor column '{name}' has length {got}, expected {expected}")]
    LengthMismatch {
        name: String,
        got: usize,
        expected: usize,
    },
}

/// Named factor columns aligned by bar index.
///
/// Insertion order is preserved so factor snapshots render in the order the
/// strategy computed them.
#[derive(Debug, Clone, Default)]
pub struct FactorFrame {
    len: usize,
    columns: Vec<(String, Vec<f64>)>,
}

impl FactorFrame {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a column. Length must match the bar count.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), FactorError> {
        let name = name.into();
        if values.len() != self.len {
            return Err(FactorError::LengthMismatch {
                got: values.len(),
                expected: self.len,
                name,
            });
        }
        if let Some(existing) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = values;
        } else {
            self.columns.push((name, values));
        }
        Ok(())
    }

    /// Full column lookup; unknown names are an error.
    pub fn column(&self, name: &str) -> Result<&[f64], FactorError> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| FactorError::UnknownFactor(name.to_string()))
    }

    /// Per-bar accessor used inside signal rules.
    ///
    /// Returns NaN for a missing column or out-of-range index so that signal
    /// evaluation degrades to "no signal" instead of panicking.
    pub fn value(&self, name: &str, index: usize) -> f64 {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.get(index))
            .copied()
            .unwrap_or(f64::NAN)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Factor values at one bar, in insertion order. NaN entries are kept.
    pub fn snapshot(&self, index: usize) -> Vec<(String, f64)> {
        self.columns
            .iter()
            .map(|(n, v)| (n.clone(), v.get(index).copied().unwrap_or(f64::NAN)))
            .collect()
    }
}

/// Rolling mean with a NaN prefix until the window is full.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    let mut sum: f64 = values.iter().take(window).sum();
    result[window - 1] = sum / window as f64;
    for i in window..n {
        sum += values[i] - values[i - window];
        result[i] = sum / window as f64;
    }
    result
}

/// Rolling sample standard deviation (ddof = 1), NaN prefix until full.
///
/// A window of 1 has no sample variance and yields NaN throughout.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let ss: f64 = slice.iter().map(|v| (v - mean) * (v - mean)).sum();
        result[i] = (ss / (window - 1) as f64).sqrt();
    }
    result
}

/// Rolling minimum with a shrinking front window (min_periods = 1).
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(values, window, f64::min)
}

/// Rolling maximum with a shrinking front window (min_periods = 1).
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(values, window, f64::max)
}

fn rolling_extreme(values: &[f64], window: usize, pick: fn(f64, f64) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 {
        return result;
    }
    for i in 0..n {
        let start = i.saturating_sub(window - 1);
        let mut acc = values[start];
        for &v in &values[start + 1..=i] {
            acc = pick(acc, v);
        }
        result[i] = acc;
    }
    result
}

/// Span-based exponential moving average, `adjust = false`.
///
/// alpha = 2 / (span + 1); seeded at the first value, so every row is defined.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 || span == 0 {
        return result;
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = values[0];
    result[0] = prev;
    for i in 1..n {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

/// First difference with NaN differences replaced by 0.0 (reference
/// `diff().fillna(0)`), including the leading row.
pub fn diff_or_zero(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![0.0; n];
    for i in 1..n {
        let d = values[i] - values[i - 1];
        result[i] = if d.is_nan() { 0.0 } else { d };
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn rolling_mean_has_nan_prefix() {
        let result = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0);
        assert_approx(result[3], 12.0);
        assert_approx(result[4], 13.0);
    }

    #[test]
    fn rolling_mean_short_input_is_all_nan() {
        let result = rolling_mean(&[1.0, 2.0], 5);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_std_is_sample_std() {
        // std([1,2,3,4], ddof=1) = sqrt(5/3)
        let result = rolling_std(&[1.0, 2.0, 3.0, 4.0], 4);
        assert_approx(result[3], (5.0_f64 / 3.0).sqrt());
    }

    #[test]
    fn rolling_min_max_shrink_at_front() {
        let values = [5.0, 3.0, 8.0, 1.0];
        let mins = rolling_min(&values, 3);
        let maxs = rolling_max(&values, 3);
        assert_approx(mins[0], 5.0);
        assert_approx(mins[1], 3.0);
        assert_approx(mins[3], 1.0);
        assert_approx(maxs[0], 5.0);
        assert_approx(maxs[2], 8.0);
        assert_approx(maxs[3], 8.0);
    }

    #[test]
    fn ewm_mean_matches_recursion() {
        let result = ewm_mean(&[10.0, 20.0], 3);
        assert_approx(result[0], 10.0);
        // alpha = 0.5: 0.5*20 + 0.5*10
        assert_approx(result[1], 15.0);
    }

    #[test]
    fn diff_or_zero_leads_with_zero_and_fills_nan() {
        let result = diff_or_zero(&[f64::NAN, 5.0, 4.0]);
        assert_approx(result[0], 0.0);
        assert_approx(result[1], 0.0); // 5.0 - NaN -> filled
        assert_approx(result[2], -1.0);
    }

    #[test]
    fn frame_rejects_wrong_length_and_unknown_column() {
        let mut frame = FactorFrame::new(3);
        assert!(matches!(
            frame.insert("short", vec![1.0]),
            Err(FactorError::LengthMismatch { .. })
        ));
        frame.insert("short", vec![1.0, 2.0, 3.0]).unwrap();
        assert!(frame.column("long").is_err());
        assert_approx(frame.value("short", 1), 2.0);
        assert!(frame.value("long", 1).is_nan());
        assert!(frame.value("short", 9).is_nan());
    }
}
