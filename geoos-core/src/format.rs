//! Value formatting per metric unit and precision
//!
//! Global invariants enforced:
//! - Rounding is half away from zero, at the metric's decimals
//! - Negative zero never renders with a sign
//! - Non-finite values render as `n/a`

use crate::metrics::{get, MetricId};
use std::collections::BTreeMap;

const NOT_AVAILABLE: &str = "n/a";

/// Format a value with the metric's default decimals and unit suffix
///
/// `format(MetricId::Reach, 64.7) == "65%"`,
/// `format(MetricId::AvgPosition, 2.34) == "2.3"`.
pub fn format(id: MetricId, value: f64) -> String {
    Formatter::default().format(id, value)
}

/// Format a signed change of a metric, e.g. `+12pp` or `-0.4`
pub fn format_delta(id: MetricId, value: f64) -> String {
    Formatter::default().format_delta(id, value)
}

/// Formatter with optional per-metric decimals overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatter {
    overrides: BTreeMap<MetricId, u8>,
}

impl Formatter {
    pub fn with_overrides(overrides: BTreeMap<MetricId, u8>) -> Self {
        Formatter { overrides }
    }

    /// Effective decimals for a metric
    pub fn decimals(&self, id: MetricId) -> u8 {
        self.overrides
            .get(&id)
            .copied()
            .unwrap_or_else(|| get(id).decimals)
    }

    pub fn format(&self, id: MetricId, value: f64) -> String {
        if !value.is_finite() {
            return NOT_AVAILABLE.to_string();
        }
        let decimals = self.decimals(id);
        format!(
            "{}{}",
            fixed(round_half_away(value, decimals), decimals),
            get(id).unit.suffix()
        )
    }

    pub fn format_delta(&self, id: MetricId, value: f64) -> String {
        if !value.is_finite() {
            return NOT_AVAILABLE.to_string();
        }
        let decimals = self.decimals(id);
        let rounded = round_half_away(value, decimals);
        let sign = if rounded > 0.0 { "+" } else { "" };
        format!(
            "{}{}{}",
            sign,
            fixed(rounded, decimals),
            get(id).unit.delta_suffix()
        )
    }
}

/// Largest magnitude at which an f64 still has a fractional part
const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0; // 2^52

/// Round half away from zero to `decimals` places
///
/// Values too large to scale have no digits left to round and are returned
/// unchanged.
fn round_half_away(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimals));
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }
    let rounded = scaled.round() / factor;
    // -0.0 == 0.0, so this also clears the sign bit
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn fixed(value: f64, decimals: u8) -> String {
    format!("{:.*}", usize::from(decimals), value)
}
