use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Highest dot value accepted from the caller before a rating is discarded.
pub const MAX_RAW_DOTS: u32 = 10;

/// Sum point values, stopping at `u32::MAX` instead of wrapping.
///
/// Values other than ratings (backgrounds, spheres, merit points) arrive as
/// plain integers and are only range-checked after they are totalled.
pub fn saturating_sum(values: impl IntoIterator<Item = u32>) -> u32 {
    values.into_iter().fold(0, u32::saturating_add)
}

/// A point count as a signed balance, clamped to `i32::MAX`.
pub fn signed_points(points: u32) -> i32 {
    i32::try_from(points).unwrap_or(i32::MAX)
}

/// A trait rating exactly as the caller stored it.
///
/// Wizard progress is edited by a UI that can leave half-typed values behind
/// (strings, nulls, fractions). A rating keeps the raw JSON scalar so nothing
/// is lost on a save/load cycle, and [`Rating::dots`] decides whether it is
/// usable. Unusable ratings are excluded from point sums rather than treated
/// as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(Value);

impl Rating {
    /// A well-formed rating.
    pub fn new(dots: u32) -> Self {
        Self(Value::from(dots))
    }

    /// Wrap an arbitrary raw value.
    pub fn raw(value: Value) -> Self {
        Self(value)
    }

    /// The raw value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The usable dot count, if any.
    ///
    /// Numbers and numeric strings are accepted when they are whole and lie
    /// in `[0, 10]`. Everything else yields `None`.
    pub fn dots(&self) -> Option<u32> {
        let n = match &self.0 {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !n.is_finite() || n.fract() != 0.0 || !(0.0..=f64::from(MAX_RAW_DOTS)).contains(&n) {
            return None;
        }
        Some(n as u32)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<u32> for Rating {
    fn from(dots: u32) -> Self {
        Self::new(dots)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dots() {
            Some(d) => write!(f, "{d}"),
            None => write!(f, "{} (ignored)", self.0),
        }
    }
}
