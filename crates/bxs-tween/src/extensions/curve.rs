// extensions/curve.rs
//
// Caller-supplied easing curve: a list of (time, value) keys sampled with
// piecewise-linear interpolation. Keys need not be monotonic in value.
// Outside the key range the curve holds its first/last value.

use serde::{Deserialize, Serialize};

/// One sample point of an [`EaseCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Sampled easing curve. Overrides the ease type of a tween when set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct EaseCurve {
    keys: Vec<CurveKey>,
}

impl EaseCurve {
    /// Build a curve from keys in any order; they are sorted by time.
    pub fn new(keys: impl IntoIterator<Item = CurveKey>) -> Self {
        let mut keys: Vec<CurveKey> = keys.into_iter().filter(|k| k.time.is_finite()).collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Straight line from (0, 0) to (1, 1).
    pub fn linear() -> Self {
        Self::new([CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)])
    }

    /// Build from `(time, value)` pairs.
    pub fn from_points(points: &[(f32, f32)]) -> Self {
        Self::new(points.iter().map(|&(time, value)| CurveKey::new(time, value)))
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sample the curve at `t`. An empty curve behaves as linear; NaN passes through.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) if !t.is_nan() => (first, last),
            _ => return t,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; the key before it starts the segment.
        let idx = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[idx - 1];
        let b = self.keys[idx];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        a.value + (b.value - a.value) * ((t - a.time) / span)
    }
}

impl From<Vec<CurveKey>> for EaseCurve {
    fn from(keys: Vec<CurveKey>) -> Self {
        Self::new(keys)
    }
}

impl From<EaseCurve> for Vec<CurveKey> {
    fn from(curve: EaseCurve) -> Self {
        curve.keys
    }
}
