// extensions/mod.rs
//
// Pure math the tweens build on: easing kinds, sampled curves, interpolation.
// Nothing in here knows about scheduling.

pub mod curve;
pub mod easing;

pub use curve::{CurveKey, EaseCurve};
pub use easing::{ease, lerp, EaseType, Lerp};
