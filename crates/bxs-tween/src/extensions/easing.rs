// extensions/easing.rs
//
// Pure easing functions and the Lerp trait used by typed tweens.
// No dependencies on tweens or the scheduler, just math.
//
// Phases outside [0, 1] are accepted and extrapolated; clamping is the
// tween's decision (`clamp_easing_output`), not the easing function's.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EaseType {
    /// Constant velocity (no easing).
    #[default]
    Linear,
    SineIn,
    SineOut,
    SineInOut,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    /// Exponential easing (dramatic).
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    /// Circular arc easing.
    CircIn,
    CircOut,
    CircInOut,
    /// Overshoot then settle.
    BackIn,
    BackOut,
    BackInOut,
    /// Spring-like oscillation.
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    /// Bouncy start or finish.
    BounceIn,
    BounceOut,
    BounceInOut,
}

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * PI) / 4.5;

impl EaseType {
    /// Apply the easing function to a phase `t`.
    /// Returns the eased phase; Back and Elastic overshoot [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        match self {
            EaseType::Linear => t,

            // Sine
            EaseType::SineIn => 1.0 - (t * PI / 2.0).cos(),
            EaseType::SineOut => (t * PI / 2.0).sin(),
            EaseType::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            // Polynomial
            EaseType::QuadIn => t.powi(2),
            EaseType::QuadOut => 1.0 - (1.0 - t).powi(2),
            EaseType::QuadInOut => poly_in_out(t, 2),
            EaseType::CubicIn => t.powi(3),
            EaseType::CubicOut => 1.0 - (1.0 - t).powi(3),
            EaseType::CubicInOut => poly_in_out(t, 3),
            EaseType::QuartIn => t.powi(4),
            EaseType::QuartOut => 1.0 - (1.0 - t).powi(4),
            EaseType::QuartInOut => poly_in_out(t, 4),
            EaseType::QuintIn => t.powi(5),
            EaseType::QuintOut => 1.0 - (1.0 - t).powi(5),
            EaseType::QuintInOut => poly_in_out(t, 5),

            // Exponential
            EaseType::ExpoIn => {
                if t == 0.0 { 0.0 } else { 2.0_f32.powf(10.0 * t - 10.0) }
            }
            EaseType::ExpoOut => {
                if t == 1.0 { 1.0 } else { 1.0 - 2.0_f32.powf(-10.0 * t) }
            }
            EaseType::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            // Circular; sqrt of a negative would be NaN outside the domain.
            EaseType::CircIn => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            EaseType::CircOut => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
            EaseType::CircInOut => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) / 2.0
                }
            }

            // Back (overshoot)
            EaseType::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            EaseType::BackOut => {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            EaseType::BackInOut => {
                if t < 0.5 {
                    (2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2) + 2.0)
                        / 2.0
                }
            }

            // Elastic
            EaseType::ElasticIn => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            EaseType::ElasticOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            EaseType::ElasticInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    -(2.0_f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                } else {
                    (2.0_f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                        + 1.0
                }
            }

            // Bounce
            EaseType::BounceIn => 1.0 - bounce_out(1.0 - t),
            EaseType::BounceOut => bounce_out(t),
            EaseType::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

#[inline]
fn poly_in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        2.0_f32.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

#[inline]
fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

// ── Interpolation ────────────────────────────────────────────────────────

/// Values a typed tween can interpolate between.
pub trait Lerp: Clone {
    /// Interpolate from `self` to `other` by `t` (not clamped).
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease<T: Lerp>(a: &T, b: &T, t: f32, easing: EaseType) -> T {
    a.lerp(b, easing.apply(t))
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        lerp(*self, *other, t)
    }
}

impl Lerp for f64 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t as f64
    }
}

impl Lerp for i32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        (*self as f64 + (*other as f64 - *self as f64) * t as f64).round() as i32
    }
}

#[cfg(feature = "vectors")]
mod vectors {
    use super::Lerp;
    use glam::{Quat, Vec2, Vec3, Vec4};

    impl Lerp for Vec2 {
        #[inline]
        fn lerp(&self, other: &Self, t: f32) -> Self {
            *self + (*other - *self) * t
        }
    }

    impl Lerp for Vec3 {
        #[inline]
        fn lerp(&self, other: &Self, t: f32) -> Self {
            *self + (*other - *self) * t
        }
    }

    impl Lerp for Vec4 {
        #[inline]
        fn lerp(&self, other: &Self, t: f32) -> Self {
            *self + (*other - *self) * t
        }
    }

    impl Lerp for Quat {
        #[inline]
        fn lerp(&self, other: &Self, t: f32) -> Self {
            self.slerp(*other, t)
        }
    }
}
