use serde::{Deserialize, Serialize};

use crate::api::types::{LoopType, TickCategory};
use crate::core::error::TweenError;
use crate::extensions::curve::EaseCurve;
use crate::extensions::easing::EaseType;

/// Timing and easing configuration of a single tween.
///
/// Captured into the tween's progress state when it starts playing; edits to
/// `duration` and `loop_count` after that only apply to the next fresh play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenSettings {
    /// Seconds per run (default: 1.0).
    pub duration: f32,
    /// Seconds before the first run starts (default: 0).
    pub delay: f32,
    /// 0 = play once, n > 0 = repeat n more times, negative = forever.
    pub loop_count: i32,
    /// Restart or reverse on every loop.
    pub loop_type: LoopType,
    /// Whether the delay is waited again before each repeat.
    pub wait_delay_on_loop: bool,
    /// Easing applied to the phase.
    pub ease: EaseType,
    /// Sampled curve; overrides `ease` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ease_curve: Option<EaseCurve>,
    /// Time multiplier (default: 1.0).
    pub speed: f32,
    /// Clamp the eased phase into [0, 1].
    pub clamp_easing_output: bool,
    /// Which runner tick drives the tween.
    pub tick_category: TickCategory,
    /// Ignore the runner's time scale.
    pub ignore_timescale: bool,
}

impl Default for TweenSettings {
    fn default() -> Self {
        Self {
            duration: 1.0,
            delay: 0.0,
            loop_count: 0,
            loop_type: LoopType::Reset,
            wait_delay_on_loop: false,
            ease: EaseType::Linear,
            ease_curve: None,
            speed: 1.0,
            clamp_easing_output: false,
            tick_category: TickCategory::Variable,
            ignore_timescale: false,
        }
    }
}

impl TweenSettings {
    /// Map a raw phase through the curve (or ease type), clamping if configured.
    pub fn ease_phase(&self, phase: f32) -> f32 {
        let eased = match &self.ease_curve {
            Some(curve) => curve.evaluate(phase),
            None => self.ease.apply(phase),
        };
        if self.clamp_easing_output {
            eased.clamp(0.0, 1.0)
        } else {
            eased
        }
    }

    /// Parse settings from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TweenError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Host-level configuration for a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Fixed step in seconds used by `FrameRunner` (default: 1/60).
    pub fixed_dt: f32,
    /// Maximum fixed steps emitted per frame (default: 10).
    pub max_fixed_steps: u32,
    /// Settings every new tween starts from.
    pub default_settings: TweenSettings,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_fixed_steps: 10,
            default_settings: TweenSettings::default(),
        }
    }
}

impl SchedulerConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TweenError> {
        Ok(serde_json::from_str(json)?)
    }
}
