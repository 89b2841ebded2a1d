pub mod api;
pub mod core;
pub mod extensions;
pub mod systems;
pub mod tween;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience
pub use api::config::{SchedulerConfig, TweenSettings};
pub use api::types::{
    EventSetMode, LoopType, OwnerId, TickCategory, TickSuspend, TweenEvent, TweenKey,
};
pub use crate::core::error::{BoxError, CallbackError, CallbackResult, IntoCallbackResult, TweenError};
pub use crate::core::logger::{LogLogger, TweenLogger};
pub use crate::core::runner::{FrameRunner, ManualRunner, TweenRunner};
pub use crate::core::time::FixedTimestep;
pub use systems::scheduler::{IdProvider, Scheduler, SchedulerHandle};
pub use tween::context::TweenContext;
pub use tween::events::ListenerId;
pub use tween::sequence::TweenSequence;
pub use tween::tweenable::{TweenHandle, TweenProgress, TweenRef, Tweenable};

// Extensions: easing and interpolation
pub use extensions::{ease, lerp, CurveKey, EaseCurve, EaseType, Lerp};
