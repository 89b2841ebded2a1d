// core/error.rs
//
// Two error families:
//   TweenError:    structural faults returned to the caller (empty sequence,
//                  bad index, missing setter). These are programmer errors.
//   CallbackError: per-task runtime faults. Never returned across the
//                  scheduler's tick boundary; logged and contained instead.

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error type user callbacks may fail with.
pub type BoxError = Box<dyn StdError + 'static>;

/// Errors surfaced synchronously to the code building an animation graph.
#[derive(Debug, Error)]
pub enum TweenError {
    #[error("sequence has no children to play")]
    EmptySequence,

    #[error("index {index} out of range for sequence of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("tween has no setter")]
    MissingSetter,

    #[error("tween has no {0}")]
    MissingValue(&'static str),

    #[error("scheduler has been dropped")]
    SchedulerDropped,

    #[error("invalid scheduler configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// A fault raised while running a tween's callbacks or evaluation.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("callback failed: {0}")]
    Callback(BoxError),

    #[error("{0} re-entered while already running")]
    Reentrant(&'static str),

    #[error("tween has no {0}")]
    MissingValue(&'static str),
}

pub type CallbackResult = Result<(), CallbackError>;

/// Lets callbacks return either `()` or a `Result`.
///
/// ```ignore
/// tween.on_start(|| println!("started"));
/// tween.on_tick(|| -> Result<(), std::io::Error> { Ok(()) });
/// ```
pub trait IntoCallbackResult {
    fn into_callback_result(self) -> CallbackResult;
}

impl IntoCallbackResult for () {
    #[inline]
    fn into_callback_result(self) -> CallbackResult {
        Ok(())
    }
}

impl<E> IntoCallbackResult for Result<(), E>
where
    E: Into<BoxError>,
{
    #[inline]
    fn into_callback_result(self) -> CallbackResult {
        self.map_err(|e| CallbackError::Callback(e.into()))
    }
}
