use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Slot of a playing tween in the scheduler's active set.
    pub struct TweenKey;
}

/// Correlates a tween with an external owner for lookup and cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub i64);

/// What happens at the end of a run when loops remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopType {
    /// Restart from the start value.
    #[default]
    Reset,
    /// Swap start and end, running back the other way.
    Yoyo,
}

/// Which runner tick advances a tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TickCategory {
    /// Once per rendered frame.
    #[default]
    Variable,
    /// Once per fixed step.
    Fixed,
}

/// Result of a tween's tick condition, checked before every advancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickSuspend {
    /// Advance normally.
    #[default]
    None,
    /// Skip this tick but stay registered.
    Tick,
    /// Pause the tween.
    Pause,
    /// Stop the tween.
    Stop,
}

/// Lifecycle hooks a listener can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenEvent {
    /// `play()` was called (before registration).
    Play,
    /// The delay finished and the run begins.
    Start,
    /// A value was evaluated mid-run.
    Tick,
    /// `pause()` was called.
    Pause,
    /// A loop boundary was crossed.
    Repeat,
    /// The final run finished naturally.
    End,
    /// The tween stopped, naturally or explicitly.
    Stop,
}

impl TweenEvent {
    pub const ALL: [TweenEvent; 7] = [
        TweenEvent::Play,
        TweenEvent::Start,
        TweenEvent::Tick,
        TweenEvent::Pause,
        TweenEvent::Repeat,
        TweenEvent::End,
        TweenEvent::Stop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TweenEvent::Play => "on_play",
            TweenEvent::Start => "on_start",
            TweenEvent::Tick => "on_tick",
            TweenEvent::Pause => "on_pause",
            TweenEvent::Repeat => "on_repeat",
            TweenEvent::End => "on_end",
            TweenEvent::Stop => "on_stop",
        }
    }
}

/// How a new listener combines with existing ones.
///
/// There is no subtract mode: adding returns a `ListenerId`, and
/// `TweenHandle::remove_listener` takes that id back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSetMode {
    /// Append to the existing listeners.
    #[default]
    Add,
    /// Replace every existing listener.
    Equals,
}
