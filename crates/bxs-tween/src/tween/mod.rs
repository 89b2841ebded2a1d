pub mod context;
pub mod events;
pub mod sequence;
pub mod tweenable;

// Re-export key types for convenient access
pub use context::TweenContext;
pub use events::{ListenerId, Listeners};
pub use sequence::TweenSequence;
pub use tweenable::{TweenCore, TweenHandle, TweenProgress, TweenRef, Tweenable};
