// core/runner.rs
//
// Frame sources for the scheduler. A runner owns the clock (deltas, time
// scale, frame count) and fires the two tick events; the scheduler reads
// the clock back through `TweenRunner` while it advances tweens.
//
// ManualRunner: host drives every tick explicitly (tests, editors, tools).
// FrameRunner:  one call per rendered frame; emits the variable tick, then
//                as many fixed ticks as the accumulator allows.

use std::cell::{Cell, RefCell};

use crate::api::config::SchedulerConfig;
use crate::core::time::FixedTimestep;
use crate::systems::scheduler::Scheduler;

/// Clock the scheduler reads during a tick.
pub trait TweenRunner {
    /// Seconds since the previous variable tick, before time scaling.
    fn unscaled_delta_time(&self) -> f32;
    /// Seconds per fixed tick, before time scaling.
    fn fixed_unscaled_delta_time(&self) -> f32;
    fn time_scale(&self) -> f32;
    /// When false, fixed-category tweens ride the variable tick instead.
    fn supports_fixed_tick(&self) -> bool;
    fn frame_count(&self) -> u64;
}

/// Runner whose ticks are fired by hand.
#[derive(Debug)]
pub struct ManualRunner {
    delta: Cell<f32>,
    fixed_delta: Cell<f32>,
    time_scale: Cell<f32>,
    supports_fixed: Cell<bool>,
    frame: Cell<u64>,
}

impl Default for ManualRunner {
    fn default() -> Self {
        Self {
            delta: Cell::new(0.0),
            fixed_delta: Cell::new(1.0 / 60.0),
            time_scale: Cell::new(1.0),
            supports_fixed: Cell::new(true),
            frame: Cell::new(0),
        }
    }
}

impl ManualRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time_scale(&self, scale: f32) {
        self.time_scale.set(scale.max(0.0));
    }

    pub fn set_supports_fixed_tick(&self, supported: bool) {
        self.supports_fixed.set(supported);
    }

    /// Fire one variable tick of `dt` seconds.
    pub fn step(&self, scheduler: &Scheduler, dt: f32) {
        self.delta.set(dt.max(0.0));
        self.frame.set(self.frame.get() + 1);
        scheduler.on_variable_tick();
    }

    /// Fire one fixed tick of `dt` seconds.
    pub fn fixed_step(&self, scheduler: &Scheduler, dt: f32) {
        self.fixed_delta.set(dt.max(0.0));
        scheduler.on_fixed_tick();
    }
}

impl TweenRunner for ManualRunner {
    fn unscaled_delta_time(&self) -> f32 {
        self.delta.get()
    }

    fn fixed_unscaled_delta_time(&self) -> f32 {
        self.fixed_delta.get()
    }

    fn time_scale(&self) -> f32 {
        self.time_scale.get()
    }

    fn supports_fixed_tick(&self) -> bool {
        self.supports_fixed.get()
    }

    fn frame_count(&self) -> u64 {
        self.frame.get()
    }
}

/// Per-frame runner with a fixed-step accumulator.
///
/// ```ignore
/// let runner = Rc::new(FrameRunner::new(&config));
/// scheduler.initialize(runner.clone(), None);
/// // every rendered frame:
/// runner.frame(&scheduler, dt);
/// ```
#[derive(Debug)]
pub struct FrameRunner {
    timestep: RefCell<FixedTimestep>,
    delta: Cell<f32>,
    time_scale: Cell<f32>,
    frame: Cell<u64>,
}

impl FrameRunner {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            timestep: RefCell::new(FixedTimestep::with_max_steps(
                config.fixed_dt,
                config.max_fixed_steps,
            )),
            delta: Cell::new(0.0),
            time_scale: Cell::new(1.0),
            frame: Cell::new(0),
        }
    }

    pub fn set_time_scale(&self, scale: f32) {
        self.time_scale.set(scale.max(0.0));
    }

    /// Run one frame: the variable tick, then the fixed steps it covers.
    /// Returns the number of fixed ticks fired.
    pub fn frame(&self, scheduler: &Scheduler, dt: f32) -> u32 {
        let dt = dt.max(0.0);
        self.delta.set(dt);
        self.frame.set(self.frame.get() + 1);
        scheduler.on_variable_tick();

        let steps = self.timestep.borrow_mut().accumulate(dt);
        for _ in 0..steps {
            scheduler.on_fixed_tick();
        }
        steps
    }

    /// Fraction of a fixed step carried into the next frame.
    pub fn alpha(&self) -> f32 {
        self.timestep.borrow().alpha()
    }

    /// Host is shutting down; with `cleanup` every active tween is stopped.
    pub fn exit(&self, scheduler: &Scheduler, cleanup: bool) {
        self.timestep.borrow_mut().reset();
        scheduler.on_exit(cleanup);
    }
}

impl TweenRunner for FrameRunner {
    fn unscaled_delta_time(&self) -> f32 {
        self.delta.get()
    }

    fn fixed_unscaled_delta_time(&self) -> f32 {
        self.timestep.borrow().dt()
    }

    fn time_scale(&self) -> f32 {
        self.time_scale.get()
    }

    fn supports_fixed_tick(&self) -> bool {
        true
    }

    fn frame_count(&self) -> u64 {
        self.frame.get()
    }
}
