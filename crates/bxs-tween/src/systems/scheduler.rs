// systems/scheduler.rs
//
// Host-owned registry of playing tweens and the per-tick advancement loop.
//
// Each tick iterates a snapshot of the active set. A tween is only advanced
// if it still owns the slot it had when the snapshot was taken, so tweens
// stopped or restarted by a sibling's callback are skipped for this tick.
// Every fault raised while advancing a tween is logged and contained to
// that tween; nothing crosses the tick boundary.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::SlotMap;

use crate::api::config::{SchedulerConfig, TweenSettings};
use crate::api::types::{OwnerId, TickCategory, TickSuspend, TweenEvent, TweenKey};
use crate::core::error::{CallbackError, IntoCallbackResult};
use crate::core::logger::{LogLogger, TweenLogger};
use crate::core::runner::TweenRunner;
use crate::extensions::easing::Lerp;
use crate::tween::context::TweenContext;
use crate::tween::sequence::TweenSequence;
use crate::tween::tweenable::{self, TweenRef};

/// Maps an owner object to the id stored on its tweens.
pub trait IdProvider {
    fn id_of(&self, owner: &dyn Any) -> i64;
}

/// Fallback id: the owner's address.
fn address_id(owner: &dyn Any) -> i64 {
    owner as *const dyn Any as *const () as usize as i64
}

struct SchedulerInner {
    active: SlotMap<TweenKey, TweenRef>,
    runner: Option<Rc<dyn TweenRunner>>,
    logger: Rc<dyn TweenLogger>,
    id_provider: Option<Rc<dyn IdProvider>>,
    config: SchedulerConfig,
    ticking: bool,
}

/// Drives every playing tween from the runner's tick events.
///
/// The scheduler is owned by the host; tweens keep only a [`SchedulerHandle`],
/// so dropping the scheduler ends all animation without leaking cycles.
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::with_config(SchedulerConfig::default())
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                active: SlotMap::with_key(),
                runner: None,
                logger: Rc::new(LogLogger),
                id_provider: None,
                config,
                ticking: false,
            })),
        }
    }

    /// Install the runner (and optionally a logger). Replaces any previous runner.
    pub fn initialize(&self, runner: Rc<dyn TweenRunner>, logger: Option<Rc<dyn TweenLogger>>) {
        let mut inner = self.inner.borrow_mut();
        if inner.runner.is_some() {
            log::debug!("scheduler: runner replaced");
        } else {
            log::debug!("scheduler: initialized");
        }
        inner.runner = Some(runner);
        if let Some(logger) = logger {
            inner.logger = logger;
        }
    }

    pub fn set_logger(&self, logger: Rc<dyn TweenLogger>) {
        self.inner.borrow_mut().logger = logger;
    }

    pub fn set_id_provider(&self, provider: Rc<dyn IdProvider>) {
        self.inner.borrow_mut().id_provider = Some(provider);
    }

    pub fn logger(&self) -> Rc<dyn TweenLogger> {
        Rc::clone(&self.inner.borrow().logger)
    }

    pub fn config(&self) -> SchedulerConfig {
        self.inner.borrow().config.clone()
    }

    /// Weak handle for tweens constructed against this scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // -- Construction helpers --

    /// Typed tween from `start` to `end`.
    pub fn context<T: Lerp + 'static>(&self, start: T, end: T) -> TweenContext<T> {
        TweenContext::new(self.handle(), start, end)
    }

    pub fn sequence(&self) -> TweenSequence {
        TweenSequence::new(self.handle())
    }

    /// Configured tween in one call; still needs `play()`.
    pub fn to<T, F, R>(&self, start: T, end: T, duration: f32, setter: F) -> TweenContext<T>
    where
        T: Lerp + 'static,
        F: FnMut(T) -> R + 'static,
        R: IntoCallbackResult,
    {
        self.context(start, end)
            .with_duration(duration)
            .with_setter(setter)
    }

    // -- Diagnostics --

    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().active.is_empty()
    }

    /// Snapshot of the active set. Read-only; use the tweens' own controls to change them.
    pub fn active_tweens(&self) -> Vec<TweenRef> {
        self.inner.borrow().active.values().cloned().collect()
    }

    /// Active tweens correlated with `id`.
    pub fn tweens_with_id(&self, id: i64) -> Vec<TweenRef> {
        self.active_tweens()
            .into_iter()
            .filter(|t| t.core().owner == Some(OwnerId(id)))
            .collect()
    }

    // -- Bulk control --

    /// Stop active tweens correlated with `id`. Returns how many were stopped.
    pub fn stop_tweens_with_id(&self, id: i64) -> usize {
        let tweens = self.tweens_with_id(id);
        for tween in &tweens {
            tweenable::stop(tween);
        }
        tweens.len()
    }

    /// Stop active tweens owned by `owner`.
    pub fn stop_tweens_for<O: Any>(&self, owner: &O) -> usize {
        let id = self.handle().id_of(owner);
        self.stop_tweens_with_id(id.0)
    }

    /// Stop every active tween, firing their stop listeners.
    pub fn stop_all_tweens(&self) {
        for tween in self.active_tweens() {
            if tween.core().progress.is_playing {
                tweenable::stop(&tween);
            }
        }
    }

    /// Drop every tween from the active set without running any callback.
    pub fn clear(&self) {
        for tween in self.active_tweens() {
            tweenable::halt(&tween);
            tweenable::reset(&tween);
        }
        self.inner.borrow_mut().active.clear();
    }

    /// Runner teardown. With `cleanup`, all active tweens are stopped.
    pub fn on_exit(&self, cleanup: bool) {
        log::debug!("scheduler: runner exited (cleanup = {})", cleanup);
        if cleanup {
            self.stop_all_tweens();
        }
    }

    // -- Tick events --

    pub fn on_variable_tick(&self) {
        self.tick(TickCategory::Variable);
    }

    pub fn on_fixed_tick(&self) {
        self.tick(TickCategory::Fixed);
    }

    fn tick(&self, category: TickCategory) {
        // Loggers may query the scheduler; log after the borrow ends.
        let (logger, started) = {
            let mut inner = self.inner.borrow_mut();
            let logger = Rc::clone(&inner.logger);
            let started = match inner.runner.clone() {
                None => Err("tick fired before a runner was installed"),
                Some(_) if inner.ticking => Err("nested tick ignored"),
                Some(runner) => {
                    inner.ticking = true;
                    let snapshot: Vec<(TweenKey, TweenRef)> = inner
                        .active
                        .iter()
                        .map(|(key, tween)| (key, Rc::clone(tween)))
                        .collect();
                    Ok((runner, snapshot))
                }
            };
            (logger, started)
        };
        let (runner, snapshot) = match started {
            Ok(started) => started,
            Err(reason) => {
                logger.log_warning(reason);
                return;
            }
        };

        let fixed_supported = runner.supports_fixed_tick();
        let base_dt = match category {
            TickCategory::Variable => runner.unscaled_delta_time(),
            TickCategory::Fixed => runner.fixed_unscaled_delta_time(),
        };

        for (key, tween) in snapshot {
            let wanted = tween.core().settings.tick_category;
            let runs_here = match (category, wanted) {
                (TickCategory::Variable, TickCategory::Variable) => true,
                (TickCategory::Variable, TickCategory::Fixed) => !fixed_supported,
                (TickCategory::Fixed, TickCategory::Fixed) => fixed_supported,
                (TickCategory::Fixed, TickCategory::Variable) => false,
            };
            if runs_here && tweenable::still_current(&tween, key) {
                advance(&tween, key, base_dt, runner.time_scale(), logger.as_ref());
            }
        }

        self.inner.borrow_mut().ticking = false;
    }
}

enum DelayStep {
    /// Delay was already over before this tick.
    Over,
    /// No delay configured: start and run in the same tick.
    Skipped,
    /// Delay finished on this tick.
    Finished,
    Waiting,
}

/// One advancement of one tween.
fn advance(tween: &TweenRef, key: TweenKey, base_dt: f32, time_scale: f32, logger: &dyn TweenLogger) {
    if !tween.is_valid() {
        logger.log_error(&format!("{} is no longer valid, removing it", tween.describe()));
        tweenable::halt(tween);
        tweenable::reset(tween);
        return;
    }

    let instant = !tween.is_composite() && tween.core().progress.is_instant();
    if instant {
        run_instant(tween, key, logger);
        return;
    }

    let condition = tween.core().tick_condition.clone();
    if let Some(condition) = condition {
        let verdict = match condition.try_borrow_mut() {
            Ok(mut f) => (*f)(),
            Err(_) => Err(CallbackError::Reentrant("tick condition")),
        };
        match verdict {
            Ok(TickSuspend::None) => {}
            Ok(TickSuspend::Tick) => return,
            Ok(TickSuspend::Pause) => {
                tweenable::pause(tween);
                return;
            }
            Ok(TickSuspend::Stop) => {
                tweenable::stop(tween);
                return;
            }
            Err(err) => {
                logger.log_exception(&format!("{}: tick condition failed, stopping", tween.describe()), &err);
                stop_if_current(tween, key);
                return;
            }
        }
    }

    let dt = {
        let core = tween.core();
        let scale = if core.settings.ignore_timescale { 1.0 } else { time_scale };
        base_dt * scale * core.settings.speed
    };

    let delay = {
        let mut core = tween.core_mut();
        let p = &mut core.progress;
        if p.delay_elapsed >= 1.0 {
            DelayStep::Over
        } else if p.starting_delay <= 0.0 {
            p.delay_elapsed = 1.0;
            DelayStep::Skipped
        } else {
            p.delay_elapsed = (p.delay_elapsed + dt / p.starting_delay).min(1.0);
            if p.delay_elapsed >= 1.0 {
                DelayStep::Finished
            } else {
                DelayStep::Waiting
            }
        }
    };
    match delay {
        DelayStep::Over => {}
        DelayStep::Waiting => return,
        DelayStep::Finished => {
            tweenable::fire_logged(tween, TweenEvent::Start);
            return;
        }
        DelayStep::Skipped => {
            tweenable::fire_logged(tween, TweenEvent::Start);
            if !tweenable::still_current(tween, key) {
                return;
            }
        }
    }

    if tween.is_composite() {
        if let Err(err) = tween.run_children() {
            logger.log_exception(&format!("{}: starting children failed", tween.describe()), &err);
            stop_if_current(tween, key);
        }
        return;
    }

    let phase = {
        let mut core = tween.core_mut();
        let p = &mut core.progress;
        p.current_elapsed = if p.starting_duration > 0.0 {
            (p.current_elapsed + dt / p.starting_duration).min(1.0)
        } else {
            1.0
        };
        p.current_elapsed
    };

    if let Err(err) = tween.evaluate(phase) {
        logger.log_exception(&format!("{}: evaluate failed, stopping", tween.describe()), &err);
        stop_if_current(tween, key);
        return;
    }
    if !tweenable::still_current(tween, key) {
        return;
    }

    if phase < 1.0 {
        if let Err(err) = tweenable::fire(tween, TweenEvent::Tick) {
            logger.log_exception(&format!("{}: on_tick failed, stopping", tween.describe()), &err);
            stop_if_current(tween, key);
        }
        return;
    }

    tweenable::complete_run(tween);
}

/// Zero duration and zero delay: start, final value, end, stop.
fn run_instant(tween: &TweenRef, key: TweenKey, logger: &dyn TweenLogger) {
    {
        let mut core = tween.core_mut();
        core.progress.delay_elapsed = 1.0;
        core.progress.current_elapsed = 1.0;
    }
    tweenable::fire_logged(tween, TweenEvent::Start);
    if !tweenable::still_current(tween, key) {
        return;
    }
    if let Err(err) = tween.evaluate(1.0) {
        logger.log_exception(&format!("{}: evaluate failed, stopping", tween.describe()), &err);
        stop_if_current(tween, key);
        return;
    }
    tweenable::fire_logged(tween, TweenEvent::End);
    stop_if_current(tween, key);
}

fn stop_if_current(tween: &TweenRef, key: TweenKey) {
    if tweenable::still_current(tween, key) {
        tweenable::stop(tween);
    }
}

/// Weak reference to a [`Scheduler`], held by every tween.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Handle to nothing; tweens built on it can never play.
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn logger(&self) -> Rc<dyn TweenLogger> {
        match self.inner.upgrade() {
            Some(inner) => Rc::clone(&inner.borrow().logger),
            None => Rc::new(LogLogger),
        }
    }

    pub fn default_settings(&self) -> TweenSettings {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().config.default_settings.clone())
            .unwrap_or_default()
    }

    /// Owner id through the installed provider, or the owner's address.
    pub fn id_of<O: Any>(&self, owner: &O) -> OwnerId {
        let provider = self
            .inner
            .upgrade()
            .and_then(|inner| inner.borrow().id_provider.clone());
        match provider {
            Some(provider) => OwnerId(provider.id_of(owner)),
            None => OwnerId(address_id(owner)),
        }
    }

    pub(crate) fn register(&self, tween: &TweenRef) -> Option<TweenKey> {
        let inner = self.inner.upgrade()?;
        let key = inner.borrow_mut().active.insert(Rc::clone(tween));
        Some(key)
    }

    pub(crate) fn unregister(&self, key: TweenKey) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().active.remove(key);
        }
    }
}
