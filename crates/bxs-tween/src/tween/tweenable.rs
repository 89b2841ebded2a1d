//! Tweenable base: configuration, progress state and lifecycle.
//!
//! A tweenable moves through `Idle → Delaying → Running → (Looping → Running)*
//! → Idle`. `play`, `pause`, `stop` and `reset` below are the only ways state
//! changes outside of the scheduler's per-tick advancement.
//!
//! Every operation follows the same borrowing rule: read or write the
//! [`TweenCore`] inside a short scope, drop the borrow, then run user code.
//! Callbacks are therefore free to call back into the tween (or any other
//! tween) without tripping a `RefCell` double borrow.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::api::config::TweenSettings;
use crate::api::types::{
    EventSetMode, LoopType, OwnerId, TickCategory, TickSuspend, TweenEvent, TweenKey,
};
use crate::core::error::{CallbackError, CallbackResult, IntoCallbackResult};
use crate::core::logger::TweenLogger;
use crate::systems::scheduler::SchedulerHandle;
use crate::tween::events::{handler, invoke_all, ListenerId, TweenEvents};

/// Shared, type-erased reference to a tweenable.
pub type TweenRef = Rc<dyn Tweenable>;

/// User hook checked before every advancement.
pub type TickCondition = Rc<RefCell<dyn FnMut() -> Result<TickSuspend, CallbackError>>>;

/// Mutable progress of a tween. Written by the scheduler and lifecycle calls only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweenProgress {
    /// Fraction of the delay waited, in [0, 1].
    pub delay_elapsed: f32,
    /// Fraction of the current run done, in [0, 1].
    pub current_elapsed: f32,
    /// Loops completed in this play.
    pub loops_elapsed: i32,
    pub is_playing: bool,
    /// Paused with progress kept; the next play resumes.
    pub is_paused: bool,
    pub has_played_once: bool,
    /// Start and end are currently exchanged by a yoyo loop.
    pub values_swapped: bool,
    pub starting_duration: f32,
    pub starting_delay: f32,
    pub starting_loop_count: i32,
}

impl TweenProgress {
    /// Neither a duration nor a delay to wait for.
    pub fn is_instant(&self) -> bool {
        self.starting_duration <= 0.0 && self.starting_delay <= 0.0
    }
}

/// State every tweenable carries.
pub struct TweenCore {
    pub settings: TweenSettings,
    pub progress: TweenProgress,
    pub events: TweenEvents,
    pub tick_condition: Option<TickCondition>,
    pub owner: Option<OwnerId>,
    pub(crate) scheduler: SchedulerHandle,
    pub(crate) key: Option<TweenKey>,
}

impl TweenCore {
    /// New core using the scheduler's default settings.
    pub fn new(scheduler: SchedulerHandle) -> Self {
        Self {
            settings: scheduler.default_settings(),
            progress: TweenProgress::default(),
            events: TweenEvents::new(),
            tick_condition: None,
            owner: None,
            scheduler,
            key: None,
        }
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    /// Slot in the scheduler's active set while playing.
    pub fn key(&self) -> Option<TweenKey> {
        self.key
    }
}

/// One schedulable animation unit.
///
/// Implementors keep their state behind `RefCell`s and must never hold a
/// borrow while calling user code from [`evaluate`](Tweenable::evaluate) or
/// [`prepare_play`](Tweenable::prepare_play).
pub trait Tweenable {
    fn core(&self) -> Ref<'_, TweenCore>;
    fn core_mut(&self) -> RefMut<'_, TweenCore>;

    /// Whether the tween has everything it needs to run.
    fn is_valid(&self) -> bool;

    /// Apply the value for `phase` (raw, before easing).
    fn evaluate(&self, phase: f32) -> CallbackResult;

    /// Exchange start and end values (yoyo loops).
    fn swap_values(&self) {}

    /// Seconds per run.
    fn duration(&self) -> f32 {
        self.core().settings.duration
    }

    /// Short description used in log lines.
    fn describe(&self) -> String;

    /// Runs on a fresh (non-resume) play, before the play listeners.
    fn prepare_play(&self) -> CallbackResult {
        Ok(())
    }

    /// Progress comes from children instead of elapsed time.
    fn is_composite(&self) -> bool {
        false
    }

    /// Composite only: start children once the delay is over. Called every
    /// tick while running; must be a no-op when children are already running.
    fn run_children(&self) -> CallbackResult {
        Ok(())
    }

    fn on_paused(&self) {}
    fn on_resumed(&self) {}
    fn on_stopped(&self) {}
    fn on_reset(&self) {}
}

pub(crate) fn same_tween(a: &TweenRef, b: &TweenRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

fn logger_of(tween: &TweenRef) -> Rc<dyn TweenLogger> {
    tween.core().scheduler.logger()
}

/// Run the listeners of `event`; the first failure is returned.
pub(crate) fn fire(tween: &TweenRef, event: TweenEvent) -> CallbackResult {
    let handlers = tween.core().events.snapshot(event);
    if handlers.is_empty() {
        return Ok(());
    }
    invoke_all(&handlers, event.name())
}

/// Like [`fire`] for hooks whose failures are non-fatal.
pub(crate) fn fire_logged(tween: &TweenRef, event: TweenEvent) {
    if let Err(err) = fire(tween, event) {
        logger_of(tween).log_exception(
            &format!("{}: {} failed", tween.describe(), event.name()),
            &err,
        );
    }
}

/// True while `tween` still occupies `key` in the scheduler.
pub(crate) fn still_current(tween: &TweenRef, key: TweenKey) -> bool {
    let core = tween.core();
    core.progress.is_playing && core.key == Some(key)
}

/// Start (or resume) a tween and register it with its scheduler.
pub fn play(tween: &TweenRef) {
    let logger = logger_of(tween);
    if !tween.is_valid() {
        logger.log_warning(&format!("play: {} is not valid, ignoring", tween.describe()));
        return;
    }

    if tween.core().progress.is_playing {
        stop(tween);
    }

    let resume = tween.core().progress.is_paused;
    if !resume {
        // A tween replayed from its own on_stop has not been reset yet.
        reset(tween);
        let duration = tween.duration();
        {
            let mut core = tween.core_mut();
            let delay = core.settings.delay;
            let loop_count = core.settings.loop_count;
            let p = &mut core.progress;
            p.starting_duration = duration;
            p.starting_delay = delay;
            p.starting_loop_count = loop_count;
        }
        if let Err(err) = tween.prepare_play() {
            logger.log_exception(
                &format!("{}: refreshing start value failed", tween.describe()),
                &err,
            );
        }
    }

    if let Err(err) = fire(tween, TweenEvent::Play) {
        logger.log_exception(
            &format!("{}: on_play failed, play aborted", tween.describe()),
            &err,
        );
        return;
    }

    let scheduler = tween.core().scheduler.clone();
    let Some(key) = scheduler.register(tween) else {
        logger.log_error(&format!("play: scheduler for {} is gone", tween.describe()));
        return;
    };

    {
        let mut core = tween.core_mut();
        core.key = Some(key);
        core.progress.is_playing = true;
        core.progress.is_paused = false;
        core.progress.has_played_once = true;
    }

    if resume {
        tween.on_resumed();
    }
}

/// Leave the active set and drop the playing/paused flags. No callbacks.
pub(crate) fn halt(tween: &TweenRef) {
    let (key, scheduler) = {
        let mut core = tween.core_mut();
        core.progress.is_playing = false;
        core.progress.is_paused = false;
        (core.key.take(), core.scheduler.clone())
    };
    if let Some(key) = key {
        scheduler.unregister(key);
    }
}

/// Suspend a playing tween, keeping its progress.
pub fn pause(tween: &TweenRef) {
    if !tween.core().progress.is_playing {
        return;
    }
    halt(tween);
    tween.core_mut().progress.is_paused = true;
    tween.on_paused();
    fire_logged(tween, TweenEvent::Pause);
}

/// Cancel a tween and reset its progress. Safe to call repeatedly.
pub fn stop(tween: &TweenRef) {
    if !tween.is_valid() {
        logger_of(tween).log_warning(&format!("stop: {} is not valid, ignoring", tween.describe()));
        return;
    }
    halt(tween);
    tween.on_stopped();
    fire_logged(tween, TweenEvent::Stop);
    // on_stop may have played it again from scratch.
    if !tween.core().progress.is_playing {
        reset(tween);
    }
}

/// Zero the elapsed fractions.
///
/// When the tween is not playing this is a full reset (loop counter and yoyo
/// swap included). While playing it is the loop-boundary variant: loop state
/// is left to the caller and the delay is skipped unless `wait_delay_on_loop`.
pub fn reset(tween: &TweenRef) {
    let swap_back = {
        let mut core = tween.core_mut();
        let wait_delay = core.settings.wait_delay_on_loop;
        let p = &mut core.progress;
        p.current_elapsed = 0.0;
        p.delay_elapsed = 0.0;
        if p.is_playing {
            if !wait_delay {
                p.delay_elapsed = 1.0;
            }
            false
        } else {
            p.loops_elapsed = 0;
            p.is_paused = false;
            std::mem::take(&mut p.values_swapped)
        }
    };
    if swap_back {
        tween.swap_values();
    }
    tween.on_reset();
}

/// End of a run: loop again or finish. Shared by the scheduler and composites.
pub(crate) fn complete_run(tween: &TweenRef) {
    let key = tween.core().key;
    let Some(key) = key else {
        return;
    };

    let (loop_again, yoyo) = {
        let mut core = tween.core_mut();
        let yoyo = core.settings.loop_type == LoopType::Yoyo;
        let p = &mut core.progress;
        let again = p.starting_loop_count < 0 || p.loops_elapsed < p.starting_loop_count;
        if again && p.starting_loop_count >= 0 {
            p.loops_elapsed += 1;
        }
        (again, yoyo)
    };

    if loop_again {
        fire_logged(tween, TweenEvent::Repeat);
        if !still_current(tween, key) {
            return;
        }
        reset(tween);
        if yoyo && !tween.is_composite() {
            {
                let mut core = tween.core_mut();
                core.progress.values_swapped = !core.progress.values_swapped;
            }
            tween.swap_values();
        }
    } else {
        fire_logged(tween, TweenEvent::End);
        if still_current(tween, key) {
            stop(tween);
        }
    }
}

/// Change the delay; an in-flight delay keeps its elapsed seconds.
pub(crate) fn set_delay(tween: &TweenRef, delay: f32) {
    let delay = delay.max(0.0);
    let mut core = tween.core_mut();
    core.settings.delay = delay;
    let p = &mut core.progress;
    if (p.is_playing || p.is_paused) && p.delay_elapsed < 1.0 {
        let waited = p.delay_elapsed * p.starting_delay;
        p.starting_delay = delay;
        if delay > 0.0 {
            p.delay_elapsed = (waited / delay).min(1.0);
        }
    }
}

/// Common controls shared by every tween handle type.
///
/// `with_*` methods consume and return the handle so configuration chains;
/// settings that are snapshotted by `play` only affect the next fresh play.
pub trait TweenHandle: Sized {
    fn tween_ref(&self) -> TweenRef;

    fn is_playing(&self) -> bool {
        self.tween_ref().core().progress.is_playing
    }

    fn is_paused(&self) -> bool {
        self.tween_ref().core().progress.is_paused
    }

    fn is_valid(&self) -> bool {
        self.tween_ref().is_valid()
    }

    fn progress(&self) -> TweenProgress {
        self.tween_ref().core().progress.clone()
    }

    fn settings(&self) -> TweenSettings {
        self.tween_ref().core().settings.clone()
    }

    fn duration(&self) -> f32 {
        self.tween_ref().duration()
    }

    fn owner(&self) -> Option<OwnerId> {
        self.tween_ref().core().owner
    }

    fn pause(&self) {
        pause(&self.tween_ref());
    }

    fn stop(&self) {
        stop(&self.tween_ref());
    }

    fn reset(&self) {
        reset(&self.tween_ref());
    }

    // -- Builder methods --

    fn with_delay(self, delay: f32) -> Self {
        self.tween_ref().core_mut().settings.delay = delay.max(0.0);
        self
    }

    fn with_loop_count(self, loop_count: i32) -> Self {
        self.tween_ref().core_mut().settings.loop_count = loop_count;
        self
    }

    fn with_loop_type(self, loop_type: LoopType) -> Self {
        self.tween_ref().core_mut().settings.loop_type = loop_type;
        self
    }

    fn with_wait_delay_on_loop(self, wait: bool) -> Self {
        self.tween_ref().core_mut().settings.wait_delay_on_loop = wait;
        self
    }

    fn with_speed(self, speed: f32) -> Self {
        self.tween_ref().core_mut().settings.speed = speed.max(0.0);
        self
    }

    fn with_tick_category(self, category: TickCategory) -> Self {
        self.tween_ref().core_mut().settings.tick_category = category;
        self
    }

    fn with_ignore_timescale(self, ignore: bool) -> Self {
        self.tween_ref().core_mut().settings.ignore_timescale = ignore;
        self
    }

    /// Hook consulted before each advancement; see [`TickSuspend`].
    fn with_tick_condition<F>(self, mut condition: F) -> Self
    where
        F: FnMut() -> TickSuspend + 'static,
    {
        let condition: TickCondition = Rc::new(RefCell::new(
            move || -> Result<TickSuspend, CallbackError> { Ok(condition()) },
        ));
        self.tween_ref().core_mut().tick_condition = Some(condition);
        self
    }

    /// Tick condition that may fail; a failure stops the tween.
    fn with_try_tick_condition<F, E>(self, mut condition: F) -> Self
    where
        F: FnMut() -> Result<TickSuspend, E> + 'static,
        E: Into<crate::core::error::BoxError>,
    {
        let condition: TickCondition = Rc::new(RefCell::new(
            move || -> Result<TickSuspend, CallbackError> {
                condition().map_err(|e| CallbackError::Callback(e.into()))
            },
        ));
        self.tween_ref().core_mut().tick_condition = Some(condition);
        self
    }

    fn with_id(self, id: i64) -> Self {
        self.tween_ref().core_mut().owner = Some(OwnerId(id));
        self
    }

    /// Correlate with an owner object through the scheduler's id provider.
    fn with_owner<O: Any>(self, owner: &O) -> Self {
        let tween = self.tween_ref();
        let id = tween.core().scheduler.id_of(owner);
        tween.core_mut().owner = Some(id);
        self
    }

    fn with_event<F, R>(self, event: TweenEvent, f: F, mode: EventSetMode) -> Self
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.tween_ref().core_mut().events.set(event, handler(f), mode);
        self
    }

    fn on_play<F, R>(self, f: F) -> Self
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.with_event(TweenEvent::Play, f, EventSetMode::Add)
    }

    fn on_start<F, R>(self, f: F) -> Self
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.with_event(TweenEvent::Start, f, EventSetMode::Add)
    }

    fn on_tick<F, R>(self, f: F) -> Self
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.with_event(TweenEvent::Tick, f, EventSetMode::Add)
    }

    fn on_pause<F, R>(self, f: F) -> Self
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.with_event(TweenEvent::Pause, f, EventSetMode::Add)
    }

    fn on_repeat<F, R>(self, f: F) -> Self
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.with_event(TweenEvent::Repeat, f, EventSetMode::Add)
    }

    fn on_end<F, R>(self, f: F) -> Self
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.with_event(TweenEvent::End, f, EventSetMode::Add)
    }

    fn on_stop<F, R>(self, f: F) -> Self
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.with_event(TweenEvent::Stop, f, EventSetMode::Add)
    }

    // -- Runtime mutators --

    /// Change the delay. While delaying, the seconds already waited are kept.
    fn set_delay(&self, delay: f32) {
        set_delay(&self.tween_ref(), delay);
    }

    /// Change the speed; applies from the next tick.
    fn set_speed(&self, speed: f32) {
        self.tween_ref().core_mut().settings.speed = speed.max(0.0);
    }

    /// Only takes effect on the next fresh play.
    fn set_loop_count(&self, loop_count: i32) {
        self.tween_ref().core_mut().settings.loop_count = loop_count;
    }

    /// Add a listener and get its id for later removal.
    fn add_listener<F, R>(&self, event: TweenEvent, f: F) -> ListenerId
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.tween_ref().core_mut().events.add(event, handler(f))
    }

    fn remove_listener(&self, event: TweenEvent, id: ListenerId) -> bool {
        self.tween_ref().core_mut().events.remove(event, id)
    }

    fn clear_listeners(&self, event: TweenEvent) {
        self.tween_ref().core_mut().events.clear(event);
    }

    fn clear_tick_condition(&self) {
        self.tween_ref().core_mut().tick_condition = None;
    }
}
