// tween/context.rs
//
// Typed tween: binds a tweenable to one (start, end, setter) triple.
// Evaluate = easing → lerp → setter. The setter is the only side effect.
//
// Usage:
//   let x = Rc::new(Cell::new(0.0));
//   let sink = Rc::clone(&x);
//   let tween = scheduler.context(0.0_f32, 10.0)
//       .with_duration(0.5)
//       .with_ease(EaseType::QuadOut)
//       .with_setter(move |v| sink.set(v));
//   tween.play();

use std::any::type_name;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::api::config::TweenSettings;
use crate::core::error::{CallbackError, CallbackResult, IntoCallbackResult, TweenError};
use crate::extensions::curve::EaseCurve;
use crate::extensions::easing::{EaseType, Lerp};
use crate::systems::scheduler::SchedulerHandle;
use crate::tween::tweenable::{self, TweenCore, TweenHandle, TweenRef, Tweenable};

pub type Setter<T> = Rc<RefCell<dyn FnMut(T) -> CallbackResult>>;
pub type Getter<T> = Rc<RefCell<dyn FnMut() -> T>>;
pub type LerpFn<T> = Rc<dyn Fn(&T, &T, f32) -> T>;

struct ContextValues<T> {
    start: Option<T>,
    end: Option<T>,
    current: Option<T>,
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
    lerp: LerpFn<T>,
}

/// Tweenable state behind a [`TweenContext`].
pub struct ContextState<T> {
    core: RefCell<TweenCore>,
    values: RefCell<ContextValues<T>>,
}

impl<T: Clone + 'static> Tweenable for ContextState<T> {
    fn core(&self) -> Ref<'_, TweenCore> {
        self.core.borrow()
    }

    fn core_mut(&self) -> RefMut<'_, TweenCore> {
        self.core.borrow_mut()
    }

    fn is_valid(&self) -> bool {
        let v = self.values.borrow();
        v.setter.is_some() && v.end.is_some() && (v.start.is_some() || v.getter.is_some())
    }

    fn evaluate(&self, phase: f32) -> CallbackResult {
        let eased = self.core.borrow().settings.ease_phase(phase);
        let (value, setter) = {
            let v = self.values.borrow();
            let (Some(start), Some(end)) = (v.start.as_ref(), v.end.as_ref()) else {
                return Err(CallbackError::MissingValue("start or end value"));
            };
            let Some(setter) = v.setter.clone() else {
                return Err(CallbackError::MissingValue("setter"));
            };
            ((v.lerp)(start, end, eased), setter)
        };
        self.values.borrow_mut().current = Some(value.clone());

        let mut f = setter
            .try_borrow_mut()
            .map_err(|_| CallbackError::Reentrant("setter"))?;
        (*f)(value)
    }

    fn swap_values(&self) {
        let mut v = self.values.borrow_mut();
        let v = &mut *v;
        std::mem::swap(&mut v.start, &mut v.end);
    }

    fn describe(&self) -> String {
        let core = self.core.borrow();
        format!(
            "TweenContext<{}>(duration {}, delay {}, loops {}, playing {})",
            type_name::<T>(),
            core.settings.duration,
            core.settings.delay,
            core.settings.loop_count,
            core.progress.is_playing,
        )
    }

    fn prepare_play(&self) -> CallbackResult {
        let getter = self.values.borrow().getter.clone();
        if let Some(getter) = getter {
            let value = {
                let mut g = getter
                    .try_borrow_mut()
                    .map_err(|_| CallbackError::Reentrant("getter"))?;
                (*g)()
            };
            self.values.borrow_mut().start = Some(value);
        }
        Ok(())
    }
}

/// Handle to a typed tween. Cloning shares the same tween.
pub struct TweenContext<T> {
    inner: Rc<ContextState<T>>,
}

impl<T> Clone for TweenContext<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Lerp + 'static> TweenContext<T> {
    /// Tween from `start` to `end` using `T`'s [`Lerp`].
    pub fn new(scheduler: SchedulerHandle, start: T, end: T) -> Self {
        Self::build(scheduler, Some(start), Some(end), Rc::new(|a: &T, b: &T, t: f32| a.lerp(b, t)))
    }

    /// Tween with no values yet; configure them before playing.
    pub fn empty(scheduler: SchedulerHandle) -> Self {
        Self::build(scheduler, None, None, Rc::new(|a: &T, b: &T, t: f32| a.lerp(b, t)))
    }
}

impl<T: Clone + 'static> TweenContext<T> {
    /// Tween for a type without a [`Lerp`] impl, using a custom interpolation.
    pub fn with_lerp_fn<L>(scheduler: SchedulerHandle, start: T, end: T, lerp: L) -> Self
    where
        L: Fn(&T, &T, f32) -> T + 'static,
    {
        Self::build(scheduler, Some(start), Some(end), Rc::new(lerp))
    }

    fn build(scheduler: SchedulerHandle, start: Option<T>, end: Option<T>, lerp: LerpFn<T>) -> Self {
        Self {
            inner: Rc::new(ContextState {
                core: RefCell::new(TweenCore::new(scheduler)),
                values: RefCell::new(ContextValues {
                    start,
                    end,
                    current: None,
                    getter: None,
                    setter: None,
                    lerp,
                }),
            }),
        }
    }

    /// Start, restart or resume the tween.
    pub fn play(&self) {
        tweenable::play(&self.tween_ref());
    }

    /// Explain why the tween would refuse to play.
    pub fn validate(&self) -> Result<(), TweenError> {
        if !self.inner.core.borrow().scheduler().is_alive() {
            return Err(TweenError::SchedulerDropped);
        }
        let v = self.inner.values.borrow();
        if v.setter.is_none() {
            return Err(TweenError::MissingSetter);
        }
        if v.end.is_none() {
            return Err(TweenError::MissingValue("end value"));
        }
        if v.start.is_none() && v.getter.is_none() {
            return Err(TweenError::MissingValue("start value or getter"));
        }
        Ok(())
    }

    // -- Builder methods --

    /// Seconds per run. Snapshotted by `play`.
    pub fn with_duration(self, duration: f32) -> Self {
        self.inner.core.borrow_mut().settings.duration = duration.max(0.0);
        self
    }

    pub fn with_ease(self, ease: EaseType) -> Self {
        self.inner.core.borrow_mut().settings.ease = ease;
        self
    }

    /// Sampled easing curve; overrides the ease type.
    pub fn with_ease_curve(self, curve: EaseCurve) -> Self {
        self.inner.core.borrow_mut().settings.ease_curve = Some(curve);
        self
    }

    pub fn with_clamp_easing_output(self, clamp: bool) -> Self {
        self.inner.core.borrow_mut().settings.clamp_easing_output = clamp;
        self
    }

    /// Replace the whole settings block.
    pub fn with_settings(self, settings: TweenSettings) -> Self {
        self.inner.core.borrow_mut().settings = settings;
        self
    }

    pub fn with_start_value(self, start: T) -> Self {
        self.set_start_value(start);
        self
    }

    /// Read the start value from `getter` on every fresh play.
    pub fn with_start_getter<G>(self, getter: G) -> Self
    where
        G: FnMut() -> T + 'static,
    {
        let getter: Getter<T> = Rc::new(RefCell::new(getter));
        self.inner.values.borrow_mut().getter = Some(getter);
        self
    }

    pub fn with_end_value(self, end: T) -> Self {
        self.set_end_value(end);
        self
    }

    pub fn with_setter<F, R>(self, setter: F) -> Self
    where
        F: FnMut(T) -> R + 'static,
        R: IntoCallbackResult,
    {
        self.set_setter(setter);
        self
    }

    // -- Runtime mutators --

    /// Only takes effect on the next fresh play.
    pub fn set_duration(&self, duration: f32) {
        self.inner.core.borrow_mut().settings.duration = duration.max(0.0);
    }

    pub fn set_start_value(&self, start: T) {
        self.inner.values.borrow_mut().start = Some(start);
    }

    pub fn set_end_value(&self, end: T) {
        self.inner.values.borrow_mut().end = Some(end);
    }

    pub fn set_setter<F, R>(&self, mut setter: F)
    where
        F: FnMut(T) -> R + 'static,
        R: IntoCallbackResult,
    {
        let setter: Setter<T> = Rc::new(RefCell::new(move |value: T| setter(value).into_callback_result()));
        self.inner.values.borrow_mut().setter = Some(setter);
    }

    /// Remove the setter. A playing tween is dropped by the scheduler on its next tick.
    pub fn clear_setter(&self) {
        self.inner.values.borrow_mut().setter = None;
    }

    // -- Accessors --

    pub fn start_value(&self) -> Option<T> {
        self.inner.values.borrow().start.clone()
    }

    pub fn end_value(&self) -> Option<T> {
        self.inner.values.borrow().end.clone()
    }

    /// Last value handed to the setter.
    pub fn current_value(&self) -> Option<T> {
        self.inner.values.borrow().current.clone()
    }
}

impl<T: Clone + 'static> TweenHandle for TweenContext<T> {
    fn tween_ref(&self) -> TweenRef {
        let tween: TweenRef = self.inner.clone();
        tween
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{LoopType, TweenEvent};
    use crate::testing::{approx, manual_scheduler};
    use std::cell::Cell;

    fn recorder() -> (Rc<RefCell<Vec<f32>>>, impl FnMut(f32) + 'static) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&values);
        (values, move |v| sink.borrow_mut().push(v))
    }

    #[test]
    fn quarter_steps_reach_the_end_value() {
        let (scheduler, runner, _) = manual_scheduler();
        let (values, setter) = recorder();
        let ended = Rc::new(Cell::new(false));
        let e = Rc::clone(&ended);
        let tween = scheduler
            .context(0.0_f32, 10.0)
            .with_duration(1.0)
            .with_setter(setter)
            .on_end(move || e.set(true));
        tween.play();

        for _ in 0..4 {
            runner.step(&scheduler, 0.25);
        }

        let values = values.borrow();
        assert_eq!(values.len(), 4);
        for (got, want) in values.iter().zip([2.5, 5.0, 7.5, 10.0]) {
            assert!(approx(*got, want), "got {} want {}", got, want);
        }
        assert!(ended.get());
        assert!(!tween.is_playing());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn completes_after_duration_of_scaled_time() {
        let (scheduler, runner, _) = manual_scheduler();
        let (values, setter) = recorder();
        let tween = scheduler.context(-4.0_f32, 4.0).with_duration(0.5).with_setter(setter);
        tween.play();

        let mut frames = 0;
        while tween.is_playing() && frames < 100 {
            runner.step(&scheduler, 1.0 / 60.0);
            frames += 1;
        }
        assert!(!tween.is_playing());
        assert_eq!(*values.borrow().last().unwrap(), 4.0);
        assert!((30..=32).contains(&frames), "took {} frames", frames);
    }

    #[test]
    fn instant_tween_resolves_in_one_pass() {
        let (scheduler, runner, _) = manual_scheduler();
        let (values, setter) = recorder();
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&order), Rc::clone(&order));
        let tween = scheduler
            .context(1.0_f32, 9.0)
            .with_duration(0.0)
            .with_setter(setter)
            .on_start(move || a.borrow_mut().push("start"))
            .on_end(move || b.borrow_mut().push("end"));
        tween.play();
        runner.step(&scheduler, 0.016);

        assert_eq!(*values.borrow(), vec![9.0]);
        assert_eq!(*order.borrow(), vec!["start", "end"]);
        assert!(!tween.is_playing());
    }

    #[test]
    fn start_fires_once_after_delay_and_nothing_evaluates_before() {
        let (scheduler, runner, _) = manual_scheduler();
        let (values, setter) = recorder();
        let starts = Rc::new(Cell::new(0));
        let s = Rc::clone(&starts);
        let tween = scheduler
            .context(0.0_f32, 1.0)
            .with_duration(1.0)
            .with_delay(0.5)
            .with_setter(setter)
            .on_start(move || s.set(s.get() + 1));
        tween.play();

        runner.step(&scheduler, 0.25);
        assert_eq!(starts.get(), 0);
        assert!(values.borrow().is_empty());
        assert!(approx(tween.progress().delay_elapsed, 0.5));

        runner.step(&scheduler, 0.25);
        assert_eq!(starts.get(), 1);
        assert!(values.borrow().is_empty(), "delay-completing tick must not evaluate");

        runner.step(&scheduler, 0.25);
        runner.step(&scheduler, 0.25);
        assert_eq!(starts.get(), 1);
        assert_eq!(values.borrow().len(), 2);
    }

    #[test]
    fn loop_delay_repeats_only_when_requested() {
        fn run(wait: bool) -> (u32, u32) {
            let (scheduler, runner, _) = manual_scheduler();
            let starts = Rc::new(Cell::new(0));
            let s = Rc::clone(&starts);
            let tween = scheduler
                .context(0.0_f32, 1.0)
                .with_duration(0.5)
                .with_delay(0.5)
                .with_loop_count(2)
                .with_wait_delay_on_loop(wait)
                .with_setter(|_| ())
                .on_start(move || s.set(s.get() + 1));
            tween.play();

            let mut steps = 0;
            while tween.is_playing() && steps < 100 {
                runner.step(&scheduler, 0.25);
                steps += 1;
            }
            (starts.get(), steps)
        }

        // Three runs of two steps each, plus two delay steps per waited delay.
        assert_eq!(run(false), (1, 8));
        assert_eq!(run(true), (3, 12));
    }

    #[test]
    fn loop_count_gives_n_plus_one_runs() {
        let (scheduler, runner, _) = manual_scheduler();
        let repeats = Rc::new(Cell::new(0));
        let ends = Rc::new(Cell::new(0));
        let max_loops = Rc::new(Cell::new(0));
        let (r, e) = (Rc::clone(&repeats), Rc::clone(&ends));
        let tween = scheduler
            .context(0.0_f32, 1.0)
            .with_duration(0.5)
            .with_loop_count(3)
            .with_setter(|_| ())
            .on_repeat(move || r.set(r.get() + 1))
            .on_end(move || e.set(e.get() + 1));
        tween.play();

        for _ in 0..20 {
            runner.step(&scheduler, 0.25);
            max_loops.set(max_loops.get().max(tween.progress().loops_elapsed));
        }
        assert_eq!(repeats.get(), 3);
        assert_eq!(ends.get(), 1);
        assert!(max_loops.get() <= 3);
        assert!(!tween.is_playing());
    }

    #[test]
    fn infinite_loop_never_stops_on_its_own() {
        let (scheduler, runner, _) = manual_scheduler();
        let repeats = Rc::new(Cell::new(0));
        let r = Rc::clone(&repeats);
        let tween = scheduler
            .context(0.0_f32, 1.0)
            .with_duration(0.1)
            .with_loop_count(-1)
            .with_setter(|_| ())
            .on_repeat(move || r.set(r.get() + 1));
        tween.play();

        for _ in 0..1000 {
            runner.step(&scheduler, 0.1);
        }
        assert!(tween.is_playing());
        assert!(repeats.get() >= 999);
        assert_eq!(tween.progress().loops_elapsed, 0);

        tween.stop();
        assert!(!tween.is_playing());
    }

    #[test]
    fn yoyo_swaps_on_odd_loops() {
        let (scheduler, runner, _) = manual_scheduler();
        let tween = scheduler
            .context(0.0_f32, 10.0)
            .with_duration(1.0)
            .with_loop_count(-1)
            .with_loop_type(LoopType::Yoyo)
            .with_setter(|_| ());
        tween.play();

        for completed in 1..=4 {
            runner.step(&scheduler, 1.0);
            let (start, end) = (tween.start_value().unwrap(), tween.end_value().unwrap());
            if completed % 2 == 1 {
                assert_eq!((start, end), (10.0, 0.0), "after {} loops", completed);
            } else {
                assert_eq!((start, end), (0.0, 10.0), "after {} loops", completed);
            }
        }

        runner.step(&scheduler, 1.0);
        tween.stop();
        assert_eq!(tween.start_value(), Some(0.0));
        assert_eq!(tween.end_value(), Some(10.0));
    }

    #[test]
    fn yoyo_runs_back_to_start() {
        let (scheduler, runner, _) = manual_scheduler();
        let (values, setter) = recorder();
        let tween = scheduler
            .context(0.0_f32, 10.0)
            .with_duration(1.0)
            .with_loop_count(1)
            .with_loop_type(LoopType::Yoyo)
            .with_setter(setter);
        tween.play();
        for _ in 0..4 {
            runner.step(&scheduler, 0.5);
        }
        let values = values.borrow();
        assert_eq!(*values, vec![5.0, 10.0, 5.0, 0.0]);
        assert!(!tween.is_playing());
    }

    #[test]
    fn stop_is_idempotent() {
        let (scheduler, _, _) = manual_scheduler();
        let stops = Rc::new(Cell::new(0));
        let s = Rc::clone(&stops);
        let tween = scheduler
            .context(0.0_f32, 1.0)
            .with_setter(|_| ())
            .on_stop(move || s.set(s.get() + 1));

        tween.stop();
        tween.stop();
        assert!(!tween.is_playing());
        assert_eq!(tween.progress().current_elapsed, 0.0);
        assert_eq!(stops.get(), 2);
    }

    #[test]
    fn play_while_playing_restarts() {
        let (scheduler, runner, _) = manual_scheduler();
        let (values, setter) = recorder();
        let stops = Rc::new(Cell::new(0));
        let s = Rc::clone(&stops);
        let tween = scheduler
            .context(0.0_f32, 4.0)
            .with_duration(1.0)
            .with_setter(setter)
            .on_stop(move || s.set(s.get() + 1));
        tween.play();
        runner.step(&scheduler, 0.5);
        tween.play();
        runner.step(&scheduler, 0.25);

        assert_eq!(stops.get(), 1);
        assert_eq!(*values.borrow(), vec![2.0, 1.0]);
        assert_eq!(scheduler.active_count(), 1);
    }

    #[test]
    fn pause_then_play_resumes_progress() {
        let (scheduler, runner, _) = manual_scheduler();
        let (values, setter) = recorder();
        let pauses = Rc::new(Cell::new(0));
        let p = Rc::clone(&pauses);
        let tween = scheduler
            .context(0.0_f32, 1.0)
            .with_duration(1.0)
            .with_setter(setter)
            .on_pause(move || p.set(p.get() + 1));
        tween.play();
        runner.step(&scheduler, 0.5);
        tween.pause();
        assert!(!tween.is_playing());
        assert!(scheduler.is_empty());

        runner.step(&scheduler, 0.5);
        assert_eq!(values.borrow().len(), 1);

        tween.play();
        runner.step(&scheduler, 0.25);
        assert_eq!(*values.borrow(), vec![0.5, 0.75]);
        assert_eq!(pauses.get(), 1);
    }

    #[test]
    fn pause_mid_delay_keeps_waited_time() {
        let (scheduler, runner, _) = manual_scheduler();
        let tween = scheduler
            .context(0.0_f32, 1.0)
            .with_delay(1.0)
            .with_setter(|_| ());
        tween.play();
        runner.step(&scheduler, 0.5);
        tween.pause();
        tween.play();
        assert!(approx(tween.progress().delay_elapsed, 0.5));
    }

    #[test]
    fn duration_change_after_play_waits_for_next_run() {
        let (scheduler, runner, _) = manual_scheduler();
        let tween = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ());
        tween.play();
        tween.set_duration(4.0);
        runner.step(&scheduler, 0.5);
        assert!(approx(tween.progress().current_elapsed, 0.5));

        tween.play();
        runner.step(&scheduler, 0.5);
        assert!(approx(tween.progress().current_elapsed, 0.125));
    }

    #[test]
    fn set_delay_while_waiting_is_proportional() {
        let (scheduler, runner, _) = manual_scheduler();
        let tween = scheduler.context(0.0_f32, 1.0).with_delay(1.0).with_setter(|_| ());
        tween.play();
        runner.step(&scheduler, 0.5);
        tween.set_delay(2.0);
        assert!(approx(tween.progress().delay_elapsed, 0.25));
        runner.step(&scheduler, 1.5);
        assert_eq!(tween.progress().delay_elapsed, 1.0);
    }

    #[test]
    fn getter_refreshes_start_on_fresh_play() {
        let (scheduler, runner, _) = manual_scheduler();
        let source = Rc::new(Cell::new(3.0_f32));
        let read = Rc::clone(&source);
        let (values, setter) = recorder();
        let tween = TweenContext::<f32>::empty(scheduler.handle())
            .with_start_getter(move || read.get())
            .with_end_value(5.0)
            .with_duration(1.0)
            .with_setter(setter);

        tween.play();
        runner.step(&scheduler, 0.5);
        assert_eq!(*values.borrow(), vec![4.0]);

        tween.stop();
        source.set(1.0);
        tween.play();
        runner.step(&scheduler, 0.5);
        assert_eq!(values.borrow()[1], 3.0);
    }

    #[test]
    fn missing_setter_is_not_played() {
        let (scheduler, _, logger) = manual_scheduler();
        let tween = scheduler.context(0.0_f32, 1.0);
        assert!(!tween.is_valid());
        tween.play();
        assert!(!tween.is_playing());
        assert!(scheduler.is_empty());
        assert!(logger.contains_warning("not valid"));
    }

    #[test]
    fn validate_names_the_missing_piece() {
        let (scheduler, _, _) = manual_scheduler();
        let tween = TweenContext::<f32>::empty(scheduler.handle());
        assert!(matches!(tween.validate(), Err(TweenError::MissingSetter)));
        tween.set_setter(|_| ());
        assert!(matches!(tween.validate(), Err(TweenError::MissingValue("end value"))));
        tween.set_end_value(1.0);
        assert!(matches!(tween.validate(), Err(TweenError::MissingValue(_))));
        tween.set_start_value(0.0);
        assert!(tween.validate().is_ok());

        drop(scheduler);
        assert!(matches!(tween.validate(), Err(TweenError::SchedulerDropped)));
    }

    #[test]
    fn custom_lerp_for_foreign_type() {
        let (scheduler, runner, _) = manual_scheduler();
        let last = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&last);
        let word = "tweening".to_string();
        let tween = TweenContext::with_lerp_fn(
            scheduler.handle(),
            0_usize,
            word.len(),
            |a: &usize, b: &usize, t| a + ((*b - *a) as f32 * t).round() as usize,
        )
        .with_duration(1.0)
        .with_setter(move |n: usize| *sink.borrow_mut() = word[..n].to_string());
        tween.play();
        runner.step(&scheduler, 0.5);
        assert_eq!(*last.borrow(), "twee");
        assert_eq!(tween.current_value(), Some(4));
    }

    #[test]
    fn listener_removal_by_id() {
        let (scheduler, runner, _) = manual_scheduler();
        let ticks = Rc::new(Cell::new(0));
        let t = Rc::clone(&ticks);
        let tween = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ());
        let id = tween.add_listener(TweenEvent::Tick, move || t.set(t.get() + 1));
        tween.play();
        runner.step(&scheduler, 0.1);
        assert!(tween.remove_listener(TweenEvent::Tick, id));
        runner.step(&scheduler, 0.1);
        assert_eq!(ticks.get(), 1);
    }
}
