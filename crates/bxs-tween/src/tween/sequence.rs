// tween/sequence.rs
//
// Composite tween: children grouped by priority.
//   Same priority  → run together (join).
//   Next priority  → runs once every child of the previous group stopped (append).
//
// The sequence sits in the scheduler like any tween (its own delay and tick
// condition apply); once its delay is over the scheduler hands control to
// `run_children`, which starts the first group. Each group installs stop
// hooks on its children and the last hook to fire starts the next group.
//
// Usage:
//   let seq = scheduler.sequence();
//   seq.append(&fade_in).join(&slide).append(&fade_out);
//   seq.play()?;

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use crate::api::types::TweenEvent;
use crate::core::error::{CallbackError, CallbackResult, IntoCallbackResult, TweenError};
use crate::systems::scheduler::SchedulerHandle;
use crate::tween::events::{handler, ListenerId, Listeners};
use crate::tween::tweenable::{self, same_tween, TweenCore, TweenHandle, TweenRef, Tweenable};

/// Listener for a child finishing its last run: `(priority, child)`.
pub type ChildEndedHandler = Rc<RefCell<dyn FnMut(usize, TweenRef) -> CallbackResult>>;

struct ChildHooks {
    end: ListenerId,
    stop: ListenerId,
}

struct SequenceEntry {
    priority: usize,
    tween: TweenRef,
    hooks: Option<ChildHooks>,
    done: bool,
}

#[derive(Default)]
struct SequenceInner {
    /// Sorted by priority; insertion order within a group.
    entries: Vec<SequenceEntry>,
    /// Priority group currently running.
    running: Option<usize>,
    child_ended: Listeners<dyn FnMut(usize, TweenRef) -> CallbackResult>,
}

impl SequenceInner {
    fn last_priority(&self) -> Option<usize> {
        self.entries.last().map(|e| e.priority)
    }

    fn group_count(&self) -> usize {
        self.last_priority().map_or(0, |p| p + 1)
    }

    fn group(&self, priority: usize) -> impl Iterator<Item = &SequenceEntry> {
        self.entries.iter().filter(move |e| e.priority == priority)
    }

    fn group_done(&self, priority: usize) -> bool {
        self.group(priority).all(|e| e.done)
    }

    /// Renumber priorities to 0..n, keeping their order.
    fn normalize(&mut self) {
        let mut next = 0;
        let mut previous = None;
        for entry in &mut self.entries {
            if previous != Some(entry.priority) {
                if previous.is_some() {
                    next += 1;
                }
                previous = Some(entry.priority);
            }
            entry.priority = next;
        }
    }

    fn entry_mut(&mut self, priority: usize, child: &TweenRef) -> Option<&mut SequenceEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.priority == priority && same_tween(&e.tween, child))
    }

    fn take_hooks(&mut self) -> Vec<(TweenRef, ChildHooks)> {
        self.entries
            .iter_mut()
            .filter_map(|e| e.hooks.take().map(|h| (Rc::clone(&e.tween), h)))
            .collect()
    }
}

fn remove_hooks(hooks: Vec<(TweenRef, ChildHooks)>) {
    for (child, hooks) in hooks {
        let mut core = child.core_mut();
        core.events.remove(TweenEvent::End, hooks.end);
        core.events.remove(TweenEvent::Stop, hooks.stop);
    }
}

/// Tweenable state behind a [`TweenSequence`].
pub struct SequenceState {
    core: RefCell<TweenCore>,
    inner: RefCell<SequenceInner>,
    this: Weak<SequenceState>,
}

impl SequenceState {
    fn as_tween(&self) -> Option<TweenRef> {
        let this: Rc<SequenceState> = self.this.upgrade()?;
        let tween: TweenRef = this;
        Some(tween)
    }

    /// Start every child of `priority`, then check whether the group is already over.
    fn start_group(&self, priority: usize) {
        let children: Vec<TweenRef> = {
            let mut inner = self.inner.borrow_mut();
            inner.running = Some(priority);
            let mut children: Vec<TweenRef> = Vec::new();
            for entry in inner.entries.iter_mut().filter(|e| e.priority == priority) {
                entry.done = false;
                if !children.iter().any(|c| same_tween(c, &entry.tween)) {
                    children.push(Rc::clone(&entry.tween));
                }
            }
            children
        };

        // Restart children the host left running, before the hooks exist.
        for child in &children {
            let progress = child.core().progress.clone();
            if progress.is_playing || progress.is_paused {
                tweenable::stop(child);
            }
        }

        for child in &children {
            // Hooks live in the child's own listener lists, so they hold it weakly.
            let end = {
                let weak = self.this.clone();
                let target = Rc::downgrade(child);
                handler(move || -> CallbackResult {
                    match (weak.upgrade(), target.upgrade()) {
                        (Some(seq), Some(child)) => seq.notify_child_ended(priority, &child),
                        _ => Ok(()),
                    }
                })
            };
            let stop = {
                let weak = self.this.clone();
                let target = Rc::downgrade(child);
                handler(move || {
                    if let (Some(seq), Some(child)) = (weak.upgrade(), target.upgrade()) {
                        seq.child_stopped(priority, &child);
                    }
                })
            };
            let hooks = {
                let mut core = child.core_mut();
                ChildHooks {
                    end: core.events.add(TweenEvent::End, end),
                    stop: core.events.add(TweenEvent::Stop, stop),
                }
            };
            let mut inner = self.inner.borrow_mut();
            if let Some(entry) = inner.entry_mut(priority, child) {
                entry.hooks = Some(hooks);
            }
        }

        for child in &children {
            if self.inner.borrow().running != Some(priority) {
                return;
            }
            tweenable::play(child);
            if !child.core().progress.is_playing {
                self.mark_done(priority, child);
            }
        }

        self.finish_group_if_done(priority);
    }

    /// A child may sit in several groups; only its entries in `priority` are marked.
    fn mark_done(&self, priority: usize, child: &TweenRef) {
        let mut inner = self.inner.borrow_mut();
        for entry in inner
            .entries
            .iter_mut()
            .filter(|e| e.priority == priority && same_tween(&e.tween, child))
        {
            entry.done = true;
        }
    }

    fn child_stopped(&self, priority: usize, child: &TweenRef) {
        if self.inner.borrow().running != Some(priority) {
            return;
        }
        self.mark_done(priority, child);
        self.finish_group_if_done(priority);
    }

    fn finish_group_if_done(&self, priority: usize) {
        // A paused sequence catches up in `run_children` once resumed.
        if !self.core.borrow().progress.is_playing {
            return;
        }
        let (finished, next, hooks) = {
            let mut inner = self.inner.borrow_mut();
            if inner.running != Some(priority) || !inner.group_done(priority) {
                return;
            }
            let hooks: Vec<(TweenRef, ChildHooks)> = inner
                .entries
                .iter_mut()
                .filter(|e| e.priority == priority)
                .filter_map(|e| e.hooks.take().map(|h| (Rc::clone(&e.tween), h)))
                .collect();
            let next = priority + 1;
            let has_next = next < inner.group_count();
            inner.running = if has_next { Some(next) } else { None };
            (!has_next, next, hooks)
        };
        remove_hooks(hooks);

        if !finished {
            self.start_group(next);
        } else if let Some(seq) = self.as_tween() {
            tweenable::complete_run(&seq);
        }
    }

    fn notify_child_ended(&self, priority: usize, child: &TweenRef) -> CallbackResult {
        let listeners = self.inner.borrow().child_ended.snapshot();
        for listener in listeners {
            let mut f = listener
                .try_borrow_mut()
                .map_err(|_| CallbackError::Reentrant("on_child_ended"))?;
            (*f)(priority, Rc::clone(child))?;
        }
        Ok(())
    }

    fn running_children(&self) -> Vec<TweenRef> {
        let inner = self.inner.borrow();
        match inner.running {
            Some(priority) => inner.group(priority).map(|e| Rc::clone(&e.tween)).collect(),
            None => Vec::new(),
        }
    }
}

impl Tweenable for SequenceState {
    fn core(&self) -> Ref<'_, TweenCore> {
        self.core.borrow()
    }

    fn core_mut(&self) -> RefMut<'_, TweenCore> {
        self.core.borrow_mut()
    }

    fn is_valid(&self) -> bool {
        !self.inner.borrow().entries.is_empty()
    }

    fn evaluate(&self, _phase: f32) -> CallbackResult {
        Ok(())
    }

    /// Sum over groups of the longest `duration + delay` in each group.
    fn duration(&self) -> f32 {
        let children: Vec<(usize, TweenRef)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|e| (e.priority, Rc::clone(&e.tween)))
            .collect();
        let mut total = 0.0;
        let mut group: Option<usize> = None;
        let mut longest: f32 = 0.0;
        for (priority, child) in children {
            if group != Some(priority) {
                total += longest;
                longest = 0.0;
                group = Some(priority);
            }
            let span = child.duration() + child.core().settings.delay;
            longest = longest.max(span);
        }
        total + longest
    }

    fn describe(&self) -> String {
        let inner = self.inner.borrow();
        format!(
            "TweenSequence(children {}, groups {}, running {:?})",
            inner.entries.len(),
            inner.group_count(),
            inner.running,
        )
    }

    fn is_composite(&self) -> bool {
        true
    }

    fn run_children(&self) -> CallbackResult {
        let running = self.inner.borrow().running;
        match running {
            None => self.start_group(0),
            Some(priority) => {
                // Children dropped by the scheduler (e.g. invalidated) never fire stop hooks.
                let stale: Vec<TweenRef> = self
                    .running_children()
                    .into_iter()
                    .filter(|c| {
                        let p = &c.core().progress;
                        !p.is_playing && !p.is_paused
                    })
                    .collect();
                for child in &stale {
                    self.mark_done(priority, child);
                }
                self.finish_group_if_done(priority);
            }
        }
        Ok(())
    }

    fn on_paused(&self) {
        for child in self.running_children() {
            tweenable::pause(&child);
        }
    }

    fn on_resumed(&self) {
        for child in self.running_children() {
            if child.core().progress.is_paused {
                tweenable::play(&child);
            }
        }
    }

    fn on_stopped(&self) {
        let (hooks, children) = {
            let mut inner = self.inner.borrow_mut();
            inner.running = None;
            let hooks = inner.take_hooks();
            let children: Vec<TweenRef> = inner.entries.iter().map(|e| Rc::clone(&e.tween)).collect();
            (hooks, children)
        };
        remove_hooks(hooks);
        for child in children {
            let progress = child.core().progress.clone();
            if progress.is_playing || progress.is_paused {
                tweenable::stop(&child);
            }
        }
    }

    fn on_reset(&self) {
        let hooks = {
            let mut inner = self.inner.borrow_mut();
            inner.running = None;
            for entry in &mut inner.entries {
                entry.done = false;
            }
            inner.take_hooks()
        };
        remove_hooks(hooks);
    }
}

/// Handle to a sequence. Cloning shares the same sequence.
#[derive(Clone)]
pub struct TweenSequence {
    inner: Rc<SequenceState>,
}

impl TweenSequence {
    pub fn new(scheduler: SchedulerHandle) -> Self {
        Self {
            inner: Rc::new_cyclic(|this| SequenceState {
                core: RefCell::new(TweenCore::new(scheduler)),
                inner: RefCell::new(SequenceInner::default()),
                this: this.clone(),
            }),
        }
    }

    /// Start the sequence (or resume it when paused).
    pub fn play(&self) -> Result<(), TweenError> {
        if self.inner.inner.borrow().entries.is_empty() {
            return Err(TweenError::EmptySequence);
        }
        if !self.inner.core.borrow().scheduler().is_alive() {
            return Err(TweenError::SchedulerDropped);
        }
        tweenable::play(&self.tween_ref());
        Ok(())
    }

    /// Run `child` after everything added so far.
    pub fn append<H: TweenHandle>(&self, child: &H) -> &Self {
        {
            let mut inner = self.inner.inner.borrow_mut();
            let priority = inner.last_priority().map_or(0, |p| p + 1);
            inner.entries.push(SequenceEntry {
                priority,
                tween: child.tween_ref(),
                hooks: None,
                done: false,
            });
        }
        self
    }

    /// Run `child` together with the last appended group.
    pub fn join<H: TweenHandle>(&self, child: &H) -> &Self {
        let last = self.inner.inner.borrow().last_priority();
        let Some(priority) = last else {
            let logger = self.inner.core.borrow().scheduler().logger();
            logger.log_warning("join on an empty sequence, appending instead");
            return self.append(child);
        };
        self.inner.inner.borrow_mut().entries.push(SequenceEntry {
            priority,
            tween: child.tween_ref(),
            hooks: None,
            done: false,
        });
        self
    }

    /// Run `child` before everything else.
    pub fn prepend<H: TweenHandle>(&self, child: &H) -> &Self {
        {
            let mut inner = self.inner.inner.borrow_mut();
            for entry in &mut inner.entries {
                entry.priority += 1;
            }
            if let Some(running) = inner.running.as_mut() {
                *running += 1;
            }
            inner.entries.insert(
                0,
                SequenceEntry {
                    priority: 0,
                    tween: child.tween_ref(),
                    hooks: None,
                    done: false,
                },
            );
        }
        self
    }

    /// Remove the child at `index` (in priority order).
    pub fn remove_at(&self, index: usize) -> Result<TweenRef, TweenError> {
        let mut inner = self.inner.inner.borrow_mut();
        let len = inner.entries.len();
        if index >= len {
            return Err(TweenError::IndexOutOfRange { index, len });
        }
        let entry = inner.entries.remove(index);
        inner.normalize();
        drop(inner);
        if let Some(hooks) = entry.hooks {
            remove_hooks(vec![(Rc::clone(&entry.tween), hooks)]);
        }
        Ok(entry.tween)
    }

    /// Child at `index` (in priority order).
    pub fn child(&self, index: usize) -> Result<TweenRef, TweenError> {
        let inner = self.inner.inner.borrow();
        inner
            .entries
            .get(index)
            .map(|e| Rc::clone(&e.tween))
            .ok_or(TweenError::IndexOutOfRange {
                index,
                len: inner.entries.len(),
            })
    }

    /// Priority group of the child at `index`.
    pub fn priority(&self, index: usize) -> Result<usize, TweenError> {
        let inner = self.inner.inner.borrow();
        inner
            .entries
            .get(index)
            .map(|e| e.priority)
            .ok_or(TweenError::IndexOutOfRange {
                index,
                len: inner.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.inner.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.inner.borrow().entries.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.inner.inner.borrow().group_count()
    }

    /// Priority group currently playing, if any.
    pub fn running_priority(&self) -> Option<usize> {
        self.inner.inner.borrow().running
    }

    /// Notified when a child finishes its last run.
    pub fn on_child_ended<F, R>(self, f: F) -> Self
    where
        F: FnMut(usize, TweenRef) -> R + 'static,
        R: IntoCallbackResult,
    {
        self.add_child_ended_listener(f);
        self
    }

    pub fn add_child_ended_listener<F, R>(&self, mut f: F) -> ListenerId
    where
        F: FnMut(usize, TweenRef) -> R + 'static,
        R: IntoCallbackResult,
    {
        let listener: ChildEndedHandler = Rc::new(RefCell::new(move |priority: usize, child: TweenRef| {
            f(priority, child).into_callback_result()
        }));
        self.inner.inner.borrow_mut().child_ended.add(listener)
    }

    pub fn remove_child_ended_listener(&self, id: ListenerId) -> bool {
        self.inner.inner.borrow_mut().child_ended.remove(id)
    }
}

impl TweenHandle for TweenSequence {
    fn tween_ref(&self) -> TweenRef {
        let tween: TweenRef = self.inner.clone();
        tween
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::manual_scheduler;
    use crate::tween::context::TweenContext;
    use std::cell::Cell;

    fn log_events(
        log: &Rc<RefCell<Vec<String>>>,
        name: &str,
        tween: TweenContext<f32>,
    ) -> TweenContext<f32> {
        let (a, b, c) = (Rc::clone(log), Rc::clone(log), Rc::clone(log));
        let (n1, n2, n3) = (name.to_string(), name.to_string(), name.to_string());
        tween
            .on_play(move || a.borrow_mut().push(format!("{} play", n1)))
            .on_end(move || b.borrow_mut().push(format!("{} end", n2)))
            .on_stop(move || c.borrow_mut().push(format!("{} stop", n3)))
    }

    #[test]
    fn appended_durations_add_up() {
        let (scheduler, runner, _) = manual_scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = log_events(&log, "a", scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ()));
        let b = log_events(&log, "b", scheduler.context(0.0_f32, 1.0).with_duration(2.0).with_setter(|_| ()));
        let seq = scheduler.sequence();
        seq.append(&a).append(&b);
        assert!((seq.duration() - 3.0).abs() < 1e-6);

        seq.play().unwrap();
        runner.step(&scheduler, 0.5);
        assert!(a.is_playing());
        assert!(!b.is_playing());

        while !b.is_playing() {
            runner.step(&scheduler, 0.5);
        }
        let log = log.borrow();
        let a_end = log.iter().position(|l| l == "a end").unwrap();
        let b_play = log.iter().position(|l| l == "b play").unwrap();
        assert!(a_end < b_play, "{:?}", log);
    }

    #[test]
    fn appended_group_waits_for_every_joined_child() {
        let (scheduler, runner, _) = manual_scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = log_events(&log, "a", scheduler.context(0.0_f32, 1.0).with_duration(0.5).with_setter(|_| ()));
        let b = log_events(&log, "b", scheduler.context(0.0_f32, 1.0).with_duration(1.5).with_setter(|_| ()));
        let c = log_events(&log, "c", scheduler.context(0.0_f32, 1.0).with_duration(0.5).with_setter(|_| ()));
        let seq_log = Rc::clone(&log);
        let seq = scheduler
            .sequence()
            .on_end(move || seq_log.borrow_mut().push("seq end".to_string()));
        seq.append(&a).join(&b).append(&c);
        assert_eq!(seq.group_count(), 2);
        assert!((seq.duration() - 2.0).abs() < 1e-6);

        seq.play().unwrap();
        for _ in 0..20 {
            runner.step(&scheduler, 0.25);
            if !a.is_playing() && b.is_playing() {
                assert!(!c.is_playing());
            }
        }

        let log = log.borrow();
        let pos = |needle: &str| log.iter().position(|l| l == needle).unwrap();
        assert!(pos("a end") < pos("c play"));
        assert!(pos("b end") < pos("c play"));
        assert!(pos("c end") < pos("seq end"));
        assert!(!seq.is_playing());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn child_reused_across_groups_runs_once_per_group() {
        let (scheduler, runner, _) = manual_scheduler();
        let starts = Rc::new(Cell::new(0));
        let ends = Rc::new(Cell::new(0));
        let (s, e) = (Rc::clone(&starts), Rc::clone(&ends));
        let a = scheduler
            .context(0.0_f32, 1.0)
            .with_duration(0.25)
            .with_setter(|_| ())
            .on_start(move || s.set(s.get() + 1))
            .on_end(move || e.set(e.get() + 1));
        let seq = scheduler.sequence();
        seq.append(&a).append(&a);
        assert_eq!(seq.group_count(), 2);
        assert!((seq.duration() - 0.5).abs() < 1e-6);

        seq.play().unwrap();
        for _ in 0..20 {
            runner.step(&scheduler, 0.25);
        }

        assert_eq!(starts.get(), 2);
        assert_eq!(ends.get(), 2);
        assert!(!seq.is_playing());
        assert_eq!(seq.running_priority(), None);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn child_joined_twice_does_not_stall_its_group() {
        let (scheduler, runner, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_duration(0.25).with_setter(|_| ());
        let b = scheduler.context(0.0_f32, 1.0).with_duration(0.25).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.append(&a).join(&a).append(&b);

        seq.play().unwrap();
        for _ in 0..20 {
            runner.step(&scheduler, 0.25);
        }
        assert!(!seq.is_playing());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn stopped_child_counts_as_finished() {
        let (scheduler, runner, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_duration(10.0).with_setter(|_| ());
        let b = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.append(&a).append(&b);
        seq.play().unwrap();
        runner.step(&scheduler, 0.1);
        assert!(a.is_playing());

        a.stop();
        assert!(b.is_playing());
        assert_eq!(seq.running_priority(), Some(1));
    }

    #[test]
    fn empty_sequence_is_an_error() {
        let (scheduler, _, _) = manual_scheduler();
        let seq = scheduler.sequence();
        assert!(matches!(seq.play(), Err(TweenError::EmptySequence)));
        assert!(!seq.is_playing());
    }

    #[test]
    fn join_on_empty_falls_back_to_append() {
        let (scheduler, _, logger) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.join(&a);
        assert_eq!(seq.priority(0).unwrap(), 0);
        assert!(logger.contains_warning("appending instead"));
    }

    #[test]
    fn prepend_shifts_existing_groups() {
        let (scheduler, _, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_setter(|_| ());
        let b = scheduler.context(0.0_f32, 1.0).with_setter(|_| ());
        let c = scheduler.context(0.0_f32, 1.0).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.append(&a).join(&b).prepend(&c);

        assert_eq!(seq.group_count(), 2);
        assert!(same_tween(&seq.child(0).unwrap(), &c.tween_ref()));
        assert_eq!(seq.priority(1).unwrap(), 1);
        assert_eq!(seq.priority(2).unwrap(), 1);
    }

    #[test]
    fn index_errors_surface() {
        let (scheduler, _, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.append(&a);
        assert!(matches!(
            seq.child(3),
            Err(TweenError::IndexOutOfRange { index: 3, len: 1 })
        ));
        assert!(seq.remove_at(1).is_err());
    }

    #[test]
    fn remove_keeps_priorities_contiguous() {
        let (scheduler, _, _) = manual_scheduler();
        let tweens: Vec<_> = (0..3)
            .map(|_| scheduler.context(0.0_f32, 1.0).with_setter(|_| ()))
            .collect();
        let seq = scheduler.sequence();
        for t in &tweens {
            seq.append(t);
        }
        seq.remove_at(1).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.priority(1).unwrap(), 1);
    }

    #[test]
    fn delay_counts_into_group_span() {
        let (scheduler, _, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_delay(0.5).with_setter(|_| ());
        let b = scheduler.context(0.0_f32, 1.0).with_duration(1.2).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.append(&a).join(&b);
        assert!((seq.duration() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn stop_stops_children_and_releases_them() {
        let (scheduler, runner, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ());
        let b = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.append(&a).append(&b);
        seq.play().unwrap();
        runner.step(&scheduler, 0.25);
        seq.stop();

        assert!(!a.is_playing());
        assert!(!b.is_playing());
        assert!(scheduler.is_empty());

        // Hooks are gone: playing a child alone does not wake the sequence.
        a.play();
        a.stop();
        assert!(!b.is_playing());
    }

    #[test]
    fn pause_and_resume_running_group() {
        let (scheduler, runner, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.append(&a);
        seq.play().unwrap();
        runner.step(&scheduler, 0.25);
        runner.step(&scheduler, 0.25);
        let before = a.progress().current_elapsed;

        seq.pause();
        assert!(a.is_paused());
        runner.step(&scheduler, 0.25);
        assert_eq!(a.progress().current_elapsed, before);

        seq.play().unwrap();
        assert!(a.is_playing());
        runner.step(&scheduler, 0.25);
        assert!(a.progress().current_elapsed > before);
    }

    #[test]
    fn child_ended_reports_priority() {
        let (scheduler, runner, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_duration(0.25).with_setter(|_| ());
        let b = scheduler.context(0.0_f32, 1.0).with_duration(0.25).with_setter(|_| ());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let seq = scheduler
            .sequence()
            .on_child_ended(move |priority, _child| s.borrow_mut().push(priority));
        seq.append(&a).append(&b);
        seq.play().unwrap();
        for _ in 0..6 {
            runner.step(&scheduler, 0.25);
        }
        assert_eq!(*seen.borrow(), vec![0, 1]);
    }

    #[test]
    fn looping_sequence_replays_groups() {
        let (scheduler, runner, _) = manual_scheduler();
        let plays = Rc::new(Cell::new(0));
        let p = Rc::clone(&plays);
        let a = scheduler
            .context(0.0_f32, 1.0)
            .with_duration(0.25)
            .with_setter(|_| ())
            .on_play(move || p.set(p.get() + 1));
        let repeats = Rc::new(Cell::new(0));
        let r = Rc::clone(&repeats);
        let seq = scheduler
            .sequence()
            .with_loop_count(2)
            .on_repeat(move || r.set(r.get() + 1));
        seq.append(&a);
        seq.play().unwrap();
        for _ in 0..20 {
            runner.step(&scheduler, 0.25);
        }
        assert_eq!(plays.get(), 3);
        assert_eq!(repeats.get(), 2);
        assert!(!seq.is_playing());
    }

    #[test]
    fn invalidated_child_does_not_stall_the_sequence() {
        let (scheduler, runner, _) = manual_scheduler();
        let a = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ());
        let b = scheduler.context(0.0_f32, 1.0).with_duration(1.0).with_setter(|_| ());
        let seq = scheduler.sequence();
        seq.append(&a).append(&b);
        seq.play().unwrap();
        runner.step(&scheduler, 0.25);
        runner.step(&scheduler, 0.25);
        a.clear_setter();
        runner.step(&scheduler, 0.25);
        runner.step(&scheduler, 0.25);
        assert!(b.is_playing());
    }
}
