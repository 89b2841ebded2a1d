// tween/events.rs
//
// Observer lists for tween lifecycle hooks.
//
// Handlers are stored behind Rc<RefCell<..>> so the caller can snapshot the
// list, release every tween borrow, and only then run user code. A handler
// that ends up re-entering itself gets a CallbackError instead of a panic.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::types::{EventSetMode, TweenEvent};
use crate::core::error::{CallbackError, CallbackResult, IntoCallbackResult};

/// Identifies one listener inside a [`Listeners`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Handler for the argument-less lifecycle hooks.
pub type Handler = Rc<RefCell<dyn FnMut() -> CallbackResult>>;

/// Wrap a user closure into a [`Handler`].
pub fn handler<F, R>(mut f: F) -> Handler
where
    F: FnMut() -> R + 'static,
    R: IntoCallbackResult,
{
    Rc::new(RefCell::new(move || f().into_callback_result()))
}

/// Ordered list of handlers of one kind.
pub struct Listeners<F: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Rc<RefCell<F>>)>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> Listeners<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler.
    pub fn add(&mut self, handler: Rc<RefCell<F>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, handler));
        id
    }

    /// Add or replace depending on `mode`.
    pub fn set(&mut self, handler: Rc<RefCell<F>>, mode: EventSetMode) -> ListenerId {
        if mode == EventSetMode::Equals {
            self.entries.clear();
        }
        self.add(handler)
    }

    /// Remove a handler. Returns false if it was not present.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clone the handler list so it can be run without holding a borrow.
    pub fn snapshot(&self) -> Vec<Rc<RefCell<F>>> {
        self.entries.iter().map(|(_, h)| Rc::clone(h)).collect()
    }
}

/// Run handlers in order. The first failure aborts the rest of the list.
pub fn invoke_all(handlers: &[Handler], name: &'static str) -> CallbackResult {
    for handler in handlers {
        let mut f = handler
            .try_borrow_mut()
            .map_err(|_| CallbackError::Reentrant(name))?;
        (&mut *f)()?;
    }
    Ok(())
}

/// One listener list per [`TweenEvent`].
#[derive(Default)]
pub struct TweenEvents {
    play: Listeners<dyn FnMut() -> CallbackResult>,
    start: Listeners<dyn FnMut() -> CallbackResult>,
    tick: Listeners<dyn FnMut() -> CallbackResult>,
    pause: Listeners<dyn FnMut() -> CallbackResult>,
    repeat: Listeners<dyn FnMut() -> CallbackResult>,
    end: Listeners<dyn FnMut() -> CallbackResult>,
    stop: Listeners<dyn FnMut() -> CallbackResult>,
}

impl TweenEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, event: TweenEvent) -> &Listeners<dyn FnMut() -> CallbackResult> {
        match event {
            TweenEvent::Play => &self.play,
            TweenEvent::Start => &self.start,
            TweenEvent::Tick => &self.tick,
            TweenEvent::Pause => &self.pause,
            TweenEvent::Repeat => &self.repeat,
            TweenEvent::End => &self.end,
            TweenEvent::Stop => &self.stop,
        }
    }

    pub fn get_mut(&mut self, event: TweenEvent) -> &mut Listeners<dyn FnMut() -> CallbackResult> {
        match event {
            TweenEvent::Play => &mut self.play,
            TweenEvent::Start => &mut self.start,
            TweenEvent::Tick => &mut self.tick,
            TweenEvent::Pause => &mut self.pause,
            TweenEvent::Repeat => &mut self.repeat,
            TweenEvent::End => &mut self.end,
            TweenEvent::Stop => &mut self.stop,
        }
    }

    pub fn add(&mut self, event: TweenEvent, handler: Handler) -> ListenerId {
        self.get_mut(event).add(handler)
    }

    pub fn set(&mut self, event: TweenEvent, handler: Handler, mode: EventSetMode) -> ListenerId {
        self.get_mut(event).set(handler, mode)
    }

    pub fn remove(&mut self, event: TweenEvent, id: ListenerId) -> bool {
        self.get_mut(event).remove(id)
    }

    pub fn clear(&mut self, event: TweenEvent) {
        self.get_mut(event).clear();
    }

    pub fn clear_all(&mut self) {
        for event in TweenEvent::ALL {
            self.clear(event);
        }
    }

    pub fn snapshot(&self, event: TweenEvent) -> Vec<Handler> {
        self.get(event).snapshot()
    }
}
