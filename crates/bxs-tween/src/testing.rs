// testing.rs
//
// Shared fixtures for the inline test modules.

use std::cell::RefCell;
use std::error::Error as StdError;
use std::rc::Rc;

use crate::core::logger::{error_chain, TweenLogger};
use crate::core::runner::ManualRunner;
use crate::systems::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Info,
    Warning,
    Error,
}

/// Logger that keeps every line for later assertions.
#[derive(Default)]
pub(crate) struct RecordingLogger {
    pub lines: RefCell<Vec<(Level, String)>>,
}

impl RecordingLogger {
    fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .borrow()
            .iter()
            .any(|(l, line)| *l == level && line.contains(needle))
    }

    pub fn contains_warning(&self, needle: &str) -> bool {
        self.contains(Level::Warning, needle)
    }

    pub fn contains_error(&self, needle: &str) -> bool {
        self.contains(Level::Error, needle)
    }
}

impl TweenLogger for RecordingLogger {
    fn log(&self, message: &str) {
        self.lines.borrow_mut().push((Level::Info, message.to_string()));
    }

    fn log_warning(&self, message: &str) {
        self.lines.borrow_mut().push((Level::Warning, message.to_string()));
    }

    fn log_error(&self, message: &str) {
        self.lines.borrow_mut().push((Level::Error, message.to_string()));
    }

    fn log_exception(&self, message: &str, error: &dyn StdError) {
        let line = format!("{}: {}", message, error_chain(error));
        self.lines.borrow_mut().push((Level::Error, line));
    }
}

/// Scheduler driven by a [`ManualRunner`] and logging into a [`RecordingLogger`].
pub(crate) fn manual_scheduler() -> (Scheduler, Rc<ManualRunner>, Rc<RecordingLogger>) {
    let scheduler = Scheduler::new();
    let runner = Rc::new(ManualRunner::new());
    let logger = Rc::new(RecordingLogger::default());
    let sink: Rc<dyn TweenLogger> = logger.clone();
    scheduler.initialize(runner.clone(), Some(sink));
    (scheduler, runner, logger)
}

pub(crate) fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}
