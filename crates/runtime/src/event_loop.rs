use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrainSummary {
    pub ran_tasks: usize,
    /// Number of drain passes; tasks scheduled while draining start a new pass.
    pub passes: usize,
}

#[derive(Default)]
struct Queue {
    tasks: RefCell<VecDeque<Task>>,
    draining: Cell<bool>,
}

/// Single-threaded cooperative task queue.
///
/// Every continuation in the workspace (promise observers, queued engine
/// mutations) is scheduled here and runs in FIFO order when the owner calls
/// [`EventLoop::run_until_idle`]. Handles are cheap clones of the same queue.
#[derive(Clone, Default)]
pub struct EventLoop {
    queue: Rc<Queue>,
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("pending", &self.pending())
            .finish()
    }
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.queue.tasks.borrow_mut().push_back(Box::new(task));
    }

    pub fn pending(&self) -> usize {
        self.queue.tasks.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Runs queued tasks until none are left, including tasks scheduled by
    /// the tasks themselves.
    ///
    /// Re-entrant calls (a task draining the loop it runs on) return an empty
    /// summary; the outer drain picks up the remaining work.
    pub fn run_until_idle(&self) -> DrainSummary {
        if self.queue.draining.replace(true) {
            return DrainSummary {
                ran_tasks: 0,
                passes: 0,
            };
        }

        let mut ran = 0usize;
        let mut passes = 0usize;
        loop {
            let batch: Vec<Task> = self.queue.tasks.borrow_mut().drain(..).collect();
            if batch.is_empty() {
                break;
            }
            passes += 1;
            for task in batch {
                ran += 1;
                task();
            }
        }

        self.queue.draining.set(false);
        tracing::trace!(ran, passes, "event loop idle");
        DrainSummary {
            ran_tasks: ran,
            passes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EventLoop;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn runs_tasks_in_schedule_order() {
        let ev = EventLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b", "c"] {
            let log = log.clone();
            ev.schedule(move || log.borrow_mut().push(name));
        }
        assert_eq!(ev.pending(), 3);
        let summary = ev.run_until_idle();
        assert_eq!(summary.ran_tasks, 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert!(ev.is_idle());
    }

    #[test]
    fn tasks_scheduled_while_draining_run_after_current_batch() {
        let ev = EventLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let ev2 = ev.clone();
            let log = log.clone();
            ev.schedule(move || {
                log.borrow_mut().push("outer");
                let log = log.clone();
                ev2.schedule(move || log.borrow_mut().push("nested"));
            });
        }
        {
            let log = log.clone();
            ev.schedule(move || log.borrow_mut().push("second"));
        }
        let summary = ev.run_until_idle();
        assert_eq!(*log.borrow(), vec!["outer", "second", "nested"]);
        assert_eq!(summary.passes, 2);
    }

    #[test]
    fn reentrant_drain_is_a_noop() {
        let ev = EventLoop::new();
        let inner = Rc::new(RefCell::new(None));
        {
            let ev2 = ev.clone();
            let inner = inner.clone();
            ev.schedule(move || {
                *inner.borrow_mut() = Some(ev2.run_until_idle().ran_tasks);
            });
        }
        ev.run_until_idle();
        assert_eq!(*inner.borrow(), Some(0));
    }
}
