//! One-shot promises settled through an [`EventLoop`].
//!
//! A [`Deferred`] is the write side, a [`Promise`] the (cloneable) read side.
//! Guarantees enforced here rather than by callers:
//! - a deferred settles at most once; later attempts return
//!   [`PromiseError::AlreadySettled`] and leave the value untouched,
//! - observers never run synchronously; they are scheduled on the loop in
//!   registration order, so work queued against a pending promise runs after
//!   settlement and before anything queued later.

use std::cell::RefCell;
use std::rc::Rc;

use crate::event_loop::EventLoop;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseError {
    AlreadySettled,
}

impl std::fmt::Display for PromiseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromiseError::AlreadySettled => write!(f, "promise already settled"),
        }
    }
}

impl std::error::Error for PromiseError {}

type Observer<T, E> = Box<dyn FnOnce(Result<&T, &E>)>;

enum State<T, E> {
    Pending(Vec<Observer<T, E>>),
    Settled(Rc<Result<T, E>>),
}

struct Shared<T, E> {
    event_loop: EventLoop,
    state: RefCell<State<T, E>>,
}

/// Write side of a one-shot promise.
pub struct Deferred<T, E> {
    shared: Rc<Shared<T, E>>,
}

/// Read side of a one-shot promise.
pub struct Promise<T, E> {
    shared: Rc<Shared<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settled = matches!(&*self.shared.state.borrow(), State::Settled(_));
        f.debug_struct("Promise").field("settled", &settled).finish()
    }
}

impl<T, E> std::fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settled = matches!(&*self.shared.state.borrow(), State::Settled(_));
        f.debug_struct("Deferred").field("settled", &settled).finish()
    }
}

/// Creates a pending promise and its write side on `event_loop`.
pub fn deferred<T: 'static, E: 'static>(event_loop: &EventLoop) -> (Deferred<T, E>, Promise<T, E>) {
    let shared = Rc::new(Shared {
        event_loop: event_loop.clone(),
        state: RefCell::new(State::Pending(Vec::new())),
    });
    (
        Deferred {
            shared: shared.clone(),
        },
        Promise { shared },
    )
}

impl<T: 'static, E: 'static> Deferred<T, E> {
    pub fn promise(&self) -> Promise<T, E> {
        Promise {
            shared: self.shared.clone(),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(&*self.shared.state.borrow(), State::Settled(_))
    }

    pub fn resolve(&self, value: T) -> Result<(), PromiseError> {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: E) -> Result<(), PromiseError> {
        self.settle(Err(error))
    }

    pub fn settle(&self, result: Result<T, E>) -> Result<(), PromiseError> {
        let (observers, value) = {
            let mut state = self.shared.state.borrow_mut();
            let observers = match &mut *state {
                State::Settled(_) => return Err(PromiseError::AlreadySettled),
                State::Pending(observers) => std::mem::take(observers),
            };
            let value = Rc::new(result);
            *state = State::Settled(value.clone());
            (observers, value)
        };

        for observer in observers {
            let value = value.clone();
            self.shared
                .event_loop
                .schedule(move || observer(Result::as_ref(&value)));
        }
        Ok(())
    }
}

impl<T: 'static, E: 'static> Promise<T, E> {
    pub fn resolved(event_loop: &EventLoop, value: T) -> Self {
        let (d, p) = deferred(event_loop);
        let _ = d.resolve(value);
        p
    }

    pub fn rejected(event_loop: &EventLoop, error: E) -> Self {
        let (d, p) = deferred(event_loop);
        let _ = d.reject(error);
        p
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.shared.event_loop
    }

    pub fn is_pending(&self) -> bool {
        matches!(&*self.shared.state.borrow(), State::Pending(_))
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// The settled value, if any. Does not run observers.
    pub fn settled(&self) -> Option<Rc<Result<T, E>>> {
        match &*self.shared.state.borrow() {
            State::Pending(_) => None,
            State::Settled(v) => Some(v.clone()),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Registers `f` to run on the loop once the promise settles.
    pub fn on_settled(&self, f: impl FnOnce(Result<&T, &E>) + 'static) {
        let mut state = self.shared.state.borrow_mut();
        match &mut *state {
            State::Pending(observers) => observers.push(Box::new(f)),
            State::Settled(value) => {
                let value = value.clone();
                self.shared
                    .event_loop
                    .schedule(move || f(Result::as_ref(&value)));
            }
        }
    }

    pub fn then(&self, f: impl FnOnce(&T) + 'static) {
        self.on_settled(move |r| {
            if let Ok(v) = r {
                f(v);
            }
        });
    }

    pub fn catch(&self, f: impl FnOnce(&E) + 'static) {
        self.on_settled(move |r| {
            if let Err(e) = r {
                f(e);
            }
        });
    }

    pub fn map<U: 'static>(&self, f: impl FnOnce(&T) -> U + 'static) -> Promise<U, E>
    where
        E: Clone,
    {
        let (d, p) = deferred(&self.shared.event_loop);
        self.on_settled(move |r| {
            let _ = match r {
                Ok(v) => d.resolve(f(v)),
                Err(e) => d.reject(e.clone()),
            };
        });
        p
    }

    pub fn map_err<F: 'static>(&self, f: impl FnOnce(&E) -> F + 'static) -> Promise<T, F>
    where
        T: Clone,
    {
        let (d, p) = deferred(&self.shared.event_loop);
        self.on_settled(move |r| {
            let _ = match r {
                Ok(v) => d.resolve(v.clone()),
                Err(e) => d.reject(f(e)),
            };
        });
        p
    }

    /// Chains a dependent promise; rejections of either side propagate.
    pub fn and_then<U: 'static>(
        &self,
        f: impl FnOnce(&T) -> Promise<U, E> + 'static,
    ) -> Promise<U, E>
    where
        U: Clone,
        E: Clone,
    {
        let (d, p) = deferred(&self.shared.event_loop);
        self.on_settled(move |r| match r {
            Ok(v) => f(v).on_settled(move |inner| {
                let _ = match inner {
                    Ok(u) => d.resolve(u.clone()),
                    Err(e) => d.reject(e.clone()),
                };
            }),
            Err(e) => {
                let _ = d.reject(e.clone());
            }
        });
        p
    }
}
