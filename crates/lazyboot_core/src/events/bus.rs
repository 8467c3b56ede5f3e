//! In-process synchronous event bus.
//!
//! # Invariants
//! - Exact subscriptions run before wildcard subscriptions; each group keeps
//!   registration order.
//! - Matching listeners are snapshotted before dispatch, so a listener may
//!   subscribe new listeners without deadlocking the bus.
//! - The first listener error aborts dispatch and is returned to the caller.

use crate::events::pattern::EventPattern;
use crate::module::contract::ActivationError;
use crate::view::callback::ResolveError;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock};

/// Whether dispatch continues after a listener returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// How fired arguments are handed to one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadPolicy {
    /// Listener sees every fired argument.
    Full,
    /// Listener sees only the first fired argument.
    FirstArgument,
}

/// One listener invocation.
#[derive(Debug)]
pub struct EventCall<'a, P> {
    /// Concrete fired event name, also for wildcard subscriptions.
    pub name: &'a str,
    pub payload: &'a [P],
}

impl<'a, P> EventCall<'a, P> {
    pub fn first(&self) -> Option<&'a P> {
        self.payload.first()
    }
}

pub type ListenerResult = Result<Propagation, EventError>;

pub type Listener<P> = Arc<dyn Fn(&EventCall<'_, P>) -> ListenerResult + Send + Sync>;

struct Subscription<P> {
    pattern: EventPattern,
    policy: PayloadPolicy,
    listener: Listener<P>,
}

/// Event bus keyed by exact names and `*` patterns.
pub struct EventBus<P> {
    subscriptions: RwLock<Vec<Subscription<P>>>,
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
        }
    }
}

impl<P> EventBus<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to one event name or pattern.
    pub fn listen(
        &self,
        pattern: &str,
        policy: PayloadPolicy,
        listener: Listener<P>,
    ) -> Result<(), EventError> {
        let pattern = EventPattern::parse(pattern)?;
        debug!(
            "event=listener_add module=events status=ok pattern={} wildcard={}",
            pattern.as_str(),
            pattern.is_wildcard()
        );
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription {
                pattern,
                policy,
                listener,
            });
        Ok(())
    }

    /// Subscribes the same listener to several names or patterns.
    pub fn listen_many<S: AsRef<str>>(
        &self,
        patterns: &[S],
        policy: PayloadPolicy,
        listener: Listener<P>,
    ) -> Result<(), EventError> {
        for pattern in patterns {
            self.listen(pattern.as_ref(), policy, Arc::clone(&listener))?;
        }
        Ok(())
    }

    /// Whether any subscription matches `name`.
    pub fn has_listeners(&self, name: &str) -> bool {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|subscription| subscription.pattern.matches(name))
    }

    /// Removes every subscription registered with exactly `pattern`.
    ///
    /// Returns the number of removed subscriptions.
    pub fn forget(&self, pattern: &str) -> usize {
        let mut subscriptions = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.pattern.as_str() != pattern);
        before - subscriptions.len()
    }

    /// Dispatches `name` to every matching listener.
    ///
    /// Returns how many listeners ran. An empty payload fails with
    /// `MissingPayload` before any listener runs when a matching
    /// subscription uses `PayloadPolicy::FirstArgument`.
    pub fn fire(&self, name: &str, payload: &[P]) -> Result<usize, EventError> {
        let matched = self.matching(name);
        if payload.is_empty()
            && matched
                .iter()
                .any(|(policy, _)| *policy == PayloadPolicy::FirstArgument)
        {
            return Err(EventError::MissingPayload {
                event: name.to_string(),
            });
        }

        let mut invoked = 0usize;
        for (policy, listener) in matched {
            let call = match policy {
                PayloadPolicy::Full => EventCall { name, payload },
                PayloadPolicy::FirstArgument => EventCall {
                    name,
                    payload: &payload[..1],
                },
            };

            invoked += 1;
            if listener(&call)? == Propagation::Stop {
                debug!(
                    "event=event_fire module=events status=halted name={} listeners={}",
                    name, invoked
                );
                return Ok(invoked);
            }
        }

        debug!(
            "event=event_fire module=events status=ok name={} listeners={}",
            name, invoked
        );
        Ok(invoked)
    }

    fn matching(&self, name: &str) -> Vec<(PayloadPolicy, Listener<P>)> {
        let subscriptions = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let exact = subscriptions
            .iter()
            .filter(|subscription| !subscription.pattern.is_wildcard());
        let wildcard = subscriptions
            .iter()
            .filter(|subscription| subscription.pattern.is_wildcard());
        exact
            .chain(wildcard)
            .filter(|subscription| subscription.pattern.matches(name))
            .map(|subscription| (subscription.policy, Arc::clone(&subscription.listener)))
            .collect()
    }
}

/// Event registration and dispatch errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    InvalidPattern { pattern: String, message: String },
    MissingPayload { event: String },
    Listener { event: String, message: String },
    Resolve(ResolveError),
    Activation(ActivationError),
}

impl Display for EventError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern { pattern, message } => {
                write!(f, "event pattern is invalid: {pattern} ({message})")
            }
            Self::MissingPayload { event } => {
                write!(f, "event {event} was fired without the argument its listener expects")
            }
            Self::Listener { event, message } => {
                write!(f, "listener for {event} failed: {message}")
            }
            Self::Resolve(err) => write!(f, "{err}"),
            Self::Activation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resolve(err) => Some(err),
            Self::Activation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolveError> for EventError {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}

impl From<ActivationError> for EventError {
    fn from(value: ActivationError) -> Self {
        Self::Activation(value)
    }
}
