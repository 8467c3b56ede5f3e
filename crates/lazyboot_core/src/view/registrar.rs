//! View creator/composer registration on the event bus.
//!
//! # Responsibility
//! - Bind callbacks to `creating: <view>` and `composing: <view>` events.
//! - Fire those events for concrete views.
//!
//! # Invariants
//! - Registration never resolves class references; resolution happens on
//!   every invocation, so an unknown class only fails when its event fires.
//! - Wildcard view patterns subscribe with `PayloadPolicy::FirstArgument`
//!   and callbacks always receive exactly one view.

use crate::events::bus::{
    EventBus, EventCall, EventError, ListenerResult, PayloadPolicy, Propagation,
};
use crate::events::pattern::WILDCARD;
use crate::view::callback::{CallbackRef, ClassResolver, ViewCallback};
use crate::view::name::{normalize_view_name, ViewEventKind, ViewLike};
use log::debug;
use std::sync::Arc;

/// Registrar binding view lifecycle callbacks to an event bus.
pub struct ViewEvents<V> {
    events: Arc<EventBus<V>>,
    resolver: Arc<dyn ClassResolver<V>>,
}

impl<V: ViewLike + 'static> ViewEvents<V> {
    pub fn new(events: Arc<EventBus<V>>, resolver: Arc<dyn ClassResolver<V>>) -> Self {
        Self { events, resolver }
    }

    pub fn events(&self) -> &Arc<EventBus<V>> {
        &self.events
    }

    /// Registers a creator callback for each view name or pattern.
    pub fn creator<S: AsRef<str>>(
        &self,
        views: &[S],
        callback: CallbackRef<V>,
    ) -> Result<Vec<ViewCallback<V>>, EventError> {
        views
            .iter()
            .map(|view| self.add_view_event(view.as_ref(), &callback, ViewEventKind::Creating))
            .collect()
    }

    /// Registers a composer callback for each view name or pattern.
    pub fn composer<S: AsRef<str>>(
        &self,
        views: &[S],
        callback: CallbackRef<V>,
    ) -> Result<Vec<ViewCallback<V>>, EventError> {
        views
            .iter()
            .map(|view| self.add_view_event(view.as_ref(), &callback, ViewEventKind::Composing))
            .collect()
    }

    /// Registers several composers; results keep mapping order.
    pub fn composers(
        &self,
        composers: Vec<(CallbackRef<V>, Vec<String>)>,
    ) -> Result<Vec<ViewCallback<V>>, EventError> {
        let mut registered = Vec::new();
        for (callback, views) in composers {
            registered.extend(self.composer(views.as_slice(), callback)?);
        }
        Ok(registered)
    }

    /// Fires `composing: <name>` with `view` as the sole payload.
    pub fn call_composer(&self, view: &V) -> Result<usize, EventError> {
        self.fire(ViewEventKind::Composing, view)
    }

    /// Fires `creating: <name>` with `view` as the sole payload.
    pub fn call_creator(&self, view: &V) -> Result<usize, EventError> {
        self.fire(ViewEventKind::Creating, view)
    }

    fn fire(&self, kind: ViewEventKind, view: &V) -> Result<usize, EventError> {
        let name = kind.event_name(view.name());
        self.events.fire(&name, std::slice::from_ref(view))
    }

    fn add_view_event(
        &self,
        view: &str,
        callback: &CallbackRef<V>,
        kind: ViewEventKind,
    ) -> Result<ViewCallback<V>, EventError> {
        let name = kind.event_name(&normalize_view_name(view));
        let concrete = match callback {
            CallbackRef::Direct(callback) => Arc::clone(callback),
            CallbackRef::ClassMethod { class, method } => {
                let method = method
                    .clone()
                    .unwrap_or_else(|| kind.default_method().to_string());
                self.class_callback(class.clone(), method)
            }
        };

        self.add_event_listener(&name, Arc::clone(&concrete))?;
        Ok(concrete)
    }

    fn class_callback(&self, class: String, method: String) -> ViewCallback<V> {
        let resolver = Arc::clone(&self.resolver);
        Arc::new(move |view: &V| -> Result<(), EventError> {
            let handler = resolver.resolve(&class)?;
            handler.call(&method, view)
        })
    }

    fn add_event_listener(&self, name: &str, callback: ViewCallback<V>) -> Result<(), EventError> {
        let policy = if name.contains(WILDCARD) {
            PayloadPolicy::FirstArgument
        } else {
            PayloadPolicy::Full
        };
        debug!(
            "event=view_listener_add module=view status=ok name={} policy={:?}",
            name, policy
        );

        self.events.listen(
            name,
            policy,
            Arc::new(move |call: &EventCall<'_, V>| -> ListenerResult {
                let view = call.first().ok_or_else(|| EventError::MissingPayload {
                    event: call.name.to_string(),
                })?;
                callback(view)?;
                Ok(Propagation::Continue)
            }),
        )
    }
}
