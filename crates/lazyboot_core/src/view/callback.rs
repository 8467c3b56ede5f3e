//! View callback references and class-based resolution.

use crate::events::bus::EventError;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Concrete callback registered for one view event.
pub type ViewCallback<V> = Arc<dyn Fn(&V) -> Result<(), EventError> + Send + Sync>;

/// Callback as supplied by the caller.
pub enum CallbackRef<V> {
    /// Invoked as-is.
    Direct(ViewCallback<V>),
    /// Resolved through a [`ClassResolver`] every time the event fires.
    ClassMethod {
        class: String,
        method: Option<String>,
    },
}

impl<V> CallbackRef<V> {
    pub fn direct<F>(callback: F) -> Self
    where
        F: Fn(&V) -> Result<(), EventError> + Send + Sync + 'static,
    {
        Self::Direct(Arc::new(callback))
    }

    /// Parses `Class@method`; a reference without `@` leaves the method to
    /// the event kind default.
    pub fn class(reference: &str) -> Self {
        match reference.split_once('@') {
            Some((class, method)) => Self::ClassMethod {
                class: class.to_string(),
                method: Some(method.to_string()),
            },
            None => Self::ClassMethod {
                class: reference.to_string(),
                method: None,
            },
        }
    }
}

impl<V> Clone for CallbackRef<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Direct(callback) => Self::Direct(Arc::clone(callback)),
            Self::ClassMethod { class, method } => Self::ClassMethod {
                class: class.clone(),
                method: method.clone(),
            },
        }
    }
}

impl<V> Debug for CallbackRef<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct(..)"),
            Self::ClassMethod { class, method } => f
                .debug_struct("ClassMethod")
                .field("class", class)
                .field("method", method)
                .finish(),
        }
    }
}

/// Class-based view callback with an explicit method table.
pub trait ViewHandler<V>: Send + Sync {
    /// Runs `method` for `view`. Unknown methods must return
    /// [`ResolveError::UnknownMethod`].
    fn call(&self, method: &str, view: &V) -> Result<(), EventError>;
}

/// Turns class names into handler instances.
pub trait ClassResolver<V>: Send + Sync {
    fn resolve(&self, class: &str) -> Result<Arc<dyn ViewHandler<V>>, ResolveError>;
}

/// Class reference resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    UnknownClass(String),
    UnknownMethod { class: String, method: String },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownClass(class) => write!(f, "class cannot be resolved: {class}"),
            Self::UnknownMethod { class, method } => {
                write!(f, "class {class} has no callable method: {method}")
            }
        }
    }
}

impl Error for ResolveError {}

#[cfg(test)]
mod tests {
    use super::CallbackRef;

    #[test]
    fn parses_class_and_method() {
        let reference = CallbackRef::<String>::class("ProfileComposer@sidebar");
        assert!(matches!(
            reference,
            CallbackRef::ClassMethod { ref class, method: Some(ref method) }
                if class == "ProfileComposer" && method == "sidebar"
        ));
    }

    #[test]
    fn leaves_method_to_default_without_separator() {
        let reference = CallbackRef::<String>::class("ProfileComposer");
        assert!(matches!(
            reference,
            CallbackRef::ClassMethod { ref class, method: None } if class == "ProfileComposer"
        ));
    }

    #[test]
    fn splits_on_first_separator_only() {
        let reference = CallbackRef::<String>::class("A@b@c");
        assert!(matches!(
            reference,
            CallbackRef::ClassMethod { ref class, method: Some(ref method) }
                if class == "A" && method == "b@c"
        ));
    }
}
