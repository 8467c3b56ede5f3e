//! View names and lifecycle event naming.

/// Separates a namespace hint from the view path, e.g. `mail::layouts.base`.
pub const HINT_PATH_DELIMITER: &str = "::";

/// Lifecycle stage a view callback is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEventKind {
    Creating,
    Composing,
}

impl ViewEventKind {
    /// Event name prefix, including the trailing space.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Creating => "creating: ",
            Self::Composing => "composing: ",
        }
    }

    /// Method invoked on class-based callbacks that name no method.
    pub fn default_method(self) -> &'static str {
        match self {
            Self::Creating => "create",
            Self::Composing => "compose",
        }
    }

    /// Full event name for an already normalized view name or pattern.
    pub fn event_name(self, view: &str) -> String {
        format!("{}{}", self.prefix(), view)
    }
}

/// Anything that can be composed or created under a view name.
pub trait ViewLike {
    fn name(&self) -> &str;
}

/// Canonicalizes a view name: path separators become dots.
///
/// A `namespace::` hint is kept as-is; casing is never changed.
pub fn normalize_view_name(name: &str) -> String {
    match name.split_once(HINT_PATH_DELIMITER) {
        None => name.replace('/', "."),
        Some((namespace, path)) => {
            format!("{namespace}{HINT_PATH_DELIMITER}{}", path.replace('/', "."))
        }
    }
}
