//! Event name patterns.

use crate::events::bus::EventError;
use regex::Regex;

/// Marker that turns an event name into a wildcard pattern.
pub const WILDCARD: char = '*';

/// Exact event name or `*` wildcard pattern.
///
/// A `*` matches any run of characters, including none. Every other
/// character matches itself literally.
#[derive(Debug, Clone)]
pub enum EventPattern {
    Exact(String),
    Wildcard { raw: String, matcher: Regex },
}

impl EventPattern {
    pub fn parse(raw: &str) -> Result<Self, EventError> {
        if !raw.contains(WILDCARD) {
            return Ok(Self::Exact(raw.to_string()));
        }

        let body = raw
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let matcher = Regex::new(&format!(r"\A{body}\z")).map_err(|err| {
            EventError::InvalidPattern {
                pattern: raw.to_string(),
                message: err.to_string(),
            }
        })?;
        Ok(Self::Wildcard {
            raw: raw.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(raw) => raw,
            Self::Wildcard { raw, .. } => raw,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard { .. })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(raw) => raw == name,
            Self::Wildcard { matcher, .. } => matcher.is_match(name),
        }
    }
}

impl PartialEq for EventPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EventPattern {}
