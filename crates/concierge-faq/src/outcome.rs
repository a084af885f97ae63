// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result of a best-effort external call.

/// Either the value an external call produced, or the substitute used
/// because it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The call succeeded and its output passed validation.
    Fresh(T),
    /// The call failed or its output was rejected.
    Fallback { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Fresh(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Fresh(value) | Self::Fallback { value, .. } => value,
        }
    }

    /// Why the fallback was used, if it was.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Fresh(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Fresh(value) => Outcome::Fresh(f(value)),
            Self::Fallback { value, reason } => Outcome::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}
