//! Tagged generation outcomes.
//!
//! Mock fallback is a named return path rather than a caught-and-discarded
//! error, so tests can assert which path fired without reading logs.

/// Where a generated value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The provider answered the call.
    Live,
    /// The provider was unavailable (no credential, transport failure,
    /// non-success status or unparseable payload) and the deterministic
    /// mock answered instead.
    Degraded,
    /// Served from the response cache without invoking any adapter.
    Cache,
}

/// A generated value together with its origin.
#[derive(Debug, Clone)]
pub struct Generated<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Generated<T> {
    pub fn live(value: T) -> Self {
        Self {
            value,
            origin: Origin::Live,
        }
    }

    pub fn degraded(value: T) -> Self {
        Self {
            value,
            origin: Origin::Degraded,
        }
    }

    pub fn cached(value: T) -> Self {
        Self {
            value,
            origin: Origin::Cache,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.origin == Origin::Degraded
    }
}
