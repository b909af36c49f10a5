//! Error types for fact gathering and convergence planning.
//!
//! The core performs no local recovery: every variant surfaces to the
//! caller synchronously, which decides whether to retry, abort or carry on.

use thiserror::Error;

/// Errors that can occur while observing state or planning actions.
#[derive(Debug, Error)]
pub enum Error {
    /// An observation hook could not determine the current state of a resource
    #[error("cannot observe {resource}: {message}")]
    Observation {
        /// Identifier of the resource being observed
        resource: String,
        /// What went wrong (command missing, permission denied, ...)
        message: String,
    },

    /// A fact producer failed
    #[error("fact '{fact}' unavailable: {message}")]
    Probe {
        /// Name of the fact being gathered
        fact: &'static str,
        /// Details from the underlying probe
        message: String,
    },

    /// A cached fact was read back with a different type than it was stored with
    #[error("fact '{fact}' is cached with a different type")]
    FactType {
        /// Name of the fact
        fact: &'static str,
    },

    /// The desired state cannot be planned
    #[error("invalid desired state: {message}")]
    InvalidSpec {
        /// What is wrong with the desired state
        message: String,
    },

    /// No provider factory registered for a package manager
    #[error("no provider registered for package manager '{manager}'")]
    UnknownProvider {
        /// The requested package manager id
        manager: String,
    },

    /// The platform has no default package manager
    #[error("no default package manager for platform '{system}'")]
    NoDefaultProvider {
        /// Value of the `system` fact
        system: String,
    },

    /// Worker pool for batch planning could not be built
    #[error("failed to create planning thread pool: {0}")]
    ThreadPool(String),
}

impl Error {
    /// Build an observation failure for a resource.
    pub fn observation(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Observation {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Build a probe failure for a fact.
    pub fn probe(fact: &'static str, message: impl Into<String>) -> Self {
        Self::Probe {
            fact,
            message: message.into(),
        }
    }
}

/// Result type for declarative operations.
pub type Result<T> = std::result::Result<T, Error>;
