//! Error types for policy and scope resolution.

use std::fmt::{self, Display};

use thiserror::Error;

use crate::naming::ClassName;

/// What an [`InstanceResolver`](crate::resolver::InstanceResolver) was asked to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKind {
    /// A domain object resolved from an identifier.
    Target,
    /// A policy constructed with `(subject, target)`.
    Policy,
    /// A scope constructed with `(subject, root)`.
    Scope,
}

impl Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKind::Target => f.write_str("target"),
            InstanceKind::Policy => f.write_str("policy"),
            InstanceKind::Scope => f.write_str("scope"),
        }
    }
}

/// Failure to turn a name into an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Nothing is registered under the name.
    #[error("no {kind} registered as [{name}]")]
    NotRegistered { kind: InstanceKind, name: ClassName },

    /// A custom resolver failed while looking the name up.
    #[error("lookup of {kind} [{name}] failed: {reason}")]
    Lookup {
        kind: InstanceKind,
        name: ClassName,
        reason: String,
    },
}

impl ResolveError {
    /// The name that could not be resolved.
    pub fn name(&self) -> &ClassName {
        match self {
            ResolveError::NotRegistered { name, .. } | ResolveError::Lookup { name, .. } => name,
        }
    }

    pub fn kind(&self) -> InstanceKind {
        match self {
            ResolveError::NotRegistered { kind, .. } | ResolveError::Lookup { kind, .. } => *kind,
        }
    }
}

/// Error type for the authorizer and its entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizerError {
    /// A derived or explicit class name could not be instantiated.
    ///
    /// Carries the resolver's error unmodified.
    #[error(transparent)]
    ResolutionFailure(#[from] ResolveError),

    /// The object handed to [`scope`](crate::helpers::scope) resolved to
    /// something without the [`Scopeable`](crate::contracts::Scopeable) capability.
    #[error(
        "A scope must be passed to scope() when the object doesn't implement [{required}]. \
         The object passed was [{actual}]."
    )]
    NotScopeable {
        required: &'static str,
        actual: ClassName,
    },
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, AuthorizerError>;
