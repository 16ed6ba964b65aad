//! Entry points for application code.
//!
//! [`policy`] and [`scope`] resolve against the subject supplied by an
//! [`AuthContext`]. The context is passed explicitly; there is no global
//! authorizer.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::authorizer::{Authorizer, ResolvedPolicy};
use crate::contracts::{Query, SCOPEABLE_CONTRACT, ScopeRoot, Target};
use crate::error::{AuthorizerError, Result};
use crate::indirection;
use crate::naming::{ClassName, Resolution};

/// Supplies the subject for entry-point calls.
pub trait SubjectProvider<S>: Send + Sync {
    fn current_subject(&self) -> S;
}

impl<S, F> SubjectProvider<S> for F
where
    F: Fn() -> S + Send + Sync,
{
    fn current_subject(&self) -> S {
        self()
    }
}

/// A provider that always returns the same subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSubject<S>(S);

impl<S> FixedSubject<S> {
    pub fn new(subject: S) -> Self {
        Self(subject)
    }
}

impl<S: Clone + Send + Sync> SubjectProvider<S> for FixedSubject<S> {
    fn current_subject(&self) -> S {
        self.0.clone()
    }
}

/// An authorizer paired with the source of the current subject.
pub struct AuthContext<S> {
    authorizer: Arc<Authorizer<S>>,
    subjects: Arc<dyn SubjectProvider<S>>,
}

impl<S: 'static> AuthContext<S> {
    pub fn new(authorizer: Arc<Authorizer<S>>, subjects: impl SubjectProvider<S> + 'static) -> Self {
        Self {
            authorizer,
            subjects: Arc::new(subjects),
        }
    }

    /// Returns a context sharing this authorizer with a different subject source.
    pub fn with_subjects(&self, subjects: impl SubjectProvider<S> + 'static) -> Self {
        Self::new(Arc::clone(&self.authorizer), subjects)
    }

    pub fn authorizer(&self) -> &Authorizer<S> {
        &self.authorizer
    }

    pub fn current_subject(&self) -> S {
        self.subjects.current_subject()
    }
}

impl<S> Clone for AuthContext<S> {
    fn clone(&self) -> Self {
        Self {
            authorizer: Arc::clone(&self.authorizer),
            subjects: Arc::clone(&self.subjects),
        }
    }
}

impl<S> fmt::Debug for AuthContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("authorizer", &self.authorizer)
            .finish_non_exhaustive()
    }
}

/// The argument accepted by [`policy`].
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Resolved to an instance by the authorizer's resolver first.
    Identifier(ClassName),
    Object(Arc<dyn Target>),
}

impl Lookup {
    pub fn object<T: Target>(object: Arc<T>) -> Self {
        Lookup::Object(object)
    }
}

impl From<&str> for Lookup {
    fn from(value: &str) -> Self {
        Lookup::Identifier(value.into())
    }
}

impl From<ClassName> for Lookup {
    fn from(value: ClassName) -> Self {
        Lookup::Identifier(value)
    }
}

impl From<Arc<dyn Target>> for Lookup {
    fn from(value: Arc<dyn Target>) -> Self {
        Lookup::Object(value)
    }
}

/// Resolves the policy for an identifier or object.
///
/// An identifier is first turned into an instance. A
/// [`ResolvesAuthorizable`](crate::contracts::ResolvesAuthorizable) wrapper
/// is then replaced by the object it resolves to (one level only) before the
/// policy is resolved for the current subject.
pub fn policy<S: 'static>(
    ctx: &AuthContext<S>,
    lookup: impl Into<Lookup>,
    resolution: Resolution,
) -> Result<ResolvedPolicy> {
    let authorizer = ctx.authorizer();

    let object = match lookup.into() {
        Lookup::Identifier(name) => authorizer.resolve_target(&name)?,
        Lookup::Object(object) => object,
    };
    let object = indirection::normalize(object);

    let subject = ctx.current_subject();
    authorizer.policy(&subject, object, resolution)
}

/// Resolves a scoped query for an identifier, object, or query.
///
/// - An identifier is turned into an instance; a query is unwrapped to its
///   owning model.
/// - The result must be [`Scopeable`](crate::contracts::Scopeable).
/// - If the caller passed that very object, the scope is rooted at its
///   [`base_scope`](crate::contracts::Scopeable::base_scope); otherwise the
///   original argument is the root.
///
/// The scope name is derived from the resolved object's type. Returns the
/// query produced by the constructed scope.
///
/// # Errors
///
/// Returns [`AuthorizerError::NotScopeable`] before any scope is built if the
/// resolved object is not scopeable, and
/// [`AuthorizerError::ResolutionFailure`] for unresolvable names.
pub fn scope<S: 'static>(
    ctx: &AuthContext<S>,
    root: impl Into<ScopeRoot>,
    resolution: Resolution,
) -> Result<Arc<dyn Query>> {
    let authorizer = ctx.authorizer();
    let requested = root.into();

    let object = match &requested {
        ScopeRoot::Identifier(name) => authorizer.resolve_target(name)?,
        ScopeRoot::Query(query) => query.owning_model(),
        ScopeRoot::Object(object) => Arc::clone(object),
    };

    let Some(scopeable) = object.as_scopeable() else {
        let actual = object.class_name();
        if authorizer.audit_enabled() {
            warn!(object = %actual, "Scope requested for object that is not scopeable");
        }
        return Err(AuthorizerError::NotScopeable {
            required: SCOPEABLE_CONTRACT,
            actual,
        });
    };

    let root = match requested {
        ScopeRoot::Object(original) if Arc::ptr_eq(&original, &object) => {
            ScopeRoot::Query(scopeable.base_scope())
        }
        other => other,
    };

    let subject = ctx.current_subject();
    let scope = authorizer.scope(&subject, object.as_ref(), root, resolution)?;
    Ok(scope.resolve())
}

/// Returns the context's authorizer.
pub fn authorizer<S: 'static>(ctx: &AuthContext<S>) -> Arc<Authorizer<S>> {
    Arc::clone(&ctx.authorizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Registry;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ticket;

    impl Target for Ticket {}

    struct TicketPolicy {
        subject: u64,
    }

    fn registry() -> Registry<u64> {
        Registry::new()
            .with_target("ticket", || Ticket)
            .with_policy_type(|subject: &u64, _target| TicketPolicy { subject: *subject })
    }

    fn context(subjects: impl SubjectProvider<u64> + 'static) -> AuthContext<u64> {
        let authorizer = Authorizer::new(registry()).without_audit();

        AuthContext::new(Arc::new(authorizer), subjects)
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` under a subscriber that records everything at debug and above.
    fn capture_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_fixed_subject() {
        let ctx = context(FixedSubject::new(9u64));

        let resolved = policy(&ctx, "ticket", Resolution::Convention).unwrap();
        assert_eq!(resolved.downcast_ref::<TicketPolicy>().unwrap().subject, 9);
    }

    #[test]
    fn test_closure_subject_is_read_per_call() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&counter);
        let ctx = context(move || calls.fetch_add(1, Ordering::SeqCst) as u64);

        let first = policy(&ctx, "ticket", Resolution::Convention).unwrap();
        let second = policy(&ctx, "ticket", Resolution::Convention).unwrap();

        assert_eq!(first.downcast_ref::<TicketPolicy>().unwrap().subject, 0);
        assert_eq!(second.downcast_ref::<TicketPolicy>().unwrap().subject, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_with_subjects_shares_authorizer() {
        let ctx = context(FixedSubject::new(1u64));
        let other = ctx.with_subjects(FixedSubject::new(2u64));

        assert!(Arc::ptr_eq(&authorizer(&ctx), &authorizer(&other)));
        assert_eq!(other.current_subject(), 2);
    }

    #[test]
    fn test_unknown_identifier_fails_before_subject_lookup() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&counter);
        let ctx = context(move || calls.fetch_add(1, Ordering::SeqCst) as u64);

        let result = policy(&ctx, "missing", Resolution::Convention);

        assert!(matches!(result, Err(AuthorizerError::ResolutionFailure(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_not_scopeable_warning_respects_audit_flag() {
        let silent = context(FixedSubject::new(1u64));
        let logs = capture_logs(|| {
            let result = scope(&silent, ScopeRoot::object(Arc::new(Ticket)), Resolution::Convention);
            assert!(matches!(result, Err(AuthorizerError::NotScopeable { .. })));
        });
        assert!(logs.is_empty(), "audit disabled but logged: {logs}");

        let audited = AuthContext::new(
            Arc::new(Authorizer::new(registry())),
            FixedSubject::new(1u64),
        );
        let logs = capture_logs(|| {
            let result = scope(&audited, ScopeRoot::object(Arc::new(Ticket)), Resolution::Convention);
            assert!(result.is_err());
        });
        assert!(logs.contains("not scopeable"));
        assert!(logs.contains("WARN"));
    }

    #[test]
    fn test_lookup_conversions() {
        assert!(matches!(Lookup::from("ticket"), Lookup::Identifier(_)));
        assert!(matches!(Lookup::object(Arc::new(Ticket)), Lookup::Object(_)));
    }
}
