//! Capability contracts for objects that take part in resolution.
//!
//! Every object handed to the core is a [`Target`]. Optional capabilities are
//! exposed through descriptor methods on `Target` rather than runtime type
//! tests: a type that is [`Scopeable`] returns `Some(self)` from
//! [`Target::as_scopeable`], and likewise for [`ResolvesAuthorizable`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::authorizer::{Authorizer, ResolvedPolicy, ResolvedScope};
use crate::error::Result;
use crate::naming::{ClassName, Resolution};

/// Name reported when an object lacks the [`Scopeable`] capability.
pub const SCOPEABLE_CONTRACT: &str = concat!(module_path!(), "::Scopeable");

/// Type-erased access to a concrete value.
///
/// Implemented for every `Any + Send + Sync` type, so it never needs a
/// manual impl.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A domain object (or wrapper) that can be resolved to a policy or scope.
pub trait Target: AsAny {
    /// Runtime type identity used to derive policy and scope names.
    ///
    /// Defaults to the Rust type path of the implementing type.
    fn class_name(&self) -> ClassName {
        ClassName::of::<Self>()
    }

    fn as_scopeable(&self) -> Option<&dyn Scopeable> {
        None
    }

    fn as_resolves_authorizable(&self) -> Option<&dyn ResolvesAuthorizable> {
        None
    }
}

impl dyn Target {
    pub fn is<T: Target>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Target>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_arc<T: Target>(self: Arc<Self>) -> Option<Arc<T>> {
        self.into_any_arc().downcast::<T>().ok()
    }
}

impl fmt::Debug for dyn Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.class_name())
    }
}

/// A target type that supplies its own unfiltered root query.
pub trait Scopeable {
    /// The root query scoping starts from when the object itself is passed
    /// to [`scope`](crate::helpers::scope).
    fn base_scope(&self) -> Arc<dyn Query>;
}

/// A wrapper that delegates authorization to another object.
pub trait ResolvesAuthorizable {
    /// The object to resolve a policy for in place of `self`.
    fn resolve_authorizable(&self) -> Arc<dyn Target>;
}

/// A query-builder-like collaborator.
pub trait Query: AsAny {
    /// A representative instance of the model type this query selects.
    fn owning_model(&self) -> Arc<dyn Target>;
}

impl dyn Query {
    pub fn is<Q: Query>(&self) -> bool {
        self.as_any().is::<Q>()
    }

    pub fn downcast_ref<Q: Query>(&self) -> Option<&Q> {
        self.as_any().downcast_ref::<Q>()
    }
}

impl fmt::Debug for dyn Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").finish_non_exhaustive()
    }
}

/// A constructed scope: restricts a root query for one subject.
pub trait Scope: AsAny {
    /// Produces the filtered query.
    fn resolve(&self) -> Arc<dyn Query>;
}

impl dyn Scope {
    pub fn is<C: Scope>(&self) -> bool {
        self.as_any().is::<C>()
    }

    pub fn downcast_ref<C: Scope>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }
}

/// The root a scope is asked to filter.
///
/// Also the argument accepted by [`scope`](crate::helpers::scope): a plain
/// identifier, an object, or a query.
#[derive(Debug, Clone)]
pub enum ScopeRoot {
    Identifier(ClassName),
    Object(Arc<dyn Target>),
    Query(Arc<dyn Query>),
}

impl ScopeRoot {
    pub fn identifier(name: impl Into<ClassName>) -> Self {
        ScopeRoot::Identifier(name.into())
    }

    pub fn object<T: Target>(object: Arc<T>) -> Self {
        ScopeRoot::Object(object)
    }

    pub fn query<Q: Query>(query: Arc<Q>) -> Self {
        ScopeRoot::Query(query)
    }

    pub fn as_identifier(&self) -> Option<&ClassName> {
        match self {
            ScopeRoot::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn Target>> {
        match self {
            ScopeRoot::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_query(&self) -> Option<&Arc<dyn Query>> {
        match self {
            ScopeRoot::Query(query) => Some(query),
            _ => None,
        }
    }
}

impl From<&str> for ScopeRoot {
    fn from(value: &str) -> Self {
        ScopeRoot::Identifier(value.into())
    }
}

impl From<ClassName> for ScopeRoot {
    fn from(value: ClassName) -> Self {
        ScopeRoot::Identifier(value)
    }
}

impl From<Arc<dyn Target>> for ScopeRoot {
    fn from(value: Arc<dyn Target>) -> Self {
        ScopeRoot::Object(value)
    }
}

impl From<Arc<dyn Query>> for ScopeRoot {
    fn from(value: Arc<dyn Query>) -> Self {
        ScopeRoot::Query(value)
    }
}

/// Marker for targets with a registered policy.
///
/// Implementing it (usually with an empty `impl`) lets the object resolve
/// its own policy and scope.
pub trait Authorizable: Target + Sized {
    /// Resolves the policy for this object, constructed with `(subject, self)`.
    fn policy<S: 'static>(
        self: &Arc<Self>,
        authorizer: &Authorizer<S>,
        subject: &S,
        resolution: Resolution,
    ) -> Result<ResolvedPolicy> {
        let target: Arc<dyn Target> = Arc::<Self>::clone(self);
        authorizer.policy(subject, target, resolution)
    }

    /// Resolves the scope for this type, rooted at [`Scopeable::base_scope`].
    fn scope<S: 'static>(
        self: &Arc<Self>,
        authorizer: &Authorizer<S>,
        subject: &S,
        resolution: Resolution,
    ) -> Result<ResolvedScope>
    where
        Self: Scopeable,
    {
        let root = ScopeRoot::Query(self.base_scope());
        authorizer.scope(subject, &**self, root, resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Page;

    impl Target for Page {}

    struct Book;

    impl Target for Book {
        fn class_name(&self) -> ClassName {
            ClassName::from("library::Book")
        }
    }

    #[test]
    fn test_default_class_name_is_type_path() {
        assert_eq!(Page.class_name(), ClassName::of::<Page>());
        assert_eq!(Book.class_name().as_str(), "library::Book");
    }

    #[test]
    fn test_capabilities_default_to_none() {
        assert!(Page.as_scopeable().is_none());
        assert!(Page.as_resolves_authorizable().is_none());
    }

    #[test]
    fn test_downcast_dyn_target() {
        let target: Arc<dyn Target> = Arc::new(Page);

        assert!(target.is::<Page>());
        assert!(!target.is::<Book>());
        assert!(target.downcast_ref::<Page>().is_some());
        assert!(target.downcast_ref::<Book>().is_none());
        assert!(Arc::clone(&target).downcast_arc::<Page>().is_some());
        assert!(target.downcast_arc::<Book>().is_none());
    }

    #[test]
    fn test_scopeable_contract_name() {
        assert_eq!(SCOPEABLE_CONTRACT, "bailiff::contracts::Scopeable");
    }

    #[test]
    fn test_scope_root_accessors() {
        let root = ScopeRoot::from("app::Article");
        assert_eq!(root.as_identifier().map(ClassName::as_str), Some("app::Article"));
        assert!(root.as_object().is_none());
        assert!(root.as_query().is_none());

        let root = ScopeRoot::object(Arc::new(Page));
        assert!(root.as_object().is_some());
    }

    #[test]
    fn test_authorizable_policy_passes_self_as_target() {
        struct Shelf;
        impl Target for Shelf {}
        impl Authorizable for Shelf {}

        struct ShelfPolicy {
            target: Arc<dyn Target>,
        }

        let registry = crate::resolver::Registry::<()>::new()
            .with_policy_type(|_subject: &(), target| ShelfPolicy { target });
        let authorizer = Authorizer::new(registry).without_audit();
        let shelf = Arc::new(Shelf);

        let resolved = shelf
            .policy(&authorizer, &(), Resolution::Convention)
            .unwrap();

        let policy = resolved.downcast_ref::<ShelfPolicy>().unwrap();
        assert!(policy.target.is::<Shelf>());
        assert!(std::ptr::eq(
            policy.target.downcast_ref::<Shelf>().unwrap(),
            shelf.as_ref()
        ));
    }

    #[test]
    fn test_query_debug_does_not_build_model() {
        struct Unbuildable;

        impl Query for Unbuildable {
            fn owning_model(&self) -> Arc<dyn Target> {
                panic!("owning_model must not be called while formatting");
            }
        }

        let query: Arc<dyn Query> = Arc::new(Unbuildable);
        assert_eq!(format!("{query:?}"), "Query { .. }");
    }
}
