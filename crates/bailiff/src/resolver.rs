//! Name-to-instance resolution.
//!
//! [`InstanceResolver`] is the capability the authorizer uses to turn a class
//! name into a live object. [`Registry`] is the default implementation: an
//! explicit map from names to factories, populated once at startup.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::contracts::{Scope, ScopeRoot, Target};
use crate::error::{InstanceKind, ResolveError};
use crate::naming::ClassName;

/// Builds instances by name.
///
/// Implementations must be safe to share across threads; the authorizer
/// calls them concurrently without locking.
pub trait InstanceResolver<S>: Send + Sync {
    /// Constructs the object registered under `name`, with no arguments.
    fn resolve_target(&self, name: &ClassName) -> Result<Arc<dyn Target>, ResolveError>;

    /// Constructs the policy registered under `name` for `(subject, target)`.
    fn resolve_policy(
        &self,
        name: &ClassName,
        subject: &S,
        target: Arc<dyn Target>,
    ) -> Result<Box<dyn Any + Send + Sync>, ResolveError>;

    /// Constructs the scope registered under `name` for `(subject, root)`.
    fn resolve_scope(
        &self,
        name: &ClassName,
        subject: &S,
        root: ScopeRoot,
    ) -> Result<Box<dyn Scope>, ResolveError>;
}

type TargetFactory = Arc<dyn Fn() -> Arc<dyn Target> + Send + Sync>;
type PolicyFactory<S> = Arc<dyn Fn(&S, Arc<dyn Target>) -> Box<dyn Any + Send + Sync> + Send + Sync>;
type ScopeFactory<S> = Arc<dyn Fn(&S, ScopeRoot) -> Box<dyn Scope> + Send + Sync>;

/// Explicit name → factory registry.
///
/// Every lookup calls the factory, so each resolution yields a fresh
/// instance owned by the caller.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use bailiff::contracts::Target;
/// use bailiff::naming::ClassName;
/// use bailiff::resolver::{InstanceResolver, Registry};
///
/// struct Article;
/// impl Target for Article {}
///
/// struct ArticlePolicy {
///     user: String,
///     article: Arc<dyn Target>,
/// }
///
/// let registry = Registry::<String>::new()
///     .with_target_type(|| Article)
///     .with_policy("app::ArticlePolicy", |user: &String, article| ArticlePolicy {
///         user: user.clone(),
///         article,
///     });
///
/// let article = registry.resolve_target(&ClassName::of::<Article>()).unwrap();
/// let policy = registry
///     .resolve_policy(&"app::ArticlePolicy".into(), &"alice".to_string(), article)
///     .unwrap();
/// assert!(policy.is::<ArticlePolicy>());
/// ```
pub struct Registry<S> {
    targets: HashMap<ClassName, TargetFactory>,
    policies: HashMap<ClassName, PolicyFactory<S>>,
    scopes: HashMap<ClassName, ScopeFactory<S>>,
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self {
            targets: HashMap::new(),
            policies: HashMap::new(),
            scopes: HashMap::new(),
        }
    }

    /// Registers a target factory under an identifier.
    ///
    /// Replaces any factory already registered under the same name.
    pub fn with_target<T, F>(mut self, name: impl Into<ClassName>, factory: F) -> Self
    where
        T: Target,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: TargetFactory = Arc::new(move || Arc::new(factory()) as Arc<dyn Target>);
        self.targets.insert(name.into(), factory);
        self
    }

    /// Registers a target factory under the type's own name.
    pub fn with_target_type<T, F>(self, factory: F) -> Self
    where
        T: Target,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.with_target(ClassName::of::<T>(), factory)
    }

    /// Registers a policy constructor under `name`.
    pub fn with_policy<P, F>(mut self, name: impl Into<ClassName>, factory: F) -> Self
    where
        P: Any + Send + Sync,
        F: Fn(&S, Arc<dyn Target>) -> P + Send + Sync + 'static,
    {
        let factory: PolicyFactory<S> = Arc::new(move |subject: &S, target: Arc<dyn Target>| {
            Box::new(factory(subject, target)) as Box<dyn Any + Send + Sync>
        });
        self.policies.insert(name.into(), factory);
        self
    }

    /// Registers a policy constructor under the policy type's own name.
    ///
    /// A policy `app::ArticlePolicy` registered this way is found by
    /// convention for targets of type `app::Article`.
    pub fn with_policy_type<P, F>(self, factory: F) -> Self
    where
        P: Any + Send + Sync,
        F: Fn(&S, Arc<dyn Target>) -> P + Send + Sync + 'static,
    {
        self.with_policy(ClassName::of::<P>(), factory)
    }

    /// Registers a scope constructor under `name`.
    pub fn with_scope<C, F>(mut self, name: impl Into<ClassName>, factory: F) -> Self
    where
        C: Scope,
        F: Fn(&S, ScopeRoot) -> C + Send + Sync + 'static,
    {
        let factory: ScopeFactory<S> = Arc::new(move |subject: &S, root: ScopeRoot| {
            Box::new(factory(subject, root)) as Box<dyn Scope>
        });
        self.scopes.insert(name.into(), factory);
        self
    }

    /// Registers a scope constructor under the scope type's own name.
    pub fn with_scope_type<C, F>(self, factory: F) -> Self
    where
        C: Scope,
        F: Fn(&S, ScopeRoot) -> C + Send + Sync + 'static,
    {
        self.with_scope(ClassName::of::<C>(), factory)
    }

    pub fn contains_target(&self, name: &ClassName) -> bool {
        self.targets.contains_key(name)
    }

    pub fn contains_policy(&self, name: &ClassName) -> bool {
        self.policies.contains_key(name)
    }

    pub fn contains_scope(&self, name: &ClassName) -> bool {
        self.scopes.contains_key(name)
    }
}

impl<S> InstanceResolver<S> for Registry<S> {
    fn resolve_target(&self, name: &ClassName) -> Result<Arc<dyn Target>, ResolveError> {
        let factory = self
            .targets
            .get(name)
            .ok_or_else(|| not_registered(InstanceKind::Target, name))?;
        Ok(factory())
    }

    fn resolve_policy(
        &self,
        name: &ClassName,
        subject: &S,
        target: Arc<dyn Target>,
    ) -> Result<Box<dyn Any + Send + Sync>, ResolveError> {
        let factory = self
            .policies
            .get(name)
            .ok_or_else(|| not_registered(InstanceKind::Policy, name))?;
        Ok(factory(subject, target))
    }

    fn resolve_scope(
        &self,
        name: &ClassName,
        subject: &S,
        root: ScopeRoot,
    ) -> Result<Box<dyn Scope>, ResolveError> {
        let factory = self
            .scopes
            .get(name)
            .ok_or_else(|| not_registered(InstanceKind::Scope, name))?;
        Ok(factory(subject, root))
    }
}

fn not_registered(kind: InstanceKind, name: &ClassName) -> ResolveError {
    ResolveError::NotRegistered {
        kind,
        name: name.clone(),
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self {
            targets: self.targets.clone(),
            policies: self.policies.clone(),
            scopes: self.scopes.clone(),
        }
    }
}

impl<S> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut targets: Vec<_> = self.targets.keys().collect();
        let mut policies: Vec<_> = self.policies.keys().collect();
        let mut scopes: Vec<_> = self.scopes.keys().collect();
        targets.sort();
        policies.sort();
        scopes.sort();

        f.debug_struct("Registry")
            .field("targets", &targets)
            .field("policies", &policies)
            .field("scopes", &scopes)
            .finish()
    }
}
