//! The authorizer: resolves policy and scope instances for a subject.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bailiff_config::BailiffConfig;
use tracing::{debug, warn};

use crate::contracts::{Query, Scope, ScopeRoot, Target};
use crate::error::{ResolveError, Result};
use crate::naming::{ClassName, NamingConvention, Resolution};
use crate::resolver::InstanceResolver;

/// A policy instance and the name it was resolved under.
pub struct ResolvedPolicy {
    name: ClassName,
    instance: Box<dyn Any + Send + Sync>,
}

impl ResolvedPolicy {
    pub fn name(&self) -> &ClassName {
        &self.name
    }

    pub fn is<P: Any>(&self) -> bool {
        self.instance.is::<P>()
    }

    pub fn downcast_ref<P: Any>(&self) -> Option<&P> {
        self.instance.downcast_ref::<P>()
    }

    /// Takes the concrete policy out, or returns `self` if it is not a `P`.
    pub fn downcast<P: Any>(self) -> std::result::Result<P, Self> {
        let Self { name, instance } = self;
        match instance.downcast::<P>() {
            Ok(policy) => Ok(*policy),
            Err(instance) => Err(Self { name, instance }),
        }
    }
}

impl fmt::Debug for ResolvedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPolicy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A scope instance and the name it was resolved under.
pub struct ResolvedScope {
    name: ClassName,
    scope: Box<dyn Scope>,
}

impl ResolvedScope {
    pub fn name(&self) -> &ClassName {
        &self.name
    }

    pub fn is<C: Scope>(&self) -> bool {
        self.scope().is::<C>()
    }

    pub fn downcast_ref<C: Scope>(&self) -> Option<&C> {
        self.scope().downcast_ref::<C>()
    }

    /// Runs the scope's filtering logic and returns the resulting query.
    pub fn resolve(&self) -> Arc<dyn Query> {
        self.scope.resolve()
    }

    fn scope(&self) -> &dyn Scope {
        self.scope.as_ref()
    }
}

impl fmt::Debug for ResolvedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedScope")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolves policies and scopes for targets.
///
/// Holds no per-call state. Instantiation is delegated to the
/// [`InstanceResolver`]; name derivation to the [`NamingConvention`].
///
/// # Thread Safety
///
/// `Authorizer` is `Send + Sync` and cheap to clone. It is typically built
/// once at startup and shared behind an `Arc`.
pub struct Authorizer<S> {
    resolver: Arc<dyn InstanceResolver<S>>,
    naming: NamingConvention,
    audit_enabled: bool,
}

impl<S: 'static> Authorizer<S> {
    /// Creates an authorizer over `resolver` with the default naming convention.
    pub fn new(resolver: impl InstanceResolver<S> + 'static) -> Self {
        Self::from_shared(Arc::new(resolver))
    }

    /// Creates an authorizer over a resolver that is shared elsewhere.
    pub fn from_shared(resolver: Arc<dyn InstanceResolver<S>>) -> Self {
        Self {
            resolver,
            naming: NamingConvention::default(),
            audit_enabled: true,
        }
    }

    /// Creates an authorizer with naming and audit settings from `config`.
    pub fn from_config(resolver: impl InstanceResolver<S> + 'static, config: &BailiffConfig) -> Self {
        let authorizer = Self::new(resolver).with_naming(NamingConvention::from(&config.naming));
        if config.audit.enabled {
            authorizer
        } else {
            authorizer.without_audit()
        }
    }

    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    /// Disables resolution logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    pub fn naming(&self) -> &NamingConvention {
        &self.naming
    }

    pub(crate) fn audit_enabled(&self) -> bool {
        self.audit_enabled
    }

    pub fn resolver(&self) -> &dyn InstanceResolver<S> {
        self.resolver.as_ref()
    }

    /// The policy name `policy` would use for `target`.
    pub fn policy_name(&self, target: &dyn Target, resolution: &Resolution) -> ClassName {
        self.naming.resolve_policy(&target.class_name(), resolution)
    }

    /// The scope name `scope` would use for `target`.
    pub fn scope_name(&self, target: &dyn Target, resolution: &Resolution) -> ClassName {
        self.naming.resolve_scope(&target.class_name(), resolution)
    }

    /// Constructs the object registered under identifier `name`.
    pub fn resolve_target(&self, name: &ClassName) -> Result<Arc<dyn Target>> {
        self.resolver.resolve_target(name).map_err(|err| {
            self.log_failure("target", name, &err);
            err.into()
        })
    }

    /// Resolves the policy for `target`, constructed with `(subject, target)`.
    ///
    /// Under [`Resolution::Convention`] the name is derived from the target's
    /// class name; an explicit name is used verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError::ResolutionFailure`](crate::AuthorizerError::ResolutionFailure)
    /// if nothing can be instantiated under the chosen name.
    pub fn policy(
        &self,
        subject: &S,
        target: Arc<dyn Target>,
        resolution: Resolution,
    ) -> Result<ResolvedPolicy> {
        let target_name = target.class_name();
        let name = self.naming.resolve_policy(&target_name, &resolution);

        let instance = self
            .resolver
            .resolve_policy(&name, subject, target)
            .map_err(|err| {
                self.log_failure("policy", &name, &err);
                err
            })?;

        if self.audit_enabled {
            debug!(
                target_type = %target_name,
                policy = %name,
                explicit = matches!(resolution, Resolution::Explicit(_)),
                "Policy resolved"
            );
        }

        Ok(ResolvedPolicy { name, instance })
    }

    /// Resolves the scope for `target`, constructed with `(subject, root)`.
    ///
    /// The scope name comes from `target`; the instance wraps `root`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError::ResolutionFailure`](crate::AuthorizerError::ResolutionFailure)
    /// if nothing can be instantiated under the chosen name.
    pub fn scope(
        &self,
        subject: &S,
        target: &dyn Target,
        root: ScopeRoot,
        resolution: Resolution,
    ) -> Result<ResolvedScope> {
        let target_name = target.class_name();
        let name = self.naming.resolve_scope(&target_name, &resolution);

        let scope = self
            .resolver
            .resolve_scope(&name, subject, root)
            .map_err(|err| {
                self.log_failure("scope", &name, &err);
                err
            })?;

        if self.audit_enabled {
            debug!(
                target_type = %target_name,
                scope = %name,
                explicit = matches!(resolution, Resolution::Explicit(_)),
                "Scope resolved"
            );
        }

        Ok(ResolvedScope { name, scope })
    }

    fn log_failure(&self, kind: &str, name: &ClassName, err: &ResolveError) {
        if self.audit_enabled {
            warn!(kind, name = %name, error = %err, "Resolution failed");
        }
    }
}

impl<S> Clone for Authorizer<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            naming: self.naming.clone(),
            audit_enabled: self.audit_enabled,
        }
    }
}

impl<S> fmt::Debug for Authorizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("naming", &self.naming)
            .field("audit_enabled", &self.audit_enabled)
            .finish_non_exhaustive()
    }
}
