//! Class-name derivation.
//!
//! Maps a target's type path to the conventional policy or scope name by
//! suffixing its trailing segment. Derivation is purely string based: it
//! never checks that the derived name is registered anywhere.

use std::fmt::{self, Display};

use bailiff_config::NamingConfig;

/// Separator between namespace segments in a [`ClassName`].
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Fully-qualified name of a target, policy, or scope type.
///
/// Names are `::`-separated paths such as `app::models::Article`. They are
/// the keys an [`InstanceResolver`](crate::resolver::InstanceResolver) uses
/// to construct instances.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name of the Rust type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bailiff::naming::ClassName;
    ///
    /// struct Article;
    ///
    /// assert_eq!(ClassName::of::<Article>().simple_name(), "Article");
    /// ```
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the trailing segment, without any generic argument list.
    pub fn simple_name(&self) -> &str {
        let path = self.path();
        match path.rfind(NAMESPACE_SEPARATOR) {
            Some(idx) => &path[idx + NAMESPACE_SEPARATOR.len()..],
            None => path,
        }
    }

    /// Returns everything before the trailing segment, or `None` for a
    /// name without a namespace.
    pub fn namespace(&self) -> Option<&str> {
        let path = self.path();
        path.rfind(NAMESPACE_SEPARATOR).map(|idx| &path[..idx])
    }

    /// The name with its generic argument list dropped.
    ///
    /// `app::Wrapper<app::Inner>` becomes `app::Wrapper`.
    fn path(&self) -> &str {
        match self.0.find('<') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Appends `suffix` to the trailing segment, keeping the namespace.
    pub fn with_suffix(&self, suffix: &str) -> ClassName {
        ClassName(format!("{}{suffix}", self.path()))
    }
}

impl Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ClassName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ClassName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a policy or scope name is chosen for a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Derive the name from the target's type via the [`NamingConvention`].
    #[default]
    Convention,

    /// Use this name verbatim, whatever the target's type.
    Explicit(ClassName),
}

impl Resolution {
    pub fn explicit(name: impl Into<ClassName>) -> Self {
        Resolution::Explicit(name.into())
    }

    /// Explicit resolution to the Rust type `T`.
    pub fn of<T: ?Sized>() -> Self {
        Resolution::Explicit(ClassName::of::<T>())
    }
}

impl From<Option<ClassName>> for Resolution {
    fn from(value: Option<ClassName>) -> Self {
        value.map_or(Resolution::Convention, Resolution::Explicit)
    }
}

/// Suffix rules for deriving policy and scope names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    policy_suffix: String,
    scope_suffix: String,
}

impl NamingConvention {
    pub fn new(policy_suffix: impl Into<String>, scope_suffix: impl Into<String>) -> Self {
        Self {
            policy_suffix: policy_suffix.into(),
            scope_suffix: scope_suffix.into(),
        }
    }

    pub fn policy_suffix(&self) -> &str {
        &self.policy_suffix
    }

    pub fn scope_suffix(&self) -> &str {
        &self.scope_suffix
    }

    /// `app::Article` → `app::ArticlePolicy`.
    pub fn policy_name(&self, target: &ClassName) -> ClassName {
        target.with_suffix(&self.policy_suffix)
    }

    /// `app::Article` → `app::ArticleScope`.
    pub fn scope_name(&self, target: &ClassName) -> ClassName {
        target.with_suffix(&self.scope_suffix)
    }

    /// Picks the policy name for `target` under `resolution`.
    pub fn resolve_policy(&self, target: &ClassName, resolution: &Resolution) -> ClassName {
        match resolution {
            Resolution::Convention => self.policy_name(target),
            Resolution::Explicit(name) => name.clone(),
        }
    }

    /// Picks the scope name for `target` under `resolution`.
    pub fn resolve_scope(&self, target: &ClassName, resolution: &Resolution) -> ClassName {
        match resolution {
            Resolution::Convention => self.scope_name(target),
            Resolution::Explicit(name) => name.clone(),
        }
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::new("Policy", "Scope")
    }
}

impl From<&NamingConfig> for NamingConvention {
    fn from(config: &NamingConfig) -> Self {
        Self::new(config.policy_suffix.clone(), config.scope_suffix.clone())
    }
}
