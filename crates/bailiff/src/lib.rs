//! # bailiff: Policy and scope resolution
//!
//! Maps a target object to the policy that decides what a subject may do
//! with it, and to the scope that restricts which instances of its type the
//! subject may see:
//! - **Naming convention** (`Article` → `ArticlePolicy` / `ArticleScope`)
//! - **Explicit overrides** via [`Resolution::Explicit`]
//! - **Indirection** through [`ResolvesAuthorizable`] wrappers
//! - **Base scopes** supplied by [`Scopeable`] targets
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  policy() / scope()  (AuthContext)           │
//! │  ├─ Identifier → instance                    │
//! │  ├─ Wrapper → resolved object (policy)       │
//! │  └─ Query → owning model, base scope (scope) │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Authorizer                                  │
//! │  ├─ NamingConvention (unless explicit)       │
//! │  └─ InstanceResolver (Registry)              │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Fresh policy / scope instance               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Policy permission methods are left to the application; this crate only
//! finds and constructs the policy.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bailiff::{AuthContext, Authorizer, FixedSubject, Registry, Resolution, Target};
//!
//! struct Article;
//! impl Target for Article {}
//!
//! struct ArticlePolicy {
//!     user: String,
//! }
//!
//! impl ArticlePolicy {
//!     fn may_edit(&self) -> bool {
//!         self.user == "editor"
//!     }
//! }
//!
//! let registry = Registry::new()
//!     .with_target("article", || Article)
//!     .with_policy_type(|user: &String, _article| ArticlePolicy { user: user.clone() });
//!
//! let authorizer = Arc::new(Authorizer::new(registry));
//! let ctx = AuthContext::new(authorizer, FixedSubject::new("editor".to_string()));
//!
//! let policy = bailiff::policy(&ctx, "article", Resolution::Convention)?;
//! assert!(policy.downcast_ref::<ArticlePolicy>().unwrap().may_edit());
//! # Ok::<(), bailiff::AuthorizerError>(())
//! ```
//!
//! Because `ArticlePolicy` is registered under its own type path, it is found
//! by convention for any target whose type path is `<module>::Article` in the
//! same module.

pub mod authorizer;
pub mod contracts;
pub mod error;
pub mod helpers;
pub mod indirection;
pub mod naming;
pub mod resolver;


// Re-export commonly used types
pub use authorizer::{Authorizer, ResolvedPolicy, ResolvedScope};
pub use contracts::{
    Authorizable, Query, ResolvesAuthorizable, Scope, ScopeRoot, Scopeable, Target,
};
pub use error::{AuthorizerError, InstanceKind, ResolveError, Result};
pub use helpers::{AuthContext, FixedSubject, Lookup, SubjectProvider, authorizer, policy, scope};
pub use naming::{ClassName, NamingConvention, Resolution};
pub use resolver::{InstanceResolver, Registry};
