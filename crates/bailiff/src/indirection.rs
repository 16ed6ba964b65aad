//! Substitution of wrappers that delegate their authorization.

use std::sync::Arc;

use crate::contracts::Target;

/// Replaces `candidate` with the object it resolves to, if it is a
/// [`ResolvesAuthorizable`](crate::contracts::ResolvesAuthorizable) wrapper.
///
/// Exactly one level is applied. The substitute is returned as-is even if it
/// is itself a wrapper, so indirection chains and cycles cannot loop.
pub fn normalize(candidate: Arc<dyn Target>) -> Arc<dyn Target> {
    let substitute = candidate
        .as_resolves_authorizable()
        .map(|wrapper| wrapper.resolve_authorizable());

    substitute.unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ResolvesAuthorizable;

    struct Order;

    impl Target for Order {}

    struct Draft {
        order: Arc<dyn Target>,
    }

    impl Target for Draft {
        fn as_resolves_authorizable(&self) -> Option<&dyn ResolvesAuthorizable> {
            Some(self)
        }
    }

    impl ResolvesAuthorizable for Draft {
        fn resolve_authorizable(&self) -> Arc<dyn Target> {
            Arc::clone(&self.order)
        }
    }

    /// Resolves to itself.
    struct Mirror;

    impl Target for Mirror {
        fn as_resolves_authorizable(&self) -> Option<&dyn ResolvesAuthorizable> {
            Some(self)
        }
    }

    impl ResolvesAuthorizable for Mirror {
        fn resolve_authorizable(&self) -> Arc<dyn Target> {
            Arc::new(Mirror)
        }
    }

    #[test]
    fn test_plain_target_unchanged() {
        let order: Arc<dyn Target> = Arc::new(Order);
        let normalized = normalize(Arc::clone(&order));

        assert!(Arc::ptr_eq(&order, &normalized));
    }

    #[test]
    fn test_wrapper_substituted() {
        let order: Arc<dyn Target> = Arc::new(Order);
        let draft: Arc<dyn Target> = Arc::new(Draft {
            order: Arc::clone(&order),
        });

        let normalized = normalize(draft);
        assert!(Arc::ptr_eq(&order, &normalized));
    }

    #[test]
    fn test_single_level_only() {
        let order: Arc<dyn Target> = Arc::new(Order);
        let inner: Arc<dyn Target> = Arc::new(Draft {
            order: Arc::clone(&order),
        });
        let outer: Arc<dyn Target> = Arc::new(Draft {
            order: Arc::clone(&inner),
        });

        let normalized = normalize(outer);
        assert!(Arc::ptr_eq(&inner, &normalized));
        assert!(normalized.is::<Draft>());
    }

    #[test]
    fn test_self_referential_wrapper_terminates() {
        let normalized = normalize(Arc::new(Mirror));
        assert!(normalized.is::<Mirror>());
    }
}
