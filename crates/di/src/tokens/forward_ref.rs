use crate::tokens::Token;
use std::sync::{Arc, OnceLock};

type ResolveFn = Box<dyn Fn() -> Token + Send + Sync>;

struct ForwardInner {
    resolve: ResolveFn,
    cell: OnceLock<Token>,
}

/// Lazily evaluated reference to a token that may not exist yet when the
/// provider list is declared.
///
/// The closure runs at most once, on first access; clones share the cell.
#[derive(Clone)]
pub struct ForwardRef {
    inner: Arc<ForwardInner>,
}

impl ForwardRef {
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn() -> Token + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(ForwardInner {
                resolve: Box::new(resolve),
                cell: OnceLock::new(),
            }),
        }
    }

    /// Resolve the reference, evaluating it on first call
    pub fn get(&self) -> &Token {
        self.inner.cell.get_or_init(|| (self.inner.resolve)())
    }

    /// Whether the reference has been evaluated already
    pub fn is_resolved(&self) -> bool {
        self.inner.cell.get().is_some()
    }
}

impl std::fmt::Debug for ForwardRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.cell.get() {
            Some(token) => f.debug_tuple("Forward").field(token).finish(),
            None => f.write_str("Forward(<unresolved>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_forward_ref_resolves_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let forward = ForwardRef::new(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Token::from("late")
        });
        let copy = forward.clone();

        assert!(!forward.is_resolved());
        assert_eq!(forward.get(), &Token::from("late"));
        assert_eq!(copy.get(), &Token::from("late"));
        assert!(copy.is_resolved());
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
