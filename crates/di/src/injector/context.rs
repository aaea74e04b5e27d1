use crate::errors::{DependencyChain, DiError};
use crate::tokens::{DualKey, Token};
use uuid::Uuid;

#[derive(Debug)]
struct Frame {
    scope: Uuid,
    id: u32,
    token: Token,
}

/// Construction stack of one top-level resolution
///
/// Frames are keyed by injector and token id, so a provider that asks for
/// the same token from its parent (`SkipSelf`) is not mistaken for a cycle.
#[derive(Debug)]
pub(crate) struct ResolutionContext {
    stack: Vec<Frame>,
    max_depth: Option<usize>,
}

impl ResolutionContext {
    pub(crate) fn new(max_depth: Option<usize>) -> Self {
        Self {
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Push a provider owned by `scope`, failing on re-entry or when a
    /// configured depth limit is reached
    pub(crate) fn enter(&mut self, scope: Uuid, key: &DualKey) -> Result<(), DiError> {
        if self.stack.iter().any(|frame| frame.scope == scope && frame.id == key.id) {
            return Err(DiError::cyclic(self.chain_with(&key.token)));
        }
        if let Some(limit) = self.max_depth {
            if self.stack.len() >= limit {
                return Err(DiError::ResolutionDepthExceeded {
                    limit,
                    chain: self.chain_with(&key.token),
                });
            }
        }
        self.stack.push(Frame {
            scope,
            id: key.id,
            token: key.token.clone(),
        });
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.stack.pop();
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Tokens currently under construction, outermost first
    pub(crate) fn chain(&self) -> DependencyChain {
        DependencyChain::from_tokens(self.stack.iter().map(|frame| &frame.token))
    }

    /// Current chain followed by `token`
    pub(crate) fn chain_with(&self, token: &Token) -> DependencyChain {
        let mut chain = self.chain();
        chain.push(token);
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, id: u32) -> DualKey {
        DualKey {
            token: Token::from(name),
            id,
        }
    }

    #[test]
    fn test_reentry_in_same_scope_is_a_cycle() {
        let scope = Uuid::new_v4();
        let mut ctx = ResolutionContext::new(None);

        ctx.enter(scope, &key("A", 0)).unwrap();
        ctx.enter(scope, &key("B", 1)).unwrap();
        let error = ctx.enter(scope, &key("A", 0)).unwrap_err();

        assert!(error.is_cyclic());
        assert_eq!(error.chain().unwrap().path_string(), "A -> B -> A");
    }

    #[test]
    fn test_same_token_in_other_scope_is_allowed() {
        let mut ctx = ResolutionContext::new(Some(16));

        ctx.enter(Uuid::new_v4(), &key("Logger", 0)).unwrap();
        ctx.enter(Uuid::new_v4(), &key("Logger", 0)).unwrap();
        assert_eq!(ctx.depth(), 2);

        ctx.exit();
        ctx.exit();
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let scope = Uuid::new_v4();
        let mut ctx = ResolutionContext::new(Some(2));

        ctx.enter(scope, &key("A", 0)).unwrap();
        ctx.enter(scope, &key("B", 1)).unwrap();
        let error = ctx.enter(scope, &key("C", 2)).unwrap_err();

        assert!(matches!(error, DiError::ResolutionDepthExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_no_limit_by_default() {
        let scope = Uuid::new_v4();
        let mut ctx = ResolutionContext::new(None);

        for id in 0..500 {
            ctx.enter(scope, &key("Link", id)).unwrap();
        }
        assert_eq!(ctx.depth(), 500);
    }
}
