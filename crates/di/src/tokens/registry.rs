use crate::tokens::Token;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Token paired with its dense id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualKey {
    pub token: Token,
    pub id: u32,
}

#[derive(Debug, Default)]
struct KeyTable {
    ids: HashMap<Token, u32>,
    tokens: Vec<Token>,
}

/// Assigns a stable, dense integer id to every token
///
/// Ids start at 0 and grow by one for each distinct token, so the registry
/// only grows with the number of tokens declared, never with the number of
/// lookups. Each [`DiEngine`](crate::DiEngine) owns one registry, keeping id
/// spaces of independent engines apart.
#[derive(Debug)]
pub struct KeyRegistry {
    id: Uuid,
    table: RwLock<KeyTable>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            table: RwLock::new(KeyTable::default()),
        }
    }

    /// Identity of this id space
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Id of `token`, assigned on first call
    pub fn id_of(&self, token: &Token) -> u32 {
        let target = token.target();
        {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(id) = table.ids.get(target) {
                return *id;
            }
        }

        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = table.ids.get(target) {
            return *id;
        }
        let id = table.tokens.len() as u32;
        table.ids.insert(target.clone(), id);
        table.tokens.push(target.clone());
        tracing::trace!("Assigned id {} to token {}", id, target);
        id
    }

    /// Id of the before-phase token derived from `token`
    pub fn before_id_of(&self, token: &Token) -> u32 {
        self.id_of(&Token::before(token))
    }

    /// Token and id pair for `token`
    pub fn dual_key(&self, token: &Token) -> DualKey {
        DualKey {
            token: token.target().clone(),
            id: self.id_of(token),
        }
    }

    /// Reverse lookup, used for diagnostics
    pub fn token_of(&self, id: u32) -> Option<Token> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.tokens.get(id as usize).cloned()
    }

    /// Number of tokens registered so far
    pub fn len(&self) -> usize {
        self.table.read().unwrap_or_else(PoisonError::into_inner).tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::InjectionToken;

    struct Engine;
    struct Car;

    #[test]
    fn test_ids_are_dense_and_stable() {
        let registry = KeyRegistry::new();

        let engine = registry.id_of(&Token::of::<Engine>());
        let car = registry.id_of(&Token::of::<Car>());

        assert_eq!(engine, 0);
        assert_eq!(car, 1);
        assert_eq!(registry.id_of(&Token::of::<Engine>()), engine);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.token_of(car), Some(Token::of::<Car>()));
    }

    #[test]
    fn test_opaque_tokens_with_same_name_get_distinct_ids() {
        let registry = KeyRegistry::new();
        let first = InjectionToken::new("URL");
        let second = InjectionToken::new("URL");

        assert_ne!(registry.id_of(&first.clone().into()), registry.id_of(&second.into()));
        assert_eq!(registry.id_of(&first.clone().into()), registry.id_of(&first.into()));
    }

    #[test]
    fn test_before_id_is_deterministic_and_distinct() {
        let registry = KeyRegistry::new();
        let engine = Token::of::<Engine>();

        let before = registry.before_id_of(&engine);
        assert_eq!(before, registry.before_id_of(&engine));
        assert_ne!(before, registry.id_of(&engine));
    }

    #[test]
    fn test_forward_token_shares_target_id() {
        let registry = KeyRegistry::new();
        let forward = Token::forward(Token::of::<Car>);

        let key = registry.dual_key(&forward);
        assert_eq!(key.id, registry.id_of(&Token::of::<Car>()));
        assert!(matches!(key.token, Token::Type(_)));
    }

    #[test]
    fn test_independent_registries_do_not_share_ids() {
        let first = KeyRegistry::new();
        let second = KeyRegistry::new();

        first.id_of(&Token::from("a"));
        first.id_of(&Token::from("b"));

        assert_eq!(second.id_of(&Token::from("b")), 0);
        assert_eq!(first.id_of(&Token::from("b")), 1);
    }
}
