use crate::tokens::forward_ref::ForwardRef;
use std::any::TypeId;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type identifier used by type tokens
///
/// Equality and hashing only look at the `TypeId`; the type name is kept for
/// error messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Create a type key for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name with module paths stripped, e.g. `Vec<Car>`
    pub fn short_name(&self) -> String {
        short_type_name(self.type_name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl std::fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Opaque token for values that are not identified by a type
///
/// Every call to [`InjectionToken::new`] creates a distinct token, even when
/// the names are equal. Clones share the identity of the original.
///
/// ```rust
/// use elif_di::tokens::InjectionToken;
///
/// let a = InjectionToken::new("API_URL");
/// let b = InjectionToken::new("API_URL");
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
#[derive(Clone)]
pub struct InjectionToken {
    name: Arc<str>,
}

impl InjectionToken {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// Debug name of the token
    pub fn name(&self) -> &str {
        &self.name
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.name) as *const u8 as usize
    }
}

impl PartialEq for InjectionToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }
}

impl Eq for InjectionToken {}

impl Hash for InjectionToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl std::fmt::Debug for InjectionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("InjectionToken").field(&self.name).finish()
    }
}

/// Key a provider is bound to
#[derive(Clone)]
pub enum Token {
    /// Identified by a Rust type
    Type(TypeKey),
    /// Identified by an [`InjectionToken`] instance
    Opaque(InjectionToken),
    /// Raw string key, equal by value
    Str(Arc<str>),
    /// Phase that has to complete before the inner token's phase
    Before(Arc<Token>),
    /// Deferred reference, resolved on first access
    Forward(ForwardRef),
}

impl Token {
    /// Type token for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Token::Type(TypeKey::of::<T>())
    }

    /// Derived token for the phase running before `token`
    pub fn before(token: &Token) -> Self {
        Token::Before(Arc::new(token.target().clone()))
    }

    /// Deferred token, `resolve` runs once on first access
    pub fn forward<F>(resolve: F) -> Self
    where
        F: Fn() -> Token + Send + Sync + 'static,
    {
        Token::Forward(ForwardRef::new(resolve))
    }

    /// The token this one stands for, following forward references
    pub fn target(&self) -> &Token {
        match self {
            Token::Forward(forward) => forward.get().target(),
            other => other,
        }
    }

    /// Whether this is (or forwards to) a before token
    pub fn is_before(&self) -> bool {
        matches!(self.target(), Token::Before(_))
    }

    /// Type key of a type token
    pub fn type_key(&self) -> Option<TypeKey> {
        match self.target() {
            Token::Type(key) => Some(*key),
            _ => None,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self.target(), other.target()) {
            (Token::Type(a), Token::Type(b)) => a == b,
            (Token::Opaque(a), Token::Opaque(b)) => a == b,
            (Token::Str(a), Token::Str(b)) => a == b,
            (Token::Before(a), Token::Before(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.target() {
            Token::Type(key) => {
                0u8.hash(state);
                key.hash(state);
            }
            Token::Opaque(token) => {
                1u8.hash(state);
                token.hash(state);
            }
            Token::Str(name) => {
                2u8.hash(state);
                name.hash(state);
            }
            Token::Before(inner) => {
                3u8.hash(state);
                inner.hash(state);
            }
            Token::Forward(forward) => forward.get().hash(state),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Type(key) => f.write_str(&key.short_name()),
            Token::Opaque(token) => f.write_str(token.name()),
            Token::Str(name) => f.write_str(name),
            Token::Before(inner) => write!(f, "Before({})", inner),
            Token::Forward(forward) => write!(f, "{}", forward.get()),
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Type(key) => f.debug_tuple("Type").field(key).finish(),
            Token::Opaque(token) => f.debug_tuple("Opaque").field(&token.name()).finish(),
            Token::Str(name) => f.debug_tuple("Str").field(name).finish(),
            Token::Before(inner) => f.debug_tuple("Before").field(inner).finish(),
            Token::Forward(forward) => forward.fmt(f),
        }
    }
}

impl From<TypeKey> for Token {
    fn from(key: TypeKey) -> Self {
        Token::Type(key)
    }
}

impl From<InjectionToken> for Token {
    fn from(token: InjectionToken) -> Self {
        Token::Opaque(token)
    }
}

impl From<&InjectionToken> for Token {
    fn from(token: &InjectionToken) -> Self {
        Token::Opaque(token.clone())
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::Str(name.into())
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Token::Str(name.into())
    }
}

impl From<&Token> for Token {
    fn from(token: &Token) -> Self {
        token.clone()
    }
}

/// Strip module paths from every segment of a type name
///
/// `alloc::vec::Vec<my_app::Car>` becomes `Vec<Car>`.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            short.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            short.push(ch);
        }
    }
    short.push_str(segment.rsplit("::").next().unwrap_or_default());
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Engine;
    trait Vehicle {}

    #[test]
    fn test_type_token_identity() {
        assert_eq!(Token::of::<Engine>(), Token::of::<Engine>());
        assert_ne!(Token::of::<Engine>(), Token::of::<String>());
        assert_eq!(Token::of::<Engine>().to_string(), "Engine");
        assert_eq!(Token::of::<dyn Vehicle>().to_string(), "dyn Vehicle");
    }

    #[test]
    fn test_string_tokens_compare_by_value() {
        assert_eq!(Token::from("config"), Token::from("config".to_string()));
        assert_ne!(Token::from("config"), Token::from(InjectionToken::new("config")));
    }

    #[test]
    fn test_before_token_is_derived_from_target() {
        let engine = Token::of::<Engine>();
        let before = Token::before(&engine);

        assert_eq!(before, Token::before(&engine));
        assert_ne!(before, engine);
        assert!(before.is_before());
        assert_eq!(before.to_string(), "Before(Engine)");
    }

    #[test]
    fn test_forward_token_hashes_as_target() {
        let forward = Token::forward(Token::of::<Engine>);
        let mut set = HashSet::new();
        set.insert(Token::of::<Engine>());

        assert!(set.contains(&forward));
        assert_eq!(forward.type_key(), Some(TypeKey::of::<Engine>()));
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("alloc::vec::Vec<my_app::Car>"), "Vec<Car>");
        assert_eq!(short_type_name("dyn my_app::Repository"), "dyn Repository");
        assert_eq!(short_type_name("u32"), "u32");
    }
}
