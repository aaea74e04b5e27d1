use crate::providers::target::{ClassRef, FactoryRef, FunctionRef, Injectable, Instance, MethodRef};
use crate::tokens::Token;
use std::any::Any;
use std::sync::Arc;

/// Normalized provider declaration binding a token to a way of producing
/// its value
#[derive(Clone)]
pub enum Provider {
    /// Ready made value
    Value {
        token: Token,
        value: Instance,
        multi: bool,
    },
    /// Type constructed by the injector
    Class {
        token: Token,
        class: ClassRef,
        multi: bool,
    },
    /// Redirect to the value of another token
    Alias {
        token: Token,
        target: Token,
        multi: bool,
    },
    /// Value returned by a factory function or method
    Factory {
        token: Token,
        factory: FactoryRef,
        multi: bool,
    },
}

impl Provider {
    /// Bind `token` to `value`
    pub fn value<V: Any + Send + Sync>(token: impl Into<Token>, value: V) -> Self {
        Self::instance(token, Arc::new(value))
    }

    /// Bind `token` to an already shared instance
    pub fn instance(token: impl Into<Token>, value: Instance) -> Self {
        Provider::Value {
            token: token.into(),
            value,
            multi: false,
        }
    }

    /// Bind the type token of `T` to `T` itself
    pub fn class<T: Injectable>() -> Self {
        let class = ClassRef::of::<T>();
        Provider::Class {
            token: class.token(),
            class,
            multi: false,
        }
    }

    /// Bind `token` to a new `T`
    pub fn use_class<T: Injectable>(token: impl Into<Token>) -> Self {
        Provider::Class {
            token: token.into(),
            class: ClassRef::of::<T>(),
            multi: false,
        }
    }

    /// Bind `token` to whatever `target` resolves to
    pub fn alias(token: impl Into<Token>, target: impl Into<Token>) -> Self {
        Provider::Alias {
            token: token.into(),
            target: target.into(),
            multi: false,
        }
    }

    /// Bind `token` to the result of a free function
    pub fn factory(token: impl Into<Token>, function: FunctionRef) -> Self {
        Provider::Factory {
            token: token.into(),
            factory: FactoryRef::Function(function),
            multi: false,
        }
    }

    /// Bind `token` to the result of calling `method` on a new `class`
    pub fn factory_method(token: impl Into<Token>, class: ClassRef, method: MethodRef) -> Self {
        Provider::Factory {
            token: token.into(),
            factory: FactoryRef::Method { class, method },
            multi: false,
        }
    }

    /// Mark the provider as contributing to a list instead of replacing
    /// earlier bindings
    pub fn multi(mut self) -> Self {
        match &mut self {
            Provider::Value { multi, .. }
            | Provider::Class { multi, .. }
            | Provider::Alias { multi, .. }
            | Provider::Factory { multi, .. } => *multi = true,
        }
        self
    }

    pub fn token(&self) -> &Token {
        match self {
            Provider::Value { token, .. }
            | Provider::Class { token, .. }
            | Provider::Alias { token, .. }
            | Provider::Factory { token, .. } => token,
        }
    }

    pub fn is_multi(&self) -> bool {
        match self {
            Provider::Value { multi, .. }
            | Provider::Class { multi, .. }
            | Provider::Alias { multi, .. }
            | Provider::Factory { multi, .. } => *multi,
        }
    }

    /// Provider kind as a string
    pub fn kind(&self) -> &'static str {
        match self {
            Provider::Value { .. } => "value",
            Provider::Class { .. } => "class",
            Provider::Alias { .. } => "alias",
            Provider::Factory { .. } => "factory",
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Provider");
        debug.field("kind", &self.kind()).field("token", self.token());
        match self {
            Provider::Value { .. } => {}
            Provider::Class { class, .. } => {
                debug.field("class", class);
            }
            Provider::Alias { target, .. } => {
                debug.field("target", target);
            }
            Provider::Factory { factory, .. } => {
                debug.field("factory", factory);
            }
        }
        debug.field("multi", &self.is_multi()).finish()
    }
}

/// Loosely shaped provider declaration, validated during normalization
///
/// Exactly one of the `use_*` fields has to be set.
#[derive(Debug, Clone, Default)]
pub struct ProviderLiteral {
    pub token: Option<Token>,
    pub use_value: Option<Instance>,
    pub use_class: Option<ClassRef>,
    pub use_token: Option<Token>,
    pub use_factory: Option<FactoryRef>,
    pub multi: bool,
}

impl ProviderLiteral {
    pub fn new(token: impl Into<Token>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn use_value<V: Any + Send + Sync>(mut self, value: V) -> Self {
        self.use_value = Some(Arc::new(value));
        self
    }

    pub fn use_class<T: Injectable>(mut self) -> Self {
        self.use_class = Some(ClassRef::of::<T>());
        self
    }

    pub fn use_token(mut self, target: impl Into<Token>) -> Self {
        self.use_token = Some(target.into());
        self
    }

    pub fn use_factory(mut self, factory: impl Into<FactoryRef>) -> Self {
        self.use_factory = Some(factory.into());
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }
}

/// Raw provider declaration as written in a module or controller
/// definition
#[derive(Debug, Clone)]
pub enum ProviderDecl {
    /// Shorthand for a class bound to its own type token
    Class(ClassRef),
    Provider(Provider),
    Literal(ProviderLiteral),
    /// Nested list, flattened in place
    Nested(Vec<ProviderDecl>),
}

impl ProviderDecl {
    /// Shorthand declaration for `T`
    pub fn class<T: Injectable>() -> Self {
        ProviderDecl::Class(ClassRef::of::<T>())
    }
}

impl From<Provider> for ProviderDecl {
    fn from(provider: Provider) -> Self {
        ProviderDecl::Provider(provider)
    }
}

impl From<ClassRef> for ProviderDecl {
    fn from(class: ClassRef) -> Self {
        ProviderDecl::Class(class)
    }
}

impl From<ProviderLiteral> for ProviderDecl {
    fn from(literal: ProviderLiteral) -> Self {
        ProviderDecl::Literal(literal)
    }
}

impl From<Vec<ProviderDecl>> for ProviderDecl {
    fn from(decls: Vec<ProviderDecl>) -> Self {
        ProviderDecl::Nested(decls)
    }
}

impl From<Vec<Provider>> for ProviderDecl {
    fn from(providers: Vec<Provider>) -> Self {
        ProviderDecl::Nested(providers.into_iter().map(ProviderDecl::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::args::Args;
    use crate::errors::BoxError;

    struct Logger;

    impl Injectable for Logger {
        fn construct(_args: &mut Args) -> Result<Self, BoxError> {
            Ok(Logger)
        }
    }

    #[test]
    fn test_class_shorthand_binds_own_token() {
        let provider = Provider::class::<Logger>();
        assert_eq!(provider.token(), &Token::of::<Logger>());
        assert_eq!(provider.kind(), "class");
        assert!(!provider.is_multi());
    }

    #[test]
    fn test_multi_flag() {
        let provider = Provider::value("plugins", 1u8).multi();
        assert!(provider.is_multi());
        assert_eq!(provider.kind(), "value");
    }

    #[test]
    fn test_literal_builder() {
        let literal = ProviderLiteral::new("logger").use_class::<Logger>().multi(true);
        assert_eq!(literal.token, Some(Token::from("logger")));
        assert!(literal.use_class.is_some());
        assert!(literal.use_value.is_none());
        assert!(literal.multi);
    }
}
