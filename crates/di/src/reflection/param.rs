use crate::resolver::Visibility;
use crate::tokens::Token;

/// Metadata for one constructor or factory parameter
///
/// `inferred` is the token the metadata source derived from the parameter
/// type; `explicit` is an `inject(token)` override and wins when both are
/// present.
#[derive(Debug, Clone, Default)]
pub struct ParamSpec {
    pub inferred: Option<Token>,
    pub explicit: Option<Token>,
    pub optional: bool,
    pub visibility: Visibility,
}

impl ParamSpec {
    /// Parameter whose token is inferred from the type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            inferred: Some(Token::of::<T>()),
            ..Self::default()
        }
    }

    /// Parameter injected through an explicit token
    pub fn token(token: impl Into<Token>) -> Self {
        Self::untyped().inject(token)
    }

    /// Parameter without an inferable token, e.g. a trait object
    pub fn untyped() -> Self {
        Self::default()
    }

    /// Override the inferred token
    pub fn inject(mut self, token: impl Into<Token>) -> Self {
        self.explicit = Some(token.into());
        self
    }

    /// Resolve to `None` instead of failing when no provider exists
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Only look in the injector that owns the provider
    pub fn from_self(mut self) -> Self {
        self.visibility = Visibility::FromSelf;
        self
    }

    /// Skip the injector that owns the provider and start in its parent
    pub fn skip_self(mut self) -> Self {
        self.visibility = Visibility::SkipSelf;
        self
    }

    /// Token used for resolution, if any
    pub fn resolved_token(&self) -> Option<&Token> {
        self.explicit.as_ref().or(self.inferred.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;

    #[test]
    fn test_explicit_token_wins() {
        let param = ParamSpec::of::<Database>().inject("primary_db");
        assert_eq!(param.resolved_token(), Some(&Token::from("primary_db")));
    }

    #[test]
    fn test_untyped_param_has_no_token() {
        assert!(ParamSpec::untyped().resolved_token().is_none());
    }

    #[test]
    fn test_modifiers() {
        let param = ParamSpec::of::<Database>().optional().skip_self();
        assert!(param.optional);
        assert_eq!(param.visibility, Visibility::SkipSelf);

        let param = ParamSpec::token("cache").from_self();
        assert_eq!(param.visibility, Visibility::FromSelf);
        assert!(!param.optional);
    }
}
