use crate::errors::DiError;
use crate::providers::provider::{Provider, ProviderDecl, ProviderLiteral};
use crate::tokens::Token;
use std::collections::HashMap;

/// Flatten raw declarations into normalized providers, keeping declaration
/// order
///
/// Fails with `InvalidProvider` for malformed literals and with
/// `MixedMultiProviders` as soon as one token is declared both as a multi
/// and as a regular provider.
pub fn normalize_providers(decls: Vec<ProviderDecl>) -> Result<Vec<Provider>, DiError> {
    let mut providers = Vec::with_capacity(decls.len());
    flatten(decls, &mut providers)?;
    check_multi_consistency(&providers)?;
    Ok(providers)
}

fn flatten(decls: Vec<ProviderDecl>, out: &mut Vec<Provider>) -> Result<(), DiError> {
    for decl in decls {
        match decl {
            ProviderDecl::Class(class) => out.push(Provider::Class {
                token: class.token(),
                class,
                multi: false,
            }),
            ProviderDecl::Provider(provider) => out.push(provider),
            ProviderDecl::Literal(literal) => out.push(normalize_literal(literal)?),
            ProviderDecl::Nested(nested) => flatten(nested, out)?,
        }
    }
    Ok(())
}

fn normalize_literal(literal: ProviderLiteral) -> Result<Provider, DiError> {
    let ProviderLiteral {
        token,
        use_value,
        use_class,
        use_token,
        use_factory,
        multi,
    } = literal;

    let token = token.ok_or_else(|| DiError::invalid_provider("provider literal has no token"))?;

    match (use_value, use_class, use_token, use_factory) {
        (Some(value), None, None, None) => Ok(Provider::Value { token, value, multi }),
        (None, Some(class), None, None) => Ok(Provider::Class { token, class, multi }),
        (None, None, Some(target), None) => Ok(Provider::Alias { token, target, multi }),
        (None, None, None, Some(factory)) => Ok(Provider::Factory { token, factory, multi }),
        (None, None, None, None) => Err(DiError::invalid_provider(format!(
            "provider for {} must set one of use_value, use_class, use_token or use_factory",
            token
        ))),
        _ => Err(DiError::invalid_provider(format!(
            "provider for {} sets more than one of use_value, use_class, use_token and use_factory",
            token
        ))),
    }
}

fn check_multi_consistency(providers: &[Provider]) -> Result<(), DiError> {
    let mut seen: HashMap<&Token, bool> = HashMap::new();
    for provider in providers {
        let multi = provider.is_multi();
        if let Some(previous) = seen.insert(provider.token(), multi) {
            if previous != multi {
                return Err(DiError::mixed_multi(provider.token()));
            }
        }
    }
    Ok(())
}
