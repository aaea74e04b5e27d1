//! Provider lists to registries
//!
//! Resolution is purely structural: providers are normalized, grouped by
//! token id and their parameters extracted. Nothing is instantiated here.

pub mod dependency;
pub mod resolved;
pub mod visibility;

pub use dependency::{extract_dependencies, Dependency};
pub use resolved::{Registry, ResolvedFactory, ResolvedProvider};
pub use visibility::Visibility;

use crate::config::DiConfig;
use crate::errors::DiError;
use crate::providers::{normalize_providers, Provider, ProviderDecl};
use crate::reflection::Reflector;
use crate::tokens::KeyRegistry;
use std::collections::HashMap;

/// Turn raw declarations into a [`Registry`]
///
/// For regular providers the last declaration of a token wins. Multi
/// providers keep every declaration in order.
pub fn resolve(
    decls: Vec<ProviderDecl>,
    keys: &KeyRegistry,
    reflector: &dyn Reflector,
    config: &DiConfig,
) -> Result<Registry, DiError> {
    let providers = normalize_providers(decls)?;

    let mut order: Vec<u32> = Vec::new();
    let mut groups: HashMap<u32, Vec<Provider>> = HashMap::new();
    for provider in providers {
        let id = keys.id_of(provider.token());
        groups
            .entry(id)
            .or_insert_with(|| {
                order.push(id);
                Vec::new()
            })
            .push(provider);
    }

    let mut registry = Registry::keyed_by(keys);
    for id in order {
        let Some(mut group) = groups.remove(&id) else {
            continue;
        };
        let multi = group.first().map(Provider::is_multi).unwrap_or(false);
        if group.iter().any(|provider| provider.is_multi() != multi) {
            return Err(DiError::mixed_multi(group[0].token()));
        }

        if !multi && group.len() > 1 {
            let shadowed = group.len() - 1;
            if config.log_shadowed_providers {
                tracing::debug!(
                    "Provider for {} shadows {} earlier declaration(s)",
                    group[0].token(),
                    shadowed
                );
            }
            group.drain(..shadowed);
        }

        let factories = group
            .iter()
            .map(|provider| ResolvedFactory::from_provider(provider, keys, reflector))
            .collect::<Result<Vec<_>, _>>()?;
        let dual_key = keys.dual_key(group[0].token());

        registry.insert(ResolvedProvider {
            dual_key,
            factories,
            multi,
        });
    }

    tracing::trace!("Resolved {} provider(s)", registry.len());
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BoxError;
    use crate::providers::{Args, Injectable, ProviderLiteral};
    use crate::reflection::{DeclaredParams, ParamSpec};
    use crate::tokens::Token;

    struct Engine;

    impl Injectable for Engine {
        fn construct(_args: &mut Args) -> Result<Self, BoxError> {
            Ok(Engine)
        }
    }

    struct Car;

    impl Injectable for Car {
        fn params() -> Vec<ParamSpec> {
            vec![ParamSpec::of::<Engine>()]
        }

        fn construct(_args: &mut Args) -> Result<Self, BoxError> {
            Ok(Car)
        }
    }

    fn run(decls: Vec<ProviderDecl>) -> (KeyRegistry, Result<Registry, DiError>) {
        let keys = KeyRegistry::new();
        let result = resolve(decls, &keys, &DeclaredParams, &DiConfig::default());
        (keys, result)
    }

    #[test]
    fn test_last_declaration_wins() {
        let (keys, registry) = run(vec![
            Provider::value("port", 80u16).into(),
            Provider::value("port", 8080u16).into(),
        ]);
        let registry = registry.unwrap();
        let provider = registry.get(keys.id_of(&Token::from("port"))).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(provider.factories.len(), 1);
        let value = provider.factories[0].invoke(Args::default()).unwrap();
        assert_eq!(*value.downcast::<u16>().unwrap(), 8080);
    }

    #[test]
    fn test_multi_keeps_every_declaration() {
        let (keys, registry) = run(vec![
            Provider::value("plugins", 1u8).multi().into(),
            ProviderLiteral::new("plugins").use_value(2u8).multi(true).into(),
        ]);
        let registry = registry.unwrap();
        let provider = registry.get(keys.id_of(&Token::from("plugins"))).unwrap();

        assert!(provider.multi);
        assert_eq!(provider.factories.len(), 2);
    }

    #[test]
    fn test_mixed_multi_is_rejected() {
        let (_, registry) = run(vec![
            Provider::value("plugins", 1u8).multi().into(),
            Provider::value("plugins", 2u8).into(),
        ]);
        assert!(matches!(registry, Err(DiError::MixedMultiProviders { .. })));
    }

    #[test]
    fn test_registry_helpers() {
        let (_, registry) = run(vec![
            ProviderDecl::class::<Engine>(),
            ProviderDecl::class::<Car>(),
        ]);
        let registry = registry.unwrap();

        assert!(registry.contains(&Token::of::<Car>()));
        assert!(!registry.contains(&Token::from("Car")));
        assert_eq!(registry.tokens(), vec![Token::of::<Engine>(), Token::of::<Car>()]);
    }

    #[test]
    fn test_dependencies_are_extracted() {
        let (keys, registry) = run(vec![ProviderDecl::class::<Car>()]);
        let registry = registry.unwrap();
        let car = registry.get(keys.id_of(&Token::of::<Car>())).unwrap();

        assert_eq!(car.factories[0].dependencies()[0].token(), &Token::of::<Engine>());
    }
}
