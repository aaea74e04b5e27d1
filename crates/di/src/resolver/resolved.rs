use crate::errors::{BoxError, DiError};
use crate::providers::{Args, FactoryRef, Instance, Provider};
use crate::reflection::{ReflectTarget, Reflector};
use crate::resolver::dependency::{extract_dependencies, Dependency};
use crate::tokens::{DualKey, KeyRegistry, Token};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

type InvokeFn = Arc<dyn Fn(Args) -> Result<Instance, BoxError> + Send + Sync>;

/// A provider's way of producing one value, with the dependencies it needs
/// in argument order
#[derive(Clone)]
pub struct ResolvedFactory {
    invoke: InvokeFn,
    dependencies: Vec<Dependency>,
}

impl ResolvedFactory {
    /// Build the factory for `provider`
    pub fn from_provider(
        provider: &Provider,
        keys: &KeyRegistry,
        reflector: &dyn Reflector,
    ) -> Result<Self, DiError> {
        match provider {
            Provider::Value { value, .. } => {
                let value = value.clone();
                Ok(Self::new(Vec::new(), move |_| Ok(value.clone())))
            }
            Provider::Class { class, .. } => {
                let dependencies =
                    extract_dependencies(ReflectTarget::Constructor(class), keys, reflector)?;
                let class = class.clone();
                Ok(Self::new(dependencies, move |mut args| class.construct(&mut args)))
            }
            Provider::Alias { target, .. } => {
                let dependencies = vec![Dependency::required(keys.dual_key(target))];
                Ok(Self::new(dependencies, |mut args| Ok(args.next_instance()?)))
            }
            Provider::Factory {
                factory: FactoryRef::Function(function),
                ..
            } => {
                let dependencies =
                    extract_dependencies(ReflectTarget::Function(function), keys, reflector)?;
                let function = function.clone();
                Ok(Self::new(dependencies, move |mut args| function.call(&mut args)))
            }
            Provider::Factory {
                factory: FactoryRef::Method { class, method },
                ..
            } => {
                let mut dependencies =
                    extract_dependencies(ReflectTarget::Constructor(class), keys, reflector)?;
                let arity = dependencies.len();
                dependencies.extend(extract_dependencies(
                    ReflectTarget::Method { class, method },
                    keys,
                    reflector,
                )?);

                let class = class.clone();
                let method = method.clone();
                Ok(Self::new(dependencies, move |mut args| {
                    let mut method_args = args.split_off(arity);
                    let receiver = class.construct(&mut args)?;
                    method.call(&receiver, &mut method_args)
                }))
            }
        }
    }

    pub fn new<F>(dependencies: Vec<Dependency>, invoke: F) -> Self
    where
        F: Fn(Args) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            invoke: Arc::new(invoke),
            dependencies,
        }
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub(crate) fn invoke(&self, args: Args) -> Result<Instance, BoxError> {
        (self.invoke)(args)
    }

    fn rekeyed(&self, keys: &KeyRegistry) -> Self {
        let dependencies = self
            .dependencies
            .iter()
            .map(|dependency| Dependency {
                dual_key: keys.dual_key(dependency.token()),
                ..dependency.clone()
            })
            .collect();
        Self {
            invoke: self.invoke.clone(),
            dependencies,
        }
    }
}

impl std::fmt::Debug for ResolvedFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFactory")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Everything an injector needs to produce the value of one token
///
/// `factories` holds more than one entry only for multi providers.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub dual_key: DualKey,
    pub factories: Vec<ResolvedFactory>,
    pub multi: bool,
}

impl ResolvedProvider {
    pub fn token(&self) -> &Token {
        &self.dual_key.token
    }

    pub fn id(&self) -> u32 {
        self.dual_key.id
    }
}

/// Immutable map from token id to resolved provider
///
/// Ids belong to the [`KeyRegistry`] the declarations were resolved with.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    keys: Option<Uuid>,
    providers: HashMap<u32, Arc<ResolvedProvider>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn keyed_by(keys: &KeyRegistry) -> Self {
        Self {
            keys: Some(keys.id()),
            providers: HashMap::new(),
        }
    }

    /// Whether the ids of this registry come from `keys`
    ///
    /// An empty registry fits any key registry.
    pub fn is_keyed_by(&self, keys: &KeyRegistry) -> bool {
        self.is_empty() || self.keys.map_or(true, |id| id == keys.id())
    }

    /// Copy of this registry with every id taken from `keys`
    pub fn rekeyed(&self, keys: &KeyRegistry) -> Registry {
        let mut registry = Registry::keyed_by(keys);
        for provider in self.providers.values() {
            registry.insert(ResolvedProvider {
                dual_key: keys.dual_key(provider.token()),
                factories: provider
                    .factories
                    .iter()
                    .map(|factory| factory.rekeyed(keys))
                    .collect(),
                multi: provider.multi,
            });
        }
        registry
    }

    pub(crate) fn insert(&mut self, provider: ResolvedProvider) {
        self.providers.insert(provider.id(), Arc::new(provider));
    }

    /// Provider registered under `id`
    pub fn get(&self, id: u32) -> Option<&Arc<ResolvedProvider>> {
        self.providers.get(&id)
    }

    /// Whether a provider for `token` is registered
    pub fn contains(&self, token: &Token) -> bool {
        self.providers.values().any(|provider| provider.token() == token)
    }

    pub fn contains_id(&self, id: u32) -> bool {
        self.providers.contains_key(&id)
    }

    /// Registered tokens, ordered by id
    pub fn tokens(&self) -> Vec<Token> {
        let mut providers: Vec<&Arc<ResolvedProvider>> = self.providers.values().collect();
        providers.sort_by_key(|provider| provider.id());
        providers.into_iter().map(|provider| provider.token().clone()).collect()
    }

    pub fn providers(&self) -> impl Iterator<Item = &Arc<ResolvedProvider>> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ClassRef, FunctionRef, Injectable, MethodRef};
    use crate::reflection::{DeclaredParams, ParamSpec};

    struct Pool {
        size: u32,
    }

    impl Injectable for Pool {
        fn params() -> Vec<ParamSpec> {
            vec![ParamSpec::token("size")]
        }

        fn construct(args: &mut Args) -> Result<Self, BoxError> {
            Ok(Pool { size: *args.next::<u32>()? })
        }
    }

    fn instance<T: std::any::Any + Send + Sync>(value: T) -> Option<Instance> {
        Some(Arc::new(value))
    }

    #[test]
    fn test_method_factory_splits_arguments() {
        let keys = KeyRegistry::new();
        let method = MethodRef::new(
            "scaled",
            vec![ParamSpec::token("factor")],
            |pool: &Pool, args: &mut Args| Ok(pool.size * *args.next::<u32>()?),
        );
        let provider = Provider::factory_method("scaled", ClassRef::of::<Pool>(), method);

        let factory = ResolvedFactory::from_provider(&provider, &keys, &DeclaredParams).unwrap();
        let tokens: Vec<String> = factory
            .dependencies()
            .iter()
            .map(|d| d.token().to_string())
            .collect();
        assert_eq!(tokens, vec!["size", "factor"]);

        let value = factory.invoke(Args::new(vec![instance(3u32), instance(5u32)])).unwrap();
        assert_eq!(*value.downcast::<u32>().unwrap(), 15);
    }

    #[test]
    fn test_alias_depends_on_target() {
        let keys = KeyRegistry::new();
        let provider = Provider::alias("logger", "console");

        let factory = ResolvedFactory::from_provider(&provider, &keys, &DeclaredParams).unwrap();
        assert_eq!(factory.dependencies()[0].token(), &Token::from("console"));

        let target: Instance = Arc::new(7u8);
        let value = factory.invoke(Args::new(vec![Some(target.clone())])).unwrap();
        assert!(Arc::ptr_eq(&value, &target));
    }

    #[test]
    fn test_rekeyed_registry_uses_new_ids() {
        let first = KeyRegistry::new();
        let second = KeyRegistry::new();
        for name in ["unrelated", "console", "logger"] {
            second.id_of(&Token::from(name));
        }

        let mut registry = Registry::keyed_by(&first);
        for provider in [Provider::value("console", 1u8), Provider::alias("logger", "console")] {
            let factory =
                ResolvedFactory::from_provider(&provider, &first, &DeclaredParams).unwrap();
            registry.insert(ResolvedProvider {
                dual_key: first.dual_key(provider.token()),
                factories: vec![factory],
                multi: false,
            });
        }
        assert!(registry.is_keyed_by(&first));
        assert!(!registry.is_keyed_by(&second));

        let rekeyed = registry.rekeyed(&second);
        assert!(rekeyed.is_keyed_by(&second));
        assert_eq!(rekeyed.tokens(), vec![Token::from("console"), Token::from("logger")]);

        let logger = rekeyed.get(second.id_of(&Token::from("logger"))).unwrap();
        let dependency = &logger.factories[0].dependencies()[0];
        assert_eq!(dependency.dual_key.id, second.id_of(&Token::from("console")));
        assert!(Registry::new().is_keyed_by(&second));
    }

    #[test]
    fn test_function_factory() {
        let keys = KeyRegistry::new();
        let function = FunctionRef::new("answer", Vec::new(), |_| Ok(42u64));
        let provider = Provider::factory("answer", function);

        let factory = ResolvedFactory::from_provider(&provider, &keys, &DeclaredParams).unwrap();
        assert!(factory.dependencies().is_empty());
        assert_eq!(*factory.invoke(Args::default()).unwrap().downcast::<u64>().unwrap(), 42);
    }
}
