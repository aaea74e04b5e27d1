use crate::engine::DiEngine;
use crate::errors::DiError;
use crate::injector::context::ResolutionContext;
use crate::providers::{Args, Instance, ProviderDecl};
use crate::resolver::{Registry, ResolvedFactory, ResolvedProvider, Visibility};
use crate::tokens::{DualKey, Token};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use uuid::Uuid;

/// Scope holding a provider registry and the instances created from it
///
/// Lookups that miss locally continue in the parent chain, then in sibling
/// injectors registered for the token. Instances are cached in the injector
/// that owns the provider, so every injector is a singleton scope for its
/// own providers. Cloning an `Injector` yields another handle to the same
/// scope.
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

struct InjectorInner {
    id: Uuid,
    level: usize,
    engine: DiEngine,
    registry: Registry,
    parent: Option<Injector>,
    cache: RwLock<HashMap<u32, Instance>>,
    siblings: RwLock<Vec<SiblingBridge>>,
}

/// Non-owning handle to an injector
#[derive(Clone)]
pub struct WeakInjector {
    inner: Weak<InjectorInner>,
}

impl WeakInjector {
    pub fn upgrade(&self) -> Option<Injector> {
        self.inner.upgrade().map(|inner| Injector { inner })
    }
}

struct SiblingBridge {
    injector: WeakInjector,
    ids: HashSet<u32>,
}

enum Located {
    Cached(Instance),
    Provider {
        owner: Injector,
        provider: Arc<ResolvedProvider>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lookup {
    /// Cached instances satisfy the lookup
    Instances,
    /// Only providers count, caches are ignored
    Providers,
}

impl Injector {
    /// Resolve declarations into a registry without creating an injector
    pub fn resolve(engine: &DiEngine, decls: Vec<ProviderDecl>) -> Result<Registry, DiError> {
        engine.resolve(decls)
    }

    /// Create a root injector for an already resolved registry
    pub fn root(engine: &DiEngine, registry: Registry) -> Result<Injector, DiError> {
        let injector = Self::create(engine.clone(), registry, None);
        injector.check_if_configured()?;
        Ok(injector)
    }

    fn create(engine: DiEngine, registry: Registry, parent: Option<Injector>) -> Injector {
        let registry = if registry.is_keyed_by(engine.keys()) {
            registry
        } else {
            tracing::debug!(
                "Re-keying {} provider(s) resolved by another engine",
                registry.len()
            );
            registry.rekeyed(engine.keys())
        };
        let level = parent.as_ref().map(|parent| parent.level() + 1).unwrap_or(0);
        let injector = Injector {
            inner: Arc::new(InjectorInner {
                id: Uuid::new_v4(),
                level,
                engine,
                registry,
                parent,
                cache: RwLock::new(HashMap::new()),
                siblings: RwLock::new(Vec::new()),
            }),
        };
        tracing::debug!(
            "Created injector {} at level {} with {} provider(s)",
            injector.id(),
            level,
            injector.registry().len()
        );
        injector
    }

    /// Resolve `decls` and create a child scope for them
    pub fn resolve_and_create_child(&self, decls: Vec<ProviderDecl>) -> Result<Injector, DiError> {
        let registry = self.engine().resolve(decls)?;
        let child = self.create_child_from_resolved(registry);
        child.check_if_configured()?;
        Ok(child)
    }

    /// Create a child scope for an already resolved registry
    ///
    /// A registry resolved by another engine is re-keyed with this engine's
    /// token ids first.
    pub fn create_child_from_resolved(&self, registry: Registry) -> Injector {
        Self::create(self.engine().clone(), registry, Some(self.clone()))
    }

    fn check_if_configured(&self) -> Result<(), DiError> {
        if self.engine().config().check_on_create {
            self.check_all()?;
        }
        Ok(())
    }

    /// Let lookups for `tokens` that fail in this injector's parent chain
    /// fall back to `sibling`
    ///
    /// The sibling is held weakly and has to come from the same engine.
    pub fn add_sibling<I, T>(&self, sibling: &Injector, tokens: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        if !self.engine().ptr_eq(sibling.engine()) {
            tracing::warn!(
                "Ignoring sibling {} of injector {}: it belongs to another engine",
                sibling.id(),
                self.id()
            );
            return;
        }

        let keys = self.engine().keys();
        let ids: HashSet<u32> = tokens.into_iter().map(|token| keys.id_of(&token.into())).collect();
        tracing::debug!(
            "Injector {} falls back to sibling {} for {} token(s)",
            self.id(),
            sibling.id(),
            ids.len()
        );

        self.inner
            .siblings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SiblingBridge {
                injector: sibling.downgrade(),
                ids,
            });
    }

    /// Value of `token`, instantiating and caching it on first access
    pub fn get(&self, token: &Token) -> Result<Instance, DiError> {
        self.get_with(token, Visibility::Default, None)
    }

    /// Value of `token` looked up with `visibility`; `default` is returned
    /// when no provider is reachable
    pub fn get_with(
        &self,
        token: &Token,
        visibility: Visibility,
        default: Option<Instance>,
    ) -> Result<Instance, DiError> {
        let key = self.engine().keys().dual_key(token);
        let mut ctx = self.context();
        match self.resolve_key(&key, visibility, &mut ctx)? {
            Some(instance) => Ok(instance),
            None => {
                default.ok_or_else(|| DiError::no_provider(&key.token, ctx.chain_with(&key.token)))
            }
        }
    }

    /// Like [`get`](Self::get), returning `None` when no provider is reachable
    pub fn try_get(&self, token: &Token) -> Result<Option<Instance>, DiError> {
        let key = self.engine().keys().dual_key(token);
        self.resolve_key(&key, Visibility::Default, &mut self.context())
    }

    /// Value of the type token of `T`, downcast to `T`
    pub fn get_as<T: Any + Send + Sync>(&self) -> Result<Arc<T>, DiError> {
        self.get_token_as::<T>(&Token::of::<T>())
    }

    /// Value of `token` downcast to `T`
    pub fn get_token_as<T: Any + Send + Sync>(&self, token: &Token) -> Result<Arc<T>, DiError> {
        self.get(token)?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch(token, std::any::type_name::<T>()))
    }

    /// Values of a multi provider, in declaration order
    pub fn get_multi(&self, token: &Token) -> Result<Vec<Instance>, DiError> {
        let list = self.get_token_as::<Vec<Instance>>(token)?;
        Ok(list.as_ref().clone())
    }

    /// Whether a provider for `token` is reachable with `visibility`
    pub fn has(&self, token: &Token, visibility: Visibility) -> bool {
        let id = self.engine().keys().id_of(token);
        self.locate(id, visibility, Lookup::Providers, &mut vec![self.id()]).is_some()
    }

    /// Find the provider of `token` anywhere in the hierarchy, but
    /// instantiate and cache it in this injector
    ///
    /// Dependencies of the pulled provider are resolved from this injector,
    /// which gives request scoped copies of application level providers.
    pub fn pull(&self, token: &Token) -> Result<Instance, DiError> {
        let key = self.engine().keys().dual_key(token);
        if let Some(instance) = self.cached(key.id) {
            return Ok(instance);
        }

        let mut ctx = self.context();
        match self.locate(key.id, Visibility::Default, Lookup::Providers, &mut vec![self.id()]) {
            Some(Located::Provider { provider, .. }) => {
                self.instantiate_and_cache(&provider, &mut ctx)
            }
            _ => Err(DiError::no_provider(&key.token, ctx.chain_with(&key.token))),
        }
    }

    /// Build a one-off value for `decl`, resolving its dependencies from this
    /// injector without caching the result
    pub fn resolve_and_instantiate(
        &self,
        decl: impl Into<ProviderDecl>,
    ) -> Result<Instance, DiError> {
        let registry = self.engine().resolve(vec![decl.into()])?;
        let mut providers = registry.providers();
        let provider = match (providers.next(), providers.next()) {
            (Some(provider), None) => provider,
            _ => {
                return Err(DiError::invalid_provider(
                    "resolve_and_instantiate expects exactly one provider token",
                ))
            }
        };
        self.instantiate(provider, &mut self.context())
    }

    /// Walk the dependency graph of `token` without instantiating anything
    ///
    /// Reports the same `NoProviderForToken` and `CyclicDependency` errors,
    /// with the same chains, that `get` would raise.
    pub fn check_deps(&self, token: &Token) -> Result<(), DiError> {
        let key = self.engine().keys().dual_key(token);
        let mut ctx = self.context();
        if self.check_key(&key, Visibility::Default, &mut ctx, &mut HashSet::new())? {
            Ok(())
        } else {
            Err(DiError::no_provider(&key.token, ctx.chain_with(&key.token)))
        }
    }

    /// Dry run [`check_deps`](Self::check_deps) for every provider of this
    /// injector
    pub fn check_all(&self) -> Result<(), DiError> {
        let mut providers: Vec<&Arc<ResolvedProvider>> = self.registry().providers().collect();
        providers.sort_by_key(|provider| provider.id());

        let mut checked = HashSet::new();
        for provider in providers {
            self.check_provider(provider, &mut self.context(), &mut checked)?;
        }
        tracing::debug!("Checked {} provider(s) of injector {}", self.registry().len(), self.id());
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Depth in the hierarchy, 0 for a root injector
    pub fn level(&self) -> usize {
        self.inner.level
    }

    pub fn parent(&self) -> Option<&Injector> {
        self.inner.parent.as_ref()
    }

    pub fn engine(&self) -> &DiEngine {
        &self.inner.engine
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn downgrade(&self) -> WeakInjector {
        WeakInjector {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same scope
    pub fn ptr_eq(&self, other: &Injector) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn context(&self) -> ResolutionContext {
        ResolutionContext::new(self.engine().config().max_resolution_depth)
    }

    fn cached(&self, id: u32) -> Option<Instance> {
        self.inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn locate(
        &self,
        id: u32,
        visibility: Visibility,
        lookup: Lookup,
        visited: &mut Vec<Uuid>,
    ) -> Option<Located> {
        if visibility.includes_self() {
            if lookup == Lookup::Instances {
                if let Some(instance) = self.cached(id) {
                    return Some(Located::Cached(instance));
                }
            }
            if let Some(provider) = self.registry().get(id) {
                return Some(Located::Provider {
                    owner: self.clone(),
                    provider: provider.clone(),
                });
            }
        }

        if !visibility.includes_ancestors() {
            return None;
        }

        if let Some(parent) = self.parent() {
            if let Some(located) = parent.locate(id, Visibility::Default, lookup, visited) {
                return Some(located);
            }
        }

        self.locate_in_siblings(id, lookup, visited)
    }

    fn locate_in_siblings(
        &self,
        id: u32,
        lookup: Lookup,
        visited: &mut Vec<Uuid>,
    ) -> Option<Located> {
        let candidates: Vec<Injector> = self
            .inner
            .siblings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|bridge| bridge.ids.contains(&id))
            .filter_map(|bridge| bridge.injector.upgrade())
            .collect();

        for sibling in candidates {
            if visited.contains(&sibling.id()) {
                continue;
            }
            visited.push(sibling.id());
            if let Some(located) = sibling.locate(id, Visibility::Default, lookup, visited) {
                tracing::trace!(
                    "Injector {} resolved id {} through sibling {}",
                    self.id(),
                    id,
                    sibling.id()
                );
                return Some(located);
            }
        }
        None
    }

    fn resolve_key(
        &self,
        key: &DualKey,
        visibility: Visibility,
        ctx: &mut ResolutionContext,
    ) -> Result<Option<Instance>, DiError> {
        match self.locate(key.id, visibility, Lookup::Instances, &mut vec![self.id()]) {
            None => Ok(None),
            Some(Located::Cached(instance)) => {
                tracing::trace!("Cache hit for {}", key.token);
                Ok(Some(instance))
            }
            Some(Located::Provider { owner, provider }) => {
                owner.instantiate_and_cache(&provider, ctx).map(Some)
            }
        }
    }

    fn instantiate_and_cache(
        &self,
        provider: &ResolvedProvider,
        ctx: &mut ResolutionContext,
    ) -> Result<Instance, DiError> {
        let instance = self.instantiate(provider, ctx)?;
        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(provider.id()).or_insert(instance).clone())
    }

    fn instantiate(
        &self,
        provider: &ResolvedProvider,
        ctx: &mut ResolutionContext,
    ) -> Result<Instance, DiError> {
        ctx.enter(self.id(), &provider.dual_key)?;
        let result = self.instantiate_entered(provider, ctx);
        ctx.exit();
        result
    }

    fn instantiate_entered(
        &self,
        provider: &ResolvedProvider,
        ctx: &mut ResolutionContext,
    ) -> Result<Instance, DiError> {
        tracing::debug!(
            "Instantiating {} in injector {} (depth {})",
            provider.token(),
            self.id(),
            ctx.depth()
        );

        if provider.multi {
            let mut values = Vec::with_capacity(provider.factories.len());
            for factory in &provider.factories {
                values.push(self.run_factory(provider, factory, ctx)?);
            }
            return Ok(Arc::new(values) as Instance);
        }

        match provider.factories.last() {
            Some(factory) => self.run_factory(provider, factory, ctx),
            None => Err(DiError::no_provider(provider.token(), ctx.chain())),
        }
    }

    fn run_factory(
        &self,
        provider: &ResolvedProvider,
        factory: &ResolvedFactory,
        ctx: &mut ResolutionContext,
    ) -> Result<Instance, DiError> {
        let mut values = Vec::with_capacity(factory.dependencies().len());
        for dependency in factory.dependencies() {
            let value = self.resolve_key(&dependency.dual_key, dependency.visibility, ctx)?;
            if value.is_none() && !dependency.optional {
                let chain = ctx.chain_with(dependency.token());
                return Err(DiError::no_provider(dependency.token(), chain));
            }
            values.push(value);
        }

        factory
            .invoke(Args::new(values))
            .map_err(|source| DiError::instantiation(provider.token(), ctx.chain(), source))
    }

    fn check_key(
        &self,
        key: &DualKey,
        visibility: Visibility,
        ctx: &mut ResolutionContext,
        checked: &mut HashSet<(Uuid, u32)>,
    ) -> Result<bool, DiError> {
        match self.locate(key.id, visibility, Lookup::Providers, &mut vec![self.id()]) {
            None => Ok(false),
            Some(Located::Cached(_)) => Ok(true),
            Some(Located::Provider { owner, provider }) => {
                owner.check_provider(&provider, ctx, checked)?;
                Ok(true)
            }
        }
    }

    fn check_provider(
        &self,
        provider: &ResolvedProvider,
        ctx: &mut ResolutionContext,
        checked: &mut HashSet<(Uuid, u32)>,
    ) -> Result<(), DiError> {
        if checked.contains(&(self.id(), provider.id())) {
            return Ok(());
        }

        ctx.enter(self.id(), &provider.dual_key)?;
        let result = self.check_entered(provider, ctx, checked);
        ctx.exit();

        if result.is_ok() {
            checked.insert((self.id(), provider.id()));
        } else {
            tracing::trace!("Dependency check failed for {}", provider.token());
        }
        result
    }

    fn check_entered(
        &self,
        provider: &ResolvedProvider,
        ctx: &mut ResolutionContext,
        checked: &mut HashSet<(Uuid, u32)>,
    ) -> Result<(), DiError> {
        for factory in &provider.factories {
            for dependency in factory.dependencies() {
                let found =
                    self.check_key(&dependency.dual_key, dependency.visibility, ctx, checked)?;
                if !found && !dependency.optional {
                    let chain = ctx.chain_with(dependency.token());
                    return Err(DiError::no_provider(dependency.token(), chain));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("id", &self.inner.id)
            .field("level", &self.inner.level)
            .field("providers", &self.inner.registry.len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

impl std::fmt::Debug for WeakInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakInjector")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
