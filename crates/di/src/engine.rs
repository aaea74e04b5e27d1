use crate::config::DiConfig;
use crate::errors::DiError;
use crate::injector::Injector;
use crate::providers::ProviderDecl;
use crate::reflection::{DeclaredParams, Reflector};
use crate::resolver::{self, Registry};
use crate::tokens::KeyRegistry;
use std::sync::Arc;

/// State shared by every injector of one tree: the token registry, the
/// parameter metadata source and the configuration
///
/// Cloning is cheap and shares the same state.
#[derive(Clone)]
pub struct DiEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    keys: KeyRegistry,
    reflector: Arc<dyn Reflector>,
    config: DiConfig,
}

impl DiEngine {
    /// Engine reading declared parameters, with the default configuration
    pub fn new() -> Self {
        Self::from_parts(Arc::new(DeclaredParams), DiConfig::default())
    }

    pub fn builder() -> DiEngineBuilder {
        DiEngineBuilder::default()
    }

    fn from_parts(reflector: Arc<dyn Reflector>, config: DiConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                keys: KeyRegistry::new(),
                reflector,
                config,
            }),
        }
    }

    pub fn keys(&self) -> &KeyRegistry {
        &self.inner.keys
    }

    pub fn reflector(&self) -> &dyn Reflector {
        self.inner.reflector.as_ref()
    }

    pub fn config(&self) -> &DiConfig {
        &self.inner.config
    }

    /// Resolve declarations against this engine's token ids
    pub fn resolve(&self, decls: Vec<ProviderDecl>) -> Result<Registry, DiError> {
        resolver::resolve(decls, self.keys(), self.reflector(), self.config())
    }

    /// Resolve declarations and create a root injector for them
    pub fn root(&self, decls: Vec<ProviderDecl>) -> Result<Injector, DiError> {
        let registry = self.resolve(decls)?;
        Injector::root(self, registry)
    }

    /// Whether both handles share the same state
    pub fn ptr_eq(&self, other: &DiEngine) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for DiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiEngine")
            .field("tokens", &self.inner.keys.len())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`DiEngine`]
#[derive(Default)]
pub struct DiEngineBuilder {
    reflector: Option<Arc<dyn Reflector>>,
    config: Option<DiConfig>,
}

impl DiEngineBuilder {
    /// Parameter metadata source, [`DeclaredParams`] when not set
    pub fn reflector(mut self, reflector: impl Reflector + 'static) -> Self {
        self.reflector = Some(Arc::new(reflector));
        self
    }

    pub fn config(mut self, config: DiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the configuration and build the engine
    pub fn build(self) -> Result<DiEngine, DiError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reflector = self
            .reflector
            .unwrap_or_else(|| Arc::new(DeclaredParams) as Arc<dyn Reflector>);
        tracing::debug!(
            "Created DI engine (max depth {:?}, check on create {})",
            config.max_resolution_depth,
            config.check_on_create
        );
        Ok(DiEngine::from_parts(reflector, config))
    }
}
