//! Hierarchical dependency injection engine for the elif.rs framework
//!
//! Providers bind tokens to values, types, aliases or factories. A
//! [`DiEngine`] resolves declared providers into an immutable [`Registry`];
//! an [`Injector`] instantiates them lazily, caches each instance in the
//! scope that owns its provider and delegates misses to its parent.
//!
//! ```rust
//! use elif_di::{Args, BoxError, DiEngine, Injectable, ParamSpec, ProviderDecl};
//! use std::sync::Arc;
//!
//! struct Engine;
//!
//! impl Injectable for Engine {
//!     fn construct(_args: &mut Args) -> Result<Self, BoxError> {
//!         Ok(Engine)
//!     }
//! }
//!
//! struct Car {
//!     engine: Arc<Engine>,
//! }
//!
//! impl Injectable for Car {
//!     fn params() -> Vec<ParamSpec> {
//!         vec![ParamSpec::of::<Engine>()]
//!     }
//!
//!     fn construct(args: &mut Args) -> Result<Self, BoxError> {
//!         Ok(Car { engine: args.next::<Engine>()? })
//!     }
//! }
//!
//! let root = DiEngine::new()
//!     .root(vec![ProviderDecl::class::<Engine>(), ProviderDecl::class::<Car>()])
//!     .unwrap();
//! let car = root.get_as::<Car>().unwrap();
//! assert!(Arc::ptr_eq(&car.engine, &root.get_as::<Engine>().unwrap()));
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod injector;
pub mod providers;
pub mod reflection;
pub mod resolver;
pub mod tokens;

pub use config::{ConfigError, ConfigSource, DiConfig};
pub use engine::{DiEngine, DiEngineBuilder};
pub use errors::{BoxError, DependencyChain, DiError};
pub use injector::{Injector, WeakInjector};
pub use providers::{
    Args, ArgumentError, ClassRef, FactoryRef, FunctionRef, Injectable, Instance, MethodRef,
    Provider, ProviderDecl, ProviderLiteral,
};
pub use reflection::{DeclaredParams, MetadataTable, ParamSpec, ReflectTarget, Reflector};
pub use resolver::{Dependency, Registry, ResolvedFactory, ResolvedProvider, Visibility};
pub use tokens::{DualKey, ForwardRef, InjectionToken, KeyRegistry, Token, TypeKey};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
