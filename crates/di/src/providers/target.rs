use crate::errors::BoxError;
use crate::providers::args::Args;
use crate::reflection::ParamSpec;
use crate::tokens::{Token, TypeKey};
use std::any::Any;
use std::sync::Arc;

/// Instance produced by a provider and stored in injector caches
pub type Instance = Arc<dyn Any + Send + Sync>;

type ConstructFn = Arc<dyn Fn(&mut Args) -> Result<Instance, BoxError> + Send + Sync>;
type MethodFn = Arc<dyn Fn(&Instance, &mut Args) -> Result<Instance, BoxError> + Send + Sync>;

/// Types the injector can construct
///
/// `params` is the parameter metadata [`DeclaredParams`](crate::reflection::DeclaredParams)
/// hands to the resolver; `construct` reads the resolved arguments in the same
/// order.
///
/// ```rust
/// use elif_di::{Args, BoxError, Injectable, ParamSpec};
/// use std::sync::Arc;
///
/// struct Engine;
///
/// impl Injectable for Engine {
///     fn construct(_args: &mut Args) -> Result<Self, BoxError> {
///         Ok(Engine)
///     }
/// }
///
/// struct Car {
///     engine: Arc<Engine>,
/// }
///
/// impl Injectable for Car {
///     fn params() -> Vec<ParamSpec> {
///         vec![ParamSpec::of::<Engine>()]
///     }
///
///     fn construct(args: &mut Args) -> Result<Self, BoxError> {
///         Ok(Car { engine: args.next::<Engine>()? })
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Constructor parameters, in the order `construct` reads them
    fn params() -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Build an instance from resolved arguments
    fn construct(args: &mut Args) -> Result<Self, BoxError>;
}

/// Handle to an injectable type: its identity, declared constructor
/// parameters and constructor
#[derive(Clone)]
pub struct ClassRef {
    key: TypeKey,
    params: fn() -> Vec<ParamSpec>,
    construct: ConstructFn,
}

impl ClassRef {
    pub fn of<T: Injectable>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            params: T::params,
            construct: Arc::new(|args: &mut Args| -> Result<Instance, BoxError> {
                Ok(Arc::new(T::construct(args)?) as Instance)
            }),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Type token of the class
    pub fn token(&self) -> Token {
        Token::Type(self.key)
    }

    /// Short type name
    pub fn name(&self) -> String {
        self.key.short_name()
    }

    pub fn declared_params(&self) -> Vec<ParamSpec> {
        (self.params)()
    }

    pub(crate) fn construct(&self, args: &mut Args) -> Result<Instance, BoxError> {
        (self.construct)(args)
    }
}

impl std::fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ClassRef").field(&self.key).finish()
    }
}

/// Method of a class used as a factory
#[derive(Clone)]
pub struct MethodRef {
    name: &'static str,
    params: Arc<[ParamSpec]>,
    call: MethodFn,
}

impl MethodRef {
    /// Wrap `method`, called on a freshly constructed `C` with the resolved
    /// method parameters
    pub fn new<C, R, F>(name: &'static str, params: Vec<ParamSpec>, method: F) -> Self
    where
        C: Any + Send + Sync,
        R: Any + Send + Sync,
        F: Fn(&C, &mut Args) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        let call: MethodFn = Arc::new(
            move |receiver: &Instance, args: &mut Args| -> Result<Instance, BoxError> {
                let receiver = receiver.downcast_ref::<C>().ok_or_else(|| -> BoxError {
                    let expected = std::any::type_name::<C>();
                    format!("method '{}' expects a '{}' receiver", name, expected).into()
                })?;
                Ok(Arc::new(method(receiver, args)?) as Instance)
            },
        );
        Self {
            name,
            params: params.into(),
            call,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_params(&self) -> Vec<ParamSpec> {
        self.params.to_vec()
    }

    pub(crate) fn call(&self, receiver: &Instance, args: &mut Args) -> Result<Instance, BoxError> {
        (self.call)(receiver, args)
    }
}

impl std::fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MethodRef").field(&self.name).finish()
    }
}

/// Free function used as a factory
#[derive(Clone)]
pub struct FunctionRef {
    name: &'static str,
    params: Arc<[ParamSpec]>,
    call: ConstructFn,
}

impl FunctionRef {
    pub fn new<R, F>(name: &'static str, params: Vec<ParamSpec>, function: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&mut Args) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        Self {
            name,
            params: params.into(),
            call: Arc::new(move |args: &mut Args| -> Result<Instance, BoxError> {
                Ok(Arc::new(function(args)?) as Instance)
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_params(&self) -> Vec<ParamSpec> {
        self.params.to_vec()
    }

    pub(crate) fn call(&self, args: &mut Args) -> Result<Instance, BoxError> {
        (self.call)(args)
    }
}

impl std::fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FunctionRef").field(&self.name).finish()
    }
}

/// How a factory provider produces its value
#[derive(Debug, Clone)]
pub enum FactoryRef {
    /// Call a free function
    Function(FunctionRef),
    /// Construct `class`, then call `method` on it
    Method { class: ClassRef, method: MethodRef },
}

impl FactoryRef {
    /// Name used in error messages, e.g. `build_pool` or `PoolFactory::create`
    pub fn name(&self) -> String {
        match self {
            FactoryRef::Function(function) => function.name().to_string(),
            FactoryRef::Method { class, method } => format!("{}::{}", class.name(), method.name()),
        }
    }
}

impl From<FunctionRef> for FactoryRef {
    fn from(function: FunctionRef) -> Self {
        FactoryRef::Function(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pool {
        size: u32,
    }

    impl Injectable for Pool {
        fn construct(_args: &mut Args) -> Result<Self, BoxError> {
            Ok(Pool { size: 4 })
        }
    }

    #[test]
    fn test_class_ref_constructs_instances() {
        let class = ClassRef::of::<Pool>();
        let instance = class.construct(&mut Args::default()).unwrap();

        assert_eq!(instance.downcast::<Pool>().unwrap().size, 4);
        assert_eq!(class.name(), "Pool");
        assert_eq!(class.token(), Token::of::<Pool>());
        assert!(class.declared_params().is_empty());
    }

    #[test]
    fn test_method_ref_checks_receiver_type() {
        let method = MethodRef::new("doubled", Vec::new(), |pool: &Pool, _args: &mut Args| {
            Ok(pool.size * 2)
        });
        let pool: Instance = Arc::new(Pool { size: 3 });
        let wrong: Instance = Arc::new(3u32);

        let value = method.call(&pool, &mut Args::default()).unwrap();
        assert_eq!(*value.downcast::<u32>().unwrap(), 6);
        assert!(method.call(&wrong, &mut Args::default()).is_err());
    }

    #[test]
    fn test_factory_names() {
        let function = FactoryRef::from(FunctionRef::new("build_pool", Vec::new(), |_| {
            Ok(Pool { size: 1 })
        }));
        let method = FactoryRef::Method {
            class: ClassRef::of::<Pool>(),
            method: MethodRef::new("create", Vec::new(), |pool: &Pool, _: &mut Args| Ok(pool.size)),
        };

        assert_eq!(function.name(), "build_pool");
        assert_eq!(method.name(), "Pool::create");
    }
}
