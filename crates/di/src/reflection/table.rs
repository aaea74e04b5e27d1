use crate::reflection::{ParamSpec, ReflectTarget, Reflector};
use crate::tokens::TypeKey;
use std::collections::HashMap;
use std::sync::Arc;

/// Manually registered parameter metadata
///
/// Lookups the table has no entry for go to the fallback reflector, if any.
///
/// ```rust
/// use elif_di::reflection::{DeclaredParams, MetadataTable, ParamSpec};
///
/// struct Mailer;
/// struct Transport;
///
/// let table = MetadataTable::new()
///     .constructor::<Mailer>(vec![ParamSpec::of::<Transport>()])
///     .with_fallback(DeclaredParams);
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MetadataTable {
    constructors: HashMap<TypeKey, Vec<ParamSpec>>,
    methods: HashMap<(TypeKey, &'static str), Vec<ParamSpec>>,
    functions: HashMap<&'static str, Vec<ParamSpec>>,
    fallback: Option<Arc<dyn Reflector>>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constructor parameters of `T`
    pub fn constructor<T: ?Sized + 'static>(mut self, params: Vec<ParamSpec>) -> Self {
        self.constructors.insert(TypeKey::of::<T>(), params);
        self
    }

    /// Register the parameters of method `name` of `T`
    pub fn method<T: ?Sized + 'static>(
        mut self,
        name: &'static str,
        params: Vec<ParamSpec>,
    ) -> Self {
        self.methods.insert((TypeKey::of::<T>(), name), params);
        self
    }

    /// Register the parameters of the factory function `name`
    pub fn function(mut self, name: &'static str, params: Vec<ParamSpec>) -> Self {
        self.functions.insert(name, params);
        self
    }

    /// Reflector asked when the table has no entry
    pub fn with_fallback(mut self, fallback: impl Reflector + 'static) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.constructors.len() + self.methods.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Reflector for MetadataTable {
    fn params_of(&self, target: ReflectTarget<'_>) -> Option<Vec<ParamSpec>> {
        let registered = match target {
            ReflectTarget::Constructor(class) => self.constructors.get(&class.key()),
            ReflectTarget::Method { class, method } => {
                self.methods.get(&(class.key(), method.name()))
            }
            ReflectTarget::Function(function) => self.functions.get(function.name()),
        };

        match registered {
            Some(params) => Some(params.clone()),
            None => self.fallback.as_ref().and_then(|fallback| fallback.params_of(target)),
        }
    }
}

impl std::fmt::Debug for MetadataTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataTable")
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .field("functions", &self.functions.len())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
