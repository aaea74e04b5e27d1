//! Parameter metadata consumed by the resolver
//!
//! The engine never inspects types itself. It asks a [`Reflector`] for the
//! ordered parameters of a constructor, a factory method or a factory
//! function. [`DeclaredParams`] reads the lists types declare through
//! [`Injectable::params`](crate::Injectable::params); [`MetadataTable`] is a
//! hand written registration table, usable when parameter lists come from
//! code generation or configuration.

pub mod param;
pub mod table;

pub use param::ParamSpec;
pub use table::MetadataTable;

use crate::providers::{ClassRef, FunctionRef, MethodRef};

/// What the resolver asks parameter metadata for
#[derive(Debug, Clone, Copy)]
pub enum ReflectTarget<'a> {
    /// Constructor of a class
    Constructor(&'a ClassRef),
    /// Method of a class used as a factory
    Method {
        class: &'a ClassRef,
        method: &'a MethodRef,
    },
    /// Free factory function
    Function(&'a FunctionRef),
}

impl ReflectTarget<'_> {
    /// Name used in error messages
    pub fn name(&self) -> String {
        match self {
            ReflectTarget::Constructor(class) => class.name(),
            ReflectTarget::Method { class, method } => {
                format!("{}::{}", class.name(), method.name())
            }
            ReflectTarget::Function(function) => function.name().to_string(),
        }
    }
}

/// Source of constructor and factory parameter metadata
pub trait Reflector: Send + Sync {
    /// Ordered parameters of `target`, `None` when the source knows nothing
    /// about it
    fn params_of(&self, target: ReflectTarget<'_>) -> Option<Vec<ParamSpec>>;
}

/// Reflector returning the parameter lists declared on the targets
/// themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredParams;

impl Reflector for DeclaredParams {
    fn params_of(&self, target: ReflectTarget<'_>) -> Option<Vec<ParamSpec>> {
        Some(match target {
            ReflectTarget::Constructor(class) => class.declared_params(),
            ReflectTarget::Method { method, .. } => method.declared_params(),
            ReflectTarget::Function(function) => function.declared_params(),
        })
    }
}
