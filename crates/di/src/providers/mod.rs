pub mod args;
pub mod normalize;
pub mod provider;
pub mod target;

pub use args::{ArgumentError, Args};
pub use normalize::normalize_providers;
pub use provider::{Provider, ProviderDecl, ProviderLiteral};
pub use target::{ClassRef, FactoryRef, FunctionRef, Injectable, Instance, MethodRef};
