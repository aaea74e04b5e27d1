pub mod forward_ref;
pub mod registry;
pub mod token;

pub use forward_ref::ForwardRef;
pub use registry::{DualKey, KeyRegistry};
pub use token::{InjectionToken, Token, TypeKey};
