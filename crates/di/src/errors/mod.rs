pub mod chain;
pub mod core;

pub use self::chain::DependencyChain;
pub use self::core::{BoxError, DiError};
