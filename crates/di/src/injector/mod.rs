//! Runtime injector hierarchy

mod context;
pub mod scope;

pub use scope::{Injector, WeakInjector};
