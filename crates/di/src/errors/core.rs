use crate::config::ConfigError;
use crate::errors::chain::DependencyChain;
use crate::tokens::Token;
use thiserror::Error;

/// Error type returned by user supplied constructors and factories
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while declaring, resolving or instantiating providers
#[derive(Debug, Error)]
pub enum DiError {
    #[error("Invalid provider: {message}")]
    InvalidProvider { message: String },

    #[error("Cannot mix multi providers and regular providers for {token}")]
    MixedMultiProviders { token: String },

    #[error("Cannot resolve all parameters for '{provider}': parameter at position {position} has no token. Declare it with an explicit inject token")]
    CannotResolveParameters { provider: String, position: usize },

    #[error("No provider for {token}!{}", .chain.resolving_path())]
    NoProviderForToken {
        token: String,
        chain: DependencyChain,
    },

    #[error("Cannot instantiate cyclic dependency!{}", .chain.resolving_path())]
    CyclicDependency { chain: DependencyChain },

    #[error("Error during instantiation of {token}!{}: {source}", .chain.resolving_path())]
    InstantiationError {
        token: String,
        chain: DependencyChain,
        source: BoxError,
    },

    #[error("Instance of {token} is not a '{expected}'")]
    TypeMismatch { token: String, expected: &'static str },

    #[error("Resolution depth limit of {limit} exceeded!{}", .chain.resolving_path())]
    ResolutionDepthExceeded {
        limit: usize,
        chain: DependencyChain,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DiError {
    /// Create a new invalid provider error
    pub fn invalid_provider(message: impl Into<String>) -> Self {
        Self::InvalidProvider {
            message: message.into(),
        }
    }

    /// Create a new mixed multi providers error
    pub fn mixed_multi(token: &Token) -> Self {
        Self::MixedMultiProviders {
            token: token.to_string(),
        }
    }

    /// Create a new unresolvable parameter error
    pub fn cannot_resolve_parameters(provider: impl Into<String>, position: usize) -> Self {
        Self::CannotResolveParameters {
            provider: provider.into(),
            position,
        }
    }

    /// Create a new missing provider error
    pub fn no_provider(token: &Token, chain: DependencyChain) -> Self {
        Self::NoProviderForToken {
            token: token.to_string(),
            chain,
        }
    }

    /// Create a new cyclic dependency error
    pub fn cyclic(chain: DependencyChain) -> Self {
        Self::CyclicDependency { chain }
    }

    /// Wrap an error raised by a constructor or factory
    pub fn instantiation(token: &Token, chain: DependencyChain, source: BoxError) -> Self {
        Self::InstantiationError {
            token: token.to_string(),
            chain,
            source,
        }
    }

    /// Create a new type mismatch error
    pub fn type_mismatch(token: &Token, expected: &'static str) -> Self {
        Self::TypeMismatch {
            token: token.to_string(),
            expected,
        }
    }

    /// Dependency chain carried by resolution errors
    pub fn chain(&self) -> Option<&DependencyChain> {
        match self {
            Self::NoProviderForToken { chain, .. }
            | Self::CyclicDependency { chain }
            | Self::InstantiationError { chain, .. }
            | Self::ResolutionDepthExceeded { chain, .. } => Some(chain),
            _ => None,
        }
    }

    /// Check if the error is a missing provider error
    pub fn is_no_provider(&self) -> bool {
        matches!(self, Self::NoProviderForToken { .. })
    }

    /// Check if the error is a cyclic dependency error
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::CyclicDependency { .. })
    }

    /// Check if the error wraps a constructor or factory failure
    pub fn is_instantiation(&self) -> bool {
        matches!(self, Self::InstantiationError { .. })
    }

    /// Check if the error was raised while declaring or resolving providers
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidProvider { .. }
                | Self::MixedMultiProviders { .. }
                | Self::CannotResolveParameters { .. }
                | Self::Config(_)
        )
    }
}
