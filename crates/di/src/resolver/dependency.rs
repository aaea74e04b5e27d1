use crate::errors::DiError;
use crate::reflection::{ParamSpec, ReflectTarget, Reflector};
use crate::resolver::Visibility;
use crate::tokens::{DualKey, KeyRegistry, Token};

/// One resolved parameter of a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub dual_key: DualKey,
    pub optional: bool,
    pub visibility: Visibility,
}

impl Dependency {
    /// Required dependency with default visibility
    pub fn required(dual_key: DualKey) -> Self {
        Self {
            dual_key,
            optional: false,
            visibility: Visibility::Default,
        }
    }

    pub fn token(&self) -> &Token {
        &self.dual_key.token
    }
}

/// Ask `reflector` for the parameters of `target` and turn them into
/// dependencies
///
/// A target the reflector knows nothing about has no parameters. Fails with
/// `CannotResolveParameters` when a parameter carries neither an inferred
/// nor an explicit token.
pub fn extract_dependencies(
    target: ReflectTarget<'_>,
    keys: &KeyRegistry,
    reflector: &dyn Reflector,
) -> Result<Vec<Dependency>, DiError> {
    let params = reflector.params_of(target).unwrap_or_default();
    to_dependencies(&target.name(), &params, keys)
}

fn to_dependencies(
    provider: &str,
    params: &[ParamSpec],
    keys: &KeyRegistry,
) -> Result<Vec<Dependency>, DiError> {
    params
        .iter()
        .enumerate()
        .map(|(position, param)| -> Result<Dependency, DiError> {
            let token = param
                .resolved_token()
                .ok_or_else(|| DiError::cannot_resolve_parameters(provider, position))?;
            Ok(Dependency {
                dual_key: keys.dual_key(token),
                optional: param.optional,
                visibility: param.visibility,
            })
        })
        .collect()
}
