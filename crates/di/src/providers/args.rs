use crate::providers::Instance;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while a constructor reads its resolved arguments
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Argument at position {position} was not resolved")]
    Missing { position: usize },

    #[error("Argument at position {position} is optional and no provider was found")]
    Absent { position: usize },

    #[error("Argument at position {position} is not a '{expected}'")]
    TypeMismatch {
        position: usize,
        expected: &'static str,
    },
}

/// Resolved dependencies handed to a constructor or factory, in declaration
/// order
///
/// Optional dependencies without a provider are passed as `None`.
#[derive(Debug, Default)]
pub struct Args {
    values: std::vec::IntoIter<Option<Instance>>,
    position: usize,
}

impl Args {
    pub fn new(values: Vec<Option<Instance>>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Number of arguments not consumed yet
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Next argument, which has to be present
    pub fn next_instance(&mut self) -> Result<Instance, ArgumentError> {
        let position = self.position;
        self.next_optional_instance()?
            .ok_or(ArgumentError::Absent { position })
    }

    /// Next argument, `None` when it was optional and not provided
    pub fn next_optional_instance(&mut self) -> Result<Option<Instance>, ArgumentError> {
        let position = self.position;
        let value = self
            .values
            .next()
            .ok_or(ArgumentError::Missing { position })?;
        self.position += 1;
        Ok(value)
    }

    /// Next argument downcast to `T`
    pub fn next<T: Any + Send + Sync>(&mut self) -> Result<Arc<T>, ArgumentError> {
        let position = self.position;
        downcast_arg(self.next_instance()?, position)
    }

    /// Next optional argument downcast to `T`
    pub fn next_optional<T: Any + Send + Sync>(&mut self) -> Result<Option<Arc<T>>, ArgumentError> {
        let position = self.position;
        self.next_optional_instance()?
            .map(|instance| downcast_arg(instance, position))
            .transpose()
    }

    /// Next argument resolved from a multi provider
    pub fn next_multi(&mut self) -> Result<Vec<Instance>, ArgumentError> {
        let position = self.position;
        let list = self.next::<Vec<Instance>>().map_err(|_| ArgumentError::TypeMismatch {
            position,
            expected: std::any::type_name::<Vec<Instance>>(),
        })?;
        Ok(list.as_ref().clone())
    }

    /// Next multi provider argument with every element downcast to `T`
    pub fn next_multi_of<T: Any + Send + Sync>(&mut self) -> Result<Vec<Arc<T>>, ArgumentError> {
        let position = self.position;
        self.next_multi()?
            .into_iter()
            .map(|instance| downcast_arg(instance, position))
            .collect()
    }

    /// Split off the arguments from `at` onwards, leaving the first `at`
    /// arguments in `self`
    pub(crate) fn split_off(&mut self, at: usize) -> Args {
        let mut head: Vec<Option<Instance>> = self.values.by_ref().collect();
        let tail = head.split_off(at.min(head.len()));
        self.values = head.into_iter();
        Args::new(tail)
    }
}

fn downcast_arg<T: Any + Send + Sync>(
    instance: Instance,
    position: usize,
) -> Result<Arc<T>, ArgumentError> {
    instance.downcast::<T>().map_err(|_| ArgumentError::TypeMismatch {
        position,
        expected: std::any::type_name::<T>(),
    })
}
