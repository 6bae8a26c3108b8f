//! Optimizers: per-variable state machines that consume an accumulated
//! gradient and mutate variable storage in place. Each optimizer instance
//! is bound to exactly one `Variable`, so its step counter and moment
//! buffers belong to that variable, not to the execution context - two
//! variables trained with different learning rates or step counts never
//! interfere with each other.

mod adam;
mod amsgrad;
mod sgd;

pub use adam::Adam;
pub use amsgrad::AMSGrad;
pub use sgd::SGD;

use crate::input::InputSource;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// A handle shared between the `Constant`/input-bound operation producing
/// batches and the optimizer reading off the batch size divisor. Shared,
/// not copied, because the optimizer must see whatever batch size the
/// *current* step actually used.
pub type SharedInputSource = Rc<RefCell<dyn InputSource>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("optimizer requires a batch-size input source but none was provided")]
    MissingInputSource,
}

pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("gradient length {grad_len} does not match variable length {variable_len}")]
    LengthMismatch { grad_len: usize, variable_len: usize },
}

pub type OptimizerResult<T> = Result<T, OptimizerError>;

/// Updates a variable's persistent storage in place from an accumulated
/// gradient of the same length. Single-threaded by design: optimizers that
/// need a batch-size divisor hold a [`SharedInputSource`], which is an
/// `Rc<RefCell<..>>` and so is itself neither `Send` nor `Sync`.
pub trait Optimizer {
    fn step(&mut self, data: &mut [f32], grad: &[f32]) -> OptimizerResult<()>;
}

fn batch_divisor(source: &Option<SharedInputSource>) -> f32 {
    match source {
        Some(src) => (src.borrow().row_count().max(1)) as f32,
        None => 1.0,
    }
}

fn check_lengths(data: &[f32], grad: &[f32]) -> OptimizerResult<()> {
    if data.len() != grad.len() {
        return Err(OptimizerError::LengthMismatch {
            grad_len: grad.len(),
            variable_len: data.len(),
        });
    }
    Ok(())
}
