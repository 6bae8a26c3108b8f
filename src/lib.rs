//! tensorgraph: arena-backed tensor-operation graph with layered autograd
//! and pluggable per-variable optimizers.
//!
//! Layers: arena (TensorPointer, Arena) -> operation (Operation, concrete
//! ops) -> context (ExecutionContext, the step driver) -> optimizer
//! (per-variable state machines).
//!
//! Determinism: use [set_seed] before building input sources for
//! reproducible runs.

pub mod arena;
pub mod check;
pub mod context;
pub mod init;
pub mod input;
pub mod kernel;
pub mod operation;
pub mod optimizer;
pub mod runtime;
pub mod shape;
pub mod state_io;

pub use arena::{Arena, HandleError, HandleResult, Region, TensorPointer};
pub use check::{gradients_close, numerical_gradient};
pub use context::{ContextError, ContextResult, ExecutionContext, GraphError, GraphResult};
pub use init::{he_uniform, xavier_uniform};
pub use input::{InputSource, MatrixInputSource, RandomGradientSource};
pub use operation::{
    Add, BroadcastBias, Constant, HadamardProduct, LeakyReLU, Multiplication, Operation, OperationId,
    SoftmaxCrossEntropy, Variable,
};
pub use optimizer::{Adam, ConfigurationError, Optimizer, OptimizerError, SharedInputSource, AMSGrad, SGD};
pub use runtime::{set_seed, with_rng};
pub use shape::{Shape, ShapeError, ShapeResult};
pub use state_io::{load_state_dict, save_state_dict, VariableState};
