//! Graph node layer: a small fixed algebra of concrete operations dispatched
//! through one enum rather than trait objects (the set is closed at eight
//! variants, which favors inlining over vtable indirection), plus the
//! `Operation` wrapper that gives every node a stable integer identity, a
//! `next` pointer forming the reverse spine the layering pass walks, and the
//! cached forward/backward state the execution context reads and writes.

mod add;
mod broadcast_bias;
mod constant;
mod hadamard;
mod leaky_relu;
mod multiplication;
mod softmax_cross_entropy;
mod variable;

pub use add::Add;
pub use broadcast_bias::BroadcastBias;
pub use constant::Constant;
pub use hadamard::HadamardProduct;
pub use leaky_relu::LeakyReLU;
pub use multiplication::Multiplication;
pub use softmax_cross_entropy::SoftmaxCrossEntropy;
pub use variable::Variable;

use crate::arena::TensorPointer;
use crate::shape::Shape;

/// Stable identifier of an [`Operation`] within one [`crate::context::ExecutionContext`].
/// An arena-of-ops indexed by this id stands in for true cyclic references:
/// a node's `next` is the id of its consumer, set by the consumer's
/// constructor into its input, never a shared mutable reference.
pub type OperationId = usize;

/// The closed set of concrete node kinds. Each variant owns exactly the
/// state its forward/backward math needs; shape validation already
/// happened in the variant's own constructor, so dispatch here never fails.
pub enum OperationKind {
    Variable(Variable),
    Constant(Constant),
    Add(Add),
    Multiplication(Multiplication),
    Hadamard(HadamardProduct),
    LeakyReLU(LeakyReLU),
    SoftmaxCrossEntropy(SoftmaxCrossEntropy),
    BroadcastBias(BroadcastBias),
}

impl OperationKind {
    fn name(&self) -> &'static str {
        match self {
            OperationKind::Variable(_) => "Variable",
            OperationKind::Constant(_) => "Constant",
            OperationKind::Add(_) => "Add",
            OperationKind::Multiplication(_) => "Multiplication",
            OperationKind::Hadamard(_) => "HadamardProduct",
            OperationKind::LeakyReLU(_) => "LeakyReLU",
            OperationKind::SoftmaxCrossEntropy(_) => "SoftmaxCrossEntropy",
            OperationKind::BroadcastBias(_) => "BroadcastBias",
        }
    }
}

/// A graph node: its concrete kind, up to two upstream inputs, a downstream
/// `next` pointer, the layer it has been assigned to, and the cached state
/// a single step's forward/backward pass needs.
pub struct Operation {
    pub(crate) kind: OperationKind,
    pub(crate) left: Option<OperationId>,
    pub(crate) right: Option<OperationId>,
    /// Downstream consumer, set by the consumer's own constructor. `None`
    /// marks a terminal operation (no consumer; a root of backward).
    pub(crate) next: Option<OperationId>,
    /// Unset until the layering pass runs, then `Some(i)` with `i` in `[0, layer_count)`.
    pub(crate) layer_index: Option<usize>,
    pub(crate) max_result_shape: Shape,
    pub(crate) left_shape: Option<Shape>,
    pub(crate) right_shape: Option<Shape>,
    /// Cached forward handle for this side's input, reused by backward.
    pub(crate) left_operand_result: Option<TensorPointer>,
    pub(crate) right_operand_result: Option<TensorPointer>,
    /// This node's own forward result, reused when the derivative needs it
    /// (e.g. softmax-CE backward reads the cached softmax, not this handle,
    /// but most other ops differentiate in terms of their own output).
    pub(crate) forward_result: Option<TensorPointer>,
    /// The upstream gradient delivered by `next`, consumed by backward.
    pub(crate) derivative_chain_value: Option<TensorPointer>,
    /// True iff this node or any input (transitively) is a trainable Variable.
    pub(crate) requires_backward_derivative: bool,
    /// Step counter at which `forward_result` was last computed; lets the
    /// context assert a node is not read stale across a step boundary.
    pub(crate) computed_at_step: Option<u64>,
}

impl Operation {
    pub(crate) fn leaf(kind: OperationKind, max_result_shape: Shape, requires_backward_derivative: bool) -> Self {
        Operation {
            kind,
            left: None,
            right: None,
            next: None,
            layer_index: None,
            max_result_shape,
            left_shape: None,
            right_shape: None,
            left_operand_result: None,
            right_operand_result: None,
            forward_result: None,
            derivative_chain_value: None,
            requires_backward_derivative,
            computed_at_step: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn unary(
        kind: OperationKind,
        left: OperationId,
        left_shape: Shape,
        max_result_shape: Shape,
        requires_backward_derivative: bool,
    ) -> Self {
        Operation {
            kind,
            left: Some(left),
            right: None,
            next: None,
            layer_index: None,
            max_result_shape,
            left_shape: Some(left_shape),
            right_shape: None,
            left_operand_result: None,
            right_operand_result: None,
            forward_result: None,
            derivative_chain_value: None,
            requires_backward_derivative,
            computed_at_step: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn binary(
        kind: OperationKind,
        left: OperationId,
        right: OperationId,
        left_shape: Shape,
        right_shape: Shape,
        max_result_shape: Shape,
        requires_backward_derivative: bool,
    ) -> Self {
        Operation {
            kind,
            left: Some(left),
            right: Some(right),
            next: None,
            layer_index: None,
            max_result_shape,
            left_shape: Some(left_shape),
            right_shape: Some(right_shape),
            left_operand_result: None,
            right_operand_result: None,
            forward_result: None,
            derivative_chain_value: None,
            requires_backward_derivative,
            computed_at_step: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn left(&self) -> Option<OperationId> {
        self.left
    }

    pub fn right(&self) -> Option<OperationId> {
        self.right
    }

    pub fn next(&self) -> Option<OperationId> {
        self.next
    }

    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }

    pub fn layer_index(&self) -> Option<usize> {
        self.layer_index
    }

    pub fn max_result_shape(&self) -> &Shape {
        &self.max_result_shape
    }

    /// Upper bound on the float footprint this node allocates in the
    /// forward arena during one `forwardPass`: exactly its own output.
    pub fn forward_footprint(&self) -> usize {
        self.max_result_shape.stride()
    }

    /// Upper bound on the float footprint this node allocates in the
    /// backward arena during one `backStep`: one slot per side that
    /// requires a derivative, each sized to that side's input shape.
    pub fn backward_footprint(&self) -> usize {
        let mut total = 0;
        if self.requires_backward_derivative {
            if let Some(shape) = &self.left_shape {
                total += shape.stride();
            }
            if matches!(self.kind, OperationKind::Add(_) | OperationKind::Multiplication(_) | OperationKind::Hadamard(_)) {
                if let Some(shape) = &self.right_shape {
                    total += shape.stride();
                }
            }
        }
        total
    }
}
