//! Add(A, B): elementwise sum, with an explicit row-broadcast mode for
//! adding a bias-shaped right operand to every row of a batched left
//! operand. Backward passes the incoming gradient through unchanged on
//! the left; on a broadcast right it sums the gradient down to the
//! bias shape along the batch dimension first.

use crate::kernel;
use crate::shape::{Shape, ShapeError, ShapeResult};

pub struct Add {
    rows: usize,
    cols: usize,
    broadcast_right: bool,
}

impl Add {
    /// Plain elementwise add: both operands share `shape`.
    pub fn elementwise(left: &Shape, right: &Shape) -> ShapeResult<(Self, Shape)> {
        left.require_same_as(right, "Add")?;
        let dims = left.dims();
        let (rows, cols) = match dims.len() {
            1 => (1, dims[0]),
            2 => (dims[0], dims[1]),
            _ => (1, left.stride()),
        };
        Ok((
            Add {
                rows,
                cols,
                broadcast_right: false,
            },
            left.clone(),
        ))
    }

    /// Row-broadcast add: `left` is `[rows, cols]`, `right` is `[cols]`
    /// (or `[1, cols]`) and is replicated across `rows` before summing.
    pub fn row_broadcast(left: &Shape, right: &Shape) -> ShapeResult<(Self, Shape)> {
        left.require_rank(2, "Add (row-broadcast left)")?;
        let dims = left.dims();
        let (rows, cols) = (dims[0], dims[1]);
        let right_len = right.stride();
        if right_len != cols {
            return Err(ShapeError::Mismatch {
                context: "Add (row-broadcast right)",
                expected: Shape::new(vec![cols]),
                found: right.clone(),
            });
        }
        Ok((
            Add {
                rows,
                cols,
                broadcast_right: true,
            },
            left.clone(),
        ))
    }

    pub(crate) fn forward(&self, left: &[f32], right: &[f32]) -> Vec<f32> {
        if self.broadcast_right {
            let broadcast = kernel::broadcast_rows(right, self.rows);
            kernel::add(left, &broadcast)
        } else {
            kernel::add(left, right)
        }
    }

    pub(crate) fn backward_left(&self, grad_out: &[f32]) -> Vec<f32> {
        grad_out.to_vec()
    }

    pub(crate) fn backward_right(&self, grad_out: &[f32]) -> Vec<f32> {
        if self.broadcast_right {
            kernel::sum_rows(grad_out, self.rows, self.cols)
        } else {
            grad_out.to_vec()
        }
    }
}
