//! Multiplication(A, B): matrix multiply with explicit (M, K, N).
//! Backward: left = dL/dY . B^T, right = A^T . dL/dY.

use crate::kernel;
use crate::shape::{Shape, ShapeError, ShapeResult};

pub struct Multiplication {
    m: usize,
    k: usize,
    n: usize,
}

impl Multiplication {
    pub fn new(left: &Shape, right: &Shape) -> ShapeResult<(Self, Shape)> {
        left.require_rank(2, "Multiplication (left)")?;
        right.require_rank(2, "Multiplication (right)")?;
        let (m, k1) = (left.dims()[0], left.dims()[1]);
        let (k2, n) = (right.dims()[0], right.dims()[1]);
        if k1 != k2 {
            return Err(ShapeError::MatmulInner { m, k1, k2, n });
        }
        Ok((Multiplication { m, k: k1, n }, Shape::new(vec![m, n])))
    }

    pub(crate) fn forward(&self, left: &[f32], right: &[f32]) -> Vec<f32> {
        kernel::matmul(left, self.m, self.k, right, self.n)
    }

    pub(crate) fn backward_left(&self, grad_out: &[f32], right: &[f32]) -> Vec<f32> {
        let right_t = kernel::transpose(right, self.k, self.n);
        kernel::matmul(grad_out, self.m, self.n, &right_t, self.k)
    }

    pub(crate) fn backward_right(&self, grad_out: &[f32], left: &[f32]) -> Vec<f32> {
        let left_t = kernel::transpose(left, self.m, self.k);
        kernel::matmul(&left_t, self.k, self.m, grad_out, self.n)
    }
}
