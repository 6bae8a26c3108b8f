//! HadamardProduct(A, B): elementwise multiply.
//! Backward: left = dL/dY ⊙ B, right = dL/dY ⊙ A.

use crate::kernel;
use crate::shape::{Shape, ShapeResult};

pub struct HadamardProduct;

impl HadamardProduct {
    pub fn new(left: &Shape, right: &Shape) -> ShapeResult<(Self, Shape)> {
        left.require_same_as(right, "HadamardProduct")?;
        Ok((HadamardProduct, left.clone()))
    }

    pub(crate) fn forward(&self, left: &[f32], right: &[f32]) -> Vec<f32> {
        kernel::hadamard(left, right)
    }

    pub(crate) fn backward_left(&self, grad_out: &[f32], right: &[f32]) -> Vec<f32> {
        kernel::hadamard(grad_out, right)
    }

    pub(crate) fn backward_right(&self, grad_out: &[f32], left: &[f32]) -> Vec<f32> {
        kernel::hadamard(grad_out, left)
    }
}
