//! LeakyReLU(alpha, X): y = x if x > 0 else alpha * x.
//! Backward (left only): dL/dX = dL/dY * (x > 0 ? 1 : alpha).

use crate::kernel;
use crate::shape::Shape;

pub struct LeakyReLU {
    pub(crate) alpha: f32,
}

impl LeakyReLU {
    pub fn new(alpha: f32, input: &Shape) -> (Self, Shape) {
        (LeakyReLU { alpha }, input.clone())
    }

    pub(crate) fn forward(&self, x: &[f32]) -> Vec<f32> {
        kernel::leaky_relu(x, self.alpha)
    }

    pub(crate) fn backward_left(&self, grad_out: &[f32], x: &[f32]) -> Vec<f32> {
        kernel::leaky_relu_backward(x, self.alpha, grad_out)
    }
}
