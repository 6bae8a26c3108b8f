//! BroadcastBias(B): replicates a bias vector of length `k` across `n`
//! rows, producing a `[n, k]` tensor. Backward sums the incoming
//! gradient back down to the bias shape along the row dimension.

use crate::kernel;
use crate::shape::{Shape, ShapeError, ShapeResult};

pub struct BroadcastBias {
    n: usize,
    k: usize,
}

impl BroadcastBias {
    pub fn new(bias: &Shape, rows: usize) -> ShapeResult<(Self, Shape)> {
        let k = bias.stride();
        if k == 0 {
            return Err(ShapeError::Empty {
                context: "BroadcastBias",
                shape: bias.clone(),
            });
        }
        Ok((BroadcastBias { n: rows, k }, Shape::new(vec![rows, k])))
    }

    pub(crate) fn forward(&self, bias: &[f32]) -> Vec<f32> {
        kernel::broadcast_rows(bias, self.n)
    }

    pub(crate) fn backward_left(&self, grad_out: &[f32]) -> Vec<f32> {
        kernel::sum_rows(grad_out, self.n, self.k)
    }
}
