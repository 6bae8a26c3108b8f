//! SoftmaxCrossEntropy(Predicted, Expected): requires a 2-D predicted
//! tensor. Caches softmax(Predicted) on every forward call for reuse in
//! backward. In training mode, forward always returns null - the scalar
//! loss is available on demand via [`SoftmaxCrossEntropy::loss_value`]
//! instead of being materialized into the forward arena every step. In
//! evaluation mode, forward computes and returns the scalar loss.
//! Backward (left only): softmax(P) - E.

use crate::kernel;
use crate::shape::{Shape, ShapeResult};

pub struct SoftmaxCrossEntropy {
    rows: usize,
    cols: usize,
    pub(crate) training: bool,
    cached_softmax: Option<Vec<f32>>,
}

impl SoftmaxCrossEntropy {
    pub fn new(predicted: &Shape, expected: &Shape, training: bool) -> ShapeResult<(Self, Shape)> {
        predicted.require_rank(2, "SoftmaxCrossEntropy (predicted)")?;
        predicted.require_same_as(expected, "SoftmaxCrossEntropy")?;
        let dims = predicted.dims();
        Ok((
            SoftmaxCrossEntropy {
                rows: dims[0],
                cols: dims[1],
                training,
                cached_softmax: None,
            },
            Shape::scalar(),
        ))
    }

    /// Forward: caches softmax(predicted) always; materializes the scalar
    /// loss only outside training mode.
    pub(crate) fn forward(&mut self, predicted: &[f32], expected: &[f32]) -> Option<Vec<f32>> {
        let softmax = kernel::softmax_rows(predicted, self.rows, self.cols);
        self.cached_softmax = Some(softmax.clone());
        if self.training {
            None
        } else {
            Some(vec![self.loss_from(&softmax, expected)])
        }
    }

    /// Recompute the scalar loss on demand from the cached softmax and the
    /// given labels, without touching the forward arena. Valid any time
    /// after `forward` has run this step.
    pub fn loss_value(&self, expected: &[f32]) -> Option<f32> {
        self.cached_softmax
            .as_ref()
            .map(|softmax| self.loss_from(softmax, expected))
    }

    fn loss_from(&self, softmax: &[f32], expected: &[f32]) -> f32 {
        -softmax
            .iter()
            .zip(expected)
            .map(|(p, e)| e * p.ln())
            .sum::<f32>()
    }

    pub(crate) fn backward_left(&self, expected: &[f32]) -> Vec<f32> {
        let softmax = self
            .cached_softmax
            .as_ref()
            .expect("backward called before a forward pass cached softmax");
        kernel::sub(softmax, expected)
    }
}
