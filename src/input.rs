//! Input sources: feed matrices (or, for test fixtures, random gradients)
//! into the graph at step boundaries. Bound to a `Constant` operation so
//! its data refreshes every step instead of staying fixed like a trainable
//! `Variable`'s persistent storage.

use crate::runtime::with_rng;
use crate::shape::Shape;
use rand::Rng;

/// Supplies a fresh (data, shape) pair at the start of each step, and
/// reports how many rows it carries - the batch-size divisor optimizers
/// use to convert an accumulated gradient into a mean gradient.
pub trait InputSource {
    fn next_batch(&mut self) -> (Vec<f32>, Shape);

    /// Number of rows in the most recently produced batch (the leading
    /// dimension of its shape). Used by optimizers as the batch-size
    /// divisor per the mean-gradient convention.
    fn row_count(&self) -> usize;
}

/// A fixed matrix, reused unchanged every step. The common case for
/// feeding a pre-batched input matrix into the graph.
pub struct MatrixInputSource {
    data: Vec<f32>,
    shape: Shape,
}

impl MatrixInputSource {
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        debug_assert_eq!(data.len(), shape.stride());
        MatrixInputSource { data, shape }
    }

    pub fn set(&mut self, data: Vec<f32>, shape: Shape) {
        debug_assert_eq!(data.len(), shape.stride());
        self.data = data;
        self.shape = shape;
    }
}

impl InputSource for MatrixInputSource {
    fn next_batch(&mut self) -> (Vec<f32>, Shape) {
        (self.data.clone(), self.shape.clone())
    }

    fn row_count(&self) -> usize {
        self.shape.dims().first().copied().unwrap_or(1)
    }
}

/// Emits a fresh random matrix of a fixed shape every call, drawn from the
/// thread-local seeded RNG. Used to drive sizing/swap-discipline tests
/// without needing a real dataset.
pub struct RandomGradientSource {
    shape: Shape,
    scale: f32,
}

impl RandomGradientSource {
    pub fn new(shape: Shape, scale: f32) -> Self {
        RandomGradientSource { shape, scale }
    }
}

impl InputSource for RandomGradientSource {
    fn next_batch(&mut self) -> (Vec<f32>, Shape) {
        let n = self.shape.stride();
        let scale = self.scale;
        let data = with_rng(|rng| (0..n).map(|_| rng.gen_range(-scale..=scale)).collect());
        (data, self.shape.clone())
    }

    fn row_count(&self) -> usize {
        self.shape.dims().first().copied().unwrap_or(1)
    }
}
