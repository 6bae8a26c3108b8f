//! Constant: a registered leaf like `Variable` but with no optimizer - it
//! never receives a gradient. May be bound to an [`InputSource`] so its
//! data refreshes every step (the usual way input matrices and labels
//! enter the graph); otherwise it holds fixed data for the context's
//! lifetime (zeros, identity matrices, test fixtures).

use crate::input::InputSource;
use crate::shape::Shape;

pub struct Constant {
    pub(crate) data: Vec<f32>,
    pub(crate) shape: Shape,
    source: Option<Box<dyn InputSource>>,
}

impl Constant {
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        debug_assert_eq!(data.len(), shape.stride());
        Constant {
            data,
            shape,
            source: None,
        }
    }

    pub fn from_source(mut source: Box<dyn InputSource>, shape: Shape) -> Self {
        let (data, actual_shape) = source.next_batch();
        debug_assert_eq!(actual_shape.stride(), shape.stride());
        Constant {
            data,
            shape,
            source: Some(source),
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn forward(&mut self) -> (Vec<f32>, Shape) {
        if let Some(source) = self.source.as_mut() {
            let (data, shape) = source.next_batch();
            self.data = data;
            self.shape = shape;
        }
        (self.data.clone(), self.shape.clone())
    }
}
