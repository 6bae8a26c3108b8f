//! Variable: a registered graph root with persistent float storage and a
//! bound optimizer. Forward copies its storage into a fresh forward slot;
//! backward defers entirely to the optimizer, fired by the execution
//! context once the gradient has been delivered.

use crate::optimizer::Optimizer;
use crate::shape::Shape;

pub struct Variable {
    pub(crate) storage: Vec<f32>,
    pub(crate) shape: Shape,
    pub(crate) optimizer: Box<dyn Optimizer>,
    pub(crate) name: Option<String>,
}

impl Variable {
    pub fn new(data: Vec<f32>, shape: Shape, optimizer: Box<dyn Optimizer>) -> Self {
        debug_assert_eq!(data.len(), shape.stride());
        Variable {
            storage: data,
            shape,
            optimizer,
            name: None,
        }
    }

    pub fn named(name: impl Into<String>, data: Vec<f32>, shape: Shape, optimizer: Box<dyn Optimizer>) -> Self {
        let mut v = Self::new(data, shape, optimizer);
        v.name = Some(name.into());
        v
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.storage
    }

    pub(crate) fn forward(&self) -> (Vec<f32>, Shape) {
        (self.storage.clone(), self.shape.clone())
    }

    pub(crate) fn apply_gradient(&mut self, grad: &[f32]) -> crate::optimizer::OptimizerResult<()> {
        self.optimizer.step(&mut self.storage, grad)
    }

    /// Overwrite persistent storage from a state-dict snapshot. Used only
    /// by [`crate::state_io::load_state_dict`]; optimizer state (m, v, step
    /// counter) is untouched.
    pub(crate) fn restore(&mut self, data: &[f32]) {
        debug_assert_eq!(data.len(), self.storage.len());
        self.storage.copy_from_slice(data);
    }
}
