//! Shape: an immutable ordered sequence of positive dimension sizes. Stride
//! (the product of the dims) is the length of the flat float slot a shape
//! describes; arenas allocate by stride, never by shape directly.

use std::fmt;
use thiserror::Error;

/// Errors raised when two shapes are incompatible for an operation. Always
/// carries both offending shapes so callers can report a useful diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("{context}: shape mismatch, expected {expected} found {found}")]
    Mismatch {
        context: &'static str,
        expected: Shape,
        found: Shape,
    },
    #[error("{context}: expected rank {expected}, found rank {found} (shape {shape})")]
    Rank {
        context: &'static str,
        expected: usize,
        found: usize,
        shape: Shape,
    },
    #[error("matmul: inner dimensions disagree, ({m}x{k1}) . ({k2}x{n})")]
    MatmulInner {
        m: usize,
        k1: usize,
        k2: usize,
        n: usize,
    },
    #[error("{context}: zero-length shape is not allowed (shape {shape})")]
    Empty { context: &'static str, shape: Shape },
}

pub type ShapeResult<T> = Result<T, ShapeError>;

/// Ordered dimension sizes. `stride()` (the product of dims) is the number
/// of float elements a tensor of this shape occupies.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    pub fn scalar() -> Self {
        Shape::new(vec![1, 1])
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total element count; this is the arena slot length for this shape.
    pub fn stride(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn same_as(&self, other: &Shape) -> bool {
        self.dims == other.dims
    }

    pub fn is_scalar(&self) -> bool {
        self.stride() == 1
    }

    /// Require this shape to equal `other`, tagging the error with `context`.
    pub fn require_same_as(&self, other: &Shape, context: &'static str) -> ShapeResult<()> {
        if self.same_as(other) {
            Ok(())
        } else {
            Err(ShapeError::Mismatch {
                context,
                expected: other.clone(),
                found: self.clone(),
            })
        }
    }

    pub fn require_rank(&self, rank: usize, context: &'static str) -> ShapeResult<()> {
        if self.rank() == rank {
            Ok(())
        } else {
            Err(ShapeError::Rank {
                context,
                expected: rank,
                found: self.rank(),
                shape: self.clone(),
            })
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape{:?}", self.dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_product_of_dims() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.stride(), 24);
        assert_eq!(s.rank(), 3);
    }

    #[test]
    fn require_same_as_reports_both_shapes() {
        let a = Shape::new(vec![2, 3]);
        let b = Shape::new(vec![3, 2]);
        let err = a.require_same_as(&b, "add").unwrap_err();
        match err {
            ShapeError::Mismatch { expected, found, .. } => {
                assert_eq!(expected, b);
                assert_eq!(found, a);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
