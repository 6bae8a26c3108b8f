//! Plain SGD: theta <- theta - lr * g.

use super::{batch_divisor, check_lengths, Optimizer, OptimizerResult, SharedInputSource};

pub struct SGD {
    pub lr: f32,
    batch_source: Option<SharedInputSource>,
}

impl SGD {
    pub fn new(lr: f32) -> Self {
        SGD {
            lr,
            batch_source: None,
        }
    }

    /// Divide each step's gradient by the bound source's row count before
    /// applying it, matching the mean-gradient convention used elsewhere.
    pub fn with_batch_source(mut self, source: SharedInputSource) -> Self {
        self.batch_source = Some(source);
        self
    }
}

impl Optimizer for SGD {
    fn step(&mut self, data: &mut [f32], grad: &[f32]) -> OptimizerResult<()> {
        check_lengths(data, grad)?;
        let divisor = batch_divisor(&self.batch_source);
        for (d, g) in data.iter_mut().zip(grad) {
            *d -= self.lr * (g / divisor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_learning_rate_leaves_storage_unchanged() {
        let mut opt = SGD::new(0.0);
        let mut data = vec![1.0, 2.0, 3.0];
        let grad = vec![5.0, -5.0, 2.0];
        let before = data.clone();
        for _ in 0..10 {
            opt.step(&mut data, &grad).unwrap();
        }
        assert_eq!(data, before);
    }

    #[test]
    fn plain_update_matches_closed_form() {
        let mut opt = SGD::new(0.1);
        let mut data = vec![1.0];
        opt.step(&mut data, &[2.0]).unwrap();
        assert!((data[0] - 0.8).abs() < 1e-6);
    }
}
