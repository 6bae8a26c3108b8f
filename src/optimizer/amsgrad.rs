//! AMSGrad: Adam's moment updates plus an elementwise running max of the
//! second moment, used undiscounted (no bias correction) in the update.

use super::{batch_divisor, check_lengths, ConfigurationError, ConfigurationResult, Optimizer, OptimizerResult, SharedInputSource};

pub struct AMSGrad {
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
    batch_source: SharedInputSource,
    m: Vec<f32>,
    v: Vec<f32>,
    v_max: Vec<f32>,
    t: u32,
}

impl AMSGrad {
    pub fn new(lr: f32, batch_source: Option<SharedInputSource>) -> ConfigurationResult<Self> {
        let batch_source = batch_source.ok_or(ConfigurationError::MissingInputSource)?;
        Ok(AMSGrad {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            batch_source,
            m: Vec::new(),
            v: Vec::new(),
            v_max: Vec::new(),
            t: 0,
        })
    }

    pub fn with_betas(mut self, beta1: f32, beta2: f32) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    pub fn v_max(&self) -> &[f32] {
        &self.v_max
    }
}

impl Optimizer for AMSGrad {
    fn step(&mut self, data: &mut [f32], grad: &[f32]) -> OptimizerResult<()> {
        check_lengths(data, grad)?;
        if self.m.is_empty() {
            self.m = vec![0.0; data.len()];
            self.v = vec![0.0; data.len()];
            self.v_max = vec![0.0; data.len()];
        }
        self.t += 1;
        let divisor = batch_divisor(&Some(self.batch_source.clone()));

        for i in 0..data.len() {
            let g = grad[i] / divisor;
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;
            self.v_max[i] = self.v_max[i].max(self.v[i]);
            data[i] -= self.lr * self.m[i] / (self.v_max[i].sqrt() + self.eps);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MatrixInputSource;
    use crate::shape::Shape;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fixed_batch(rows: usize) -> SharedInputSource {
        Rc::new(RefCell::new(MatrixInputSource::new(
            vec![0.0; rows],
            Shape::new(vec![rows, 1]),
        )))
    }

    #[test]
    fn v_max_is_elementwise_non_decreasing() {
        let mut opt = AMSGrad::new(0.05, Some(fixed_batch(1))).unwrap();
        let mut data = vec![0.0, 0.0];
        let grads = [[1.0, 3.0], [4.0, 0.5], [0.1, 5.0], [2.0, 2.0]];
        let mut prev = vec![0.0f32; 2];
        for g in grads {
            opt.step(&mut data, &g).unwrap();
            for (p, &cur) in prev.iter().zip(opt.v_max()) {
                assert!(cur + 1e-6 >= *p, "v_max decreased: {} -> {}", p, cur);
            }
            prev = opt.v_max().to_vec();
        }
    }
}
