//! Adam: first and second moment estimates with bias correction.

use super::{batch_divisor, check_lengths, ConfigurationError, ConfigurationResult, Optimizer, OptimizerResult, SharedInputSource};

pub struct Adam {
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
    batch_source: SharedInputSource,
    m: Vec<f32>,
    v: Vec<f32>,
    t: u32,
}

impl Adam {
    pub fn new(lr: f32, batch_source: Option<SharedInputSource>) -> ConfigurationResult<Self> {
        let batch_source = batch_source.ok_or(ConfigurationError::MissingInputSource)?;
        Ok(Adam {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            batch_source,
            m: Vec::new(),
            v: Vec::new(),
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

    pub fn step_count(&self) -> u32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, data: &mut [f32], grad: &[f32]) -> OptimizerResult<()> {
        check_lengths(data, grad)?;
        if self.m.is_empty() {
            self.m = vec![0.0; data.len()];
            self.v = vec![0.0; data.len()];
        }
        self.t += 1;
        let divisor = batch_divisor(&Some(self.batch_source.clone()));
        let beta1_t = self.beta1.powi(self.t as i32);
        let beta2_t = self.beta2.powi(self.t as i32);
        let bias1 = 1.0 - beta1_t;
        let bias2 = 1.0 - beta2_t;

        for i in 0..data.len() {
            let g = grad[i] / divisor;
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;
            let m_hat = self.m[i] / bias1;
            let v_hat = self.v[i] / bias2;
            data[i] -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
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
    fn missing_batch_source_is_a_configuration_error() {
        assert_eq!(
            Adam::new(0.01, None).unwrap_err(),
            ConfigurationError::MissingInputSource
        );
    }

    #[test]
    fn constant_gradient_shifts_theta_by_about_lr_times_sign() {
        let mut opt = Adam::new(0.1, Some(fixed_batch(1))).unwrap();
        let mut data = vec![0.0];
        let g = 2.0f32;
        let steps = 50;
        for _ in 0..steps {
            opt.step(&mut data, &[g]).unwrap();
        }
        // m -> g, v -> g^2, so each step moves theta by ~ lr * sign(g).
        let expected = -(steps as f32) * 0.1;
        assert!((data[0] - expected).abs() < 0.5, "data[0]={}", data[0]);
    }
}
