//! Weight initialization: Xavier/Glorot and He uniform. Pure functions,
//! deterministic for a fixed seed via [`crate::runtime::with_rng`].

use crate::runtime::with_rng;
use crate::shape::Shape;
use rand::Rng;

/// Xavier uniform: scale = sqrt(6 / (fan_in + fan_out)), for a 2D
/// `[fan_in, fan_out]` weight shape.
pub fn xavier_uniform(shape: &Shape) -> Vec<f32> {
    let dims = shape.dims();
    if dims.len() < 2 {
        return vec![0.0; shape.stride()];
    }
    let fan_in = dims[0];
    let fan_out = dims[1];
    let scale = (6.0f32 / (fan_in + fan_out) as f32).sqrt();
    let n = shape.stride();
    with_rng(|rng| (0..n).map(|_| rng.gen_range(-scale..=scale)).collect())
}

/// He uniform: scale = sqrt(6 / fan_in). Suited to ReLU-family activations.
pub fn he_uniform(shape: &Shape) -> Vec<f32> {
    let dims = shape.dims();
    if dims.is_empty() {
        return vec![0.0; shape.stride()];
    }
    let fan_in = dims[0];
    let scale = (6.0f32 / fan_in as f32).sqrt();
    let n = shape.stride();
    with_rng(|rng| (0..n).map(|_| rng.gen_range(-scale..=scale)).collect())
}
