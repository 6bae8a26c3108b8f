//! Finite-difference check of the backward pass (§2 "Test tooling"): build
//! a fresh one-layer network for each perturbed weight, rebuilding the
//! whole graph per call since an `ExecutionContext` initializes exactly
//! once - the same rebuild-per-perturbation shape the teacher's own
//! checker uses over its `Graph`.

use tensorgraph::{gradients_close, numerical_gradient, ExecutionContext, Shape, SGD};

const X: [f32; 4] = [1.0, -0.5, 0.25, 2.0];
const B: [f32; 2] = [0.1, -0.2];

/// sum(LeakyReLU(W . X + broadcast(b))) for the given flat 2x2 `w`.
fn forward_sum(w: &[f32]) -> f32 {
    let mut ctx = ExecutionContext::new(None);
    let w_id = ctx
        .variable(None, w.to_vec(), Shape::new(vec![2, 2]), Box::new(SGD::new(0.0)))
        .unwrap();
    let x_id = ctx.constant(X.to_vec(), Shape::new(vec![2, 2])).unwrap();
    let mult = ctx.multiplication(w_id, x_id).unwrap();
    let b_id = ctx.constant(B.to_vec(), Shape::new(vec![2])).unwrap();
    let bias = ctx.broadcast_bias(b_id, 2).unwrap();
    let pre = ctx.add(mult, bias).unwrap();
    let y = ctx.leaky_relu(pre, 0.01).unwrap();
    ctx.initialize_execution().unwrap();
    let handles = ctx.execute_forward_propagation().unwrap();
    ctx.get_memory_buffer(handles[0]).unwrap().iter().sum()
}

#[test]
fn backward_gradient_matches_finite_difference_within_tolerance() {
    let w0 = [0.7, -1.3, 0.2, 0.9];

    // lr=1 recovers the raw analytic gradient exactly from the pre/post delta.
    let mut ctx = ExecutionContext::new(None);
    let w_id = ctx
        .variable(None, w0.to_vec(), Shape::new(vec![2, 2]), Box::new(SGD::new(1.0)))
        .unwrap();
    let x_id = ctx.constant(X.to_vec(), Shape::new(vec![2, 2])).unwrap();
    let mult = ctx.multiplication(w_id, x_id).unwrap();
    let b_id = ctx.constant(B.to_vec(), Shape::new(vec![2])).unwrap();
    let bias = ctx.broadcast_bias(b_id, 2).unwrap();
    let pre = ctx.add(mult, bias).unwrap();
    let y = ctx.leaky_relu(pre, 0.01).unwrap();
    ctx.initialize_execution().unwrap();
    ctx.execute_forward_propagation().unwrap();

    // d(sum)/dY = 1 elementwise.
    ctx.deliver_external_gradient(y, vec![1.0; 4]);
    let before = ctx.variable_data(w_id).to_vec();
    ctx.execute_backward_propagation().unwrap();
    let after = ctx.variable_data(w_id).to_vec();
    let analytic: Vec<f32> = before.iter().zip(&after).map(|(b, a)| b - a).collect();

    let numerical = numerical_gradient(&w0, 1e-3, forward_sum);

    assert!(
        gradients_close(&analytic, &numerical, 1e-2, 1e-2),
        "analytic {analytic:?} vs numerical {numerical:?}"
    );
}
