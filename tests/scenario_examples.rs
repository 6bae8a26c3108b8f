//! Concrete numeric scenarios from §8 not already covered by unit tests
//! in `kernel`, `optimizer::adam`, or `optimizer::amsgrad`.

use tensorgraph::{ExecutionContext, Shape, SGD};

const TOL: f32 = 1e-3;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < TOL
}

#[test]
fn softmax_cross_entropy_training_mode_forwards_null_and_backward_matches_closed_form() {
    let mut ctx = ExecutionContext::new(None);
    // `predicted` carries lr=1 so its post-step delta recovers the raw
    // gradient exactly: theta_new = theta_old - 1*grad => grad = old - new.
    let predicted = ctx
        .variable(Some("predicted"), vec![2.0, 1.0, 0.0], Shape::new(vec![1, 3]), Box::new(SGD::new(1.0)))
        .unwrap();
    let expected = ctx.constant(vec![1.0, 0.0, 0.0], Shape::new(vec![1, 3])).unwrap();
    ctx.softmax_cross_entropy(predicted, expected, true).unwrap();
    ctx.initialize_execution().unwrap();

    let handles = ctx.execute_forward_propagation().unwrap();
    assert_eq!(handles.len(), 1);
    assert!(handles[0].is_null(), "training-mode forward must not materialize the scalar loss");
    assert!(ctx.get_memory_buffer(handles[0]).is_err());

    let before = ctx.variable_data(predicted).to_vec();
    ctx.execute_backward_propagation().unwrap();
    let after = ctx.variable_data(predicted).to_vec();

    let grad: Vec<f32> = before.iter().zip(&after).map(|(b, a)| b - a).collect();
    let expected_grad = [-0.33, 0.245, 0.090];
    for (g, e) in grad.iter().zip(&expected_grad) {
        assert!(close(*g, *e), "got {grad:?} expected ~{expected_grad:?}");
    }
}

#[test]
fn one_layer_leaky_relu_network_matches_closed_form_sgd_step() {
    let mut ctx = ExecutionContext::new(None);
    let w = ctx
        .variable(Some("w"), vec![1.0, 1.0, 1.0, 1.0], Shape::new(vec![2, 2]), Box::new(SGD::new(0.01)))
        .unwrap();
    let x = ctx.constant(vec![1.0, 1.0, 1.0, 1.0], Shape::new(vec![2, 2])).unwrap();
    let mult = ctx.multiplication(w, x).unwrap();

    let b = ctx
        .variable(Some("b"), vec![0.0, 0.0], Shape::new(vec![2]), Box::new(SGD::new(0.01)))
        .unwrap();
    let bias = ctx.broadcast_bias(b, 2).unwrap();

    let pre_activation = ctx.add(mult, bias).unwrap();
    let y = ctx.leaky_relu(pre_activation, 0.01).unwrap();
    ctx.initialize_execution().unwrap();

    let handles = ctx.execute_forward_propagation().unwrap();
    assert_eq!(handles.len(), 1);
    let output = ctx.get_memory_buffer(handles[0]).unwrap();
    assert_eq!(output, &[2.0, 2.0, 2.0, 2.0]);

    // MSE against an all-zero target, dL/dY = 2*(Y-T)/n with n = 4.
    ctx.deliver_external_gradient(y, vec![1.0, 1.0, 1.0, 1.0]);
    ctx.execute_backward_propagation().unwrap();

    let w_after = ctx.variable_data(w);
    for v in w_after {
        assert!(close(*v, 0.98), "w={w_after:?}");
    }
    let b_after = ctx.variable_data(b);
    for v in b_after {
        assert!(close(*v, -0.02), "b={b_after:?}");
    }
}
