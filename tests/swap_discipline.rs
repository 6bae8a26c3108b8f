//! Drives a multi-layer network for several consecutive steps with a
//! `RandomGradientSource`-backed input, exercising the backward-arena
//! sizing pass and the ping-pong swap discipline across more than one
//! layer boundary and more than one step (§8 "Universal invariants").

use tensorgraph::{set_seed, ExecutionContext, RandomGradientSource, Shape, SGD};

#[test]
fn repeated_steps_with_a_random_input_source_exercise_backward_arena_swap() {
    set_seed(7);
    let mut ctx = ExecutionContext::new(None);
    let w = ctx
        .variable(Some("w"), vec![1.0, 1.0, 1.0, 1.0], Shape::new(vec![2, 2]), Box::new(SGD::new(0.01)))
        .unwrap();
    let x_source = Box::new(RandomGradientSource::new(Shape::new(vec![2, 2]), 1.0));
    let x = ctx.constant_from_source(x_source, Shape::new(vec![2, 2])).unwrap();
    let mult = ctx.multiplication(w, x).unwrap();

    let b = ctx
        .variable(Some("b"), vec![0.0, 0.0], Shape::new(vec![2]), Box::new(SGD::new(0.01)))
        .unwrap();
    let bias = ctx.broadcast_bias(b, 2).unwrap();
    let pre = ctx.add(mult, bias).unwrap();
    ctx.leaky_relu(pre, 0.01).unwrap();
    ctx.initialize_execution().unwrap();

    let mut forward_outputs = Vec::new();
    let mut weight_snapshots = Vec::new();
    for _ in 0..5 {
        let handles = ctx.execute_propagation().unwrap();
        forward_outputs.push(ctx.get_memory_buffer(handles[0]).unwrap().to_vec());
        weight_snapshots.push(ctx.variable_data(w).to_vec());
    }

    // Each step redraws X, so both the forward output and the two-layer
    // backward walk's delivered gradient to `w` differ step to step.
    assert_ne!(forward_outputs[0], forward_outputs[1]);
    assert_ne!(forward_outputs[1], forward_outputs[2]);
    assert_ne!(weight_snapshots[0], weight_snapshots[1]);
    assert_ne!(ctx.variable_data(w), &[1.0, 1.0, 1.0, 1.0][..]);
}
