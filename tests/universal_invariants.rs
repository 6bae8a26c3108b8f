//! Graph-level invariants from §8 "Universal invariants".

use tensorgraph::{ExecutionContext, Shape, SGD};

#[test]
fn repeated_steps_with_fixed_inputs_are_bitwise_deterministic() {
    let mut ctx = ExecutionContext::new(None);
    let w = ctx
        .variable(Some("w"), vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2]), Box::new(SGD::new(0.0)))
        .unwrap();
    let x = ctx.constant(vec![1.0, 0.0, 0.0, 1.0], Shape::new(vec![2, 2])).unwrap();
    ctx.multiplication(w, x).unwrap();
    ctx.initialize_execution().unwrap();

    let first = ctx.execute_forward_propagation().unwrap();
    let first_bytes = ctx.get_memory_buffer(first[0]).unwrap().to_vec();
    ctx.execute_backward_propagation().unwrap();

    let second = ctx.execute_forward_propagation().unwrap();
    let second_bytes = ctx.get_memory_buffer(second[0]).unwrap().to_vec();

    assert_eq!(first_bytes, second_bytes, "lr=0 forward result must repeat bitwise");
}

#[test]
fn zero_learning_rate_leaves_every_variable_unchanged_after_n_steps() {
    let mut ctx = ExecutionContext::new(None);
    let w = ctx
        .variable(Some("w"), vec![1.0, -2.0, 0.5], Shape::new(vec![3]), Box::new(SGD::new(0.0)))
        .unwrap();
    let b = ctx
        .variable(Some("b"), vec![0.25], Shape::new(vec![1]), Box::new(SGD::new(0.0)))
        .unwrap();
    ctx.initialize_execution().unwrap();

    let w_before = ctx.variable_data(w).to_vec();
    let b_before = ctx.variable_data(b).to_vec();
    for _ in 0..10 {
        ctx.execute_propagation().unwrap();
    }
    assert_eq!(ctx.variable_data(w), w_before.as_slice());
    assert_eq!(ctx.variable_data(b), b_before.as_slice());
}

#[test]
fn forward_propagation_yields_one_handle_per_terminal_in_registration_order() {
    let mut ctx = ExecutionContext::new(None);
    // Two independent, never-consumed roots: each is its own terminal.
    ctx.variable(Some("a"), vec![1.0], Shape::new(vec![1]), Box::new(SGD::new(0.0))).unwrap();
    ctx.variable(Some("b"), vec![2.0], Shape::new(vec![1]), Box::new(SGD::new(0.0))).unwrap();
    ctx.initialize_execution().unwrap();

    let handles = ctx.execute_forward_propagation().unwrap();
    assert_eq!(handles.len(), ctx.terminal_count());
    assert_eq!(ctx.terminal_count(), 2);
    assert_eq!(ctx.get_memory_buffer(handles[0]).unwrap(), &[1.0]);
    assert_eq!(ctx.get_memory_buffer(handles[1]).unwrap(), &[2.0]);
}
