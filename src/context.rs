//! ExecutionContext: graph registration, layer partitioning, arena sizing,
//! and the per-step forward/backward driver. Owns every [`Operation`] in an
//! arena-of-ops keyed by [`OperationId`] - there are no shared mutable
//! references between nodes, only stable integer ids and a `next` pointer
//! set by each consumer into its own inputs at construction time.

use crate::arena::{Arena, HandleError, TensorPointer};
use crate::input::InputSource;
use crate::operation::{
    Add, BroadcastBias, Constant, HadamardProduct, LeakyReLU, Multiplication, Operation,
    OperationId, OperationKind, SoftmaxCrossEntropy, Variable,
};
use crate::optimizer::{Optimizer, OptimizerError};
use crate::shape::{Shape, ShapeError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("registration is closed once execution has been initialized")]
    DoubleRegistration,
    #[error("execution context already initialized")]
    AlreadyInitialized,
    #[error("execution context has not been initialized")]
    NotInitialized,
    #[error("operation {op} has an invalid layer state: expected upstream layer {expected:?}, found {found:?}")]
    InvalidLayerState {
        op: OperationId,
        expected: Option<usize>,
        found: Option<usize>,
    },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Unifies the four error categories the core raises (§7): graph-structure
/// errors, arena/handle errors, shape-mismatch errors, and optimizer
/// configuration errors. Every context-level operation is fatal to the
/// current step on any of these; none are retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Handle(#[from] HandleError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

pub type ContextResult<T> = Result<T, ContextError>;

/// A graph built once and driven step by step. `roots[i]` is the Variable
/// registered with `layerIndex == i`; `layer_tails[i]` is the last op that
/// root's downstream walk claimed during layering.
pub struct ExecutionContext {
    operations: Vec<Operation>,
    roots: Vec<OperationId>,
    terminals: Vec<OperationId>,
    layer_tails: Vec<Option<OperationId>>,
    arena: Arena,
    initialized: bool,
    epochs: Option<u32>,
    step: u64,
    /// Externally supplied terminal gradients (e.g. an MSE derivative the
    /// façade computed outside the core's own op set), queued by
    /// [`ExecutionContext::deliver_external_gradient`] and applied once
    /// `execute_backward_propagation` has reset the backward arena - not
    /// at call time, since a reset would otherwise invalidate an
    /// allocation made just beforehand.
    pending_external_gradients: Vec<(OperationId, Vec<f32>)>,
}

impl ExecutionContext {
    pub fn new(epochs: Option<u32>) -> Self {
        ExecutionContext {
            operations: Vec::new(),
            roots: Vec::new(),
            terminals: Vec::new(),
            layer_tails: Vec::new(),
            arena: Arena::new(0, 0),
            pending_external_gradients: Vec::new(),
            initialized: false,
            epochs,
            step: 0,
        }
    }

    pub fn epochs(&self) -> Option<u32> {
        self.epochs
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn layer_count(&self) -> usize {
        self.roots.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn operation(&self, id: OperationId) -> &Operation {
        &self.operations[id]
    }

    pub fn variable_data(&self, id: OperationId) -> &[f32] {
        match &self.operations[id].kind {
            OperationKind::Variable(v) => v.data(),
            _ => panic!("operation {id} is not a Variable"),
        }
    }

    pub(crate) fn root_id(&self, layer_index: usize) -> OperationId {
        self.roots[layer_index]
    }

    pub(crate) fn variable_snapshot(&self, id: OperationId) -> (Option<String>, Vec<usize>, Vec<f32>) {
        match &self.operations[id].kind {
            OperationKind::Variable(v) => (v.name().map(str::to_owned), v.shape().dims().to_vec(), v.data().to_vec()),
            _ => panic!("operation {id} is not a Variable"),
        }
    }

    pub(crate) fn restore_variable(&mut self, id: OperationId, state: &crate::state_io::VariableState) {
        match &mut self.operations[id].kind {
            OperationKind::Variable(v) => v.restore(&state.data),
            _ => panic!("operation {id} is not a Variable"),
        }
    }

    /// Read the scalar loss cached by a SoftmaxCrossEntropy node from its
    /// last forward pass, without touching the forward arena. `None` if
    /// the node hasn't forwarded this step yet, or `id` isn't that kind.
    pub fn loss_value(&self, id: OperationId, expected: &[f32]) -> Option<f32> {
        match &self.operations[id].kind {
            OperationKind::SoftmaxCrossEntropy(s) => s.loss_value(expected),
            _ => None,
        }
    }

    pub fn get_memory_buffer(&self, ptr: TensorPointer) -> ContextResult<&[f32]> {
        Ok(self.arena.get(ptr)?)
    }

    pub fn address_offset(&self, ptr: TensorPointer) -> u32 {
        ptr.offset()
    }

    pub fn address_length(&self, ptr: TensorPointer) -> u32 {
        ptr.length()
    }

    fn ensure_not_initialized(&self) -> GraphResult<()> {
        if self.initialized {
            Err(GraphError::AlreadyInitialized)
        } else {
            Ok(())
        }
    }

    fn shape_of(&self, id: OperationId) -> Shape {
        self.operations[id].max_result_shape.clone()
    }

    fn requires_grad(&self, id: OperationId) -> bool {
        self.operations[id].requires_backward_derivative
    }

    fn push_operation(&mut self, op: Operation) -> OperationId {
        self.operations.push(op);
        self.operations.len() - 1
    }

    fn push_binary(
        &mut self,
        kind: OperationKind,
        left: OperationId,
        right: OperationId,
        left_shape: Shape,
        right_shape: Shape,
        out_shape: Shape,
    ) -> OperationId {
        let requires = self.requires_grad(left) || self.requires_grad(right);
        let op = Operation::binary(kind, left, right, left_shape, right_shape, out_shape, requires);
        let id = self.push_operation(op);
        self.operations[left].next = Some(id);
        self.operations[right].next = Some(id);
        id
    }

    fn push_unary(&mut self, kind: OperationKind, input: OperationId, input_shape: Shape, out_shape: Shape) -> OperationId {
        let requires = self.requires_grad(input);
        let op = Operation::unary(kind, input, input_shape, out_shape, requires);
        let id = self.push_operation(op);
        self.operations[input].next = Some(id);
        id
    }

    // ---- Operation constructors (§6: "the context plus input operations and shape parameters") ----

    /// Registers a graph root: persistent float storage plus its bound
    /// optimizer. Assigned `layerIndex = roots.len()` immediately, per §4.3.
    pub fn variable(
        &mut self,
        name: Option<&str>,
        data: Vec<f32>,
        shape: Shape,
        optimizer: Box<dyn Optimizer>,
    ) -> ContextResult<OperationId> {
        if self.initialized {
            return Err(GraphError::DoubleRegistration.into());
        }
        let layer_index = self.roots.len();
        let var = match name {
            Some(n) => Variable::named(n, data, shape.clone(), optimizer),
            None => Variable::new(data, shape.clone(), optimizer),
        };
        let mut op = Operation::leaf(OperationKind::Variable(var), shape, true);
        op.layer_index = Some(layer_index);
        let id = self.push_operation(op);
        self.roots.push(id);
        Ok(id)
    }

    pub fn constant(&mut self, data: Vec<f32>, shape: Shape) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let op = Operation::leaf(OperationKind::Constant(Constant::new(data, shape.clone())), shape, false);
        Ok(self.push_operation(op))
    }

    pub fn constant_from_source(&mut self, source: Box<dyn InputSource>, shape: Shape) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let op = Operation::leaf(
            OperationKind::Constant(Constant::from_source(source, shape.clone())),
            shape,
            false,
        );
        Ok(self.push_operation(op))
    }

    pub fn add(&mut self, left: OperationId, right: OperationId) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let (left_shape, right_shape) = (self.shape_of(left), self.shape_of(right));
        let (op_struct, out_shape) = Add::elementwise(&left_shape, &right_shape)?;
        Ok(self.push_binary(OperationKind::Add(op_struct), left, right, left_shape, right_shape, out_shape))
    }

    pub fn add_row_broadcast(&mut self, left: OperationId, right: OperationId) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let (left_shape, right_shape) = (self.shape_of(left), self.shape_of(right));
        let (op_struct, out_shape) = Add::row_broadcast(&left_shape, &right_shape)?;
        Ok(self.push_binary(OperationKind::Add(op_struct), left, right, left_shape, right_shape, out_shape))
    }

    pub fn multiplication(&mut self, left: OperationId, right: OperationId) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let (left_shape, right_shape) = (self.shape_of(left), self.shape_of(right));
        let (op_struct, out_shape) = Multiplication::new(&left_shape, &right_shape)?;
        Ok(self.push_binary(
            OperationKind::Multiplication(op_struct),
            left,
            right,
            left_shape,
            right_shape,
            out_shape,
        ))
    }

    pub fn hadamard(&mut self, left: OperationId, right: OperationId) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let (left_shape, right_shape) = (self.shape_of(left), self.shape_of(right));
        let (op_struct, out_shape) = HadamardProduct::new(&left_shape, &right_shape)?;
        Ok(self.push_binary(OperationKind::Hadamard(op_struct), left, right, left_shape, right_shape, out_shape))
    }

    pub fn leaky_relu(&mut self, input: OperationId, alpha: f32) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let input_shape = self.shape_of(input);
        let (op_struct, out_shape) = LeakyReLU::new(alpha, &input_shape);
        Ok(self.push_unary(OperationKind::LeakyReLU(op_struct), input, input_shape, out_shape))
    }

    pub fn broadcast_bias(&mut self, bias: OperationId, rows: usize) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let bias_shape = self.shape_of(bias);
        let (op_struct, out_shape) = BroadcastBias::new(&bias_shape, rows)?;
        Ok(self.push_unary(OperationKind::BroadcastBias(op_struct), bias, bias_shape, out_shape))
    }

    pub fn softmax_cross_entropy(
        &mut self,
        predicted: OperationId,
        expected: OperationId,
        training: bool,
    ) -> ContextResult<OperationId> {
        self.ensure_not_initialized()?;
        let (predicted_shape, expected_shape) = (self.shape_of(predicted), self.shape_of(expected));
        let (op_struct, out_shape) = SoftmaxCrossEntropy::new(&predicted_shape, &expected_shape, training)?;
        Ok(self.push_binary(
            OperationKind::SoftmaxCrossEntropy(op_struct),
            predicted,
            expected,
            predicted_shape,
            expected_shape,
            out_shape,
        ))
    }

    // ---- Lifecycle ----

    /// One-shot. Partitions the graph into layers, then sizes and allocates
    /// the three float arenas. Calling this twice is a `GraphError`.
    pub fn initialize_execution(&mut self) -> ContextResult<()> {
        if self.initialized {
            return Err(GraphError::AlreadyInitialized.into());
        }
        self.assign_layers();
        let (forward_capacity, backward_capacity) = self.compute_arena_sizes();
        self.arena = Arena::new(forward_capacity, backward_capacity);
        self.initialized = true;
        Ok(())
    }

    /// Layering pass (§4.4): for each root from last- to first-registered,
    /// walk the downstream `next` chain, tentatively claiming unassigned
    /// ops for this root's layer, stopping at an op already claimed by a
    /// different layer. A Constant leaf fed directly into a claimed op
    /// inherits that op's layer too, since it is never itself a root and so
    /// never starts a walk of its own - without this it would be left with
    /// no layer at all.
    fn assign_layers(&mut self) {
        let layer_count = self.roots.len();
        self.layer_tails = vec![None; layer_count];
        self.terminals.clear();
        for layer_index in (0..layer_count).rev() {
            let root_id = self.roots[layer_index];
            let mut current = Some(root_id);
            let mut last_assigned = None;
            while let Some(id) = current {
                match self.operations[id].layer_index {
                    Some(existing) if existing != layer_index => break,
                    _ => {}
                }
                self.operations[id].layer_index = Some(layer_index);
                self.inherit_leaf_inputs(id, layer_index);
                last_assigned = Some(id);
                current = self.operations[id].next;
            }
            self.layer_tails[layer_index] = last_assigned;
            if let Some(tail) = last_assigned {
                if self.operations[tail].next.is_none() {
                    self.terminals.push(tail);
                }
            }
        }
        self.terminals.sort_unstable();
    }

    fn inherit_leaf_inputs(&mut self, id: OperationId, layer_index: usize) {
        for side in [self.operations[id].left, self.operations[id].right].into_iter().flatten() {
            let is_unrooted_leaf = matches!(self.operations[side].kind, OperationKind::Constant(_));
            if is_unrooted_leaf && self.operations[side].layer_index.is_none() {
                self.operations[side].layer_index = Some(layer_index);
            }
        }
    }

    /// Sizing pass (§4.4): sum per-layer forward footprint across layers;
    /// take the max per-layer backward footprint across layers.
    fn compute_arena_sizes(&self) -> (usize, usize) {
        let mut forward_total = 0usize;
        let mut backward_max = 0usize;
        for layer_index in 0..self.roots.len() {
            let mut layer_forward = 0usize;
            let mut layer_backward = 0usize;
            for op in &self.operations {
                if op.layer_index == Some(layer_index) {
                    layer_forward += op.forward_footprint();
                    layer_backward = layer_backward.max(op.backward_footprint());
                }
            }
            forward_total += layer_forward;
            backward_max = backward_max.max(layer_backward);
        }
        (forward_total.max(1), backward_max.max(1))
    }

    /// Forward then backward, the unit of one training iteration.
    pub fn execute_propagation(&mut self) -> ContextResult<Vec<TensorPointer>> {
        let handles = self.execute_forward_propagation()?;
        self.execute_backward_propagation()?;
        Ok(handles)
    }

    /// `epochs` full forward+backward steps (§9 open question, resolved:
    /// not `epochs` backward-only repeats of one forward pass).
    pub fn execute_propagation_for(&mut self, epochs: u32) -> ContextResult<()> {
        for _ in 0..epochs {
            self.execute_propagation()?;
        }
        Ok(())
    }

    /// Resets the forward bump index and evaluates every terminal operation,
    /// returning their result handles in registration (ascending id) order.
    pub fn execute_forward_propagation(&mut self) -> ContextResult<Vec<TensorPointer>> {
        if !self.initialized {
            return Err(GraphError::NotInitialized.into());
        }
        self.arena.reset_forward();
        self.step += 1;
        let terminals = self.terminals.clone();
        let mut results = Vec::with_capacity(terminals.len());
        for id in terminals {
            results.push(self.forward_pass(id)?);
        }
        Ok(results)
    }

    fn forward_pass(&mut self, id: OperationId) -> ContextResult<TensorPointer> {
        if self.operations[id].computed_at_step == Some(self.step) {
            return Ok(self.operations[id]
                .forward_result
                .expect("computed_at_step set implies a cached forward_result"));
        }

        let left_id = self.operations[id].left;
        let right_id = self.operations[id].right;

        let left_ptr = match left_id {
            Some(lid) => Some(self.forward_pass(lid)?),
            None => None,
        };
        let right_ptr = match right_id {
            Some(rid) => Some(self.forward_pass(rid)?),
            None => None,
        };

        let left_data = match left_ptr {
            Some(ptr) => Some(self.arena.get(ptr)?.to_vec()),
            None => None,
        };
        let right_data = match right_ptr {
            Some(ptr) => Some(self.arena.get(ptr)?.to_vec()),
            None => None,
        };

        self.operations[id].left_operand_result = left_ptr;
        self.operations[id].right_operand_result = right_ptr;

        let data_opt: Option<Vec<f32>> = {
            let op = &mut self.operations[id];
            match &mut op.kind {
                OperationKind::Variable(v) => Some(v.forward().0),
                OperationKind::Constant(c) => Some(c.forward().0),
                OperationKind::Add(a) => Some(a.forward(left_data.as_ref().unwrap(), right_data.as_ref().unwrap())),
                OperationKind::Multiplication(m) => {
                    Some(m.forward(left_data.as_ref().unwrap(), right_data.as_ref().unwrap()))
                }
                OperationKind::Hadamard(h) => Some(h.forward(left_data.as_ref().unwrap(), right_data.as_ref().unwrap())),
                OperationKind::LeakyReLU(r) => Some(r.forward(left_data.as_ref().unwrap())),
                OperationKind::SoftmaxCrossEntropy(s) => {
                    s.forward(left_data.as_ref().unwrap(), right_data.as_ref().unwrap())
                }
                OperationKind::BroadcastBias(b) => Some(b.forward(left_data.as_ref().unwrap())),
            }
        };

        let ptr = match data_opt {
            Some(data) => self.arena.allocate_forward(&data)?,
            None => TensorPointer::NULL,
        };
        self.operations[id].forward_result = Some(ptr);
        self.operations[id].computed_at_step = Some(self.step);
        Ok(ptr)
    }

    /// Resets both backward arenas, seeds every terminal's upstream
    /// gradient to all-ones (dL/dY = 1 for whichever terminal is treated as
    /// the loss), then walks layer tails from highest to lowest index,
    /// swapping backward arenas between layers.
    pub fn execute_backward_propagation(&mut self) -> ContextResult<()> {
        if !self.initialized {
            return Err(GraphError::NotInitialized.into());
        }
        self.arena.reset_backward();
        self.seed_terminal_gradients()?;

        let mut previous_layer: Option<usize> = None;
        for layer_index in (0..self.layer_tails.len()).rev() {
            let tail = match self.layer_tails[layer_index] {
                Some(t) => t,
                None => continue,
            };
            self.back_step(tail)?;
            if let Some(prev) = previous_layer {
                if let Some(next_id) = self.operations[tail].next {
                    let boundary_layer = self.operations[next_id].layer_index;
                    if boundary_layer != Some(prev) {
                        return Err(GraphError::InvalidLayerState {
                            op: tail,
                            expected: Some(prev),
                            found: boundary_layer,
                        }
                        .into());
                    }
                }
            }
            self.arena.swap_backward();
            previous_layer = Some(layer_index);
        }
        Ok(())
    }

    /// Queues a terminal's upstream gradient to be seeded with an
    /// externally computed value instead of the default all-ones, e.g. the
    /// derivative of a loss function the surrounding façade computes
    /// outside the core's own operation set (MSE and friends are out of
    /// scope; see §1). Call after `execute_forward_propagation` and before
    /// `execute_backward_propagation` in the same step; the queued value is
    /// applied once backward has reset the arena, not at call time.
    pub fn deliver_external_gradient(&mut self, id: OperationId, grad: Vec<f32>) {
        self.pending_external_gradients.push((id, grad));
    }

    fn seed_terminal_gradients(&mut self) -> ContextResult<()> {
        let pending = std::mem::take(&mut self.pending_external_gradients);
        for (id, grad) in pending {
            self.deliver_gradient(id, &grad)?;
        }
        let terminals = self.terminals.clone();
        for id in terminals {
            if self.operations[id].derivative_chain_value.is_none() {
                let len = self.operations[id].max_result_shape.stride();
                let ones = vec![1.0f32; len];
                self.deliver_gradient(id, &ones)?;
            }
        }
        Ok(())
    }

    /// Delivers an upstream gradient to `id`. If `id` is a Variable, its
    /// optimizer fires immediately from this freshly computed slice rather
    /// than being deferred to an end-of-step pass: the two-buffer backward
    /// ping-pong reclaims a buffer after only one more layer's processing,
    /// so a deferred global firing pass would read back already-overwritten
    /// memory for any Variable more than one layer from the loss.
    fn deliver_gradient(&mut self, id: OperationId, grad: &[f32]) -> ContextResult<()> {
        let ptr = self.arena.allocate_backward(grad)?;
        self.operations[id].derivative_chain_value = Some(ptr);
        if let OperationKind::Variable(v) = &mut self.operations[id].kind {
            v.apply_gradient(grad)?;
        }
        Ok(())
    }

    fn same_layer(&self, a: OperationId, b: OperationId) -> bool {
        self.operations[a].layer_index == self.operations[b].layer_index
    }

    /// Computes this node's per-input gradients from its cached upstream
    /// gradient and cached forward operands, delivers each to the
    /// corresponding input, and recurses into it while it stays in-layer.
    fn back_step(&mut self, id: OperationId) -> ContextResult<()> {
        let grad_ptr = match self.operations[id].derivative_chain_value {
            Some(p) => p,
            None => return Ok(()),
        };
        let grad_out = self.arena.get(grad_ptr)?.to_vec();

        let left_id = self.operations[id].left;
        let right_id = self.operations[id].right;
        let left_operand_data = match self.operations[id].left_operand_result {
            Some(p) if !p.is_null() => Some(self.arena.get(p)?.to_vec()),
            _ => None,
        };
        let right_operand_data = match self.operations[id].right_operand_result {
            Some(p) if !p.is_null() => Some(self.arena.get(p)?.to_vec()),
            _ => None,
        };

        let (left_grad, right_grad): (Option<Vec<f32>>, Option<Vec<f32>>) = {
            let op = &self.operations[id];
            match &op.kind {
                OperationKind::Variable(_) | OperationKind::Constant(_) => (None, None),
                OperationKind::Add(a) => (Some(a.backward_left(&grad_out)), Some(a.backward_right(&grad_out))),
                OperationKind::Multiplication(m) => {
                    let l = left_operand_data.as_ref().expect("Multiplication caches its left operand");
                    let r = right_operand_data.as_ref().expect("Multiplication caches its right operand");
                    (Some(m.backward_left(&grad_out, r)), Some(m.backward_right(&grad_out, l)))
                }
                OperationKind::Hadamard(h) => {
                    let l = left_operand_data.as_ref().expect("HadamardProduct caches its left operand");
                    let r = right_operand_data.as_ref().expect("HadamardProduct caches its right operand");
                    (Some(h.backward_left(&grad_out, r)), Some(h.backward_right(&grad_out, l)))
                }
                OperationKind::LeakyReLU(r) => {
                    let l = left_operand_data.as_ref().expect("LeakyReLU caches its input");
                    (Some(r.backward_left(&grad_out, l)), None)
                }
                OperationKind::SoftmaxCrossEntropy(s) => {
                    let e = right_operand_data.as_ref().expect("SoftmaxCrossEntropy caches its labels");
                    (Some(s.backward_left(e)), None)
                }
                OperationKind::BroadcastBias(b) => (Some(b.backward_left(&grad_out)), None),
            }
        };

        if let Some(lid) = left_id {
            if self.operations[lid].requires_backward_derivative {
                if let Some(lg) = left_grad {
                    self.deliver_gradient(lid, &lg)?;
                    if self.same_layer(lid, id) {
                        self.back_step(lid)?;
                    }
                }
            }
        }
        if let Some(rid) = right_id {
            if self.operations[rid].requires_backward_derivative {
                if let Some(rg) = right_grad {
                    self.deliver_gradient(rid, &rg)?;
                    if self.same_layer(rid, id) {
                        self.back_step(rid)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::SGD;

    fn one_layer_graph() -> ExecutionContext {
        let mut ctx = ExecutionContext::new(None);
        let w = ctx
            .variable(Some("w"), vec![1.0, 1.0, 1.0, 1.0], Shape::new(vec![2, 2]), Box::new(SGD::new(0.0)))
            .unwrap();
        let x = ctx.constant(vec![1.0, 1.0, 1.0, 1.0], Shape::new(vec![2, 2])).unwrap();
        let _y = ctx.multiplication(w, x).unwrap();
        ctx.initialize_execution().unwrap();
        ctx
    }

    #[test]
    fn single_terminal_per_layer_matches_registration_order() {
        let mut ctx = one_layer_graph();
        let handles = ctx.execute_forward_propagation().unwrap();
        assert_eq!(handles.len(), ctx.terminal_count());
        assert_eq!(ctx.terminal_count(), 1);
    }

    #[test]
    fn zero_learning_rate_leaves_storage_unchanged() {
        let mut ctx = one_layer_graph();
        let before = ctx.variable_data(0).to_vec();
        for _ in 0..5 {
            ctx.execute_propagation().unwrap();
        }
        assert_eq!(ctx.variable_data(0), before.as_slice());
    }

    #[test]
    fn forward_result_is_deterministic_across_repeated_steps() {
        let mut ctx = one_layer_graph();
        let first = ctx.execute_forward_propagation().unwrap();
        let first_data = ctx.get_memory_buffer(first[0]).unwrap().to_vec();
        ctx.execute_backward_propagation().unwrap();
        let second = ctx.execute_forward_propagation().unwrap();
        let second_data = ctx.get_memory_buffer(second[0]).unwrap().to_vec();
        assert_eq!(first_data, second_data);
    }

    #[test]
    fn double_initialize_is_a_graph_error() {
        let mut ctx = one_layer_graph();
        assert_eq!(ctx.initialize_execution().unwrap_err(), ContextError::Graph(GraphError::AlreadyInitialized));
    }
}
