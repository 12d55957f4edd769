//! Backward operations and reverse-mode traversal

use super::Tensor;
use ndarray::Array1;
use std::collections::HashSet;
use std::rc::Rc;

/// Gradient rule attached to the output of a differentiable operation
///
/// `backward` reads the output gradient and accumulates into the direct
/// inputs only; traversal order is owned by [`backward`].
pub trait BackwardOp {
    /// Propagate the output gradient to the direct inputs
    fn backward(&self);

    /// Direct inputs of the operation
    fn inputs(&self) -> Vec<&Tensor>;
}

/// Run reverse-mode differentiation from `tensor`
///
/// Seeds the output gradient (ones when `grad_output` is `None`) and visits
/// every operation in reverse topological order, so a tensor consumed by
/// several operations receives its full gradient before propagating it.
pub fn backward(tensor: &mut Tensor, grad_output: Option<Array1<f32>>) {
    if let Some(grad) = grad_output {
        tensor.set_grad(grad);
    } else {
        tensor.set_grad(Array1::ones(tensor.len()));
    }

    for op in topological_order(tensor).iter().rev() {
        op.backward();
    }
}

fn topological_order(root: &Tensor) -> Vec<Rc<dyn BackwardOp>> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    visit(root, &mut visited, &mut order);
    order
}

fn visit(tensor: &Tensor, visited: &mut HashSet<usize>, order: &mut Vec<Rc<dyn BackwardOp>>) {
    if !visited.insert(tensor.id()) {
        return;
    }
    if let Some(op) = tensor.backward_op() {
        for input in op.inputs() {
            visit(input, visited, order);
        }
        order.push(op);
    }
}
