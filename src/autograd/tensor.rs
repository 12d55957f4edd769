//! Tensor with a shared gradient cell and an optional backward operation

use super::BackwardOp;
use ndarray::Array1;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_TENSOR_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_TENSOR_ID.fetch_add(1, Ordering::Relaxed)
}

/// One-dimensional tensor participating in the autograd graph
///
/// Cloning a tensor copies its data but shares its gradient cell and backward
/// operation, so gradients accumulated through a clone held by the graph land
/// on the original parameter.
#[derive(Clone)]
pub struct Tensor {
    id: usize,
    data: Array1<f32>,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    backward_op: Option<Rc<dyn BackwardOp>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a tensor from an ndarray
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        Self {
            id: next_id(),
            data,
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad,
        }
    }

    /// Create a tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a zero-filled tensor
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Create a one-filled tensor
    pub fn ones(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::ones(len), requires_grad)
    }

    /// Create a single-element tensor
    pub fn scalar(value: f32, requires_grad: bool) -> Self {
        Self::from_vec(vec![value], requires_grad)
    }

    /// Create a constant (never receives gradient)
    pub fn constant(data: Array1<f32>) -> Self {
        Self::new(data, false)
    }

    /// Graph identity, shared by clones
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// First element; the value of a scalar loss
    pub fn item(&self) -> f32 {
        self.data.first().copied().unwrap_or(f32::NAN)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// A leaf has no backward operation (parameters and constants)
    pub fn is_leaf(&self) -> bool {
        self.backward_op.is_none()
    }

    /// Copy of the accumulated gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add to the gradient, initialising it on first use
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing += &grad,
            None => *cell = Some(grad),
        }
    }

    /// Drop the accumulated gradient
    pub fn zero_grad(&mut self) {
        *self.grad.borrow_mut() = None;
    }

    pub fn grad_cell(&self) -> Rc<RefCell<Option<Array1<f32>>>> {
        Rc::clone(&self.grad)
    }

    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// Same values, cut from the graph, with a fresh identity
    pub fn detach(&self) -> Tensor {
        Tensor::new(self.data.clone(), false)
    }

    /// Whether every element is finite
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("data", &self.data)
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .field("is_leaf", &self.is_leaf())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_clone_shares_grad() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let b = a.clone();
        b.accumulate_grad(arr1(&[1.0, 1.0]));
        assert_eq!(a.grad().unwrap(), arr1(&[1.0, 1.0]));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_detach_is_new_leaf() {
        let a = Tensor::from_vec(vec![3.0], true);
        let d = a.detach();
        assert_ne!(a.id(), d.id());
        assert!(!d.requires_grad());
        assert_eq!(d.item(), 3.0);
    }

    #[test]
    fn test_zero_grad_clears() {
        let mut a = Tensor::zeros(3, true);
        a.set_grad(arr1(&[1.0, 2.0, 3.0]));
        a.zero_grad();
        assert!(a.grad().is_none());
    }

    #[test]
    fn test_is_finite() {
        assert!(Tensor::ones(4, false).is_finite());
        assert!(!Tensor::from_vec(vec![1.0, f32::NAN], false).is_finite());
        assert!(!Tensor::scalar(f32::INFINITY, false).is_finite());
    }

    #[test]
    fn test_item_on_empty_is_nan() {
        assert!(Tensor::zeros(0, false).item().is_nan());
    }
}
