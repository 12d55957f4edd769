//! Matrix multiplication over row-major flattened tensors

use crate::autograd::context::tracks_grad;
use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Transpose a row-major matrix (rows x cols) to (cols x rows)
pub fn transpose(data: &Array1<f32>, rows: usize, cols: usize) -> Array1<f32> {
    let mut transposed = Array1::zeros(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            transposed[c * rows + r] = data[r * cols + c];
        }
    }
    transposed
}

/// C = A @ B on flattened row-major storage
pub fn matmul_compute(
    a: &Array1<f32>,
    b: &Array1<f32>,
    m: usize,
    k: usize,
    n: usize,
) -> Array1<f32> {
    let mut c = Array1::zeros(m * n);
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            for j in 0..n {
                c[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
    c
}

/// Matrix multiplication
///
/// Computes C = A @ B where:
/// - A is m×k (flattened to length m*k)
/// - B is k×n (flattened to length k*n)
/// - C is m×n (flattened to length m*n)
///
/// # Panics
///
/// Panics if the tensor lengths disagree with the given dimensions.
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "Matrix A size mismatch");
    assert_eq!(b.len(), k * n, "Matrix B size mismatch");

    let result_data = matmul_compute(a.data(), b.data(), m, k, n);
    let requires_grad = tracks_grad(&[a, b]);
    let mut result = Tensor::new(result_data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        if let Some(grad_c) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // grad_A = grad_C @ B^T: (m, n) @ (n, k) = (m, k)
                let b_t = transpose(self.b.data(), self.k, self.n);
                let grad_a = matmul_compute(grad_c, &b_t, self.m, self.n, self.k);
                self.a.accumulate_grad(grad_a);
            }

            if self.b.requires_grad() {
                // grad_B = A^T @ grad_C: (k, m) @ (m, n) = (k, n)
                let a_t = transpose(self.a.data(), self.m, self.k);
                let grad_b = matmul_compute(&a_t, grad_c, self.k, self.m, self.n);
                self.b.accumulate_grad(grad_b);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}
