//! Cross Entropy Loss for classification

use crate::autograd::{softmax, tracks_grad, BackwardOp};
use crate::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

use super::LossFn;

/// One-hot target vector of length `len` with a one at `index`
pub fn one_hot(index: usize, len: usize) -> Tensor {
    let mut v = Array1::zeros(len);
    if index < len {
        v[index] = 1.0;
    }
    Tensor::constant(v)
}

/// Cross Entropy Loss (for classification)
///
/// L = -sum(targets * log(softmax(predictions)))
///
/// # Example
///
/// ```
/// use entrenar_f1::train::{one_hot, CrossEntropyLoss, LossFn};
/// use entrenar_f1::Tensor;
///
/// let loss_fn = CrossEntropyLoss;
/// let logits = Tensor::from_vec(vec![2.0, 1.0], true);
///
/// let loss = loss_fn.forward(&logits, &one_hot(0, 2));
/// assert!(loss.item() > 0.0);
/// ```
pub struct CrossEntropyLoss;

impl LossFn for CrossEntropyLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let probs = softmax(predictions.data());

        // log_softmax = x - max - ln(sum(exp(x - max)))
        let logits = predictions.data();
        let max = logits.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let log_sum_exp = logits.mapv(|v| (v - max).exp()).sum().ln();
        let ce: f32 = targets
            .data()
            .iter()
            .zip(logits.iter())
            .map(|(&t, &x)| -t * (x - max - log_sum_exp))
            .sum();

        let requires_grad = tracks_grad(&[predictions]);
        let mut loss = Tensor::from_vec(vec![ce], requires_grad);

        if requires_grad {
            // d(CE)/d(logits) = probs - targets
            loss.set_backward_op(Rc::new(CEBackward {
                predictions: predictions.clone(),
                local_grad: &probs - targets.data(),
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}

struct CEBackward {
    predictions: Tensor,
    local_grad: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for CEBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.local_grad * grad[0]);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.predictions]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, scale};
    use approx::assert_relative_eq;

    #[test]
    fn test_cross_entropy_loss() {
        let logits = Tensor::from_vec(vec![2.0, 1.0, 0.5], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0, 0.0], false);

        let loss = CrossEntropyLoss.forward(&logits, &targets);

        assert!(loss.item() > 0.0);
        assert!(loss.item().is_finite());
    }

    #[test]
    fn test_cross_entropy_gradient() {
        let logits = Tensor::from_vec(vec![2.0, 1.0, 0.5], true);
        let mut loss = CrossEntropyLoss.forward(&logits, &one_hot(0, 3));

        backward(&mut loss, None);

        let grad = logits.grad().unwrap();
        for g in &grad {
            assert!(g.is_finite());
        }
        // probs - target with target = 1 at index 0
        assert!(grad[0] < 0.0);
        assert_relative_eq!(grad.sum(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_cross_entropy_gradient_scaled_by_upstream() {
        let logits = Tensor::from_vec(vec![0.3, -0.2], true);
        let mut loss = CrossEntropyLoss.forward(&logits, &one_hot(1, 2));
        let unscaled = &softmax(logits.data()) - one_hot(1, 2).data();

        let mut scaled = scale(&loss, 4.0);
        backward(&mut scaled, None);

        let grad = logits.grad().unwrap();
        assert_relative_eq!(grad[0], 4.0 * unscaled[0], epsilon = 1e-6);
        assert_relative_eq!(grad[1], 4.0 * unscaled[1], epsilon = 1e-6);
        loss.zero_grad();
    }

    #[test]
    #[should_panic(expected = "must have same length")]
    fn test_cross_entropy_mismatched_lengths() {
        let pred = Tensor::from_vec(vec![1.0, 2.0], true);
        let target = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
        CrossEntropyLoss.forward(&pred, &target);
    }

    #[test]
    fn test_cross_entropy_constant_input_has_no_backward() {
        let pred = Tensor::from_vec(vec![2.0, 1.0], false);
        let loss = CrossEntropyLoss.forward(&pred, &one_hot(0, 2));
        assert!(loss.item() > 0.0);
        assert!(loss.is_leaf());
    }

    #[test]
    fn test_uniform_logits_give_log_c() {
        for &nc in &[2_usize, 3, 5, 10] {
            let pred = Tensor::from_vec(vec![1.0; nc], false);
            let loss = CrossEntropyLoss.forward(&pred, &one_hot(0, nc));
            assert_relative_eq!(loss.item(), (nc as f32).ln(), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_dominant_logit_gives_near_zero_loss() {
        for target in 0..2 {
            let mut logits = vec![-50.0; 2];
            logits[target] = 50.0;
            let pred = Tensor::from_vec(logits, false);
            let loss = CrossEntropyLoss.forward(&pred, &one_hot(target, 2));
            assert!(loss.item() < 1e-3);
        }
    }

    #[test]
    fn test_large_logit_gap_is_not_capped() {
        let pred = Tensor::from_vec(vec![0.0, 100.0], false);
        let loss = CrossEntropyLoss.forward(&pred, &one_hot(0, 2));
        assert_relative_eq!(loss.item(), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_one_hot_out_of_range_is_zero() {
        assert_eq!(one_hot(5, 2).data().to_vec(), vec![0.0, 0.0]);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_cross_entropy_finite_and_non_negative(
                a in -500.0f32..500.0,
                b in -500.0f32..500.0,
                target in 0usize..2,
            ) {
                let pred = Tensor::from_vec(vec![a, b], false);
                let loss = CrossEntropyLoss.forward(&pred, &one_hot(target, 2));
                prop_assert!(loss.item().is_finite());
                prop_assert!(loss.item() >= -1e-6);
            }
        }
    }
}
