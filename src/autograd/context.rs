//! Gradient-recording mode
//!
//! Inference passes (the dual sweep, test evaluation) run under [`no_grad`]
//! so no operation records a backward rule.

use std::cell::Cell;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether operations currently record gradients
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

/// Run `f` with gradient recording disabled, restoring the previous mode
pub fn no_grad<R>(f: impl FnOnce() -> R) -> R {
    struct Restore(bool);

    impl Drop for Restore {
        fn drop(&mut self) {
            GRAD_ENABLED.with(|g| g.set(self.0));
        }
    }

    let _restore = Restore(GRAD_ENABLED.with(|g| g.replace(false)));
    f()
}

/// Whether an operation over `inputs` must record a backward rule
pub(crate) fn tracks_grad(inputs: &[&super::Tensor]) -> bool {
    is_grad_enabled() && inputs.iter().any(|t| t.requires_grad())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{add, Tensor};

    #[test]
    fn test_grad_enabled_by_default() {
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_no_grad_scopes_mode() {
        let inside = no_grad(is_grad_enabled);
        assert!(!inside);
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_no_grad_nested() {
        no_grad(|| {
            no_grad(|| assert!(!is_grad_enabled()));
            assert!(!is_grad_enabled());
        });
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_ops_under_no_grad_are_leaves() {
        let a = Tensor::from_vec(vec![1.0], true);
        let b = Tensor::from_vec(vec![2.0], true);
        let c = no_grad(|| add(&a, &b));
        assert!(!c.requires_grad());
        assert!(c.is_leaf());
        assert_eq!(c.item(), 3.0);
    }
}
