//! Primal-dual training under an F1-style constraint
//!
//! Each class of a one-vs-rest problem trains a [`ConstrainedModel`] jointly
//! with a per-sample threshold `tau`, a slack `eps` and a scale `w`, while
//! Lagrange multipliers `lambda`, `gamma` and `mu` enforce the constraint.
//! The [`Scheduler`] alternates `n_inner` stochastic primal steps with one
//! full-batch dual step; the [`PerClassDriver`] repeats that per class.
//!
//! [`ConstrainedModel`]: crate::models::ConstrainedModel

mod context;
mod driver;
mod dual;
mod evaluate;
mod lagrangian;
mod primal;
mod scheduler;
mod state;


pub use context::{ClassRunContext, ContextSettings};
pub use driver::{
    train_from_spec, train_from_yaml, ClassOutcome, ClassResult, DriverReport, PerClassDriver,
};
pub use dual::{accumulate, apply_update, dual_step, DualCaches, DualRates};
pub use evaluate::{evaluate, Evaluation};
pub use lagrangian::{lagrangian_term, DualSnapshot};
pub use primal::{primal_step, PrimalRates, StepLocation, StepOutcome};
pub use scheduler::{OuterSummary, Phase, Schedule, Scheduler};
pub use state::{DualVariables, PrimalVariables, DUAL_INIT};
