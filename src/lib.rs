//! Primal-dual training of one-vs-rest classifiers under an F1-style constraint
//!
//! Every class of a multi-label problem is trained independently: a small
//! model learns the class decision while a per-sample threshold `tau`, a
//! slack `eps` and a scale `w` are optimized jointly, and Lagrange
//! multipliers enforce the constraint between them.
//!
//! # Modules
//!
//! - [`autograd`]: tape-based reverse-mode differentiation
//! - [`models`]: two-head reference models and their registry
//! - [`optim`]: SGD and named parameter groups
//! - [`primal_dual`]: primal step, dual step, scheduler and per-class driver
//! - [`data`]: binary/multi-label datasets and the synthetic generator
//! - [`checkpoint`]: per-class resumable state
//! - [`tracking`]: per-class metric logging
//! - [`config`]: YAML configuration and CLI arguments
//!
//! # Example
//!
//! ```no_run
//! use entrenar_f1::primal_dual::train_from_yaml;
//!
//! let report = train_from_yaml("configs/primal_dual.yaml")?;
//! println!("macro F1: {:?}", report.macro_f1());
//! # Ok::<(), entrenar_f1::Error>(())
//! ```

pub mod autograd;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod optim;
pub mod primal_dual;
pub mod telemetry;
pub mod tracking;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
