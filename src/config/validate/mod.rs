//! Configuration validation
//!
//! Checks a parsed spec for usable ranges before any class run starts.

mod error;
mod validator;


pub use error::ValidationError;
pub use validator::validate_config;
