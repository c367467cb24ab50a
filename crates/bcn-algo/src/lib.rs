//! # bcn-algo: Breakpoints & Solution Validation
//!
//! Algorithms that sit on either side of the solver run: shaping the demand
//! transfer curve into breakpoints before a model is exported, and auditing
//! the decoded solution afterwards.
//!
//! ## Breakpoints
//!
//! [`build_breakpoints`] samples a decreasing [`TransferFunction`] over
//! `[m, 1]` and picks evenly spaced transfer levels:
//!
//! | Function | Shape |
//! |----------|-------|
//! | [`TransferFunction::Linear`] | proportional to the improvement |
//! | [`TransferFunction::InvLogit`] | logistic step halfway between `m` and 1 |
//! | [`TransferFunction::Sad`] | transfer concentrated near full improvement |
//! | [`TransferFunction::Happy`] | transfer concentrated on the first improvements |
//!
//! ## Validation
//!
//! [`validate_solution`] checks a [`bcn_core::Solution`] against its
//! [`bcn_core::Model`] and returns an [`bcn_core::ErrorTree`] of findings.
//!
//! ## Example
//!
//! ```rust
//! use bcn_algo::{build_breakpoints, default_m, TransferFunction};
//!
//! let m = default_m(3).unwrap();
//! let f = TransferFunction::InvLogit;
//! let breakpoints = build_breakpoints(|p| f.evaluate(p, m), 6, m).unwrap();
//! assert_eq!(breakpoints.len(), 6);
//! ```

pub mod breakpoints;
pub mod transfer;
pub mod validation;

pub use breakpoints::{build_breakpoints, default_m, get_breakpoint_index};
pub use transfer::{TransferFunction, DEFAULT_M};
pub use validation::{validate_solution, EffectiveNetwork, ValidationConfig};
