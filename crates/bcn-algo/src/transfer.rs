//! Demand-transfer shaping functions.
//!
//! Each function maps the ratio `p` between the improved and the base path
//! cost to the fraction of demand that moves onto the network. All of them
//! are decreasing on `[m, 1]`: `p = 1` means no improvement, `p = m` is the
//! best a fully built path can reach.

use std::fmt;
use std::str::FromStr;

use bcn_core::BcnError;
use serde::{Deserialize, Serialize};

/// Default best achievable cost ratio.
pub const DEFAULT_M: f64 = 0.4;

/// Shape of the improvement to transfer curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferFunction {
    /// Straight line from `(m, 1)` to `(1, 0)`
    Linear,
    /// Logistic step centered between `m` and 1
    InvLogit,
    /// Little transfer until the path is heavily improved
    Sad,
    /// Most of the transfer happens on the first improvements
    Happy,
}

impl TransferFunction {
    pub fn all() -> [TransferFunction; 4] {
        [
            TransferFunction::Linear,
            TransferFunction::InvLogit,
            TransferFunction::Sad,
            TransferFunction::Happy,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransferFunction::Linear => "linear",
            TransferFunction::InvLogit => "inv_logit",
            TransferFunction::Sad => "sad",
            TransferFunction::Happy => "happy",
        }
    }

    /// Transferred fraction at cost ratio `p` for best ratio `m`.
    pub fn evaluate(&self, p: f64, m: f64) -> f64 {
        let rate = logit_rate(m);
        match self {
            TransferFunction::Linear => (p - 1.0) / (m - 1.0),
            TransferFunction::InvLogit => 1.0 / (1.0 + (2.0 * rate * (p - (1.0 + m) / 2.0)).exp()),
            TransferFunction::Sad => 2.0 / (1.0 + (rate * (p - 1.0)).exp()) - 1.0,
            TransferFunction::Happy => 2.0 / (1.0 + (rate * (p - m)).exp()),
        }
    }
}

/// Steepness of the logistic shapes, scaled to the width of `[m, 1]`.
pub fn logit_rate(m: f64) -> f64 {
    5.0 / (1.0 - m)
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransferFunction {
    type Err = BcnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransferFunction::all()
            .into_iter()
            .find(|f| f.name() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| {
                BcnError::Config(format!(
                    "unknown transfer function '{}' (expected linear, inv_logit, sad or happy)",
                    s
                ))
            })
    }
}
