//! Independent audit of a decoded solver solution.
//!
//! Three checks run against the [`Model`], each filling its own named group
//! of the returned [`ErrorTree`]:
//!
//! - `shortest_paths`: no reported path may cost more than on the base network
//! - `budget_excess`: unspent budget must not afford an upgrade on a shortest path
//! - `demand_transfered`: selected breakpoints and the total must follow from
//!   the built network
//!
//! Findings never abort validation. An inconsistent model (an OD pair
//! without any path) is an error, as is a report that builds an arc the model
//! lacks or a level past the model's last one.

mod budget;
mod demand;
mod shortest_path;

use std::collections::HashMap;
use std::path::Path;

use bcn_core::costs::user_cost;
use bcn_core::{
    shortest_path_cost, Arc, ArcKey, BcnError, BcnResult, ErrorTree, Model, OdPair, Solution,
};
use serde::Deserialize;
use tracing::{info, warn};

pub use budget::check_budget_excess;
pub use demand::check_demand_transfer;
pub use shortest_path::check_shortest_paths;

/// Numeric tolerances of the checks.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Unspent budget below this is treated as fully spent
    pub budget_tolerance: f64,
    /// Allowed difference between reported and recomputed path costs
    pub cost_tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            budget_tolerance: 1e-3,
            cost_tolerance: 1e-3,
        }
    }
}

impl ValidationConfig {
    /// Parse tolerances from TOML text; absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> BcnResult<Self> {
        toml::from_str(text).map_err(|e| BcnError::Config(e.to_string()))
    }

    pub fn from_path(path: &Path) -> BcnResult<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| BcnError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Run every check and collect the findings.
pub fn validate_solution(
    model: &Model,
    solution: &Solution,
    config: &ValidationConfig,
) -> BcnResult<ErrorTree> {
    let effective = EffectiveNetwork::new(model, solution)?;

    let mut root = ErrorTree::group();
    root.push_child(
        "shortest_paths",
        check_shortest_paths(model, solution, config)?,
    );
    root.push_child(
        "budget_excess",
        check_budget_excess(model, solution, &effective, config)?,
    );
    root.push_child(
        "demand_transfered",
        check_demand_transfer(model, solution, &effective, config)?,
    );

    if root.is_empty() {
        info!(odpairs = model.odpairs().len(), "solution passed validation");
    } else {
        warn!(
            violations = root.message_count(),
            "solution failed validation"
        );
    }
    Ok(root)
}

/// The network as built by a solution: every arc priced at the user cost of
/// its reported infrastructure level.
pub struct EffectiveNetwork<'a> {
    model: &'a Model,
    levels: HashMap<ArcKey, usize>,
}

impl<'a> EffectiveNetwork<'a> {
    /// Rejects reported levels that would price an arc outside the model.
    pub fn new(model: &'a Model, solution: &Solution) -> BcnResult<Self> {
        let top_level = model.infrastructure_count();
        for record in &solution.data.infrastructures {
            if model.network().arc(&record.arc).is_none() {
                return Err(BcnError::Validation(format!(
                    "reported infrastructure on unknown arc {}",
                    record.arc
                )));
            }
            if record.infrastructure >= top_level {
                return Err(BcnError::Validation(format!(
                    "{} built at level {} but the model has {} levels",
                    record.arc, record.infrastructure, top_level
                )));
            }
        }
        Ok(Self {
            model,
            levels: solution.data.infrastructure_levels(),
        })
    }

    /// Reported level of `arc`, 0 when absent.
    pub fn level(&self, arc: &ArcKey) -> usize {
        self.levels.get(arc).copied().unwrap_or(0)
    }

    pub fn weight(&self, arc: &Arc) -> f64 {
        user_cost(arc, self.level(&arc.key))
    }

    /// Shortest-path cost of `od` over the built network.
    pub fn path_cost(&self, od: &OdPair) -> BcnResult<f64> {
        shortest_path_cost(self.model.network(), &od.origin, &od.destination, |a| {
            self.weight(a)
        })?
        .ok_or_else(|| {
            BcnError::Network(format!(
                "{} -> {} has no path on the built network",
                od.origin, od.destination
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ValidationConfig::from_toml_str("").unwrap();
        assert_eq!(config, ValidationConfig::default());

        let config = ValidationConfig::from_toml_str("budget_tolerance = 0.5").unwrap();
        assert_eq!(config.budget_tolerance, 0.5);
        assert_eq!(config.cost_tolerance, 1e-3);
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validation.toml");
        std::fs::write(&path, "cost_tolerance = 0.01\nbudget_tolerance = 2.0\n").unwrap();
        let config = ValidationConfig::from_path(&path).unwrap();
        assert_eq!(config.cost_tolerance, 0.01);
        assert_eq!(config.budget_tolerance, 2.0);
        assert!(ValidationConfig::from_path(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_config_rejects_bad_types() {
        assert!(matches!(
            ValidationConfig::from_toml_str("cost_tolerance = \"tight\""),
            Err(BcnError::Config(_))
        ));
    }
}
