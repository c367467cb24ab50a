//! The investment model: network, demand, breakpoints and budget.
//!
//! A [`Model`] is checked once on construction and never mutated afterwards.
//! Base shortest-path costs per OD pair are computed lazily on the unmodified
//! network and cached for the lifetime of the model.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph_utils::shortest_path_cost;
use crate::{Arc, BcnError, BcnResult, CostAttribute, Network, Node, NodeId};

/// An origin-destination demand tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdPair {
    pub origin: NodeId,
    pub destination: NodeId,
    pub demand: f64,
}

impl OdPair {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, demand: f64) -> Self {
        Self {
            origin: NodeId::new(origin),
            destination: NodeId::new(destination),
            demand,
        }
    }
}

/// One point of the piecewise-linear improvement to transfer approximation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Fraction of demand that moves onto the network
    pub transfer_fraction: f64,
    /// Path cost, relative to the base cost, needed to earn that transfer
    pub cost_improvement_fraction: f64,
}

impl Breakpoint {
    pub fn new(transfer_fraction: f64, cost_improvement_fraction: f64) -> Self {
        Self {
            transfer_fraction,
            cost_improvement_fraction,
        }
    }
}

/// JSON persistence shape of a [`Model`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub nodes: Vec<Node>,
    pub arcs: Vec<Arc>,
    pub odpairs: Vec<OdPair>,
    pub breakpoints: Vec<Breakpoint>,
    pub budget: f64,
    pub infrastructure_count: usize,
    #[serde(default)]
    pub user_cost_weight: CostAttribute,
}

#[derive(Debug, Clone)]
pub struct Model {
    network: Network,
    odpairs: Vec<OdPair>,
    breakpoints: Vec<Breakpoint>,
    budget: f64,
    infrastructure_count: usize,
    user_cost_weight: CostAttribute,
    base_costs: OnceCell<Vec<f64>>,
}

impl Model {
    /// Assemble a model, rejecting any input that breaks a model invariant.
    pub fn new(
        network: Network,
        odpairs: Vec<OdPair>,
        breakpoints: Vec<Breakpoint>,
        budget: f64,
        infrastructure_count: usize,
        user_cost_weight: CostAttribute,
    ) -> BcnResult<Self> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(BcnError::Validation(format!(
                "budget must be a non-negative number, got {}",
                budget
            )));
        }
        if infrastructure_count < 2 {
            return Err(BcnError::Validation(format!(
                "at least 2 infrastructure levels are required, got {}",
                infrastructure_count
            )));
        }
        for (i, od) in odpairs.iter().enumerate() {
            if !od.demand.is_finite() || od.demand < 0.0 {
                return Err(BcnError::Validation(format!(
                    "{} has negative demand {}",
                    od_id(i),
                    od.demand
                )));
            }
            for end in [&od.origin, &od.destination] {
                if network.node_index(end).is_none() {
                    return Err(BcnError::Validation(format!(
                        "{} references unknown node '{}'",
                        od_id(i),
                        end
                    )));
                }
            }
        }
        check_breakpoints(&breakpoints)?;

        Ok(Self {
            network,
            odpairs,
            breakpoints,
            budget,
            infrastructure_count,
            user_cost_weight,
            base_costs: OnceCell::new(),
        })
    }

    /// Build a model from its persisted form.
    pub fn from_file(file: ModelFile) -> BcnResult<Self> {
        let mut network = Network::new();
        for node in file.nodes {
            network.add_node(node)?;
        }
        for arc in file.arcs {
            network.add_arc(arc)?;
        }
        network.compute_distances();
        Self::new(
            network,
            file.odpairs,
            file.breakpoints,
            file.budget,
            file.infrastructure_count,
            file.user_cost_weight,
        )
    }

    /// Persisted form of this model.
    pub fn to_file(&self) -> ModelFile {
        ModelFile {
            nodes: self.network.nodes().cloned().collect(),
            arcs: self.network.arcs().cloned().collect(),
            odpairs: self.odpairs.clone(),
            breakpoints: self.breakpoints.clone(),
            budget: self.budget,
            infrastructure_count: self.infrastructure_count,
            user_cost_weight: self.user_cost_weight,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn odpairs(&self) -> &[OdPair] {
        &self.odpairs
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn infrastructure_count(&self) -> usize {
        self.infrastructure_count
    }

    pub fn user_cost_weight(&self) -> CostAttribute {
        self.user_cost_weight
    }

    /// Index of the OD pair named `id` (`od_<index>`).
    pub fn od_index(&self, id: &str) -> Option<usize> {
        id.strip_prefix("od_")?
            .parse::<usize>()
            .ok()
            .filter(|i| *i < self.odpairs.len())
    }

    /// Shortest-path cost of every OD pair on the unmodified network, in OD order.
    ///
    /// Computed on first use. An OD pair whose destination is unreachable is a
    /// network error, since no investment can serve it.
    pub fn base_shortest_path_costs(&self) -> BcnResult<&[f64]> {
        let costs = self.base_costs.get_or_try_init(|| {
            let weight = self.user_cost_weight;
            let mut costs = Vec::with_capacity(self.odpairs.len());
            for (i, od) in self.odpairs.iter().enumerate() {
                let cost = shortest_path_cost(&self.network, &od.origin, &od.destination, |a| {
                    weight.weight(a)
                })?
                .ok_or_else(|| {
                    BcnError::Network(format!(
                        "{} ({} -> {}) has no path on the base network",
                        od_id(i),
                        od.origin,
                        od.destination
                    ))
                })?;
                costs.push(cost);
            }
            debug!(odpairs = costs.len(), "computed base shortest-path costs");
            Ok::<_, BcnError>(costs)
        })?;
        Ok(costs)
    }

    /// Base shortest-path cost of OD pair `index`.
    pub fn base_shortest_path_cost(&self, index: usize) -> BcnResult<f64> {
        self.base_shortest_path_costs()?
            .get(index)
            .copied()
            .ok_or_else(|| BcnError::Validation(format!("no OD pair at index {}", index)))
    }

    /// Path-cost thresholds of OD pair `index`: `cost_improvement_fraction[j] * base_cost`.
    pub fn thresholds(&self, index: usize) -> BcnResult<Vec<f64>> {
        let base = self.base_shortest_path_cost(index)?;
        Ok(self
            .breakpoints
            .iter()
            .map(|b| b.cost_improvement_fraction * base)
            .collect())
    }
}

/// Solver-side identifier of the OD pair at `index`.
pub fn od_id(index: usize) -> String {
    format!("od_{}", index)
}

fn check_breakpoints(breakpoints: &[Breakpoint]) -> BcnResult<()> {
    if breakpoints.is_empty() {
        return Err(BcnError::Validation("at least one breakpoint is required".into()));
    }
    for (j, b) in breakpoints.iter().enumerate() {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(b.transfer_fraction) || !in_range(b.cost_improvement_fraction) {
            return Err(BcnError::Validation(format!(
                "breakpoint {} is outside [0, 1]: ({}, {})",
                j, b.transfer_fraction, b.cost_improvement_fraction
            )));
        }
    }
    for (j, pair) in breakpoints.windows(2).enumerate() {
        if pair[1].transfer_fraction < pair[0].transfer_fraction {
            return Err(BcnError::Validation(format!(
                "transfer fraction decreases between breakpoints {} and {}",
                j,
                j + 1
            )));
        }
        if pair[1].cost_improvement_fraction > pair[0].cost_improvement_fraction {
            return Err(BcnError::Validation(format!(
                "cost improvement fraction increases between breakpoints {} and {}",
                j,
                j + 1
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_file() -> ModelFile {
        ModelFile {
            nodes: vec![
                Node::new("1").with_pos(0.0, 0.0),
                Node::new("2").with_pos(3.0, 4.0),
                Node::new("3"),
            ],
            arcs: vec![Arc::new("1", "2", 10.0, 4.0), Arc::new("2", "3", 10.0, 6.0)],
            odpairs: vec![OdPair::new("1", "3", 30.0)],
            breakpoints: vec![Breakpoint::new(0.0, 1.0), Breakpoint::new(0.5, 0.8)],
            budget: 100.0,
            infrastructure_count: 3,
            user_cost_weight: CostAttribute::UserCost,
        }
    }

    #[test]
    fn test_from_file_and_base_costs() {
        let model = Model::from_file(line_file()).unwrap();
        assert_eq!(model.base_shortest_path_costs().unwrap(), &[10.0]);
        assert_eq!(model.thresholds(0).unwrap(), vec![10.0, 8.0]);
        assert_eq!(
            model.network().arc(&"arc_1_2".into()).unwrap().distance,
            5.0
        );
    }

    #[test]
    fn test_od_index() {
        let model = Model::from_file(line_file()).unwrap();
        assert_eq!(model.od_index("od_0"), Some(0));
        assert_eq!(model.od_index("od_1"), None);
        assert_eq!(model.od_index("0"), None);
        assert_eq!(od_id(4), "od_4");
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let mut file = line_file();
        file.budget = -1.0;
        assert!(matches!(
            Model::from_file(file),
            Err(BcnError::Validation(_))
        ));

        let mut file = line_file();
        file.infrastructure_count = 1;
        assert!(Model::from_file(file).is_err());

        let mut file = line_file();
        file.breakpoints = vec![Breakpoint::new(0.5, 1.0), Breakpoint::new(0.2, 0.8)];
        assert!(Model::from_file(file).is_err());

        let mut file = line_file();
        file.odpairs.push(OdPair::new("1", "9", 1.0));
        assert!(Model::from_file(file).is_err());

        let mut file = line_file();
        file.arcs.push(Arc::new("1", "2", 1.0, 1.0));
        assert!(matches!(Model::from_file(file), Err(BcnError::Network(_))));
    }

    #[test]
    fn test_unreachable_od_pair() {
        let mut file = line_file();
        file.odpairs = vec![OdPair::new("3", "1", 5.0)];
        let model = Model::from_file(file).unwrap();
        assert!(matches!(
            model.base_shortest_path_costs(),
            Err(BcnError::Network(_))
        ));
    }

    #[test]
    fn test_to_file_roundtrips_through_json() {
        let model = Model::from_file(line_file()).unwrap();
        let json = serde_json::to_string(&model.to_file()).unwrap();
        let back: ModelFile = serde_json::from_str(&json).unwrap();
        let again = Model::from_file(back).unwrap();
        assert_eq!(again.odpairs(), model.odpairs());
        assert_eq!(again.network().arc_count(), 2);
        assert_eq!(again.budget(), 100.0);
    }
}
