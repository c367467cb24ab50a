//! Decoded solver reports.
//!
//! Both report formats decode into the same [`SolutionData`]: one typed record
//! per row of each section, plus the two scalar sections. A [`Solution`]
//! pairs that data with what is known about the solver run.

use std::collections::HashMap;

use bcn_solver_common::SolverRun;
use serde::{Deserialize, Serialize};

use crate::{ArcKey, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortestPathRecord {
    pub origin: NodeId,
    pub destination: NodeId,
    pub shortest_path_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub origin: NodeId,
    pub destination: NodeId,
    pub arc: ArcKey,
    pub infrastructure: usize,
    pub flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureRecord {
    pub arc: ArcKey,
    pub infrastructure: usize,
    pub construction_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandTransferRecord {
    pub origin: NodeId,
    pub destination: NodeId,
    pub demand_transfered: f64,
    /// Breakpoint index the solver selected
    pub j_value: usize,
    pub z: f64,
}

/// Normalized report sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionData {
    pub shortest_paths: Vec<ShortestPathRecord>,
    /// Absent from some reports
    #[serde(default)]
    pub flows: Vec<FlowRecord>,
    pub infrastructures: Vec<InfrastructureRecord>,
    pub demand_transfered: Vec<DemandTransferRecord>,
    pub total_demand_transfered: f64,
    pub budget_used: f64,
}

impl SolutionData {
    /// Infrastructure level per arc; arcs missing from the report are at level 0.
    pub fn infrastructure_levels(&self) -> HashMap<ArcKey, usize> {
        self.infrastructures
            .iter()
            .map(|r| (r.arc.clone(), r.infrastructure))
            .collect()
    }

    pub fn shortest_path(
        &self,
        origin: &NodeId,
        destination: &NodeId,
    ) -> Option<&ShortestPathRecord> {
        self.shortest_paths
            .iter()
            .find(|r| &r.origin == origin && &r.destination == destination)
    }

    pub fn demand_transfer(
        &self,
        origin: &NodeId,
        destination: &NodeId,
    ) -> Option<&DemandTransferRecord> {
        self.demand_transfered
            .iter()
            .find(|r| &r.origin == origin && &r.destination == destination)
    }
}

/// A decoded report together with its solver metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub data: SolutionData,
    #[serde(default)]
    pub run: SolverRun,
}

impl Solution {
    pub fn new(data: SolutionData) -> Self {
        Self {
            data,
            run: SolverRun::default(),
        }
    }

    pub fn with_run(mut self, run: SolverRun) -> Self {
        self.run = run;
        self
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = self.run.summary();
        s.push_str(&format!(
            "Upgraded arcs: {}\n",
            self.data
                .infrastructures
                .iter()
                .filter(|r| r.infrastructure > 0)
                .count()
        ));
        s.push_str(&format!("Budget used: {:.2}\n", self.data.budget_used));
        s.push_str(&format!(
            "Total demand transfered: {:.2}\n",
            self.data.total_demand_transfered
        ));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcn_solver_common::SolverId;

    fn sample() -> SolutionData {
        SolutionData {
            shortest_paths: vec![ShortestPathRecord {
                origin: "1".into(),
                destination: "3".into(),
                shortest_path_cost: 8.8,
            }],
            infrastructures: vec![InfrastructureRecord {
                arc: "arc_1_2".into(),
                infrastructure: 1,
                construction_cost: 20.0,
            }],
            budget_used: 20.0,
            ..SolutionData::default()
        }
    }

    #[test]
    fn test_lookups() {
        let data = sample();
        assert_eq!(data.infrastructure_levels().get(&"arc_1_2".into()), Some(&1));
        assert!(data.shortest_path(&"1".into(), &"3".into()).is_some());
        assert!(data.shortest_path(&"3".into(), &"1".into()).is_none());
        assert!(data.demand_transfer(&"1".into(), &"3".into()).is_none());
    }

    #[test]
    fn test_summary() {
        let solution =
            Solution::new(sample()).with_run(SolverRun::new(Some(SolverId::Cbc)));
        let text = solution.summary();
        assert!(text.contains("Solver: CBC"));
        assert!(text.contains("Upgraded arcs: 1"));
        assert!(text.contains("Budget used: 20.00"));
    }

    #[test]
    fn test_json_without_flows() {
        let json = r#"{"data":{"shortest_paths":[],"infrastructures":[],
            "demand_transfered":[],"total_demand_transfered":0.0,"budget_used":0.0}}"#;
        let solution: Solution = serde_json::from_str(json).unwrap();
        assert!(solution.data.flows.is_empty());
        assert_eq!(solution.run, SolverRun::default());
    }
}
