//! # bcn-core: Network Investment Modeling Core
//!
//! Provides the data structures shared by every bcnet crate: the directed arc
//! network, the investment [`Model`] built on top of it, the decoded solver
//! [`Solution`], and the [`ErrorTree`] used to report validation findings.
//!
//! ## Design Philosophy
//!
//! Networks are modeled as **directed graphs** where:
//! - **Nodes**: intersections or stops, identified by a string id
//! - **Edges**: arcs, each carrying a base construction cost and a base user cost
//!
//! Every arc can receive one infrastructure level out of `0..infrastructure_count`.
//! Level 0 means "no investment"; higher levels cost more to build and less to
//! travel (see [`costs`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use bcn_core::*;
//!
//! let mut network = Network::new();
//! network.add_node(Node::new("a")).unwrap();
//! network.add_node(Node::new("b")).unwrap();
//! network.add_arc(Arc::new("a", "b", 10.0, 4.0)).unwrap();
//!
//! let arc = network.arc(&ArcKey::from_endpoints(&"a".into(), &"b".into())).unwrap();
//! assert_eq!(arc.key.as_str(), "arc_a_b");
//! assert_eq!(costs::construction_cost(arc, 1), 20.0);
//! ```
//!
//! ## Modules
//!
//! - [`costs`] - Per-level construction and user cost
//! - [`graph_utils`] - Statistics and shortest-path queries
//! - [`model`] - OD pairs, breakpoints and the investment model
//! - [`solution`] - Typed records decoded from solver reports
//! - [`diagnostics`] - Validation error tree

use petgraph::graph::{DiGraph, EdgeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub mod costs;
pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod model;
pub mod solution;

pub use diagnostics::ErrorTree;
pub use error::{BcnError, BcnResult};
pub use graph_utils::*;
pub use model::{od_id, Breakpoint, Model, ModelFile, OdPair};
pub use petgraph::graph::NodeIndex;
pub use solution::{
    DemandTransferRecord, FlowRecord, InfrastructureRecord, ShortestPathRecord, Solution,
    SolutionData,
};

/// Identifier of a network node as it appears in input files and solver output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

/// Unique arc key, derived from the arc's endpoints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArcKey(String);

impl NodeId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        NodeId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ArcKey {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        ArcKey(value.into())
    }

    /// Key of the arc going from `source` to `destination`.
    pub fn from_endpoints(source: &NodeId, destination: &NodeId) -> Self {
        ArcKey(format!("arc_{}_{}", source.0, destination.0))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::new(value)
    }
}

impl From<&str> for ArcKey {
    fn from(value: &str) -> Self {
        ArcKey::new(value)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ArcKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Planar position, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<(f64, f64)>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            pos: None,
        }
    }

    pub fn with_pos(mut self, x: f64, y: f64) -> Self {
        self.pos = Some((x, y));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub source: NodeId,
    pub destination: NodeId,
    /// Always `arc_<source>_<destination>`; recomputed when the arc joins a network
    #[serde(default)]
    pub key: ArcKey,
    /// Base construction cost (cost of level 1 is twice this value)
    pub construction_cost: f64,
    /// Base user cost (travel cost at level 0)
    pub user_cost: f64,
    /// Planar length of the arc
    #[serde(default)]
    pub distance: f64,
    /// Explicit construction cost per infrastructure level
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub construction_cost_overrides: BTreeMap<usize, f64>,
    /// Explicit user cost per infrastructure level
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_cost_overrides: BTreeMap<usize, f64>,
}

impl Arc {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        construction_cost: f64,
        user_cost: f64,
    ) -> Self {
        let source = NodeId::new(source);
        let destination = NodeId::new(destination);
        let key = ArcKey::from_endpoints(&source, &destination);
        Self {
            source,
            destination,
            key,
            construction_cost,
            user_cost,
            distance: 0.0,
            construction_cost_overrides: BTreeMap::new(),
            user_cost_overrides: BTreeMap::new(),
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Pin the construction cost of `level` instead of deriving it.
    pub fn with_construction_cost_override(mut self, level: usize, cost: f64) -> Self {
        self.construction_cost_overrides.insert(level, cost);
        self
    }

    /// Pin the user cost of `level` instead of deriving it.
    pub fn with_user_cost_override(mut self, level: usize, cost: f64) -> Self {
        self.user_cost_overrides.insert(level, cost);
        self
    }
}

/// Arc attribute used as the travel weight on the unmodified network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostAttribute {
    #[default]
    UserCost,
    Distance,
    ConstructionCost,
}

impl CostAttribute {
    pub fn weight(&self, arc: &Arc) -> f64 {
        match self {
            CostAttribute::UserCost => arc.user_cost,
            CostAttribute::Distance => arc.distance,
            CostAttribute::ConstructionCost => arc.construction_cost,
        }
    }
}

/// The directed arc network
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub graph: DiGraph<Node, Arc>,
    nodes: HashMap<NodeId, NodeIndex>,
    arcs: HashMap<ArcKey, EdgeIndex>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; ids must be unique.
    pub fn add_node(&mut self, node: Node) -> BcnResult<NodeIndex> {
        if self.nodes.contains_key(&node.id) {
            return Err(BcnError::Network(format!("duplicate node '{}'", node.id)));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.nodes.insert(id, idx);
        Ok(idx)
    }

    /// Add an arc between two existing nodes.
    ///
    /// The key is rederived from the endpoints, so a second arc between the
    /// same pair of nodes is rejected.
    pub fn add_arc(&mut self, mut arc: Arc) -> BcnResult<EdgeIndex> {
        arc.key = ArcKey::from_endpoints(&arc.source, &arc.destination);
        if self.arcs.contains_key(&arc.key) {
            return Err(BcnError::Network(format!("duplicate arc '{}'", arc.key)));
        }
        let from = self.require_node(&arc.source)?;
        let to = self.require_node(&arc.destination)?;
        let key = arc.key.clone();
        let idx = self.graph.add_edge(from, to, arc);
        self.arcs.insert(key, idx);
        Ok(idx)
    }

    fn require_node(&self, id: &NodeId) -> BcnResult<NodeIndex> {
        self.node_index(id)
            .ok_or_else(|| BcnError::Network(format!("arc references unknown node '{}'", id)))
    }

    pub fn node_index(&self, id: &NodeId) -> Option<NodeIndex> {
        self.nodes.get(id).copied()
    }

    pub fn arc_index(&self, key: &ArcKey) -> Option<EdgeIndex> {
        self.arcs.get(key).copied()
    }

    pub fn arc(&self, key: &ArcKey) -> Option<&Arc> {
        self.arc_index(key).map(|idx| &self.graph[idx])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Arcs in insertion order.
    pub fn arcs(&self) -> impl Iterator<Item = &Arc> {
        self.graph.edge_weights()
    }

    /// Arcs leaving `id`, in insertion order.
    pub fn outbound(&self, id: &NodeId) -> Vec<&Arc> {
        self.adjacent(id, Direction::Outgoing)
    }

    /// Arcs entering `id`, in insertion order.
    pub fn inbound(&self, id: &NodeId) -> Vec<&Arc> {
        self.adjacent(id, Direction::Incoming)
    }

    fn adjacent(&self, id: &NodeId, direction: Direction) -> Vec<&Arc> {
        let Some(idx) = self.node_index(id) else {
            return Vec::new();
        };
        let mut edges: Vec<EdgeIndex> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| petgraph::visit::EdgeRef::id(&e))
            .collect();
        // petgraph walks adjacency lists newest-first
        edges.sort();
        edges.into_iter().map(|e| &self.graph[e]).collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Fill every arc's distance from its endpoints' positions.
    ///
    /// Arcs with an endpoint lacking a position keep their current distance.
    pub fn compute_distances(&mut self) {
        for edge in self.graph.edge_indices() {
            let Some((from, to)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            if let (Some(a), Some(b)) = (self.graph[from].pos, self.graph[to].pos) {
                self.graph[edge].distance = plane_distance(a, b);
            }
        }
    }
}

/// Euclidean distance between two planar positions.
pub fn plane_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Network {
        let mut network = Network::new();
        for id in ["1", "2", "3"] {
            network.add_node(Node::new(id)).unwrap();
        }
        network.add_arc(Arc::new("1", "2", 5.0, 2.0)).unwrap();
        network.add_arc(Arc::new("2", "3", 5.0, 2.0)).unwrap();
        network.add_arc(Arc::new("1", "3", 9.0, 5.0)).unwrap();
        network
    }

    #[test]
    fn test_arc_key_is_derived_from_endpoints() {
        let mut arc = Arc::new("x", "y", 1.0, 1.0);
        arc.key = ArcKey::new("bogus");
        let mut network = Network::new();
        network.add_node(Node::new("x")).unwrap();
        network.add_node(Node::new("y")).unwrap();
        network.add_arc(arc).unwrap();
        assert!(network.arc(&"arc_x_y".into()).is_some());
        assert!(network.arc(&"bogus".into()).is_none());
    }

    #[test]
    fn test_duplicate_arc_rejected() {
        let mut network = triangle();
        let err = network.add_arc(Arc::new("1", "2", 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, BcnError::Network(_)));
        assert_eq!(network.arc_count(), 3);
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let mut network = triangle();
        assert!(network.add_arc(Arc::new("1", "9", 1.0, 1.0)).is_err());
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut network = triangle();
        assert!(network.add_node(Node::new("2")).is_err());
    }

    #[test]
    fn test_adjacency_in_insertion_order() {
        let network = triangle();
        let out: Vec<&str> = network
            .outbound(&"1".into())
            .iter()
            .map(|a| a.key.as_str())
            .collect();
        assert_eq!(out, vec!["arc_1_2", "arc_1_3"]);

        let inbound: Vec<&str> = network
            .inbound(&"3".into())
            .iter()
            .map(|a| a.key.as_str())
            .collect();
        assert_eq!(inbound, vec!["arc_2_3", "arc_1_3"]);
        assert!(network.outbound(&"missing".into()).is_empty());
    }

    #[test]
    fn test_compute_distances() {
        let mut network = Network::new();
        network.add_node(Node::new("a").with_pos(0.0, 0.0)).unwrap();
        network.add_node(Node::new("b").with_pos(3.0, 4.0)).unwrap();
        network.add_node(Node::new("c")).unwrap();
        network.add_arc(Arc::new("a", "b", 1.0, 1.0)).unwrap();
        network
            .add_arc(Arc::new("b", "c", 1.0, 1.0).with_distance(7.0))
            .unwrap();
        network.compute_distances();
        assert_eq!(network.arc(&"arc_a_b".into()).unwrap().distance, 5.0);
        assert_eq!(network.arc(&"arc_b_c".into()).unwrap().distance, 7.0);
    }

    #[test]
    fn test_cost_attribute_weight() {
        let arc = Arc::new("a", "b", 3.0, 2.0).with_distance(1.5);
        assert_eq!(CostAttribute::UserCost.weight(&arc), 2.0);
        assert_eq!(CostAttribute::Distance.weight(&arc), 1.5);
        assert_eq!(CostAttribute::ConstructionCost.weight(&arc), 3.0);
    }
}
