use crate::{Arc, ArcKey, BcnError, BcnResult, Network, NodeId};
use petgraph::algo::{connected_components, dijkstra};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Summary statistics logged by `bcn-cli export` (density/degree/weak components).
#[derive(Debug)]
pub struct GraphStats {
    pub node_count: usize,
    pub arc_count: usize,
    pub connected_components: usize,
    pub min_out_degree: usize,
    pub avg_out_degree: f64,
    pub max_out_degree: usize,
    pub density: f64,
}

/// Calculates graph-level statistics; density uses the directed denominator `n(n-1)`.
pub fn graph_stats(network: &Network) -> GraphStats {
    let node_count = network.graph.node_count();
    let arc_count = network.graph.edge_count();
    let degrees: Vec<usize> = network
        .graph
        .node_indices()
        .map(|n| network.graph.edges_directed(n, Direction::Outgoing).count())
        .collect();
    let min_out_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_out_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_out_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        arc_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };

    GraphStats {
        node_count,
        arc_count,
        connected_components: connected_components(&network.graph),
        min_out_degree,
        avg_out_degree,
        max_out_degree,
        density,
    }
}

/// Dijkstra distances from `origin` to every reachable node.
pub fn shortest_path_costs<F>(
    network: &Network,
    origin: &NodeId,
    weight: F,
) -> BcnResult<HashMap<NodeIndex, f64>>
where
    F: Fn(&Arc) -> f64,
{
    let start = lookup(network, origin)?;
    Ok(dijkstra(&network.graph, start, None, |edge| {
        weight(edge.weight())
    }))
}

/// Cost of the cheapest path from `origin` to `destination`, `None` if unreachable.
pub fn shortest_path_cost<F>(
    network: &Network,
    origin: &NodeId,
    destination: &NodeId,
    weight: F,
) -> BcnResult<Option<f64>>
where
    F: Fn(&Arc) -> f64,
{
    let start = lookup(network, origin)?;
    let goal = lookup(network, destination)?;
    let dist = dijkstra(&network.graph, start, Some(goal), |edge| {
        weight(edge.weight())
    });
    Ok(dist.get(&goal).copied())
}

/// Every minimum-cost path from `origin` to `destination`, as arc keys in travel order.
///
/// An unreachable destination yields no paths; `origin == destination` yields
/// a single empty path.
pub fn all_shortest_paths<F>(
    network: &Network,
    origin: &NodeId,
    destination: &NodeId,
    weight: F,
) -> BcnResult<Vec<Vec<ArcKey>>>
where
    F: Fn(&Arc) -> f64,
{
    let start = lookup(network, origin)?;
    let goal = lookup(network, destination)?;
    if start == goal {
        return Ok(vec![vec![]]);
    }

    let dist = dijkstra(&network.graph, start, None, |edge| weight(edge.weight()));
    if !dist.contains_key(&goal) {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    let mut suffix = Vec::new();
    let mut on_path = HashSet::from([goal]);
    backtrack(
        network,
        &dist,
        &weight,
        start,
        goal,
        &mut suffix,
        &mut on_path,
        &mut paths,
    );
    Ok(paths)
}

#[allow(clippy::too_many_arguments)]
fn backtrack<F>(
    network: &Network,
    dist: &HashMap<NodeIndex, f64>,
    weight: &F,
    start: NodeIndex,
    node: NodeIndex,
    suffix: &mut Vec<ArcKey>,
    on_path: &mut HashSet<NodeIndex>,
    paths: &mut Vec<Vec<ArcKey>>,
) where
    F: Fn(&Arc) -> f64,
{
    if node == start {
        paths.push(suffix.iter().rev().cloned().collect());
        return;
    }
    let here = dist[&node];
    let mut incoming: Vec<_> = network
        .graph
        .edges_directed(node, Direction::Incoming)
        .collect();
    incoming.sort_by_key(|e| e.id());

    for edge in incoming {
        let prev = edge.source();
        let Some(&before) = dist.get(&prev) else {
            continue;
        };
        // zero-weight cycles would otherwise recurse forever
        if on_path.contains(&prev) {
            continue;
        }
        if !is_tight(before + weight(edge.weight()), here) {
            continue;
        }
        suffix.push(edge.weight().key.clone());
        on_path.insert(prev);
        backtrack(network, dist, weight, start, prev, suffix, on_path, paths);
        on_path.remove(&prev);
        suffix.pop();
    }
}

fn is_tight(through: f64, best: f64) -> bool {
    (through - best).abs() <= 1e-9 * best.abs().max(1.0)
}

fn lookup(network: &Network, id: &NodeId) -> BcnResult<NodeIndex> {
    network
        .node_index(id)
        .ok_or_else(|| BcnError::Network(format!("unknown node '{}'", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    /// Diamond a->b->d and a->c->d with equal cost, plus a pricier a->d shortcut.
    fn diamond() -> Network {
        let mut network = Network::new();
        for id in ["a", "b", "c", "d"] {
            network.add_node(Node::new(id)).unwrap();
        }
        network.add_arc(Arc::new("a", "b", 1.0, 1.0)).unwrap();
        network.add_arc(Arc::new("b", "d", 1.0, 2.0)).unwrap();
        network.add_arc(Arc::new("a", "c", 1.0, 2.0)).unwrap();
        network.add_arc(Arc::new("c", "d", 1.0, 1.0)).unwrap();
        network.add_arc(Arc::new("a", "d", 1.0, 5.0)).unwrap();
        network
    }

    #[test]
    fn test_shortest_path_cost() {
        let network = diamond();
        let cost = shortest_path_cost(&network, &"a".into(), &"d".into(), |a| a.user_cost)
            .unwrap();
        assert_eq!(cost, Some(3.0));
        let back = shortest_path_cost(&network, &"d".into(), &"a".into(), |a| a.user_cost)
            .unwrap();
        assert_eq!(back, None);
    }

    #[test]
    fn test_all_shortest_paths_finds_ties() {
        let network = diamond();
        let mut paths =
            all_shortest_paths(&network, &"a".into(), &"d".into(), |a| a.user_cost).unwrap();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                vec![ArcKey::new("arc_a_b"), ArcKey::new("arc_b_d")],
                vec![ArcKey::new("arc_a_c"), ArcKey::new("arc_c_d")],
            ]
        );
    }

    #[test]
    fn test_all_shortest_paths_respects_weight() {
        let network = diamond();
        let paths =
            all_shortest_paths(&network, &"a".into(), &"d".into(), |a| a.construction_cost)
                .unwrap();
        assert_eq!(paths, vec![vec![ArcKey::new("arc_a_d")]]);
    }

    #[test]
    fn test_degenerate_pairs() {
        let network = diamond();
        let same = all_shortest_paths(&network, &"b".into(), &"b".into(), |a| a.user_cost)
            .unwrap();
        assert_eq!(same, vec![Vec::<ArcKey>::new()]);
        let none = all_shortest_paths(&network, &"d".into(), &"a".into(), |a| a.user_cost)
            .unwrap();
        assert!(none.is_empty());
        assert!(shortest_path_cost(&network, &"zz".into(), &"a".into(), |a| a.user_cost).is_err());
    }

    #[test]
    fn test_zero_weight_cycle_terminates() {
        let mut network = Network::new();
        for id in ["a", "b", "c"] {
            network.add_node(Node::new(id)).unwrap();
        }
        network.add_arc(Arc::new("a", "b", 1.0, 0.0)).unwrap();
        network.add_arc(Arc::new("b", "a", 1.0, 0.0)).unwrap();
        network.add_arc(Arc::new("b", "c", 1.0, 1.0)).unwrap();
        let paths =
            all_shortest_paths(&network, &"a".into(), &"c".into(), |a| a.user_cost).unwrap();
        assert_eq!(
            paths,
            vec![vec![ArcKey::new("arc_a_b"), ArcKey::new("arc_b_c")]]
        );
    }

    #[test]
    fn test_graph_stats() {
        let stats = graph_stats(&diamond());
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.arc_count, 5);
        assert_eq!(stats.connected_components, 1);
        assert_eq!(stats.max_out_degree, 3);
        assert_eq!(stats.min_out_degree, 0);
        assert!((stats.density - 5.0 / 12.0).abs() < 1e-12);
    }
}
