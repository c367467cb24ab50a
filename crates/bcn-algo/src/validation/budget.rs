use std::collections::BTreeSet;

use bcn_core::costs::upgrade_delta;
use bcn_core::{all_shortest_paths, od_id, BcnResult, ErrorTree, Model, Solution};
use tracing::debug;

use super::{EffectiveNetwork, ValidationConfig};

/// Unspent budget must not be enough to raise any arc on a shortest path by
/// one level.
pub fn check_budget_excess(
    model: &Model,
    solution: &Solution,
    effective: &EffectiveNetwork<'_>,
    config: &ValidationConfig,
) -> BcnResult<ErrorTree> {
    let mut findings = ErrorTree::leaf();
    let excess = model.budget() - solution.data.budget_used;
    if excess < config.budget_tolerance {
        return Ok(findings);
    }
    debug!(excess, "checking unspent budget");

    let network = model.network();
    let top_level = model.infrastructure_count() - 1;
    for (i, od) in model.odpairs().iter().enumerate() {
        let paths = all_shortest_paths(network, &od.origin, &od.destination, |a| {
            effective.weight(a)
        })?;
        let on_paths: BTreeSet<_> = paths.into_iter().flatten().collect();

        for key in on_paths {
            let Some(arc) = network.arc(&key) else {
                continue;
            };
            let level = effective.level(&key);
            if level >= top_level {
                continue;
            }
            let delta = upgrade_delta(arc, level);
            if delta <= excess {
                findings.push_message(format!(
                    "{} on a shortest path of {} ({} -> {}) can go from level {} to {} for {}, \
                     with {} unspent",
                    key,
                    od_id(i),
                    od.origin,
                    od.destination,
                    level,
                    level + 1,
                    delta,
                    excess
                ));
            }
        }
    }
    Ok(findings)
}
