use bcn_core::{od_id, BcnResult, ErrorTree, Model, Solution};

use super::ValidationConfig;

/// Reported path costs must not exceed the base network's.
pub fn check_shortest_paths(
    model: &Model,
    solution: &Solution,
    _config: &ValidationConfig,
) -> BcnResult<ErrorTree> {
    let mut findings = ErrorTree::leaf();
    for (i, od) in model.odpairs().iter().enumerate() {
        let base = model.base_shortest_path_cost(i)?;
        let Some(record) = solution.data.shortest_path(&od.origin, &od.destination) else {
            findings.push_message(format!(
                "{} ({} -> {}) has no reported shortest path",
                od_id(i),
                od.origin,
                od.destination
            ));
            continue;
        };
        if record.shortest_path_cost > base {
            findings.push_message(format!(
                "{} ({} -> {}) costs {} but only {} on the base network",
                od_id(i),
                od.origin,
                od.destination,
                record.shortest_path_cost,
                base
            ));
        }
    }
    Ok(findings)
}
