//! XML variable dumps.
//!
//! Solvers without a display step (CPLEX) write their incumbent as one
//! `<variable name="NAME(i,j)" index=".." value=".."/>` element per non-zero
//! variable. Only the decision variables of the solver model are kept; the
//! normalized sections are then rebuilt from them and the [`Model`].

use std::io::BufRead;

use bcn_core::costs::construction_cost;
use bcn_core::{
    BcnError, BcnResult, DemandTransferRecord, FlowRecord, InfrastructureRecord, Model,
    ShortestPathRecord, SolutionData,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};

use crate::sparse::{solver_float, solver_int, Indexes, SparseVariable, Variable};

/// One `<variable>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlVariable {
    /// Variable name without its subscript (`w` for `w(od_0)`).
    pub name: String,
    /// Subscript components, empty for scalars.
    pub index: Vec<String>,
    /// Raw value text.
    pub value: String,
}

/// Parse a single line; lines without a `<variable>` element yield `None`.
pub fn parse_variable_line(line: &str) -> BcnResult<Option<XmlVariable>> {
    if !line.contains("variable") {
        return Ok(None);
    }

    let mut reader = Reader::from_str(line);
    // A line is parsed on its own, so closing tags of enclosing elements are unmatched.
    reader.check_end_names(false);
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"variable" =>
            {
                let Some(full_name) = attribute_value(e, "name")? else {
                    return Ok(None);
                };
                let Some(value) = attribute_value(e, "value")? else {
                    return Ok(None);
                };
                let (name, index) = split_subscript(&full_name);
                return Ok(Some(XmlVariable { name, index, value }));
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => continue,
            Err(e) => {
                return Err(BcnError::Parse(format!(
                    "malformed variable line '{}': {}",
                    line.trim(),
                    e
                )))
            }
        }
    }
}

fn attribute_value(event: &BytesStart, key: &str) -> BcnResult<Option<String>> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr.map_err(|e| BcnError::Parse(e.to_string()))?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| BcnError::Parse(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// `h(arc_1_2,od_0,1)` into (`h`, [`arc_1_2`, `od_0`, `1`]).
fn split_subscript(full: &str) -> (String, Vec<String>) {
    match full.split_once('(') {
        None => (full.to_string(), Vec::new()),
        Some((name, rest)) => {
            let inner = rest.trim_end_matches(')');
            let index = if inner.is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(|s| s.trim().to_string()).collect()
            };
            (name.to_string(), index)
        }
    }
}

/// Feed every variable line of `reader` into the matching entry of `variables`.
///
/// Returns how many values were stored. Names not in `variables` are skipped.
pub fn populate_variables<R: BufRead>(
    reader: R,
    variables: &mut [&mut dyn SparseVariable],
    indexes: &mut Indexes,
) -> BcnResult<usize> {
    let mut stored = 0;
    for line in reader.lines() {
        let line = line?;
        let Some(var) = parse_variable_line(&line)? else {
            continue;
        };
        match variables.iter_mut().find(|v| v.name() == var.name) {
            Some(target) => {
                let parts: Vec<&str> = var.index.iter().map(String::as_str).collect();
                target.set_raw(&parts, &var.value, indexes)?;
                stored += 1;
            }
            None => trace!(variable = %var.name, "skipping auxiliary variable"),
        }
    }
    Ok(stored)
}

/// Decode an XML dump into normalized sections, resolving ids against `model`.
pub fn decode_xml<R: BufRead>(model: &Model, reader: R) -> BcnResult<SolutionData> {
    let mut indexes = Indexes::new();
    let mut w: Variable<String, f64> = Variable::new("w", &["OD"], solver_float);
    let mut y: Variable<(String, String), i64> = Variable::new("y", &["A", "I"], solver_int);
    let mut x: Variable<(String, String), f64> = Variable::new("x", &["A", "OD"], solver_float);
    let mut z: Variable<(String, String), i64> = Variable::new("z", &["OD", "J"], solver_int);
    let mut h: Variable<(String, String, String), f64> =
        Variable::new("h", &["A", "OD", "I"], solver_float);
    let mut total: Variable<(), f64> = Variable::new("demand_transfered", &[], solver_float);

    let mut variables: [&mut dyn SparseVariable; 6] =
        [&mut w, &mut y, &mut x, &mut z, &mut h, &mut total];
    let stored = populate_variables(reader, &mut variables, &mut indexes)?;

    let network = model.network();
    let breakpoints = model.breakpoints();

    let mut ods = indexes
        .members("OD")
        .into_iter()
        .map(|id| {
            model
                .od_index(id)
                .map(|i| (id.to_string(), i))
                .ok_or_else(|| BcnError::Parse(format!("unknown OD pair '{}'", id)))
        })
        .collect::<BcnResult<Vec<_>>>()?;
    ods.sort_by_key(|(_, i)| *i);

    let arcs = indexes
        .members("A")
        .into_iter()
        .map(|key| {
            network
                .arc(&key.into())
                .ok_or_else(|| BcnError::Parse(format!("unknown arc '{}'", key)))
        })
        .collect::<BcnResult<Vec<_>>>()?;

    let levels = numeric_members(&indexes, "I", model.infrastructure_count(), "infrastructure")?;
    let js = numeric_members(&indexes, "J", breakpoints.len(), "breakpoint")?;

    let mut data = SolutionData::default();

    for (id, i) in &ods {
        let od = &model.odpairs()[*i];
        data.shortest_paths.push(ShortestPathRecord {
            origin: od.origin.clone(),
            destination: od.destination.clone(),
            shortest_path_cost: w.get(id),
        });

        for arc in &arcs {
            for (level_id, level) in &levels {
                let flow = h.get(&(arc.key.to_string(), id.clone(), level_id.clone()));
                if flow > 0.0 {
                    data.flows.push(FlowRecord {
                        origin: od.origin.clone(),
                        destination: od.destination.clone(),
                        arc: arc.key.clone(),
                        infrastructure: *level,
                        flow,
                    });
                }
            }
        }

        for (j_id, j) in &js {
            let selected = z.get(&(id.clone(), j_id.clone()));
            if selected > 0 {
                data.demand_transfered.push(DemandTransferRecord {
                    origin: od.origin.clone(),
                    destination: od.destination.clone(),
                    demand_transfered: od.demand * breakpoints[*j].transfer_fraction,
                    j_value: *j,
                    z: selected as f64,
                });
            }
        }
    }

    for arc in &arcs {
        for (level_id, level) in &levels {
            let built = y.get(&(arc.key.to_string(), level_id.clone()));
            let cost = construction_cost(arc, *level);
            data.budget_used += cost * built as f64;
            if built > 0 && level_id != "0" {
                data.infrastructures.push(InfrastructureRecord {
                    arc: arc.key.clone(),
                    infrastructure: *level,
                    construction_cost: cost,
                });
            }
        }
    }
    data.total_demand_transfered = total.scalar();

    debug!(
        values = stored,
        odpairs = ods.len(),
        arcs = arcs.len(),
        "decoded XML variable dump"
    );
    Ok(data)
}

/// Members of a numeric index, sorted, each checked against `bound`.
fn numeric_members(
    indexes: &Indexes,
    index: &str,
    bound: usize,
    what: &str,
) -> BcnResult<Vec<(String, usize)>> {
    let mut members = indexes
        .members(index)
        .into_iter()
        .map(|raw| {
            raw.parse::<usize>()
                .ok()
                .filter(|v| *v < bound)
                .map(|v| (raw.to_string(), v))
                .ok_or_else(|| BcnError::Parse(format!("unknown {} '{}'", what, raw)))
        })
        .collect::<BcnResult<Vec<_>>>()?;
    members.sort_by_key(|(_, v)| *v);
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variable_line() {
        let var = parse_variable_line(
            r#"  <variable name="h(arc_1_2,od_0,1)" index="12" value="30"/>"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(var.name, "h");
        assert_eq!(var.index, vec!["arc_1_2", "od_0", "1"]);
        assert_eq!(var.value, "30");

        let scalar = parse_variable_line(
            r#"<variable name="demand_transfered" index="0" value="15.5"/>"#,
        )
        .unwrap()
        .unwrap();
        assert!(scalar.index.is_empty());
    }

    #[test]
    fn test_lines_without_variables_are_skipped() {
        assert_eq!(parse_variable_line("<header objectiveValue=\"3\"/>").unwrap(), None);
        assert_eq!(parse_variable_line(" <variables>").unwrap(), None);
        assert_eq!(parse_variable_line(" </variables>").unwrap(), None);
        assert_eq!(
            parse_variable_line(r#"<variable index="1" value="2"/>"#).unwrap(),
            None
        );
    }

    #[test]
    fn test_populate_skips_unknown_names() {
        let text = r#"<variables>
  <variable name="w(od_0)" index="0" value="8.8"/>
  <variable name="aux(od_0)" index="1" value="1"/>
 </variables>
</CPLEXSolution>"#;
        let mut indexes = Indexes::new();
        let mut w: Variable<String, f64> = Variable::new("w", &["OD"], solver_float);
        let mut variables: [&mut dyn SparseVariable; 1] = [&mut w];
        let stored = populate_variables(text.as_bytes(), &mut variables, &mut indexes).unwrap();
        assert_eq!(stored, 1);
        assert_eq!(w.get(&"od_0".to_string()), 8.8);
        assert_eq!(indexes.members("OD"), vec!["od_0"]);
    }
}
