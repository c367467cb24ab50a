//! MathProg data writer.

use std::fmt::Display;
use std::io::Write;

use bcn_core::costs::{construction_cost, user_cost};
use bcn_core::model::od_id;
use bcn_core::{BcnResult, Model};
use tracing::debug;

const SEP: &str = "  ";

/// Denominator guard of the `inf` heuristic.
pub const INF_EPSILON: f64 = 1e-6;

/// Low-level emitter for MathProg `data;` sections.
pub struct MathProgWriter<W: Write> {
    out: W,
}

impl<W: Write> MathProgWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn data(&mut self) -> BcnResult<()> {
        writeln!(self.out, "data;")?;
        Ok(())
    }

    pub fn end(&mut self) -> BcnResult<()> {
        writeln!(self.out, "end;")?;
        Ok(())
    }

    pub fn br(&mut self) -> BcnResult<()> {
        writeln!(self.out)?;
        Ok(())
    }

    pub fn comment(&mut self, text: &str) -> BcnResult<()> {
        writeln!(self.out, "/* {} */", text)?;
        Ok(())
    }

    /// `set NAME := v1 v2 ...;`, terminated even when empty.
    pub fn set<I, T>(&mut self, name: &str, values: I) -> BcnResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        writeln!(self.out, "set {} :=", name)?;
        for value in values {
            write!(self.out, "{}{}", SEP, value)?;
        }
        writeln!(self.out, ";")?;
        Ok(())
    }

    pub fn scalar(&mut self, name: &str, value: impl Display) -> BcnResult<()> {
        writeln!(self.out, "param {} := {};", name, value)?;
        Ok(())
    }

    /// One `key value` pair per line.
    pub fn list<K, V>(&mut self, name: &str, entries: &[(K, V)]) -> BcnResult<()>
    where
        K: Display,
        V: Display,
    {
        write!(self.out, "param {} :=", name)?;
        for (key, value) in entries {
            write!(self.out, "\n{}{}{}{}", SEP, key, SEP, value)?;
        }
        writeln!(self.out, ";")?;
        Ok(())
    }

    /// One `[row, *] col value col value ...` slice per row; `value` gets positions.
    pub fn matrix<R, C, V>(
        &mut self,
        name: &str,
        rows: &[R],
        columns: &[C],
        mut value: impl FnMut(usize, usize) -> V,
    ) -> BcnResult<()>
    where
        R: Display,
        C: Display,
        V: Display,
    {
        writeln!(self.out, "param {} :=", name)?;
        for (r, row) in rows.iter().enumerate() {
            write!(self.out, "{}[{}, *]", SEP, row)?;
            for (c, column) in columns.iter().enumerate() {
                write!(self.out, "{}{}{}{}", SEP, column, SEP, value(r, c))?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out, ";")?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Serialize `model` as the MathProg data file consumed by the solver model.
pub fn write_model<W: Write>(model: &Model, out: W) -> BcnResult<()> {
    let network = model.network();
    let base_costs = model.base_shortest_path_costs()?;
    let levels: Vec<usize> = (0..model.infrastructure_count()).collect();
    let arcs: Vec<_> = network.arcs().collect();
    let arc_keys: Vec<&str> = arcs.iter().map(|a| a.key.as_str()).collect();
    let ods: Vec<String> = (0..model.odpairs().len()).map(od_id).collect();
    let js: Vec<usize> = (0..model.breakpoints().len()).collect();

    let mut w = MathProgWriter::new(out);
    w.data()?;
    w.br()?;

    w.comment("Set of nodes")?;
    w.set("N", network.nodes().map(|n| n.id.as_str()))?;
    w.br()?;

    w.comment("Set of arcs")?;
    w.set("A", arc_keys.iter())?;
    w.br()?;

    w.comment("Graph adjacency")?;
    for node in network.nodes() {
        w.set(
            &format!("A_OUT[{}]", node.id),
            network.outbound(&node.id).iter().map(|a| a.key.as_str()),
        )?;
        w.set(
            &format!("A_IN[{}]", node.id),
            network.inbound(&node.id).iter().map(|a| a.key.as_str()),
        )?;
    }
    w.br()?;

    w.comment("Set of infrastructures")?;
    w.set("I", levels.iter())?;
    w.br()?;

    w.comment("User cost")?;
    w.matrix("C", &arc_keys, &levels, |a, level| user_cost(arcs[a], level))?;
    w.br()?;

    w.comment("Construction cost")?;
    w.matrix("M", &arc_keys, &levels, |a, level| {
        construction_cost(arcs[a], level)
    })?;
    w.br()?;

    w.comment("Origin-destination pairs")?;
    w.set("OD", ods.iter())?;
    let origins: Vec<(&String, &str)> = ods
        .iter()
        .zip(model.odpairs())
        .map(|(id, od)| (id, od.origin.as_str()))
        .collect();
    let destinations: Vec<(&String, &str)> = ods
        .iter()
        .zip(model.odpairs())
        .map(|(id, od)| (id, od.destination.as_str()))
        .collect();
    w.list("ORIGIN", &origins)?;
    w.list("DESTINATION", &destinations)?;
    w.br()?;

    w.comment("Breakpoints")?;
    w.set("J", js.iter())?;
    w.br()?;

    let p = transfer_matrix(model);
    w.comment("Demand transfered at each breakpoint")?;
    w.matrix("P", &ods, &js, |od, j| p[od][j])?;
    w.br()?;

    w.comment("Shortest path cost needed to reach each breakpoint")?;
    let breakpoints = model.breakpoints();
    w.matrix("Q", &ods, &js, |od, j| {
        breakpoints[j].cost_improvement_fraction * base_costs[od]
    })?;
    w.br()?;

    w.comment("Budget")?;
    w.scalar("B", model.budget())?;
    w.br()?;

    w.comment("Minimum marginal transfer per unit of cost")?;
    w.scalar("inf", inf_parameter(&p, base_costs))?;

    w.end()?;
    debug!(
        nodes = network.node_count(),
        arcs = arcs.len(),
        odpairs = ods.len(),
        breakpoints = js.len(),
        "wrote MathProg data"
    );
    Ok(())
}

/// `P[od][j] = demand * transfer_fraction[j]`.
pub fn transfer_matrix(model: &Model) -> Vec<Vec<f64>> {
    model
        .odpairs()
        .iter()
        .map(|od| {
            model
                .breakpoints()
                .iter()
                .map(|b| od.demand * b.transfer_fraction)
                .collect()
        })
        .collect()
}

/// `min(1, min over OD of (smallest consecutive gap of P[od]) / (base_cost + eps))`.
///
/// OD pairs with a single breakpoint have no gap and do not constrain the value.
pub fn inf_parameter(p: &[Vec<f64>], base_costs: &[f64]) -> f64 {
    p.iter()
        .zip(base_costs)
        .filter_map(|(row, base)| {
            let gap = row
                .windows(2)
                .map(|w| (w[1] - w[0]).abs())
                .min_by(f64::total_cmp)?;
            Some(gap / (base + INF_EPSILON))
        })
        .fold(1.0, f64::min)
}
