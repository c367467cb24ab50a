//! JSON persistence of models and solutions, and report loading.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

use bcn_core::{BcnError, BcnResult, Model, ModelFile, Solution};
use bcn_solver_common::{scan_solver_log, ReportFormat, SolverId, SolverRun};
use tracing::{debug, info};

use crate::report::{decode_report, detect_format};

/// Read and validate a JSON model file.
pub fn read_model(path: &Path) -> BcnResult<Model> {
    let file = File::open(path)?;
    let model_file: ModelFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| BcnError::Parse(format!("{}: {}", path.display(), e)))?;
    let model = Model::from_file(model_file)?;
    debug!(
        path = %path.display(),
        nodes = model.network().node_count(),
        arcs = model.network().arc_count(),
        odpairs = model.odpairs().len(),
        "loaded model"
    );
    Ok(model)
}

pub fn write_model_json(model: &Model, path: &Path) -> BcnResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, &model.to_file())?;
    out.flush()?;
    Ok(())
}

pub fn read_solution(path: &Path) -> BcnResult<Solution> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| BcnError::Parse(format!("{}: {}", path.display(), e)))
}

pub fn write_solution(solution: &Solution, path: &Path) -> BcnResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, solution)?;
    out.flush()?;
    Ok(())
}

/// How to interpret a solver report file.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Forced format; detected from the file when `None`.
    pub format: Option<ReportFormat>,
    /// Solver that produced the file; enables log scanning.
    pub solver: Option<SolverId>,
    /// Time limit the solver ran with, in seconds.
    pub timeout: Option<u64>,
    /// Name of the solver model variant.
    pub model_name: Option<String>,
    /// Measured run time.
    pub run_time_seconds: Option<f64>,
}

/// Decode a solver report and attach what its log says about the run.
///
/// The same file is scanned for the solver's timeout phrase and gap, since
/// segmented reports are printed after the solver's own console output.
pub fn read_report(model: &Model, path: &Path, options: &ReportOptions) -> BcnResult<Solution> {
    let content = fs::read_to_string(path)?;
    let format = options
        .format
        .unwrap_or_else(|| detect_format(path, &content, options.solver));

    let data = decode_report(model, Cursor::new(content.as_bytes()), format)?;
    let scan = scan_solver_log(Cursor::new(content.as_bytes()), options.solver)?;

    let mut run = SolverRun::new(options.solver)
        .with_timeout(options.timeout)
        .with_log_scan(scan);
    run.model_name = options.model_name.clone();
    if let Some(seconds) = options.run_time_seconds {
        run = run.with_run_time(seconds);
    }

    info!(
        path = %path.display(),
        format = ?format,
        shortest_paths = data.shortest_paths.len(),
        infrastructures = data.infrastructures.len(),
        did_timeout = ?run.did_timeout,
        "decoded solver report"
    );
    Ok(Solution::new(data).with_run(run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcn_core::{Arc, Breakpoint, CostAttribute, Node, OdPair};
    use tempfile::tempdir;

    fn model() -> Model {
        Model::from_file(ModelFile {
            nodes: vec![Node::new("1"), Node::new("2")],
            arcs: vec![Arc::new("1", "2", 5.0, 3.0)],
            odpairs: vec![OdPair::new("1", "2", 10.0)],
            breakpoints: vec![Breakpoint::new(0.0, 1.0), Breakpoint::new(1.0, 0.5)],
            budget: 10.0,
            infrastructure_count: 2,
            user_cost_weight: CostAttribute::UserCost,
        })
        .unwrap()
    }

    #[test]
    fn test_model_json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        write_model_json(&model(), &path).unwrap();
        let back = read_model(&path).unwrap();
        assert_eq!(back.budget(), 10.0);
        assert_eq!(back.network().arc_count(), 1);
    }

    #[test]
    fn test_read_report_scans_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stdout.cbc");
        fs::write(
            &path,
            "Result - Stopped on time limit\nGap: 0.25\n\
---shortest_paths\norigin,destination,shortest_path_cost\n1,2,3\n\
---infrastructures\narc,infrastructure,construction_cost\n\
---demand_transfered\norigin,destination,demand_transfered,z,j_value\n\
---total_demand_transfered\ntotal_demand_transfered\n0\n\
---budget_used\nbudget_used\n0\n---\n",
        )
        .unwrap();
        let options = ReportOptions {
            solver: Some(SolverId::Cbc),
            timeout: Some(60),
            ..ReportOptions::default()
        };
        let solution = read_report(&model(), &path, &options).unwrap();
        assert_eq!(solution.run.did_timeout, Some(true));
        assert_eq!(solution.run.gap, Some(0.25));
        assert_eq!(solution.run.timeout, Some(60));
        assert_eq!(solution.data.shortest_paths.len(), 1);

        let json = dir.path().join("solution.json");
        write_solution(&solution, &json).unwrap();
        assert_eq!(read_solution(&json).unwrap(), solution);
    }

    #[test]
    fn test_invalid_model_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "{\"nodes\": []}").unwrap();
        assert!(matches!(read_model(&path), Err(BcnError::Parse(_))));
    }
}
