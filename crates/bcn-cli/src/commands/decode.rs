use std::path::Path;

use anyhow::{Context, Result};
use bcn_core::{Model, Solution};
use bcn_io::persistence::write_solution;
use bcn_io::{read_model, read_report, ReportOptions};

use bcn_cli::cli::ReportArgs;

/// Load the model and decode the report it belongs to.
pub fn load(args: &ReportArgs) -> Result<(Model, Solution)> {
    let model = read_model(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;
    let options = ReportOptions {
        format: args.format.map(Into::into),
        solver: args.solver,
        timeout: args.timeout,
        ..ReportOptions::default()
    };
    let solution = read_report(&model, &args.report, &options)
        .with_context(|| format!("decoding report {}", args.report.display()))?;
    Ok((model, solution))
}

pub fn handle(args: &ReportArgs, out: &Path) -> Result<()> {
    let (_, solution) = load(args)?;
    write_solution(&solution, out)
        .with_context(|| format!("writing solution to {}", out.display()))?;
    print!("{}", solution.summary());
    Ok(())
}
