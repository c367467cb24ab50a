use std::path::Path;

use anyhow::{Context, Result};
use bcn_algo::{validate_solution, ValidationConfig};

use bcn_cli::cli::ReportArgs;
use crate::commands::decode;

/// Returns whether the solution passed every check.
pub fn handle(args: &ReportArgs, config: Option<&Path>) -> Result<bool> {
    let config = match config {
        Some(path) => ValidationConfig::from_path(path)
            .with_context(|| format!("loading validation config {}", path.display()))?,
        None => ValidationConfig::default(),
    };
    let (model, solution) = decode::load(args)?;

    let findings = validate_solution(&model, &solution, &config)
        .context("validating solution")?;
    print!("{}", findings);
    Ok(findings.is_empty())
}
