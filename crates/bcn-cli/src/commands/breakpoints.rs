use anyhow::{Context, Result};
use bcn_algo::{build_breakpoints, default_m, TransferFunction};

pub fn handle(
    function: TransferFunction,
    count: usize,
    m: Option<f64>,
    infrastructures: Option<usize>,
) -> Result<()> {
    let m = match (m, infrastructures) {
        (Some(m), _) => m,
        (None, Some(levels)) => default_m(levels)?,
        (None, None) => anyhow::bail!("either --m or --infrastructures is required"),
    };
    let breakpoints = build_breakpoints(|p| function.evaluate(p, m), count, m)
        .with_context(|| format!("building {} breakpoints for {}", count, function))?;
    println!("{}", serde_json::to_string_pretty(&breakpoints)?);
    Ok(())
}
