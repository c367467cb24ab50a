use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bcn_core::graph_stats;
use bcn_io::{read_model, write_model};
use tracing::info;

pub fn handle(model_path: &Path, out: &Path) -> Result<()> {
    let model = read_model(model_path)
        .with_context(|| format!("loading model {}", model_path.display()))?;

    let stats = graph_stats(model.network());
    info!(
        nodes = stats.node_count,
        arcs = stats.arc_count,
        components = stats.connected_components,
        density = stats.density,
        "network statistics"
    );

    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    write_model(&model, &mut writer)
        .with_context(|| format!("writing MathProg data to {}", out.display()))?;
    writer.flush()?;

    println!(
        "Exported {} arcs and {} OD pairs to {}",
        stats.arc_count,
        model.odpairs().len(),
        out.display()
    );
    Ok(())
}
