//! `archlens export` — dump the graph as flat JSON.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use archlens_engine::graph::GraphExport;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::cmd::{FactsArg, Globals};
use crate::output::render;

/// Arguments for `archlens export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub facts: FactsArg,

    /// Write the export to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportSummary {
    path: String,
    content_hash: String,
    nodes: usize,
    edges: usize,
}

/// Execute `archlens export`.
///
/// Without `--output` the export itself is the command output and is always
/// JSON.
pub fn run_export(args: &ExportArgs, globals: &Globals) -> anyhow::Result<()> {
    let session = globals.open(&args.facts.facts)?;
    let export = GraphExport::from_graph(session.agent.graph());

    let Some(path) = &args.output else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, &export)?;
        writeln!(out)?;
        return Ok(());
    };

    let json = serde_json::to_string_pretty(&export)?;
    fs::write(path, json).with_context(|| format!("writing export to {}", path.display()))?;
    info!(path = %path.display(), nodes = export.nodes.len(), "exported graph");

    let summary = ExportSummary {
        path: path.display().to_string(),
        content_hash: export.content_hash,
        nodes: export.nodes.len(),
        edges: export.edges.len(),
    };
    render(globals.output, &summary, |s, w| {
        writeln!(
            w,
            "Exported {} nodes and {} edges to {}",
            s.nodes, s.edges, s.path
        )
    })
}
