//! `archlens analyze` — build, measure and assess a codebase in one pass.

use std::io::{self, Write};
use std::sync::Arc;

use archlens_engine::graph::GraphStats;
use archlens_engine::{DependencyReport, MetricsSnapshot};
use clap::Args;
use serde::Serialize;

use crate::cmd::metrics::{render_metrics_pretty, render_metrics_text};
use crate::cmd::report::{render_report_pretty, render_report_text};
use crate::cmd::{FactsArg, Globals};
use crate::load::LoadReport;
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `archlens analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub facts: FactsArg,
}

#[derive(Debug, Serialize)]
struct AnalysisOutput {
    load: LoadReport,
    stats: GraphStats,
    metrics: MetricsSnapshot,
    dependency_report: DependencyReport,
}

/// Execute `archlens analyze`.
pub fn run_analyze(args: &AnalyzeArgs, globals: &Globals) -> anyhow::Result<()> {
    let mut session = globals.open(&args.facts.facts)?;
    let payload = AnalysisOutput {
        stats: GraphStats::from_graph(session.agent.graph()),
        metrics: Arc::unwrap_or_clone(session.agent.metrics()),
        dependency_report: session.agent.dependency_report(),
        load: session.load,
    };

    render_mode(
        globals.output,
        &payload,
        |p, w| {
            render_load(p, w)?;
            render_metrics_text(&p.metrics, w)?;
            render_report_text(&p.dependency_report, w)
        },
        |p, w| {
            render_load(p, w)?;
            writeln!(w)?;
            render_metrics_pretty(&p.metrics, w)?;
            writeln!(w)?;
            render_report_pretty(&p.dependency_report, w)
        },
    )
}

fn render_load(p: &AnalysisOutput, w: &mut dyn Write) -> io::Result<()> {
    let b = &p.load.build;
    pretty_section(w, "Graph build")?;
    pretty_kv(w, "Facts", &p.load.facts_hash)?;
    pretty_kv(w, "Nodes", b.nodes.to_string())?;
    pretty_kv(
        w,
        "Edges",
        format!(
            "{} contains, {} imports",
            b.containment_edges, b.import_edges
        ),
    )?;
    if b.dropped_relations > 0 || b.skipped_entries > 0 {
        pretty_kv(
            w,
            "Dropped",
            format!(
                "{} relation(s), {} entry(ies) without path",
                b.dropped_relations, b.skipped_entries
            ),
        )?;
    }
    if let Some(e) = &p.load.enrich {
        pretty_kv(
            w,
            "Enriched",
            format!(
                "{} file(s): {} classes, {} functions, {} calls, {} inherits, {} unmatched",
                e.files,
                e.classes,
                e.functions,
                e.call_edges,
                e.inherits_edges,
                e.unmatched_files
            ),
        )?;
    }
    let types: Vec<String> = p
        .stats
        .node_types
        .iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect();
    pretty_kv(w, "Node types", types.join(" "))?;
    pretty_kv(w, "Max layer depth", p.stats.max_layer_depth.to_string())?;
    if !p.stats.hotspots.is_empty() {
        pretty_kv(w, "Hotspots", p.stats.hotspots.join(", "))?;
    }
    Ok(())
}
