//! `archlens report` — dependency quality: cycles, coupling, cohesion,
//! complexity and recommendations.

use std::io::{self, Write};

use archlens_engine::DependencyReport;
use clap::Args;

use crate::cmd::{FactsArg, Globals};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `archlens report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub facts: FactsArg,
}

/// Execute `archlens report`.
pub fn run_report(args: &ReportArgs, globals: &Globals) -> anyhow::Result<()> {
    let session = globals.open(&args.facts.facts)?;
    let report = session.agent.dependency_report();
    render_mode(globals.output, &report, render_report_text, render_report_pretty)
}

pub fn render_report_text(r: &DependencyReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "cycles={} severity={} cyclomatic={} max_depth={} avg_fanout={} max_fanout={}",
        r.cycles.total_cycles,
        r.cycles.severity.as_str(),
        r.complexity.cyclomatic_complexity,
        r.complexity.max_depth,
        r.complexity.avg_fanout,
        r.complexity.max_fanout,
    )?;
    for (module, c) in &r.coupling.modules {
        writeln!(
            w,
            "coupling  {module}  ca={} ce={} i={}",
            c.afferent, c.efferent, c.instability
        )?;
    }
    for (module, c) in &r.cohesion.modules {
        writeln!(
            w,
            "cohesion  {module}  {} ({} children, {} internal)",
            c.cohesion_score, c.component_count, c.internal_connections
        )?;
    }
    for rec in &r.recommendations {
        writeln!(w, "recommend  {}  {}  {}", rec.priority.as_str(), rec.category, rec.title)?;
    }
    Ok(())
}

pub fn render_report_pretty(r: &DependencyReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Dependency report")?;
    let truncated = if r.cycles.truncated { " (truncated)" } else { "" };
    pretty_kv(
        w,
        "Cycles",
        format!(
            "{} [{}]{truncated}",
            r.cycles.total_cycles,
            r.cycles.severity.as_str()
        ),
    )?;
    pretty_kv(w, "Cyclomatic", r.complexity.cyclomatic_complexity.to_string())?;
    pretty_kv(w, "Max depth", r.complexity.max_depth.to_string())?;
    pretty_kv(
        w,
        "Fan-out",
        format!(
            "avg {} / max {}",
            r.complexity.avg_fanout, r.complexity.max_fanout
        ),
    )?;
    pretty_kv(
        w,
        "Avg cohesion",
        format!(
            "{} over {} module(s)",
            r.cohesion.average_cohesion, r.cohesion.scored_modules
        ),
    )?;

    if !r.coupling.modules.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Coupling")?;
        writeln!(w, "  {:>4} {:>4} {:>6}  MODULE", "CA", "CE", "I")?;
        for (module, c) in &r.coupling.modules {
            writeln!(
                w,
                "  {:>4} {:>4} {:>6.2}  {module}",
                c.afferent, c.efferent, c.instability
            )?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "Recommendations")?;
    if r.recommendations.is_empty() {
        writeln!(w, "  No structural issues found.")?;
    }
    for rec in &r.recommendations {
        writeln!(w, "  [{}] {}", rec.priority.as_str(), rec.title)?;
        writeln!(w, "      {}", rec.description)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlens_core::config::QualityConfig;
    use archlens_core::model::{NodeAttrs, NodeKind, Relation};
    use archlens_engine::{CodeGraph, analyze_dependencies};

    fn cyclic_report() -> DependencyReport {
        let mut g = CodeGraph::new();
        for key in ["a", "b"] {
            g.add_node(key, NodeKind::Component, NodeAttrs::default());
        }
        g.add_edge("a", "b", Relation::Imports);
        g.add_edge("b", "a", Relation::Imports);
        analyze_dependencies(&g, &QualityConfig::default())
    }

    #[test]
    fn pretty_shows_cycle_recommendation() {
        let mut out = Vec::new();
        render_report_pretty(&cyclic_report(), &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Cycles:"));
        assert!(text.contains("[high] Break dependency cycles"));
    }

    #[test]
    fn text_has_summary_line() {
        let mut out = Vec::new();
        render_report_text(&cyclic_report(), &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("cycles=1 severity=low"));
        assert!(text.contains("recommend  high  architecture"));
    }
}
