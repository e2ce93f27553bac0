//! `archlens metrics` — centrality, hubs and communities.

use std::io::{self, Write};

use archlens_engine::MetricsSnapshot;
use archlens_engine::metrics::{AlgorithmReport, ScoredNode};
use clap::Args;

use crate::cmd::{FactsArg, Globals};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `archlens metrics`.
#[derive(Args, Debug)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub facts: FactsArg,
}

/// Execute `archlens metrics`.
pub fn run_metrics(args: &MetricsArgs, globals: &Globals) -> anyhow::Result<()> {
    let mut session = globals.open(&args.facts.facts)?;
    let snapshot = session.agent.metrics();
    render_mode(globals.output, &*snapshot, render_metrics_text, render_metrics_pretty)
}

pub fn render_metrics_text(m: &MetricsSnapshot, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "nodes={} edges={} communities={}",
        m.total_nodes, m.total_edges, m.num_communities
    )?;
    for n in &m.important_components {
        writeln!(w, "important  {:.6}  {}", n.score, n.node)?;
    }
    for n in &m.bottleneck_components {
        writeln!(w, "bottleneck  {:.6}  {}", n.score, n.node)?;
    }
    for h in &m.hub_components {
        writeln!(w, "hub  {}  {}", h.connections, h.node)?;
    }
    for c in &m.communities {
        writeln!(w, "community  {}  {}  {}", c.id, c.size, c.components.join(","))?;
    }
    Ok(())
}

pub fn render_metrics_pretty(m: &MetricsSnapshot, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Graph metrics")?;
    pretty_kv(w, "Nodes", m.total_nodes.to_string())?;
    pretty_kv(w, "Edges", m.total_edges.to_string())?;
    pretty_kv(w, "Communities", m.num_communities.to_string())?;
    render_algorithms(&m.algorithms, w)?;

    scored_section(w, "Most important", &m.important_components)?;
    scored_section(w, "Bottlenecks", &m.bottleneck_components)?;

    writeln!(w)?;
    pretty_section(w, "Hubs")?;
    for h in &m.hub_components {
        writeln!(w, "  {:>5}  {}", h.connections, h.node)?;
    }

    if !m.communities.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Communities")?;
        for c in &m.communities {
            writeln!(w, "  #{} ({} members)", c.id, c.size)?;
            for member in &c.components {
                writeln!(w, "      {member}")?;
            }
        }
    }
    Ok(())
}

fn render_algorithms(a: &AlgorithmReport, w: &mut dyn Write) -> io::Result<()> {
    let importance = match &a.importance.fallback_reason {
        Some(reason) => format!("{:?} (fallback: {reason})", a.importance.method),
        None => format!("{:?} ({} iterations)", a.importance.method, a.importance.iterations),
    };
    pretty_kv(w, "Importance", importance)?;

    let communities = match &a.communities.fallback_reason {
        Some(reason) => format!("{:?} (fallback: {reason})", a.communities.method),
        None => format!(
            "{:?} (modularity {:.3})",
            a.communities.method, a.communities.modularity
        ),
    };
    pretty_kv(w, "Communities by", communities)
}

fn scored_section(w: &mut dyn Write, heading: &str, nodes: &[ScoredNode]) -> io::Result<()> {
    writeln!(w)?;
    pretty_section(w, heading)?;
    for n in nodes {
        writeln!(w, "  {:>10.6}  {}", n.score, n.node)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlens_core::config::{CommunityConfig, MetricsConfig};
    use archlens_core::model::{NodeAttrs, NodeKind, Relation};
    use archlens_engine::{CodeGraph, compute_metrics};

    fn snapshot() -> MetricsSnapshot {
        let mut g = CodeGraph::new();
        for key in ["a", "b", "c"] {
            g.add_node(key, NodeKind::Component, NodeAttrs::default());
        }
        g.add_edge("a", "b", Relation::Imports);
        g.add_edge("b", "c", Relation::Imports);
        compute_metrics(&g, &MetricsConfig::default(), &CommunityConfig::default())
    }

    #[test]
    fn text_lists_every_category() {
        let mut out = Vec::new();
        render_metrics_text(&snapshot(), &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("nodes=3 edges=2"));
        assert!(text.contains("important  "));
        assert!(text.contains("bottleneck  "));
        assert!(text.contains("hub  2  b"));
    }

    #[test]
    fn pretty_names_algorithms() {
        let mut out = Vec::new();
        render_metrics_pretty(&snapshot(), &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Graph metrics"));
        assert!(text.contains("Pagerank"));
        assert!(text.contains("Bottlenecks"));
    }
}
