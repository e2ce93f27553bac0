//! `archlens tool <name>` — one agent tool per subcommand.

use std::io::{self, Write};

use archlens_engine::agent::{
    Agent, CallersAnswer, CommunityOverview, CriticalNodes, DEFAULT_CRITICAL_NODES,
    DEFAULT_IMPACT_DEPTH, DependencyAnswer, GraphSummary, ImpactAnswer, PathAnswer,
    StructureAnswer, ToolSpec,
};
use archlens_engine::query::{NodeInfo, PatternAnalysis};
use clap::{Args, Subcommand};

use crate::cmd::{FactsArg, Globals};
use crate::output::{pretty_kv, pretty_list, pretty_section, render};

/// Arguments for `archlens tool`.
#[derive(Args, Debug)]
pub struct ToolArgs {
    #[command(subcommand)]
    pub tool: ToolCommand,
}

#[derive(Subcommand, Debug)]
pub enum ToolCommand {
    /// What a node depends on, flagging bottleneck dependencies.
    #[command(alias = "dependencies")]
    Deps {
        #[command(flatten)]
        facts: FactsArg,
        node: String,
    },
    /// Who uses a node, with an impact grade.
    Callers {
        #[command(flatten)]
        facts: FactsArg,
        node: String,
    },
    /// Classes, functions, components and internal edges of a module.
    Structure {
        #[command(flatten)]
        facts: FactsArg,
        /// Module name; omit for a project overview.
        module: Option<String>,
    },
    /// Design-pattern heuristics for a node.
    Patterns {
        #[command(flatten)]
        facts: FactsArg,
        node: String,
    },
    /// Shortest dependency path between two nodes.
    Path {
        #[command(flatten)]
        facts: FactsArg,
        source: String,
        target: String,
    },
    /// Attributes and neighbours of one node.
    Info {
        #[command(flatten)]
        facts: FactsArg,
        node: String,
    },
    /// Nodes affected by changing a node, by caller depth.
    Impact {
        #[command(flatten)]
        facts: FactsArg,
        node: String,
        /// Predecessor levels to explore.
        #[arg(long, default_value_t = DEFAULT_IMPACT_DEPTH)]
        depth: usize,
    },
    /// Most important nodes and bottlenecks.
    Critical {
        #[command(flatten)]
        facts: FactsArg,
        #[arg(long, default_value_t = DEFAULT_CRITICAL_NODES)]
        top: usize,
    },
    /// Communities with more than one member.
    Communities {
        #[command(flatten)]
        facts: FactsArg,
    },
    /// Key figures of the whole graph.
    Summary {
        #[command(flatten)]
        facts: FactsArg,
    },
    /// Catalog of available tools.
    List,
}

/// Execute `archlens tool <name>`.
pub fn run_tool(args: &ToolArgs, globals: &Globals) -> anyhow::Result<()> {
    let output = globals.output;
    let open = |facts: &FactsArg| -> anyhow::Result<Agent> {
        Ok(globals.open(&facts.facts)?.agent)
    };

    match &args.tool {
        ToolCommand::Deps { facts, node } => {
            let answer = open(facts)?.get_dependencies(node);
            render(output, &answer, render_dependencies)
        }
        ToolCommand::Callers { facts, node } => {
            let answer = open(facts)?.find_callers(node);
            render(output, &answer, render_callers)
        }
        ToolCommand::Structure { facts, module } => {
            let answer = open(facts)?.module_structure(module.as_deref());
            render(output, &answer, render_structure)
        }
        ToolCommand::Patterns { facts, node } => {
            let answer = open(facts)?.design_patterns(node);
            render(output, &answer, render_patterns)
        }
        ToolCommand::Path {
            facts,
            source,
            target,
        } => {
            let answer = open(facts)?.find_path(source, target);
            render(output, &answer, render_path)
        }
        ToolCommand::Info { facts, node } => {
            let answer = open(facts)?.node_info(node);
            render(output, &answer, render_info)
        }
        ToolCommand::Impact { facts, node, depth } => {
            let answer = open(facts)?.explore_impact(node, *depth);
            render(output, &answer, render_impact)
        }
        ToolCommand::Critical { facts, top } => {
            let answer = open(facts)?.critical_nodes(*top);
            render(output, &answer, render_critical)
        }
        ToolCommand::Communities { facts } => {
            let answer = open(facts)?.communities();
            render(output, &answer, render_communities)
        }
        ToolCommand::Summary { facts } => {
            let answer = open(facts)?.summarize();
            render(output, &answer, render_summary)
        }
        ToolCommand::List => render(output, &Agent::available_tools(), |tools, w| {
            render_catalog(tools, w)
        }),
    }
}

// ---------------------------------------------------------------------------
// Human renderers, shared with `archlens query`
// ---------------------------------------------------------------------------

fn resolution_line(
    w: &mut dyn Write,
    resolved: Option<&String>,
    candidates: usize,
    ambiguous: bool,
) -> io::Result<()> {
    match resolved {
        Some(key) if ambiguous => {
            pretty_kv(w, "Resolved", format!("{key} (1 of {candidates} matches)"))
        }
        Some(key) => pretty_kv(w, "Resolved", key),
        None => pretty_kv(w, "Resolved", "(no match)"),
    }
}

pub fn render_dependencies(a: &DependencyAnswer, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", a.description)?;
    resolution_line(w, a.resolved.as_ref(), a.candidates, a.ambiguous)?;
    for dep in &a.dependencies {
        let flag = if a.critical.contains(dep) { "  [bottleneck]" } else { "" };
        writeln!(w, "  - {dep}{flag}")?;
    }
    Ok(())
}

pub fn render_callers(a: &CallersAnswer, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", a.description)?;
    resolution_line(w, a.resolved.as_ref(), a.candidates, a.ambiguous)?;
    pretty_kv(w, "Impact", a.impact.as_str())?;
    pretty_list(w, &a.callers)
}

pub fn render_structure(a: &StructureAnswer, w: &mut dyn Write) -> io::Result<()> {
    let s = &a.structure;
    pretty_section(w, &a.description)?;
    if !s.components.is_empty() {
        writeln!(w, "Components:")?;
        for c in &s.components {
            writeln!(w, "  - {} ({})", c.name, c.component_type)?;
        }
    }
    if !s.classes.is_empty() {
        writeln!(w, "Classes:")?;
        for c in &s.classes {
            writeln!(w, "  - {} ({} methods)", c.name, c.methods)?;
        }
    }
    if !s.functions.is_empty() {
        writeln!(w, "Functions:")?;
        for f in &s.functions {
            writeln!(w, "  - {} ({} calls)", f.name, f.calls)?;
        }
    }
    if !s.dependencies.is_empty() {
        writeln!(w, "Internal edges:")?;
        for e in &s.dependencies {
            writeln!(w, "  {} -[{}]-> {}", e.from, e.relation, e.to)?;
        }
    }
    Ok(())
}

pub fn render_patterns(a: &PatternAnalysis, w: &mut dyn Write) -> io::Result<()> {
    if !a.found {
        return writeln!(w, "No node matches '{}'.", a.component);
    }
    pretty_section(w, &format!("Patterns for {}", a.component))?;
    if let Some(m) = &a.metrics {
        pretty_kv(
            w,
            "Degree",
            format!("{} in / {} out", m.dependencies_in, m.dependencies_out),
        )?;
    }
    if a.patterns.is_empty() {
        writeln!(w, "  No pattern suggested.")?;
    }
    for p in &a.patterns {
        writeln!(w, "  {} ({:?}): {}", p.pattern, p.confidence, p.reason)?;
    }
    Ok(())
}

pub fn render_path(a: &PathAnswer, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", a.description)
}

pub fn render_info(a: &NodeInfo, w: &mut dyn Write) -> io::Result<()> {
    let Some(d) = &a.details else {
        return writeln!(w, "No node matches '{}'.", a.searched);
    };
    pretty_section(w, &d.name)?;
    pretty_kv(w, "Type", d.attributes.kind.as_str())?;
    if !d.attributes.attrs.path.is_empty() {
        pretty_kv(w, "Path", &d.attributes.attrs.path)?;
    }
    if !d.attributes.attrs.module.is_empty() {
        pretty_kv(w, "Module", &d.attributes.attrs.module)?;
    }
    pretty_kv(w, "Out-degree", d.degree_out.to_string())?;
    pretty_kv(w, "In-degree", d.degree_in.to_string())?;
    pretty_kv(w, "Layer", d.layer_depth.to_string())?;
    writeln!(w, "Depends on:")?;
    pretty_list(w, &d.dependencies_out)?;
    writeln!(w, "Used by:")?;
    pretty_list(w, &d.dependencies_in)
}

pub fn render_impact(a: &ImpactAnswer, w: &mut dyn Write) -> io::Result<()> {
    let i = &a.impact;
    writeln!(w, "{}", a.description)?;
    pretty_kv(w, "Risk", i.risk_level.as_str())?;
    pretty_kv(w, "Depth", i.depth.to_string())?;
    writeln!(w, "Direct:")?;
    pretty_list(w, &i.direct_impact)?;
    writeln!(w, "Indirect:")?;
    pretty_list(w, &i.indirect_impact)
}

pub fn render_critical(a: &CriticalNodes, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &a.description)?;
    for n in &a.critical_nodes {
        writeln!(w, "  {:>10.6}  {}  ({})", n.score, n.name, n.description)?;
    }
    Ok(())
}

pub fn render_communities(a: &CommunityOverview, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", a.description)?;
    for c in &a.communities {
        writeln!(w, "  #{} ({}): {}", c.id, c.size, c.components.join(", "))?;
    }
    Ok(())
}

pub fn render_summary(a: &GraphSummary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &a.description)?;
    pretty_kv(w, "Nodes", a.total_nodes.to_string())?;
    pretty_kv(w, "Edges", a.total_edges.to_string())?;
    pretty_kv(w, "Communities", a.communities.to_string())?;
    pretty_kv(w, "Max layer depth", a.max_layer_depth.to_string())?;
    pretty_kv(w, "Important", a.top_important.join(", "))?;
    pretty_kv(w, "Bottlenecks", a.top_bottlenecks.join(", "))?;
    pretty_kv(w, "Hubs", a.top_hubs.join(", "))
}

fn render_catalog(tools: &[ToolSpec], w: &mut dyn Write) -> io::Result<()> {
    for t in tools {
        writeln!(w, "{:<13} {}", t.name, t.description)?;
        if !t.params.is_empty() {
            writeln!(w, "{:<13}   params: {}", "", t.params.join(", "))?;
        }
        writeln!(w, "{:<13}   e.g. {}", "", t.example)?;
    }
    Ok(())
}
