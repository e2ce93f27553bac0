//! `archlens cycles` — list simple dependency cycles.

use std::io::Write;

use archlens_engine::quality::CycleReport;
use clap::Args;

use crate::cmd::{FactsArg, Globals};
use crate::output::render;

/// Arguments for `archlens cycles`.
#[derive(Args, Debug)]
pub struct CyclesArgs {
    #[command(flatten)]
    pub facts: FactsArg,
}

/// Execute `archlens cycles`.
pub fn run_cycles(args: &CyclesArgs, globals: &Globals) -> anyhow::Result<()> {
    let session = globals.open(&args.facts.facts)?;
    let report = session.agent.cycles();
    render(globals.output, &report, render_cycles_human)
}

fn render_cycles_human(report: &CycleReport, w: &mut dyn Write) -> std::io::Result<()> {
    if report.cycles.is_empty() {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    writeln!(
        w,
        "Dependency cycles ({}, severity {})",
        report.total_cycles,
        report.severity.as_str()
    )?;
    if report.truncated {
        writeln!(w, "(enumeration stopped at the configured limit)")?;
    }

    for (idx, cycle) in report.cycles.iter().enumerate() {
        writeln!(
            w,
            "\nCycle {} (length {}, {}):",
            idx + 1,
            cycle.length,
            cycle.severity.as_str()
        )?;
        for node in &cycle.nodes {
            writeln!(w, "  - {node}")?;
        }
    }

    Ok(())
}
