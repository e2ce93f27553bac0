//! `archlens query` — ask the graph a question in plain English.

use std::io::{self, Write};

use archlens_engine::agent::{Answer, QueryAnswer};
use clap::Args;

use crate::cmd::tool::{
    render_callers, render_communities, render_critical, render_dependencies, render_info,
    render_path, render_patterns, render_structure,
};
use crate::cmd::{FactsArg, Globals};
use crate::output::render;

/// Arguments for `archlens query`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub facts: FactsArg,

    /// The question; several words may be given unquoted.
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

/// Execute `archlens query`.
pub fn run_query(args: &QueryArgs, globals: &Globals) -> anyhow::Result<()> {
    let mut session = globals.open(&args.facts.facts)?;
    let answer = session.agent.query(&args.question.join(" "));
    render(globals.output, &answer, render_query_human)
}

fn render_query_human(a: &QueryAnswer, w: &mut dyn Write) -> io::Result<()> {
    match &a.answer {
        Answer::Dependencies(d) => render_dependencies(d, w),
        Answer::Callers(c) => render_callers(c, w),
        Answer::Structure(s) => render_structure(s, w),
        Answer::Patterns(p) => render_patterns(p, w),
        Answer::Path(p) => render_path(p, w),
        Answer::Info(i) => render_info(i, w),
        Answer::Cycles(c) => {
            writeln!(w, "{} cycle(s), severity {}", c.total_cycles, c.severity.as_str())?;
            for cycle in &c.cycles {
                writeln!(w, "  {}", cycle.nodes.join(" → "))?;
            }
            Ok(())
        }
        Answer::Critical(c) => render_critical(c, w),
        Answer::Communities(c) => render_communities(c, w),
        Answer::Clarify(text) | Answer::Help(text) => writeln!(w, "{text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlens_core::config::ProjectConfig;
    use archlens_core::model::{NodeAttrs, NodeKind};
    use archlens_engine::{Agent, CodeGraph};
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: QueryArgs,
    }

    #[test]
    fn unquoted_words_form_the_question() {
        let parsed = Wrapper::parse_from(["test", "facts.json", "who", "calls", "Repo?"]);
        assert_eq!(parsed.args.question.join(" "), "who calls Repo?");
    }

    #[test]
    fn question_is_required() {
        assert!(Wrapper::try_parse_from(["test", "facts.json"]).is_err());
    }

    #[test]
    fn unknown_question_renders_help() {
        let mut g = CodeGraph::new();
        g.add_node("a", NodeKind::Component, NodeAttrs::default());
        let mut agent = Agent::new(g, ProjectConfig::default());
        let answer = agent.query("what is the weather");

        let mut out = Vec::new();
        render_query_human(&answer, &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("Try:"));
    }
}
