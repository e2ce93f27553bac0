pub mod analyze;
pub mod completions;
pub mod cycles;
pub mod export;
pub mod metrics;
pub mod query;
pub mod report;
pub mod tool;

use std::path::{Path, PathBuf};

use anyhow::Result;
use archlens_core::config::load_project_config;
use clap::Args;

use crate::load::{self, Session};
use crate::output::OutputMode;

/// The fact bundle every analysis command reads.
#[derive(Args, Debug, Clone)]
pub struct FactsArg {
    /// Fact bundle (.json, .yaml or .yml).
    #[arg(value_name = "FACTS")]
    pub facts: PathBuf,
}

/// Settings shared by every command, resolved once in `main`.
#[derive(Debug, Clone)]
pub struct Globals {
    pub output: OutputMode,
    pub enrich: Option<PathBuf>,
    pub project_root: PathBuf,
}

impl Globals {
    /// Load project config and open a session over `facts`.
    ///
    /// # Errors
    ///
    /// Propagates config, bundle and source-tree loading failures.
    pub fn open(&self, facts: &Path) -> Result<Session> {
        let config = load_project_config(&self.project_root)?;
        load::open(facts, self.enrich.as_deref(), config)
    }
}
