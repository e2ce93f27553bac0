//! Loading a fact bundle and an optional source tree into an [`Agent`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use archlens_core::ArchlensError;
use archlens_core::config::{EnrichConfig, ProjectConfig};
use archlens_core::model::FactBundle;
use archlens_engine::graph::{BuildReport, EnrichReport, Enricher, SourceFile};
use archlens_engine::{Agent, CodeGraph};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Everything a command needs: the agent plus how its graph was built.
#[derive(Debug)]
pub struct Session {
    pub agent: Agent,
    pub load: LoadReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub facts_hash: String,
    pub build: BuildReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrich: Option<EnrichReport>,
}

/// Load `facts`, build the graph, and enrich it from `enrich_dir` when given.
///
/// # Errors
///
/// Returns an error if the bundle cannot be read or parsed, or the source
/// directory cannot be walked.
pub fn open(facts: &Path, enrich_dir: Option<&Path>, config: ProjectConfig) -> Result<Session> {
    let bundle = FactBundle::load(facts)
        .with_context(|| format!("loading fact bundle {}", facts.display()))?;
    let facts_hash = bundle.content_hash();
    let (graph, build) = CodeGraph::from_facts(&bundle);
    let mut agent = Agent::new(graph, config);

    let enrich = match enrich_dir {
        Some(dir) => {
            let config = agent.config().enrich.clone();
            Some(enrich_graph(agent.graph_mut(), dir, &config)?)
        }
        None => None,
    };

    Ok(Session {
        agent,
        load: LoadReport {
            facts_hash,
            build,
            enrich,
        },
    })
}

fn enrich_graph(graph: &mut CodeGraph, dir: &Path, config: &EnrichConfig) -> Result<EnrichReport> {
    let enricher = Enricher::new(config).context("compiling enrichment patterns")?;
    let files = collect_sources(dir, config)?;
    let report = enricher.enrich(graph, &files);
    info!(
        files = report.files,
        classes = report.classes,
        functions = report.functions,
        calls = report.call_edges,
        unmatched = report.unmatched_files,
        "enriched graph from source tree"
    );
    Ok(report)
}

/// Collect source files under `root` whose extension is configured,
/// pruning `skip_dirs`. The module name is the file stem; paths are
/// absolute so they can be matched against bundle paths by suffix.
///
/// Unreadable files are skipped with a warning.
///
/// # Errors
///
/// Returns [`ArchlensError::SourceRead`] when `root` itself is not readable.
pub fn collect_sources(root: &Path, config: &EnrichConfig) -> Result<Vec<SourceFile>> {
    let source_read = |source| ArchlensError::SourceRead {
        path: root.to_path_buf(),
        source,
    };
    fs::read_dir(root).map_err(source_read)?;
    let root = fs::canonicalize(root).map_err(source_read)?;

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(e.file_type().is_dir()
                    && config
                        .skip_dirs
                        .iter()
                        .any(|skip| e.file_name().to_string_lossy() == skip.as_str()))
        });

    let mut files = Vec::new();
    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "skipping unwalkable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), &config.extensions) {
            continue;
        }

        let path = entry.path();
        let Some(module) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        match fs::read_to_string(path) {
            Ok(text) => files.push(SourceFile::new(path.display().to_string(), module, text)),
            Err(err) => warn!(path = %path.display(), %err, "skipping unreadable source file"),
        }
    }

    debug!(root = %root.display(), files = files.len(), "collected source files");
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy();
        extensions
            .iter()
            .any(|want| want.trim_start_matches('.') == ext)
    })
}
