//! Project and user configuration.
//!
//! Project settings live in `.archlens/config.toml` under the working
//! directory; user settings in `<config_dir>/archlens/config.toml`. Both
//! files are optional and every key has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ArchlensError;

/// Modules with more distinct successors than this are flagged for fan-out.
pub const EFFERENT_COUPLING_LIMIT: usize = 10;

/// Average cohesion below this value triggers the split recommendation.
pub const LOW_COHESION_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub communities: CommunityConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub enrich: EnrichConfig,
}

/// Which importance ranking to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportanceAlgorithm {
    #[default]
    Pagerank,
    /// Degree centrality normalized by the maximum degree.
    Degree,
}

/// Which community partitioning to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommunityAlgorithm {
    #[default]
    Louvain,
    ConnectedComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub importance: ImportanceAlgorithm,
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_top_important")]
    pub top_important: usize,
    #[serde(default = "default_top_bottlenecks")]
    pub top_bottlenecks: usize,
    #[serde(default = "default_top_hubs")]
    pub top_hubs: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            importance: ImportanceAlgorithm::default(),
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
            top_important: default_top_important(),
            top_bottlenecks: default_top_bottlenecks(),
            top_hubs: default_top_hubs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityConfig {
    #[serde(default)]
    pub algorithm: CommunityAlgorithm,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Above this node count Louvain is skipped in favour of components.
    #[serde(default = "default_louvain_max_nodes")]
    pub louvain_max_nodes: usize,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            algorithm: CommunityAlgorithm::default(),
            seed: default_seed(),
            louvain_max_nodes: default_louvain_max_nodes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default = "default_efferent_limit")]
    pub efferent_coupling_limit: usize,
    #[serde(default = "default_cohesion_threshold")]
    pub low_cohesion_threshold: f64,
    /// Simple-cycle enumeration stops after this many cycles.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            efferent_coupling_limit: default_efferent_limit(),
            low_cohesion_threshold: default_cohesion_threshold(),
            max_cycles: default_max_cycles(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Node slice returned by `module_structure` without a module.
    #[serde(default = "default_structure_limit")]
    pub structure_limit: usize,
    #[serde(default = "default_max_impact_depth")]
    pub max_impact_depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            structure_limit: default_structure_limit(),
            max_impact_depth: default_max_impact_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Call sites scanned per file.
    #[serde(default = "default_max_call_sites")]
    pub max_call_sites: usize,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            max_call_sites: default_max_call_sites(),
            extensions: default_extensions(),
            skip_dirs: default_skip_dirs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

/// Load `.archlens/config.toml` from `project_root`, or defaults.
///
/// # Errors
///
/// Returns [`ArchlensError::ConfigParse`] when the file exists but cannot be
/// read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig, ArchlensError> {
    let path = project_root.join(".archlens/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }
    read_toml(&path)
}

/// Load the per-user config, or defaults when there is none.
///
/// # Errors
///
/// Returns [`ArchlensError::ConfigParse`] when the file exists but is
/// malformed.
pub fn load_user_config() -> Result<UserConfig, ArchlensError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("archlens/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }
    read_toml(&path)
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArchlensError> {
    let content = std::fs::read_to_string(path).map_err(|e| ArchlensError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    toml::from_str::<T>(&content).map_err(|e| ArchlensError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

const fn default_damping() -> f64 {
    0.85
}

const fn default_tolerance() -> f64 {
    1e-6
}

const fn default_max_iter() -> usize {
    100
}

const fn default_top_important() -> usize {
    10
}

const fn default_top_bottlenecks() -> usize {
    5
}

const fn default_top_hubs() -> usize {
    10
}

const fn default_seed() -> u64 {
    42
}

const fn default_louvain_max_nodes() -> usize {
    20_000
}

const fn default_efferent_limit() -> usize {
    EFFERENT_COUPLING_LIMIT
}

const fn default_cohesion_threshold() -> f64 {
    LOW_COHESION_THRESHOLD
}

const fn default_max_cycles() -> usize {
    10_000
}

const fn default_structure_limit() -> usize {
    50
}

const fn default_max_impact_depth() -> usize {
    6
}

const fn default_max_call_sites() -> usize {
    100
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_skip_dirs() -> Vec<String> {
    ["__pycache__", "venv", ".venv", "node_modules", ".git", "uploads"]
        .into_iter()
        .map(str::to_string)
        .collect()
}
