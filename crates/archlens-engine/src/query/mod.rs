//! Query layer: name resolution, atomic tools, heuristics and intents.
//!
//! Tools never fail. An unresolved name yields an empty collection or a
//! `found: false` sentinel. The judgment-enriched wrappers built on top of
//! these live in [`crate::agent`].

pub mod intent;
pub mod patterns;
pub mod resolve;
pub mod tools;

pub use intent::{Classification, Intent, classify};
pub use patterns::{PatternAnalysis, design_patterns};
pub use resolve::{Resolution, resolve};
pub use tools::{
    ImpactAnalysis, ModuleStructure, NodeInfo, RiskLevel, callers, dependencies, explore_impact,
    module_structure, node_info, shortest_path,
};
