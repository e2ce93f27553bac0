#![forbid(unsafe_code)]
//! archlens-engine library.
//!
//! Turns a fact bundle into a directed attributed graph and answers
//! structural questions about it: centrality and communities
//! ([`metrics`]), dependency quality ([`quality`]), atomic queries
//! ([`query`]) and the judgment-enriched [`agent::Agent`].
//!
//! # Conventions
//!
//! - **Errors**: Engine operations are infallible. Unresolved names give
//!   empty results, algorithm trouble gives a documented fallback.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!   Every fallback and truncation is a `warn!`.
//! - **Determinism**: Node ids follow insertion order and every ranking
//!   breaks ties by key.

pub mod agent;
pub mod cache;
pub mod graph;
pub mod metrics;
pub mod quality;
pub mod query;

pub use agent::Agent;
pub use graph::{BuildReport, CodeGraph};
pub use metrics::{MetricsSnapshot, compute_metrics};
pub use quality::{DependencyReport, analyze_dependencies};
