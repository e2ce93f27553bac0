#![forbid(unsafe_code)]
//! archlens-core library.
//!
//! Shared vocabulary for the archlens workspace: the fact bundle handed over
//! by source-fact extraction, node and edge tags, the error taxonomy and
//! configuration loading.
//!
//! # Conventions
//!
//! - **Errors**: [`error::ArchlensError`] at the edges; `anyhow::Result` in
//!   binaries and glue.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;

pub use error::{ArchlensError, ErrorCode};
pub use model::{FactBundle, NodeAttrs, NodeKind, Relation};
