//! Input records and graph vocabulary.

pub mod facts;
pub mod node;

pub use facts::{ComponentFact, ContainerFact, FactBundle, FactFormat, RelationFact};
pub use node::{Confidence, NodeAttrs, NodeKind, Relation};
