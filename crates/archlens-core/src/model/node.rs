//! Node and edge vocabulary shared by the engine and its consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role a node plays in the structural model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A deployable/executable unit (application, service boundary).
    Container,
    /// A source file or unit classified by role (controller, service, …).
    Component,
    /// A class declaration found by the enricher.
    Class,
    /// A function declaration found by the enricher.
    Function,
}

impl NodeKind {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Component => "component",
            Self::Class => "class",
            Self::Function => "function",
        }
    }

    /// Containers and components are the module-level units that coupling
    /// and cohesion are measured on.
    #[must_use]
    pub const fn is_module(self) -> bool {
        matches!(self, Self::Container | Self::Component)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag carried by every directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Contains,
    Imports,
    Calls,
    Inherits,
}

impl Relation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Imports => "imports",
            Self::Calls => "calls",
            Self::Inherits => "inherits",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detector confidence as reported by the extraction collaborator.
///
/// Extractors emit either a numeric score or a label such as `"high"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Score(f64),
    Label(String),
}

/// Attributes attached to a node. Every field is optional so that partial
/// facts never block graph construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    /// Display name (component name, container type, declaration name).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Resource path, when the node came from a file-level fact.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub technology: String,
    /// Component subtype (controller, service, repository, model, view).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_points: Vec<String>,
    /// Owning module for class/function nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    /// Base class names as written in the source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl NodeAttrs {
    /// Merge `update` into `self`: non-empty fields of `update` win, empty
    /// fields keep the stored value.
    pub fn merge(&mut self, update: Self) {
        fn take(dst: &mut String, src: String) {
            if !src.is_empty() {
                *dst = src;
            }
        }
        fn take_vec(dst: &mut Vec<String>, src: Vec<String>) {
            if !src.is_empty() {
                *dst = src;
            }
        }

        take(&mut self.name, update.name);
        take(&mut self.path, update.path);
        take(&mut self.technology, update.technology);
        take(&mut self.component_type, update.component_type);
        take_vec(&mut self.classes, update.classes);
        take_vec(&mut self.entry_points, update.entry_points);
        take(&mut self.module, update.module);
        take_vec(&mut self.bases, update.bases);
        if update.confidence.is_some() {
            self.confidence = update.confidence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_existing_when_update_empty() {
        let mut attrs = NodeAttrs {
            name: "UserService".into(),
            technology: "python".into(),
            ..NodeAttrs::default()
        };
        attrs.merge(NodeAttrs {
            component_type: "service".into(),
            ..NodeAttrs::default()
        });

        assert_eq!(attrs.name, "UserService");
        assert_eq!(attrs.technology, "python");
        assert_eq!(attrs.component_type, "service");
    }

    #[test]
    fn merge_overwrites_non_empty_fields() {
        let mut attrs = NodeAttrs {
            name: "old".into(),
            confidence: Some(Confidence::Label("low".into())),
            ..NodeAttrs::default()
        };
        attrs.merge(NodeAttrs {
            name: "new".into(),
            confidence: Some(Confidence::Score(0.9)),
            ..NodeAttrs::default()
        });

        assert_eq!(attrs.name, "new");
        assert_eq!(attrs.confidence, Some(Confidence::Score(0.9)));
    }

    #[test]
    fn confidence_accepts_score_or_label() {
        let score: Confidence = serde_json::from_str("0.75").expect("score");
        let label: Confidence = serde_json::from_str("\"high\"").expect("label");
        assert_eq!(score, Confidence::Score(0.75));
        assert_eq!(label, Confidence::Label("high".into()));
    }

    #[test]
    fn only_containers_and_components_are_modules() {
        assert!(NodeKind::Container.is_module());
        assert!(NodeKind::Component.is_module());
        assert!(!NodeKind::Class.is_module());
        assert!(!NodeKind::Function.is_module());
    }
}
