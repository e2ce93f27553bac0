//! The fact bundle produced by source-fact extraction.
//!
//! Extraction is an external collaborator; this module only defines the
//! record shapes it hands over and loads them permissively. Every sequence
//! and every field may be absent or `null`; absent values become empty
//! defaults, never errors.
//!
//! Older extractors emit `containers_detected`,
//! `components_detected` and `relations_detected`; those keys are accepted as
//! aliases.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;

use crate::error::ArchlensError;
use crate::model::node::Confidence;

/// A detected deployable unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerFact {
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    #[serde(default, rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub technology: String,
    #[serde(
        default,
        deserialize_with = "lenient_confidence",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<Confidence>,
}

/// A detected source unit classified by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFact {
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub classes: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub entry_points: Vec<String>,
}

/// A detected inter-component reference, by component name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationFact {
    #[serde(default, deserialize_with = "nullable")]
    pub from: String,
    #[serde(default, deserialize_with = "nullable")]
    pub to: String,
}

/// The full input record set handed to the graph builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactBundle {
    #[serde(default, alias = "containers_detected", deserialize_with = "nullable")]
    pub containers: Vec<ContainerFact>,
    #[serde(default, alias = "components_detected", deserialize_with = "nullable")]
    pub components: Vec<ComponentFact>,
    #[serde(default, alias = "relations_detected", deserialize_with = "nullable")]
    pub relations: Vec<RelationFact>,
}

/// Serialization format of a fact bundle on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactFormat {
    Json,
    Yaml,
}

impl FactFormat {
    /// Guess the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl FactBundle {
    /// Parse a bundle from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error only when the text is not a JSON object of the
    /// expected shape; missing keys are tolerated.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse a bundle from YAML text. An empty document is an empty bundle.
    ///
    /// # Errors
    ///
    /// Returns an error when the text is not a YAML mapping of the expected
    /// shape.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Load a bundle from `path`, picking the parser from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ArchlensError::FactsNotFound`] when the file is missing,
    /// [`ArchlensError::UnsupportedFormat`] for unknown extensions and
    /// [`ArchlensError::FactsParse`] for malformed documents.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, ArchlensError> {
        if !path.exists() {
            return Err(ArchlensError::FactsNotFound {
                path: path.to_path_buf(),
            });
        }
        let format = FactFormat::from_path(path).ok_or_else(|| ArchlensError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let text = std::fs::read_to_string(path).map_err(|source| ArchlensError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, format).map_err(|reason| ArchlensError::FactsParse {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse text in the given format, flattening parser errors to a message.
    ///
    /// # Errors
    ///
    /// Returns the parser's message when the document is malformed.
    pub fn parse(text: &str, format: FactFormat) -> Result<Self, String> {
        match format {
            FactFormat::Json => Self::from_json_str(text).map_err(|e| e.to_string()),
            FactFormat::Yaml => Self::from_yaml_str(text).map_err(|e| e.to_string()),
        }
    }

    /// `true` when the bundle carries no facts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.components.is_empty() && self.relations.is_empty()
    }

    /// BLAKE3 hash of the canonical JSON encoding, for cache keys.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        format!("blake3:{}", blake3::hash(&encoded))
    }
}

/// Treat an explicit `null` like an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept numbers and strings as confidence; anything else is dropped.
fn lenient_confidence<'de, D>(deserializer: D) -> Result<Option<Confidence>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().map(Confidence::Score),
        Some(serde_json::Value::String(s)) => Some(Confidence::Label(s)),
        _ => None,
    })
}
