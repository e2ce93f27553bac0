use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FactsNotFound,
    FactsParseError,
    UnsupportedFormat,
    ConfigParseError,
    SourceReadFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FactsNotFound => "E1001",
            Self::FactsParseError => "E1002",
            Self::UnsupportedFormat => "E1003",
            Self::ConfigParseError => "E1004",
            Self::SourceReadFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FactsNotFound => "Fact bundle not found",
            Self::FactsParseError => "Fact bundle parse error",
            Self::UnsupportedFormat => "Unsupported fact bundle format",
            Self::ConfigParseError => "Config file parse error",
            Self::SourceReadFailed => "Source file read failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::FactsNotFound => Some("Pass the path of a JSON or YAML fact bundle."),
            Self::FactsParseError => {
                Some("Check that the bundle holds containers/components/relations arrays.")
            }
            Self::UnsupportedFormat => Some("Use a .json, .yaml or .yml fact bundle."),
            Self::ConfigParseError => Some("Fix syntax in .archlens/config.toml and retry."),
            Self::SourceReadFailed => Some("Check read permissions under the --enrich directory."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised at the edges of the engine: loading inputs and configuration.
///
/// Graph operations themselves never fail; unresolved names and degraded
/// algorithms are reported in their results instead.
#[derive(Debug, thiserror::Error)]
pub enum ArchlensError {
    #[error("fact bundle not found: {}", path.display())]
    FactsNotFound { path: PathBuf },

    #[error("failed to parse fact bundle {}: {reason}", path.display())]
    FactsParse { path: PathBuf, reason: String },

    #[error("unsupported fact bundle format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse config {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("failed to read source file {}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchlensError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::FactsNotFound { .. } => ErrorCode::FactsNotFound,
            Self::FactsParse { .. } => ErrorCode::FactsParseError,
            Self::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::SourceRead { .. } => ErrorCode::SourceReadFailed,
        }
    }

    /// Remediation hint, falling back to the code's generic message.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or(code.message()).to_string()
    }
}
