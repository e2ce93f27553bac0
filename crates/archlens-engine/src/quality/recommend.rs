//! Recommendations derived from a dependency report.
//!
//! Rules are evaluated in table order and each contributes at most one
//! recommendation. Thresholds come from [`QualityConfig`], whose defaults
//! are [`EFFERENT_COUPLING_LIMIT`] and [`LOW_COHESION_THRESHOLD`].
//!
//! [`EFFERENT_COUPLING_LIMIT`]: archlens_core::config::EFFERENT_COUPLING_LIMIT
//! [`LOW_COHESION_THRESHOLD`]: archlens_core::config::LOW_COHESION_THRESHOLD

use archlens_core::config::QualityConfig;
use serde::Serialize;

use crate::quality::DependencyReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub affected_count: usize,
}

/// A single recommendation rule.
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&DependencyReport, &QualityConfig) -> Option<Recommendation>,
}

/// Rules in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "dependency-cycles",
        check: break_cycles,
    },
    Rule {
        name: "efferent-coupling",
        check: reduce_fan_out,
    },
    Rule {
        name: "low-cohesion",
        check: split_low_cohesion,
    },
];

/// Evaluate [`RULES`] in order.
#[must_use]
pub fn recommendations(report: &DependencyReport, config: &QualityConfig) -> Vec<Recommendation> {
    RULES
        .iter()
        .filter_map(|rule| (rule.check)(report, config))
        .collect()
}

/// Any cycle at all.
#[must_use]
pub fn break_cycles(report: &DependencyReport, _config: &QualityConfig) -> Option<Recommendation> {
    let total = report.cycles.total_cycles;
    (total > 0).then(|| Recommendation {
        priority: Priority::High,
        category: "architecture".to_string(),
        title: "Break dependency cycles".to_string(),
        description: format!(
            "Found {total} dependency cycle(s). Consider dependency inversion or extracting interfaces."
        ),
        affected_count: total,
    })
}

/// Modules depending on more than `efferent_coupling_limit` others.
#[must_use]
pub fn reduce_fan_out(report: &DependencyReport, config: &QualityConfig) -> Option<Recommendation> {
    let offenders = report
        .coupling
        .over_efferent_limit(config.efferent_coupling_limit)
        .len();
    (offenders > 0).then(|| Recommendation {
        priority: Priority::Medium,
        category: "coupling".to_string(),
        title: "Reduce fan-out".to_string(),
        description: format!(
            "{offenders} module(s) depend on more than {} others. Consider a facade or service aggregation.",
            config.efferent_coupling_limit
        ),
        affected_count: offenders,
    })
}

/// Average cohesion below `low_cohesion_threshold`.
///
/// Silent when no module has two or more children to score.
#[must_use]
pub fn split_low_cohesion(
    report: &DependencyReport,
    config: &QualityConfig,
) -> Option<Recommendation> {
    let cohesion = &report.cohesion;
    if cohesion.scored_modules == 0 || cohesion.average_cohesion >= config.low_cohesion_threshold {
        return None;
    }
    Some(Recommendation {
        priority: Priority::Medium,
        category: "cohesion".to_string(),
        title: "Split low-cohesion modules".to_string(),
        description: format!(
            "Average cohesion is low ({:.2}). Consider splitting into more focused modules.",
            cohesion.average_cohesion
        ),
        affected_count: cohesion.below(config.low_cohesion_threshold).len(),
    })
}
