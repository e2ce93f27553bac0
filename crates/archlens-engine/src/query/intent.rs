//! Keyword intent classification for free-text questions.
//!
//! Tokens that start upper-case or contain `_` are entity candidates, with
//! surrounding punctuation trimmed. Question words and imperative verbs
//! ("What", "Describe", ...) never count as entities. Keywords are matched
//! against the remaining lower-cased words, so an entity such as
//! `UserImporter` cannot trigger the "import" intent.
//!
//! A keyword matches whole words: `use` matches "use" but not "user". A
//! trailing `*` accepts any word starting with the stem (`depend*` covers
//! "depends" and "dependencies"), and a keyword with a space must match
//! consecutive words.
//!
//! Intents are tried in [`INTENT_RULES`] order; the first whose keyword
//! appears wins.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Cycles,
    Communities,
    Critical,
    Callers,
    Dependencies,
    Structure,
    Patterns,
    Path,
    Info,
}

impl Intent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cycles => "cycles",
            Self::Communities => "communities",
            Self::Critical => "critical",
            Self::Callers => "callers",
            Self::Dependencies => "dependencies",
            Self::Structure => "structure",
            Self::Patterns => "patterns",
            Self::Path => "path",
            Self::Info => "info",
        }
    }
}

/// How many entities an intent needs before it can be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entities {
    None,
    Optional,
    One,
    Two,
}

pub struct IntentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
    pub entities: Entities,
}

/// Graph-wide intents come first: their keywords are specific, while
/// "components" or "dependencies" also show up inside them.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Cycles,
        keywords: &["cycle*", "cyclic", "circular"],
        entities: Entities::None,
    },
    IntentRule {
        intent: Intent::Communities,
        keywords: &["communit*", "cluster*"],
        entities: Entities::None,
    },
    IntentRule {
        intent: Intent::Critical,
        keywords: &["critical", "important", "importance"],
        entities: Entities::None,
    },
    IntentRule {
        intent: Intent::Callers,
        keywords: &["who", "caller*", "used by"],
        entities: Entities::One,
    },
    IntentRule {
        intent: Intent::Dependencies,
        keywords: &[
            "depend*", "use", "uses", "using", "import*", "call", "calls", "calling",
        ],
        entities: Entities::One,
    },
    IntentRule {
        intent: Intent::Structure,
        keywords: &["structur*", "module*", "component*"],
        entities: Entities::Optional,
    },
    IntentRule {
        intent: Intent::Patterns,
        keywords: &["pattern*", "design*"],
        entities: Entities::One,
    },
    IntentRule {
        intent: Intent::Path,
        keywords: &["path*", "connect*", "reach*"],
        entities: Entities::Two,
    },
    IntentRule {
        intent: Intent::Info,
        keywords: &["info*", "detail*", "about"],
        entities: Entities::One,
    },
];

const QUESTION_WORDS: &[&str] = &[
    "what", "who", "whom", "which", "where", "when", "why", "how", "is", "are", "does", "do",
    "can", "could", "show", "find", "list", "give", "tell", "explain", "get", "i", "please",
    "describe", "display", "print", "analyze", "analyse", "summarize", "check", "locate",
    "trace", "identify",
];

pub const HELP_TEXT: &str =
    "Try: 'What depends on X?', 'Who calls X?', 'Show structure of X', 'Find patterns in X'";

/// Outcome of classifying one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Intent recognised with the entities it needs.
    Ready { intent: Intent, entities: Vec<String> },
    /// Intent recognised but an entity is missing.
    NeedsEntity { intent: Intent, required: usize },
    Unknown,
}

/// Split a question into entity candidates and lower-cased keyword text.
#[must_use]
pub fn split_question(question: &str) -> (Vec<String>, String) {
    let mut entities = Vec::new();
    let mut words = Vec::new();

    for raw in question.split_whitespace() {
        let token = raw.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
        if token.is_empty() {
            continue;
        }
        let lower = token.to_lowercase();
        let looks_named = token.chars().next().is_some_and(char::is_uppercase) || token.contains('_');
        if looks_named && !QUESTION_WORDS.contains(&lower.as_str()) {
            entities.push(token.to_string());
        } else {
            words.push(lower);
        }
    }

    (entities, words.join(" "))
}

#[must_use]
pub fn classify(question: &str) -> Classification {
    let (entities, text) = split_question(question);
    let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();

    let Some(rule) = INTENT_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| keyword_matches(&words, kw)))
    else {
        return Classification::Unknown;
    };

    let required = match rule.entities {
        Entities::None | Entities::Optional => 0,
        Entities::One => 1,
        Entities::Two => 2,
    };
    if entities.len() < required {
        return Classification::NeedsEntity {
            intent: rule.intent,
            required,
        };
    }

    let keep = match rule.entities {
        Entities::None => 0,
        Entities::Optional | Entities::One => 1,
        Entities::Two => 2,
    };
    Classification::Ready {
        intent: rule.intent,
        entities: entities.into_iter().take(keep).collect(),
    }
}

fn keyword_matches(words: &[&str], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    words.windows(parts.len()).any(|window| {
        window.iter().zip(&parts).all(|(word, part)| {
            part.strip_suffix('*')
                .map_or(word == part, |stem| word.starts_with(stem))
        })
    })
}
