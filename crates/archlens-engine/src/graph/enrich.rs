//! Code-level enrichment from raw source text.
//!
//! # Overview
//!
//! The enricher scans Python-like source text with regular expressions and
//! adds declaration nodes plus naive `calls`/`inherits` edges. It never
//! touches the filesystem; callers hand it [`SourceFile`] values.
//!
//! # Passes
//!
//! 1. **Declarations**: `class Name(Bases):` → `class` node `module.Name`;
//!    `def name(` → `function` node `module.name`. The component whose path
//!    shares the longest trailing run of segments with the file's path gets
//!    a `contains` edge to each declaration, so a relative bundle path still
//!    matches an absolute walked path.
//! 2. **Inheritance**: each textual base (except `object`/`Exception`) is
//!    resolved as `module.Base`, then as the lowest class key ending in
//!    `.Base`. Unresolved bases are ignored.
//! 3. **Calls**: identifiers directly followed by `(`, keyword stoplist
//!    applied, first `max_call_sites` sites per file. The caller is the
//!    innermost `def` whose indented body contains the site; module-level
//!    sites have no caller and are discarded. The callee is `module.ident`.
//!    An edge is added only when both nodes exist.
//!
//! False positives and negatives are expected; this is not a resolver.

use std::collections::{BTreeMap, HashSet};

use archlens_core::config::EnrichConfig;
use archlens_core::model::{NodeAttrs, NodeKind, Relation};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::graph::build::CodeGraph;

const CLASS_PATTERN: &str = r"(?m)^\s*class\s+([A-Za-z_]\w*)\s*(?:\(([^)]*)\))?:";
const DEF_PATTERN: &str = r"(?m)^\s*def\s+([A-Za-z_]\w*)\s*\(";
const CALL_PATTERN: &str = r"([A-Za-z_]\w*)\s*\(";

/// Words that look like calls but are statements or operators.
const CALL_STOPLIST: &[&str] = &[
    "if", "elif", "for", "while", "def", "class", "return", "import", "from", "print", "and",
    "or", "not", "in", "is", "with", "assert", "yield", "except", "lambda", "await",
];

/// Base names that carry no structural information.
const IGNORED_BASES: &[&str] = &["object", "Exception"];

/// One source file handed to the enricher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as it appears in the fact bundle, so components can be matched.
    pub path: String,
    /// Module name used to qualify declarations (usually the file stem).
    pub module: String,
    pub text: String,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: impl Into<String>, module: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            module: module.into(),
            text: text.into(),
        }
    }
}

/// Counters collected by [`Enricher::enrich`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichReport {
    pub files: usize,
    pub classes: usize,
    pub functions: usize,
    pub contains_edges: usize,
    pub inherits_edges: usize,
    pub call_edges: usize,
    /// Scanned call sites that produced no new edge.
    pub discarded_call_sites: usize,
    /// Files whose path matched no component node.
    pub unmatched_files: usize,
}

/// Declarations found in one file during the first pass.
struct FileScan {
    /// Functions in text order.
    defs: Vec<DefSpan>,
    /// Offsets of declaration names, which the call pattern also matches.
    decl_sites: HashSet<usize>,
    /// `(class key, raw bases)` for the inheritance pass.
    classes: Vec<(String, Vec<String>)>,
}

/// Extent of one `def` in its file.
struct DefSpan {
    /// Offset of the function name.
    start: usize,
    /// Offset of the first line after the body.
    end: usize,
    key: String,
}

/// Regex-driven declaration and call scanner.
#[derive(Debug, Clone)]
pub struct Enricher {
    class_re: Regex,
    def_re: Regex,
    call_re: Regex,
    max_call_sites: usize,
}

impl Enricher {
    /// Compile the scanner patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new(config: &EnrichConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            class_re: Regex::new(CLASS_PATTERN)?,
            def_re: Regex::new(DEF_PATTERN)?,
            call_re: Regex::new(CALL_PATTERN)?,
            max_call_sites: config.max_call_sites,
        })
    }

    /// Add declaration nodes and call/inheritance edges to `graph`.
    #[instrument(skip(self, graph, files), fields(files = files.len()))]
    pub fn enrich(&self, graph: &mut CodeGraph, files: &[SourceFile]) -> EnrichReport {
        let mut report = EnrichReport {
            files: files.len(),
            ..EnrichReport::default()
        };

        let components = ComponentPaths::from_graph(graph);
        let scans: Vec<FileScan> = files
            .iter()
            .map(|file| self.add_declarations(graph, &components, file, &mut report))
            .collect();

        self.link_inheritance(graph, &scans, files, &mut report);

        for (file, scan) in files.iter().zip(&scans) {
            self.link_calls(graph, file, scan, &mut report);
        }

        info!(
            classes = report.classes,
            functions = report.functions,
            calls = report.call_edges,
            inherits = report.inherits_edges,
            "enriched code graph"
        );
        report
    }

    fn add_declarations(
        &self,
        graph: &mut CodeGraph,
        components: &ComponentPaths,
        file: &SourceFile,
        report: &mut EnrichReport,
    ) -> FileScan {
        let mut scan = FileScan {
            defs: Vec::new(),
            decl_sites: HashSet::new(),
            classes: Vec::new(),
        };
        let mut declared: Vec<String> = Vec::new();

        for caps in self.class_re.captures_iter(&file.text) {
            let Some(name) = caps.get(1) else { continue };
            let bases: Vec<String> = caps
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|b| !b.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let key = format!("{}.{}", file.module, name.as_str());
            graph.add_node(
                &key,
                NodeKind::Class,
                NodeAttrs {
                    name: name.as_str().to_string(),
                    path: file.path.clone(),
                    module: file.module.clone(),
                    bases: bases.clone(),
                    ..NodeAttrs::default()
                },
            );
            report.classes += 1;
            scan.decl_sites.insert(name.start());
            scan.classes.push((key.clone(), bases));
            declared.push(key);
        }

        for caps in self.def_re.captures_iter(&file.text) {
            let Some(name) = caps.get(1) else { continue };
            let key = format!("{}.{}", file.module, name.as_str());
            graph.add_node(
                &key,
                NodeKind::Function,
                NodeAttrs {
                    name: name.as_str().to_string(),
                    path: file.path.clone(),
                    module: file.module.clone(),
                    ..NodeAttrs::default()
                },
            );
            report.functions += 1;
            scan.decl_sites.insert(name.start());
            scan.defs.push(DefSpan {
                start: name.start(),
                end: body_end(&file.text, name.start()),
                key: key.clone(),
            });
            declared.push(key);
        }

        match components.best_match(&file.path) {
            Some(component) => {
                for key in &declared {
                    if key != component && graph.add_edge(component, key, Relation::Contains) {
                        report.contains_edges += 1;
                    }
                }
            }
            None => {
                report.unmatched_files += 1;
                warn!(path = %file.path, "source file matches no component");
            }
        }

        scan
    }

    #[allow(clippy::unused_self)]
    fn link_inheritance(
        &self,
        graph: &mut CodeGraph,
        scans: &[FileScan],
        files: &[SourceFile],
        report: &mut EnrichReport,
    ) {
        // Simple class name → lowest qualified key.
        let mut by_simple_name: BTreeMap<String, String> = BTreeMap::new();
        for node in graph.nodes().filter(|n| n.kind == NodeKind::Class) {
            let simple = node.key.rsplit('.').next().unwrap_or(&node.key).to_string();
            by_simple_name
                .entry(simple)
                .and_modify(|best| {
                    if node.key < *best {
                        best.clone_from(&node.key);
                    }
                })
                .or_insert_with(|| node.key.clone());
        }

        for (file, scan) in files.iter().zip(scans) {
            for (child, bases) in &scan.classes {
                for base in bases {
                    if base.contains('=') || IGNORED_BASES.contains(&base.as_str()) {
                        continue;
                    }
                    let local = format!("{}.{base}", file.module);
                    let target = if graph.contains_key(&local) {
                        Some(local)
                    } else {
                        let simple = base.rsplit('.').next().unwrap_or(base);
                        by_simple_name.get(simple).cloned()
                    };

                    match target {
                        Some(parent) if &parent != child => {
                            if graph.add_edge(child, &parent, Relation::Inherits) {
                                report.inherits_edges += 1;
                            }
                        }
                        _ => debug!(%child, %base, "base class not in graph"),
                    }
                }
            }
        }
    }

    fn link_calls(
        &self,
        graph: &mut CodeGraph,
        file: &SourceFile,
        scan: &FileScan,
        report: &mut EnrichReport,
    ) {
        for caps in self.call_re.captures_iter(&file.text).take(self.max_call_sites) {
            let Some(ident) = caps.get(1) else { continue };
            let site = ident.start();

            if scan.decl_sites.contains(&site) || CALL_STOPLIST.contains(&ident.as_str()) {
                report.discarded_call_sites += 1;
                continue;
            }

            // Innermost def above the site whose body has not ended yet.
            let above = scan.defs.partition_point(|def| def.start < site);
            let Some(caller) = scan.defs[..above].iter().rev().find(|def| def.end > site) else {
                report.discarded_call_sites += 1;
                continue;
            };

            let callee = format!("{}.{}", file.module, ident.as_str());
            if graph.add_edge(&caller.key, &callee, Relation::Calls) {
                report.call_edges += 1;
            } else {
                report.discarded_call_sites += 1;
            }
        }
    }
}

/// End of the block opened by the `def` whose name starts at `name`: the
/// first later line that is not blank, not a comment and not a closing
/// bracket, indented no deeper than the `def` itself.
fn body_end(text: &str, name: usize) -> usize {
    let line_start = text[..name].rfind('\n').map_or(0, |i| i + 1);
    let indent = indent_width(&text[line_start..]);

    let mut offset = text[name..].find('\n').map_or(text.len(), |i| name + i + 1);
    while offset < text.len() {
        let next = text[offset..].find('\n').map_or(text.len(), |i| offset + i + 1);
        let line = &text[offset..next];
        let content = line.trim();
        if !content.is_empty()
            && !content.starts_with(['#', ')', ']', '}'])
            && indent_width(line) <= indent
        {
            return offset;
        }
        offset = next;
    }
    text.len()
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Component keys indexed by path segments.
struct ComponentPaths {
    entries: Vec<(String, Vec<String>)>,
}

impl ComponentPaths {
    fn from_graph(graph: &CodeGraph) -> Self {
        let entries = graph
            .nodes()
            .filter(|n| n.kind == NodeKind::Component)
            .map(|n| (n.key.clone(), path_segments(&n.key)))
            .collect();
        Self { entries }
    }

    /// The component sharing the most trailing segments with `path`. At
    /// least the file name must agree; a tie for the best score matches
    /// nothing.
    fn best_match(&self, path: &str) -> Option<&str> {
        let wanted = path_segments(path);
        let mut best: Option<(usize, &str)> = None;
        let mut tied = false;

        for (key, segments) in &self.entries {
            let shared = wanted
                .iter()
                .rev()
                .zip(segments.iter().rev())
                .take_while(|(a, b)| a == b)
                .count();
            if shared == 0 {
                continue;
            }
            match best {
                Some((score, _)) if shared < score => {}
                Some((score, _)) if shared == score => tied = true,
                _ => {
                    best = Some((shared, key.as_str()));
                    tied = false;
                }
            }
        }

        match best {
            Some((_, key)) if !tied => Some(key),
            Some(_) => {
                debug!(%path, "source file matches several components equally");
                None
            }
            None => None,
        }
    }
}

/// Path components with `.` and empty segments dropped; both separators
/// are accepted.
fn path_segments(path: &str) -> Vec<String> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "\
class Base:
    pass

class UserService(Base, object):
    def load(self, user_id):
        return self.fetch(user_id)

    def fetch(self, user_id):
        return missing_helper(user_id)

def main():
    if ready():
        load(1)
";

    fn enricher() -> Enricher {
        Enricher::new(&EnrichConfig::default()).expect("patterns compile")
    }

    #[test]
    fn declarations_become_nodes() {
        let mut graph = CodeGraph::new();
        let report = enricher().enrich(&mut graph, &[SourceFile::new("/s/service.py", "service", SERVICE)]);

        assert_eq!(report.classes, 2);
        assert_eq!(report.functions, 3);
        let class = graph.node_by_key("service.UserService").expect("class node");
        assert_eq!(class.kind, NodeKind::Class);
        assert_eq!(class.attrs.module, "service");
        assert_eq!(class.attrs.bases, vec!["Base".to_string(), "object".to_string()]);
        assert_eq!(
            graph.node_by_key("service.main").map(|n| n.kind),
            Some(NodeKind::Function)
        );
    }

    #[test]
    fn inheritance_resolves_local_base_and_skips_object() {
        let mut graph = CodeGraph::new();
        let report = enricher().enrich(&mut graph, &[SourceFile::new("/s/service.py", "service", SERVICE)]);

        assert_eq!(report.inherits_edges, 1);
        assert!(graph.has_edge("service.UserService", "service.Base", Relation::Inherits));
    }

    #[test]
    fn inheritance_falls_back_to_other_modules() {
        let mut graph = CodeGraph::new();
        let files = [
            SourceFile::new("/s/models.py", "models", "class Model:\n    pass\n"),
            SourceFile::new("/s/user.py", "user", "class User(models.Model):\n    pass\n"),
        ];
        enricher().enrich(&mut graph, &files);
        assert!(graph.has_edge("user.User", "models.Model", Relation::Inherits));
    }

    #[test]
    fn calls_link_only_existing_nodes() {
        let mut graph = CodeGraph::new();
        let report = enricher().enrich(&mut graph, &[SourceFile::new("/s/service.py", "service", SERVICE)]);

        // load → fetch and main → load exist; missing_helper and ready do not.
        assert!(graph.has_edge("service.load", "service.fetch", Relation::Calls));
        assert!(graph.has_edge("service.main", "service.load", Relation::Calls));
        assert_eq!(report.call_edges, 2);
        assert!(graph.node_by_key("service.missing_helper").is_none());
        assert!(report.discarded_call_sites > 0);

        for (from, to, relation) in graph.edges() {
            if relation == Relation::Calls {
                assert!(graph.contains_key(from) && graph.contains_key(to));
            }
        }
    }

    #[test]
    fn call_sites_are_capped() {
        let config = EnrichConfig {
            max_call_sites: 2,
            ..EnrichConfig::default()
        };
        let text = "def a():\n    b()\n\ndef b():\n    a()\n";
        let mut graph = CodeGraph::new();
        let report = Enricher::new(&config)
            .expect("patterns compile")
            .enrich(&mut graph, &[SourceFile::new("m.py", "m", text)]);

        // The first two sites are `a(` (declaration) and `b()` inside a.
        assert_eq!(report.call_edges, 1);
        assert!(graph.has_edge("m.a", "m.b", Relation::Calls));
        assert!(!graph.has_edge("m.b", "m.a", Relation::Calls));
    }

    #[test]
    fn component_with_matching_path_contains_declarations() {
        let mut graph = CodeGraph::new();
        graph.add_node("/s/service.py", NodeKind::Component, NodeAttrs::default());
        let report = enricher().enrich(&mut graph, &[SourceFile::new("/s/service.py", "service", SERVICE)]);

        assert_eq!(report.contains_edges, 5);
        assert_eq!(report.unmatched_files, 0);
        assert!(graph.has_edge("/s/service.py", "service.UserService", Relation::Contains));
    }

    #[test]
    fn module_level_calls_have_no_caller() {
        let text = "\
def g():
    return 1

def main():
    g()

x = g()

if __name__ == \"__main__\":
    main()
";
        let mut graph = CodeGraph::new();
        let report = enricher().enrich(&mut graph, &[SourceFile::new("m.py", "m", text)]);

        assert!(graph.has_edge("m.main", "m.g", Relation::Calls));
        assert!(!graph.has_edge("m.main", "m.main", Relation::Calls));
        assert!(!graph.has_edge("m.g", "m.g", Relation::Calls));
        assert_eq!(report.call_edges, 1);
    }

    #[test]
    fn nested_and_method_bodies_end_at_dedent() {
        let text = "\
class Box:
    def open(self):
        def inner():
            return seal()
        return inner()

    lid = seal()

def seal():
    pass
";
        let mut graph = CodeGraph::new();
        enricher().enrich(&mut graph, &[SourceFile::new("box.py", "box", text)]);

        assert!(graph.has_edge("box.inner", "box.seal", Relation::Calls));
        assert!(graph.has_edge("box.open", "box.inner", Relation::Calls));
        // The class-level `seal()` sits after `open` ends.
        assert!(!graph.has_edge("box.open", "box.seal", Relation::Calls));
    }

    #[test]
    fn body_end_skips_blank_comment_and_bracket_lines() {
        let text = "def f(\n    a,\n):\n\n    # note\n    a()\nb = 1\n";
        let end = body_end(text, text.find("f(").expect("name"));
        assert_eq!(&text[end..], "b = 1\n");
    }

    #[test]
    fn component_matches_on_shared_path_suffix() {
        let mut graph = CodeGraph::new();
        graph.add_node("src/service.py", NodeKind::Component, NodeAttrs::default());
        graph.add_node("/other/service.py", NodeKind::Component, NodeAttrs::default());
        let report = enricher().enrich(
            &mut graph,
            &[SourceFile::new("/home/dev/proj/./src/service.py", "service", SERVICE)],
        );

        assert_eq!(report.contains_edges, 5);
        assert!(graph.has_edge("src/service.py", "service.main", Relation::Contains));
        assert!(!graph.has_edge("/other/service.py", "service.main", Relation::Contains));
    }

    #[test]
    fn unmatched_and_ambiguous_files_get_no_contains_edges() {
        let mut graph = CodeGraph::new();
        graph.add_node("/a/util.py", NodeKind::Component, NodeAttrs::default());
        graph.add_node("/b/util.py", NodeKind::Component, NodeAttrs::default());
        let files = [
            SourceFile::new("/c/util.py", "util", "def f():\n    pass\n"),
            SourceFile::new("/c/other.py", "other", "def g():\n    pass\n"),
        ];
        let report = enricher().enrich(&mut graph, &files);

        assert_eq!(report.contains_edges, 0);
        assert_eq!(report.unmatched_files, 2);
    }
}
