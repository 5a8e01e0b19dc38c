use std::collections::BTreeMap;

use serde::Serialize;

use fvkit_tree::{Firmware, NodeKind, NodePath};
use fvkit_types::Guid;

use crate::config::EditConfig;
use crate::error::VisitorResult;

// ---------------------------------------------------------------------------
// Command trait
// ---------------------------------------------------------------------------

/// A configured tree operation that can be run by name.
///
/// The trait is object-safe so the registry can hand out
/// `Box<dyn Command>` values built from textual arguments.
pub trait Command {
    /// Registry name of the command (e.g. "find", "replace_raw").
    fn name(&self) -> &str;

    /// Run the operation over the whole tree rooted at `root`.
    fn run(&mut self, root: &mut Firmware) -> VisitorResult<()>;

    /// Describe the outcome of the last run.
    fn report(&self, root: &Firmware) -> Report;
}

/// Builds a command from its positional arguments.
pub type Constructor = fn(&[String], &EditConfig) -> VisitorResult<Box<dyn Command>>;

/// Registry entry for a command.
#[derive(Clone, Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    pub help: &'static str,
    /// Exact number of positional arguments the command consumes.
    pub arg_count: usize,
    pub constructor: Constructor,
}

impl CommandSpec {
    pub fn new(
        name: &'static str,
        help: &'static str,
        arg_count: usize,
        constructor: Constructor,
    ) -> Self {
        Self {
            name,
            help,
            arg_count,
            constructor,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One matched node, described for output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchInfo {
    pub path: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl MatchInfo {
    pub fn describe(path: &NodePath, node: &Firmware) -> Self {
        let file = node.as_file();
        Self {
            path: path.to_string(),
            kind: node.kind(),
            guid: node.guid(),
            name: file.and_then(|f| f.ui_name()),
            size: file.map(|f| f.header.total_size()),
        }
    }

    /// Describe every path that still resolves in `root`.
    pub fn collect(root: &Firmware, paths: &[NodePath]) -> Vec<Self> {
        paths
            .iter()
            .filter_map(|p| root.get(p).map(|n| Self::describe(p, n)))
            .collect()
    }
}

/// Outcome of one command run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    pub command: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<MatchInfo>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<String, usize>,
}

impl Report {
    pub fn new(command: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            summary: summary.into(),
            matches: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn with_matches(mut self, matches: Vec<MatchInfo>) -> Self {
        self.matches = matches;
        self
    }

    pub fn with_counts(mut self, counts: BTreeMap<String, usize>) -> Self {
        self.counts = counts;
        self
    }
}
