use std::collections::BTreeMap;

use fvkit_tree::{Firmware, NodePath, Visitor};

use crate::command::{Command, CommandSpec, Report};
use crate::config::EditConfig;
use crate::error::{VisitorError, VisitorResult};

/// Tallies nodes by kind, and files additionally by file type.
#[derive(Debug, Default)]
pub struct Count {
    pub counts: BTreeMap<String, usize>,
}

impl Count {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, root: &mut Firmware) -> VisitorResult<()> {
        self.counts.clear();
        root.apply(self)
    }

    /// Total number of nodes seen.
    pub fn total(&self) -> usize {
        self.counts
            .iter()
            .filter(|(k, _)| !k.contains(':'))
            .map(|(_, v)| v)
            .sum()
    }
}

impl Visitor for Count {
    type Error = VisitorError;

    fn visit(&mut self, node: &mut Firmware, _path: &NodePath) -> VisitorResult<()> {
        *self.counts.entry(node.kind().to_string()).or_default() += 1;
        if let Some(file) = node.as_file() {
            *self
                .counts
                .entry(format!("file:{}", file.file_type()))
                .or_default() += 1;
        }
        Ok(())
    }
}

impl Command for Count {
    fn name(&self) -> &str {
        "count"
    }

    fn run(&mut self, root: &mut Firmware) -> VisitorResult<()> {
        Count::run(self, root)
    }

    fn report(&self, _root: &Firmware) -> Report {
        Report::new("count", format!("{} node(s)", self.total())).with_counts(self.counts.clone())
    }
}

/// `count`: tally nodes by kind and file type.
pub fn command_spec() -> CommandSpec {
    CommandSpec::new(
        "count",
        "count nodes by kind and file type",
        0,
        |_args: &[String], _config: &EditConfig| Ok(Box::new(Count::new()) as Box<dyn Command>),
    )
}
