use tracing::debug;

use fvkit_tree::{Firmware, NodePath, Visitor};

use crate::command::{Command, CommandSpec, MatchInfo, Report};
use crate::config::EditConfig;
use crate::error::{VisitorError, VisitorResult};
use crate::predicate::{file_expr, Predicate};

/// Collects the path of every node satisfying a predicate.
///
/// Matches are recorded pre-order: a node before its children, siblings
/// left to right. A match does not stop the search below it, so nested
/// matches are reported too. `Find` never modifies the tree.
#[derive(Debug)]
pub struct Find {
    pub predicate: Predicate,
    pub matches: Vec<NodePath>,
}

impl Find {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            matches: Vec::new(),
        }
    }

    /// Walk `root`, replacing `matches` with this run's results.
    pub fn run(&mut self, root: &mut Firmware) -> VisitorResult<()> {
        self.matches.clear();
        root.apply(self)?;
        debug!(matches = self.matches.len(), "find complete");
        Ok(())
    }

    /// Resolve the match list against the tree it was produced from.
    pub fn resolve<'a>(&self, root: &'a Firmware) -> Vec<&'a Firmware> {
        self.matches.iter().filter_map(|p| root.get(p)).collect()
    }
}

impl Visitor for Find {
    type Error = VisitorError;

    fn visit(&mut self, node: &mut Firmware, path: &NodePath) -> VisitorResult<()> {
        if self.predicate.test(node) {
            self.matches.push(path.clone());
        }
        Ok(())
    }
}

impl Command for Find {
    fn name(&self) -> &str {
        "find"
    }

    fn run(&mut self, root: &mut Firmware) -> VisitorResult<()> {
        Find::run(self, root)
    }

    fn report(&self, root: &Firmware) -> Report {
        let matches = MatchInfo::collect(root, &self.matches);
        Report::new("find", format!("{} match(es)", matches.len())).with_matches(matches)
    }
}

/// `find <file-expr>`: list files matching a GUID or pattern.
pub fn command_spec() -> CommandSpec {
    CommandSpec::new(
        "find",
        "find files by GUID or case-insensitive name/GUID pattern",
        1,
        |args: &[String], _config: &EditConfig| {
            let predicate = file_expr(&args[0])?;
            Ok(Box::new(Find::new(predicate)) as Box<dyn Command>)
        },
    )
}
