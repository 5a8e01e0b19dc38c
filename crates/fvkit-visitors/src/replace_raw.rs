use std::path::Path;

use tracing::{debug, info, warn};

use fvkit_tree::{Firmware, NodePath, Visitor};

use crate::command::{Command, CommandSpec, MatchInfo, Report};
use crate::config::{EditConfig, MatchPolicy};
use crate::error::{VisitorError, VisitorResult};
use crate::find::Find;
use crate::predicate::{and, file_expr, raw_file, Predicate};

/// Replaces the payload of raw files matching a predicate.
///
/// A run has two phases. First a [`Find`] with `predicate AND raw file`
/// records the matches; if there are none the run fails and the tree is
/// untouched. Then `ReplaceRaw` itself is applied to the whole tree and
/// rewrites each matched raw file: new data, new size field, new
/// checksums. Finally the enclosing files and volume image sections of
/// each rewritten file are rebuilt so the root's serialized form carries
/// the new payload.
///
/// An error in the second phase aborts the walk. Files rewritten before the
/// failure stay rewritten, and their enclosing bytes are still rebuilt so
/// the tree keeps agreeing with its own serialized form.
#[derive(Debug)]
pub struct ReplaceRaw {
    pub predicate: Predicate,
    pub new_raw: Vec<u8>,
    pub policy: MatchPolicy,
    /// Paths of the matched raw files, pre-order.
    pub matches: Vec<NodePath>,
    rewritten: Vec<NodePath>,
}

impl ReplaceRaw {
    pub fn new(predicate: Predicate, new_raw: Vec<u8>) -> Self {
        Self {
            predicate,
            new_raw,
            policy: MatchPolicy::All,
            matches: Vec::new(),
            rewritten: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of files rewritten by the last run.
    pub fn replaced(&self) -> usize {
        self.rewritten.len()
    }

    pub fn run(&mut self, root: &mut Firmware) -> VisitorResult<()> {
        let mut find = Find::new(and([self.predicate.clone(), raw_file()]));
        find.run(root)?;
        self.matches = find.matches;
        self.rewritten.clear();

        if self.matches.is_empty() {
            return Err(VisitorError::NoMatches);
        }
        if self.policy == MatchPolicy::ExactlyOne && self.matches.len() > 1 {
            return Err(VisitorError::MultipleMatches {
                count: self.matches.len(),
            });
        }

        let walked = root.apply(self);
        let refreshed = self.refresh_rewritten(root);
        walked?;
        refreshed?;
        info!(
            replaced = self.replaced(),
            size = self.new_raw.len(),
            "raw file content replaced"
        );
        Ok(())
    }

    /// Rebuild the enclosing bytes of every file rewritten so far. Keeps
    /// going past a failing path and returns the first error.
    fn refresh_rewritten(&self, root: &mut Firmware) -> VisitorResult<()> {
        let mut first = None;
        for path in &self.rewritten {
            if let Err(e) = root.refresh_ancestors(path) {
                warn!(%path, error = %e, "cannot rebuild enclosing bytes");
                first.get_or_insert(e);
            }
        }
        match first {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl Visitor for ReplaceRaw {
    type Error = VisitorError;

    fn visit(&mut self, node: &mut Firmware, path: &NodePath) -> VisitorResult<()> {
        let Firmware::File(file) = node else {
            return Ok(());
        };
        if !file.is_raw() || !self.matches.contains(path) {
            return Ok(());
        }
        file.checksum_and_assemble(self.new_raw.clone())?;
        self.rewritten.push(path.clone());
        debug!(guid = %file.guid(), %path, size = file.header.total_size(), "rebuilt raw file");
        Ok(())
    }
}

impl Command for ReplaceRaw {
    fn name(&self) -> &str {
        "replace_raw"
    }

    fn run(&mut self, root: &mut Firmware) -> VisitorResult<()> {
        ReplaceRaw::run(self, root)
    }

    fn report(&self, root: &Firmware) -> Report {
        Report::new(
            "replace_raw",
            format!("replaced {} of {} match(es)", self.replaced(), self.matches.len()),
        )
        .with_matches(MatchInfo::collect(root, &self.matches))
    }
}

/// `replace_raw <file-expr> <payload-path>`: replace the content of the
/// matching raw files with the bytes of a file on disk.
pub fn command_spec() -> CommandSpec {
    CommandSpec::new(
        "replace_raw",
        "replace a raw file's content given a GUID or pattern and a payload file",
        2,
        |args: &[String], config: &EditConfig| {
            let predicate = file_expr(&args[0])?;
            let path = Path::new(&args[1]);
            let new_raw = std::fs::read(path).map_err(|source| VisitorError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let replace = ReplaceRaw::new(predicate, new_raw).with_policy(config.match_policy);
            Ok(Box::new(replace) as Box<dyn Command>)
        },
    )
}
