use std::collections::BTreeMap;

use tracing::debug;

use crate::command::{Command, CommandSpec};
use crate::config::EditConfig;
use crate::error::{VisitorError, VisitorResult};
use crate::{count, find, replace_raw};

/// Name-indexed table of the commands available to a command line.
#[derive(Clone, Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, CommandSpec>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `find`, `count` and `replace_raw`.
    pub fn with_builtin_commands() -> Self {
        let mut registry = Self::new();
        for spec in [
            find::command_spec(),
            count::command_spec(),
            replace_raw::command_spec(),
        ] {
            registry.commands.insert(spec.name, spec);
        }
        registry
    }

    pub fn register(&mut self, spec: CommandSpec) -> VisitorResult<()> {
        if self.commands.contains_key(spec.name) {
            return Err(VisitorError::DuplicateCommand(spec.name.to_string()));
        }
        self.commands.insert(spec.name, spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Registered commands, sorted by name.
    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.values()
    }

    /// Construct a single command from its name and arguments.
    pub fn build(
        &self,
        name: &str,
        args: &[String],
        config: &EditConfig,
    ) -> VisitorResult<Box<dyn Command>> {
        let spec = self
            .get(name)
            .ok_or_else(|| VisitorError::UnknownCommand(name.to_string()))?;
        if args.len() != spec.arg_count {
            return Err(VisitorError::ArgumentCount {
                command: name.to_string(),
                expected: spec.arg_count,
                actual: args.len(),
            });
        }
        debug!(command = name, ?args, "building command");
        (spec.constructor)(args, config)
    }

    /// Split a flat argument list into a chain of commands.
    ///
    /// Each command name is followed by exactly its own arguments, e.g.
    /// `find shell replace_raw <guid> payload.bin count`.
    pub fn parse_chain(
        &self,
        args: &[String],
        config: &EditConfig,
    ) -> VisitorResult<Vec<Box<dyn Command>>> {
        let mut chain = Vec::new();
        let mut rest = args;
        while let Some((name, tail)) = rest.split_first() {
            let spec = self
                .get(name)
                .ok_or_else(|| VisitorError::UnknownCommand(name.clone()))?;
            if tail.len() < spec.arg_count {
                return Err(VisitorError::ArgumentCount {
                    command: name.clone(),
                    expected: spec.arg_count,
                    actual: tail.len(),
                });
            }
            let (own, next) = tail.split_at(spec.arg_count);
            chain.push(self.build(name, own, config)?);
            rest = next;
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_image, RAW_GUID};

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builtins_are_sorted() {
        let registry = CommandRegistry::with_builtin_commands();
        let names: Vec<&str> = registry.specs().map(|s| s.name).collect();
        assert_eq!(names, vec!["count", "find", "replace_raw"]);
    }

    #[test]
    fn builtin_names_are_distinct() {
        let mut registry = CommandRegistry::new();
        for spec in [
            find::command_spec(),
            count::command_spec(),
            replace_raw::command_spec(),
        ] {
            registry.register(spec).unwrap();
        }
        assert_eq!(
            registry.specs().count(),
            CommandRegistry::with_builtin_commands().specs().count()
        );
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = CommandRegistry::with_builtin_commands();
        let err = registry.register(find::command_spec()).unwrap_err();
        assert!(matches!(err, VisitorError::DuplicateCommand(name) if name == "find"));
    }

    #[test]
    fn unknown_command() {
        let registry = CommandRegistry::with_builtin_commands();
        let err = registry
            .build("extract", &[], &EditConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "unknown command: extract");
    }

    #[test]
    fn wrong_argument_count() {
        let registry = CommandRegistry::with_builtin_commands();
        let err = registry
            .build("find", &[], &EditConfig::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            VisitorError::ArgumentCount { expected: 1, actual: 0, .. }
        ));
    }

    #[test]
    fn chain_splits_by_argument_count() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("payload.bin");
        std::fs::write(&payload, b"new").unwrap();

        let registry = CommandRegistry::with_builtin_commands();
        let args = strings(&[
            "find",
            "shell",
            "replace_raw",
            &RAW_GUID.to_string(),
            &payload.display().to_string(),
            "count",
        ]);
        let mut chain = registry.parse_chain(&args, &EditConfig::default()).unwrap();
        let names: Vec<&str> = chain.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["find", "replace_raw", "count"]);

        let mut image = sample_image();
        for command in chain.iter_mut() {
            command.run(&mut image).unwrap();
        }
        assert_eq!(chain[0].report(&image).matches.len(), 1);
        assert_eq!(chain[2].report(&image).counts["file"], 5);
    }

    #[test]
    fn chain_with_missing_arguments() {
        let registry = CommandRegistry::with_builtin_commands();
        let err = registry
            .parse_chain(&strings(&["count", "replace_raw", "guid"]), &EditConfig::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            VisitorError::ArgumentCount { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn empty_chain() {
        let registry = CommandRegistry::with_builtin_commands();
        assert!(registry
            .parse_chain(&[], &EditConfig::default())
            .unwrap()
            .is_empty());
    }
}
