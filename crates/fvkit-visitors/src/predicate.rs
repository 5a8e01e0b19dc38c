//! Composable node predicates.
//!
//! A [`Predicate`] is a cheap-to-clone boolean test over a single node.
//! Predicates never mutate what they inspect; they are combined by value
//! with [`and`], [`or`] and [`not`].

use std::fmt;
use std::sync::Arc;

use regex::RegexBuilder;

use fvkit_tree::{Firmware, NodeKind};
use fvkit_types::{FileType, Guid};

use crate::error::{VisitorError, VisitorResult};

/// A pure test over a firmware node.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Firmware) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(test: impl Fn(&Firmware) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }

    /// Evaluate the predicate against `node`.
    pub fn test(&self, node: &Firmware) -> bool {
        (self.0)(node)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

/// True iff every predicate holds. Stops at the first false one; an empty
/// list is true.
pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    let predicates: Vec<Predicate> = predicates.into_iter().collect();
    Predicate::new(move |node| predicates.iter().all(|p| p.test(node)))
}

/// True iff any predicate holds. Stops at the first true one; an empty list
/// is false.
pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    let predicates: Vec<Predicate> = predicates.into_iter().collect();
    Predicate::new(move |node| predicates.iter().any(|p| p.test(node)))
}

pub fn not(predicate: Predicate) -> Predicate {
    Predicate::new(move |node| !predicate.test(node))
}

pub fn always() -> Predicate {
    Predicate::new(|_| true)
}

pub fn never() -> Predicate {
    Predicate::new(|_| false)
}

// ---------------------------------------------------------------------------
// Canonical predicates
// ---------------------------------------------------------------------------

/// Matches nodes of the given kind.
pub fn kind_is(kind: NodeKind) -> Predicate {
    Predicate::new(move |node| node.kind() == kind)
}

/// Matches nodes whose identifying GUID equals `guid`. Kinds without an
/// identifier never match.
pub fn guid_is(guid: Guid) -> Predicate {
    Predicate::new(move |node| node.guid() == Some(guid))
}

/// Matches files of the given type.
pub fn file_type_is(file_type: FileType) -> Predicate {
    Predicate::new(move |node| {
        node.as_file()
            .is_some_and(|f| f.file_type() == file_type)
    })
}

/// Matches raw-type files.
pub fn raw_file() -> Predicate {
    and([kind_is(NodeKind::File), file_type_is(FileType::Raw)])
}

/// Matches files whose GUID text or UI name matches `pattern` in full,
/// ignoring case.
pub fn file_pattern(pattern: &str) -> VisitorResult<Predicate> {
    let re = RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .build()
        .map_err(|source| VisitorError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
    Ok(Predicate::new(move |node| match node.as_file() {
        Some(file) => {
            re.is_match(&file.guid().to_string())
                || file.ui_name().is_some_and(|name| re.is_match(&name))
        }
        None => false,
    }))
}

/// Parse a file match expression: an exact GUID if it parses as one,
/// otherwise a pattern as in [`file_pattern`].
pub fn file_expr(expr: &str) -> VisitorResult<Predicate> {
    match expr.parse::<Guid>() {
        Ok(guid) => Ok(and([kind_is(NodeKind::File), guid_is(guid)])),
        Err(_) => file_pattern(expr),
    }
}
