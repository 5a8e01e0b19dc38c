//! Tree operations over decoded firmware images.
//!
//! Every operation here is a [`Visitor`](fvkit_tree::Visitor) applied to
//! the root of a [`Firmware`](fvkit_tree::Firmware) tree. Operations are
//! selected with [`Predicate`] values built from the combinators in
//! [`predicate`].
//!
//! - [`Find`] collects the paths of matching nodes without touching the tree.
//! - [`Count`] tallies nodes by kind and file type.
//! - [`ReplaceRaw`] finds raw files and rewrites their payload, keeping size
//!   fields and checksums valid.
//!
//! The [`CommandRegistry`] builds these from textual arguments so a command
//! line can chain them.
//!
//! # Quick Start
//!
//! ```rust
//! use fvkit_tree::{File, Firmware, Region, Volume, FFS2_GUID};
//! use fvkit_types::Guid;
//! use fvkit_visitors::{predicate, ReplaceRaw};
//!
//! let guid = Guid::from_bytes([7; 16]);
//! let mut volume = Volume::new(FFS2_GUID, 0x100, vec![0; 0x48]);
//! volume.push_file(File::raw(guid, b"old".to_vec()).unwrap()).unwrap();
//! let mut root: Firmware = Region { name: "bios".into(), elements: vec![volume.into()] }.into();
//!
//! let mut replace = ReplaceRaw::new(predicate::guid_is(guid), b"new".to_vec());
//! replace.run(&mut root).unwrap();
//! assert_eq!(replace.replaced(), 1);
//! ```

pub mod command;
pub mod config;
pub mod count;
pub mod error;
pub mod find;
pub mod predicate;
pub mod registry;
pub mod replace_raw;

#[cfg(test)]
mod fixtures;

pub use command::{Command, CommandSpec, MatchInfo, Report};
pub use config::{EditConfig, MatchPolicy, OutputFormat};
pub use count::Count;
pub use error::{VisitorError, VisitorResult};
pub use find::Find;
pub use predicate::Predicate;
pub use registry::CommandRegistry;
pub use replace_raw::ReplaceRaw;
