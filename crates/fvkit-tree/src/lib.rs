//! Firmware tree model for fvkit.
//!
//! A decoded UEFI image is held as a tree of [`Firmware`] nodes: regions
//! contain volumes, volumes contain files, files contain sections, and
//! encapsulation sections contain further sections. Every node can produce
//! its serialized form with [`Firmware::buf`].
//!
//! # Node Kinds
//!
//! - [`Region`] -- a run of volumes and padding
//! - [`Volume`] -- fixed-length firmware volume
//! - [`File`] -- FFS file; keeps its size field and checksums in step with its data
//! - [`Section`] -- file section, possibly encapsulating more sections
//! - [`Padding`] -- opaque bytes
//!
//! # Traversal
//!
//! Generic operations implement [`Visitor`] and are driven with
//! [`Firmware::apply`], which visits nodes pre-order and stops at the first
//! error.
//!
//! # Invariants
//!
//! 1. A parent exclusively owns its children; there is no sharing.
//! 2. After [`File::checksum_and_assemble`] the file's size field equals its
//!    header length plus data length, and both checksums validate.
//! 3. Volumes never grow: contents that exceed the volume length fail to
//!    assemble.

pub mod checksum;
pub mod error;
pub mod file;
pub mod node;
pub mod path;
pub mod section;
pub mod visitor;
pub mod volume;

pub use error::{TreeError, TreeResult};
pub use file::{File, FileHeader, FILE_HEADER_EXT_MIN_LENGTH, FILE_HEADER_MIN_LENGTH};
pub use node::{Firmware, NodeKind, Padding, Region};
pub use path::NodePath;
pub use section::Section;
pub use visitor::Visitor;
pub use volume::{Volume, FFS2_GUID, FFS3_GUID};
