//! Foundation types for fvkit.
//!
//! Every other fvkit crate depends on `fvkit-types`.
//!
//! # Key Types
//!
//! - [`Guid`] -- UEFI GUID with on-flash byte order and canonical text form
//! - [`FileType`] -- firmware file type tag
//! - [`SectionType`] -- section type tag
//! - [`FileAttributes`] -- FFS file attribute bits

pub mod attributes;
pub mod error;
pub mod file_type;
pub mod guid;
pub mod section_type;

pub use attributes::FileAttributes;
pub use error::TypeError;
pub use file_type::FileType;
pub use guid::Guid;
pub use section_type::SectionType;
