use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// `EFI_FFS_FILE_ATTRIBUTES`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FileAttributes: u8 {
        /// FFS3 large file: 64-bit `ExtendedSize` follows the header.
        const LARGE_FILE = 0x01;
        const DATA_ALIGNMENT_2 = 0x02;
        const FIXED = 0x04;
        const DATA_ALIGNMENT = 0x38;
        /// The file checksum covers the data instead of holding 0xAA.
        const CHECKSUM = 0x40;
    }
}

impl FileAttributes {
    /// Returns `true` for FFS3 large files.
    pub fn is_large(&self) -> bool {
        self.contains(Self::LARGE_FILE)
    }

    /// Returns `true` when the data checksum must be computed.
    pub fn has_checksum(&self) -> bool {
        self.contains(Self::CHECKSUM)
    }
}
