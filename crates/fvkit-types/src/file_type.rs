use std::fmt;

use serde::{Deserialize, Serialize};

/// Firmware file type tag (`EFI_FV_FILETYPE`).
///
/// Only `Raw` is interpreted by the editing visitors; the rest exist so that
/// decoded trees can be described and filtered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum FileType {
    /// Opaque payload, no section structure.
    Raw,
    Freeform,
    SecurityCore,
    PeiCore,
    DxeCore,
    Peim,
    Driver,
    CombinedPeimDriver,
    Application,
    Mm,
    FirmwareVolumeImage,
    CombinedMmDxe,
    MmCore,
    MmStandalone,
    MmCoreStandalone,
    /// Volume padding file.
    Pad,
    /// OEM, debug or FFS-reserved values without a dedicated variant.
    Other(u8),
}

impl FileType {
    /// The on-disk byte.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Raw => 0x01,
            Self::Freeform => 0x02,
            Self::SecurityCore => 0x03,
            Self::PeiCore => 0x04,
            Self::DxeCore => 0x05,
            Self::Peim => 0x06,
            Self::Driver => 0x07,
            Self::CombinedPeimDriver => 0x08,
            Self::Application => 0x09,
            Self::Mm => 0x0A,
            Self::FirmwareVolumeImage => 0x0B,
            Self::CombinedMmDxe => 0x0C,
            Self::MmCore => 0x0D,
            Self::MmStandalone => 0x0E,
            Self::MmCoreStandalone => 0x0F,
            Self::Pad => 0xF0,
            Self::Other(v) => *v,
        }
    }

    /// Decode an on-disk byte. Unknown values map to [`FileType::Other`].
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x01 => Self::Raw,
            0x02 => Self::Freeform,
            0x03 => Self::SecurityCore,
            0x04 => Self::PeiCore,
            0x05 => Self::DxeCore,
            0x06 => Self::Peim,
            0x07 => Self::Driver,
            0x08 => Self::CombinedPeimDriver,
            0x09 => Self::Application,
            0x0A => Self::Mm,
            0x0B => Self::FirmwareVolumeImage,
            0x0C => Self::CombinedMmDxe,
            0x0D => Self::MmCore,
            0x0E => Self::MmStandalone,
            0x0F => Self::MmCoreStandalone,
            0xF0 => Self::Pad,
            other => Self::Other(other),
        }
    }

    /// Whether files of this type carry a section stream.
    pub fn has_sections(&self) -> bool {
        !matches!(self, Self::Raw | Self::Pad | Self::Other(_))
    }
}

impl From<u8> for FileType {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl From<FileType> for u8 {
    fn from(value: FileType) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "EFI_FV_FILETYPE_RAW"),
            Self::Freeform => write!(f, "EFI_FV_FILETYPE_FREEFORM"),
            Self::SecurityCore => write!(f, "EFI_FV_FILETYPE_SECURITY_CORE"),
            Self::PeiCore => write!(f, "EFI_FV_FILETYPE_PEI_CORE"),
            Self::DxeCore => write!(f, "EFI_FV_FILETYPE_DXE_CORE"),
            Self::Peim => write!(f, "EFI_FV_FILETYPE_PEIM"),
            Self::Driver => write!(f, "EFI_FV_FILETYPE_DRIVER"),
            Self::CombinedPeimDriver => write!(f, "EFI_FV_FILETYPE_COMBINED_PEIM_DRIVER"),
            Self::Application => write!(f, "EFI_FV_FILETYPE_APPLICATION"),
            Self::Mm => write!(f, "EFI_FV_FILETYPE_MM"),
            Self::FirmwareVolumeImage => write!(f, "EFI_FV_FILETYPE_FIRMWARE_VOLUME_IMAGE"),
            Self::CombinedMmDxe => write!(f, "EFI_FV_FILETYPE_COMBINED_MM_DXE"),
            Self::MmCore => write!(f, "EFI_FV_FILETYPE_MM_CORE"),
            Self::MmStandalone => write!(f, "EFI_FV_FILETYPE_MM_STANDALONE"),
            Self::MmCoreStandalone => write!(f, "EFI_FV_FILETYPE_MM_CORE_STANDALONE"),
            Self::Pad => write!(f, "EFI_FV_FILETYPE_FFS_PAD"),
            Self::Other(v) => write!(f, "EFI_FV_FILETYPE_{v:#04X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_mapping_is_stable() {
        for byte in 0u8..=0xFF {
            assert_eq!(FileType::from_u8(byte).as_u8(), byte);
        }
    }

    #[test]
    fn unknown_bytes_become_other() {
        assert_eq!(FileType::from_u8(0xC3), FileType::Other(0xC3));
        assert_eq!(FileType::from_u8(0x01), FileType::Raw);
    }

    #[test]
    fn section_bearing_types() {
        assert!(!FileType::Raw.has_sections());
        assert!(!FileType::Pad.has_sections());
        assert!(FileType::Driver.has_sections());
        assert!(FileType::Freeform.has_sections());
    }

    #[test]
    fn serde_uses_the_tag_byte() {
        assert_eq!(serde_json::to_string(&FileType::Raw).unwrap(), "1");
        assert_eq!(serde_json::to_string(&FileType::Other(0xC3)).unwrap(), "195");
        let raw: FileType = serde_json::from_str("1").unwrap();
        assert_eq!(raw, FileType::Raw);
        // A known byte never comes back as `Other`.
        assert!(serde_json::from_str::<FileType>("{\"other\":1}").is_err());
    }

    #[test]
    fn display_names() {
        assert_eq!(FileType::Raw.to_string(), "EFI_FV_FILETYPE_RAW");
        assert_eq!(FileType::Other(0xE1).to_string(), "EFI_FV_FILETYPE_0xE1");
    }
}
