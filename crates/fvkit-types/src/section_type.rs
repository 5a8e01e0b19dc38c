use std::fmt;

use serde::{Deserialize, Serialize};

/// Section type tag (`EFI_SECTION_TYPE`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum SectionType {
    Compression,
    GuidDefined,
    Disposable,
    Pe32,
    Pic,
    Te,
    DxeDepex,
    Version,
    UserInterface,
    Compatibility16,
    FirmwareVolumeImage,
    FreeformSubtypeGuid,
    Raw,
    PeiDepex,
    MmDepex,
    Other(u8),
}

impl SectionType {
    /// The on-disk byte.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Compression => 0x01,
            Self::GuidDefined => 0x02,
            Self::Disposable => 0x03,
            Self::Pe32 => 0x10,
            Self::Pic => 0x11,
            Self::Te => 0x12,
            Self::DxeDepex => 0x13,
            Self::Version => 0x14,
            Self::UserInterface => 0x15,
            Self::Compatibility16 => 0x16,
            Self::FirmwareVolumeImage => 0x17,
            Self::FreeformSubtypeGuid => 0x18,
            Self::Raw => 0x19,
            Self::PeiDepex => 0x1B,
            Self::MmDepex => 0x1C,
            Self::Other(v) => *v,
        }
    }

    /// Decode an on-disk byte.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x01 => Self::Compression,
            0x02 => Self::GuidDefined,
            0x03 => Self::Disposable,
            0x10 => Self::Pe32,
            0x11 => Self::Pic,
            0x12 => Self::Te,
            0x13 => Self::DxeDepex,
            0x14 => Self::Version,
            0x15 => Self::UserInterface,
            0x16 => Self::Compatibility16,
            0x17 => Self::FirmwareVolumeImage,
            0x18 => Self::FreeformSubtypeGuid,
            0x19 => Self::Raw,
            0x1B => Self::PeiDepex,
            0x1C => Self::MmDepex,
            other => Self::Other(other),
        }
    }

    /// Encapsulation sections hold further sections.
    pub fn is_encapsulation(&self) -> bool {
        matches!(self, Self::Compression | Self::GuidDefined | Self::Disposable)
    }
}

impl From<u8> for SectionType {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl From<SectionType> for u8 {
    fn from(value: SectionType) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compression => write!(f, "EFI_SECTION_COMPRESSION"),
            Self::GuidDefined => write!(f, "EFI_SECTION_GUID_DEFINED"),
            Self::Disposable => write!(f, "EFI_SECTION_DISPOSABLE"),
            Self::Pe32 => write!(f, "EFI_SECTION_PE32"),
            Self::Pic => write!(f, "EFI_SECTION_PIC"),
            Self::Te => write!(f, "EFI_SECTION_TE"),
            Self::DxeDepex => write!(f, "EFI_SECTION_DXE_DEPEX"),
            Self::Version => write!(f, "EFI_SECTION_VERSION"),
            Self::UserInterface => write!(f, "EFI_SECTION_USER_INTERFACE"),
            Self::Compatibility16 => write!(f, "EFI_SECTION_COMPATIBILITY16"),
            Self::FirmwareVolumeImage => write!(f, "EFI_SECTION_FIRMWARE_VOLUME_IMAGE"),
            Self::FreeformSubtypeGuid => write!(f, "EFI_SECTION_FREEFORM_SUBTYPE_GUID"),
            Self::Raw => write!(f, "EFI_SECTION_RAW"),
            Self::PeiDepex => write!(f, "EFI_SECTION_PEI_DEPEX"),
            Self::MmDepex => write!(f, "EFI_SECTION_MM_DEPEX"),
            Self::Other(v) => write!(f, "EFI_SECTION_{v:#04X}"),
        }
    }
}
