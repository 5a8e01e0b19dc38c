use serde::{Deserialize, Serialize};
use tracing::warn;

use fvkit_types::SectionType;

use crate::error::TreeResult;
use crate::node::Firmware;

/// Length of `EFI_COMMON_SECTION_HEADER`.
pub const SECTION_HEADER_LENGTH: usize = 4;
/// Length of `EFI_COMMON_SECTION_HEADER2`.
pub const SECTION_HEADER_EXT_LENGTH: usize = 8;
const SECTION_SIZE_EXTENDED: u32 = 0xFF_FFFF;

/// A file section.
///
/// `data` is everything after the common header. For encapsulation sections
/// it holds the encapsulation-specific header and the encoded payload as the
/// decoder found them; `encapsulated` holds the decoded children.
/// Only firmware volume images are re-encoded, by [`Section::refresh`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_type: SectionType,
    #[serde(with = "hex")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub encapsulated: Vec<Firmware>,
}

impl Section {
    pub fn new(section_type: SectionType, data: Vec<u8>) -> Self {
        Self {
            section_type,
            data,
            encapsulated: Vec::new(),
        }
    }

    /// A user-interface section carrying `name` as NUL-terminated UCS-2.
    pub fn user_interface(name: &str) -> Self {
        let mut data: Vec<u8> = name.encode_utf16().flat_map(u16::to_le_bytes).collect();
        data.extend_from_slice(&[0, 0]);
        Self::new(SectionType::UserInterface, data)
    }

    /// Encoded header length for the current data.
    pub fn header_len(&self) -> usize {
        if (SECTION_HEADER_LENGTH + self.data.len()) as u64 >= u64::from(SECTION_SIZE_EXTENDED) {
            SECTION_HEADER_EXT_LENGTH
        } else {
            SECTION_HEADER_LENGTH
        }
    }

    /// The serialized form: common header followed by data.
    pub fn buf(&self) -> TreeResult<Vec<u8>> {
        let header_len = self.header_len();
        let total = header_len + self.data.len();
        let mut out = Vec::with_capacity(total);
        if header_len == SECTION_HEADER_EXT_LENGTH {
            out.extend_from_slice(&SECTION_SIZE_EXTENDED.to_le_bytes()[..3]);
            out.push(self.section_type.as_u8());
            out.extend_from_slice(&(total as u32).to_le_bytes());
        } else {
            out.extend_from_slice(&(total as u32).to_le_bytes()[..3]);
            out.push(self.section_type.as_u8());
        }
        out.extend_from_slice(&self.data);
        Ok(out)
    }

    /// Rebuild `data` from `encapsulated`.
    ///
    /// A firmware volume image section holding one volume takes that
    /// volume's assembled bytes. Compressed and GUID-defined sections keep
    /// their stored payload.
    pub fn refresh(&mut self) -> TreeResult<()> {
        match (self.section_type, self.encapsulated.as_slice()) {
            (SectionType::FirmwareVolumeImage, [Firmware::Volume(volume)]) => {
                self.data = volume.assemble()?;
            }
            (_, []) => {}
            (section_type, _) => {
                warn!(%section_type, "cannot re-encode section, keeping stored payload");
            }
        }
        Ok(())
    }

    /// The name carried by a user-interface section.
    pub fn ui_name(&self) -> Option<String> {
        if self.section_type != SectionType::UserInterface {
            return None;
        }
        let units: Vec<u16> = self
            .data
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .take_while(|u| *u != 0)
            .collect();
        Some(String::from_utf16_lossy(&units))
    }
}
