use serde::{Deserialize, Serialize};
use tracing::warn;

use fvkit_types::Guid;

use crate::checksum::checksum16;
use crate::error::{TreeError, TreeResult};
use crate::file::File;
use crate::node::Firmware;

/// Files inside a volume start on 8-byte boundaries.
pub const FILE_ALIGNMENT: usize = 8;

/// `EFI_FIRMWARE_FILE_SYSTEM2_GUID`.
pub const FFS2_GUID: Guid = Guid::from_bytes([
    0x78, 0xE5, 0x8C, 0x8C, 0x3D, 0x8A, 0x1C, 0x4F, 0x99, 0x35, 0x89, 0x61, 0x85, 0xC3, 0x2D, 0xD3,
]);
/// `EFI_FIRMWARE_FILE_SYSTEM3_GUID`. Volumes of this type accept large files.
pub const FFS3_GUID: Guid = Guid::from_bytes([
    0x7A, 0xC0, 0x73, 0x54, 0xCB, 0x3D, 0xCA, 0x4D, 0xBD, 0x6F, 0x1E, 0x96, 0x89, 0xE7, 0x34, 0x9A,
]);

/// A firmware volume.
///
/// The header (including block map and extended header) is kept as the
/// decoder produced it. The volume has a fixed length: files are laid out
/// after the header on 8-byte boundaries and the remainder is free space
/// filled with the erase polarity byte.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Name from the extended header, when present.
    #[serde(default)]
    pub fv_name: Option<Guid>,
    pub file_system: Guid,
    pub length: u64,
    pub erase_polarity: u8,
    #[serde(with = "hex")]
    pub header: Vec<u8>,
    #[serde(default)]
    pub files: Vec<Firmware>,
}

impl Volume {
    pub fn new(file_system: Guid, length: u64, header: Vec<u8>) -> Self {
        Self {
            fv_name: None,
            file_system,
            length,
            erase_polarity: 0xFF,
            header,
            files: Vec::new(),
        }
    }

    /// Whether files may use the FFS3 extended header.
    pub fn supports_large_files(&self) -> bool {
        self.file_system == FFS3_GUID
    }

    /// Append a file, adopting this volume's erase polarity and size rules.
    pub fn push_file(&mut self, mut file: File) -> TreeResult<()> {
        file.large_files = self.supports_large_files();
        if file.erase_polarity != self.erase_polarity {
            file.erase_polarity = self.erase_polarity;
            let data = file.data().to_vec();
            file.checksum_and_assemble(data)?;
        }
        self.files.push(Firmware::File(file));
        Ok(())
    }

    /// Returns `true` if the stored header's 16-bit checksum validates.
    pub fn header_checksum_valid(&self) -> bool {
        checksum16(&self.header) == 0
    }

    /// Lay out the volume: header, aligned files, free space up to `length`.
    pub fn assemble(&self) -> TreeResult<Vec<u8>> {
        let mut out = self.header.clone();
        for file in &self.files {
            while out.len() % FILE_ALIGNMENT != 0 {
                out.push(self.erase_polarity);
            }
            out.extend_from_slice(&file.buf()?);
        }
        let used = out.len() as u64;
        if used > self.length {
            warn!(used, length = self.length, "volume contents exceed volume length");
            return Err(TreeError::VolumeOverflow {
                used,
                length: self.length,
            });
        }
        out.resize(self.length as usize, self.erase_polarity);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with_checksum(len: usize) -> Vec<u8> {
        let mut header = vec![0x11u8; len];
        header[0] = 0;
        header[1] = 0;
        let sum = checksum16(&header);
        header[..2].copy_from_slice(&0u16.wrapping_sub(sum).to_le_bytes());
        header
    }

    fn guid(n: u8) -> Guid {
        Guid::from_bytes([n; 16])
    }

    #[test]
    fn known_file_system_guids() {
        assert_eq!(FFS2_GUID.to_string(), "8C8CE578-8A3D-4F1C-9935-896185C32DD3");
        assert_eq!(FFS3_GUID.to_string(), "5473C07A-3DCB-4DCA-BD6F-1E9689E7349A");
    }

    #[test]
    fn assemble_aligns_and_pads() {
        let mut volume = Volume::new(FFS2_GUID, 0x100, header_with_checksum(0x48));
        volume.push_file(File::raw(guid(1), b"abc".to_vec()).unwrap()).unwrap();
        volume.push_file(File::raw(guid(2), b"d".to_vec()).unwrap()).unwrap();

        let image = volume.assemble().unwrap();
        assert_eq!(image.len(), 0x100);
        // First file at 0x48 (already aligned), 27 bytes long.
        assert_eq!(&image[0x48..0x58], guid(1).as_bytes());
        // Second file at the next 8-byte boundary after 0x63.
        assert_eq!(image[0x63], 0xFF);
        assert_eq!(&image[0x68..0x78], guid(2).as_bytes());
        assert!(image[0x68 + 25..].iter().all(|b| *b == 0xFF));
        assert!(volume.header_checksum_valid());
    }

    #[test]
    fn overflow_is_reported() {
        let mut volume = Volume::new(FFS2_GUID, 0x50, vec![0u8; 0x48]);
        volume.push_file(File::raw(guid(1), vec![0u8; 16]).unwrap()).unwrap();
        let err = volume.assemble().unwrap_err();
        assert!(matches!(err, TreeError::VolumeOverflow { used: 0x70, length: 0x50 }));
    }

    #[test]
    fn ffs3_volumes_allow_large_files() {
        let mut volume = Volume::new(FFS3_GUID, 0x1000, vec![0u8; 0x48]);
        volume.push_file(File::raw(guid(1), Vec::new()).unwrap()).unwrap();
        match &volume.files[0] {
            Firmware::File(f) => assert!(f.large_files),
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn push_file_adopts_erase_polarity() {
        let mut volume = Volume::new(FFS2_GUID, 0x100, vec![0u8; 0x48]);
        volume.erase_polarity = 0x00;
        volume.push_file(File::raw(guid(3), b"z".to_vec()).unwrap()).unwrap();
        match &volume.files[0] {
            Firmware::File(f) => {
                assert_eq!(f.header.state, crate::file::FILE_STATE_VALID);
                assert!(f.checksums_valid());
            }
            other => panic!("expected file, got {other:?}"),
        }
    }
}
