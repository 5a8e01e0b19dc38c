use serde::{Deserialize, Serialize};
use tracing::debug;

use fvkit_types::{FileAttributes, FileType, Guid};

use crate::checksum::{checksum8, complement8};
use crate::error::{TreeError, TreeResult};
use crate::node::Firmware;

/// Length of `EFI_FFS_FILE_HEADER`.
pub const FILE_HEADER_MIN_LENGTH: usize = 0x18;
/// Length of `EFI_FFS_FILE_HEADER2` (adds the 64-bit extended size).
pub const FILE_HEADER_EXT_MIN_LENGTH: usize = 0x20;
/// Largest value the 24-bit size field can hold.
pub const MAX_FFS2_FILE_SIZE: u64 = 0xFF_FFFF;
/// File checksum stored when the checksum attribute is clear.
pub const FILE_DATA_VALID_CHECKSUM: u8 = 0xAA;
/// Header construction, header valid and data valid bits.
pub const FILE_STATE_VALID: u8 = 0x07;

/// Sections inside a file start on 4-byte boundaries.
const SECTION_ALIGNMENT: usize = 4;

// ---------------------------------------------------------------------------
// FileHeader
// ---------------------------------------------------------------------------

/// `EFI_FFS_FILE_HEADER` / `EFI_FFS_FILE_HEADER2`, little endian.
///
/// ```text
/// 0x00 Name (GUID)          0x13 Attributes
/// 0x10 IntegrityCheck.Header 0x14 Size[3]
/// 0x11 IntegrityCheck.File   0x17 State
/// 0x12 Type                  0x18 ExtendedSize (large files only)
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    pub guid: Guid,
    pub header_checksum: u8,
    pub file_checksum: u8,
    pub file_type: FileType,
    pub attributes: FileAttributes,
    /// The 24-bit size field. Zero for large files.
    pub size: u32,
    pub state: u8,
    /// Total file size for large files, zero otherwise.
    #[serde(default)]
    pub extended_size: u64,
}

impl FileHeader {
    /// A blank header for a new file; size and checksums are filled in by
    /// [`File::checksum_and_assemble`].
    pub fn new(guid: Guid, file_type: FileType, attributes: FileAttributes) -> Self {
        Self {
            guid,
            header_checksum: 0,
            file_checksum: 0,
            file_type,
            attributes,
            size: 0,
            state: 0,
            extended_size: 0,
        }
    }

    /// Encoded header length.
    pub fn header_len(&self) -> usize {
        if self.attributes.is_large() {
            FILE_HEADER_EXT_MIN_LENGTH
        } else {
            FILE_HEADER_MIN_LENGTH
        }
    }

    /// Total file size (header plus data) recorded in the header.
    pub fn total_size(&self) -> u64 {
        if self.attributes.is_large() {
            self.extended_size
        } else {
            u64::from(self.size)
        }
    }

    /// Encode to on-flash bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header_len());
        out.extend_from_slice(self.guid.as_bytes());
        out.push(self.header_checksum);
        out.push(self.file_checksum);
        out.push(self.file_type.as_u8());
        out.push(self.attributes.bits());
        out.extend_from_slice(&self.size.to_le_bytes()[..3]);
        out.push(self.state);
        if self.attributes.is_large() {
            out.extend_from_slice(&self.extended_size.to_le_bytes());
        }
        out
    }

    /// Decode from the start of `data`.
    pub fn parse(data: &[u8]) -> TreeResult<Self> {
        if data.len() < FILE_HEADER_MIN_LENGTH {
            return Err(TreeError::Truncated {
                what: "file header",
                need: FILE_HEADER_MIN_LENGTH,
                have: data.len(),
            });
        }
        let attributes = FileAttributes::from_bits_retain(data[0x13]);
        let extended_size = if attributes.is_large() {
            let raw: [u8; 8] = data
                .get(FILE_HEADER_MIN_LENGTH..FILE_HEADER_EXT_MIN_LENGTH)
                .and_then(|s| s.try_into().ok())
                .ok_or(TreeError::Truncated {
                    what: "extended file header",
                    need: FILE_HEADER_EXT_MIN_LENGTH,
                    have: data.len(),
                })?;
            u64::from_le_bytes(raw)
        } else {
            0
        };
        Ok(Self {
            guid: Guid::from_slice(data)?,
            header_checksum: data[0x10],
            file_checksum: data[0x11],
            file_type: FileType::from_u8(data[0x12]),
            attributes,
            size: u32::from_le_bytes([data[0x14], data[0x15], data[0x16], 0]),
            state: data[0x17],
            extended_size,
        })
    }

    /// Header bytes as the header checksum sees them: state and file
    /// checksum are excluded (treated as zero).
    fn checksum_view(&self) -> Vec<u8> {
        let mut view = self.clone();
        view.file_checksum = 0;
        view.state = 0;
        view.encode()
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// A firmware file.
///
/// Raw files keep their payload as opaque bytes. Section-bearing files also
/// keep the decoded sections as children; their `data` is the section
/// stream those sections were assembled from.
///
/// The serialized form is always `header ++ data`. Every method that changes
/// `data` re-derives the size field and both checksums.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub header: FileHeader,
    #[serde(with = "hex")]
    data: Vec<u8>,
    #[serde(default)]
    pub sections: Vec<Firmware>,
    /// Byte value of erased flash in the containing volume.
    #[serde(default = "default_erase_polarity")]
    pub erase_polarity: u8,
    /// Whether the containing volume accepts FFS3 large files.
    #[serde(default)]
    pub large_files: bool,
}

fn default_erase_polarity() -> u8 {
    0xFF
}

impl File {
    /// Create a raw-type file holding `payload`.
    pub fn raw(guid: Guid, payload: Vec<u8>) -> TreeResult<Self> {
        Self::with_data(
            FileHeader::new(guid, FileType::Raw, FileAttributes::empty()),
            payload,
        )
    }

    /// Create a file from a header and data, computing size and checksums.
    pub fn with_data(header: FileHeader, data: Vec<u8>) -> TreeResult<Self> {
        let mut file = Self {
            header,
            data: Vec::new(),
            sections: Vec::new(),
            erase_polarity: default_erase_polarity(),
            large_files: false,
        };
        file.checksum_and_assemble(data)?;
        Ok(file)
    }

    /// Create a section-bearing file. The section stream is assembled from
    /// `sections`, each padded to a 4-byte boundary.
    pub fn with_sections(header: FileHeader, sections: Vec<Firmware>) -> TreeResult<Self> {
        let mut file = Self {
            header,
            data: Vec::new(),
            sections,
            erase_polarity: default_erase_polarity(),
            large_files: false,
        };
        file.reassemble_sections()?;
        Ok(file)
    }

    /// Decode a single file from `buf`. Sections are not decoded.
    pub fn parse(buf: &[u8], erase_polarity: u8) -> TreeResult<Self> {
        let header = FileHeader::parse(buf)?;
        let start = header.header_len();
        let end = usize::try_from(header.total_size()).unwrap_or(usize::MAX);
        let data = buf.get(start..end).ok_or(TreeError::Truncated {
            what: "file data",
            need: end,
            have: buf.len(),
        })?;
        Ok(Self {
            header,
            data: data.to_vec(),
            sections: Vec::new(),
            erase_polarity,
            large_files: false,
        })
    }

    pub fn guid(&self) -> Guid {
        self.header.guid
    }

    pub fn file_type(&self) -> FileType {
        self.header.file_type
    }

    pub fn is_raw(&self) -> bool {
        self.header.file_type == FileType::Raw
    }

    /// The file's data: the payload for raw files, the section stream
    /// otherwise.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The serialized form: header followed by data.
    pub fn buf(&self) -> Vec<u8> {
        let mut out = self.header.encode();
        out.extend_from_slice(&self.data);
        out
    }

    /// Set the size fields for `data_len` bytes of data.
    ///
    /// Files that no longer fit the 24-bit field switch to the extended
    /// header when the volume allows it; files that fit again switch back.
    pub fn set_size(&mut self, data_len: usize) -> TreeResult<()> {
        let data_len = data_len as u64;
        let small = FILE_HEADER_MIN_LENGTH as u64 + data_len;
        if small <= MAX_FFS2_FILE_SIZE {
            self.header.attributes.remove(FileAttributes::LARGE_FILE);
            self.header.size = small as u32;
            self.header.extended_size = 0;
            return Ok(());
        }
        if !self.large_files {
            return Err(TreeError::FileTooLarge {
                guid: self.header.guid,
                size: small,
                max: MAX_FFS2_FILE_SIZE,
            });
        }
        self.header.attributes.insert(FileAttributes::LARGE_FILE);
        self.header.size = 0;
        self.header.extended_size = FILE_HEADER_EXT_MIN_LENGTH as u64 + data_len;
        Ok(())
    }

    /// Replace the data, then recompute the size field, both checksums and
    /// the state byte so the file validates.
    pub fn checksum_and_assemble(&mut self, data: Vec<u8>) -> TreeResult<()> {
        self.set_size(data.len())?;
        self.data = data;

        self.header.header_checksum = 0;
        self.header.header_checksum = complement8(&self.header.checksum_view());
        self.header.file_checksum = if self.header.attributes.has_checksum() {
            complement8(&self.data)
        } else {
            FILE_DATA_VALID_CHECKSUM
        };
        self.header.state = if self.erase_polarity == 0xFF {
            !FILE_STATE_VALID
        } else {
            FILE_STATE_VALID
        };

        debug!(
            guid = %self.header.guid,
            size = self.header.total_size(),
            "file assembled"
        );
        Ok(())
    }

    /// Rebuild the section stream from `sections` and re-checksum.
    pub fn reassemble_sections(&mut self) -> TreeResult<()> {
        let mut stream = Vec::new();
        for section in &self.sections {
            while stream.len() % SECTION_ALIGNMENT != 0 {
                stream.push(0);
            }
            stream.extend_from_slice(&section.buf()?);
        }
        self.checksum_and_assemble(stream)
    }

    /// Returns `true` if the header and data checksums both validate.
    pub fn checksums_valid(&self) -> bool {
        let header_ok = checksum8(&self.header.checksum_view()) == 0;
        let data_ok = if self.header.attributes.has_checksum() {
            checksum8(&self.data).wrapping_add(self.header.file_checksum) == 0
        } else {
            self.header.file_checksum == FILE_DATA_VALID_CHECKSUM
        };
        header_ok && data_ok
    }

    /// Name from the first user-interface section, searched depth first.
    pub fn ui_name(&self) -> Option<String> {
        fn search(nodes: &[Firmware]) -> Option<String> {
            nodes.iter().find_map(|node| match node {
                Firmware::Section(s) => s.ui_name().or_else(|| search(&s.encapsulated)),
                _ => None,
            })
        }
        search(&self.sections)
    }
}
