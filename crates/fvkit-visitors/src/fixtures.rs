//! A small decoded image shared by the tests in this crate.
//!
//! ```text
//! /          region
//! /0         volume (FFS2)
//! /0/0       file RAW_GUID, raw, "old"
//! /0/1       file DRIVER_GUID, driver
//! /0/1/0       section user interface "Shell"
//! /0/1/1       section PE32
//! /0/2       file FV_IMAGE_GUID, firmware volume image
//! /0/2/0       section firmware volume image
//! /0/2/0/0       volume NESTED_FV_GUID
//! /0/2/0/0/0       file NESTED_RAW_GUID, raw, "nested"
//! /0/3       file FREEFORM_GUID, freeform
//! /0/3/0       section raw
//! /1         padding
//! ```

use fvkit_tree::{File, FileHeader, Firmware, Padding, Region, Section, Volume, FFS2_GUID};
use fvkit_types::{FileAttributes, FileType, Guid, SectionType};

pub const RAW_GUID: Guid = Guid::from_bytes([
    0xF6, 0xCE, 0x1C, 0xDF, 0x01, 0xF3, 0x63, 0x4A, 0x96, 0x61, 0xFC, 0x60, 0x30, 0xDC, 0xC8, 0x80,
]);
pub const DRIVER_GUID: Guid = Guid::from_bytes([0x21; 16]);
pub const FV_IMAGE_GUID: Guid = Guid::from_bytes([0x32; 16]);
pub const NESTED_FV_GUID: Guid = Guid::from_bytes([0x43; 16]);
pub const NESTED_RAW_GUID: Guid = Guid::from_bytes([0x54; 16]);
pub const FREEFORM_GUID: Guid = Guid::from_bytes([0x65; 16]);
pub const UNKNOWN_GUID: Guid = Guid::from_bytes([0x76; 16]);

pub const VOLUME_LENGTH: u64 = 0x400;

fn header(guid: Guid, file_type: FileType) -> FileHeader {
    FileHeader::new(guid, file_type, FileAttributes::empty())
}

pub fn sample_image() -> Firmware {
    let mut nested = Volume::new(FFS2_GUID, 0x100, vec![0u8; 0x48]);
    nested.fv_name = Some(NESTED_FV_GUID);
    nested
        .push_file(File::raw(NESTED_RAW_GUID, b"nested".to_vec()).unwrap())
        .unwrap();
    let mut fv_section = Section::new(
        SectionType::FirmwareVolumeImage,
        nested.assemble().unwrap(),
    );
    fv_section.encapsulated.push(nested.into());

    let mut volume = Volume::new(FFS2_GUID, VOLUME_LENGTH, vec![0u8; 0x48]);
    volume
        .push_file(File::raw(RAW_GUID, b"old".to_vec()).unwrap())
        .unwrap();
    volume
        .push_file(
            File::with_sections(
                header(DRIVER_GUID, FileType::Driver),
                vec![
                    Section::user_interface("Shell").into(),
                    Section::new(SectionType::Pe32, b"MZ\x90\x00".to_vec()).into(),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    volume
        .push_file(
            File::with_sections(
                header(FV_IMAGE_GUID, FileType::FirmwareVolumeImage),
                vec![fv_section.into()],
            )
            .unwrap(),
        )
        .unwrap();
    volume
        .push_file(
            File::with_sections(
                header(FREEFORM_GUID, FileType::Freeform),
                vec![Section::new(SectionType::Raw, b"blob".to_vec()).into()],
            )
            .unwrap(),
        )
        .unwrap();

    Region {
        name: "bios".into(),
        elements: vec![volume.into(), Padding { data: vec![0xFF; 16] }.into()],
    }
    .into()
}
