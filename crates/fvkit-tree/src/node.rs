use std::fmt;

use serde::{Deserialize, Serialize};

use fvkit_types::Guid;

use crate::error::{TreeError, TreeResult};
use crate::file::File;
use crate::path::NodePath;
use crate::section::Section;
use crate::visitor::Visitor;
use crate::volume::Volume;

/// Discriminant of a [`Firmware`] node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Region,
    Volume,
    File,
    Section,
    Padding,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region => write!(f, "region"),
            Self::Volume => write!(f, "volume"),
            Self::File => write!(f, "file"),
            Self::Section => write!(f, "section"),
            Self::Padding => write!(f, "padding"),
        }
    }
}

// ---------------------------------------------------------------------------
// Leaf and container kinds without their own module
// ---------------------------------------------------------------------------

/// A flash region: an ordered run of volumes and padding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Firmware>,
}

/// Opaque bytes between structures (gaps, non-FV data).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    #[serde(with = "hex")]
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Firmware
// ---------------------------------------------------------------------------

/// A node in a decoded firmware tree.
///
/// Parents own their children exclusively. Every kind follows the same
/// dispatch rule under [`Firmware::apply`]: the visitor's handler runs on
/// the node, then the visitor is forwarded to each child in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Firmware {
    Region(Region),
    Volume(Volume),
    File(File),
    Section(Section),
    Padding(Padding),
}

impl Firmware {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Region(_) => NodeKind::Region,
            Self::Volume(_) => NodeKind::Volume,
            Self::File(_) => NodeKind::File,
            Self::Section(_) => NodeKind::Section,
            Self::Padding(_) => NodeKind::Padding,
        }
    }

    /// The node's identifying GUID: a file's name or a volume's FV name.
    pub fn guid(&self) -> Option<Guid> {
        match self {
            Self::File(f) => Some(f.guid()),
            Self::Volume(v) => v.fv_name,
            Self::Region(_) | Self::Section(_) | Self::Padding(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut File> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Firmware] {
        match self {
            Self::Region(r) => &r.elements,
            Self::Volume(v) => &v.files,
            Self::File(f) => &f.sections,
            Self::Section(s) => &s.encapsulated,
            Self::Padding(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut [Firmware] {
        match self {
            Self::Region(r) => &mut r.elements,
            Self::Volume(v) => &mut v.files,
            Self::File(f) => &mut f.sections,
            Self::Section(s) => &mut s.encapsulated,
            Self::Padding(_) => Default::default(),
        }
    }

    /// The node's current serialized form.
    pub fn buf(&self) -> TreeResult<Vec<u8>> {
        match self {
            Self::Region(r) => {
                let mut out = Vec::new();
                for element in &r.elements {
                    out.extend_from_slice(&element.buf()?);
                }
                Ok(out)
            }
            Self::Volume(v) => v.assemble(),
            Self::File(f) => Ok(f.buf()),
            Self::Section(s) => s.buf(),
            Self::Padding(p) => Ok(p.data.clone()),
        }
    }

    // -----------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------

    /// Run `visitor` over this node and everything below it, pre-order.
    ///
    /// The first error from any handler stops the walk and is returned.
    pub fn apply<V: Visitor + ?Sized>(&mut self, visitor: &mut V) -> Result<(), V::Error> {
        let mut path = NodePath::root();
        self.apply_at(visitor, &mut path)
    }

    /// Forward `visitor` to each child of the node at `path`, in order.
    pub fn apply_children<V: Visitor + ?Sized>(
        &mut self,
        visitor: &mut V,
        path: &NodePath,
    ) -> Result<(), V::Error> {
        let mut path = path.clone();
        self.apply_children_at(visitor, &mut path)
    }

    fn apply_at<V: Visitor + ?Sized>(
        &mut self,
        visitor: &mut V,
        path: &mut NodePath,
    ) -> Result<(), V::Error> {
        visitor.visit(self, path)?;
        if visitor.descend(self) {
            self.apply_children_at(visitor, path)?;
        }
        Ok(())
    }

    fn apply_children_at<V: Visitor + ?Sized>(
        &mut self,
        visitor: &mut V,
        path: &mut NodePath,
    ) -> Result<(), V::Error> {
        for (index, child) in self.children_mut().iter_mut().enumerate() {
            path.push(index);
            child.apply_at(visitor, path)?;
            path.pop();
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Cached bytes
    // -----------------------------------------------------------------

    /// Re-derive this node's stored bytes from its children.
    ///
    /// Section-bearing files rebuild their section stream and checksums;
    /// sections rebuild what they can (see [`Section::refresh`]). Other
    /// kinds assemble on demand and have nothing to refresh.
    pub fn refresh(&mut self) -> TreeResult<()> {
        match self {
            Self::File(f) if f.file_type().has_sections() && !f.sections.is_empty() => {
                f.reassemble_sections()
            }
            Self::Section(s) => s.refresh(),
            _ => Ok(()),
        }
    }

    /// Refresh every node above `path`, innermost first, after the node at
    /// `path` changed.
    pub fn refresh_ancestors(&mut self, path: &NodePath) -> TreeResult<()> {
        let indices = path.indices();
        for depth in (0..indices.len()).rev() {
            let ancestor = NodePath::from_indices(&indices[..depth]);
            self.get_mut(&ancestor)
                .ok_or_else(|| TreeError::InvalidPath(ancestor.clone()))?
                .refresh()?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------

    /// Resolve a path produced by a walk over this tree.
    pub fn get(&self, path: &NodePath) -> Option<&Firmware> {
        path.indices()
            .iter()
            .try_fold(self, |node, index| node.children().get(*index))
    }

    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Firmware> {
        path.indices()
            .iter()
            .try_fold(self, |node, index| node.children_mut().get_mut(*index))
    }

    /// Every node with its path, pre-order, without going through a visitor.
    pub fn preorder(&self) -> Vec<(NodePath, &Firmware)> {
        fn walk<'a>(node: &'a Firmware, path: NodePath, out: &mut Vec<(NodePath, &'a Firmware)>) {
            for (index, child) in node.children().iter().enumerate() {
                let child_path = path.child(index);
                out.push((child_path.clone(), child));
                walk(child, child_path, out);
            }
        }
        let mut out = vec![(NodePath::root(), self)];
        walk(self, NodePath::root(), &mut out);
        out
    }
}

impl From<File> for Firmware {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Section> for Firmware {
    fn from(section: Section) -> Self {
        Self::Section(section)
    }
}

impl From<Volume> for Firmware {
    fn from(volume: Volume) -> Self {
        Self::Volume(volume)
    }
}

impl From<Region> for Firmware {
    fn from(region: Region) -> Self {
        Self::Region(region)
    }
}

impl From<Padding> for Firmware {
    fn from(padding: Padding) -> Self {
        Self::Padding(padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::FFS2_GUID;
    use fvkit_types::SectionType;
    use std::convert::Infallible;

    fn guid(n: u8) -> Guid {
        Guid::from_bytes([n; 16])
    }

    /// region
    ///   volume
    ///     file(1, raw)
    ///     file(2, driver)
    ///       section(ui)
    ///   padding
    fn sample_tree() -> Firmware {
        let mut volume = Volume::new(FFS2_GUID, 0x200, vec![0u8; 0x48]);
        volume.push_file(File::raw(guid(1), b"old".to_vec()).unwrap()).unwrap();
        let driver = File::with_sections(
            crate::file::FileHeader::new(
                guid(2),
                fvkit_types::FileType::Driver,
                fvkit_types::FileAttributes::empty(),
            ),
            vec![Section::user_interface("Driver").into()],
        )
        .unwrap();
        volume.push_file(driver).unwrap();
        Region {
            name: "bios".into(),
            elements: vec![volume.into(), Padding { data: vec![0xFF; 4] }.into()],
        }
        .into()
    }

    struct Recorder {
        seen: Vec<(String, NodeKind)>,
        skip_files: bool,
    }

    impl Visitor for Recorder {
        type Error = Infallible;

        fn visit(&mut self, node: &mut Firmware, path: &NodePath) -> Result<(), Infallible> {
            self.seen.push((path.to_string(), node.kind()));
            Ok(())
        }

        fn descend(&self, node: &Firmware) -> bool {
            !(self.skip_files && node.kind() == NodeKind::File)
        }
    }

    #[test]
    fn apply_visits_preorder_with_paths() {
        let mut tree = sample_tree();
        let mut rec = Recorder { seen: Vec::new(), skip_files: false };
        tree.apply(&mut rec).unwrap();
        let expected = vec![
            ("/".to_string(), NodeKind::Region),
            ("/0".to_string(), NodeKind::Volume),
            ("/0/0".to_string(), NodeKind::File),
            ("/0/1".to_string(), NodeKind::File),
            ("/0/1/0".to_string(), NodeKind::Section),
            ("/1".to_string(), NodeKind::Padding),
        ];
        assert_eq!(rec.seen, expected);
    }

    #[test]
    fn descend_false_prunes_children() {
        let mut tree = sample_tree();
        let mut rec = Recorder { seen: Vec::new(), skip_files: true };
        tree.apply(&mut rec).unwrap();
        assert!(rec.seen.iter().all(|(_, k)| *k != NodeKind::Section));
        assert_eq!(rec.seen.len(), 5);
    }

    #[test]
    fn first_error_stops_the_walk() {
        struct FailOn(&'static str, usize);
        impl Visitor for FailOn {
            type Error = String;
            fn visit(&mut self, _node: &mut Firmware, path: &NodePath) -> Result<(), String> {
                self.1 += 1;
                if path.to_string() == self.0 {
                    return Err(format!("failed at {path}"));
                }
                Ok(())
            }
        }
        let mut tree = sample_tree();
        let mut v = FailOn("/0/1", 0);
        let err = tree.apply(&mut v).unwrap_err();
        assert_eq!(err, "failed at /0/1");
        // region, volume, file 1, file 2; nothing after the failure.
        assert_eq!(v.1, 4);
    }

    #[test]
    fn preorder_matches_visitor_order() {
        let mut tree = sample_tree();
        let mut rec = Recorder { seen: Vec::new(), skip_files: false };
        tree.apply(&mut rec).unwrap();
        let walked: Vec<_> = tree
            .preorder()
            .into_iter()
            .map(|(p, n)| (p.to_string(), n.kind()))
            .collect();
        assert_eq!(walked, rec.seen);
    }

    #[test]
    fn get_resolves_paths() {
        let tree = sample_tree();
        let node = tree.get(&NodePath::from_indices([0, 1])).unwrap();
        assert_eq!(node.guid(), Some(guid(2)));
        assert!(tree.get(&NodePath::from_indices([0, 9])).is_none());
        assert!(matches!(
            tree.clone().refresh_ancestors(&NodePath::from_indices([3, 0])),
            Err(TreeError::InvalidPath(_))
        ));
    }

    #[test]
    fn guid_only_for_identified_kinds() {
        let tree = sample_tree();
        assert_eq!(tree.guid(), None);
        let section = tree.get(&NodePath::from_indices([0, 1, 0])).unwrap();
        assert_eq!(section.kind(), NodeKind::Section);
        assert_eq!(section.guid(), None);
    }

    #[test]
    fn region_buf_concatenates() {
        let tree = sample_tree();
        let buf = tree.buf().unwrap();
        assert_eq!(buf.len(), 0x200 + 4);
    }

    #[test]
    fn json_roundtrip_preserves_tree() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains("\"kind\":\"region\""));
        let back: Firmware = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
        assert_eq!(back.buf().unwrap(), tree.buf().unwrap());
    }

    #[test]
    fn section_kind_display() {
        let s: Firmware = Section::new(SectionType::Raw, vec![]).into();
        assert_eq!(s.kind().to_string(), "section");
    }

    #[test]
    fn refresh_ancestors_rebuilds_enclosing_bytes() {
        let mut inner = Volume::new(FFS2_GUID, 0x80, vec![0u8; 0x48]);
        inner.push_file(File::raw(guid(7), b"old".to_vec()).unwrap()).unwrap();
        let mut section = Section::new(SectionType::FirmwareVolumeImage, inner.assemble().unwrap());
        section.encapsulated.push(inner.into());
        let outer = File::with_sections(
            crate::file::FileHeader::new(
                guid(8),
                fvkit_types::FileType::FirmwareVolumeImage,
                fvkit_types::FileAttributes::empty(),
            ),
            vec![section.into()],
        )
        .unwrap();
        let mut tree: Firmware = outer.into();

        let raw_path = NodePath::from_indices([0, 0, 0]);
        tree.get_mut(&raw_path)
            .and_then(Firmware::as_file_mut)
            .unwrap()
            .checksum_and_assemble(b"new!".to_vec())
            .unwrap();
        let stale = tree.buf().unwrap();
        tree.refresh_ancestors(&raw_path).unwrap();
        let fresh = tree.buf().unwrap();

        assert_ne!(stale, fresh);
        assert!(fresh.windows(4).any(|w| w == b"new!"));
        assert!(!fresh.windows(3).any(|w| w == b"old"));
        assert!(tree.as_file().unwrap().checksums_valid());
    }

    #[test]
    fn refresh_reports_nested_overflow() {
        let mut inner = Volume::new(FFS2_GUID, 0x80, vec![0u8; 0x48]);
        inner.push_file(File::raw(guid(7), b"old".to_vec()).unwrap()).unwrap();
        let mut section: Firmware =
            Section::new(SectionType::FirmwareVolumeImage, inner.assemble().unwrap()).into();
        if let Firmware::Section(s) = &mut section {
            s.encapsulated.push(inner.into());
        }
        let raw_path = NodePath::from_indices([0, 0]);
        section
            .get_mut(&raw_path)
            .and_then(Firmware::as_file_mut)
            .unwrap()
            .checksum_and_assemble(vec![0u8; 0x40])
            .unwrap();
        let err = section.refresh_ancestors(&raw_path).unwrap_err();
        assert!(matches!(err, TreeError::VolumeOverflow { length: 0x80, .. }));
    }
}
