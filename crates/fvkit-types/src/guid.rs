use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// A UEFI `EFI_GUID` as it appears on flash.
///
/// The first three fields are little-endian on disk, so the byte order here
/// differs from the RFC 4122 order used by the textual form. `Display` and
/// `FromStr` use the canonical `8-4-4-4-12` text, upper case.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid([u8; 16]);

impl Guid {
    /// Size of an encoded GUID in bytes.
    pub const SIZE: usize = 16;

    /// The all-zero GUID.
    pub const fn zero() -> Self {
        Self([0u8; 16])
    }

    /// Create from on-disk (mixed-endian) bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Read a GUID from the first 16 bytes of `data`.
    pub fn from_slice(data: &[u8]) -> Result<Self, TypeError> {
        let bytes: [u8; 16] = data
            .get(..Self::SIZE)
            .and_then(|s| s.try_into().ok())
            .ok_or(TypeError::InvalidLength {
                expected: Self::SIZE,
                actual: data.len(),
            })?;
        Ok(Self(bytes))
    }

    /// The on-disk bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// The same value as an RFC 4122 UUID.
    pub fn as_uuid(&self) -> uuid::Uuid {
        uuid::Uuid::from_bytes_le(self.0)
    }
}

impl From<uuid::Uuid> for Guid {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid.to_bytes_le())
    }
}

impl FromStr for Guid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s.trim())
            .map_err(|e| TypeError::InvalidGuid(format!("{s}: {e}")))?;
        Ok(uuid.into())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.as_uuid())
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
