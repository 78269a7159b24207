// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC GlobalId values
//!
//! Conforming GlobalIds are 128-bit GUIDs compressed to 22 characters with
//! the IFC base-64 alphabet. Deterministic, human-readable identifiers are
//! also supported for reproducible output.

use std::fmt;
use uuid::Uuid;

/// IFC base-64 alphabet (differs from RFC 4648)
const ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Length of a compressed GlobalId
pub const COMPRESSED_LEN: usize = 22;

/// A GlobalId attribute value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IfcGuid(String);

impl IfcGuid {
    /// Fresh random GlobalId
    pub fn new_random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Compress a UUID into the 22-character IFC form
    pub fn from_uuid(uuid: Uuid) -> Self {
        let n = uuid.as_u128();
        let mut out = String::with_capacity(COMPRESSED_LEN);

        // 2 bits in the first character, then 21 characters of 6 bits
        out.push(ALPHABET[(n >> 126) as usize & 0x3] as char);
        for i in 1..COMPRESSED_LEN {
            let shift = 126 - 6 * i;
            out.push(ALPHABET[(n >> shift) as usize & 0x3F] as char);
        }
        Self(out)
    }

    /// Readable identifier `<prefix><index:04>`, e.g. `PIPEGUID0002`
    pub fn deterministic(prefix: &str, index: usize) -> Self {
        Self(format!("{}{:04}", prefix, index))
    }

    /// Wrap an existing identifier as-is
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expand a compressed GlobalId back to its UUID
    pub fn to_uuid(&self) -> Option<Uuid> {
        if !self.is_compressed() {
            return None;
        }
        let mut n: u128 = 0;
        for (i, byte) in self.0.bytes().enumerate() {
            let digit = ALPHABET.iter().position(|&c| c == byte)? as u128;
            n = if i == 0 { digit } else { (n << 6) | digit };
        }
        Some(Uuid::from_u128(n))
    }

    /// Whether this is a well-formed 22-character compressed GlobalId
    pub fn is_compressed(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == COMPRESSED_LEN
            && matches!(bytes[0], b'0'..=b'3')
            && bytes.iter().all(|b| ALPHABET.contains(b))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IfcGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&IfcGuid> for crate::attribute::AttributeValue {
    fn from(guid: &IfcGuid) -> Self {
        crate::attribute::AttributeValue::String(guid.0.clone())
    }
}
