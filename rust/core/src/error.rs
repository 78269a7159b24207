// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for document authoring and STEP I/O.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, writing or reading a STEP document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Invalid IFC type: {0}")]
    InvalidIfcType(String),

    #[error("Entity #{0} not found")]
    EntityNotFound(u32),

    #[error("Attribute index {index} out of range for entity #{id} ({len} attributes)")]
    AttributeOutOfRange { id: u32, index: usize, len: usize },

    #[error("Entity #{id} ({ifc_type}) has {found} attributes, expected {expected}")]
    AttributeCount {
        id: u32,
        ifc_type: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Entity #{from} references missing entity #{to}")]
    DanglingReference { from: u32, to: u32 },

    #[error("Cannot write non-finite real value {0}")]
    NonFiniteReal(f64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error at the given byte position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }
}
