// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC Wallgen Core
//!
//! Minimal IFC4 authoring: a typed entity document, a STEP physical file
//! writer, and a [nom](https://docs.rs/nom)-based reader for verifying what
//! was written.
//!
//! ## Overview
//!
//! - **Document**: append-only arena of entities addressed by instance number
//! - **Writer**: ISO 10303-21 output with header, escaped strings and REALs
//!   that always carry a decimal point
//! - **Reader**: entity scanning and lazy decoding of the DATA section
//! - **GlobalIds**: compressed 22-character GUIDs or readable identifiers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_wallgen_core::{AttributeValue, IfcDocument, IfcType, StepWriter};
//!
//! let mut doc = IfcDocument::new();
//! let origin = doc.create_entity(
//!     IfcType::IfcCartesianPoint,
//!     vec![AttributeValue::reals(&[0.0, 0.0, 0.0])],
//! );
//! let text = StepWriter::new(&doc).to_step_string()?;
//! assert!(text.contains("#1=IFCCARTESIANPOINT((0.,0.,0.));"));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for ids and attribute values

pub mod attribute;
pub mod decoder;
pub mod document;
pub mod error;
pub mod guid;
pub mod parser;
pub mod schema;
pub mod writer;

pub use attribute::{AttributeValue, DecodedEntity};
pub use decoder::{build_entity_index, EntityDecoder, EntityIndex};
pub use document::{Entity, EntityId, FileHeader, IfcDocument};
pub use error::{Error, Result};
pub use guid::IfcGuid;
pub use parser::{file_schema, parse_entity, EntityScanner, Token};
pub use schema::IfcType;
pub use writer::{encode_string, format_real, StepWriter};
