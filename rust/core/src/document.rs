// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory IFC document
//!
//! An append-only arena of entities. Instance numbers are allocated
//! sequentially from 1, so an [`EntityId`] is also the `#n` written to the
//! DATA section.

use std::fmt;

use crate::attribute::AttributeValue;
use crate::error::{Error, Result};
use crate::schema::IfcType;

/// STEP instance number of an entity in an [`IfcDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(u32);

impl EntityId {
    /// Raw instance number
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed entity with positional attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub ifc_type: IfcType,
    pub attributes: Vec<AttributeValue>,
}

/// HEADER section of a STEP physical file
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub description: Vec<String>,
    pub implementation_level: String,
    pub name: String,
    /// ISO 8601 time stamp, e.g. `2026-10-16T09:30:00`
    pub time_stamp: String,
    pub author: Vec<String>,
    pub organization: Vec<String>,
    pub preprocessor_version: String,
    pub originating_system: String,
    pub authorization: String,
    pub schema: String,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            description: vec!["ViewDefinition [CoordinationView]".to_string()],
            implementation_level: "2;1".to_string(),
            name: String::new(),
            time_stamp: String::new(),
            author: vec![String::new()],
            organization: vec![String::new()],
            preprocessor_version: concat!("ifc-wallgen-core ", env!("CARGO_PKG_VERSION")).to_string(),
            originating_system: String::new(),
            authorization: String::new(),
            schema: "IFC4".to_string(),
        }
    }
}

/// Root container owning every entity of a model
#[derive(Debug, Clone, Default)]
pub struct IfcDocument {
    header: FileHeader,
    entities: Vec<Entity>,
}

impl IfcDocument {
    /// Create an empty IFC4 document
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut FileHeader {
        &mut self.header
    }

    /// Append an entity and return its instance number
    pub fn create_entity(
        &mut self,
        ifc_type: IfcType,
        attributes: Vec<AttributeValue>,
    ) -> EntityId {
        let id = EntityId(self.entities.len() as u32 + 1);
        self.entities.push(Entity {
            id,
            ifc_type,
            attributes,
        });
        id
    }

    /// Get an entity by instance number
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.entities.get(index))
    }

    /// Get an entity by instance number, failing if it does not exist
    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.get(id).ok_or(Error::EntityNotFound(id.0))
    }

    /// Replace a single attribute of an existing entity
    pub fn set_attribute(
        &mut self,
        id: EntityId,
        index: usize,
        value: AttributeValue,
    ) -> Result<()> {
        let entity = (id.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.entities.get_mut(i))
            .ok_or(Error::EntityNotFound(id.0))?;

        let len = entity.attributes.len();
        let slot = entity
            .attributes
            .get_mut(index)
            .ok_or(Error::AttributeOutOfRange {
                id: id.0,
                index,
                len,
            })?;
        *slot = value;
        Ok(())
    }

    /// All entities in instance-number order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// All entities of one type in instance-number order
    pub fn entities_of_type(&self, ifc_type: IfcType) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.ifc_type == ifc_type)
    }

    /// Number of entities of one type
    pub fn count_of_type(&self, ifc_type: IfcType) -> usize {
        self.entities_of_type(ifc_type).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check attribute counts against the schema and that every reference
    /// points at an existing entity
    pub fn validate(&self) -> Result<()> {
        let max_id = self.entities.len() as u32;

        for entity in &self.entities {
            if let Some(expected) = entity.ifc_type.attribute_count() {
                if entity.attributes.len() != expected {
                    return Err(Error::AttributeCount {
                        id: entity.id.0,
                        ifc_type: entity.ifc_type.as_str(),
                        expected,
                        found: entity.attributes.len(),
                    });
                }
            }

            let mut dangling = None;
            for attr in &entity.attributes {
                attr.for_each_ref(&mut |target| {
                    if dangling.is_none() && (target == 0 || target > max_id) {
                        dangling = Some(target);
                    }
                });
            }
            if let Some(to) = dangling {
                return Err(Error::DanglingReference {
                    from: entity.id.0,
                    to,
                });
            }
        }

        Ok(())
    }
}
