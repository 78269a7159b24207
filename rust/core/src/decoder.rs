// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity Decoder - On-demand entity parsing
//!
//! Lazily decode entities from byte offsets of a STEP file.

use crate::attribute::{AttributeValue, DecodedEntity};
use crate::error::{Error, Result};
use crate::parser::{parse_entity, EntityScanner};
use crate::schema::IfcType;
use rustc_hash::FxHashMap;

/// Entity index type: entity id -> (start, end) byte offsets
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Build entity index from content in one scan of the DATA section
pub fn build_entity_index(content: &str) -> EntityIndex {
    let mut index = FxHashMap::default();
    let mut scanner = EntityScanner::new(content);
    while let Some((id, _, start, end)) = scanner.next_entity() {
        index.insert(id, (start, end));
    }
    index
}

/// Decodes and caches entities of one STEP file
pub struct EntityDecoder<'a> {
    content: &'a str,
    cache: FxHashMap<u32, DecodedEntity>,
    entity_index: Option<EntityIndex>,
}

impl<'a> EntityDecoder<'a> {
    /// Create new decoder
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: None,
        }
    }

    fn index(&mut self) -> &EntityIndex {
        self.entity_index
            .get_or_insert_with(|| build_entity_index(self.content))
    }

    /// Decode entity at byte offset
    pub fn decode_at(&mut self, start: usize, end: usize) -> Result<DecodedEntity> {
        let line = &self.content[start..end];
        let (id, ifc_type, tokens) = parse_entity(line).map_err(|e| match e {
            Error::Parse { position, message } => Error::Parse {
                position: start + position,
                message,
            },
            other => other,
        })?;

        if let Some(entity) = self.cache.get(&id) {
            return Ok(entity.clone());
        }

        let attributes = tokens.iter().map(AttributeValue::from_token).collect();
        let entity = DecodedEntity::new(id, ifc_type, attributes);
        self.cache.insert(id, entity.clone());
        Ok(entity)
    }

    /// Decode entity by ID
    pub fn decode_by_id(&mut self, entity_id: u32) -> Result<DecodedEntity> {
        if let Some(entity) = self.cache.get(&entity_id) {
            return Ok(entity.clone());
        }

        let (start, end) = self
            .index()
            .get(&entity_id)
            .copied()
            .ok_or(Error::EntityNotFound(entity_id))?;

        self.decode_at(start, end)
    }

    /// Resolve entity reference (follow #ID)
    /// Returns None for null/derived values
    pub fn resolve_ref(&mut self, attr: &AttributeValue) -> Result<Option<DecodedEntity>> {
        match attr.as_entity_ref() {
            Some(id) => Ok(Some(self.decode_by_id(id)?)),
            None => Ok(None),
        }
    }

    /// Resolve list of entity references
    pub fn resolve_ref_list(&mut self, attr: &AttributeValue) -> Result<Vec<DecodedEntity>> {
        let list = attr
            .as_list()
            .ok_or_else(|| Error::parse(0, "Expected list"))?;

        let mut entities = Vec::with_capacity(list.len());
        for item in list {
            if let Some(id) = item.as_entity_ref() {
                entities.push(self.decode_by_id(id)?);
            }
        }
        Ok(entities)
    }

    /// Decode every entity of the given type, in file order
    pub fn decode_all_of_type(&mut self, ifc_type: IfcType) -> Result<Vec<DecodedEntity>> {
        let mut scanner = EntityScanner::new(self.content);
        let mut entities = Vec::new();
        while let Some((_, type_name, start, end)) = scanner.next_entity() {
            if IfcType::from_str(type_name) == Some(ifc_type) {
                entities.push(self.decode_at(start, end)?);
            }
        }
        Ok(entities)
    }

    /// Number of entities in the file
    pub fn entity_count(&mut self) -> usize {
        self.index().len()
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
