// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-back check of a written model

use std::fs;
use std::path::Path;

use ifc_wallgen_core::{file_schema, EntityDecoder, EntityScanner, IfcType};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::builder::{GeneratedModel, PlacedElement};
use crate::error::{GeneratorError, Result};

/// Largest accepted difference between a written and a re-read depth
const DEPTH_TOLERANCE: f64 = 1e-9;

/// Entity counts by upper-case type name, as read back from a file
pub type TypeCounts = FxHashMap<String, usize>;

/// Re-read `path` and check it against the model that was written
///
/// Checks the schema identifier, the total instance count, the counts of
/// spatial nodes, relations, walls and pipes, and decodes every element's
/// solid to compare its extrusion depth.
pub fn verify_written(path: &Path, model: &GeneratedModel) -> Result<TypeCounts> {
    let content = fs::read_to_string(path).map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let expected_schema = model.document.header().schema.as_str();
    match file_schema(&content) {
        Some(schema) if schema.eq_ignore_ascii_case(expected_schema) => {}
        other => {
            return Err(GeneratorError::VerificationFailed(format!(
                "schema is {:?}, expected {}",
                other, expected_schema
            )))
        }
    }

    let counts = EntityScanner::new(&content).count_by_type();
    let total: usize = counts.values().sum();
    if total != model.document.len() {
        return Err(GeneratorError::VerificationFailed(format!(
            "{} instances read back, {} written",
            total,
            model.document.len()
        )));
    }

    let pipes = model.pipes.len();
    let expected = [
        (IfcType::IfcProject, 1),
        (IfcType::IfcSite, 1),
        (IfcType::IfcBuilding, 1),
        (IfcType::IfcBuildingStorey, 1),
        (IfcType::IfcRelAggregates, 3),
        (IfcType::IfcWallStandardCase, 1),
        (IfcType::IfcPipeSegment, pipes),
        (IfcType::IfcRelContainedInSpatialStructure, 1 + pipes),
    ];
    for (ifc_type, want) in expected {
        let found = counts.get(ifc_type.as_str()).copied().unwrap_or(0);
        if found != want {
            return Err(GeneratorError::VerificationFailed(format!(
                "expected {} {}, found {}",
                want, ifc_type, found
            )));
        }
        debug!(%ifc_type, count = found, "Verified entity count");
    }

    let mut decoder = EntityDecoder::new(&content);
    for element in std::iter::once(&model.wall).chain(&model.pipes) {
        check_element(&mut decoder, element)?;
    }

    info!(path = %path.display(), entities = total, pipes, "Verified written file");
    Ok(counts)
}

fn check_element(decoder: &mut EntityDecoder<'_>, element: &PlacedElement) -> Result<()> {
    let failed = |detail: String| {
        GeneratorError::VerificationFailed(format!("{}: {}", element.name, detail))
    };

    let entity = decoder
        .decode_by_id(element.entity.get())
        .map_err(|e| failed(e.to_string()))?;
    if entity.get_string(2) != Some(element.name.as_str()) {
        return Err(failed(format!("name read back as {:?}", entity.get_string(2))));
    }

    let solid = decoder
        .decode_by_id(element.solid.get())
        .map_err(|e| failed(e.to_string()))?;
    if solid.ifc_type != IfcType::IfcExtrudedAreaSolid {
        return Err(failed(format!("{} is a {}", element.solid, solid.ifc_type)));
    }
    match solid.get_float(3) {
        Some(depth) if (depth - element.depth).abs() <= DEPTH_TOLERANCE => Ok(()),
        other => Err(failed(format!(
            "depth read back as {:?}, {} written",
            other, element.depth
        ))),
    }
}
