// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Schema Types
//!
//! The IFC4 entity types this crate authors, with their STEP keywords and
//! explicit attribute counts. Anything else read back from a file maps to
//! [`IfcType::Unknown`].

use std::fmt;

/// IFC entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IfcType {
    // Spatial structure
    IfcProject,
    IfcSite,
    IfcBuilding,
    IfcBuildingStorey,

    // Elements
    IfcWallStandardCase,
    IfcPipeSegment,

    // Relationships
    IfcRelAggregates,
    IfcRelContainedInSpatialStructure,

    // Placement
    IfcLocalPlacement,
    IfcAxis2Placement3D,
    IfcCartesianPoint,
    IfcDirection,

    // Profiles and solids
    IfcPolyline,
    IfcArbitraryClosedProfileDef,
    IfcCircleProfileDef,
    IfcExtrudedAreaSolid,

    // Representation
    IfcGeometricRepresentationContext,
    IfcShapeRepresentation,
    IfcProductDefinitionShape,

    // Units
    IfcUnitAssignment,
    IfcSIUnit,

    // Fallback for unknown types
    Unknown(u16), // Store hash for unknown types
}

impl IfcType {
    /// Parse IFC type from its STEP keyword (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }

        let upper = s.to_ascii_uppercase();
        let t = match upper.as_str() {
            "IFCPROJECT" => Self::IfcProject,
            "IFCSITE" => Self::IfcSite,
            "IFCBUILDING" => Self::IfcBuilding,
            "IFCBUILDINGSTOREY" => Self::IfcBuildingStorey,

            "IFCWALLSTANDARDCASE" => Self::IfcWallStandardCase,
            "IFCPIPESEGMENT" => Self::IfcPipeSegment,

            "IFCRELAGGREGATES" => Self::IfcRelAggregates,
            "IFCRELCONTAINEDINSPATIALSTRUCTURE" => Self::IfcRelContainedInSpatialStructure,

            "IFCLOCALPLACEMENT" => Self::IfcLocalPlacement,
            "IFCAXIS2PLACEMENT3D" => Self::IfcAxis2Placement3D,
            "IFCCARTESIANPOINT" => Self::IfcCartesianPoint,
            "IFCDIRECTION" => Self::IfcDirection,

            "IFCPOLYLINE" => Self::IfcPolyline,
            "IFCARBITRARYCLOSEDPROFILEDEF" => Self::IfcArbitraryClosedProfileDef,
            "IFCCIRCLEPROFILEDEF" => Self::IfcCircleProfileDef,
            "IFCEXTRUDEDAREASOLID" => Self::IfcExtrudedAreaSolid,

            "IFCGEOMETRICREPRESENTATIONCONTEXT" => Self::IfcGeometricRepresentationContext,
            "IFCSHAPEREPRESENTATION" => Self::IfcShapeRepresentation,
            "IFCPRODUCTDEFINITIONSHAPE" => Self::IfcProductDefinitionShape,

            "IFCUNITASSIGNMENT" => Self::IfcUnitAssignment,
            "IFCSIUNIT" => Self::IfcSIUnit,

            _ => Self::Unknown(simple_hash(&upper)),
        };
        Some(t)
    }

    /// STEP keyword as written in the DATA section
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IfcProject => "IFCPROJECT",
            Self::IfcSite => "IFCSITE",
            Self::IfcBuilding => "IFCBUILDING",
            Self::IfcBuildingStorey => "IFCBUILDINGSTOREY",

            Self::IfcWallStandardCase => "IFCWALLSTANDARDCASE",
            Self::IfcPipeSegment => "IFCPIPESEGMENT",

            Self::IfcRelAggregates => "IFCRELAGGREGATES",
            Self::IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",

            Self::IfcLocalPlacement => "IFCLOCALPLACEMENT",
            Self::IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
            Self::IfcCartesianPoint => "IFCCARTESIANPOINT",
            Self::IfcDirection => "IFCDIRECTION",

            Self::IfcPolyline => "IFCPOLYLINE",
            Self::IfcArbitraryClosedProfileDef => "IFCARBITRARYCLOSEDPROFILEDEF",
            Self::IfcCircleProfileDef => "IFCCIRCLEPROFILEDEF",
            Self::IfcExtrudedAreaSolid => "IFCEXTRUDEDAREASOLID",

            Self::IfcGeometricRepresentationContext => "IFCGEOMETRICREPRESENTATIONCONTEXT",
            Self::IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",
            Self::IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",

            Self::IfcUnitAssignment => "IFCUNITASSIGNMENT",
            Self::IfcSIUnit => "IFCSIUNIT",

            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Number of explicit IFC4 attributes, `None` for unknown types
    pub fn attribute_count(&self) -> Option<usize> {
        let count = match self {
            Self::IfcProject => 9,
            Self::IfcSite => 14,
            Self::IfcBuilding => 12,
            Self::IfcBuildingStorey => 10,

            Self::IfcWallStandardCase | Self::IfcPipeSegment => 9,

            Self::IfcRelAggregates | Self::IfcRelContainedInSpatialStructure => 6,

            Self::IfcLocalPlacement => 2,
            Self::IfcAxis2Placement3D => 3,
            Self::IfcCartesianPoint | Self::IfcDirection | Self::IfcPolyline => 1,

            Self::IfcArbitraryClosedProfileDef => 3,
            Self::IfcCircleProfileDef => 4,
            Self::IfcExtrudedAreaSolid => 4,

            Self::IfcGeometricRepresentationContext => 6,
            Self::IfcShapeRepresentation => 4,
            Self::IfcProductDefinitionShape => 3,

            Self::IfcUnitAssignment => 1,
            Self::IfcSIUnit => 4,

            Self::Unknown(_) => return None,
        };
        Some(count)
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Simple hash function for unknown IFC types
fn simple_hash(s: &str) -> u16 {
    let mut hash: u32 = 5381;
    for byte in s.bytes() {
        hash = ((hash << 5).wrapping_add(hash)).wrapping_add(byte as u32);
    }
    (hash & 0xFFFF) as u16
}
