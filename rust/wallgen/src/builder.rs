// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC model construction: spatial hierarchy, wall and pipe segments

use ifc_wallgen_core::{AttributeValue, EntityId, IfcDocument, IfcGuid, IfcType};
use tracing::{debug, info, warn};

use crate::config::{DepthPolicy, GuidMode};
use crate::error::{GeneratorError, Result};
use crate::parameters::ModelParameters;

const Z_AXIS: [f64; 3] = [0.0, 0.0, 1.0];
const X_AXIS: [f64; 3] = [1.0, 0.0, 0.0];
const ORIGIN: [f64; 3] = [0.0, 0.0, 0.0];

/// Precision of the shared geometric context
pub const CONTEXT_PRECISION: f64 = 1.0e-5;

/// Entity ids of the Project → Site → Building → Storey chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialHierarchy {
    pub project: EntityId,
    pub site: EntityId,
    pub building: EntityId,
    pub storey: EntityId,
    /// Project⊇Site, Site⊇Building, Building⊇Storey
    pub aggregates: [EntityId; 3],
}

/// A wall or pipe together with the entities that place and shape it
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedElement {
    pub entity: EntityId,
    pub guid: IfcGuid,
    pub name: String,
    /// Placement origin in metres
    pub origin: [f64; 3],
    pub profile: EntityId,
    pub solid: EntityId,
    /// Extrusion depth as written to the solid
    pub depth: f64,
    /// The `IfcRelContainedInSpatialStructure` linking it to the storey
    pub containment: EntityId,
}

/// A complete model ready to be serialized
#[derive(Debug, Clone)]
pub struct GeneratedModel {
    pub document: IfcDocument,
    pub hierarchy: SpatialHierarchy,
    pub wall: PlacedElement,
    pub pipes: Vec<PlacedElement>,
    /// The shared `IfcGeometricRepresentationContext`
    pub context: EntityId,
}

/// Compute the extrusion depth of a pipe starting at `z` inside a wall of
/// `wall_height`
pub fn pipe_depth(index: usize, z: f64, wall_height: f64, policy: DepthPolicy) -> Result<f64> {
    let depth = wall_height - z;
    if depth >= 0.0 {
        return Ok(depth);
    }

    match policy {
        DepthPolicy::Reject => Err(GeneratorError::PipeAboveWall {
            index,
            z,
            wall_height,
        }),
        DepthPolicy::Clamp => {
            warn!(index, z, wall_height, "Pipe starts above the wall, clamping depth to 0");
            Ok(0.0)
        }
        DepthPolicy::Legacy => {
            warn!(index, z, wall_height, depth, "Pipe starts above the wall, keeping negative depth");
            Ok(depth)
        }
    }
}

/// Incrementally builds an IFC4 document
///
/// The geometric context and unit assignment are created up front; the
/// spatial hierarchy is created on first use and shared by every element.
pub struct ModelBuilder {
    document: IfcDocument,
    guids: GuidMode,
    project_name: String,
    depth_policy: DepthPolicy,
    context: EntityId,
    units: EntityId,
    hierarchy: Option<SpatialHierarchy>,
}

impl ModelBuilder {
    pub fn new(project_name: impl Into<String>, guids: GuidMode) -> Self {
        let mut document = IfcDocument::new();

        let wcs_origin = point(&mut document, ORIGIN);
        let wcs = document.create_entity(
            IfcType::IfcAxis2Placement3D,
            vec![wcs_origin.into(), AttributeValue::Null, AttributeValue::Null],
        );
        let context = document.create_entity(
            IfcType::IfcGeometricRepresentationContext,
            vec![
                AttributeValue::string("Body"),
                AttributeValue::string("Model"),
                AttributeValue::Integer(3),
                AttributeValue::Float(CONTEXT_PRECISION),
                wcs.into(),
                AttributeValue::Null,
            ],
        );

        let units = [
            ("LENGTHUNIT", "METRE"),
            ("AREAUNIT", "SQUARE_METRE"),
            ("VOLUMEUNIT", "CUBIC_METRE"),
            ("PLANEANGLEUNIT", "RADIAN"),
        ]
        .into_iter()
        .map(|(unit_type, name)| {
            document.create_entity(
                IfcType::IfcSIUnit,
                vec![
                    AttributeValue::Derived,
                    AttributeValue::enumeration(unit_type),
                    AttributeValue::Null,
                    AttributeValue::enumeration(name),
                ],
            )
        })
        .collect::<Vec<_>>();
        let units = document.create_entity(
            IfcType::IfcUnitAssignment,
            vec![AttributeValue::refs(&units)],
        );

        Self {
            document,
            guids,
            project_name: project_name.into(),
            depth_policy: DepthPolicy::default(),
            context,
            units,
            hierarchy: None,
        }
    }

    /// Set how pipes above the wall are handled
    pub fn with_depth_policy(mut self, policy: DepthPolicy) -> Self {
        self.depth_policy = policy;
        self
    }

    /// The shared geometric representation context
    pub fn context(&self) -> EntityId {
        self.context
    }

    pub fn document(&self) -> &IfcDocument {
        &self.document
    }

    pub fn into_document(self) -> IfcDocument {
        self.document
    }

    /// Create Project, Site, Building and Storey linked by three aggregation
    /// relations. Returns the existing hierarchy on repeated calls.
    pub fn build_hierarchy(&mut self) -> SpatialHierarchy {
        if let Some(hierarchy) = self.hierarchy {
            return hierarchy;
        }

        let guid = self.global_id(|| IfcGuid::from_raw("0RANDOMGUID01"));
        let name = self.project_name.clone();
        let project = self.document.create_entity(
            IfcType::IfcProject,
            vec![
                (&guid).into(),
                AttributeValue::Null,
                AttributeValue::string(name),
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::refs(&[self.context]),
                self.units.into(),
            ],
        );

        let guid = self.global_id(|| IfcGuid::from_raw("0RANDOMGUID02"));
        let mut site_attrs = spatial_attributes(&guid, "Site");
        site_attrs.extend(std::iter::repeat(AttributeValue::Null).take(5));
        let site = self.document.create_entity(IfcType::IfcSite, site_attrs);

        let guid = self.global_id(|| IfcGuid::from_raw("0RANDOMGUID03"));
        let mut building_attrs = spatial_attributes(&guid, "Building");
        building_attrs.extend(std::iter::repeat(AttributeValue::Null).take(3));
        let building = self.document.create_entity(IfcType::IfcBuilding, building_attrs);

        let guid = self.global_id(|| IfcGuid::from_raw("0RANDOMGUID04"));
        let mut storey_attrs = spatial_attributes(&guid, "Floor 1");
        storey_attrs.push(AttributeValue::Float(0.0));
        let storey = self.document.create_entity(IfcType::IfcBuildingStorey, storey_attrs);

        let aggregates = [
            self.aggregate(1, project, site),
            self.aggregate(2, site, building),
            self.aggregate(3, building, storey),
        ];

        let hierarchy = SpatialHierarchy {
            project,
            site,
            building,
            storey,
            aggregates,
        };
        debug!(?hierarchy, "Created spatial hierarchy");
        self.hierarchy = Some(hierarchy);
        hierarchy
    }

    /// Create the wall: a `length` × `thickness` rectangle extruded by
    /// `height`, placed at the world origin and contained in the storey
    pub fn build_wall(&mut self, length: f64, height: f64, thickness: f64) -> PlacedElement {
        let storey = self.build_hierarchy().storey;

        let placement = self.local_placement(ORIGIN);

        let corners = [
            [0.0, 0.0, 0.0],
            [length, 0.0, 0.0],
            [length, thickness, 0.0],
            [0.0, thickness, 0.0],
            [0.0, 0.0, 0.0],
        ];
        let points: Vec<EntityId> = corners
            .into_iter()
            .map(|c| point(&mut self.document, c))
            .collect();
        let polyline = self
            .document
            .create_entity(IfcType::IfcPolyline, vec![AttributeValue::refs(&points)]);
        let profile = self.document.create_entity(
            IfcType::IfcArbitraryClosedProfileDef,
            vec![
                AttributeValue::enumeration("AREA"),
                AttributeValue::Null,
                polyline.into(),
            ],
        );

        let solid = self.extrude(profile, height);
        let shape = self.body_shape(solid);

        let guid = self.global_id(|| IfcGuid::from_raw("WALLGUID1234"));
        let name = "SimpleWall".to_string();
        let entity = self.document.create_entity(
            IfcType::IfcWallStandardCase,
            element_attributes(&guid, &name, placement, shape),
        );

        let rel_guid = self.global_id(|| IfcGuid::from_raw("rel04"));
        let containment = self.contain(&rel_guid, entity, storey);

        debug!(%entity, length, height, thickness, "Created wall");
        PlacedElement {
            entity,
            guid,
            name,
            origin: ORIGIN,
            profile,
            solid,
            depth: height,
            containment,
        }
    }

    /// Create pipe `index` as a circle of `radius` at `(x, y, z)`, extruded
    /// upwards to the top of the wall
    pub fn build_pipe(
        &mut self,
        index: usize,
        x: f64,
        y: f64,
        z: f64,
        radius: f64,
        wall_height: f64,
    ) -> Result<PlacedElement> {
        let depth = pipe_depth(index, z, wall_height, self.depth_policy)?;
        let storey = self.build_hierarchy().storey;

        let origin = [x, y, z];
        let placement = self.local_placement(origin);

        let profile = self.document.create_entity(
            IfcType::IfcCircleProfileDef,
            vec![
                AttributeValue::enumeration("AREA"),
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Float(radius),
            ],
        );
        let solid = self.extrude(profile, depth);
        let shape = self.body_shape(solid);

        let guid = self.global_id(|| IfcGuid::deterministic("PIPEGUID", index));
        let name = format!("Pipe{}", index);
        let entity = self.document.create_entity(
            IfcType::IfcPipeSegment,
            element_attributes(&guid, &name, placement, shape),
        );

        let rel_guid = self.global_id(|| IfcGuid::deterministic("relPipe", index));
        let containment = self.contain(&rel_guid, entity, storey);

        debug!(%entity, index, x, y, z, depth, "Created pipe");
        Ok(PlacedElement {
            entity,
            guid,
            name,
            origin,
            profile,
            solid,
            depth,
            containment,
        })
    }

    fn global_id(&self, readable: impl FnOnce() -> IfcGuid) -> IfcGuid {
        match self.guids {
            GuidMode::Deterministic => readable(),
            GuidMode::Random => IfcGuid::new_random(),
        }
    }

    fn aggregate(&mut self, n: usize, relating: EntityId, related: EntityId) -> EntityId {
        let guid = self.global_id(|| IfcGuid::from_raw(format!("rel{:02}", n)));
        self.document.create_entity(
            IfcType::IfcRelAggregates,
            vec![
                (&guid).into(),
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Null,
                relating.into(),
                AttributeValue::refs(&[related]),
            ],
        )
    }

    fn contain(&mut self, guid: &IfcGuid, element: EntityId, storey: EntityId) -> EntityId {
        self.document.create_entity(
            IfcType::IfcRelContainedInSpatialStructure,
            vec![
                guid.into(),
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::refs(&[element]),
                storey.into(),
            ],
        )
    }

    /// Axis placement at `origin` with Z up and X as reference direction
    fn axis_placement(&mut self, origin: [f64; 3]) -> EntityId {
        let location = point(&mut self.document, origin);
        let axis = direction(&mut self.document, Z_AXIS);
        let ref_direction = direction(&mut self.document, X_AXIS);
        self.document.create_entity(
            IfcType::IfcAxis2Placement3D,
            vec![location.into(), axis.into(), ref_direction.into()],
        )
    }

    /// Absolute placement, not relative to any other placement
    fn local_placement(&mut self, origin: [f64; 3]) -> EntityId {
        let relative = self.axis_placement(origin);
        self.document.create_entity(
            IfcType::IfcLocalPlacement,
            vec![AttributeValue::Null, relative.into()],
        )
    }

    fn extrude(&mut self, profile: EntityId, depth: f64) -> EntityId {
        let position = self.axis_placement(ORIGIN);
        let extrusion = direction(&mut self.document, Z_AXIS);
        self.document.create_entity(
            IfcType::IfcExtrudedAreaSolid,
            vec![
                profile.into(),
                position.into(),
                extrusion.into(),
                AttributeValue::Float(depth),
            ],
        )
    }

    /// Wrap a solid in a 'Body' shape representation and product shape
    fn body_shape(&mut self, solid: EntityId) -> EntityId {
        let representation = self.document.create_entity(
            IfcType::IfcShapeRepresentation,
            vec![
                self.context.into(),
                AttributeValue::string("Body"),
                AttributeValue::string("SweptSolid"),
                AttributeValue::refs(&[solid]),
            ],
        );
        self.document.create_entity(
            IfcType::IfcProductDefinitionShape,
            vec![
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::refs(&[representation]),
            ],
        )
    }
}

fn point(document: &mut IfcDocument, coords: [f64; 3]) -> EntityId {
    document.create_entity(IfcType::IfcCartesianPoint, vec![AttributeValue::reals(&coords)])
}

fn direction(document: &mut IfcDocument, ratios: [f64; 3]) -> EntityId {
    document.create_entity(IfcType::IfcDirection, vec![AttributeValue::reals(&ratios)])
}

/// The nine leading attributes shared by Site, Building and Storey
fn spatial_attributes(guid: &IfcGuid, name: &str) -> Vec<AttributeValue> {
    vec![
        guid.into(),
        AttributeValue::Null,
        AttributeValue::string(name),
        AttributeValue::Null,
        AttributeValue::Null,
        AttributeValue::Null,
        AttributeValue::Null,
        AttributeValue::Null,
        AttributeValue::enumeration("ELEMENT"),
    ]
}

fn element_attributes(
    guid: &IfcGuid,
    name: &str,
    placement: EntityId,
    shape: EntityId,
) -> Vec<AttributeValue> {
    vec![
        guid.into(),
        AttributeValue::Null,
        AttributeValue::string(name),
        AttributeValue::Null,
        AttributeValue::Null,
        placement.into(),
        shape.into(),
        AttributeValue::Null,
        AttributeValue::Null,
    ]
}

/// Build the complete model described by `params`
///
/// Parameters are expected to have passed [`ModelParameters::validate`].
pub fn generate_model(params: &ModelParameters) -> Result<GeneratedModel> {
    let mut builder = ModelBuilder::new(params.project_name.clone(), params.guids)
        .with_depth_policy(params.depth_policy);
    let hierarchy = builder.build_hierarchy();

    let wall = builder.build_wall(params.wall_length, params.wall_height, params.wall_thickness);

    let mut pipes = Vec::with_capacity(params.pipe_positions.len());
    for (index, pos) in params.pipe_positions.iter().enumerate() {
        pipes.push(builder.build_pipe(
            index,
            pos.x,
            pos.y,
            pos.z,
            params.pipe_radius,
            params.wall_height,
        )?);
    }

    let context = builder.context();
    let document = builder.into_document();
    info!(
        entities = document.len(),
        pipes = pipes.len(),
        "Built wall model"
    );

    Ok(GeneratedModel {
        document,
        hierarchy,
        wall,
        pipes,
        context,
    })
}
