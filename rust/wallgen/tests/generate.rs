// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end generation: build, write, and inspect the file through the
//! core decoder.

use approx::assert_abs_diff_eq;
use chrono::{NaiveDate, NaiveDateTime};
use ifc_wallgen::{
    generate_model, run, CollisionPolicy, DepthPolicy, GeneratorConfig, GeneratorError,
    ModelParameters,
};
use ifc_wallgen_core::{EntityDecoder, IfcType};
use rustc_hash::FxHashSet;

fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(14, 7, 0)
        .unwrap()
}

fn config_in(dir: &std::path::Path) -> GeneratorConfig {
    GeneratorConfig {
        output_dir: dir.join("ifc_outputs"),
        ..GeneratorConfig::default()
    }
}

#[test]
fn test_reference_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());

    let report = run(&config, stamp()).unwrap();

    assert_eq!(
        report.path,
        config.output_dir.join("wall_with_pipes_101626_1407.ifc")
    );
    assert!(report.path.is_file());
    assert_abs_diff_eq!(report.wall_depth, 3.0, epsilon = 1e-9);
    assert_eq!(report.pipe_depths.len(), 3);
    for (depth, want) in report.pipe_depths.iter().zip([2.5, 2.0, 1.5]) {
        assert_abs_diff_eq!(*depth, want, epsilon = 1e-9);
    }
    assert_eq!(report.counts.get("IFCPIPESEGMENT"), Some(&3));

    let written: Vec<_> = std::fs::read_dir(&config.output_dir).unwrap().collect();
    assert_eq!(written.len(), 1);
}

#[test]
fn test_spatial_chain_in_file() {
    let tmp = tempfile::tempdir().unwrap();
    let report = run(&config_in(tmp.path()), stamp()).unwrap();
    let content = std::fs::read_to_string(&report.path).unwrap();
    let mut decoder = EntityDecoder::new(&content);

    for ifc_type in [
        IfcType::IfcProject,
        IfcType::IfcSite,
        IfcType::IfcBuilding,
        IfcType::IfcBuildingStorey,
    ] {
        assert_eq!(decoder.decode_all_of_type(ifc_type).unwrap().len(), 1);
    }

    let project = &decoder.decode_all_of_type(IfcType::IfcProject).unwrap()[0];
    let storey = &decoder.decode_all_of_type(IfcType::IfcBuildingStorey).unwrap()[0];
    assert_eq!(project.get_string(2), Some("WallWithPipesProject"));
    assert_eq!(storey.get_string(2), Some("Floor 1"));

    // Walk Project -> Site -> Building -> Storey through the aggregations
    let rels = decoder.decode_all_of_type(IfcType::IfcRelAggregates).unwrap();
    assert_eq!(rels.len(), 3);
    let mut node = project.id;
    let mut depth = 1;
    while let Some(rel) = rels.iter().find(|r| r.get_ref(4) == Some(node)) {
        let related = rel.get_refs(5);
        assert_eq!(related.len(), 1);
        node = related[0];
        depth += 1;
    }
    assert_eq!(depth, 4);
    assert_eq!(node, storey.id);

    // Every element is contained directly in the storey
    let contained = decoder
        .decode_all_of_type(IfcType::IfcRelContainedInSpatialStructure)
        .unwrap();
    assert_eq!(contained.len(), 4);
    assert!(contained.iter().all(|r| r.get_ref(5) == Some(storey.id)));
}

#[test]
fn test_wall_profile_is_closed_rectangle() {
    let tmp = tempfile::tempdir().unwrap();
    let report = run(&config_in(tmp.path()), stamp()).unwrap();
    let content = std::fs::read_to_string(&report.path).unwrap();
    let mut decoder = EntityDecoder::new(&content);

    let wall = &decoder.decode_all_of_type(IfcType::IfcWallStandardCase).unwrap()[0];
    assert_eq!(wall.get_string(2), Some("SimpleWall"));

    let shape = decoder.resolve_ref(wall.get(6).unwrap()).unwrap().unwrap();
    let reps = decoder.resolve_ref_list(shape.get(2).unwrap()).unwrap();
    assert_eq!(reps[0].get_string(1), Some("Body"));
    assert_eq!(reps[0].get_string(2), Some("SweptSolid"));

    let solid = &decoder.resolve_ref_list(reps[0].get(3).unwrap()).unwrap()[0];
    assert_abs_diff_eq!(solid.get_float(3).unwrap(), 3.0, epsilon = 1e-9);

    let profile = decoder.resolve_ref(solid.get(0).unwrap()).unwrap().unwrap();
    assert_eq!(profile.ifc_type, IfcType::IfcArbitraryClosedProfileDef);
    assert_eq!(profile.get_enum(0), Some("AREA"));

    let polyline = decoder.resolve_ref(profile.get(2).unwrap()).unwrap().unwrap();
    let points: Vec<Vec<f64>> = decoder
        .resolve_ref_list(polyline.get(0).unwrap())
        .unwrap()
        .iter()
        .map(|p| p.get_floats(0))
        .collect();

    assert_eq!(points.len(), 5);
    assert_eq!(points[0], points[4]);
    let expected = [[0.0, 0.0], [5.0, 0.0], [5.0, 0.2], [0.0, 0.2], [0.0, 0.0]];
    for (point, [x, y]) in points.iter().zip(expected) {
        assert_abs_diff_eq!(point[0], x, epsilon = 1e-9);
        assert_abs_diff_eq!(point[1], y, epsilon = 1e-9);
        assert_abs_diff_eq!(point[2], 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_pipe_placement_and_radius() {
    let tmp = tempfile::tempdir().unwrap();
    let report = run(&config_in(tmp.path()), stamp()).unwrap();
    let content = std::fs::read_to_string(&report.path).unwrap();
    let mut decoder = EntityDecoder::new(&content);

    let pipes = decoder.decode_all_of_type(IfcType::IfcPipeSegment).unwrap();
    let second = pipes
        .iter()
        .find(|p| p.get_string(2) == Some("Pipe1"))
        .unwrap();
    assert_eq!(second.get_string(0), Some("PIPEGUID0001"));

    let placement = decoder.resolve_ref(second.get(5).unwrap()).unwrap().unwrap();
    assert!(placement.get(0).unwrap().is_null());
    let axes = decoder.resolve_ref(placement.get(1).unwrap()).unwrap().unwrap();
    let location = decoder.resolve_ref(axes.get(0).unwrap()).unwrap().unwrap();
    let axis = decoder.resolve_ref(axes.get(1).unwrap()).unwrap().unwrap();
    let ref_dir = decoder.resolve_ref(axes.get(2).unwrap()).unwrap().unwrap();
    assert_eq!(location.get_floats(0), vec![1.5, 0.25, 1.0]);
    assert_eq!(axis.get_floats(0), vec![0.0, 0.0, 1.0]);
    assert_eq!(ref_dir.get_floats(0), vec![1.0, 0.0, 0.0]);

    let circles = decoder.decode_all_of_type(IfcType::IfcCircleProfileDef).unwrap();
    assert_eq!(circles.len(), 3);
    for circle in &circles {
        assert_abs_diff_eq!(circle.get_float(3).unwrap(), 0.05, epsilon = 1e-9);
    }
}

#[test]
fn test_pipe_count_follows_positions() {
    for count in [0usize, 1, 5] {
        let config = GeneratorConfig {
            pipe_positions_cm: (0..count)
                .map(|i| [50.0 + 60.0 * i as f64, 10.0, 20.0 * i as f64])
                .collect(),
            ..GeneratorConfig::default()
        };
        let params = ModelParameters::from_config(&config);
        let model = generate_model(&params).unwrap();

        assert_eq!(model.pipes.len(), count);
        assert_eq!(model.document.count_of_type(IfcType::IfcPipeSegment), count);
        assert_eq!(
            model
                .document
                .count_of_type(IfcType::IfcRelContainedInSpatialStructure),
            count + 1
        );
    }
}

#[test]
fn test_pipe_identities_are_unique() {
    let config = GeneratorConfig {
        pipe_positions_cm: vec![[100.0, 10.0, 50.0]; 4],
        ..GeneratorConfig::default()
    };
    let model = generate_model(&ModelParameters::from_config(&config)).unwrap();

    let guids: FxHashSet<_> = model.pipes.iter().map(|p| p.guid.as_str()).collect();
    let names: FxHashSet<_> = model.pipes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(guids.len(), 4);
    assert_eq!(names.len(), 4);
    assert_eq!(model.pipes[2].guid.as_str(), "PIPEGUID0002");
    assert_eq!(model.pipes[2].name, "Pipe2");
}

#[test]
fn test_depth_policy_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = GeneratorConfig {
        pipe_positions_cm: vec![[100.0, 10.0, 350.0]],
        ..config_in(tmp.path())
    };

    let err = run(&config, stamp()).unwrap_err();
    assert!(matches!(err, GeneratorError::PipeAboveWall { index: 0, .. }));
    assert!(!config.output_dir.exists());

    config.depth_policy = DepthPolicy::Legacy;
    let report = run(&config, stamp()).unwrap();
    assert_abs_diff_eq!(report.pipe_depths[0], -0.5, epsilon = 1e-9);

    config.depth_policy = DepthPolicy::Clamp;
    let report = run(&config, stamp()).unwrap();
    assert_eq!(report.pipe_depths[0], 0.0);
}

#[test]
fn test_same_minute_collisions() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config_in(tmp.path());

    let first = run(&config, stamp()).unwrap();
    let again = run(&config, stamp()).unwrap();
    assert_eq!(first.path, again.path);
    assert_eq!(std::fs::read_dir(&config.output_dir).unwrap().count(), 1);

    config.on_collision = CollisionPolicy::Suffix;
    let suffixed = run(&config, stamp()).unwrap();
    assert_ne!(suffixed.path, first.path);
    assert_eq!(std::fs::read_dir(&config.output_dir).unwrap().count(), 2);

    config.on_collision = CollisionPolicy::Error;
    assert!(matches!(
        run(&config, stamp()),
        Err(GeneratorError::OutputExists(_))
    ));
}

#[test]
fn test_invalid_dimensions_write_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config_in(tmp.path());
    config.wall.height_cm = 0.0;

    assert!(matches!(
        run(&config, stamp()),
        Err(GeneratorError::InvalidDimension { name: "wall height", .. })
    ));
    assert!(!config.output_dir.exists());
}

#[test]
fn test_header_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        author: "Jo Site".into(),
        organization: "Acme Bau".into(),
        ..config_in(tmp.path())
    };
    let report = run(&config, stamp()).unwrap();
    let content = std::fs::read_to_string(&report.path).unwrap();

    assert!(content.contains(
        "FILE_NAME('wall_with_pipes_101626_1407.ifc','2026-10-16T14:07:00',('Jo Site'),('Acme Bau'),"
    ));
    assert!(content.contains("FILE_SCHEMA(('IFC4'));"));
}

#[test]
fn test_header_text_resembling_data_section() {
    let tmp = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        author: "Team DATA; room #4".into(),
        organization: "FILE_SCHEMA(('IFC2X3'))".into(),
        ..config_in(tmp.path())
    };

    let report = run(&config, stamp()).unwrap();
    assert_eq!(report.counts.values().sum::<usize>(), report.entity_count);
    assert_eq!(report.counts.get("IFCPIPESEGMENT"), Some(&3));
}

#[test]
fn test_runs_in_different_minutes_keep_both_files() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let later = NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(14, 8, 0)
        .unwrap();

    let first = run(&config, stamp()).unwrap();
    let second = run(&config, later).unwrap();

    assert_eq!(
        second.path,
        config.output_dir.join("wall_with_pipes_101626_1408.ifc")
    );
    assert_ne!(first.path, second.path);
    assert!(first.path.is_file());
    assert!(second.path.is_file());
    assert_eq!(std::fs::read_dir(&config.output_dir).unwrap().count(), 2);
}
