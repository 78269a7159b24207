// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write a small document and read it back through the scanner and decoder.

use ifc_wallgen_core::{
    file_schema, AttributeValue, EntityDecoder, EntityScanner, IfcDocument, IfcGuid, IfcType,
    StepWriter,
};

fn sample_document() -> IfcDocument {
    let mut doc = IfcDocument::new();
    doc.header_mut().name = "sample.ifc".into();
    doc.header_mut().time_stamp = "2026-10-16T09:30:00".into();

    let origin = doc.create_entity(
        IfcType::IfcCartesianPoint,
        vec![AttributeValue::reals(&[0.0, 0.0, 0.0])],
    );
    let corner = doc.create_entity(
        IfcType::IfcCartesianPoint,
        vec![AttributeValue::reals(&[5.0, 0.2, 0.0])],
    );
    doc.create_entity(
        IfcType::IfcPolyline,
        vec![AttributeValue::refs(&[origin, corner, origin])],
    );

    let guid = IfcGuid::from_raw("0RANDOMGUID01");
    doc.create_entity(
        IfcType::IfcProject,
        vec![
            (&guid).into(),
            AttributeValue::Null,
            AttributeValue::string("Wand mit Rohren – Größe 'A'"),
            AttributeValue::Null,
            AttributeValue::Null,
            AttributeValue::Null,
            AttributeValue::Null,
            AttributeValue::Null,
            AttributeValue::Null,
        ],
    );
    doc
}

#[test]
fn test_header_is_not_scanned_as_data() {
    let text = StepWriter::new(&sample_document()).to_step_string().unwrap();

    assert!(text.starts_with("ISO-10303-21;\nHEADER;\n"));
    assert!(text.contains("FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');"));
    assert!(text.ends_with("ENDSEC;\nEND-ISO-10303-21;\n"));
    assert_eq!(file_schema(&text), Some("IFC4"));

    let counts = EntityScanner::new(&text).count_by_type();
    assert_eq!(counts.values().sum::<usize>(), 4);
    assert_eq!(counts.get("IFCCARTESIANPOINT"), Some(&2));
}

#[test]
fn test_decode_written_entities() {
    let text = StepWriter::new(&sample_document()).to_step_string().unwrap();
    let mut decoder = EntityDecoder::new(&text);

    assert_eq!(decoder.entity_count(), 4);

    let polyline = decoder.decode_by_id(3).unwrap();
    assert_eq!(polyline.ifc_type, IfcType::IfcPolyline);
    assert_eq!(polyline.get_refs(0), vec![1, 2, 1]);

    let points = decoder.resolve_ref_list(polyline.get(0).unwrap()).unwrap();
    assert_eq!(points[1].get_floats(0), vec![5.0, 0.2, 0.0]);
    assert_eq!(points[0].get_floats(0), points[2].get_floats(0));

    let project = decoder.decode_by_id(4).unwrap();
    assert_eq!(project.get_string(0), Some("0RANDOMGUID01"));
    assert_eq!(project.get_string(2), Some("Wand mit Rohren – Größe 'A'"));
    assert!(project.get(1).unwrap().is_null());
}

#[test]
fn test_write_to_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.ifc");

    let doc = sample_document();
    StepWriter::new(&doc).write_to_path(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, StepWriter::new(&doc).to_step_string().unwrap());
}

#[test]
fn test_failed_write_keeps_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.ifc");
    std::fs::write(&path, "previous model").unwrap();

    let mut doc = IfcDocument::new();
    doc.create_entity(
        IfcType::IfcCartesianPoint,
        vec![AttributeValue::reals(&[f64::NAN, 0.0, 0.0])],
    );

    assert!(StepWriter::new(&doc).write_to_path(&path).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous model");
}
