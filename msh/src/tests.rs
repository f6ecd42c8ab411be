use crate::prelude::*;
use crate::util::Record;

/// Assembles an MSH file out of section bodies (each ending in a newline).
fn fixture(
  names: &str,
  entities: &str,
  nodes: &str,
  elements: &str
) -> String {
  return format!(
    concat!(
      "$MeshFormat\n4.1 0 8\n$EndMeshFormat\n",
      "$PhysicalNames\n{}$EndPhysicalNames\n",
      "$Entities\n{}$EndEntities\n",
      "$Nodes\n{}$EndNodes\n",
      "$Elements\n{}$EndElements\n"
    ),
    names,
    entities,
    nodes,
    elements
  );
}

/// Physical names of the minimal mesh.
const NAMES: &str = "2\n0 10 \"Corner\"\n2 20 \"Domain\"\n";
/// One point entity in group 10, one surface in group 20 bounded by it.
const ENTITIES: &str = "1 0 1 0\n1 0 0 0 1 10\n1 0 0 0 1 0 0 1 20 1 -1\n";
/// Two vertices in one block.
const NODES: &str = "1 2 1 2\n2 1 0 2\n1\n2\n0 0 0\n1 0 0\n";
/// A single line element on surface 1.
const ELEMENTS: &str = "1 1 1 1\n2 1 1 1\n1 1 2\n";

/// The minimal mesh.
fn minimal() -> String {
  return fixture(NAMES, ENTITIES, NODES, ELEMENTS);
}

/// A mesh with one triangle on a surface that is in three groups.
fn three_groups() -> String {
  return fixture(
    "0\n",
    "0 0 1 0\n1 0 0 0 1 1 0 3 1 2 3 0\n",
    "1 3 1 3\n2 1 0 3\n1\n2\n3\n0 0 0\n1 0 0\n0 1 0\n",
    "1 1 1 1\n2 1 2 1\n7 3 1 2\n"
  );
}

/// Builds a grid with the material ID field.
fn grid_of(msh: &MshFile) -> VtkGrid {
  let resolved = msh.resolve().unwrap();
  return VtkGrid::build(
    DEFAULT_TITLE,
    &msh.vertices,
    &resolved,
    &[CellField::MaterialId]
  ).unwrap();
}

#[test]
fn test_minimal_end_to_end() {
  let msh = MshFile::parse_str(&minimal()).unwrap();
  assert_eq!(msh.physical_names.len(), 2);
  assert_eq!(msh.entities.count(Dimension::Point), 1);
  assert_eq!(msh.entities.count(Dimension::Surface), 1);
  assert_eq!(msh.entities.surfaces[0].boundary, vec![1]);
  assert_eq!(msh.vertices.len(), 2);
  assert_eq!(msh.elements.len(), 1);
  let grid = grid_of(&msh);
  assert_eq!(grid.points.len(), 2);
  assert_eq!(grid.points[1].x, 1.0);
  assert_eq!(grid.cells, vec![vec![0, 1]]);
  assert_eq!(grid.cell_list_size(), 3);
  assert_eq!(grid.cell_kinds, vec![ElementKind::Line]);
  assert_eq!(grid.cell_kinds[0].cell_type() as u8, 3);
  assert_eq!(grid.field_values(CellField::MaterialId), &[20]);
  let text = grid.to_legacy_ascii().unwrap();
  assert!(text.starts_with("# vtk DataFile Version 2.0"));
  assert!(text.contains(DEFAULT_TITLE));
  assert!(text.contains("ASCII"));
  assert!(text.contains("UNSTRUCTURED_GRID"));
  assert!(text.contains("POINTS 2 double"));
  assert!(text.contains("CELLS 1 3"));
  assert!(text.contains("CELL_TYPES 1"));
  assert!(text.contains("CELL_DATA 1"));
  assert!(text.contains("SCALARS MaterialID int 1"));
  // one cell 0-1, of type 3, in group 20
  let has_line = |s: &str| text.lines().any(|l| l.trim() == s);
  assert!(has_line("2 0 1"));
  assert!(has_line("3"));
  assert!(has_line("20"));
  // points come before cells, cells before types, types before data
  let pos = |s: &str| text.find(s).unwrap();
  assert!(pos("POINTS") < pos("CELLS"));
  assert!(pos("CELLS") < pos("CELL_TYPES"));
  assert!(pos("CELL_TYPES") < pos("CELL_DATA"));
}

#[test]
fn test_duplication_per_group() {
  let msh = MshFile::parse_str(&three_groups()).unwrap();
  let grid = grid_of(&msh);
  assert_eq!(grid.num_cells(), 3);
  assert!(grid.cells.iter().all(|c| c == &grid.cells[0]));
  assert_eq!(grid.cell_kinds, vec![ElementKind::Triangle; 3]);
  assert!(grid.cell_kinds.iter().all(|k| k.cell_type() as u8 == 5));
  assert_eq!(grid.field_values(CellField::MaterialId), &[1, 2, 3]);
  assert_eq!(grid.cell_list_size(), 12);
  let counts = msh.cells_per_group().unwrap();
  assert_eq!(counts.get(&(Dimension::Surface, 2)), Some(&1));
  assert_eq!(counts.len(), 3);
}

#[test]
fn test_index_conversion() {
  let msh = MshFile::parse_str(&three_groups()).unwrap();
  assert_eq!(msh.elements[0].tag, 7);
  assert_eq!(msh.elements[0].vertices, vec![3, 1, 2]);
  let grid = grid_of(&msh);
  assert_eq!(grid.cells[0], vec![2, 0, 1]);
}

#[test]
fn test_physical_name_counts() {
  for names in ["3\n0 10 a\n2 20 b\n", "1\n0 10 a\n2 20 b\n"] {
    let err = MshFile::parse_str(&fixture(names, ENTITIES, NODES, ELEMENTS))
      .unwrap_err();
    assert!(matches!(
      err,
      MshError::CountMismatch { what: CountedRecord::PhysicalNames, .. }
    ));
  }
}

#[test]
fn test_entity_counts() {
  let records = "1 0 0 0 1 10\n1 0 0 0 1 0 0 1 20 1 -1\n";
  let headers = [
    "2 0 1 0", "0 0 1 0", "1 1 1 0", "1 0 2 0", "1 0 0 0", "1 0 1 1"
  ];
  for header in headers {
    let entities = format!("{}\n{}", header, records);
    let err = MshFile::parse_str(&fixture(NAMES, &entities, NODES, ELEMENTS))
      .unwrap_err();
    assert!(
      matches!(
        err,
        MshError::CountMismatch { what: CountedRecord::Entities(_), .. }
      ),
      "header \"{}\" gave {:?}",
      header,
      err
    );
  }
}

#[test]
fn test_huge_declared_counts() {
  let names = "18446744073709551615\n0 10 a\n";
  assert!(matches!(
    MshFile::parse_str(&fixture(names, ENTITIES, NODES, ELEMENTS)),
    Err(MshError::CountMismatch {
      what: CountedRecord::PhysicalNames,
      declared: usize::MAX,
      parsed: 1
    })
  ));
  let entities = ENTITIES.replacen("1 0 1 0", "1 18446744073709551615 1 0", 1);
  assert!(matches!(
    MshFile::parse_str(&fixture(NAMES, &entities, NODES, ELEMENTS)),
    Err(MshError::CountMismatch {
      what: CountedRecord::Entities(Dimension::Curve),
      declared: usize::MAX,
      ..
    })
  ));
}

#[test]
fn test_vertex_counts() {
  for header in ["1 3 1 2", "1 1 1 2"] {
    let nodes = NODES.replacen("1 2 1 2", header, 1);
    let err = MshFile::parse_str(&fixture(NAMES, ENTITIES, &nodes, ELEMENTS))
      .unwrap_err();
    assert!(matches!(
      err,
      MshError::CountMismatch { what: CountedRecord::Vertices, .. }
    ));
  }
  let nodes = NODES.replacen("1 2 1 2", "1 3 1 2", 1);
  let err = MshFile::parse_str(&fixture(NAMES, ENTITIES, &nodes, ELEMENTS))
    .unwrap_err();
  assert_eq!(err.to_string(), "expected 3 vertices, but found 2");
}

#[test]
fn test_vertex_tag_range() {
  let nodes = NODES.replacen("1 2 1 2", "1 2 1 3", 1);
  let err = MshFile::parse_str(&fixture(NAMES, ENTITIES, &nodes, ELEMENTS))
    .unwrap_err();
  assert!(matches!(
    err,
    MshError::TagRangeMismatch { bound: TagBound::Max, declared: 3, found: 2 }
  ));
  let nodes = NODES.replacen("1 2 1 2", "1 2 0 2", 1);
  let err = MshFile::parse_str(&fixture(NAMES, ENTITIES, &nodes, ELEMENTS))
    .unwrap_err();
  assert!(matches!(
    err,
    MshError::TagRangeMismatch { bound: TagBound::Min, declared: 0, found: 1 }
  ));
}

#[test]
fn test_empty_nodes_skip_tag_range() {
  let text = fixture(NAMES, ENTITIES, "0 0 0 0\n", "0 0 0 0\n");
  let msh = MshFile::parse_str(&text).unwrap();
  assert!(msh.vertices.is_empty());
  assert!(msh.elements.is_empty());
}

#[test]
fn test_dangling_reference() {
  let elements = "1 1 1 1\n2 7 1 1\n1 1 2\n";
  let msh = MshFile::parse_str(&fixture(NAMES, ENTITIES, NODES, elements))
    .unwrap();
  let err = msh.resolve().unwrap_err();
  match err {
    MshError::DanglingReference { element, owner } => {
      assert_eq!(element, 1);
      assert_eq!(owner, EntityRef::from((Dimension::Surface, 7)));
    },
    _ => panic!("expected a dangling reference, got {:?}", err)
  }
  // same tag, wrong dimension
  let elements = "1 1 1 1\n1 1 1 1\n1 1 2\n";
  let msh = MshFile::parse_str(&fixture(NAMES, ENTITIES, NODES, elements))
    .unwrap();
  assert!(matches!(
    msh.resolve(),
    Err(MshError::DanglingReference { .. })
  ));
}

#[test]
fn test_unsupported_field() {
  let msh = MshFile::parse_str(&minimal()).unwrap();
  let mut job = Conversion::new("mesh.msh");
  job.fields = vec!["Pressure".to_string()];
  match job.render(&msh) {
    Err(MshError::UnsupportedField(name)) => assert_eq!(name, "Pressure"),
    other => panic!("expected an unsupported field, got {:?}", other)
  }
}

#[test]
fn test_unsupported_field_writes_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let input = dir.path().join("mesh.msh");
  std::fs::write(&input, minimal()).unwrap();
  let base = dir.path().join("out");
  let res = convert(&base, &input, &["MaterialID", "Pressure"]);
  assert!(matches!(res, Err(MshError::UnsupportedField(_))));
  assert!(!dir.path().join("out.vtk").exists());
}

#[test]
fn test_dangling_reference_writes_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let input = dir.path().join("mesh.msh");
  let elements = "1 1 1 1\n2 7 1 1\n1 1 2\n";
  std::fs::write(&input, fixture(NAMES, ENTITIES, NODES, elements)).unwrap();
  let base = dir.path().join("out");
  let res = convert(&base, &input, &["MaterialID"]);
  assert!(matches!(res, Err(MshError::DanglingReference { .. })));
  assert!(!dir.path().join("out.vtk").exists());
}

#[test]
fn test_convert_writes_file() {
  let dir = tempfile::tempdir().unwrap();
  let input = dir.path().join("mesh.msh");
  std::fs::write(&input, minimal()).unwrap();
  let base = dir.path().join("mesh.v2");
  let path = convert(&base, &input, &["MaterialID"]).unwrap();
  assert_eq!(path, dir.path().join("mesh.v2.vtk"));
  let text = std::fs::read_to_string(&path).unwrap();
  assert!(text.contains("CELLS 1 3"));
  assert!(text.contains("MaterialID"));
}

#[test]
fn test_conversion_defaults() {
  let job = Conversion::new("meshes/box.msh");
  assert_eq!(job.output_path(), std::path::PathBuf::from("meshes/box.vtk"));
  assert_eq!(job.fields, vec!["MaterialID".to_string()]);
  let mut twice = job.clone();
  twice.fields.push("MaterialID".to_string());
  assert_eq!(twice.requested_fields().unwrap(), vec![CellField::MaterialId]);
}

#[test]
fn test_no_fields_no_cell_data() {
  let msh = MshFile::parse_str(&minimal()).unwrap();
  let mut job = Conversion::new("mesh.msh");
  job.fields.clear();
  let text = job.render(&msh).unwrap();
  assert!(text.contains("CELL_TYPES 1"));
  assert!(!text.contains("MaterialID"));
}

#[test]
fn test_unsupported_element_type() {
  // a point element on point entity 1, which is in group 10
  let elements = "2 2 1 2\n2 1 1 1\n1 1 2\n0 1 15 1\n2 1\n";
  let msh = MshFile::parse_str(&fixture(NAMES, ENTITIES, NODES, elements))
    .unwrap();
  let resolved = msh.resolve().unwrap();
  let err = VtkGrid::build("", &msh.vertices, &resolved, &[]).unwrap_err();
  assert!(matches!(
    err,
    MshError::UnsupportedElementType { element: 2, code: 15 }
  ));
}

#[test]
fn test_groupless_elements_dropped() {
  // curve 1 is in no physical group
  let entities = concat!(
    "1 1 1 0\n",
    "1 0 0 0 1 10\n",
    "1 0 0 0 1 0 0 0 2 1 -1\n",
    "1 0 0 0 1 0 0 1 20 1 -1\n"
  );
  let elements = "2 2 1 2\n1 1 1 1\n1 1 2\n2 1 1 1\n2 2 1\n";
  let msh = MshFile::parse_str(&fixture(NAMES, entities, NODES, elements))
    .unwrap();
  assert_eq!(msh.elements.len(), 2);
  let grid = grid_of(&msh);
  assert_eq!(grid.cells, vec![vec![1, 0]]);
  assert_eq!(grid.field_values(CellField::MaterialId), &[20]);
  // groupless elements of unknown type are dropped before the type lookup
  let elements = "2 2 1 2\n1 1 15 1\n1 1\n2 1 1 1\n2 2 1\n";
  let msh = MshFile::parse_str(&fixture(NAMES, entities, NODES, elements))
    .unwrap();
  assert_eq!(grid_of(&msh).num_cells(), 1);
}

#[test]
fn test_element_stray_lines() {
  let elements = "2 2 1 2\n\n2 1 1 1\n1 1 2\nthis is junk\n\n2 1 1 1\n5 2 1\n";
  let msh = MshFile::parse_str(&fixture(NAMES, ENTITIES, NODES, elements))
    .unwrap();
  let tags: Vec<usize> = msh.elements.iter().map(|e| e.tag).collect();
  assert_eq!(tags, vec![1, 5]);
}

#[test]
fn test_element_scanner_states() {
  let rec = |text| Record::new(SectionKind::Elements, 1, text);
  let mut scanner = ElementScanner::new();
  assert_eq!(scanner.state(), ElementScanState::ExpectHeader);
  assert_eq!(scanner.consume(&rec("1 2 3")).unwrap(), ElementLine::Skipped);
  // an empty block leaves us looking for a header
  assert!(matches!(
    scanner.consume(&rec("2 1 2 0")).unwrap(),
    ElementLine::Header(BlockHeader { count: 0, .. })
  ));
  assert_eq!(scanner.state(), ElementScanState::ExpectHeader);
  scanner.consume(&rec("2 1 2 2")).unwrap();
  assert!(matches!(
    scanner.state(),
    ElementScanState::ExpectElement { remaining: 2, .. }
  ));
  // four fields, but we're inside a block so it's a triangle
  assert_eq!(scanner.consume(&rec("1 1 2 3")).unwrap(), ElementLine::Element);
  assert!(scanner.consume(&rec("2 1 0 3")).is_err());
  assert_eq!(scanner.skipped(), 1);
  // the second element was rejected, so the block ends short
  let elements = scanner.finish();
  assert_eq!(elements.len(), 1);
  assert_eq!(elements[0].vertices, vec![1, 2, 3]);
  assert_eq!(elements[0].kind(), Some(ElementKind::Triangle));
}

#[test]
fn test_truncated_element_block() {
  let elements = "1 3 1 3\n2 1 1 3\n1 1 2\n2 2 1\n";
  let msh = MshFile::parse_str(&fixture(NAMES, ENTITIES, NODES, elements))
    .unwrap();
  assert_eq!(msh.elements.len(), 2);
}

#[test]
fn test_vertex_scanner_states() {
  let rec = |text| Record::new(SectionKind::Nodes, 1, text);
  let mut scanner = VertexScanner::new();
  assert_eq!(scanner.state(), VertexScanState::ExpectHeader);
  assert_eq!(scanner.consume(&rec("2 1 0 2")).unwrap(), VertexLine::Header);
  assert_eq!(scanner.state(), VertexScanState::ExpectTag);
  assert_eq!(scanner.consume(&rec("4")).unwrap(), VertexLine::Tag(4));
  scanner.consume(&rec("5")).unwrap();
  scanner.consume(&rec("0 0 0")).unwrap();
  assert_eq!(scanner.state(), VertexScanState::ExpectCoordinate);
  scanner.consume(&rec("1 0 0")).unwrap();
  assert_eq!(scanner.state(), VertexScanState::ExpectHeader);
  // parametric coordinates have the wrong field count and are ignored
  assert_eq!(
    scanner.consume(&rec("0 0 0 0.5 1")).unwrap(),
    VertexLine::Ignored
  );
  assert_eq!(scanner.consume(&rec("")).unwrap(), VertexLine::Ignored);
  assert!(scanner.consume(&rec("x")).is_err());
  let vertices = scanner.finish();
  assert_eq!(vertices.len(), 2);
  assert_eq!(vertices[0].tag, 4);
  assert_eq!(vertices[1].tag, 5);
  assert_eq!(vertices[1].coords.x, 1.0);
}

#[test]
fn test_vertices_across_blocks() {
  let nodes = "2 3 1 3\n0 1 0 1\n1\n0 0 0\n2 1 0 2\n2\n3\n1 0 0\n0 1 0\n";
  let msh = MshFile::parse_str(&fixture(NAMES, ENTITIES, nodes, ELEMENTS))
    .unwrap();
  let tags: Vec<usize> = msh.vertices.iter().map(|v| v.tag).collect();
  assert_eq!(tags, vec![1, 2, 3]);
  assert_eq!(msh.vertices[2].coords.y, 1.0);
}

#[test]
fn test_missing_sections() {
  let text = minimal().replace("$EndNodes\n", "");
  assert!(matches!(
    MshFile::parse_str(&text),
    Err(MshError::MissingSection {
      section: SectionKind::Nodes,
      marker: Marker::Closing
    })
  ));
  let text = minimal().replace("$PhysicalNames\n", "");
  assert!(matches!(
    MshFile::parse_str(&text),
    Err(MshError::MissingSection {
      section: SectionKind::PhysicalNames,
      marker: Marker::Opening
    })
  ));
}

#[test]
fn test_section_locations() {
  let text = minimal();
  let lines: Vec<&str> = text.lines().collect();
  let sections = Sections::locate(&lines).unwrap();
  assert_eq!(sections.physical_names, SectionRange { start: 3, end: 7 });
  let body = sections.body(SectionKind::Entities, &lines);
  assert_eq!(body.lines.len(), 3);
  assert_eq!(body.line_number(0), 10);
}

#[test]
fn test_crlf_input() {
  let text = minimal().replace('\n', "\r\n");
  let msh = MshFile::parse_str(&text).unwrap();
  assert_eq!(msh.physical_names[1].name, "\"Domain\"");
  assert_eq!(grid_of(&msh).num_cells(), 1);
}

#[test]
fn test_physical_names() {
  let names = "2\n2 20   \"Left wall\"  \n3 4 Steel\n";
  let msh = MshFile::parse_str(&fixture(names, ENTITIES, NODES, ELEMENTS))
    .unwrap();
  assert_eq!(msh.physical_names[0].dimension, Dimension::Surface);
  assert_eq!(msh.physical_names[0].name, "\"Left wall\"");
  assert_eq!(msh.physical_name(Dimension::Volume, 4), Some("Steel"));
  assert_eq!(msh.physical_name(Dimension::Curve, 4), None);
  let names = "1\n5 1 Bad\n";
  assert!(matches!(
    MshFile::parse_str(&fixture(names, ENTITIES, NODES, ELEMENTS)),
    Err(MshError::Malformed { section: SectionKind::PhysicalNames, .. })
  ));
}

#[test]
fn test_entity_records() {
  let entities = concat!(
    "2 1 1 1\n",
    "1 0 0 0 0\n",
    "2 1 1 0 2 3 4\n",
    "1 0 0 0 1 1 0 1 5 2 1 -2\n",
    "1 0 0 0 1 1 0 2 6 7 1 -1\n",
    "1 0 0 0 1 1 1 0 1 1\n"
  );
  let msh = MshFile::parse_str(&fixture(NAMES, entities, NODES, ELEMENTS))
    .unwrap();
  let e = &msh.entities;
  assert_eq!(e.points[0].physical_groups, Vec::<usize>::new());
  assert_eq!(e.points[1].physical_groups, vec![3, 4]);
  assert_eq!(e.points[1].coords.y, 1.0);
  assert_eq!(e.curves[0].boundary, vec![1, 2]);
  assert_eq!(e.surfaces[0].physical_groups, vec![6, 7]);
  assert_eq!(e.surfaces[0].bbox_max.y, 1.0);
  assert_eq!(e.volumes[0].boundary, vec![1]);
  let found = e.find(EntityRef::from((Dimension::Surface, 1))).unwrap();
  assert_eq!(found.physical_groups(), &[6, 7]);
  assert_eq!(found.dimension(), Dimension::Surface);
  assert_eq!(e.iter().count(), 5);
  // too few physical group fields
  let entities = "1 0 0 0\n1 0 0 0 2 10\n";
  assert!(matches!(
    MshFile::parse_str(&fixture(NAMES, entities, NODES, ELEMENTS)),
    Err(MshError::Malformed { section: SectionKind::Entities, line: 11, .. })
  ));
}

#[test]
fn test_wrong_arity_still_written() {
  // a "triangle" with only two vertices is written as-is
  let elements = "1 1 1 1\n2 1 2 1\n1 1 2\n";
  let parsed = MshFile::parse_str(&fixture(NAMES, ENTITIES, NODES, elements))
    .unwrap();
  let grid = grid_of(&parsed);
  assert_eq!(grid.cells, vec![vec![0, 1]]);
  assert_eq!(grid.cell_kinds, vec![ElementKind::Triangle]);
  assert_eq!(ElementKind::Triangle.num_vertices(), 3);
  assert_eq!(ElementKind::Triangle.code(), 2);
}
