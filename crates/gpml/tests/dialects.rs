//! Loading fixtures across the historical dialects.

use float_cmp::approx_eq;

use gpml::element::{LineStyle, ObjectKind};
use gpml::model::{PathwayModel, RefTarget};
use gpml::{ConversionError, load_from};

fn load(xml: &str) -> PathwayModel {
    load_from(xml.as_bytes(), false).unwrap()
}

fn first_of(model: &PathwayModel, kind: ObjectKind) -> gpml::model::ElementId {
    model
        .elements()
        .find(|(_, el)| el.kind() == kind)
        .map(|(id, _)| id)
        .expect("element of requested kind")
}

#[test]
fn arrow_head_defaulting_in_2008a() {
    // no Head on the first point, ArrowHead on the last: the start keeps the
    // default decoration, the end becomes an arrow
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2008a" Name="test">
        <Graphics BoardWidth="10000" BoardHeight="10000" />
        <Line>
          <Graphics>
            <Point x="1500" y="1500" />
            <Point x="3000" y="3000" ArrowHead="Arrow" />
          </Graphics>
        </Line>
    </Pathway>"#;
    let model = load(xml);
    let line = model.element(first_of(&model, ObjectKind::Line)).unwrap();
    assert_eq!(line.start_arrow.name(), "Line");
    assert_eq!(line.end_arrow.name(), "Arrow");
}

#[test]
fn deprecated_head_attribute_names_the_end_decoration() {
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2007" Name="test">
        <Graphics BoardWidth="10000" BoardHeight="10000" />
        <Line>
          <Graphics>
            <Point x="0" y="0" Head="TBar" />
            <Point x="1500" y="0" />
          </Graphics>
        </Line>
    </Pathway>"#;
    let model = load(xml);
    let line = model.element(first_of(&model, ObjectKind::Line)).unwrap();
    assert_eq!(line.end_arrow.name(), "TBar");

    // an ArrowHead on the last point overrides the deprecated attribute
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2007" Name="test">
        <Graphics BoardWidth="10000" BoardHeight="10000" />
        <Line>
          <Graphics>
            <Point x="0" y="0" Head="TBar" />
            <Point x="1500" y="0" ArrowHead="Arrow" />
          </Graphics>
        </Line>
    </Pathway>"#;
    let model = load(xml);
    let line = model.element(first_of(&model, ObjectKind::Line)).unwrap();
    assert_eq!(line.end_arrow.name(), "Arrow");
}

#[test]
fn legacy_coordinates_are_divided_by_fifteen() {
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2007" Name="test">
        <Graphics BoardWidth="10000" BoardHeight="10000" />
        <DataNode TextLabel="GENE">
          <Graphics CenterX="1500.0" CenterY="750.0" Width="900.0" Height="300.0" />
          <Xref Database="Entrez Gene" ID="1234" />
        </DataNode>
    </Pathway>"#;
    let model = load(xml);
    let node = model.element(first_of(&model, ObjectKind::DataNode)).unwrap();
    assert!(approx_eq!(f64, node.center_x, 100.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, node.center_y, 50.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, node.width, 60.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, node.height, 20.0, epsilon = 1e-9));
    assert_eq!(node.text_label, "GENE");
    assert_eq!(node.xref.database, "Entrez Gene");
}

#[test]
fn backpage_head_is_preserved_as_dynamic_property() {
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2008a" Name="test">
        <Graphics BoardWidth="10000" BoardHeight="10000" />
        <DataNode TextLabel="GENE" BackpageHead="old header text">
          <Graphics CenterX="0" CenterY="0" Width="900" Height="300" />
          <Xref Database="" ID="" />
        </DataNode>
    </Pathway>"#;
    let model = load(xml);
    let node = model.element(first_of(&model, ObjectKind::DataNode)).unwrap();
    assert_eq!(
        node.dynamic_properties
            .get("org.pathvisio.model.BackpageHead")
            .map(String::as_str),
        Some("old header text")
    );
}

#[test]
fn duplicate_graph_ids_fail_the_load() {
    let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="test">
        <Graphics BoardWidth="500" BoardHeight="500" />
        <DataNode TextLabel="A" GraphId="n1">
          <Graphics CenterX="10" CenterY="10" Width="80" Height="20" />
          <Xref Database="" ID="" />
        </DataNode>
        <DataNode TextLabel="B" GraphId="n1">
          <Graphics CenterX="200" CenterY="10" Width="80" Height="20" />
          <Xref Database="" ID="" />
        </DataNode>
    </Pathway>"#;
    let err = load_from(xml.as_bytes(), false).unwrap_err();
    assert!(matches!(err, ConversionError::DuplicateGraphId { id } if id == "n1"));
}

#[test]
fn unrecognized_namespace_reports_the_namespace() {
    let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2099" Name="future" />"#;
    let err = load_from(xml.as_bytes(), false).unwrap_err();
    match err {
        ConversionError::UnrecognizedNamespace { namespace } => {
            assert_eq!(namespace, "http://pathvisio.org/GPML/2099");
        }
        other => panic!("expected UnrecognizedNamespace, got {other}"),
    }
}

#[test]
fn malformed_xml_and_wrong_root_are_fatal() {
    assert!(matches!(
        load_from("<Pathway".as_bytes(), false).unwrap_err(),
        ConversionError::Malformed(_)
    ));
    assert!(matches!(
        load_from(r#"<NotAPathway xmlns="http://pathvisio.org/GPML/2013a" />"#.as_bytes(), false)
            .unwrap_err(),
        ConversionError::WrongRootElement { found } if found == "NotAPathway"
    ));
}

#[test]
fn line_id_backfill_is_deterministic() {
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2008a" Name="test">
        <Graphics BoardWidth="10000" BoardHeight="10000" />
        <Line>
          <Graphics>
            <Point x="150" y="300" />
            <Point x="600" y="900" ArrowHead="Arrow" />
          </Graphics>
        </Line>
    </Pathway>"#;
    let first = load(xml);
    let second = load(xml);
    let id_of = |model: &PathwayModel| {
        model
            .element(first_of(model, ObjectKind::Line))
            .unwrap()
            .graph_id
            .clone()
            .expect("backfilled id")
    };
    let first_id = id_of(&first);
    assert_eq!(first_id, id_of(&second));
    assert!(first_id.starts_with("id"));
}

#[test]
fn missing_required_attribute_skips_only_that_element() {
    // the first DataNode lacks its Graphics entirely; the second is intact
    let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="test">
        <Graphics BoardWidth="500" BoardHeight="500" />
        <DataNode TextLabel="broken" GraphId="bad">
          <Xref Database="" ID="" />
        </DataNode>
        <DataNode TextLabel="ok" GraphId="good">
          <Graphics CenterX="10" CenterY="10" Width="80" Height="20" />
          <Xref Database="" ID="" />
        </DataNode>
    </Pathway>"#;
    let model = load(xml);
    assert!(model.element_by_graph_id("bad").is_none());
    assert!(model.element_by_graph_id("good").is_some());
}

#[test]
fn strict_validation_rejects_undeclared_attributes() {
    let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="test" Mood="festive">
        <Graphics BoardWidth="500" BoardHeight="500" />
    </Pathway>"#;
    // lenient load tolerates the stray attribute
    load_from(xml.as_bytes(), false).unwrap();
    // strict validation does not
    let err = load_from(xml.as_bytes(), true).unwrap_err();
    assert!(matches!(err, ConversionError::SchemaValidation { .. }));
}

#[test]
fn deprecated_shapes_convert_with_styling() {
    let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="test">
        <Graphics BoardWidth="500" BoardHeight="500" />
        <Shape GraphId="s1">
          <Graphics CenterX="100" CenterY="100" Width="200" Height="100" ShapeType="CellA" />
        </Shape>
        <Shape GraphId="s2">
          <Graphics CenterX="300" CenterY="100" Width="50" Height="50" ShapeType="Ribosome" />
        </Shape>
    </Pathway>"#;
    let model = load(xml);
    let cell = model.element(model.element_by_graph_id("s1").unwrap()).unwrap();
    assert_eq!(cell.shape_kind.name(), "Oval");
    assert_eq!(cell.line_style, LineStyle::Double);
    assert_eq!(cell.line_thickness, 3.0);
    assert_eq!(cell.color, gpml::color::Color::LIGHT_GRAY);

    let ribosome = model.element(model.element_by_graph_id("s2").unwrap()).unwrap();
    assert_eq!(ribosome.shape_kind.name(), "Hexagon");
    assert_eq!(ribosome.line_style, LineStyle::Solid);
}

#[test]
fn absolute_only_linked_points_get_upgraded() {
    // legacy document: the point carries a GraphRef but no relX/relY
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2010a" Name="test">
        <Graphics BoardWidth="500" BoardHeight="500" />
        <DataNode TextLabel="A" GraphId="n1">
          <Graphics CenterX="100" CenterY="60" Width="80" Height="20" />
          <Xref Database="" ID="" />
        </DataNode>
        <Line>
          <Graphics>
            <Point x="140" y="60" GraphRef="n1" />
            <Point x="300" y="60" />
          </Graphics>
        </Line>
    </Pathway>"#;
    let model = load(xml);
    let line = model.element(first_of(&model, ObjectKind::Line)).unwrap();
    let point = &line.points[0];
    assert!(point.relative_set);
    assert!(approx_eq!(f64, point.rel_x, 1.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, point.rel_y, 0.0, epsilon = 1e-9));

    // the invariant holds: absolute equals the re-derived position
    let target = model.resolve("n1").unwrap();
    let derived = model.to_absolute(target, point.rel_x, point.rel_y).unwrap();
    assert!(approx_eq!(f64, point.x, derived.x(), epsilon = 1e-6));
    assert!(approx_eq!(f64, point.y, derived.y(), epsilon = 1e-6));
}

#[test]
fn unresolved_reference_is_kept_not_cleared() {
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2010a" Name="test">
        <Graphics BoardWidth="500" BoardHeight="500" />
        <Line>
          <Graphics>
            <Point x="140" y="60" GraphRef="missing" />
            <Point x="300" y="60" />
          </Graphics>
        </Line>
    </Pathway>"#;
    let model = load(xml);
    let line = model.element(first_of(&model, ObjectKind::Line)).unwrap();
    let point = &line.points[0];
    assert_eq!(point.graph_ref.as_deref(), Some("missing"));
    assert!(!point.relative_set);
    assert_eq!(point.x, 140.0);
}

#[test]
fn anchors_resolve_as_reference_targets() {
    let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="test">
        <Graphics BoardWidth="500" BoardHeight="500" />
        <Interaction GraphId="main">
          <Graphics>
            <Point X="0" Y="100" />
            <Point X="200" Y="100" />
            <Anchor Position="0.5" GraphId="mid" />
          </Graphics>
          <Xref Database="" ID="" />
        </Interaction>
        <GraphicalLine GraphId="branch">
          <Graphics>
            <Point X="100" Y="100" GraphRef="mid" RelX="0.0" RelY="0.0" />
            <Point X="100" Y="250" />
          </Graphics>
        </GraphicalLine>
    </Pathway>"#;
    let model = load(xml);
    let main = model.element_by_graph_id("main").unwrap();
    assert!(matches!(model.resolve("mid"), Some(RefTarget::Anchor(id, 0)) if id == main));

    let branch_id = model.element_by_graph_id("branch").unwrap();
    let branch = model.element(branch_id).unwrap();
    assert_eq!(branch.kind(), ObjectKind::GraphicalLine);
    let anchor_pos = model
        .connector_shape(main)
        .unwrap()
        .point_at_line_coordinate(0.5);
    assert!(approx_eq!(f64, branch.points[0].x, anchor_pos.x(), epsilon = 1e-6));
    assert!(approx_eq!(f64, branch.points[0].y, anchor_pos.y(), epsilon = 1e-6));
}

#[test]
fn states_attach_to_their_parent_node() {
    let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="test">
        <Graphics BoardWidth="500" BoardHeight="500" />
        <DataNode TextLabel="A" GraphId="n1">
          <Graphics CenterX="100" CenterY="60" Width="80" Height="20" />
          <Xref Database="" ID="" />
        </DataNode>
        <State TextLabel="P" GraphRef="n1" GraphId="st1">
          <Graphics RelX="1.0" RelY="1.0" Width="15" Height="15" />
          <Xref Database="" ID="" />
        </State>
    </Pathway>"#;
    let model = load(xml);
    let state_id = model.element_by_graph_id("st1").unwrap();
    let state = model.element(state_id).unwrap();
    assert_eq!(state.kind(), ObjectKind::State);
    assert_eq!(state.graph_ref.as_deref(), Some("n1"));
    // the refresh pass placed the state on the node's corner
    assert!(approx_eq!(f64, state.center_x, 140.0, epsilon = 1e-6));
    assert!(approx_eq!(f64, state.center_y, 70.0, epsilon = 1e-6));
}

#[test]
fn biopax_payload_is_carried_and_upgraded() {
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2008a" Name="test">
        <Graphics BoardWidth="10000" BoardHeight="10000" />
        <Biopax>
          <bp:PublicationXref xmlns:bp="http://www.biopax.org/release/biopax-level2.owl#"
              xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" rdf:id="lit1">
            <bp:ID>12345</bp:ID>
          </bp:PublicationXref>
        </Biopax>
    </Pathway>"#;
    let model = load(xml);
    let biopax = model.element(first_of(&model, ObjectKind::Biopax)).unwrap();
    let payload = biopax.biopax.as_deref().unwrap();
    assert!(payload.contains("bp:PublicationXref"));
    assert!(payload.contains("rdf:id=\"lit1\""));
    assert!(payload.contains("<bp:ID>12345</bp:ID>"));
    assert!(!payload.contains("level2"));
}

#[test]
fn label_outline_maps_to_shape_kind_in_200x() {
    let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2008a" Name="test">
        <Graphics BoardWidth="10000" BoardHeight="10000" />
        <Label TextLabel="note" Outline="Rectangle">
          <Graphics CenterX="150" CenterY="150" Width="900" Height="300" FontSize="150" />
        </Label>
    </Pathway>"#;
    let model = load(xml);
    let label = model.element(first_of(&model, ObjectKind::Label)).unwrap();
    assert_eq!(label.shape_kind.name(), "Rectangle");
    // legacy font sizes are stored at 15x and divided back down
    assert_eq!(label.font_size, 10.0);
}
