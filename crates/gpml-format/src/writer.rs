//! Writing the canonical model as a current-dialect GPML document.
//!
//! Saving always targets the newest dialect regardless of what was loaded.
//! The writer walks elements in stable z-order, elides attributes equal to
//! their schema defaults, and emits children in the structural order the
//! schema demands, because legacy consumers are order-sensitive.

use std::io::Write;

use log::info;
use roxmltree::Document;

use gpml_core::element::{LineStyle, MPoint, ObjectKind, PathwayElement};
use gpml_core::model::{ElementId, PathwayModel};

use crate::dialect::{DialectId, NS_GPML_2013A};
use crate::error::ConversionError;
use crate::schema::AttributeSchema;
use crate::validate;
use crate::xml::{XmlElement, XmlNode, serialize_document};

/// Options for a save.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Validate the produced document against the current dialect's schema
    /// before handing it out.
    pub validate: bool,
}

/// Required structural order of the root's element children.
const TAG_ORDER: &[&str] = &[
    "Comment",
    "BiopaxRef",
    "Graphics",
    "DataNode",
    "State",
    "Interaction",
    "Line",
    "GraphicalLine",
    "Label",
    "Shape",
    "Group",
    "InfoBox",
    "Legend",
    "Biopax",
];

fn tag_rank(name: &str) -> usize {
    TAG_ORDER
        .iter()
        .position(|t| *t == name)
        .unwrap_or(TAG_ORDER.len())
}

/// Serializes the model to a GPML string in the current dialect.
pub fn write_pathway_string(
    model: &PathwayModel,
    options: &WriteOptions,
) -> Result<String, ConversionError> {
    info!("writing pathway document");
    let writer = DialectWriter::new();
    let root = writer.build_document(model)?;
    let text = serialize_document(&root);
    if options.validate {
        let doc = Document::parse(&text)?;
        validate::validate_document(&doc, DialectId::CURRENT)?;
    }
    Ok(text)
}

/// Serializes the model into any writer.
pub fn write_pathway<W: Write>(
    model: &PathwayModel,
    mut writer: W,
    options: &WriteOptions,
) -> Result<(), ConversionError> {
    let text = write_pathway_string(model, options)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

struct DialectWriter {
    schema: &'static AttributeSchema,
}

fn fmt_f64(value: f64) -> String {
    format!("{value}")
}

impl DialectWriter {
    fn new() -> Self {
        Self {
            schema: DialectId::CURRENT.schema(),
        }
    }

    /// Sets an attribute, omitting it entirely when the value equals the
    /// schema default. This keeps serialized documents minimal and diffable.
    fn set_attr(
        &self,
        el: &mut XmlElement,
        path: &str,
        name: &str,
        value: &str,
    ) -> Result<(), ConversionError> {
        if !self.schema.is_default(path, name, value)? {
            el.set_attribute(name, value);
        }
        Ok(())
    }

    fn set_opt_attr(
        &self,
        el: &mut XmlElement,
        path: &str,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), ConversionError> {
        if let Some(value) = value {
            self.set_attr(el, path, name, value)?;
        }
        Ok(())
    }

    fn build_document(&self, model: &PathwayModel) -> Result<XmlElement, ConversionError> {
        let mut root = XmlElement::new("Pathway");
        root.set_attribute("xmlns", NS_GPML_2013A);
        self.write_mappinfo(&mut root, model)?;

        let mut elements: Vec<(ElementId, &PathwayElement)> = model
            .elements()
            .filter(|(id, _)| *id != model.mappinfo())
            .collect();
        elements.sort_by_key(|(_, el)| el.z_order);

        let mut nodes = Vec::with_capacity(elements.len());
        for (_, el) in elements {
            nodes.push(self.element_node(el)?);
        }
        nodes.sort_by_key(|node| tag_rank(&node.name));
        for node in nodes {
            root.push_child(node);
        }
        Ok(root)
    }

    fn write_mappinfo(
        &self,
        root: &mut XmlElement,
        model: &PathwayModel,
    ) -> Result<(), ConversionError> {
        let info = model
            .element(model.mappinfo())
            .expect("a model always holds its mapinfo element");
        self.set_attr(root, "Pathway", "Name", &info.title)?;
        self.set_opt_attr(root, "Pathway", "Data-Source", info.data_source.as_deref())?;
        self.set_opt_attr(root, "Pathway", "Version", info.version.as_deref())?;
        self.set_opt_attr(root, "Pathway", "Author", info.author.as_deref())?;
        self.set_opt_attr(root, "Pathway", "Maintainer", info.maintainer.as_deref())?;
        self.set_opt_attr(root, "Pathway", "Email", info.email.as_deref())?;
        self.set_opt_attr(root, "Pathway", "Last-Modified", info.last_modified.as_deref())?;
        self.set_opt_attr(root, "Pathway", "Organism", info.organism.as_deref())?;
        self.set_opt_attr(root, "Pathway", "License", info.copyright.as_deref())?;

        self.write_annotations(root, info)?;

        let mut graphics = XmlElement::new("Graphics");
        let (width, height) = model.board_size();
        self.set_attr(&mut graphics, "Pathway.Graphics", "BoardWidth", &fmt_f64(width))?;
        self.set_attr(&mut graphics, "Pathway.Graphics", "BoardHeight", &fmt_f64(height))?;
        root.push_child(graphics);
        Ok(())
    }

    fn element_node(&self, el: &PathwayElement) -> Result<XmlElement, ConversionError> {
        match el.kind() {
            ObjectKind::DataNode => self.data_node_node(el),
            ObjectKind::State => self.state_node(el),
            ObjectKind::Label => self.label_node(el),
            ObjectKind::Line => self.line_node(el, "Interaction"),
            ObjectKind::GraphicalLine => self.line_node(el, "GraphicalLine"),
            ObjectKind::Shape => self.shape_node(el),
            ObjectKind::Group => self.group_node(el),
            ObjectKind::Legend | ObjectKind::InfoBox => Ok(self.simple_center_node(el)),
            ObjectKind::Biopax => Ok(self.biopax_node(el)),
            ObjectKind::MappInfo => unreachable!("mapinfo is written on the root"),
        }
    }

    fn data_node_node(&self, el: &PathwayElement) -> Result<XmlElement, ConversionError> {
        let mut e = XmlElement::new("DataNode");
        self.write_annotations(&mut e, el)?;
        let mut graphics = XmlElement::new("Graphics");
        let mut xref = XmlElement::new("Xref");
        self.write_shape_position(&mut graphics, el, "DataNode")?;
        self.write_shape_common(&mut e, &mut graphics, el, "DataNode")?;
        self.set_attr(&mut e, "DataNode", "Type", &el.data_node_type)?;
        self.write_xref(&mut xref, el, "DataNode.Xref")?;
        e.push_child(graphics);
        e.push_child(xref);
        self.write_group_ref(&mut e, el, "DataNode")?;
        Ok(e)
    }

    fn state_node(&self, el: &PathwayElement) -> Result<XmlElement, ConversionError> {
        let mut e = XmlElement::new("State");
        self.write_annotations(&mut e, el)?;
        let mut graphics = XmlElement::new("Graphics");
        let mut xref = XmlElement::new("Xref");
        self.set_attr(&mut graphics, "State.Graphics", "RelX", &fmt_f64(el.rel_x))?;
        self.set_attr(&mut graphics, "State.Graphics", "RelY", &fmt_f64(el.rel_y))?;
        self.set_attr(&mut graphics, "State.Graphics", "Width", &fmt_f64(el.width))?;
        self.set_attr(&mut graphics, "State.Graphics", "Height", &fmt_f64(el.height))?;
        self.set_attr(&mut e, "State", "StateType", &el.data_node_type)?;
        self.set_opt_attr(&mut e, "State", "GraphRef", el.graph_ref.as_deref())?;
        self.write_shape_common(&mut e, &mut graphics, el, "State")?;
        self.write_xref(&mut xref, el, "State.Xref")?;
        e.push_child(graphics);
        e.push_child(xref);
        Ok(e)
    }

    fn label_node(&self, el: &PathwayElement) -> Result<XmlElement, ConversionError> {
        let mut e = XmlElement::new("Label");
        self.write_annotations(&mut e, el)?;
        let mut graphics = XmlElement::new("Graphics");
        self.write_shape_position(&mut graphics, el, "Label")?;
        self.write_shape_common(&mut e, &mut graphics, el, "Label")?;
        self.set_opt_attr(&mut e, "Label", "Href", el.href.as_deref())?;
        e.push_child(graphics);
        self.write_group_ref(&mut e, el, "Label")?;
        Ok(e)
    }

    fn shape_node(&self, el: &PathwayElement) -> Result<XmlElement, ConversionError> {
        let mut e = XmlElement::new("Shape");
        self.write_annotations(&mut e, el)?;
        let mut graphics = XmlElement::new("Graphics");
        self.write_shape_position(&mut graphics, el, "Shape")?;
        self.write_shape_common(&mut e, &mut graphics, el, "Shape")?;
        self.set_attr(&mut graphics, "Shape.Graphics", "Rotation", &fmt_f64(el.rotation))?;
        e.push_child(graphics);
        self.write_group_ref(&mut e, el, "Shape")?;
        Ok(e)
    }

    fn line_node(&self, el: &PathwayElement, base: &str) -> Result<XmlElement, ConversionError> {
        let mut e = XmlElement::new(base);
        self.write_annotations(&mut e, el)?;
        let mut graphics = XmlElement::new("Graphics");

        let point_path = format!("{base}.Graphics.Point");
        let last = el.points.len().saturating_sub(1);
        for (i, point) in el.points.iter().enumerate() {
            let mut pe = XmlElement::new("Point");
            self.write_point(&mut pe, point, &point_path)?;
            if i == 0 {
                self.set_attr(&mut pe, &point_path, "ArrowHead", el.start_arrow.name())?;
            } else if i == last {
                self.set_attr(&mut pe, &point_path, "ArrowHead", el.end_arrow.name())?;
            }
            graphics.push_child(pe);
        }

        let anchor_path = format!("{base}.Graphics.Anchor");
        for anchor in &el.anchors {
            let mut ae = XmlElement::new("Anchor");
            self.set_attr(&mut ae, &anchor_path, "Position", &fmt_f64(anchor.position))?;
            self.set_attr(&mut ae, &anchor_path, "Shape", anchor.shape.name())?;
            self.set_opt_attr(&mut ae, &anchor_path, "GraphId", anchor.graph_id.as_deref())?;
            graphics.push_child(ae);
        }

        let graphics_path = format!("{base}.Graphics");
        self.set_attr(
            &mut graphics,
            &graphics_path,
            "ConnectorType",
            el.connector_type.name(),
        )?;
        self.set_attr(&mut graphics, &graphics_path, "ZOrder", &el.z_order.to_string())?;
        self.write_line_style(&mut graphics, el, &graphics_path)?;

        if base == "Interaction" {
            let mut xref = XmlElement::new("Xref");
            self.write_xref(&mut xref, el, "Interaction.Xref")?;
            e.push_child(graphics);
            e.push_child(xref);
        } else {
            e.push_child(graphics);
        }
        self.set_opt_attr(&mut e, base, "GraphId", el.graph_id.as_deref())?;
        self.write_group_ref(&mut e, el, base)?;
        Ok(e)
    }

    fn write_point(
        &self,
        pe: &mut XmlElement,
        point: &MPoint,
        path: &str,
    ) -> Result<(), ConversionError> {
        self.set_attr(pe, path, "X", &fmt_f64(point.x))?;
        self.set_attr(pe, path, "Y", &fmt_f64(point.y))?;
        if point.is_linked() {
            self.set_opt_attr(pe, path, "GraphRef", point.graph_ref.as_deref())?;
            self.set_attr(pe, path, "RelX", &fmt_f64(point.rel_x))?;
            self.set_attr(pe, path, "RelY", &fmt_f64(point.rel_y))?;
        }
        self.set_opt_attr(pe, path, "GraphId", point.graph_id.as_deref())?;
        Ok(())
    }

    fn group_node(&self, el: &PathwayElement) -> Result<XmlElement, ConversionError> {
        let mut e = XmlElement::new("Group");
        self.write_annotations(&mut e, el)?;
        self.set_attr(&mut e, "Group", "GroupId", el.group_id.as_deref().unwrap_or_default())?;
        self.set_opt_attr(&mut e, "Group", "GraphId", el.graph_id.as_deref())?;
        self.set_attr(&mut e, "Group", "Style", el.group_style.name())?;
        self.set_attr(&mut e, "Group", "TextLabel", &el.text_label)?;
        self.write_group_ref(&mut e, el, "Group")?;
        Ok(e)
    }

    fn simple_center_node(&self, el: &PathwayElement) -> XmlElement {
        let mut e = XmlElement::new(el.kind().tag());
        e.set_attribute("CenterX", &fmt_f64(el.center_x));
        e.set_attribute("CenterY", &fmt_f64(el.center_y));
        e
    }

    fn biopax_node(&self, el: &PathwayElement) -> XmlElement {
        let mut e = XmlElement::new("Biopax");
        e.set_attribute("xmlns:bp", "http://www.biopax.org/release/biopax-level3.owl#");
        e.set_attribute("xmlns:rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        if let Some(payload) = &el.biopax {
            if !payload.is_empty() {
                e.children.push(XmlNode::Raw(payload.clone()));
            }
        }
        e
    }

    // ---- shared attribute groups ----

    fn write_annotations(
        &self,
        e: &mut XmlElement,
        el: &PathwayElement,
    ) -> Result<(), ConversionError> {
        for comment in &el.comments {
            let mut ce = XmlElement::new("Comment");
            self.set_opt_attr(&mut ce, "Comment", "Source", comment.source.as_deref())?;
            ce.push_text(&comment.text);
            e.push_child(ce);
        }
        for biopax_ref in &el.biopax_refs {
            let mut re = XmlElement::new("BiopaxRef");
            re.push_text(biopax_ref);
            e.push_child(re);
        }
        for (key, value) in &el.dynamic_properties {
            let mut ae = XmlElement::new("Attribute");
            self.set_attr(&mut ae, "Attribute", "Key", key)?;
            self.set_attr(&mut ae, "Attribute", "Value", value)?;
            e.push_child(ae);
        }
        Ok(())
    }

    fn write_shape_position(
        &self,
        graphics: &mut XmlElement,
        el: &PathwayElement,
        base: &str,
    ) -> Result<(), ConversionError> {
        let path = format!("{base}.Graphics");
        self.set_attr(graphics, &path, "CenterX", &fmt_f64(el.center_x))?;
        self.set_attr(graphics, &path, "CenterY", &fmt_f64(el.center_y))?;
        self.set_attr(graphics, &path, "Width", &fmt_f64(el.width))?;
        self.set_attr(graphics, &path, "Height", &fmt_f64(el.height))?;
        self.set_attr(graphics, &path, "ZOrder", &el.z_order.to_string())?;
        Ok(())
    }

    /// The shared Graphics block of DataNode, State, Label and Shape: fill,
    /// font, shape type and stroke, plus the element-level text label and
    /// graph id.
    fn write_shape_common(
        &self,
        e: &mut XmlElement,
        graphics: &mut XmlElement,
        el: &PathwayElement,
        base: &str,
    ) -> Result<(), ConversionError> {
        let path = format!("{base}.Graphics");
        let fill = if el.transparent {
            "Transparent".to_owned()
        } else {
            el.fill_color.to_hex_string()
        };
        self.set_attr(graphics, &path, "FillColor", &fill)?;
        self.write_font(e, graphics, el, base)?;
        self.set_opt_attr(e, base, "GraphId", el.graph_id.as_deref())?;
        self.set_attr(graphics, &path, "ShapeType", el.shape_kind.name())?;
        self.write_line_style(graphics, el, &path)?;
        Ok(())
    }

    fn write_font(
        &self,
        e: &mut XmlElement,
        graphics: &mut XmlElement,
        el: &PathwayElement,
        base: &str,
    ) -> Result<(), ConversionError> {
        self.set_attr(e, base, "TextLabel", &el.text_label)?;
        if base == "State" {
            return Ok(());
        }
        let path = format!("{base}.Graphics");
        self.set_attr(graphics, &path, "FontName", &el.font_name)?;
        self.set_attr(graphics, &path, "FontWeight", if el.bold { "Bold" } else { "Normal" })?;
        self.set_attr(graphics, &path, "FontStyle", if el.italic { "Italic" } else { "Normal" })?;
        self.set_attr(
            graphics,
            &path,
            "FontDecoration",
            if el.underline { "Underline" } else { "Normal" },
        )?;
        self.set_attr(
            graphics,
            &path,
            "FontStrikethru",
            if el.strikethru { "Strikethru" } else { "Normal" },
        )?;
        self.set_attr(graphics, &path, "FontSize", &format!("{}", el.font_size as i64))?;
        self.set_attr(graphics, &path, "Valign", el.valign.gpml_name())?;
        self.set_attr(graphics, &path, "Align", el.align.gpml_name())?;
        Ok(())
    }

    /// Stroke attributes. Double lines serialize as `Solid`; the dynamic
    /// property bag carries the double-line marker across a round trip.
    fn write_line_style(
        &self,
        graphics: &mut XmlElement,
        el: &PathwayElement,
        path: &str,
    ) -> Result<(), ConversionError> {
        let style = if el.line_style == LineStyle::Dashed {
            "Broken"
        } else {
            "Solid"
        };
        self.set_attr(graphics, path, "LineStyle", style)?;
        self.set_attr(graphics, path, "LineThickness", &fmt_f64(el.line_thickness))?;
        self.set_attr(graphics, path, "Color", &el.color.to_hex_string())?;
        Ok(())
    }

    fn write_xref(
        &self,
        xref: &mut XmlElement,
        el: &PathwayElement,
        path: &str,
    ) -> Result<(), ConversionError> {
        self.set_attr(xref, path, "Database", &el.xref.database)?;
        self.set_attr(xref, path, "ID", &el.xref.id)?;
        Ok(())
    }

    fn write_group_ref(
        &self,
        e: &mut XmlElement,
        el: &PathwayElement,
        base: &str,
    ) -> Result<(), ConversionError> {
        self.set_opt_attr(e, base, "GroupRef", el.group_ref.as_deref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gpml_core::element::{MAnchor, ObjectKind};
    use gpml_core::model::PathwayModel;

    use super::*;

    #[test]
    fn test_tag_rank_orders_schema_tags() {
        assert!(tag_rank("DataNode") < tag_rank("Interaction"));
        assert!(tag_rank("Interaction") < tag_rank("Shape"));
        assert!(tag_rank("Shape") < tag_rank("Biopax"));
        assert_eq!(tag_rank("Unknown"), TAG_ORDER.len());
    }

    #[test]
    fn test_elements_emitted_in_schema_order() {
        let mut model = PathwayModel::new();
        // insert in reverse schema order
        let mut shape = PathwayElement::new(ObjectKind::Shape);
        shape.shape_kind = gpml_core::element::ShapeKind::rectangle();
        model.add(shape).unwrap();
        model.add(PathwayElement::new(ObjectKind::Line)).unwrap();
        let mut node = PathwayElement::new(ObjectKind::DataNode);
        node.text_label = "n".to_owned();
        model.add(node).unwrap();

        let text = write_pathway_string(&model, &WriteOptions::default()).unwrap();
        let data_node = text.find("<DataNode").unwrap();
        let interaction = text.find("<Interaction").unwrap();
        let shape = text.find("<Shape").unwrap();
        assert!(data_node < interaction && interaction < shape);
    }

    #[test]
    fn test_transparent_fill_is_elided() {
        let mut model = PathwayModel::new();
        let mut shape = PathwayElement::new(ObjectKind::Shape);
        shape.transparent = true;
        model.add(shape).unwrap();
        let text = write_pathway_string(&model, &WriteOptions::default()).unwrap();
        assert!(!text.contains("FillColor"));
    }

    #[test]
    fn test_non_default_fill_is_written() {
        let mut model = PathwayModel::new();
        let mut shape = PathwayElement::new(ObjectKind::Shape);
        shape.transparent = false;
        shape.fill_color = gpml_core::color::Color::new(255, 0, 0);
        model.add(shape).unwrap();
        let text = write_pathway_string(&model, &WriteOptions::default()).unwrap();
        assert!(text.contains("FillColor=\"ff0000\""));
    }

    #[test]
    fn test_anchor_written_inside_graphics() {
        let mut model = PathwayModel::new();
        let mut line = PathwayElement::new(ObjectKind::Line);
        let mut anchor = MAnchor::new(0.25);
        anchor.graph_id = Some("a1".to_owned());
        line.anchors.push(anchor);
        model.add(line).unwrap();
        let text = write_pathway_string(&model, &WriteOptions::default()).unwrap();
        assert!(text.contains("<Anchor Position=\"0.25\""));
        assert!(text.contains("GraphId=\"a1\""));
    }

    #[test]
    fn test_save_twice_is_byte_identical() {
        let mut model = PathwayModel::new();
        let mut node = PathwayElement::new(ObjectKind::DataNode);
        node.graph_id = Some("n1".to_owned());
        node.text_label = "TP53".to_owned();
        node.center_x = 40.0;
        node.center_y = 30.0;
        node.width = 80.0;
        node.height = 20.0;
        model.add(node).unwrap();

        let first = write_pathway_string(&model, &WriteOptions::default()).unwrap();
        let second = write_pathway_string(&model, &WriteOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_written_document_passes_validation() {
        let mut model = PathwayModel::new();
        let mut node = PathwayElement::new(ObjectKind::DataNode);
        node.text_label = "ACE2".to_owned();
        model.add(node).unwrap();
        let options = WriteOptions { validate: true };
        write_pathway_string(&model, &options).unwrap();
    }
}
