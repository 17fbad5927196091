//! Per-dialect attribute schema tables.
//!
//! Each dialect carries a table mapping `(element path, attribute name)` to
//! the attribute's schema type, default value and required flag. The tables
//! drive three things: default substitution on read, default elision on
//! write (so serialized documents stay minimal and diffable), and strict
//! validation.
//!
//! The row data is transcribed from the schema definitions of the
//! respective GPML versions; 2007 and 2008a share one table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use gpml_core::color::Color;

use crate::error::ConversionError;

/// Schema type of an attribute, determining its equality rule for write-time
/// default elision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    /// `xsd:string`
    Str,
    /// `xsd:ID`
    Id,
    /// `xsd:IDREF`
    IdRef,
    /// `gpml:StyleType`
    Style,
    /// `xsd:float`
    Float,
    /// `gpml:Dimension`
    Dimension,
    /// `xsd:integer`
    Integer,
    /// `xsd:nonNegativeInteger`
    NonNegInteger,
    /// `gpml:ColorType`
    ColorType,
    /// `gpml:RotationType`: either a compass keyword or radians, never
    /// elided because the two spellings do not compare.
    Rotation,
    /// `gpml:NameType`
    Name,
    /// `gpml:DatabaseType`
    Database,
    /// `gpml:ObjectType`
    Object,
    /// `gpml:DataNodeType`
    DataNodeKind,
}

impl AttrType {
    fn is_string_like(self) -> bool {
        matches!(
            self,
            AttrType::Str
                | AttrType::Id
                | AttrType::IdRef
                | AttrType::Style
                | AttrType::Name
                | AttrType::Database
                | AttrType::Object
                | AttrType::DataNodeKind
        )
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            AttrType::Float | AttrType::Dimension | AttrType::Integer | AttrType::NonNegInteger
        )
    }
}

/// One schema table entry.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    pub ty: AttrType,
    pub default: Option<&'static str>,
    pub required: bool,
}

type Row = (
    &'static str,
    &'static str,
    AttrType,
    Option<&'static str>,
    bool,
);

/// A per-dialect attribute table, immutable after construction.
pub struct AttributeSchema {
    entries: HashMap<(&'static str, &'static str), AttributeSpec>,
}

impl AttributeSchema {
    fn from_rows(rows: &[Row]) -> Self {
        let mut entries = HashMap::with_capacity(rows.len());
        for (element, attribute, ty, default, required) in rows {
            entries.insert(
                (*element, *attribute),
                AttributeSpec {
                    ty: *ty,
                    default: *default,
                    required: *required,
                },
            );
        }
        Self { entries }
    }

    /// Looks up an entry. Asking for a pair the table does not contain is a
    /// programmer error, not a data error, and aborts processing.
    pub fn spec(&self, element: &str, attribute: &str) -> Result<AttributeSpec, ConversionError> {
        self.entries
            .get(&(element, attribute))
            .copied()
            .ok_or_else(|| ConversionError::UnknownAttribute {
                element: element.to_owned(),
                attribute: attribute.to_owned(),
            })
    }

    /// Whether the table declares this attribute at all.
    pub fn contains(&self, element: &str, attribute: &str) -> bool {
        self.entries.contains_key(&(element, attribute))
    }

    /// Entries declared for one element path.
    pub fn entries_for<'a>(
        &'a self,
        element: &'a str,
    ) -> impl Iterator<Item = (&'static str, AttributeSpec)> + 'a {
        self.entries
            .iter()
            .filter(move |((el, _), _)| *el == element)
            .map(|((_, attr), spec)| (*attr, *spec))
    }

    /// Every element path the table knows about.
    pub fn element_paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().map(|(el, _)| *el)
    }

    /// Resolves an attribute on read: the literal value if present, else the
    /// schema default, else `None` for optional attributes.
    ///
    /// # Errors
    ///
    /// [`ConversionError::MissingRequiredAttribute`] when the attribute is
    /// required and absent; [`ConversionError::UnknownAttribute`] when the
    /// table has no entry for the pair.
    pub fn read(
        &self,
        node: Option<roxmltree::Node>,
        element: &str,
        attribute: &str,
    ) -> Result<Option<String>, ConversionError> {
        let spec = self.spec(element, attribute)?;
        if let Some(value) = node.and_then(|n| n.attribute(attribute)) {
            return Ok(Some(value.to_owned()));
        }
        if let Some(default) = spec.default {
            return Ok(Some(default.to_owned()));
        }
        if spec.required {
            return Err(ConversionError::MissingRequiredAttribute {
                element: element.to_owned(),
                attribute: attribute.to_owned(),
            });
        }
        Ok(None)
    }

    /// Whether a value compares equal to the attribute's default under its
    /// type's equality rule, meaning the writer may omit it. Required
    /// attributes are never elided.
    pub fn is_default(
        &self,
        element: &str,
        attribute: &str,
        value: &str,
    ) -> Result<bool, ConversionError> {
        let spec = self.spec(element, attribute)?;
        if spec.required {
            return Ok(false);
        }
        Ok(value_is_default(spec, value))
    }
}

fn value_is_default(spec: AttributeSpec, value: &str) -> bool {
    if spec.ty.is_string_like() {
        return match spec.default {
            Some(default) => default == value,
            // an optional attribute with no default equals the empty string
            None => value.is_empty(),
        };
    }
    if spec.ty.is_numeric() {
        let (Some(default), Ok(value)) = (
            spec.default.and_then(|d| d.parse::<f64>().ok()),
            value.parse::<f64>(),
        ) else {
            return false;
        };
        return (default - value).abs() < 1e-6;
    }
    if spec.ty == AttrType::ColorType {
        let Some(default) = spec.default else {
            return value.is_empty();
        };
        // the Transparent sentinel is distinct from any RGB that happens to
        // decode to the same triple
        let default_transparent = default == "Transparent";
        let value_transparent = value == "Transparent";
        return Color::decode(default) == Color::decode(value)
            && default_transparent == value_transparent;
    }
    false
}

use AttrType as T;

const OPT: bool = false;
const REQ: bool = true;

/// Table shared by the 2007 and 2008a dialects.
static GPML_200X_ROWS: &[Row] = &[
    ("Comment", "Source", T::Str, None, OPT),
    ("PublicationXref", "ID", T::Str, None, REQ),
    ("PublicationXref", "Database", T::Str, None, REQ),
    ("Attribute", "Key", T::Str, None, REQ),
    ("Attribute", "Value", T::Str, None, REQ),
    ("Pathway.Graphics", "BoardWidth", T::Dimension, None, REQ),
    ("Pathway.Graphics", "BoardHeight", T::Dimension, None, REQ),
    ("Pathway.Graphics", "WindowWidth", T::Dimension, Some("18000"), OPT),
    ("Pathway.Graphics", "WindowHeight", T::Dimension, Some("12000"), OPT),
    ("Pathway", "Name", T::Name, None, REQ),
    ("Pathway", "Organism", T::Str, None, OPT),
    ("Pathway", "Data-Source", T::Str, None, OPT),
    ("Pathway", "Version", T::Str, None, OPT),
    ("Pathway", "Author", T::Str, None, OPT),
    ("Pathway", "Maintainer", T::Str, None, OPT),
    ("Pathway", "Email", T::Str, None, OPT),
    ("Pathway", "License", T::Str, None, OPT),
    ("Pathway", "Copyright", T::Str, None, OPT),
    ("Pathway", "Last-Modified", T::Str, None, OPT),
    ("Pathway", "BiopaxRef", T::Str, None, OPT),
    ("DataNode.Graphics", "CenterX", T::Float, None, REQ),
    ("DataNode.Graphics", "CenterY", T::Float, None, REQ),
    ("DataNode.Graphics", "Width", T::Dimension, None, REQ),
    ("DataNode.Graphics", "Height", T::Dimension, None, REQ),
    ("DataNode.Graphics", "Color", T::ColorType, None, OPT),
    ("DataNode.Graphics", "ZOrder", T::Integer, None, OPT),
    ("DataNode.Xref", "Database", T::Database, None, REQ),
    ("DataNode.Xref", "ID", T::Name, None, REQ),
    ("DataNode", "BiopaxRef", T::Str, None, OPT),
    ("DataNode", "GraphId", T::Id, None, OPT),
    ("DataNode", "GroupRef", T::Str, None, OPT),
    ("DataNode", "ObjectType", T::Object, Some("Annotation"), OPT),
    ("DataNode", "TextLabel", T::Str, None, REQ),
    ("DataNode", "BackpageHead", T::Str, None, OPT),
    ("DataNode", "GenMAPP-Xref", T::Str, None, OPT),
    ("DataNode", "Type", T::DataNodeKind, Some("Unknown"), OPT),
    ("State.Graphics", "relX", T::Float, None, REQ),
    ("State.Graphics", "relY", T::Float, None, REQ),
    ("State.Graphics", "Width", T::Dimension, None, REQ),
    ("State.Graphics", "Height", T::Dimension, None, REQ),
    ("State.Graphics", "Color", T::ColorType, None, OPT),
    ("State.Graphics", "FillColor", T::ColorType, None, OPT),
    ("State.Xref", "Database", T::Database, None, REQ),
    ("State.Xref", "ID", T::Name, None, REQ),
    ("State", "BiopaxRef", T::Str, None, OPT),
    ("State", "GraphId", T::Id, None, OPT),
    ("State", "GraphRef", T::IdRef, None, OPT),
    ("State", "Style", T::Style, Some("Solid"), OPT),
    ("State", "TextLabel", T::Str, None, REQ),
    ("State", "StateType", T::Str, Some("Unknown"), OPT),
    ("State", "ShapeType", T::Str, None, REQ),
    ("Line.Graphics.Point", "x", T::Float, None, REQ),
    ("Line.Graphics.Point", "y", T::Float, None, REQ),
    ("Line.Graphics.Point", "relX", T::Float, None, OPT),
    ("Line.Graphics.Point", "relY", T::Float, None, OPT),
    ("Line.Graphics.Point", "GraphRef", T::IdRef, None, OPT),
    ("Line.Graphics.Point", "GraphId", T::Id, None, OPT),
    ("Line.Graphics.Point", "ArrowHead", T::Str, Some("Line"), OPT),
    ("Line.Graphics.Point", "Head", T::Str, Some("Line"), OPT),
    ("Line.Graphics.Anchor", "position", T::Float, None, REQ),
    ("Line.Graphics.Anchor", "GraphId", T::Id, None, OPT),
    ("Line.Graphics.Anchor", "Shape", T::Str, Some("ReceptorRound"), OPT),
    ("Line.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("Line.Graphics", "ConnectorType", T::Str, Some("Straight"), OPT),
    ("Line.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Line", "Style", T::Style, Some("Solid"), OPT),
    ("Line", "GroupRef", T::Str, None, OPT),
    ("Line", "BiopaxRef", T::Str, None, OPT),
    ("Line", "GraphId", T::Id, None, OPT),
    ("Label.Graphics", "CenterX", T::Float, None, REQ),
    ("Label.Graphics", "CenterY", T::Float, None, REQ),
    ("Label.Graphics", "Width", T::Dimension, None, REQ),
    ("Label.Graphics", "Height", T::Dimension, None, REQ),
    ("Label.Graphics", "Color", T::ColorType, None, OPT),
    ("Label.Graphics", "FontName", T::Str, Some("Arial"), OPT),
    ("Label.Graphics", "FontStyle", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontDecoration", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontStrikethru", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontWeight", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontSize", T::NonNegInteger, Some("12"), OPT),
    ("Label.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Label", "Href", T::Str, None, OPT),
    ("Label", "PathwayRef", T::Str, None, OPT),
    ("Label", "BiopaxRef", T::Str, None, OPT),
    ("Label", "GraphId", T::Id, None, OPT),
    ("Label", "GroupRef", T::Str, None, OPT),
    ("Label", "ObjectType", T::Object, Some("Annotation"), OPT),
    ("Label", "Outline", T::Str, Some("None"), OPT),
    ("Label", "TextLabel", T::Str, None, REQ),
    ("Label", "Xref", T::Str, None, OPT),
    ("Label", "GenMAPP-Xref", T::Str, None, OPT),
    ("Shape.Graphics", "CenterX", T::Float, None, REQ),
    ("Shape.Graphics", "CenterY", T::Float, None, REQ),
    ("Shape.Graphics", "Width", T::Dimension, None, REQ),
    ("Shape.Graphics", "Height", T::Dimension, None, REQ),
    ("Shape.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("Shape.Graphics", "Rotation", T::Rotation, Some("Top"), OPT),
    ("Shape.Graphics", "FillColor", T::ColorType, Some("Transparent"), OPT),
    ("Shape.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Shape", "Type", T::Str, None, REQ),
    ("Shape", "BiopaxRef", T::Str, None, OPT),
    ("Shape", "GraphId", T::Id, None, OPT),
    ("Shape", "GroupRef", T::Str, None, OPT),
    ("Shape", "ObjectType", T::Object, Some("Annotation"), OPT),
    ("Shape", "Style", T::Style, Some("Solid"), OPT),
    ("Group", "BiopaxRef", T::Str, None, OPT),
    ("Group", "GroupId", T::Str, None, REQ),
    ("Group", "GroupRef", T::Str, None, OPT),
    ("Group", "Style", T::Str, Some("None"), OPT),
    ("Group", "TextLabel", T::Str, None, OPT),
    ("Group", "GraphId", T::Id, None, OPT),
    ("InfoBox", "CenterX", T::Float, None, REQ),
    ("InfoBox", "CenterY", T::Float, None, REQ),
    ("Legend", "CenterX", T::Float, None, REQ),
    ("Legend", "CenterY", T::Float, None, REQ),
];

/// Table for the 2010a dialect.
static GPML_2010A_ROWS: &[Row] = &[
    ("Comment", "Source", T::Str, None, OPT),
    ("PublicationXref", "ID", T::Str, None, REQ),
    ("PublicationXref", "Database", T::Str, None, REQ),
    ("Attribute", "Key", T::Str, None, REQ),
    ("Attribute", "Value", T::Str, None, REQ),
    ("Pathway.Graphics", "BoardWidth", T::Dimension, None, REQ),
    ("Pathway.Graphics", "BoardHeight", T::Dimension, None, REQ),
    ("Pathway", "Name", T::Str, None, REQ),
    ("Pathway", "Organism", T::Str, None, OPT),
    ("Pathway", "Data-Source", T::Str, None, OPT),
    ("Pathway", "Version", T::Str, None, OPT),
    ("Pathway", "Author", T::Str, None, OPT),
    ("Pathway", "Maintainer", T::Str, None, OPT),
    ("Pathway", "Email", T::Str, None, OPT),
    ("Pathway", "License", T::Str, None, OPT),
    ("Pathway", "Last-Modified", T::Str, None, OPT),
    ("Pathway", "BiopaxRef", T::Str, None, OPT),
    ("DataNode.Graphics", "CenterX", T::Float, None, REQ),
    ("DataNode.Graphics", "CenterY", T::Float, None, REQ),
    ("DataNode.Graphics", "Width", T::Dimension, None, REQ),
    ("DataNode.Graphics", "Height", T::Dimension, None, REQ),
    ("DataNode.Graphics", "FontName", T::Str, Some("Arial"), OPT),
    ("DataNode.Graphics", "FontStyle", T::Str, Some("Normal"), OPT),
    ("DataNode.Graphics", "FontDecoration", T::Str, Some("Normal"), OPT),
    ("DataNode.Graphics", "FontStrikethru", T::Str, Some("Normal"), OPT),
    ("DataNode.Graphics", "FontWeight", T::Str, Some("Normal"), OPT),
    ("DataNode.Graphics", "FontSize", T::NonNegInteger, Some("12"), OPT),
    ("DataNode.Graphics", "Align", T::Str, Some("Center"), OPT),
    ("DataNode.Graphics", "Valign", T::Str, Some("Top"), OPT),
    ("DataNode.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("DataNode.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("DataNode.Graphics", "LineThickness", T::Float, Some("1.0"), OPT),
    ("DataNode.Graphics", "FillColor", T::ColorType, Some("White"), OPT),
    ("DataNode.Graphics", "ShapeType", T::Str, Some("Rectangle"), OPT),
    ("DataNode.Graphics", "ZOrder", T::Integer, None, OPT),
    ("DataNode.Xref", "Database", T::Str, None, REQ),
    ("DataNode.Xref", "ID", T::Str, None, REQ),
    ("DataNode", "BiopaxRef", T::Str, None, OPT),
    ("DataNode", "GraphId", T::Id, None, OPT),
    ("DataNode", "GroupRef", T::Str, None, OPT),
    ("DataNode", "TextLabel", T::Str, None, REQ),
    ("DataNode", "Type", T::Str, Some("Unknown"), OPT),
    ("State.Graphics", "relX", T::Float, None, REQ),
    ("State.Graphics", "relY", T::Float, None, REQ),
    ("State.Graphics", "Width", T::Dimension, None, REQ),
    ("State.Graphics", "Height", T::Dimension, None, REQ),
    ("State.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("State.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("State.Graphics", "LineThickness", T::Float, Some("1.0"), OPT),
    ("State.Graphics", "FillColor", T::ColorType, Some("White"), OPT),
    ("State.Graphics", "ShapeType", T::Str, Some("Rectangle"), OPT),
    ("State.Graphics", "ZOrder", T::Integer, None, OPT),
    ("State.Xref", "Database", T::Str, None, REQ),
    ("State.Xref", "ID", T::Str, None, REQ),
    ("State", "BiopaxRef", T::Str, None, OPT),
    ("State", "GraphId", T::Id, None, OPT),
    ("State", "GraphRef", T::IdRef, None, OPT),
    ("State", "TextLabel", T::Str, None, REQ),
    ("State", "StateType", T::Str, Some("Unknown"), OPT),
    ("Line.Graphics.Point", "x", T::Float, None, REQ),
    ("Line.Graphics.Point", "y", T::Float, None, REQ),
    ("Line.Graphics.Point", "relX", T::Float, None, OPT),
    ("Line.Graphics.Point", "relY", T::Float, None, OPT),
    ("Line.Graphics.Point", "GraphRef", T::IdRef, None, OPT),
    ("Line.Graphics.Point", "GraphId", T::Id, None, OPT),
    ("Line.Graphics.Point", "ArrowHead", T::Str, Some("Line"), OPT),
    ("Line.Graphics.Anchor", "position", T::Float, None, REQ),
    ("Line.Graphics.Anchor", "GraphId", T::Id, None, OPT),
    ("Line.Graphics.Anchor", "Shape", T::Str, Some("ReceptorRound"), OPT),
    ("Line.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("Line.Graphics", "LineThickness", T::Float, None, OPT),
    ("Line.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("Line.Graphics", "ConnectorType", T::Str, Some("Straight"), OPT),
    ("Line.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Line", "GroupRef", T::Str, None, OPT),
    ("Line", "BiopaxRef", T::Str, None, OPT),
    ("Line", "GraphId", T::Id, None, OPT),
    ("Label.Graphics", "CenterX", T::Float, None, REQ),
    ("Label.Graphics", "CenterY", T::Float, None, REQ),
    ("Label.Graphics", "Width", T::Dimension, None, REQ),
    ("Label.Graphics", "Height", T::Dimension, None, REQ),
    ("Label.Graphics", "FontName", T::Str, Some("Arial"), OPT),
    ("Label.Graphics", "FontStyle", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontDecoration", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontStrikethru", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontWeight", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontSize", T::NonNegInteger, Some("12"), OPT),
    ("Label.Graphics", "Align", T::Str, Some("Center"), OPT),
    ("Label.Graphics", "Valign", T::Str, Some("Top"), OPT),
    ("Label.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("Label.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("Label.Graphics", "LineThickness", T::Float, Some("1.0"), OPT),
    ("Label.Graphics", "FillColor", T::ColorType, Some("Transparent"), OPT),
    ("Label.Graphics", "ShapeType", T::Str, Some("None"), OPT),
    ("Label.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Label", "Href", T::Str, None, OPT),
    ("Label", "PathwayRef", T::Str, None, OPT),
    ("Label", "BiopaxRef", T::Str, None, OPT),
    ("Label", "GraphId", T::Id, None, OPT),
    ("Label", "GroupRef", T::Str, None, OPT),
    ("Label", "TextLabel", T::Str, None, REQ),
    ("Shape.Graphics", "CenterX", T::Float, None, REQ),
    ("Shape.Graphics", "CenterY", T::Float, None, REQ),
    ("Shape.Graphics", "Width", T::Dimension, None, REQ),
    ("Shape.Graphics", "Height", T::Dimension, None, REQ),
    ("Shape.Graphics", "FontName", T::Str, Some("Arial"), OPT),
    ("Shape.Graphics", "FontStyle", T::Str, Some("Normal"), OPT),
    ("Shape.Graphics", "FontDecoration", T::Str, Some("Normal"), OPT),
    ("Shape.Graphics", "FontStrikethru", T::Str, Some("Normal"), OPT),
    ("Shape.Graphics", "FontWeight", T::Str, Some("Normal"), OPT),
    ("Shape.Graphics", "FontSize", T::NonNegInteger, Some("12"), OPT),
    ("Shape.Graphics", "Align", T::Str, Some("Center"), OPT),
    ("Shape.Graphics", "Valign", T::Str, Some("Top"), OPT),
    ("Shape.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("Shape.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("Shape.Graphics", "LineThickness", T::Float, Some("1.0"), OPT),
    ("Shape.Graphics", "FillColor", T::ColorType, Some("Transparent"), OPT),
    ("Shape.Graphics", "ShapeType", T::Str, None, REQ),
    ("Shape.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Shape.Graphics", "Rotation", T::Rotation, Some("Top"), OPT),
    ("Shape", "BiopaxRef", T::Str, None, OPT),
    ("Shape", "GraphId", T::Id, None, OPT),
    ("Shape", "GroupRef", T::Str, None, OPT),
    ("Shape", "TextLabel", T::Str, None, OPT),
    ("Group", "BiopaxRef", T::Str, None, OPT),
    ("Group", "GroupId", T::Str, None, REQ),
    ("Group", "GroupRef", T::Str, None, OPT),
    ("Group", "Style", T::Str, Some("None"), OPT),
    ("Group", "TextLabel", T::Str, None, OPT),
    ("Group", "GraphId", T::Id, None, OPT),
    ("InfoBox", "CenterX", T::Float, None, REQ),
    ("InfoBox", "CenterY", T::Float, None, REQ),
    ("Legend", "CenterX", T::Float, None, REQ),
    ("Legend", "CenterY", T::Float, None, REQ),
];

/// Table for the 2013a dialect, the current writing target.
static GPML_2013A_ROWS: &[Row] = &[
    ("Comment", "Source", T::Str, None, OPT),
    ("PublicationXref", "ID", T::Str, None, REQ),
    ("PublicationXref", "Database", T::Str, None, REQ),
    ("Attribute", "Key", T::Str, None, REQ),
    ("Attribute", "Value", T::Str, None, REQ),
    ("Pathway.Graphics", "BoardWidth", T::Dimension, None, REQ),
    ("Pathway.Graphics", "BoardHeight", T::Dimension, None, REQ),
    ("Pathway", "Name", T::Str, None, REQ),
    ("Pathway", "Organism", T::Str, None, OPT),
    ("Pathway", "Data-Source", T::Str, None, OPT),
    ("Pathway", "Version", T::Str, None, OPT),
    ("Pathway", "Author", T::Str, None, OPT),
    ("Pathway", "Maintainer", T::Str, None, OPT),
    ("Pathway", "Email", T::Str, None, OPT),
    ("Pathway", "License", T::Str, None, OPT),
    ("Pathway", "Last-Modified", T::Str, None, OPT),
    ("Pathway", "BiopaxRef", T::Str, None, OPT),
    ("DataNode.Graphics", "CenterX", T::Float, None, REQ),
    ("DataNode.Graphics", "CenterY", T::Float, None, REQ),
    ("DataNode.Graphics", "Width", T::Dimension, None, REQ),
    ("DataNode.Graphics", "Height", T::Dimension, None, REQ),
    ("DataNode.Graphics", "FontName", T::Str, Some("Arial"), OPT),
    ("DataNode.Graphics", "FontStyle", T::Str, Some("Normal"), OPT),
    ("DataNode.Graphics", "FontDecoration", T::Str, Some("Normal"), OPT),
    ("DataNode.Graphics", "FontStrikethru", T::Str, Some("Normal"), OPT),
    ("DataNode.Graphics", "FontWeight", T::Str, Some("Normal"), OPT),
    ("DataNode.Graphics", "FontSize", T::NonNegInteger, Some("12"), OPT),
    ("DataNode.Graphics", "Align", T::Str, Some("Center"), OPT),
    ("DataNode.Graphics", "Valign", T::Str, Some("Top"), OPT),
    ("DataNode.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("DataNode.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("DataNode.Graphics", "LineThickness", T::Float, Some("1.0"), OPT),
    ("DataNode.Graphics", "FillColor", T::ColorType, Some("White"), OPT),
    ("DataNode.Graphics", "ShapeType", T::Str, Some("Rectangle"), OPT),
    ("DataNode.Graphics", "ZOrder", T::Integer, None, OPT),
    ("DataNode.Xref", "Database", T::Str, None, REQ),
    ("DataNode.Xref", "ID", T::Str, None, REQ),
    ("DataNode", "BiopaxRef", T::Str, None, OPT),
    ("DataNode", "GraphId", T::Id, None, OPT),
    ("DataNode", "GroupRef", T::Str, None, OPT),
    ("DataNode", "TextLabel", T::Str, None, REQ),
    ("DataNode", "Type", T::Str, Some("Unknown"), OPT),
    ("State.Graphics", "RelX", T::Float, None, REQ),
    ("State.Graphics", "RelY", T::Float, None, REQ),
    ("State.Graphics", "Width", T::Dimension, None, REQ),
    ("State.Graphics", "Height", T::Dimension, None, REQ),
    ("State.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("State.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("State.Graphics", "LineThickness", T::Float, Some("1.0"), OPT),
    ("State.Graphics", "FillColor", T::ColorType, Some("White"), OPT),
    ("State.Graphics", "ShapeType", T::Str, Some("Rectangle"), OPT),
    ("State.Graphics", "ZOrder", T::Integer, None, OPT),
    ("State.Xref", "Database", T::Str, None, REQ),
    ("State.Xref", "ID", T::Str, None, REQ),
    ("State", "BiopaxRef", T::Str, None, OPT),
    ("State", "GraphId", T::Id, None, OPT),
    ("State", "GraphRef", T::IdRef, None, OPT),
    ("State", "TextLabel", T::Str, None, REQ),
    ("State", "StateType", T::Str, Some("Unknown"), OPT),
    ("GraphicalLine.Graphics.Point", "X", T::Float, None, REQ),
    ("GraphicalLine.Graphics.Point", "Y", T::Float, None, REQ),
    ("GraphicalLine.Graphics.Point", "RelX", T::Float, None, OPT),
    ("GraphicalLine.Graphics.Point", "RelY", T::Float, None, OPT),
    ("GraphicalLine.Graphics.Point", "GraphRef", T::IdRef, None, OPT),
    ("GraphicalLine.Graphics.Point", "GraphId", T::Id, None, OPT),
    ("GraphicalLine.Graphics.Point", "ArrowHead", T::Str, Some("Line"), OPT),
    ("GraphicalLine.Graphics.Anchor", "Position", T::Float, None, REQ),
    ("GraphicalLine.Graphics.Anchor", "GraphId", T::Id, None, OPT),
    ("GraphicalLine.Graphics.Anchor", "Shape", T::Str, Some("ReceptorRound"), OPT),
    ("GraphicalLine.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("GraphicalLine.Graphics", "LineThickness", T::Float, None, OPT),
    ("GraphicalLine.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("GraphicalLine.Graphics", "ConnectorType", T::Str, Some("Straight"), OPT),
    ("GraphicalLine.Graphics", "ZOrder", T::Integer, None, OPT),
    ("GraphicalLine", "GroupRef", T::Str, None, OPT),
    ("GraphicalLine", "BiopaxRef", T::Str, None, OPT),
    ("GraphicalLine", "GraphId", T::Id, None, OPT),
    ("GraphicalLine", "Type", T::Str, None, OPT),
    ("Interaction.Graphics.Point", "X", T::Float, None, REQ),
    ("Interaction.Graphics.Point", "Y", T::Float, None, REQ),
    ("Interaction.Graphics.Point", "RelX", T::Float, None, OPT),
    ("Interaction.Graphics.Point", "RelY", T::Float, None, OPT),
    ("Interaction.Graphics.Point", "GraphRef", T::IdRef, None, OPT),
    ("Interaction.Graphics.Point", "GraphId", T::Id, None, OPT),
    ("Interaction.Graphics.Point", "ArrowHead", T::Str, Some("Line"), OPT),
    ("Interaction.Graphics.Anchor", "Position", T::Float, None, REQ),
    ("Interaction.Graphics.Anchor", "GraphId", T::Id, None, OPT),
    ("Interaction.Graphics.Anchor", "Shape", T::Str, Some("ReceptorRound"), OPT),
    ("Interaction.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("Interaction.Graphics", "LineThickness", T::Float, None, OPT),
    ("Interaction.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("Interaction.Graphics", "ConnectorType", T::Str, Some("Straight"), OPT),
    ("Interaction.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Interaction.Xref", "Database", T::Str, None, REQ),
    ("Interaction.Xref", "ID", T::Str, None, REQ),
    ("Interaction", "GroupRef", T::Str, None, OPT),
    ("Interaction", "BiopaxRef", T::Str, None, OPT),
    ("Interaction", "GraphId", T::Id, None, OPT),
    ("Interaction", "Type", T::Str, None, OPT),
    ("Label.Graphics", "CenterX", T::Float, None, REQ),
    ("Label.Graphics", "CenterY", T::Float, None, REQ),
    ("Label.Graphics", "Width", T::Dimension, None, REQ),
    ("Label.Graphics", "Height", T::Dimension, None, REQ),
    ("Label.Graphics", "FontName", T::Str, Some("Arial"), OPT),
    ("Label.Graphics", "FontStyle", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontDecoration", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontStrikethru", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontWeight", T::Str, Some("Normal"), OPT),
    ("Label.Graphics", "FontSize", T::NonNegInteger, Some("12"), OPT),
    ("Label.Graphics", "Align", T::Str, Some("Center"), OPT),
    ("Label.Graphics", "Valign", T::Str, Some("Top"), OPT),
    ("Label.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("Label.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("Label.Graphics", "LineThickness", T::Float, Some("1.0"), OPT),
    ("Label.Graphics", "FillColor", T::ColorType, Some("Transparent"), OPT),
    ("Label.Graphics", "ShapeType", T::Str, Some("None"), OPT),
    ("Label.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Label", "Href", T::Str, None, OPT),
    ("Label", "BiopaxRef", T::Str, None, OPT),
    ("Label", "GraphId", T::Id, None, OPT),
    ("Label", "GroupRef", T::Str, None, OPT),
    ("Label", "TextLabel", T::Str, None, REQ),
    ("Shape.Graphics", "CenterX", T::Float, None, REQ),
    ("Shape.Graphics", "CenterY", T::Float, None, REQ),
    ("Shape.Graphics", "Width", T::Dimension, None, REQ),
    ("Shape.Graphics", "Height", T::Dimension, None, REQ),
    ("Shape.Graphics", "FontName", T::Str, Some("Arial"), OPT),
    ("Shape.Graphics", "FontStyle", T::Str, Some("Normal"), OPT),
    ("Shape.Graphics", "FontDecoration", T::Str, Some("Normal"), OPT),
    ("Shape.Graphics", "FontStrikethru", T::Str, Some("Normal"), OPT),
    ("Shape.Graphics", "FontWeight", T::Str, Some("Normal"), OPT),
    ("Shape.Graphics", "FontSize", T::NonNegInteger, Some("12"), OPT),
    ("Shape.Graphics", "Align", T::Str, Some("Center"), OPT),
    ("Shape.Graphics", "Valign", T::Str, Some("Top"), OPT),
    ("Shape.Graphics", "Color", T::ColorType, Some("Black"), OPT),
    ("Shape.Graphics", "LineStyle", T::Style, Some("Solid"), OPT),
    ("Shape.Graphics", "LineThickness", T::Float, Some("1.0"), OPT),
    ("Shape.Graphics", "FillColor", T::ColorType, Some("Transparent"), OPT),
    ("Shape.Graphics", "ShapeType", T::Str, None, REQ),
    ("Shape.Graphics", "ZOrder", T::Integer, None, OPT),
    ("Shape.Graphics", "Rotation", T::Rotation, Some("Top"), OPT),
    ("Shape", "BiopaxRef", T::Str, None, OPT),
    ("Shape", "GraphId", T::Id, None, OPT),
    ("Shape", "GroupRef", T::Str, None, OPT),
    ("Shape", "TextLabel", T::Str, None, OPT),
    ("Group", "BiopaxRef", T::Str, None, OPT),
    ("Group", "GroupId", T::Str, None, REQ),
    ("Group", "GroupRef", T::Str, None, OPT),
    ("Group", "Style", T::Str, Some("None"), OPT),
    ("Group", "TextLabel", T::Str, None, OPT),
    ("Group", "GraphId", T::Id, None, OPT),
    ("InfoBox", "CenterX", T::Float, None, REQ),
    ("InfoBox", "CenterY", T::Float, None, REQ),
    ("Legend", "CenterX", T::Float, None, REQ),
    ("Legend", "CenterY", T::Float, None, REQ),
];

/// Schema shared by the 2007 and 2008a dialects.
pub static GPML_200X: Lazy<AttributeSchema> =
    Lazy::new(|| AttributeSchema::from_rows(GPML_200X_ROWS));

/// Schema for the 2010a dialect.
pub static GPML_2010A: Lazy<AttributeSchema> =
    Lazy::new(|| AttributeSchema::from_rows(GPML_2010A_ROWS));

/// Schema for the 2013a dialect.
pub static GPML_2013A: Lazy<AttributeSchema> =
    Lazy::new(|| AttributeSchema::from_rows(GPML_2013A_ROWS));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_attribute_is_a_hard_error() {
        let err = GPML_2013A.spec("DataNode", "NoSuchAttribute").unwrap_err();
        assert!(matches!(err, ConversionError::UnknownAttribute { .. }));
    }

    #[test]
    fn test_read_substitutes_default() {
        // no node at all: the default applies
        let value = GPML_2013A
            .read(None, "DataNode.Graphics", "FontSize")
            .unwrap();
        assert_eq!(value.as_deref(), Some("12"));
        // optional without default: absent
        let value = GPML_2013A.read(None, "Pathway", "Organism").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_read_missing_required_fails() {
        let err = GPML_2013A
            .read(None, "DataNode.Graphics", "CenterX")
            .unwrap_err();
        assert!(matches!(err, ConversionError::MissingRequiredAttribute { .. }));
    }

    #[test]
    fn test_string_default_elision() {
        assert!(GPML_2013A
            .is_default("DataNode.Graphics", "FontName", "Arial")
            .unwrap());
        assert!(!GPML_2013A
            .is_default("DataNode.Graphics", "FontName", "Courier")
            .unwrap());
        // optional attribute with no default equals the empty string
        assert!(GPML_2013A.is_default("Pathway", "Organism", "").unwrap());
    }

    #[test]
    fn test_numeric_default_elision_uses_tolerance() {
        assert!(GPML_2013A
            .is_default("Shape.Graphics", "LineThickness", "1.0000000001")
            .unwrap());
        assert!(GPML_2013A
            .is_default("Shape.Graphics", "LineThickness", "1")
            .unwrap());
        assert!(!GPML_2013A
            .is_default("Shape.Graphics", "LineThickness", "2.0")
            .unwrap());
    }

    #[test]
    fn test_color_default_elision_tracks_transparent_sentinel() {
        // Shape fill defaults to Transparent
        assert!(GPML_2013A
            .is_default("Shape.Graphics", "FillColor", "Transparent")
            .unwrap());
        // black is what Transparent decodes to, but the sentinel differs
        assert!(!GPML_2013A
            .is_default("Shape.Graphics", "FillColor", "000000")
            .unwrap());
        // DataNode fill defaults to White; hex spelling matches it
        assert!(GPML_2013A
            .is_default("DataNode.Graphics", "FillColor", "ffffff")
            .unwrap());
    }

    #[test]
    fn test_required_attributes_are_never_elided() {
        assert!(!GPML_2013A
            .is_default("Pathway.Graphics", "BoardWidth", "0.0")
            .unwrap());
    }

    #[test]
    fn test_rotation_is_never_elided() {
        // "0.0" and the "Top" keyword mean the same angle but do not compare
        assert!(!GPML_2013A
            .is_default("Shape.Graphics", "Rotation", "0.0")
            .unwrap());
    }

    #[test]
    fn test_dialect_tables_differ_where_history_did() {
        // relative-coordinate casing changed in 2013a
        assert!(GPML_200X.contains("State.Graphics", "relX"));
        assert!(GPML_2013A.contains("State.Graphics", "RelX"));
        assert!(!GPML_2013A.contains("State.Graphics", "relX"));
        // the deprecated Head attribute exists only in 200X
        assert!(GPML_200X.contains("Line.Graphics.Point", "Head"));
        assert!(!GPML_2010A.contains("Line.Graphics.Point", "Head"));
        // Interaction is a 2013a concept
        assert!(GPML_2013A.contains("Interaction.Graphics.Point", "X"));
        assert!(!GPML_2010A.contains("Interaction.Graphics.Point", "X"));
    }
}
