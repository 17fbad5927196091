//! Pathway element types.
//!
//! A [`PathwayElement`] is a tagged record: the [`ObjectKind`] determines
//! which of its fields are meaningful. A single superset struct instead of
//! one type per kind keeps the format layer simple, since every dialect maps
//! onto the same field set and most fields are shared between several kinds.

use indexmap::IndexMap;

use crate::color::Color;
use crate::geometry::{Bounds, Point, Size};

/// The kind of a pathway element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    DataNode,
    State,
    Label,
    Line,
    GraphicalLine,
    Shape,
    Group,
    Legend,
    InfoBox,
    MappInfo,
    Biopax,
}

impl ObjectKind {
    /// Returns the canonical GPML tag name for this kind.
    ///
    /// The mapinfo element is stored on the document root, hence its tag is
    /// `Pathway`.
    pub fn tag(self) -> &'static str {
        match self {
            ObjectKind::DataNode => "DataNode",
            ObjectKind::State => "State",
            ObjectKind::Label => "Label",
            ObjectKind::Line => "Line",
            ObjectKind::GraphicalLine => "GraphicalLine",
            ObjectKind::Shape => "Shape",
            ObjectKind::Group => "Group",
            ObjectKind::Legend => "Legend",
            ObjectKind::InfoBox => "InfoBox",
            ObjectKind::MappInfo => "Pathway",
            ObjectKind::Biopax => "Biopax",
        }
    }

    /// Resolves a GPML tag name to an element kind.
    pub fn from_tag(tag: &str) -> Option<ObjectKind> {
        Some(match tag {
            "DataNode" => ObjectKind::DataNode,
            "State" => ObjectKind::State,
            "Label" => ObjectKind::Label,
            "Line" => ObjectKind::Line,
            "GraphicalLine" => ObjectKind::GraphicalLine,
            "Shape" => ObjectKind::Shape,
            "Group" => ObjectKind::Group,
            "Legend" => ObjectKind::Legend,
            "InfoBox" => ObjectKind::InfoBox,
            "Pathway" => ObjectKind::MappInfo,
            "Biopax" => ObjectKind::Biopax,
            _ => return None,
        })
    }

    /// Default stacking order for newly created elements of this kind.
    ///
    /// Explicit `ZOrder` attributes override these; ties are broken by
    /// insertion order because the save path uses a stable sort.
    pub fn default_z_order(self) -> i32 {
        match self {
            ObjectKind::Group => 0x1000,
            ObjectKind::Line | ObjectKind::GraphicalLine => 0x3000,
            ObjectKind::Shape => 0x4000,
            ObjectKind::Label => 0x7000,
            ObjectKind::DataNode => 0x8000,
            ObjectKind::State => 0x8000 + 0x10,
            _ => 0,
        }
    }

    /// True for the kinds that route points through connector geometry.
    pub fn is_line(self) -> bool {
        matches!(self, ObjectKind::Line | ObjectKind::GraphicalLine)
    }
}

/// Line ending decoration, an open set of names ("Line", "Arrow", "TBar", …).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrowHead(String);

impl ArrowHead {
    pub fn from_name(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for ArrowHead {
    /// The undecorated line ending.
    fn default() -> Self {
        Self("Line".to_owned())
    }
}

/// Shape outline of an element, an open set of names ("Rectangle", "Oval", …).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeKind(String);

impl ShapeKind {
    pub fn from_name(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn none() -> Self {
        Self("None".to_owned())
    }

    pub fn rectangle() -> Self {
        Self("Rectangle".to_owned())
    }
}

/// Visual marker drawn at an anchor position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorShape(String);

impl AnchorShape {
    pub fn from_name(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for AnchorShape {
    fn default() -> Self {
        Self("None".to_owned())
    }
}

/// Visual grouping style of a Group element ("None", "Group", "Complex", …).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupStyle(String);

impl GroupStyle {
    pub fn from_name(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for GroupStyle {
    fn default() -> Self {
        Self("None".to_owned())
    }
}

/// Stroke style of lines and outlines.
///
/// Double lines are persisted through a dynamic property rather than the
/// `LineStyle` attribute; the format layer owns that mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Double,
}

/// Routing strategy for a line's points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectorType {
    #[default]
    Straight,
    Elbow,
    Curved,
    Segmented,
}

impl ConnectorType {
    /// Resolves a connector type name, falling back to `Straight` for
    /// unknown names (a cosmetic attribute, so unknown values must not fail
    /// the load).
    pub fn from_name(name: &str) -> Self {
        match name {
            "Straight" => ConnectorType::Straight,
            "Elbow" => ConnectorType::Elbow,
            "Curved" => ConnectorType::Curved,
            "Segmented" => ConnectorType::Segmented,
            other => {
                log::warn!(value = other; "unknown connector type, using Straight");
                ConnectorType::Straight
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConnectorType::Straight => "Straight",
            ConnectorType::Elbow => "Elbow",
            ConnectorType::Curved => "Curved",
            ConnectorType::Segmented => "Segmented",
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    pub fn from_gpml_name(name: &str) -> Self {
        match name {
            "Left" => Align::Left,
            "Right" => Align::Right,
            _ => Align::Center,
        }
    }

    pub fn gpml_name(self) -> &'static str {
        match self {
            Align::Left => "Left",
            Align::Center => "Center",
            Align::Right => "Right",
        }
    }
}

/// Vertical text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Valign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl Valign {
    pub fn from_gpml_name(name: &str) -> Self {
        match name {
            "Middle" => Valign::Middle,
            "Bottom" => Valign::Bottom,
            _ => Valign::Top,
        }
    }

    pub fn gpml_name(self) -> &'static str {
        match self {
            Valign::Top => "Top",
            Valign::Middle => "Middle",
            Valign::Bottom => "Bottom",
        }
    }
}

/// Cross-reference to an external identifier database, consumed as an opaque
/// `(id, database)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Xref {
    pub id: String,
    pub database: String,
}

/// A free-text comment with an optional source tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    pub source: Option<String>,
    pub text: String,
}

/// An endpoint or waypoint of a line element.
///
/// The absolute position is always stored. Once the point is linked to
/// another element, the relative offset `(rel_x, rel_y)` in the target's
/// local frame is authoritative and the absolute position is re-derived from
/// it whenever the target moves; the two representations must never
/// silently diverge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MPoint {
    pub x: f64,
    pub y: f64,
    pub rel_x: f64,
    pub rel_y: f64,
    /// Identifier of the element this point sticks to, if any.
    pub graph_ref: Option<String>,
    /// Points may themselves be reference targets.
    pub graph_id: Option<String>,
    /// Whether `rel_x`/`rel_y` were ever assigned. Legacy documents store
    /// linked points with absolute coordinates only; the load-time upgrade
    /// pass fills the offset in exactly once.
    pub relative_set: bool,
}

impl MPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// True if the point carries a non-empty reference.
    pub fn is_linked(&self) -> bool {
        self.graph_ref.as_deref().is_some_and(|r| !r.is_empty())
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_relative(&mut self, rel_x: f64, rel_y: f64) {
        self.rel_x = rel_x;
        self.rel_y = rel_y;
        self.relative_set = true;
    }
}

/// A reference-able point fixed at a scalar position along a line's routed
/// path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MAnchor {
    /// Position along the line in `[0,1]` of accumulated route length.
    pub position: f64,
    pub shape: AnchorShape,
    pub graph_id: Option<String>,
}

impl MAnchor {
    pub fn new(position: f64) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

const INITIAL_LINE_LENGTH: f64 = 30.0;
const INITIAL_SHAPE_SIZE: f64 = 30.0;
const INITIAL_STATE_SIZE: f64 = 15.0;
const INITIAL_DATANODE_WIDTH: f64 = 80.0;
const INITIAL_DATANODE_HEIGHT: f64 = 20.0;
const INITIAL_BRACE_WIDTH: f64 = 60.0;
const INITIAL_BRACE_HEIGHT: f64 = 15.0;

/// One element of a pathway diagram.
///
/// Carries the superset of fields relevant to its [`ObjectKind`]; fields
/// that do not apply to the kind keep their defaults and are ignored by the
/// format layer. Identity fields (`graph_id`, `group_id`, references) may be
/// set freely while the element is detached; once it is inside a
/// [`PathwayModel`](crate::model::PathwayModel), mutations must go through
/// the model so the graph-link registry stays consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct PathwayElement {
    kind: ObjectKind,

    // identity and references
    pub graph_id: Option<String>,
    /// Group membership: the `groupId` of the owning group, if any.
    pub group_ref: Option<String>,
    /// Declared group identity (Group elements only).
    pub group_id: Option<String>,
    /// Element-level reference (State elements attach to their parent node).
    pub graph_ref: Option<String>,

    // geometry
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians (Shape elements).
    pub rotation: f64,
    /// Offset in the referenced container's frame (State elements).
    pub rel_x: f64,
    pub rel_y: f64,
    pub z_order: i32,

    // style
    pub color: Color,
    pub fill_color: Color,
    pub transparent: bool,
    pub line_style: LineStyle,
    pub line_thickness: f64,
    pub shape_kind: ShapeKind,

    // text
    pub text_label: String,
    pub font_name: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethru: bool,
    pub align: Align,
    pub valign: Valign,
    pub href: Option<String>,

    // data node / state
    pub data_node_type: String,
    pub xref: Xref,

    // line routing
    pub points: Vec<MPoint>,
    pub anchors: Vec<MAnchor>,
    pub start_arrow: ArrowHead,
    pub end_arrow: ArrowHead,
    pub connector_type: ConnectorType,

    // group
    pub group_style: GroupStyle,

    // document metadata (MappInfo)
    pub title: String,
    pub organism: Option<String>,
    pub data_source: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub maintainer: Option<String>,
    pub email: Option<String>,
    pub last_modified: Option<String>,
    pub copyright: Option<String>,

    /// Raw re-serialized RDF payload (Biopax elements).
    pub biopax: Option<String>,

    // shared annotation
    pub comments: Vec<Comment>,
    pub biopax_refs: Vec<String>,
    /// Forward-compatible key/value extension bag, insertion-ordered so that
    /// re-serialization is deterministic.
    pub dynamic_properties: IndexMap<String, String>,
}

impl PathwayElement {
    /// Creates an element of the given kind with that kind's defaults.
    pub fn new(kind: ObjectKind) -> Self {
        let mut el = Self {
            kind,
            graph_id: None,
            group_ref: None,
            group_id: None,
            graph_ref: None,
            center_x: 0.0,
            center_y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            rel_x: 0.0,
            rel_y: 0.0,
            z_order: kind.default_z_order(),
            color: Color::BLACK,
            fill_color: Color::WHITE,
            transparent: matches!(kind, ObjectKind::Shape | ObjectKind::Label),
            line_style: LineStyle::Solid,
            line_thickness: 1.0,
            shape_kind: match kind {
                ObjectKind::Label => ShapeKind::none(),
                _ => ShapeKind::rectangle(),
            },
            text_label: String::new(),
            font_name: "Arial".to_owned(),
            font_size: 12.0,
            bold: false,
            italic: false,
            underline: false,
            strikethru: false,
            align: Align::Center,
            valign: Valign::Top,
            href: None,
            data_node_type: "Unknown".to_owned(),
            xref: Xref::default(),
            points: Vec::new(),
            anchors: Vec::new(),
            start_arrow: ArrowHead::default(),
            end_arrow: ArrowHead::default(),
            connector_type: ConnectorType::Straight,
            group_style: GroupStyle::default(),
            title: "untitled".to_owned(),
            organism: None,
            data_source: None,
            version: None,
            author: None,
            maintainer: None,
            email: None,
            last_modified: None,
            copyright: None,
            biopax: None,
            comments: Vec::new(),
            biopax_refs: Vec::new(),
            dynamic_properties: IndexMap::new(),
        };
        if kind.is_line() {
            el.points = vec![MPoint::new(0.0, 0.0), MPoint::new(0.0, 0.0)];
        }
        el
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Sets the element to a suitable default size, intended to be called
    /// right after the element is placed on a drawing.
    pub fn set_initial_size(&mut self) {
        match self.kind {
            ObjectKind::Shape => {
                if self.shape_kind.name() == "Brace" {
                    self.width = INITIAL_BRACE_WIDTH;
                    self.height = INITIAL_BRACE_HEIGHT;
                } else {
                    self.width = INITIAL_SHAPE_SIZE;
                    self.height = INITIAL_SHAPE_SIZE;
                }
            }
            ObjectKind::DataNode => {
                self.width = INITIAL_DATANODE_WIDTH;
                self.height = INITIAL_DATANODE_HEIGHT;
            }
            ObjectKind::State => {
                self.width = INITIAL_STATE_SIZE;
                self.height = INITIAL_STATE_SIZE;
            }
            ObjectKind::Line | ObjectKind::GraphicalLine => {
                let start = self.start_point();
                if let Some(end) = self.points.last_mut() {
                    end.x = start.x() + INITIAL_LINE_LENGTH;
                    end.y = start.y() + INITIAL_LINE_LENGTH;
                }
            }
            _ => {}
        }
    }

    /// First routing point. Lines always have at least two points.
    pub fn start_point(&self) -> Point {
        self.points.first().map(MPoint::position).unwrap_or_default()
    }

    /// Last routing point.
    pub fn end_point(&self) -> Point {
        self.points.last().map(MPoint::position).unwrap_or_default()
    }

    /// The rectangular bounds of this element.
    ///
    /// For line kinds the bounds wrap the start and end points; for
    /// everything else they derive from center and size.
    pub fn bounds(&self) -> Bounds {
        if self.kind.is_line() {
            Bounds::new_from_corners(self.start_point(), self.end_point())
        } else {
            Bounds::new_from_center(
                Point::new(self.center_x, self.center_y),
                Size::new(self.width, self.height),
            )
        }
    }

    /// Identifiers declared by this element: its own graph id plus the ids
    /// of its anchors and points, in that order.
    pub fn declared_graph_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        if let Some(id) = &self.graph_id {
            ids.push(id.clone());
        }
        for anchor in &self.anchors {
            if let Some(id) = &anchor.graph_id {
                ids.push(id.clone());
            }
        }
        for point in &self.points {
            if let Some(id) = &point.graph_id {
                ids.push(id.clone());
            }
        }
        ids
    }
}
