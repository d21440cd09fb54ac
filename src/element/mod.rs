//! Elements: the registry record every geometric kind shares.

mod arc;
mod circle;
mod container;
mod geom;
mod image;
mod kind;
mod line;
mod point;
mod polygon;
mod text;
mod trace;

use std::fmt;
use std::str::FromStr;

use crate::attr::{AttrValue, Attributes};
use crate::errors::ConstructionError;
use crate::registry::ElementId;

pub use arc::ArcKind;
pub use circle::{CircleKind, CircleMethod};
pub use container::ViewKind;
pub use geom::Geom;
pub use image::ImageKind;
pub use kind::{ElementKind, Geometry};
pub use line::LineKind;
pub use point::PointKind;
pub use polygon::PolygonKind;
pub use text::{Placement, TextContent, TextKind, format_number};
pub use trace::TraceKind;

// ============================================================================
// Classification
// ============================================================================

/// Closed set of element types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Point,
    Line,
    Segment,
    Circle,
    Arc,
    Polygon,
    Text,
    Image,
    ForeignObject,
    View,
    Trace,
}

impl ElementType {
    pub const ALL: [ElementType; 11] = [
        ElementType::Point,
        ElementType::Line,
        ElementType::Segment,
        ElementType::Circle,
        ElementType::Arc,
        ElementType::Polygon,
        ElementType::Text,
        ElementType::Image,
        ElementType::ForeignObject,
        ElementType::View,
        ElementType::Trace,
    ];

    pub fn class(self) -> ElementClass {
        match self {
            ElementType::Point => ElementClass::Point,
            ElementType::Line | ElementType::Segment => ElementClass::Line,
            ElementType::Circle => ElementClass::Circle,
            ElementType::Arc => ElementClass::Curve,
            ElementType::Polygon => ElementClass::Area,
            ElementType::Text => ElementClass::Text,
            ElementType::Image | ElementType::ForeignObject | ElementType::View | ElementType::Trace => {
                ElementClass::Other
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Point => "point",
            ElementType::Line => "line",
            ElementType::Segment => "segment",
            ElementType::Circle => "circle",
            ElementType::Arc => "arc",
            ElementType::Polygon => "polygon",
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::ForeignObject => "foreignobject",
            ElementType::View => "view",
            ElementType::Trace => "trace",
        }
    }

    /// Short code used in generated element ids
    pub(crate) fn code(self) -> &'static str {
        match self {
            ElementType::Point => "P",
            ElementType::Line => "L",
            ElementType::Segment => "S",
            ElementType::Circle => "C",
            ElementType::Arc => "A",
            ElementType::Polygon => "Y",
            ElementType::Text => "T",
            ElementType::Image => "I",
            ElementType::ForeignObject => "F",
            ElementType::View => "V",
            ElementType::Trace => "R",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        ElementType::ALL
            .into_iter()
            .find(|t| t.as_str() == norm)
            .ok_or(ConstructionError::UnknownType {
                name: s.to_string(),
            })
    }
}

/// Coarse capability classes used for parent type checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementClass {
    Point,
    Line,
    Circle,
    Curve,
    Area,
    Text,
    Other,
}

// ============================================================================
// State
// ============================================================================

/// Raw `visible` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Inherit,
}

impl Visibility {
    pub fn from_value(value: &AttrValue) -> Option<Visibility> {
        match value {
            AttrValue::Bool(true) => Some(Visibility::Visible),
            AttrValue::Bool(false) => Some(Visibility::Hidden),
            AttrValue::Inherit => Some(Visibility::Inherit),
            _ => None,
        }
    }

    pub fn to_value(self) -> AttrValue {
        match self {
            Visibility::Visible => AttrValue::Bool(true),
            Visibility::Hidden => AttrValue::Bool(false),
            Visibility::Inherit => AttrValue::Inherit,
        }
    }

    /// Concrete value given what the caller passes down
    pub fn resolve(self, inherited: Option<bool>) -> bool {
        match self {
            Visibility::Visible => true,
            Visibility::Hidden => false,
            Visibility::Inherit => inherited.unwrap_or(false),
        }
    }
}

impl From<bool> for Visibility {
    fn from(v: bool) -> Self {
        if v {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

/// Values computed by the last pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisPropCalc {
    pub visible: bool,
}

/// Where an element is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Parents validated, record being assembled
    Constructing,
    /// In the registry with edges wired
    Registered,
    /// Took part in at least one pass
    Live,
    /// Unregistered; only seen on records handed back by removal
    Removed,
}

/// Per-pass state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Clean,
    Dirty,
    Updating,
    /// Updated and visibility resolved; waiting for the renderer
    Resolved,
}

/// A visibility link from owner to sub-elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inherit {
    One(ElementId),
    Group(Vec<ElementId>),
}

impl Inherit {
    pub fn ids(&self) -> &[ElementId] {
        match self {
            Inherit::One(id) => std::slice::from_ref(id),
            Inherit::Group(ids) => ids,
        }
    }

    pub(crate) fn forget(&mut self, id: ElementId) {
        if let Inherit::Group(ids) = self {
            ids.retain(|i| *i != id);
        }
    }
}

// ============================================================================
// Element
// ============================================================================

/// One object of a construction
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) id: ElementId,
    /// String id, unique for the board's lifetime
    pub(crate) key: String,
    pub(crate) name: String,
    pub(crate) kind: ElementKind,
    pub(crate) geom: Geom,
    pub(crate) attrs: Attributes,
    pub(crate) visible: Visibility,
    pub(crate) vis_calc: VisPropCalc,
    /// Last visibility sent to the renderer
    pub(crate) shown: Option<bool>,
    pub(crate) drawn: bool,
    pub(crate) is_real: bool,
    pub(crate) needs_regular_update: bool,
    pub(crate) highlighted: bool,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) pass: PassState,
    pub(crate) inherits: Vec<Inherit>,
    pub(crate) label: Option<ElementId>,
    pub(crate) owner: Option<ElementId>,
    pub(crate) view: Option<ElementId>,
    pub(crate) traces: Vec<ElementId>,
}

impl Element {
    pub(crate) fn new(id: ElementId, key: String, name: String, kind: ElementKind) -> Self {
        Self {
            id,
            key,
            name,
            kind,
            geom: Geom::Empty,
            attrs: Attributes::new(),
            visible: Visibility::Visible,
            vis_calc: VisPropCalc::default(),
            shown: None,
            drawn: false,
            is_real: false,
            needs_regular_update: true,
            highlighted: false,
            lifecycle: Lifecycle::Constructing,
            pass: PassState::Dirty,
            inherits: Vec::new(),
            label: None,
            owner: None,
            view: None,
            traces: Vec::new(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// String id, e.g. `board1P3`
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn element_class(&self) -> ElementClass {
        self.element_type().class()
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn geom(&self) -> &Geom {
        &self.geom
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attrs
    }

    /// Raw visibility attribute
    pub fn visibility(&self) -> Visibility {
        self.visible
    }

    pub fn vis_prop_calc(&self) -> VisPropCalc {
        self.vis_calc
    }

    pub fn is_real(&self) -> bool {
        self.is_real
    }

    pub fn needs_update(&self) -> bool {
        self.pass != PassState::Clean
    }

    pub fn needs_regular_update(&self) -> bool {
        self.needs_regular_update
    }

    pub fn is_drawn(&self) -> bool {
        self.drawn
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn pass_state(&self) -> PassState {
        self.pass
    }

    pub fn inherits(&self) -> &[Inherit] {
        &self.inherits
    }

    pub fn label(&self) -> Option<ElementId> {
        self.label
    }

    pub fn owner(&self) -> Option<ElementId> {
        self.owner
    }

    pub fn view(&self) -> Option<ElementId> {
        self.view
    }

    pub fn traces(&self) -> &[ElementId] {
        &self.traces
    }

    /// Every element this one cascades visibility into
    pub(crate) fn sub_elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.inherits
            .iter()
            .flat_map(|i| i.ids().iter().copied())
            .chain(self.label)
    }

    /// Drop every reference to `id` from visibility links
    pub(crate) fn forget(&mut self, id: ElementId) {
        for link in &mut self.inherits {
            link.forget(id);
        }
        self.inherits
            .retain(|link| !matches!(link, Inherit::One(one) if *one == id));
        if self.label == Some(id) {
            self.label = None;
        }
        self.traces.retain(|t| *t != id);
        if self.view == Some(id) {
            self.view = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_round_trips_through_str() {
        for t in ElementType::ALL {
            assert_eq!(t.as_str().parse::<ElementType>().ok(), Some(t));
        }
        assert!(matches!(
            "hyperbola".parse::<ElementType>(),
            Err(ConstructionError::UnknownType { .. })
        ));
        assert_eq!("  Circle ".parse::<ElementType>().ok(), Some(ElementType::Circle));
    }

    #[test]
    fn visibility_resolution() {
        assert!(Visibility::Visible.resolve(Some(false)));
        assert!(!Visibility::Hidden.resolve(Some(true)));
        assert!(Visibility::Inherit.resolve(Some(true)));
        // no visible ancestor means hidden
        assert!(!Visibility::Inherit.resolve(None));
    }

    #[test]
    fn visibility_attr_values() {
        assert_eq!(
            Visibility::from_value(&AttrValue::Inherit),
            Some(Visibility::Inherit)
        );
        assert_eq!(Visibility::from_value(&AttrValue::Number(1.0)), None);
        assert_eq!(Visibility::Hidden.to_value(), AttrValue::Bool(false));
    }

    #[test]
    fn classes() {
        assert_eq!(ElementType::Segment.class(), ElementClass::Line);
        assert_eq!(ElementType::Arc.class(), ElementClass::Curve);
        assert_eq!(ElementType::Polygon.class(), ElementClass::Area);
    }
}
