//! Element construction.
//!
//! `create` validates every parent and attribute before it touches the
//! registry, so a rejected call leaves the board unchanged.

use glam::DVec2;

use super::Board;
use crate::attr::{AttrKey, AttrPatch, AttrValue, Attributes, normalize, validate};
use crate::element::{
    ArcKind, CircleKind, CircleMethod, Element, ElementClass, ElementKind, ElementType, Geometry,
    ImageKind, Inherit, Lifecycle, LineKind, Placement, PointKind, PolygonKind, TextContent,
    TextKind, ViewKind, Visibility,
};
use crate::errors::ConstructionError;
use crate::log::debug;
use crate::registry::ElementId;
use crate::term::{Term, create_function};
use crate::types::Coords;

/// One constructor argument
#[derive(Debug, Clone)]
pub enum ParentRef {
    Element(ElementId),
    /// An element id or name, a formula or a text, depending on position
    Text(String),
    Number(f64),
    Coords(Coords),
    Term(Term),
}

impl From<ElementId> for ParentRef {
    fn from(id: ElementId) -> Self {
        ParentRef::Element(id)
    }
}

impl From<&str> for ParentRef {
    fn from(s: &str) -> Self {
        ParentRef::Text(s.to_string())
    }
}

impl From<String> for ParentRef {
    fn from(s: String) -> Self {
        ParentRef::Text(s)
    }
}

impl From<f64> for ParentRef {
    fn from(v: f64) -> Self {
        ParentRef::Number(v)
    }
}

impl From<(f64, f64)> for ParentRef {
    fn from(c: (f64, f64)) -> Self {
        ParentRef::Coords(c.into())
    }
}

impl From<Coords> for ParentRef {
    fn from(c: Coords) -> Self {
        ParentRef::Coords(c)
    }
}

impl From<Term> for ParentRef {
    fn from(t: Term) -> Self {
        ParentRef::Term(t)
    }
}

/// Build a `Vec<ParentRef>` from mixed arguments
#[macro_export]
macro_rules! parents {
    ($($p:expr),* $(,)?) => {
        vec![$($crate::ParentRef::from($p)),*]
    };
}

/// A polygon corner before construction
enum Vertex {
    Existing(ElementId),
    New(Coords),
}

/// Resolved parents, ready to register
enum Blueprint {
    Kind(ElementKind),
    Polygon(Vec<Vertex>),
}

impl Board {
    /// Create an element of type `ty`.
    ///
    /// `attrs` are applied over the type's defaults. Fails without side
    /// effects on a bad type, arity, parent or name.
    pub fn create(
        &mut self,
        ty: ElementType,
        parents: Vec<ParentRef>,
        attrs: impl Into<AttrPatch>,
    ) -> Result<ElementId, ConstructionError> {
        let mut patch = self.options.defaults_for(ty).cloned().unwrap_or_default();
        patch.merge(&attrs.into());
        let attributes = build_attributes(&patch);

        let name = match attributes.get_str(&AttrKey::Name) {
            Some(name) if !name.is_empty() => {
                if self.registry.name_taken(name) {
                    return Err(ConstructionError::NameTaken {
                        name: name.to_string(),
                    });
                }
                name.to_string()
            }
            _ => self.registry.generate_name(ty),
        };
        let view = match attributes.get_str(&AttrKey::View) {
            Some(view) => Some(self.registry.select(view).ok_or_else(|| {
                ConstructionError::UnknownReference {
                    reference: view.to_string(),
                }
            })?),
            None => None,
        };

        let blueprint = self.blueprint(ty, &parents)?;

        // nothing below can fail
        let (kind, owned_vertices) = match blueprint {
            Blueprint::Kind(kind) => (kind, Vec::new()),
            Blueprint::Polygon(corners) => {
                let mut vertices = Vec::with_capacity(corners.len());
                let mut owned = Vec::new();
                for corner in corners {
                    match corner {
                        Vertex::Existing(id) => vertices.push(id),
                        Vertex::New(c) => {
                            let id = self.create_vertex(c);
                            owned.push(id);
                            vertices.push(id);
                        }
                    }
                }
                let kind = ElementKind::Polygon(PolygonKind {
                    vertices,
                    borders: Vec::new(),
                });
                (kind, owned)
            }
        };

        let with_label = attributes.get_bool(&AttrKey::WithLabel).unwrap_or(false);
        let borders = attributes
            .get(&AttrKey::Borders)
            .and_then(AttrValue::as_patch)
            .cloned();
        let id = self.register(ty, kind, attributes, name, None);
        if let Some(el) = self.registry.get_mut(id) {
            el.view = view;
        }

        if ty == ElementType::Polygon {
            for &v in &owned_vertices {
                if let Some(vertex) = self.registry.get_mut(v) {
                    vertex.owner = Some(id);
                }
            }
            self.create_borders(id, borders.unwrap_or_default());
        }
        if with_label {
            self.create_label(id);
        }

        debug!(id = ?id, ty = %ty, "created element");
        self.update();
        Ok(id)
    }

    /// Like [`Board::create`] with the type given by name
    pub fn create_by_name(
        &mut self,
        ty: &str,
        parents: Vec<ParentRef>,
        attrs: impl Into<AttrPatch>,
    ) -> Result<ElementId, ConstructionError> {
        self.create(ty.parse()?, parents, attrs)
    }

    /// Insert an element and wire its inputs as dependency edges
    pub(crate) fn register(
        &mut self,
        ty: ElementType,
        kind: ElementKind,
        attrs: Attributes,
        name: String,
        owner: Option<ElementId>,
    ) -> ElementId {
        let inputs = kind.inputs();
        let id = self.registry.insert_with(ty, |id, key| {
            build_element(id, key, name, kind, attrs, owner)
        });
        self.wire(id, &inputs);
        id
    }

    fn wire(&mut self, id: ElementId, inputs: &[ElementId]) {
        self.graph.insert(id);
        for &input in inputs {
            self.graph.add_child(input, id);
        }
    }

    /// An owned point for a polygon corner given as coordinates
    fn create_vertex(&mut self, at: Coords) -> ElementId {
        let mut patch = self
            .options
            .defaults_for(ElementType::Point)
            .cloned()
            .unwrap_or_default();
        patch.merge(
            &AttrPatch::new()
                .with("visible", "inherit")
                .with("withlabel", false),
        );
        let name = self.registry.generate_name(ElementType::Point);
        self.register(
            ElementType::Point,
            ElementKind::Point(PointKind::Free(at)),
            build_attributes(&patch),
            name,
            None,
        )
    }

    /// Border segments of a polygon, owned by it
    fn create_borders(&mut self, polygon: ElementId, nested: AttrPatch) {
        let Some(el) = self.registry.get(polygon) else {
            return;
        };
        let ElementKind::Polygon(kind) = &el.kind else {
            return;
        };
        let vertices = kind.vertices.clone();
        let with_lines = el.attrs.get_bool(&AttrKey::WithLines).unwrap_or(true);

        let mut borders = Vec::new();
        if with_lines {
            let mut patch = self
                .options
                .defaults_for(ElementType::Segment)
                .cloned()
                .unwrap_or_default();
            patch.merge(&AttrPatch::new().with("withlabel", false));
            patch.merge(&nested);
            for (i, &from) in vertices.iter().enumerate() {
                let to = vertices[(i + 1) % vertices.len()];
                let kind = ElementKind::Line(LineKind {
                    point1: from,
                    point2: to,
                    segment: true,
                });
                let name = self.registry.generate_name(ElementType::Segment);
                let border = self.register(
                    ElementType::Segment,
                    kind,
                    build_attributes(&patch),
                    name,
                    Some(polygon),
                );
                borders.push(border);
            }
        }

        if let Some(el) = self.registry.get_mut(polygon) {
            if let ElementKind::Polygon(kind) = &mut el.kind {
                kind.borders = borders.clone();
            }
            el.inherits = vec![Inherit::Group(vertices), Inherit::Group(borders)];
        }
    }

    /// The label of `anchor`: a text showing the anchor's name next to it
    pub(crate) fn create_label(&mut self, anchor: ElementId) -> Option<ElementId> {
        let el = self.registry.get(anchor)?;
        if let Some(existing) = el.label {
            return Some(existing);
        }
        let key = format!("{}Label", el.key);

        let mut patch = self
            .options
            .defaults_for(ElementType::Text)
            .cloned()
            .unwrap_or_default();
        patch.merge(&self.options.label_defaults);
        if let Some(nested) = el.attrs.get(&AttrKey::Label).and_then(AttrValue::as_patch) {
            patch.merge(nested);
        }
        if let Some(color) = el.attrs.get_str(&AttrKey::LabelColor) {
            patch.insert("strokecolor", color);
        }
        let attrs = build_attributes(&patch);

        let kind = ElementKind::Text(TextKind {
            content: TextContent::AnchorName(anchor),
            placement: Placement::Anchored {
                anchor,
                offset: self.options.label_offset,
            },
        });
        let inputs = kind.inputs();
        let label = self.registry.insert_keyed(key, |id, key| {
            build_element(id, key, String::new(), kind, attrs, Some(anchor))
        });
        self.wire(label, &inputs);
        if let Some(el) = self.registry.get_mut(anchor) {
            el.label = Some(label);
        }
        Some(label)
    }

    // ========================================================================
    // Parent resolution
    // ========================================================================

    fn blueprint(
        &self,
        ty: ElementType,
        parents: &[ParentRef],
    ) -> Result<Blueprint, ConstructionError> {
        let arity = |expected: &'static str| ConstructionError::Arity {
            kind: ty,
            expected,
            got: parents.len(),
        };

        let kind = match ty {
            ElementType::Point => match parents {
                [ParentRef::Coords(c)] => ElementKind::Point(PointKind::Free(*c)),
                [ParentRef::Number(x), ParentRef::Number(y)] => {
                    ElementKind::Point(PointKind::Free(Coords::new(*x, *y)))
                }
                [x, y] => ElementKind::Point(PointKind::Terms {
                    x: self.term(ty, 0, x)?,
                    y: self.term(ty, 1, y)?,
                }),
                _ => return Err(arity("1 or 2")),
            },
            ElementType::Line | ElementType::Segment => match parents {
                [a, b] => ElementKind::Line(LineKind {
                    point1: self.point(ty, 0, a)?,
                    point2: self.point(ty, 1, b)?,
                    segment: ty == ElementType::Segment,
                }),
                _ => return Err(arity("2")),
            },
            ElementType::Circle => match parents {
                [center, second] => ElementKind::Circle(CircleKind {
                    center: self.point(ty, 0, center)?,
                    method: self.circle_method(ty, second)?,
                }),
                _ => return Err(arity("2")),
            },
            ElementType::Arc => match parents {
                [c, r, a] => ElementKind::Arc(ArcKind {
                    center: self.point(ty, 0, c)?,
                    radius_point: self.point(ty, 1, r)?,
                    angle_point: self.point(ty, 2, a)?,
                }),
                _ => return Err(arity("3")),
            },
            ElementType::Polygon => {
                if parents.len() < 3 {
                    return Err(arity("at least 3"));
                }
                let corners = parents
                    .iter()
                    .enumerate()
                    .map(|(i, p)| match p {
                        ParentRef::Coords(c) => Ok(Vertex::New(*c)),
                        other => self.point(ty, i, other).map(Vertex::Existing),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Blueprint::Polygon(corners));
            }
            ElementType::Text => match parents {
                [x, y, content] => ElementKind::Text(TextKind {
                    content: self.text_content(ty, 2, content)?,
                    placement: Placement::Terms(self.term(ty, 0, x)?, self.term(ty, 1, y)?),
                }),
                [at, content] => ElementKind::Text(TextKind {
                    content: self.text_content(ty, 1, content)?,
                    placement: self.placement(ty, 0, at, self.options.label_offset)?,
                }),
                _ => return Err(arity("2 or 3")),
            },
            ElementType::Image | ElementType::ForeignObject => match parents {
                [ParentRef::Text(content), at, ParentRef::Coords(size)] => {
                    ElementKind::Image(ImageKind {
                        content: content.clone(),
                        placement: self.placement(ty, 1, at, DVec2::ZERO)?,
                        size: (Term::Constant(size.x()), Term::Constant(size.y())),
                        foreign: ty == ElementType::ForeignObject,
                    })
                }
                [_, _, ParentRef::Coords(_)] => return Err(parent_type(ty, 0, "a text")),
                [_, _, _] => return Err(parent_type(ty, 2, "a width and height")),
                _ => return Err(arity("3")),
            },
            ElementType::View => match parents {
                [ParentRef::Coords(origin), ParentRef::Coords(size)] => {
                    ElementKind::View(ViewKind {
                        origin: *origin,
                        size: size.0,
                    })
                }
                [_, _] => return Err(parent_type(ty, 0, "coordinates")),
                _ => return Err(arity("2")),
            },
            ElementType::Trace => return Err(ConstructionError::NotConstructible { kind: ty }),
        };
        Ok(Blueprint::Kind(kind))
    }

    /// Any registered element
    fn element_ref(
        &self,
        ty: ElementType,
        index: usize,
        p: &ParentRef,
    ) -> Result<ElementId, ConstructionError> {
        match p {
            ParentRef::Element(id) if self.registry.contains(*id) => Ok(*id),
            ParentRef::Element(id) => Err(ConstructionError::UnknownReference {
                reference: format!("{id:?}"),
            }),
            ParentRef::Text(s) => {
                self.registry
                    .select(s)
                    .ok_or_else(|| ConstructionError::UnknownReference {
                        reference: s.clone(),
                    })
            }
            _ => Err(parent_type(ty, index, "an element")),
        }
    }

    fn point(
        &self,
        ty: ElementType,
        index: usize,
        p: &ParentRef,
    ) -> Result<ElementId, ConstructionError> {
        let id = self.element_ref(ty, index, p)?;
        match self.registry.get(id).map(Element::element_class) {
            Some(ElementClass::Point) => Ok(id),
            _ => Err(parent_type(ty, index, "a point")),
        }
    }

    fn term(&self, ty: ElementType, index: usize, p: &ParentRef) -> Result<Term, ConstructionError> {
        match p {
            ParentRef::Number(v) => Ok(Term::Constant(*v)),
            ParentRef::Text(s) => Ok(create_function(s.as_str(), &self.registry)?),
            ParentRef::Term(t) => Ok(t.clone()),
            _ => Err(parent_type(ty, index, "a number or formula")),
        }
    }

    /// Second circle parent: a point, a line, a circle or a radius
    fn circle_method(
        &self,
        ty: ElementType,
        p: &ParentRef,
    ) -> Result<CircleMethod, ConstructionError> {
        let element = match p {
            ParentRef::Element(_) => Some(self.element_ref(ty, 1, p)?),
            ParentRef::Text(s) => self.registry.select(s),
            _ => None,
        };
        let Some(id) = element else {
            return Ok(CircleMethod::PointRadius(self.term(ty, 1, p)?));
        };
        match self.registry.get(id).map(Element::element_class) {
            Some(ElementClass::Point) => Ok(CircleMethod::TwoPoints(id)),
            Some(ElementClass::Line) => Ok(CircleMethod::PointLine(id)),
            Some(ElementClass::Circle) => Ok(CircleMethod::PointCircle(id)),
            _ => Err(parent_type(ty, 1, "a point, line, circle or radius")),
        }
    }

    fn placement(
        &self,
        ty: ElementType,
        index: usize,
        p: &ParentRef,
        offset: DVec2,
    ) -> Result<Placement, ConstructionError> {
        match p {
            ParentRef::Coords(c) => Ok(Placement::Fixed(*c)),
            ParentRef::Element(_) | ParentRef::Text(_) => Ok(Placement::Anchored {
                anchor: self.element_ref(ty, index, p)?,
                offset,
            }),
            _ => Err(parent_type(ty, index, "coordinates or an element")),
        }
    }

    fn text_content(
        &self,
        ty: ElementType,
        index: usize,
        p: &ParentRef,
    ) -> Result<TextContent, ConstructionError> {
        match p {
            ParentRef::Text(s) => Ok(TextContent::Static(s.clone())),
            ParentRef::Number(v) => Ok(TextContent::Value(Term::Constant(*v))),
            ParentRef::Term(t) => Ok(TextContent::Value(t.clone())),
            _ => Err(parent_type(ty, index, "a text, number or term")),
        }
    }
}

fn parent_type(kind: ElementType, index: usize, expected: &'static str) -> ConstructionError {
    ConstructionError::ParentType {
        kind,
        index,
        expected,
    }
}

/// Normalize and validate a patch into a fresh attribute map
pub(crate) fn build_attributes(patch: &AttrPatch) -> Attributes {
    let mut attrs = Attributes::new();
    for (key, value) in normalize(patch) {
        if validate(&key, &value) {
            attrs.insert(key, value);
        }
    }
    attrs
}

fn build_element(
    id: ElementId,
    key: String,
    name: String,
    kind: ElementKind,
    attrs: Attributes,
    owner: Option<ElementId>,
) -> Element {
    let mut el = Element::new(id, key, name, kind);
    el.visible = attrs
        .get(&AttrKey::Visible)
        .and_then(Visibility::from_value)
        .unwrap_or_default();
    el.needs_regular_update = attrs.get_bool(&AttrKey::NeedsRegularUpdate).unwrap_or(true);
    el.attrs = attrs;
    el.owner = owner;
    el.lifecycle = Lifecycle::Registered;
    el
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BoardOptions;
    use crate::parents;

    fn board() -> Board {
        Board::new(BoardOptions::default().with_id("c"))
    }

    #[test]
    fn rejected_calls_register_nothing() {
        let mut b = board();
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        let before = b.len();

        let err = b.create(ElementType::Circle, parents![a], ()).unwrap_err();
        assert!(matches!(err, ConstructionError::Arity { got: 1, .. }));

        let err = b
            .create(ElementType::Line, parents![a, "nowhere"], ())
            .unwrap_err();
        assert!(matches!(err, ConstructionError::UnknownReference { .. }));

        let err = b
            .create(ElementType::Polygon, parents![a, (1.0, 0.0), 3.0], ())
            .unwrap_err();
        assert!(matches!(err, ConstructionError::ParentType { index: 2, .. }));

        let err = b
            .create(ElementType::Point, parents![1.0, "X(Q)"], ())
            .unwrap_err();
        assert!(matches!(err, ConstructionError::Term(_)));

        let err = b.create(ElementType::Trace, parents![], ()).unwrap_err();
        assert!(matches!(err, ConstructionError::NotConstructible { .. }));

        assert_eq!(b.len(), before);
    }

    #[test]
    fn taken_names_are_rejected() {
        let mut b = board();
        b.create(ElementType::Point, parents![(0.0, 0.0)], ("name", "A"))
            .unwrap();
        let err = b
            .create(ElementType::Point, parents![(1.0, 0.0)], ("name", "A"))
            .unwrap_err();
        assert!(matches!(err, ConstructionError::NameTaken { .. }));
    }

    #[test]
    fn unknown_type_names() {
        let mut b = board();
        let err = b.create_by_name("hyperbola", parents![], ()).unwrap_err();
        assert!(matches!(err, ConstructionError::UnknownType { .. }));
        assert!(b.create_by_name("Point", parents![1.0, 2.0], ()).is_ok());
    }

    #[test]
    fn points_get_labels_showing_their_name() {
        let mut b = board();
        let a = b
            .create(ElementType::Point, parents![(1.0, 1.0)], ("name", "A"))
            .unwrap();
        let label = b.element(a).and_then(Element::label).unwrap();
        let el = b.element(label).unwrap();
        assert_eq!(el.key(), "cP0Label");
        assert_eq!(el.owner(), Some(a));
        assert_eq!(el.visibility(), Visibility::Inherit);
        assert!(b.graph().has_descendant(a, label));
        match el.geom() {
            crate::element::Geom::Text { position, content } => {
                assert_eq!(content, "A");
                assert!((position.x() - 1.1).abs() < 1e-12);
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn polygon_from_coordinates_owns_vertices_and_borders() {
        let mut b = board();
        let p = b
            .create(
                ElementType::Polygon,
                parents![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)],
                (),
            )
            .unwrap();
        let el = b.element(p).unwrap();
        let [Inherit::Group(vertices), Inherit::Group(borders)] = el.inherits() else {
            panic!("unexpected inherits {:?}", el.inherits());
        };
        assert_eq!(vertices.len(), 3);
        assert_eq!(borders.len(), 3);
        for v in vertices {
            let vertex = b.element(*v).unwrap();
            assert_eq!(vertex.owner(), Some(p));
            assert_eq!(vertex.visibility(), Visibility::Inherit);
            assert!(vertex.label().is_none());
        }
        for s in borders {
            assert_eq!(b.element(*s).unwrap().element_type(), ElementType::Segment);
        }
        // vertices precede the polygon, borders follow it
        let pos = |id| b.order().iter().position(|o| *o == id).unwrap();
        assert!(vertices.iter().all(|v| pos(*v) < pos(p)));
        assert!(borders.iter().all(|s| pos(*s) > pos(p)));
        assert!(el.is_real());
    }

    #[test]
    fn circle_methods_follow_the_second_parent() {
        let mut b = board();
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ("name", "A")).unwrap();
        let q = b.create(ElementType::Point, parents![(3.0, 4.0)], ("name", "Q")).unwrap();
        let s = b.create(ElementType::Segment, parents![a, q], ()).unwrap();
        let by_point = b.create(ElementType::Circle, parents![a, "Q"], ()).unwrap();
        let by_line = b.create(ElementType::Circle, parents![q, s], ()).unwrap();
        let by_circle = b.create(ElementType::Circle, parents![q, by_point], ()).unwrap();
        let by_formula = b.create(ElementType::Circle, parents![a, "X(Q) / 2"], ()).unwrap();
        assert_eq!(b.radius(by_point), Some(5.0));
        assert_eq!(b.radius(by_line), Some(5.0));
        assert_eq!(b.radius(by_circle), Some(5.0));
        assert_eq!(b.radius(by_formula), Some(1.5));
        assert!(b.graph().has_descendant(q, by_formula));
    }

    #[test]
    fn coincident_points_make_a_circle_not_real() {
        let mut b = board();
        let a = b.create(ElementType::Point, parents![(1.0, 1.0)], ()).unwrap();
        let q = b.create(ElementType::Point, parents![(1.0, 1.0)], ()).unwrap();
        let c = b.create(ElementType::Circle, parents![a, q], ()).unwrap();
        let el = b.element(c).unwrap();
        assert!(!el.is_real());
        assert!(!el.vis_prop_calc().visible);
        assert_eq!(b.radius(c), Some(0.0));
    }

    #[test]
    fn texts_images_and_views() {
        let mut b = board();
        let t = b
            .create(ElementType::Text, parents![1.0, 2.0, "hello"], ())
            .unwrap();
        assert_eq!(b.coords(t), Some(Coords::new(1.0, 2.0)));

        let v = b
            .create(ElementType::View, parents![(0.0, 0.0), (4.0, 3.0)], ("name", "panel"))
            .unwrap();
        let img = b
            .create(
                ElementType::Image,
                parents!["logo.png", (1.0, 1.0), (2.0, 1.0)],
                ("view", "panel"),
            )
            .unwrap();
        assert_eq!(b.element(img).unwrap().view(), Some(v));
        let bbox = b.bounds(img).unwrap();
        assert_eq!((bbox.width(), bbox.height()), (2.0, 1.0));

        let err = b
            .create(ElementType::Image, parents!["x", (0.0, 0.0), (1.0, 1.0)], ("view", "missing"))
            .unwrap_err();
        assert!(matches!(err, ConstructionError::UnknownReference { .. }));
    }
}
