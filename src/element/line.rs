use super::{ElementType, Geom, Geometry};
use crate::attr::{AttrKey, Attributes};
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;

/// A line or segment through two points.
///
/// Whether it extends past its points comes from the `straightfirst` and
/// `straightlast` attributes; segments default both to false.
#[derive(Debug, Clone)]
pub struct LineKind {
    pub point1: ElementId,
    pub point2: ElementId,
    pub segment: bool,
}

impl Geometry for LineKind {
    fn element_type(&self) -> ElementType {
        if self.segment {
            ElementType::Segment
        } else {
            ElementType::Line
        }
    }

    fn inputs(&self) -> Vec<ElementId> {
        vec![self.point1, self.point2]
    }

    fn compute(&self, view: &ArenaView<'_>, attrs: &Attributes) -> Result<Geom, UpdateError> {
        let straight = !self.segment;
        Ok(Geom::Line {
            p1: view.point(self.point1)?,
            p2: view.point(self.point2)?,
            straight_first: attrs.get_bool(&AttrKey::StraightFirst).unwrap_or(straight),
            straight_last: attrs.get_bool(&AttrKey::StraightLast).unwrap_or(straight),
        })
    }

    fn render_kind(&self) -> RenderKind {
        RenderKind::Line
    }
}
