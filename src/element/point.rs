use super::{ElementType, Geom, Geometry};
use crate::attr::Attributes;
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;
use crate::term::Term;
use crate::types::Coords;

/// A point, either free or computed from two terms
#[derive(Debug, Clone)]
pub enum PointKind {
    Free(Coords),
    Terms { x: Term, y: Term },
}

impl PointKind {
    /// Free points are the ones a host can drag
    pub fn is_free(&self) -> bool {
        matches!(self, PointKind::Free(_))
    }

    pub(crate) fn move_to(&mut self, to: Coords) -> bool {
        match self {
            PointKind::Free(c) => {
                *c = to;
                true
            }
            PointKind::Terms { .. } => false,
        }
    }
}

impl Geometry for PointKind {
    fn element_type(&self) -> ElementType {
        ElementType::Point
    }

    fn inputs(&self) -> Vec<ElementId> {
        match self {
            PointKind::Free(_) => Vec::new(),
            PointKind::Terms { x, y } => {
                let mut deps = x.deps().to_vec();
                deps.extend(y.deps().iter().filter(|d| !x.deps().contains(*d)));
                deps
            }
        }
    }

    fn compute(&self, view: &ArenaView<'_>, _attrs: &Attributes) -> Result<Geom, UpdateError> {
        Ok(Geom::Point(match self {
            PointKind::Free(c) => *c,
            PointKind::Terms { x, y } => Coords::new(x.eval(view), y.eval(view)),
        }))
    }

    fn render_kind(&self) -> RenderKind {
        RenderKind::Point
    }
}
