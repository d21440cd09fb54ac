use super::{ElementType, Geom, Geometry};
use crate::attr::Attributes;
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;

/// Counter-clockwise arc around `center`, starting at `radius_point` and
/// ending on the ray towards `angle_point`
#[derive(Debug, Clone)]
pub struct ArcKind {
    pub center: ElementId,
    pub radius_point: ElementId,
    pub angle_point: ElementId,
}

impl Geometry for ArcKind {
    fn element_type(&self) -> ElementType {
        ElementType::Arc
    }

    fn inputs(&self) -> Vec<ElementId> {
        vec![self.center, self.radius_point, self.angle_point]
    }

    fn compute(&self, view: &ArenaView<'_>, _attrs: &Attributes) -> Result<Geom, UpdateError> {
        let center = view.point(self.center)?;
        let start = view.point(self.radius_point)?;
        let end = view.point(self.angle_point)?;
        Ok(Geom::Arc {
            center,
            radius: center.distance(start),
            start: center.angle_to(start),
            end: center.angle_to(end),
        })
    }

    fn render_kind(&self) -> RenderKind {
        RenderKind::Curve
    }
}
