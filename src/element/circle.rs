use super::{ElementType, Geom, Geometry};
use crate::attr::Attributes;
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;
use crate::term::Term;

/// How a circle gets its radius
#[derive(Debug, Clone)]
pub enum CircleMethod {
    /// Distance from the center to a point on the circle
    TwoPoints(ElementId),
    /// A number, formula or callback
    PointRadius(Term),
    /// Length of a line's defining segment
    PointLine(ElementId),
    /// Radius of another circle
    PointCircle(ElementId),
}

#[derive(Debug, Clone)]
pub struct CircleKind {
    pub center: ElementId,
    pub method: CircleMethod,
}

impl CircleKind {
    /// Current radius. Coincident defining points give 0, which leaves the
    /// circle not-real.
    pub fn radius(&self, view: &ArenaView<'_>) -> Result<f64, UpdateError> {
        let center = view.point(self.center)?;
        Ok(match &self.method {
            CircleMethod::TwoPoints(p) => center.distance(view.point(*p)?),
            CircleMethod::PointRadius(term) => term.eval(view),
            CircleMethod::PointLine(line) => {
                let (p1, p2) = view.segment(*line)?;
                p1.distance(p2)
            }
            CircleMethod::PointCircle(circle) => view.circle(*circle)?.1,
        })
    }
}

impl Geometry for CircleKind {
    fn element_type(&self) -> ElementType {
        ElementType::Circle
    }

    fn inputs(&self) -> Vec<ElementId> {
        let mut inputs = vec![self.center];
        match &self.method {
            CircleMethod::TwoPoints(id)
            | CircleMethod::PointLine(id)
            | CircleMethod::PointCircle(id) => inputs.push(*id),
            CircleMethod::PointRadius(term) => {
                inputs.extend(term.deps().iter().filter(|d| **d != self.center))
            }
        }
        inputs
    }

    fn compute(&self, view: &ArenaView<'_>, _attrs: &Attributes) -> Result<Geom, UpdateError> {
        Ok(Geom::Circle {
            center: view.point(self.center)?,
            radius: self.radius(view)?,
        })
    }

    fn render_kind(&self) -> RenderKind {
        RenderKind::Ellipse
    }
}
