use super::{ElementType, Geom, Geometry};
use crate::attr::Attributes;
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;

/// A closed polygon over point elements.
///
/// Border segments are separate owned elements linked through `inherits`.
#[derive(Debug, Clone)]
pub struct PolygonKind {
    pub vertices: Vec<ElementId>,
    pub borders: Vec<ElementId>,
}

impl Geometry for PolygonKind {
    fn element_type(&self) -> ElementType {
        ElementType::Polygon
    }

    fn inputs(&self) -> Vec<ElementId> {
        self.vertices.clone()
    }

    fn compute(&self, view: &ArenaView<'_>, _attrs: &Attributes) -> Result<Geom, UpdateError> {
        let vertices = self
            .vertices
            .iter()
            .map(|v| view.point(*v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Geom::Polygon { vertices })
    }

    fn render_kind(&self) -> RenderKind {
        RenderKind::Polygon
    }
}
