use super::{ElementType, Geom, Geometry};
use crate::attr::Attributes;
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;

/// A frozen copy of another element's geometry
#[derive(Debug, Clone)]
pub struct TraceKind {
    pub geom: Geom,
    pub render: RenderKind,
}

impl Geometry for TraceKind {
    fn element_type(&self) -> ElementType {
        ElementType::Trace
    }

    fn inputs(&self) -> Vec<ElementId> {
        Vec::new()
    }

    fn compute(&self, _view: &ArenaView<'_>, _attrs: &Attributes) -> Result<Geom, UpdateError> {
        Ok(self.geom.clone())
    }

    fn render_kind(&self) -> RenderKind {
        self.render
    }
}
