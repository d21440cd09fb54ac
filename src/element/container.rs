use glam::DVec2;

use super::{ElementType, Geom, Geometry};
use crate::attr::Attributes;
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;
use crate::types::Coords;

/// A hideable container. Members are forced hidden while it is hidden.
#[derive(Debug, Clone)]
pub struct ViewKind {
    pub origin: Coords,
    pub size: DVec2,
}

impl Geometry for ViewKind {
    fn element_type(&self) -> ElementType {
        ElementType::View
    }

    fn inputs(&self) -> Vec<ElementId> {
        Vec::new()
    }

    fn compute(&self, _view: &ArenaView<'_>, _attrs: &Attributes) -> Result<Geom, UpdateError> {
        Ok(Geom::Rect {
            origin: self.origin,
            size: self.size,
        })
    }

    fn render_kind(&self) -> RenderKind {
        RenderKind::None
    }
}
