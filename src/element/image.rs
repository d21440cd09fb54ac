use glam::DVec2;

use super::{ElementType, Geom, Geometry, Placement};
use crate::attr::Attributes;
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;
use crate::term::Term;

/// A rectangular external resource: an image URL or foreign markup
#[derive(Debug, Clone)]
pub struct ImageKind {
    pub content: String,
    pub placement: Placement,
    pub size: (Term, Term),
    /// Foreign object instead of an image
    pub foreign: bool,
}

impl Geometry for ImageKind {
    fn element_type(&self) -> ElementType {
        if self.foreign {
            ElementType::ForeignObject
        } else {
            ElementType::Image
        }
    }

    fn inputs(&self) -> Vec<ElementId> {
        let mut inputs = self.placement.inputs();
        for id in self.size.0.deps().iter().chain(self.size.1.deps()) {
            if !inputs.contains(id) {
                inputs.push(*id);
            }
        }
        inputs
    }

    fn compute(&self, view: &ArenaView<'_>, _attrs: &Attributes) -> Result<Geom, UpdateError> {
        Ok(Geom::Rect {
            origin: self.placement.resolve(view)?,
            size: DVec2::new(self.size.0.eval(view), self.size.1.eval(view)),
        })
    }

    fn render_kind(&self) -> RenderKind {
        if self.foreign {
            RenderKind::ForeignObject
        } else {
            RenderKind::Image
        }
    }
}
