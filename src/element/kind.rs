//! Static dispatch over element kinds.

use enum_dispatch::enum_dispatch;

use super::{
    ArcKind, CircleKind, ElementType, Geom, ImageKind, LineKind, PointKind, PolygonKind, TextKind,
    TraceKind, ViewKind,
};
use crate::attr::Attributes;
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;

/// What every kind supplies to the update engine
#[enum_dispatch]
pub trait Geometry {
    fn element_type(&self) -> ElementType;

    /// Elements read by `compute`. Each one is a dependency edge and must be
    /// real for the result to be real.
    fn inputs(&self) -> Vec<ElementId>;

    /// The kind's `update()` body: derive fresh geometry from the current
    /// state of its inputs. Degenerate inputs produce geometry that is not
    /// real rather than an error.
    fn compute(&self, view: &ArenaView<'_>, attrs: &Attributes) -> Result<Geom, UpdateError>;

    /// Which `draw*`/`update*` pair of the renderer applies
    fn render_kind(&self) -> RenderKind;
}

#[enum_dispatch(Geometry)]
#[derive(Debug, Clone)]
pub enum ElementKind {
    Point(PointKind),
    Line(LineKind),
    Circle(CircleKind),
    Arc(ArcKind),
    Polygon(PolygonKind),
    Text(TextKind),
    Image(ImageKind),
    View(ViewKind),
    Trace(TraceKind),
}
