//! Render boundary
//!
//! The engine never draws anything itself. After every pass it calls a
//! [`Renderer`] for each dirty visible element:
//! - `draw_*` the first time an element is shown
//! - `update_*` on later passes
//! - `display` when computed visibility flips
//! - `remove` when an element leaves the board
//!
//! `recording`: a renderer that logs every call, for tests and demos.

mod recording;

pub use recording::{RecordingRenderer, RenderCall, RenderLog};

use std::fmt;

use crate::element::Element;

/// Which family of renderer calls an element uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderKind {
    Point,
    Line,
    /// Circles
    Ellipse,
    /// Arcs
    Curve,
    Polygon,
    Text,
    Image,
    ForeignObject,
    /// Containers with no visual of their own
    None,
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderKind::Point => "point",
            RenderKind::Line => "line",
            RenderKind::Ellipse => "ellipse",
            RenderKind::Curve => "curve",
            RenderKind::Polygon => "polygon",
            RenderKind::Text => "text",
            RenderKind::Image => "image",
            RenderKind::ForeignObject => "foreignobject",
            RenderKind::None => "none",
        })
    }
}

/// Whether a visual is refreshed on every pass or only on explicit ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffering {
    Auto,
    Static,
}

/// Operations the engine needs from a drawing backend.
///
/// Every method has an empty default so backends only implement what they
/// support.
#[allow(unused_variables)]
pub trait Renderer {
    fn draw_point(&mut self, el: &Element) {}
    fn update_point(&mut self, el: &Element) {}
    fn draw_line(&mut self, el: &Element) {}
    fn update_line(&mut self, el: &Element) {}
    fn draw_ellipse(&mut self, el: &Element) {}
    fn update_ellipse(&mut self, el: &Element) {}
    fn draw_curve(&mut self, el: &Element) {}
    fn update_curve(&mut self, el: &Element) {}
    fn draw_polygon(&mut self, el: &Element) {}
    fn update_polygon(&mut self, el: &Element) {}
    fn draw_text(&mut self, el: &Element) {}
    fn update_text(&mut self, el: &Element) {}
    fn draw_image(&mut self, el: &Element) {}
    fn update_image(&mut self, el: &Element) {}
    fn draw_foreign_object(&mut self, el: &Element) {}
    fn update_foreign_object(&mut self, el: &Element) {}

    /// Drop the visual with the given element id
    fn remove(&mut self, key: &str) {}
    fn display(&mut self, el: &Element, visible: bool) {}
    fn set_layer(&mut self, el: &Element, layer: u32) {}
    fn set_gradient(&mut self, el: &Element) {}
    fn highlight(&mut self, el: &Element) {}
    fn no_highlight(&mut self, el: &Element) {}
    fn set_buffering(&mut self, el: &Element, mode: Buffering) {}
}

/// Create the visual for `el`
pub(crate) fn draw(renderer: &mut dyn Renderer, kind: RenderKind, el: &Element) {
    match kind {
        RenderKind::Point => renderer.draw_point(el),
        RenderKind::Line => renderer.draw_line(el),
        RenderKind::Ellipse => renderer.draw_ellipse(el),
        RenderKind::Curve => renderer.draw_curve(el),
        RenderKind::Polygon => renderer.draw_polygon(el),
        RenderKind::Text => renderer.draw_text(el),
        RenderKind::Image => renderer.draw_image(el),
        RenderKind::ForeignObject => renderer.draw_foreign_object(el),
        RenderKind::None => {}
    }
}

/// Refresh the existing visual of `el`
pub(crate) fn refresh(renderer: &mut dyn Renderer, kind: RenderKind, el: &Element) {
    match kind {
        RenderKind::Point => renderer.update_point(el),
        RenderKind::Line => renderer.update_line(el),
        RenderKind::Ellipse => renderer.update_ellipse(el),
        RenderKind::Curve => renderer.update_curve(el),
        RenderKind::Polygon => renderer.update_polygon(el),
        RenderKind::Text => renderer.update_text(el),
        RenderKind::Image => renderer.update_image(el),
        RenderKind::ForeignObject => renderer.update_foreign_object(el),
        RenderKind::None => {}
    }
}

/// A renderer that ignores every call
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}
