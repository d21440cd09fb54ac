//! A renderer that records calls into a shared log

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{Buffering, RenderKind, Renderer};
use crate::element::Element;

/// One recorded renderer call, keyed by element id
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Draw(RenderKind, String),
    Update(RenderKind, String),
    Remove(String),
    Display(String, bool),
    SetLayer(String, u32),
    SetGradient(String),
    Highlight(String),
    NoHighlight(String),
    SetBuffering(String, Buffering),
}

impl RenderCall {
    pub fn key(&self) -> &str {
        match self {
            RenderCall::Draw(_, k)
            | RenderCall::Update(_, k)
            | RenderCall::Remove(k)
            | RenderCall::Display(k, _)
            | RenderCall::SetLayer(k, _)
            | RenderCall::SetGradient(k)
            | RenderCall::Highlight(k)
            | RenderCall::NoHighlight(k)
            | RenderCall::SetBuffering(k, _) => k,
        }
    }
}

impl fmt::Display for RenderCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderCall::Draw(kind, k) => write!(f, "draw_{kind} {k}"),
            RenderCall::Update(kind, k) => write!(f, "update_{kind} {k}"),
            RenderCall::Remove(k) => write!(f, "remove {k}"),
            RenderCall::Display(k, v) => write!(f, "display {k} {v}"),
            RenderCall::SetLayer(k, layer) => write!(f, "set_layer {k} {layer}"),
            RenderCall::SetGradient(k) => write!(f, "set_gradient {k}"),
            RenderCall::Highlight(k) => write!(f, "highlight {k}"),
            RenderCall::NoHighlight(k) => write!(f, "no_highlight {k}"),
            RenderCall::SetBuffering(k, mode) => write!(f, "set_buffering {k} {mode:?}"),
        }
    }
}

/// Shared handle to a recording renderer's log
pub type RenderLog = Rc<RefCell<Vec<RenderCall>>>;

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    log: RenderLog,
}

impl RecordingRenderer {
    /// A renderer plus a handle for reading what it recorded
    pub fn new() -> (Self, RenderLog) {
        let log = RenderLog::default();
        (Self { log: log.clone() }, log)
    }

    fn push(&self, call: RenderCall) {
        self.log.borrow_mut().push(call);
    }
}

macro_rules! record_kinds {
    ($($draw:ident / $update:ident => $kind:ident),* $(,)?) => {
        $(
            fn $draw(&mut self, el: &Element) {
                self.push(RenderCall::Draw(RenderKind::$kind, el.key().to_string()));
            }
            fn $update(&mut self, el: &Element) {
                self.push(RenderCall::Update(RenderKind::$kind, el.key().to_string()));
            }
        )*
    };
}

impl Renderer for RecordingRenderer {
    record_kinds! {
        draw_point / update_point => Point,
        draw_line / update_line => Line,
        draw_ellipse / update_ellipse => Ellipse,
        draw_curve / update_curve => Curve,
        draw_polygon / update_polygon => Polygon,
        draw_text / update_text => Text,
        draw_image / update_image => Image,
        draw_foreign_object / update_foreign_object => ForeignObject,
    }

    fn remove(&mut self, key: &str) {
        self.push(RenderCall::Remove(key.to_string()));
    }

    fn display(&mut self, el: &Element, visible: bool) {
        self.push(RenderCall::Display(el.key().to_string(), visible));
    }

    fn set_layer(&mut self, el: &Element, layer: u32) {
        self.push(RenderCall::SetLayer(el.key().to_string(), layer));
    }

    fn set_gradient(&mut self, el: &Element) {
        self.push(RenderCall::SetGradient(el.key().to_string()));
    }

    fn highlight(&mut self, el: &Element) {
        self.push(RenderCall::Highlight(el.key().to_string()));
    }

    fn no_highlight(&mut self, el: &Element) {
        self.push(RenderCall::NoHighlight(el.key().to_string()));
    }

    fn set_buffering(&mut self, el: &Element, mode: Buffering) {
        self.push(RenderCall::SetBuffering(el.key().to_string(), mode));
    }
}
