//! Board configuration and built-in default attributes

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::DVec2;

use crate::attr::AttrPatch;
use crate::element::ElementType;

static BOARD_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Settings for one construction
#[derive(Debug, Clone)]
pub struct BoardOptions {
    /// Prefix of every element id. `None` picks `board<N>`.
    pub id: Option<String>,
    /// Offset of a label from its anchor
    pub label_offset: DVec2,
    /// Distance within which `has_point` reports a hit
    pub has_point_tolerance: f64,
    /// Radii and lengths at or below this are degenerate
    pub epsilon: f64,
    /// Cap on micro-passes run after the main iteration of a pass
    pub max_deferred_rounds: usize,
    pub defaults: HashMap<ElementType, AttrPatch>,
    pub label_defaults: AttrPatch,
}

impl Default for BoardOptions {
    fn default() -> Self {
        let mut defaults = HashMap::new();

        macro_rules! type_defaults {
            ($($ty:ident => [$($key:literal : $value:expr),* $(,)?]),* $(,)?) => {
                $(
                    defaults.insert(
                        ElementType::$ty,
                        AttrPatch::new()$(.with($key, $value))*,
                    );
                )*
            };
        }

        type_defaults! {
            Point => [
                "layer": 9, "strokecolor": "#ff0000", "fillcolor": "#ff0000",
                "size": 3, "face": "o", "withlabel": true,
            ],
            Line => [
                "layer": 7, "strokecolor": "#0000ff", "highlightstrokecolor": "#c3d9ff",
                "strokewidth": 2, "straightfirst": true, "straightlast": true,
            ],
            Segment => [
                "layer": 7, "strokecolor": "#0000ff", "highlightstrokecolor": "#c3d9ff",
                "strokewidth": 2, "straightfirst": false, "straightlast": false,
            ],
            Circle => [
                "layer": 6, "strokecolor": "#0000ff", "highlightstrokecolor": "#c3d9ff",
                "fillcolor": "none", "strokewidth": 2,
            ],
            Arc => [
                "layer": 8, "strokecolor": "#0000ff", "fillcolor": "none",
            ],
            Polygon => [
                "layer": 3, "fillcolor": "#00ff00", "fillopacity": 0.3,
                "highlightfillcolor": "#00ff00", "highlightfillopacity": 0.2,
                "withlines": true,
            ],
            Text => [
                "layer": 9, "strokecolor": "#000000", "fontsize": 12, "digits": 2,
                "decimalseparator": ".",
            ],
            Image => ["layer": 0],
            ForeignObject => ["layer": 0],
            View => ["layer": 0],
            Trace => ["layer": 0, "strokeopacity": 0.3, "fillopacity": 0.3],
        }

        Self {
            id: None,
            label_offset: DVec2::new(0.1, 0.1),
            has_point_tolerance: 0.1,
            epsilon: 1e-10,
            max_deferred_rounds: 4,
            defaults,
            label_defaults: AttrPatch::new()
                .with("visible", "inherit")
                .with("strokecolor", "#000000")
                .with("withlabel", false),
        }
    }
}

impl BoardOptions {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label_offset(mut self, offset: DVec2) -> Self {
        self.label_offset = offset;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.has_point_tolerance = tolerance;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_deferred_rounds(mut self, rounds: usize) -> Self {
        self.max_deferred_rounds = rounds;
        self
    }

    /// Add to (and override) the defaults of one element type
    pub fn with_defaults(mut self, ty: ElementType, patch: impl Into<AttrPatch>) -> Self {
        self.defaults.entry(ty).or_default().merge(&patch.into());
        self
    }

    pub fn with_label_defaults(mut self, patch: impl Into<AttrPatch>) -> Self {
        self.label_defaults.merge(&patch.into());
        self
    }

    pub fn defaults_for(&self, ty: ElementType) -> Option<&AttrPatch> {
        self.defaults.get(&ty)
    }

    /// Board id, drawing a fresh one from the process counter if unset
    pub(crate) fn take_id(&mut self) -> String {
        self.id.clone().unwrap_or_else(|| {
            let id = format!("board{}", BOARD_COUNTER.fetch_add(1, Ordering::Relaxed));
            self.id = Some(id.clone());
            id
        })
    }
}
