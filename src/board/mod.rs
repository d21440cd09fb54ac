//! The construction context.
//!
//! A [`Board`] owns everything one construction needs: the element
//! registry, the dependency graph, the renderer and the options. Every
//! operation takes the board explicitly, so independent boards never share
//! state.
//!
//! Submodules:
//! - `create`: parent resolution and element construction
//! - `update`: the update engine and visibility cascade
//! - `attributes`: attribute mutation and virtual reads
//! - `remove`: removal with closure repair
//! - `events`: observer registration
//! - `animate`: attribute interpolation driven by a host timer

mod animate;
mod attributes;
mod create;
mod events;
mod remove;
mod update;

use std::fmt;

pub use create::ParentRef;
pub use events::{BoardEvent, HandlerId};
pub use update::PassReport;

use crate::element::{Element, ElementKind, Geom};
use crate::graph::DependencyGraph;
use crate::options::BoardOptions;
use crate::registry::{ElementId, Registry};
use crate::render::{NullRenderer, Renderer};
use crate::types::{BBox, Coords};
use animate::Animation;
use events::EventBus;
use update::Deferred;

pub struct Board {
    pub(crate) registry: Registry,
    pub(crate) graph: DependencyGraph,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) options: BoardOptions,
    pub(crate) events: EventBus,
    /// A pass is running
    pub(crate) in_update: bool,
    pub(crate) suspended: bool,
    /// A pass was requested while suspended
    pub(crate) pending: bool,
    pub(crate) deferred: Vec<Deferred>,
    pub(crate) animations: Vec<Animation>,
    pub(crate) last_report: PassReport,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("id", &self.registry.board_id())
            .field("elements", &self.registry.len())
            .field("suspended", &self.suspended)
            .finish_non_exhaustive()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardOptions::default())
    }
}

impl Board {
    /// A board that renders nowhere
    pub fn new(options: BoardOptions) -> Self {
        Self::with_renderer(options, NullRenderer)
    }

    pub fn with_renderer(mut options: BoardOptions, renderer: impl Renderer + 'static) -> Self {
        let id = options.take_id();
        Self {
            registry: Registry::new(id),
            graph: DependencyGraph::new(),
            renderer: Box::new(renderer),
            options,
            events: EventBus::default(),
            in_update: false,
            suspended: false,
            pending: false,
            deferred: Vec::new(),
            animations: Vec::new(),
            last_report: PassReport::default(),
        }
    }

    pub fn id(&self) -> &str {
        self.registry.board_id()
    }

    pub fn options(&self) -> &BoardOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Elements in update order
    pub fn order(&self) -> &[ElementId] {
        self.registry.order()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.registry.get(id)
    }

    /// Find an element by string id, name or handle. Handles of removed
    /// elements select nothing.
    pub fn select(&self, what: impl Selector) -> Option<ElementId> {
        what.select_in(&self.registry)
    }

    /// Every element matching `pred`, in update order
    pub fn filter(&self, pred: impl Fn(&Element) -> bool) -> Vec<ElementId> {
        self.registry
            .order()
            .iter()
            .copied()
            .filter(|id| self.registry.get(*id).is_some_and(&pred))
            .collect()
    }

    pub fn last_report(&self) -> &PassReport {
        &self.last_report
    }

    // ========================================================================
    // Geometry queries
    // ========================================================================

    /// Position of a point, or the position of a text
    pub fn coords(&self, id: ElementId) -> Option<Coords> {
        match self.registry.get(id)?.geom() {
            Geom::Point(p) => Some(*p),
            Geom::Text { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Radius of a circle or arc. Not-real circles report their degenerate
    /// radius (0 or NaN).
    pub fn radius(&self, id: ElementId) -> Option<f64> {
        let el = self.registry.get(id)?;
        match el.kind() {
            ElementKind::Circle(circle) => circle.radius(&self.registry.view()).ok(),
            _ => el.geom().radius(),
        }
    }

    pub fn has_point(&self, id: ElementId, p: impl Into<Coords>) -> bool {
        self.registry.get(id).is_some_and(|el| {
            el.is_real() && el.geom().has_point(p.into(), self.options.has_point_tolerance)
        })
    }

    pub fn bounds(&self, id: ElementId) -> Option<BBox> {
        self.registry.get(id)?.geom().bounds()
    }

    // ========================================================================
    // Graph queries
    // ========================================================================

    pub fn parents(&self, id: ElementId) -> &[ElementId] {
        self.graph.parents(id)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.graph.children(id).collect()
    }

    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        self.graph.descendants(id).collect()
    }

    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        self.graph.ancestors(id).collect()
    }

    /// Declare extra parents of `id`, e.g. elements an opaque callback
    /// reads. Self references, duplicates and parents that would close a
    /// cycle are skipped.
    ///
    /// A parent created after `id` moves `id` and its descendants behind it
    /// so the update order stays topological. Returns how many parents were
    /// added.
    pub fn add_parents(&mut self, id: ElementId, parents: &[ElementId]) -> usize {
        if !self.registry.contains(id) {
            return 0;
        }
        let mut added = 0;
        for &parent in parents {
            if !self.graph.add_child(parent, id) {
                continue;
            }
            added += 1;
            let (Some(p), Some(c)) = (self.registry.position(parent), self.registry.position(id))
            else {
                continue;
            };
            if p > c {
                let mut moved = vec![id];
                moved.extend(
                    self.registry
                        .order()
                        .iter()
                        .copied()
                        .filter(|o| self.graph.has_descendant(id, *o)),
                );
                // the block goes behind the last parent it has outside itself
                let anchor = moved
                    .iter()
                    .flat_map(|m| self.graph.parents(*m).iter().copied())
                    .filter(|o| !moved.contains(o))
                    .max_by_key(|o| self.registry.position(*o));
                if let Some(anchor) = anchor {
                    self.registry.reorder_after(anchor, &moved);
                }
            }
        }
        if added > 0 {
            self.mark_dirty(id);
            self.update();
        }
        added
    }

    // ========================================================================
    // Highlighting
    // ========================================================================

    pub fn highlight(&mut self, id: ElementId) -> bool {
        self.set_highlight(id, true)
    }

    pub fn no_highlight(&mut self, id: ElementId) -> bool {
        self.set_highlight(id, false)
    }

    fn set_highlight(&mut self, id: ElementId, on: bool) -> bool {
        let Some(el) = self.registry.get_mut(id) else {
            return false;
        };
        if el.highlighted == on {
            return false;
        }
        el.highlighted = on;
        if el.drawn {
            if on {
                self.renderer.highlight(el);
            } else {
                self.renderer.no_highlight(el);
            }
        }
        true
    }
}

/// Things an element can be selected by
pub trait Selector {
    fn select_in(&self, registry: &Registry) -> Option<ElementId>;
}

impl Selector for ElementId {
    fn select_in(&self, registry: &Registry) -> Option<ElementId> {
        registry.contains(*self).then_some(*self)
    }
}

impl Selector for &str {
    fn select_in(&self, registry: &Registry) -> Option<ElementId> {
        registry.select(self)
    }
}

impl Selector for String {
    fn select_in(&self, registry: &Registry) -> Option<ElementId> {
        registry.select(self)
    }
}

impl Selector for &Element {
    fn select_in(&self, registry: &Registry) -> Option<ElementId> {
        self.id().select_in(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::parents;

    fn board() -> Board {
        Board::new(BoardOptions::default().with_id("t"))
    }

    #[test]
    fn select_by_everything() {
        let mut b = board();
        let a = b
            .create(ElementType::Point, parents![(1.0, 2.0)], [("name", "A")])
            .unwrap();
        assert_eq!(b.select("A"), Some(a));
        assert_eq!(b.select("tP0"), Some(a));
        assert_eq!(b.select(a), Some(a));
        assert_eq!(b.select(String::from("nope")), None);
        b.remove_object(a);
        assert_eq!(b.select(a), None);
    }

    #[test]
    fn filter_keeps_update_order() {
        let mut b = board();
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        let p = b.create(ElementType::Point, parents![(1.0, 0.0)], ()).unwrap();
        b.create(ElementType::Circle, parents![a, p], ()).unwrap();
        let points = b.filter(|el| el.element_type() == ElementType::Point);
        assert_eq!(points, vec![a, p]);
    }

    #[test]
    fn hit_testing_and_bounds() {
        let mut b = board();
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        let p = b.create(ElementType::Point, parents![(2.0, 0.0)], ()).unwrap();
        let c = b.create(ElementType::Circle, parents![a, p], ()).unwrap();
        assert!(b.has_point(c, (0.0, 2.05)));
        assert!(!b.has_point(c, (0.0, 0.0)));
        let bbox = b.bounds(c).unwrap();
        assert_eq!((bbox.width(), bbox.height()), (4.0, 4.0));
    }

    #[test]
    fn late_parents_reorder_the_update_list() {
        let mut b = board();
        let a = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("withlabel", false))
            .unwrap();
        let q = b
            .create(ElementType::Point, parents![(1.0, 0.0)], ("withlabel", false))
            .unwrap();
        let s = b.create(ElementType::Segment, parents![a, q], ()).unwrap();
        let late = b
            .create(ElementType::Point, parents![(2.0, 0.0)], ("withlabel", false))
            .unwrap();

        assert_eq!(b.add_parents(a, &[late, late, a]), 1);
        assert_eq!(b.order(), &[q, late, a, s]);
        assert!(b.graph().has_descendant(late, s));
        assert!(b.graph().is_consistent());

        // s -> a would close a cycle
        assert_eq!(b.add_parents(a, &[s]), 0);
    }

    #[test]
    fn highlight_toggles_once() {
        let mut b = board();
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        assert!(b.highlight(a));
        assert!(!b.highlight(a));
        assert!(b.element(a).unwrap().is_highlighted());
        assert!(b.no_highlight(a));
    }
}
