//! Update Engine.
//!
//! A pass walks the insertion order, which is topological, and recomputes
//! every dirty element. Then it resolves visibility top-down along the
//! `inherits` links and finally calls the renderer for elements that
//! changed. Structural changes requested while the walk runs (traces) are
//! queued and applied in short micro-passes afterwards.

use std::collections::{BTreeSet, HashSet};
use std::panic::{self, AssertUnwindSafe};

use super::Board;
use super::events::BoardEvent;
use crate::attr::AttrKey;
use crate::element::{
    ElementKind, ElementType, Geom, Geometry, Lifecycle, PassState, TraceKind, Visibility,
};
use crate::errors::UpdateError;
use crate::log::{debug, trace, warn};
use crate::registry::ElementId;
use crate::render;
use crate::types::Coords;

/// What one pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Elements whose update ran, in the order it ran
    pub updated: Vec<ElementId>,
    /// Elements whose update failed; they are now not-real
    pub failed: Vec<(ElementId, UpdateError)>,
    /// Elements the renderer drew or refreshed
    pub rendered: Vec<ElementId>,
    /// The pass did not run (suspended or already running)
    pub skipped: bool,
}

impl PassReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Structural work queued during a pass
#[derive(Debug, Clone)]
pub(crate) enum Deferred {
    /// Freeze the current geometry of an element into a trace
    Trace(ElementId),
}

impl Board {
    // ========================================================================
    // Dirty marking
    // ========================================================================

    /// Mark `id` and everything that depends on it for recomputation.
    ///
    /// Descendants with `needsregularupdate` off are left alone; they only
    /// recompute in full passes or when asked for by name.
    pub fn mark_dirty(&mut self, id: ElementId) {
        let descendants: Vec<ElementId> = self.graph.descendants(id).collect();
        for id in descendants {
            if let Some(el) = self.registry.get_mut(id) {
                if el.needs_regular_update {
                    el.pass = PassState::Dirty;
                }
            }
        }
        if let Some(el) = self.registry.get_mut(id) {
            el.pass = PassState::Dirty;
        }
    }

    // ========================================================================
    // Pass entry points
    // ========================================================================

    /// Run a pass over every element that is currently dirty
    pub fn update(&mut self) -> PassReport {
        self.run_pass(None)
    }

    /// Recompute every element, including those that opted out of
    /// regular updates
    pub fn full_update(&mut self) -> PassReport {
        for el in self.registry.elements.values_mut() {
            el.pass = PassState::Dirty;
        }
        self.run_pass(None)
    }

    /// Recompute `id` and all of its descendants only
    pub fn update_from(&mut self, id: ElementId) -> PassReport {
        let mut scope: BTreeSet<ElementId> = self.graph.descendants(id).collect();
        scope.insert(id);
        for id in &scope {
            if let Some(el) = self.registry.get_mut(*id) {
                el.pass = PassState::Dirty;
            }
        }
        self.run_pass(Some(&scope))
    }

    /// One pass for several changed elements
    pub fn update_batch(&mut self, ids: &[ElementId]) -> PassReport {
        for &id in ids {
            self.mark_dirty(id);
        }
        self.run_pass(None)
    }

    /// Skip passes until [`Board::unsuspend_update`]
    pub fn suspend_update(&mut self) {
        self.suspended = true;
    }

    /// Resume passes, running one if any was requested meanwhile
    pub fn unsuspend_update(&mut self) -> PassReport {
        self.suspended = false;
        if std::mem::take(&mut self.pending) {
            self.update()
        } else {
            PassReport::default()
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    // ========================================================================
    // Moving free points
    // ========================================================================

    /// Drag a free point. Points that are computed or `fixed` refuse.
    pub fn move_point(&mut self, id: ElementId, to: impl Into<Coords>) -> bool {
        if !self.set_point(id, to.into()) {
            return false;
        }
        self.mark_dirty(id);
        self.update();
        true
    }

    /// Move several free points with a single pass. Returns how many moved.
    pub fn move_points(&mut self, moves: &[(ElementId, Coords)]) -> usize {
        let moved: Vec<ElementId> = moves
            .iter()
            .filter(|(id, to)| self.set_point(*id, *to))
            .map(|(id, _)| *id)
            .collect();
        if !moved.is_empty() {
            self.update_batch(&moved);
        }
        moved.len()
    }

    fn set_point(&mut self, id: ElementId, to: Coords) -> bool {
        let to = match Coords::try_new(to.x(), to.y()) {
            Ok(to) => to,
            Err(e) => {
                debug!(?id, error = %e, "refusing to move a point off the plane");
                return false;
            }
        };
        let Some(el) = self.registry.get_mut(id) else {
            return false;
        };
        if el.attrs.get_bool(&AttrKey::Fixed).unwrap_or(false) {
            debug!(?id, "refusing to move a fixed point");
            return false;
        }
        match &mut el.kind {
            ElementKind::Point(point) => point.move_to(to),
            _ => false,
        }
    }

    // ========================================================================
    // The pass
    // ========================================================================

    pub(crate) fn run_pass(&mut self, scope: Option<&BTreeSet<ElementId>>) -> PassReport {
        if self.in_update {
            debug!("pass requested while a pass is running");
            return PassReport::skipped();
        }
        if self.suspended {
            debug!("pass requested while suspended");
            self.pending = true;
            return PassReport::skipped();
        }
        self.in_update = true;

        let mut report = PassReport::default();
        self.update_dirty(scope, &mut report);

        let mut rounds = 0;
        while !self.deferred.is_empty() && rounds < self.options.max_deferred_rounds {
            for work in std::mem::take(&mut self.deferred) {
                self.apply_deferred(work);
            }
            self.update_dirty(None, &mut report);
            rounds += 1;
        }
        if !self.deferred.is_empty() {
            warn!(
                dropped = self.deferred.len(),
                "deferred work left after the last micro-pass"
            );
            self.deferred.clear();
        }

        self.update_visibility();
        self.update_renderer(&mut report);

        self.in_update = false;
        self.events.emit(BoardEvent::Update {
            updated: report.updated.len(),
            failed: report.failed.len(),
            rendered: report.rendered.len(),
        });
        self.last_report = report.clone();
        report
    }

    /// Index-based walk so elements appended meanwhile are still seen
    fn update_dirty(&mut self, scope: Option<&BTreeSet<ElementId>>, report: &mut PassReport) {
        let mut i = 0;
        while let Some(&id) = self.registry.order().get(i) {
            i += 1;
            if scope.is_some_and(|s| !s.contains(&id)) {
                continue;
            }
            if self.registry.get(id).is_some_and(|el| el.pass == PassState::Dirty) {
                self.update_element(id, report);
            }
        }
    }

    fn update_element(&mut self, id: ElementId, report: &mut PassReport) {
        let Some(el) = self.registry.get_mut(id) else {
            return;
        };
        el.pass = PassState::Updating;

        let epsilon = self.options.epsilon;
        let outcome = {
            let view = self.registry.view();
            match view.element(id) {
                Ok(el) => {
                    // user callbacks run in here; a panic fails this element only
                    let computed =
                        panic::catch_unwind(AssertUnwindSafe(|| el.kind.compute(&view, &el.attrs)))
                            .unwrap_or_else(|payload| Err(UpdateError::panicked(payload.as_ref())));
                    computed.map(|geom| {
                        let real = geom.is_real(epsilon)
                            && el.kind.inputs().iter().all(|input| view.is_real(*input));
                        (geom, real)
                    })
                }
                Err(e) => Err(e),
            }
        };

        let Some(el) = self.registry.get_mut(id) else {
            return;
        };
        match outcome {
            Ok((geom, real)) => {
                trace!(?id, real, "recomputed");
                el.geom = geom;
                el.is_real = real;
            }
            Err(e) => {
                warn!(?id, error = %e, "element update failed");
                el.geom = Geom::Empty;
                el.is_real = false;
                report.failed.push((id, e));
            }
        }
        el.pass = PassState::Resolved;
        if el.lifecycle == Lifecycle::Registered {
            el.lifecycle = Lifecycle::Live;
        }
        if el.is_real
            && el.element_type() != ElementType::Trace
            && el.attrs.get_bool(&AttrKey::Trace).unwrap_or(false)
        {
            self.deferred.push(Deferred::Trace(id));
        }
        report.updated.push(id);
    }

    fn apply_deferred(&mut self, work: Deferred) {
        match work {
            Deferred::Trace(source) => {
                self.create_trace(source);
            }
        }
    }

    /// Freeze the geometry of `source` into a new trace element
    pub(crate) fn create_trace(&mut self, source: ElementId) -> Option<ElementId> {
        let el = self.registry.get(source)?;
        let kind = ElementKind::Trace(TraceKind {
            geom: el.geom.clone(),
            render: el.kind.render_kind(),
        });
        let mut patch = self
            .options
            .defaults_for(ElementType::Trace)
            .cloned()
            .unwrap_or_default();
        for key in [AttrKey::StrokeColor, AttrKey::FillColor] {
            if let Some(color) = el.attrs.get_str(&key) {
                patch.insert(key.as_str(), color);
            }
        }
        let attrs = super::create::build_attributes(&patch);
        let trace = self.register(ElementType::Trace, kind, attrs, String::new(), Some(source));
        if let Some(el) = self.registry.get_mut(source) {
            el.traces.push(trace);
        }
        Some(trace)
    }

    // ========================================================================
    // Visibility cascade
    // ========================================================================

    /// Resolve computed visibility for the whole board.
    ///
    /// Elements without an owner start a cascade; owned elements are reached
    /// through their owner's `inherits` links or label. Anything still
    /// unreached (traces) resolves on its own.
    pub(crate) fn update_visibility(&mut self) {
        let order = self.registry.order().to_vec();
        let mut seen = HashSet::new();
        for &id in &order {
            if self.registry.get(id).is_some_and(|el| el.owner.is_none()) {
                self.cascade(id, None, &mut seen);
            }
        }
        for &id in &order {
            if !seen.contains(&id) {
                let inherited = self.owner_visibility(id);
                self.cascade(id, inherited, &mut seen);
            }
        }
    }

    /// Resolve `id` and everything that inherits from it, right now.
    ///
    /// Returns the elements visited.
    pub(crate) fn cascade_from(&mut self, id: ElementId) -> Vec<ElementId> {
        let inherited = self.owner_visibility(id);
        let mut seen = HashSet::new();
        self.cascade(id, inherited, &mut seen);
        self.registry
            .order()
            .iter()
            .copied()
            .filter(|id| seen.contains(id))
            .collect()
    }

    fn owner_visibility(&self, id: ElementId) -> Option<bool> {
        let owner = self.registry.get(id)?.owner?;
        self.registry.get(owner).map(|o| o.vis_calc.visible)
    }

    fn cascade(
        &mut self,
        id: ElementId,
        inherited: Option<bool>,
        seen: &mut HashSet<ElementId>,
    ) {
        let Some(el) = self.registry.get(id) else {
            return;
        };
        let first_visit = seen.insert(id);
        if !first_visit && el.visible != Visibility::Inherit {
            return;
        }

        let mut visible = el.visible.resolve(inherited) && el.is_real;
        if let Some(view) = el.view {
            if self.registry.get(view).is_some_and(|v| !v.vis_calc.visible) {
                visible = false;
            }
        }
        if !first_visit && el.vis_calc.visible == visible {
            return;
        }
        let subs: Vec<ElementId> = el.sub_elements().collect();

        if let Some(el) = self.registry.get_mut(id) {
            el.vis_calc.visible = visible;
        }
        for sub in subs {
            self.cascade(sub, Some(visible), seen);
        }
    }

    // ========================================================================
    // Render boundary
    // ========================================================================

    fn update_renderer(&mut self, report: &mut PassReport) {
        let mut i = 0;
        while let Some(&id) = self.registry.order().get(i) {
            i += 1;
            let Some(el) = self.registry.get_mut(id) else {
                continue;
            };
            let visible = el.vis_calc.visible;
            let kind = el.kind.render_kind();

            if el.drawn && el.shown != Some(visible) {
                self.renderer.display(el, visible);
                el.shown = Some(visible);
            }

            let updated = el.pass == PassState::Resolved;
            if visible && kind != render::RenderKind::None {
                if !el.drawn {
                    render::draw(self.renderer.as_mut(), kind, el);
                    el.drawn = true;
                    el.shown = Some(true);
                    report.rendered.push(id);
                } else if updated {
                    render::refresh(self.renderer.as_mut(), kind, el);
                    report.rendered.push(id);
                }
            }
            if updated {
                el.pass = PassState::Clean;
            }
        }
    }

    /// Push display toggles for `ids` without waiting for a pass
    pub(crate) fn sync_display(&mut self, ids: &[ElementId]) {
        for &id in ids {
            let Some(el) = self.registry.get_mut(id) else {
                continue;
            };
            let visible = el.vis_calc.visible;
            if el.drawn && el.shown != Some(visible) {
                self.renderer.display(el, visible);
                el.shown = Some(visible);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::options::BoardOptions;
    use crate::parents;
    use crate::render::{RecordingRenderer, RenderCall, RenderKind};
    use crate::term::Term;

    fn board() -> (Board, crate::render::RenderLog) {
        let (renderer, log) = RecordingRenderer::new();
        let board = Board::with_renderer(BoardOptions::default().with_id("u"), renderer);
        (board, log)
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let (mut b, log) = board();
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        let q = b.create(ElementType::Point, parents![(1.0, 0.0)], ()).unwrap();
        b.create(ElementType::Circle, parents![a, q], ()).unwrap();
        let calls = log.borrow().len();

        let first = b.update();
        let second = b.update();
        assert!(first.updated.is_empty());
        assert_eq!(first, second);
        assert!(second.rendered.is_empty());
        assert_eq!(log.borrow().len(), calls);
        assert!(b.order().iter().all(|id| !b.element(*id).unwrap().needs_update()));
    }

    #[test]
    fn first_render_draws_then_updates() {
        let (mut b, log) = board();
        let a = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("withlabel", false))
            .unwrap();
        b.move_point(a, (1.0, 1.0));
        let calls: Vec<String> = log.borrow().iter().map(ToString::to_string).collect();
        insta::assert_snapshot!(calls.join("\n"), @r"
        draw_point uP0
        update_point uP0
        ");
    }

    #[test]
    fn fixed_and_computed_points_refuse_to_move() {
        let (mut b, _) = board();
        let fixed = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("fixed", true))
            .unwrap();
        let free = b
            .create(ElementType::Point, parents![(2.0, 0.0)], ("name", "F"))
            .unwrap();
        let follower = b
            .create(ElementType::Point, parents!["X(F) + 1", 0.0], ())
            .unwrap();

        assert!(!b.move_point(fixed, (5.0, 5.0)));
        assert!(!b.move_point(follower, (5.0, 5.0)));
        assert!(!b.move_point(free, (f64::NAN, 0.0)));
        assert!(b.move_point(free, (4.0, 0.0)));
        assert_eq!(b.coords(follower), Some(Coords::new(5.0, 0.0)));
    }

    #[test]
    fn batch_moves_share_one_pass() {
        let (mut b, _) = board();
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        let q = b.create(ElementType::Point, parents![(1.0, 0.0)], ()).unwrap();
        let s = b.create(ElementType::Segment, parents![a, q], ()).unwrap();
        let moved = b.move_points(&[(a, Coords::new(0.0, 1.0)), (q, Coords::new(2.0, 1.0))]);
        assert_eq!(moved, 2);
        let report = b.last_report();
        assert_eq!(report.updated.iter().filter(|id| **id == s).count(), 1);
    }

    #[test]
    fn suspended_passes_run_once_on_resume() {
        let (mut b, _) = board();
        b.suspend_update();
        let a = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("withlabel", false))
            .unwrap();
        assert!(b.last_report().updated.is_empty());
        assert_eq!(b.element(a).unwrap().lifecycle(), Lifecycle::Registered);
        assert!(b.update().skipped);

        let report = b.unsuspend_update();
        assert_eq!(report.updated, vec![a]);
        assert_eq!(b.element(a).unwrap().lifecycle(), Lifecycle::Live);
    }

    #[test]
    fn scoped_update_leaves_other_dirty_elements_alone() {
        let (mut b, _) = board();
        let a = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("withlabel", false))
            .unwrap();
        let other = b
            .create(ElementType::Point, parents![(1.0, 0.0)], ("withlabel", false))
            .unwrap();
        b.mark_dirty(other);
        let report = b.update_from(a);
        assert_eq!(report.updated, vec![a]);
        assert!(b.element(other).unwrap().needs_update());
    }

    #[test]
    fn traces_follow_a_moving_point() {
        let (mut b, log) = board();
        let a = b
            .create(
                ElementType::Point,
                parents![(0.0, 0.0)],
                [("withlabel", false), ("trace", true)],
            )
            .unwrap();
        b.move_point(a, (1.0, 0.0));
        let traces = b.element(a).unwrap().traces().to_vec();
        assert_eq!(traces.len(), 2);
        let frozen: Vec<_> = traces.iter().map(|t| b.coords(*t)).collect();
        assert_eq!(
            frozen,
            vec![Some(Coords::new(0.0, 0.0)), Some(Coords::new(1.0, 0.0))]
        );
        assert!(log.borrow().iter().any(|c| matches!(
            c,
            RenderCall::Draw(RenderKind::Point, key) if key.starts_with("uR")
        )));

        b.clear_trace(a);
        assert!(b.element(a).unwrap().traces().is_empty());
        assert!(traces.iter().all(|t| b.element(*t).is_none()));
    }

    #[test]
    fn opted_out_elements_wait_for_a_full_pass() {
        let (mut b, _) = board();
        let a = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("withlabel", false))
            .unwrap();
        let q = b
            .create(ElementType::Point, parents![(1.0, 0.0)], ("withlabel", false))
            .unwrap();
        let lazy = b
            .create(ElementType::Circle, parents![a, q], ("needsregularupdate", false))
            .unwrap();
        let radius = |b: &Board| b.element(lazy).unwrap().geom().radius();

        b.move_point(q, (2.0, 0.0));
        assert!(!b.last_report().updated.contains(&lazy));
        assert!(!b.element(lazy).unwrap().needs_update());
        assert_eq!(radius(&b), Some(1.0));

        let report = b.full_update();
        assert!(report.updated.contains(&lazy));
        assert_eq!(radius(&b), Some(2.0));

        b.move_point(q, (3.0, 0.0));
        let report = b.update_from(q);
        assert!(report.updated.contains(&lazy));
        assert_eq!(radius(&b), Some(3.0));
    }

    #[test]
    fn a_panicking_callback_fails_only_its_element() {
        let (mut b, _) = board();
        let a = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("withlabel", false))
            .unwrap();
        let q = b
            .create(ElementType::Point, parents![(1.0, 0.0)], ("withlabel", false))
            .unwrap();
        let before = b.create(ElementType::Circle, parents![a, q], ()).unwrap();
        let broken = Term::callback(vec![q], |_| panic!("radius callback broke"));
        let broken = b
            .create(ElementType::Circle, parents![a, broken], ())
            .unwrap();
        let after = b.create(ElementType::Segment, parents![a, q], ()).unwrap();

        let report = b.full_update();
        assert!(!report.skipped);
        for id in [before, broken, after] {
            assert!(report.updated.contains(&id));
        }
        assert!(matches!(
            &report.failed[..],
            [(id, UpdateError::Panicked { message })]
                if *id == broken && message == "radius callback broke"
        ));
        assert!(b.element(before).unwrap().is_real());
        assert!(b.element(after).unwrap().is_real());
        assert!(!b.element(broken).unwrap().is_real());

        // the board is still usable
        assert!(b.move_point(q, (2.0, 0.0)));
        assert!(!b.last_report().skipped);
        assert_eq!(b.radius(before), Some(2.0));
    }

    #[test]
    fn hidden_views_hide_their_members() {
        let (mut b, _) = board();
        let view = b
            .create(ElementType::View, parents![(0.0, 0.0), (4.0, 3.0)], ("name", "panel"))
            .unwrap();
        let img = b
            .create(
                ElementType::Image,
                parents!["logo.png", (1.0, 1.0), (2.0, 1.0)],
                ("view", "panel"),
            )
            .unwrap();
        let shown = |b: &Board| b.element(img).unwrap().vis_prop_calc().visible;
        assert!(shown(&b));

        b.set_attribute(view, ("visible", false));
        assert!(!shown(&b));
        b.set_attribute(view, ("visible", true));
        assert!(shown(&b));
    }
}
