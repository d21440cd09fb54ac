//! Element removal.
//!
//! Removing an element takes its owned sub-elements with it (label, border
//! segments, owned vertices, traces). Dependents stay registered and degrade
//! to not-real on the next pass.

use super::Board;
use super::events::BoardEvent;
use crate::element::{Element, Lifecycle};
use crate::log::debug;
use crate::registry::ElementId;

impl Board {
    /// Remove an element and everything it owns, then run a pass.
    ///
    /// Returns the removed records, the requested element first.
    pub fn remove_object(&mut self, id: ElementId) -> Vec<Element> {
        if !self.registry.contains(id) {
            return Vec::new();
        }
        let doomed = self.owned_closure(&[id]);
        let removed = self.detach(doomed);
        self.update();
        removed
    }

    /// Remove an element together with all of its ancestors
    pub fn remove_ancestors(&mut self, id: ElementId) -> Vec<Element> {
        if !self.registry.contains(id) {
            return Vec::new();
        }
        let mut roots = vec![id];
        roots.extend(self.graph.ancestors(id));
        let doomed = self.owned_closure(&roots);
        let removed = self.detach(doomed);
        self.update();
        removed
    }

    /// Remove every trace of `id`
    pub fn clear_trace(&mut self, id: ElementId) -> usize {
        let traces = match self.registry.get(id) {
            Some(el) => el.traces.clone(),
            None => return 0,
        };
        let removed = self.detach(traces);
        if !removed.is_empty() && !self.in_update {
            self.update();
        }
        removed.len()
    }

    /// `roots` plus everything they own, transitively
    fn owned_closure(&self, roots: &[ElementId]) -> Vec<ElementId> {
        let mut doomed = roots.to_vec();
        let mut i = 0;
        while let Some(&current) = doomed.get(i) {
            i += 1;
            let owned: Vec<ElementId> = self
                .registry
                .elements
                .iter()
                .filter(|(_, el)| el.owner == Some(current))
                .map(|(id, _)| id)
                .filter(|id| !doomed.contains(id))
                .collect();
            doomed.extend(owned);
        }
        doomed
    }

    /// Unregister `doomed` without running a pass
    fn detach(&mut self, doomed: Vec<ElementId>) -> Vec<Element> {
        let mut removed = Vec::with_capacity(doomed.len());
        let mut orphans = Vec::new();

        for &id in &doomed {
            if let Some(el) = self.registry.get(id) {
                if el.drawn {
                    self.renderer.remove(&el.key);
                }
            }
            orphans.extend(self.graph.remove(id));
            let Some(mut el) = self.registry.remove(id) else {
                continue;
            };
            el.lifecycle = Lifecycle::Removed;
            debug!(?id, key = %el.key, "removed element");
            self.events.emit(BoardEvent::Removed {
                element: id,
                key: el.key.clone(),
            });
            removed.push(el);
        }

        for el in self.registry.elements.values_mut() {
            for &id in &doomed {
                el.forget(id);
            }
        }
        self.animations.retain(|a| !doomed.contains(&a.element));
        for orphan in orphans {
            if self.registry.contains(orphan) {
                self.mark_dirty(orphan);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::options::BoardOptions;
    use crate::parents;
    use crate::render::{RecordingRenderer, RenderCall};

    #[test]
    fn removal_takes_owned_elements_along() {
        let (renderer, log) = RecordingRenderer::new();
        let mut b = Board::with_renderer(BoardOptions::default().with_id("r"), renderer);
        let a = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("name", "A"))
            .unwrap();
        let label = b.element(a).and_then(Element::label).unwrap();

        let removed = b.remove_object(a);
        let keys: Vec<&str> = removed.iter().map(Element::key).collect();
        assert_eq!(keys, vec!["rP0", "rP0Label"]);
        assert!(removed.iter().all(|el| el.lifecycle() == Lifecycle::Removed));
        assert!(b.element(label).is_none());
        assert!(b.is_empty());
        assert!(log.borrow().contains(&RenderCall::Remove("rP0Label".into())));
    }

    #[test]
    fn dependents_survive_as_not_real() {
        let mut b = Board::new(BoardOptions::default().with_id("r"));
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        let q = b.create(ElementType::Point, parents![(1.0, 0.0)], ()).unwrap();
        let c = b.create(ElementType::Circle, parents![a, q], ()).unwrap();

        b.remove_object(q);
        let circle = b.element(c).unwrap();
        assert!(!circle.is_real());
        assert!(b.parents(c).iter().all(|p| *p == a));
        assert!(b.graph().is_consistent());
        assert!(b.last_report().failed.iter().any(|(id, _)| *id == c));
    }

    #[test]
    fn remove_ancestors_clears_the_chain() {
        let mut b = Board::new(BoardOptions::default().with_id("r"));
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        let q = b.create(ElementType::Point, parents![(1.0, 0.0)], ()).unwrap();
        let s = b.create(ElementType::Segment, parents![a, q], ()).unwrap();
        let other = b.create(ElementType::Point, parents![(5.0, 5.0)], ()).unwrap();

        b.remove_ancestors(s);
        assert!(b.element(a).is_none());
        assert!(b.element(q).is_none());
        assert!(b.element(s).is_none());
        assert!(b.element(other).is_some());
        assert!(b.graph().is_consistent());
    }
}
