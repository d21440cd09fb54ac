//! Dependency Graph: parent/child edges plus eagerly maintained
//! ancestor/descendant closures.
//!
//! Every operation here is best-effort bookkeeping. Unknown ids, self edges
//! and duplicate edges are ignored, and an edge that would close a cycle is
//! refused with a warning instead of an error.

use std::collections::BTreeSet;

use slotmap::SecondaryMap;

use crate::log::{debug, warn};
use crate::registry::ElementId;

/// Edges and closures of one element
#[derive(Debug, Clone, Default)]
pub struct Links {
    /// Direct parents in declaration order, deduplicated
    pub parents: Vec<ElementId>,
    pub children: BTreeSet<ElementId>,
    pub descendants: BTreeSet<ElementId>,
    pub ancestors: BTreeSet<ElementId>,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    links: SecondaryMap<ElementId, Links>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ElementId) {
        if !self.links.contains_key(id) {
            self.links.insert(id, Links::default());
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.links.contains_key(id)
    }

    pub fn links(&self, id: ElementId) -> Option<&Links> {
        self.links.get(id)
    }

    pub fn parents(&self, id: ElementId) -> &[ElementId] {
        self.links.get(id).map_or(&[], |l| l.parents.as_slice())
    }

    pub fn children(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.links.get(id).into_iter().flat_map(|l| l.children.iter().copied())
    }

    pub fn descendants(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.links.get(id).into_iter().flat_map(|l| l.descendants.iter().copied())
    }

    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.links.get(id).into_iter().flat_map(|l| l.ancestors.iter().copied())
    }

    pub fn has_descendant(&self, id: ElementId, other: ElementId) -> bool {
        self.links.get(id).is_some_and(|l| l.descendants.contains(&other))
    }

    pub fn has_ancestor(&self, id: ElementId, other: ElementId) -> bool {
        self.links.get(id).is_some_and(|l| l.ancestors.contains(&other))
    }

    /// Register `child` under `parent` and extend both closures.
    ///
    /// Returns whether a new edge was added.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.links[parent].children.contains(&child) {
            return false;
        }
        if self.links[parent].ancestors.contains(&child) {
            warn!(?parent, ?child, "refusing edge that would create a cycle");
            return false;
        }

        self.links[parent].children.insert(child);
        if !self.links[child].parents.contains(&parent) {
            self.links[child].parents.push(parent);
        }

        let mut down = self.links[child].descendants.clone();
        down.insert(child);
        let mut up = self.links[parent].ancestors.clone();
        up.insert(parent);

        for &a in &up {
            self.links[a].descendants.extend(down.iter().copied());
        }
        for &d in &down {
            self.links[d].ancestors.extend(up.iter().copied());
        }
        true
    }

    /// Remove the edge `parent -> child` and repair the closures of
    /// everything above `parent` and below `child`.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        let removed = match self.links.get_mut(parent) {
            Some(l) => l.children.remove(&child),
            None => false,
        };
        if !removed {
            return false;
        }
        if let Some(l) = self.links.get_mut(child) {
            l.parents.retain(|p| *p != parent);
        }

        let mut up: BTreeSet<ElementId> = self.links[parent].ancestors.clone();
        up.insert(parent);
        let mut down: BTreeSet<ElementId> = self
            .links
            .get(child)
            .map(|l| l.descendants.clone())
            .unwrap_or_default();
        down.insert(child);

        for &a in &up {
            let fresh = self.reachable(a);
            self.links[a].descendants = fresh;
        }
        for &d in &down {
            let Some(links) = self.links.get(d) else {
                continue;
            };
            let stale: Vec<ElementId> = links
                .ancestors
                .iter()
                .copied()
                .filter(|a| up.contains(a) && !self.has_descendant(*a, d))
                .collect();
            for a in stale {
                self.links[d].ancestors.remove(&a);
            }
        }
        debug!(?parent, ?child, "removed edge");
        true
    }

    /// Append parents to `id`, wiring each as a dependency edge.
    ///
    /// Self references, duplicates and cycle-closing parents are skipped.
    /// Returns the number of parents that were added.
    pub fn add_parents(&mut self, id: ElementId, parents: &[ElementId]) -> usize {
        parents.iter().filter(|&&p| self.add_child(p, id)).count()
    }

    /// Drop an element and every edge touching it.
    ///
    /// Returns its former children.
    pub fn remove(&mut self, id: ElementId) -> Vec<ElementId> {
        let Some(links) = self.links.get(id) else {
            return Vec::new();
        };
        let parents = links.parents.clone();
        let children: Vec<ElementId> = links.children.iter().copied().collect();
        for &c in &children {
            self.remove_child(id, c);
        }
        for p in parents {
            self.remove_child(p, id);
        }
        self.links.remove(id);
        children
    }

    fn reachable(&self, from: ElementId) -> BTreeSet<ElementId> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<ElementId> = self.children(from).collect();
        while let Some(next) = stack.pop() {
            if seen.insert(next) {
                stack.extend(self.children(next));
            }
        }
        seen
    }

    /// Check the closure invariant over the whole graph
    pub fn is_consistent(&self) -> bool {
        self.links.iter().all(|(id, l)| {
            l.descendants == self.reachable(id)
                && l.descendants.iter().all(|d| self.has_ancestor(*d, id))
                && l.ancestors.iter().all(|a| self.has_descendant(*a, id))
        })
    }
}
