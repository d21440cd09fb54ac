//! Identity & Registry: element storage, string ids, names and the
//! insertion-ordered element list that doubles as update order.

use std::collections::HashMap;

use slotmap::{SlotMap, new_key_type};

use crate::element::{Element, ElementClass, ElementType, Geom};
use crate::errors::UpdateError;
use crate::term::{Lookup, Resolver};
use crate::types::Coords;

new_key_type! {
    /// Generation-checked handle to an element. A handle to a removed
    /// element never resolves again, even if its slot is reused.
    pub struct ElementId;
}

/// Longest generated base name (`AAA`)
const MAX_NAME_LENGTH: usize = 3;

#[derive(Debug, Clone)]
pub struct Registry {
    board_id: String,
    pub(crate) elements: SlotMap<ElementId, Element>,
    /// Insertion order; parents always precede their children
    order: Vec<ElementId>,
    by_key: HashMap<String, ElementId>,
    by_name: HashMap<String, ElementId>,
    num_objects: usize,
}

impl Registry {
    pub fn new(board_id: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            elements: SlotMap::with_key(),
            order: Vec::new(),
            by_key: HashMap::new(),
            by_name: HashMap::new(),
            num_objects: 0,
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    /// Allocate a slot and register the element built by `build`.
    ///
    /// `build` receives the new handle and a fresh string id.
    pub(crate) fn insert_with(
        &mut self,
        ty: ElementType,
        build: impl FnOnce(ElementId, String) -> Element,
    ) -> ElementId {
        let key = self.next_key(ty);
        self.insert_keyed(key, build)
    }

    /// Like [`Registry::insert_with`] with a caller-chosen string id
    pub(crate) fn insert_keyed(
        &mut self,
        key: String,
        build: impl FnOnce(ElementId, String) -> Element,
    ) -> ElementId {
        let id = self.elements.insert_with_key(|id| build(id, key.clone()));
        self.by_key.insert(key, id);
        if let Some(el) = self.elements.get(id) {
            if !el.name.is_empty() {
                self.by_name.insert(el.name.clone(), id);
            }
        }
        self.order.push(id);
        id
    }

    pub(crate) fn remove(&mut self, id: ElementId) -> Option<Element> {
        let el = self.elements.remove(id)?;
        self.by_key.remove(&el.key);
        if self.by_name.get(&el.name) == Some(&id) {
            self.by_name.remove(&el.name);
        }
        self.order.retain(|o| *o != id);
        Some(el)
    }

    fn next_key(&mut self, ty: ElementType) -> String {
        loop {
            let key = format!("{}{}{}", self.board_id, ty.code(), self.num_objects);
            self.num_objects += 1;
            if !self.by_key.contains_key(&key) {
                return key;
            }
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Elements in insertion (= update) order
    pub fn order(&self) -> &[ElementId] {
        &self.order
    }

    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.order.iter().position(|o| *o == id)
    }

    /// Move `moved` (kept in relative order) right behind `after`
    pub(crate) fn reorder_after(&mut self, after: ElementId, moved: &[ElementId]) {
        self.order.retain(|o| !moved.contains(o));
        let at = self.position(after).map_or(self.order.len(), |p| p + 1);
        let tail = self.order.split_off(at);
        self.order.extend_from_slice(moved);
        self.order.extend(tail);
    }

    /// Look up by string id first, then by name
    pub fn select(&self, id_or_name: &str) -> Option<ElementId> {
        self.by_key
            .get(id_or_name)
            .or_else(|| self.by_name.get(id_or_name))
            .copied()
    }

    pub fn by_name(&self, name: &str) -> Option<ElementId> {
        self.by_name.get(name).copied()
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Re-index an element under a new name. Fails if another element
    /// already owns the name.
    pub(crate) fn rename(&mut self, id: ElementId, name: &str) -> bool {
        if self.by_name.get(name).is_some_and(|owner| *owner != id) {
            return false;
        }
        let Some(el) = self.elements.get_mut(id) else {
            return false;
        };
        if self.by_name.get(&el.name) == Some(&id) {
            self.by_name.remove(&el.name);
        }
        el.name = name.to_string();
        if !name.is_empty() {
            self.by_name.insert(name.to_string(), id);
        }
        true
    }

    /// First free name for an element of type `ty`: capitals for points,
    /// lowercase letters for lines, and prefixed lowercase names for the rest.
    pub fn generate_name(&self, ty: ElementType) -> String {
        let (letters, pre, post) = match (ty.class(), ty) {
            (ElementClass::Point, _) => (b'A'..=b'Z', "", ""),
            (ElementClass::Line, _) => (b'a'..=b'z', "", ""),
            (_, ElementType::Polygon) => (b'a'..=b'z', "P_{", "}"),
            (_, ElementType::Circle) => (b'a'..=b'z', "k_{", "}"),
            (_, ElementType::Text) => (b'a'..=b'z', "t_{", "}"),
            _ => (b'a'..=b'z', "s_{", "}"),
        };
        let alphabet: Vec<char> = letters.map(char::from).collect();

        for len in 1..=MAX_NAME_LENGTH {
            let mut indices = vec![0usize; len];
            'names: loop {
                let base: String = indices.iter().map(|&i| alphabet[i]).collect();
                let name = format!("{pre}{base}{post}");
                if !self.name_taken(&name) {
                    return name;
                }
                // odometer, last letter turns fastest
                for pos in (0..len).rev() {
                    indices[pos] += 1;
                    if indices[pos] < alphabet.len() {
                        continue 'names;
                    }
                    indices[pos] = 0;
                }
                break;
            }
        }
        format!("{pre}{}{post}", self.num_objects)
    }

    /// Read-only view used while computing element geometry
    pub fn view(&self) -> ArenaView<'_> {
        ArenaView { registry: self }
    }
}

impl Resolver for Registry {
    fn resolve(&self, name: &str) -> Option<ElementId> {
        self.select(name)
    }
}

// ============================================================================
// Arena view
// ============================================================================

/// Borrowed access to every element's last computed geometry
#[derive(Clone, Copy)]
pub struct ArenaView<'a> {
    registry: &'a Registry,
}

impl<'a> ArenaView<'a> {
    pub fn element(&self, id: ElementId) -> Result<&'a Element, UpdateError> {
        self.registry
            .elements
            .get(id)
            .ok_or(UpdateError::MissingParent { parent: id })
    }

    pub fn geom(&self, id: ElementId) -> Result<&'a Geom, UpdateError> {
        self.element(id).map(|el| &el.geom)
    }

    pub fn is_real(&self, id: ElementId) -> bool {
        self.registry.get(id).is_some_and(|el| el.is_real)
    }

    pub fn name(&self, id: ElementId) -> Result<&'a str, UpdateError> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn point(&self, id: ElementId) -> Result<Coords, UpdateError> {
        match self.geom(id)? {
            Geom::Point(p) => Ok(*p),
            // not computed yet; the element is not real either
            Geom::Empty => Ok(Coords::NAN),
            _ => Err(UpdateError::ParentType {
                parent: id,
                expected: "a point",
            }),
        }
    }

    pub fn segment(&self, id: ElementId) -> Result<(Coords, Coords), UpdateError> {
        match self.geom(id)? {
            Geom::Line { p1, p2, .. } => Ok((*p1, *p2)),
            Geom::Empty => Ok((Coords::NAN, Coords::NAN)),
            _ => Err(UpdateError::ParentType {
                parent: id,
                expected: "a line",
            }),
        }
    }

    pub fn circle(&self, id: ElementId) -> Result<(Coords, f64), UpdateError> {
        match self.geom(id)? {
            Geom::Circle { center, radius } => Ok((*center, *radius)),
            Geom::Empty => Ok((Coords::NAN, f64::NAN)),
            _ => Err(UpdateError::ParentType {
                parent: id,
                expected: "a circle",
            }),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<ElementId> {
        self.registry.select(name)
    }
}

impl Lookup for ArenaView<'_> {
    fn coords(&self, id: ElementId) -> Option<Coords> {
        match self.geom(id).ok()? {
            Geom::Point(p) => Some(*p),
            _ => None,
        }
    }

    fn radius(&self, id: ElementId) -> Option<f64> {
        self.geom(id).ok()?.radius()
    }

    fn length(&self, id: ElementId) -> Option<f64> {
        match self.geom(id).ok()? {
            Geom::Line { p1, p2, .. } => Some(p1.distance(*p2)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, PointKind};

    fn point(reg: &mut Registry, name: &str) -> ElementId {
        let name = name.to_string();
        reg.insert_with(ElementType::Point, |id, key| {
            Element::new(id, key, name, ElementKind::Point(PointKind::Free(Coords::ORIGIN)))
        })
    }

    #[test]
    fn keys_embed_board_and_type() {
        let mut reg = Registry::new("b1");
        let a = point(&mut reg, "A");
        let b = point(&mut reg, "B");
        assert_eq!(reg.get(a).map(Element::key), Some("b1P0"));
        assert_eq!(reg.get(b).map(Element::key), Some("b1P1"));
    }

    #[test]
    fn select_by_key_then_name() {
        let mut reg = Registry::new("b1");
        let a = point(&mut reg, "A");
        assert_eq!(reg.select("b1P0"), Some(a));
        assert_eq!(reg.select("A"), Some(a));
        assert_eq!(reg.select("Z"), None);
    }

    #[test]
    fn removed_handles_do_not_resolve() {
        let mut reg = Registry::new("b1");
        let a = point(&mut reg, "A");
        assert!(reg.remove(a).is_some());
        assert!(reg.get(a).is_none());
        assert_eq!(reg.select("A"), None);
        let b = point(&mut reg, "B");
        assert_ne!(a, b);
        assert!(reg.get(a).is_none());
    }

    #[test]
    fn rename_reindexes() {
        let mut reg = Registry::new("b1");
        let a = point(&mut reg, "A");
        let b = point(&mut reg, "B");
        assert!(!reg.rename(b, "A"));
        assert!(reg.rename(a, "Q"));
        assert_eq!(reg.select("Q"), Some(a));
        assert_eq!(reg.select("A"), None);
        assert!(reg.rename(b, "A"));
    }

    #[test]
    fn generated_names() {
        let mut reg = Registry::new("b1");
        assert_eq!(reg.generate_name(ElementType::Point), "A");
        for n in ["A", "B"] {
            point(&mut reg, n);
        }
        assert_eq!(reg.generate_name(ElementType::Point), "C");
        assert_eq!(reg.generate_name(ElementType::Segment), "a");
        assert_eq!(reg.generate_name(ElementType::Circle), "k_{a}");
        assert_eq!(reg.generate_name(ElementType::Polygon), "P_{a}");
        assert_eq!(reg.generate_name(ElementType::Image), "s_{a}");
    }

    #[test]
    fn generated_names_roll_over_to_two_letters() {
        let mut reg = Registry::new("b1");
        for c in b'A'..=b'Z' {
            point(&mut reg, &char::from(c).to_string());
        }
        assert_eq!(reg.generate_name(ElementType::Point), "AA");
        point(&mut reg, "AA");
        assert_eq!(reg.generate_name(ElementType::Point), "AB");
    }

    #[test]
    fn reorder_keeps_relative_order() {
        let mut reg = Registry::new("b1");
        let ids: Vec<_> = ["A", "B", "C", "D"].iter().map(|n| point(&mut reg, n)).collect();
        reg.reorder_after(ids[3], &[ids[0], ids[1]]);
        assert_eq!(reg.order(), &[ids[2], ids[3], ids[0], ids[1]]);
    }
}
