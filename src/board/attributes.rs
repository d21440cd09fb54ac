//! Attribute mutation and reads.
//!
//! Every patch goes through [`normalize`] and [`validate`]. A few keys have
//! handlers beyond storage: they rename, re-cascade visibility, manage the
//! label or talk to the renderer.

use super::Board;
use super::events::BoardEvent;
use crate::attr::{AttrKey, AttrPatch, AttrValue, Attributes, normalize, validate};
use crate::element::{ElementKind, Visibility};
use crate::log::debug;
use crate::registry::ElementId;
use crate::render::Buffering;

impl Board {
    /// Apply a patch to an element, then run an update: a board-wide pass
    /// for regularly updated elements, a pass over the element's
    /// descendants otherwise.
    ///
    /// Returns whether anything was stored.
    pub fn set_attribute(&mut self, id: ElementId, patch: impl Into<AttrPatch>) -> bool {
        let changed = self.apply_patch(id, &patch.into());
        if changed.is_empty() {
            return false;
        }
        let regular = self
            .registry
            .get(id)
            .is_some_and(|el| el.needs_regular_update);
        if regular {
            self.mark_dirty(id);
            self.update();
        } else {
            self.update_from(id);
        }
        true
    }

    /// Read an attribute with the same key normalization as writes.
    /// Shortcut keys read their first target.
    pub fn get_attribute(&self, id: ElementId, key: &str) -> Option<AttrValue> {
        let key = AttrKey::parse(key);
        let key = match key.shortcut_targets() {
            Some([first, ..]) => first.clone(),
            _ => key,
        };
        self.read_attribute(id, &key)
    }

    /// Snapshot of the stored attribute map
    pub fn attributes(&self, id: ElementId) -> Option<Attributes> {
        self.registry.get(id).map(|el| el.attrs.clone())
    }

    pub(crate) fn read_attribute(&self, id: ElementId, key: &AttrKey) -> Option<AttrValue> {
        let el = self.registry.get(id)?;
        let label = el.label.and_then(|l| self.registry.get(l));
        match key {
            AttrKey::WithLabel => Some(AttrValue::Bool(
                label.is_some_and(|l| l.visible != Visibility::Hidden),
            )),
            AttrKey::NeedsRegularUpdate => Some(AttrValue::Bool(el.needs_regular_update)),
            AttrKey::LabelColor => label
                .and_then(|l| l.attrs.get(&AttrKey::StrokeColor))
                .or_else(|| el.attrs.get(key))
                .cloned(),
            AttrKey::Name => Some(AttrValue::Text(el.name.clone())),
            AttrKey::Id => Some(AttrValue::Text(el.key.clone())),
            AttrKey::Visible => Some(el.visible.to_value()),
            _ => el.attrs.get(key).cloned(),
        }
    }

    /// Store a patch without running a pass. Returns the keys that changed.
    pub(crate) fn apply_patch(&mut self, id: ElementId, patch: &AttrPatch) -> Vec<String> {
        if !self.registry.contains(id) {
            return Vec::new();
        }
        let mut changed = Vec::new();
        for (key, value) in normalize(patch) {
            if !validate(&key, &value) {
                continue;
            }
            let old = self.read_attribute(id, &key);
            if !self.apply_attribute(id, &key, value.clone()) {
                continue;
            }
            self.events.emit(BoardEvent::AttributeChanged {
                element: id,
                key: key.as_str().to_string(),
                old,
                new: value,
            });
            changed.push(key.as_str().to_string());
        }
        if !changed.is_empty() {
            self.events.emit(BoardEvent::Attribute {
                element: id,
                keys: changed.clone(),
            });
        }
        changed
    }

    fn store(&mut self, id: ElementId, key: &AttrKey, value: AttrValue) {
        if let Some(el) = self.registry.get_mut(id) {
            el.attrs.insert(key.clone(), value);
        }
    }

    fn apply_attribute(&mut self, id: ElementId, key: &AttrKey, value: AttrValue) -> bool {
        match key {
            AttrKey::Id => {
                debug!(?id, "element ids cannot change");
                return false;
            }
            AttrKey::Name => {
                let name = value.to_string();
                if !self.registry.rename(id, &name) {
                    debug!(?id, name = %name, "name already taken");
                    return false;
                }
                self.mark_dirty(id);
            }
            AttrKey::Visible => {
                let Some(visibility) = Visibility::from_value(&value) else {
                    return false;
                };
                if let Some(el) = self.registry.get_mut(id) {
                    el.visible = visibility;
                }
                let visited = self.cascade_from(id);
                self.sync_display(&visited);
            }
            AttrKey::NeedsRegularUpdate => {
                let regular = value.as_bool().unwrap_or(true);
                if let Some(el) = self.registry.get_mut(id) {
                    el.needs_regular_update = regular;
                    let mode = if regular {
                        Buffering::Auto
                    } else {
                        Buffering::Static
                    };
                    self.renderer.set_buffering(el, mode);
                }
            }
            AttrKey::WithLabel => {
                let on = value.as_bool().unwrap_or(false);
                let label = self.registry.get(id).and_then(|el| el.label);
                match (on, label) {
                    (true, None) => {
                        if let Some(label) = self.create_label(id) {
                            self.mark_dirty(label);
                        }
                    }
                    (on, Some(label)) => {
                        let visible = if on {
                            Visibility::Inherit
                        } else {
                            Visibility::Hidden
                        };
                        self.apply_patch(label, &AttrPatch::new().with("visible", visible.to_value()));
                    }
                    (false, None) => {}
                }
            }
            AttrKey::Label => {
                let label = self.registry.get(id).and_then(|el| el.label);
                if let (Some(nested), Some(label)) = (value.as_patch(), label) {
                    self.apply_patch(label, nested);
                }
            }
            AttrKey::Borders => {
                let borders = match self.registry.get(id).map(|el| &el.kind) {
                    Some(ElementKind::Polygon(polygon)) => polygon.borders.clone(),
                    _ => Vec::new(),
                };
                if let Some(nested) = value.as_patch() {
                    for border in borders {
                        self.apply_patch(border, nested);
                    }
                }
            }
            AttrKey::LabelColor => {
                if let Some(label) = self.registry.get(id).and_then(|el| el.label) {
                    self.apply_patch(label, &AttrPatch::new().with("strokecolor", value.clone()));
                }
            }
            AttrKey::Trace => {
                if value.as_bool() == Some(false) {
                    self.store(id, key, value);
                    self.clear_trace(id);
                    return true;
                }
            }
            AttrKey::Gradient | AttrKey::GradientSecondColor | AttrKey::GradientSecondOpacity => {
                self.store(id, key, value);
                if let Some(el) = self.registry.get(id) {
                    self.renderer.set_gradient(el);
                }
                return true;
            }
            AttrKey::Layer => {
                let layer = value.as_f64().unwrap_or(0.0) as u32;
                self.store(id, key, value);
                if let Some(el) = self.registry.get(id) {
                    self.renderer.set_layer(el, layer);
                }
                return true;
            }
            AttrKey::StraightFirst | AttrKey::StraightLast => {
                self.mark_dirty(id);
            }
            _ => {}
        }
        self.store(id, key, value);
        true
    }
}
