//! Attribute Store: per-element configuration with key normalization,
//! shortcut expansion, alpha splitting and value validation.

mod color;
mod key;
mod value;

use std::collections::{BTreeMap, HashSet};

use crate::log::debug;

pub use color::{Rgb, split_alpha};
pub use key::{AttrKey, MAX_DIGITS, SHORTCUTS, ValueKind};
pub use value::{AttrPatch, AttrValue};

/// The canonical attribute map of one element ("visProp")
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    map: BTreeMap<AttrKey, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &AttrKey) -> Option<&AttrValue> {
        self.map.get(key)
    }

    pub fn get_bool(&self, key: &AttrKey) -> Option<bool> {
        self.get(key).and_then(AttrValue::as_bool)
    }

    pub fn get_f64(&self, key: &AttrKey) -> Option<f64> {
        self.get(key).and_then(AttrValue::as_f64)
    }

    pub fn get_str(&self, key: &AttrKey) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    /// Store a value, returning the previous one. Nested patches merge
    /// into an existing nested value instead of replacing it.
    pub fn insert(&mut self, key: AttrKey, value: AttrValue) -> Option<AttrValue> {
        let old = self.map.get(&key).cloned();
        if let (Some(AttrValue::Nested(existing)), AttrValue::Nested(patch)) =
            (self.map.get_mut(&key), &value)
        {
            existing.merge(patch);
            return old;
        }
        self.map.insert(key, value);
        old
    }

    pub fn remove(&mut self, key: &AttrKey) -> Option<AttrValue> {
        self.map.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttrKey, &AttrValue)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Turn a raw patch into canonical `(key, value)` updates.
///
/// Shortcut keys fan out to their targets unless a target was given
/// explicitly in the same patch, `#rrggbbaa` colors split into color and
/// opacity, and string values are coerced to the key's value kind.
/// Validation happens separately in [`validate`].
pub fn normalize(patch: &AttrPatch) -> Vec<(AttrKey, AttrValue)> {
    let parsed: Vec<(AttrKey, AttrValue)> = patch
        .iter()
        .map(|(k, v)| (AttrKey::parse(k), v.clone()))
        .collect();

    let explicit: HashSet<&AttrKey> = parsed
        .iter()
        .map(|(k, _)| k)
        .filter(|k| k.shortcut_targets().is_none())
        .collect();

    let mut expanded = Vec::with_capacity(parsed.len());
    for (key, value) in &parsed {
        match key.shortcut_targets() {
            Some(targets) => {
                for target in targets {
                    if target == key || !explicit.contains(target) {
                        expanded.push((target.clone(), value.clone()));
                    }
                }
            }
            None => expanded.push((key.clone(), value.clone())),
        }
    }

    let mut out = Vec::with_capacity(expanded.len());
    for (key, value) in expanded {
        let value = coerce(&key, value);
        if let (AttrValue::Text(color), Some(partner)) = (&value, key.opacity_partner()) {
            let (rgb, alpha) = split_alpha(color);
            out.push((key, AttrValue::Text(rgb)));
            if let Some(alpha) = alpha {
                if !explicit.contains(&partner) {
                    out.push((partner, AttrValue::Number(alpha)));
                }
            }
            continue;
        }
        out.push((key, value));
    }
    out
}

/// Convert string values into the kind a key expects, e.g. `"false"` into
/// a boolean or `"3"` into a number.
pub fn coerce(key: &AttrKey, value: AttrValue) -> AttrValue {
    let trimmed = match &value {
        AttrValue::Text(text) => text.trim().to_owned(),
        _ => return value,
    };
    match key.kind() {
        ValueKind::Visibility if trimmed.eq_ignore_ascii_case("inherit") => AttrValue::Inherit,
        ValueKind::Bool | ValueKind::Visibility | ValueKind::Any => match trimmed.as_str() {
            "true" => AttrValue::Bool(true),
            "false" => AttrValue::Bool(false),
            _ => value,
        },
        ValueKind::Number
        | ValueKind::Unit
        | ValueKind::NonNegative
        | ValueKind::Count
        | ValueKind::Digits => {
            trimmed.parse::<f64>().map(AttrValue::Number).unwrap_or(value)
        }
        _ => value,
    }
}

/// Whether `value` is acceptable for `key`. Rejected values are dropped
/// without error.
pub fn validate(key: &AttrKey, value: &AttrValue) -> bool {
    let ok = match (key.kind(), value) {
        (ValueKind::Any, _) => true,
        (ValueKind::Bool, AttrValue::Bool(_)) => true,
        (ValueKind::Number, AttrValue::Number(n)) => n.is_finite(),
        (ValueKind::Unit, AttrValue::Number(n)) => (0.0..=1.0).contains(n),
        (ValueKind::NonNegative, AttrValue::Number(n)) => n.is_finite() && *n >= 0.0,
        (ValueKind::Count, AttrValue::Number(n)) => n.is_finite() && *n >= 0.0 && n.fract() == 0.0,
        (ValueKind::Digits, AttrValue::Number(n)) => {
            (0.0..=MAX_DIGITS as f64).contains(n) && n.fract() == 0.0
        }
        (ValueKind::Color | ValueKind::Text, AttrValue::Text(_)) => true,
        (ValueKind::Visibility, AttrValue::Bool(_) | AttrValue::Inherit) => true,
        (ValueKind::Nested, AttrValue::Nested(_)) => true,
        _ => false,
    };
    if !ok {
        debug!(key = %key, value = %value, "rejected attribute value");
    }
    ok
}
