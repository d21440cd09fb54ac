//! Attribute values and user-supplied attribute patches.

use std::fmt;

/// A stored attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// The `"inherit"` visibility sentinel
    Inherit,
    /// Sub-attributes for an owned element such as a label
    Nested(AttrPatch),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_patch(&self) -> Option<&AttrPatch> {
        match self {
            AttrValue::Nested(p) => Some(p),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Number(f64::from(v))
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl From<AttrPatch> for AttrValue {
    fn from(v: AttrPatch) -> Self {
        AttrValue::Nested(v)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Inherit => f.write_str("inherit"),
            AttrValue::Nested(p) => {
                f.write_str("{")?;
                for (i, (k, v)) in p.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// An ordered set of raw `key -> value` updates.
///
/// Keys are kept as the user wrote them; normalization happens when the
/// patch is applied. Patches can be built from `"key:value"` strings,
/// `(key, value)` pairs, arrays of pairs or with the [`AttrPatch::with`]
/// builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrPatch {
    entries: Vec<(String, AttrValue)>,
}

impl AttrPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Parse a single `"key:value"` pair. Strings without a colon yield
    /// an empty patch.
    pub fn parse_pair(s: &str) -> Self {
        match s.split_once(':') {
            Some((key, value)) => AttrPatch::new().with(key.trim(), value.trim()),
            None => AttrPatch::new(),
        }
    }

    /// Entries of `other` are appended and win over earlier ones
    pub fn merge(&mut self, other: &AttrPatch) {
        self.entries.extend(other.entries.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<&str> for AttrPatch {
    fn from(s: &str) -> Self {
        AttrPatch::parse_pair(s)
    }
}

impl From<()> for AttrPatch {
    fn from(_: ()) -> Self {
        AttrPatch::new()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> From<(K, V)> for AttrPatch {
    fn from((key, value): (K, V)) -> Self {
        AttrPatch::new().with(key, value)
    }
}

impl<K: Into<String>, V: Into<AttrValue>, const N: usize> From<[(K, V); N]> for AttrPatch {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> From<Vec<(K, V)>> for AttrPatch {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttrPatch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut patch = AttrPatch::new();
        for (k, v) in iter {
            patch.insert(k, v);
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_equivalent_shapes() {
        let a = AttrPatch::from("strokeColor:#ff0000");
        let b = AttrPatch::from(("strokeColor", "#ff0000"));
        let c = AttrPatch::from([("strokeColor", "#ff0000")]);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn pair_without_colon_is_empty() {
        assert!(AttrPatch::from("nonsense").is_empty());
    }

    #[test]
    fn nested_display() {
        let patch = AttrPatch::new()
            .with("visible", false)
            .with("label", AttrPatch::new().with("strokecolor", "#000"));
        let shown: Vec<String> = patch.iter().map(|(k, v)| format!("{k}={v}")).collect();
        insta::assert_snapshot!(shown.join("; "), @"visible=false; label={strokecolor: #000}");
    }
}
