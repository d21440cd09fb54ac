use glam::DVec2;

use super::{ElementType, Geom, Geometry};
use crate::attr::{AttrKey, Attributes, MAX_DIGITS};
use crate::errors::UpdateError;
use crate::registry::{ArenaView, ElementId};
use crate::render::RenderKind;
use crate::term::Term;
use crate::types::Coords;

/// Where a text (or image) sits
#[derive(Debug, Clone)]
pub enum Placement {
    Fixed(Coords),
    Terms(Term, Term),
    /// Relative to another element's label anchor
    Anchored { anchor: ElementId, offset: DVec2 },
}

impl Placement {
    pub(crate) fn resolve(&self, view: &ArenaView<'_>) -> Result<Coords, UpdateError> {
        Ok(match self {
            Placement::Fixed(c) => *c,
            Placement::Terms(x, y) => Coords::new(x.eval(view), y.eval(view)),
            Placement::Anchored { anchor, offset } => view
                .geom(*anchor)?
                .label_anchor()
                .map_or(Coords::NAN, |a| a.offset(*offset)),
        })
    }

    pub(crate) fn inputs(&self) -> Vec<ElementId> {
        match self {
            Placement::Fixed(_) => Vec::new(),
            Placement::Terms(x, y) => {
                let mut deps = x.deps().to_vec();
                deps.extend(y.deps().iter().filter(|d| !x.deps().contains(*d)));
                deps
            }
            Placement::Anchored { anchor, .. } => vec![*anchor],
        }
    }
}

/// What a text shows
#[derive(Debug, Clone)]
pub enum TextContent {
    Static(String),
    /// A number, formatted with the `digits` and `decimalseparator` attributes
    Value(Term),
    /// The current name of another element (labels)
    AnchorName(ElementId),
}

#[derive(Debug, Clone)]
pub struct TextKind {
    pub content: TextContent,
    pub placement: Placement,
}

impl Geometry for TextKind {
    fn element_type(&self) -> ElementType {
        ElementType::Text
    }

    fn inputs(&self) -> Vec<ElementId> {
        let mut inputs = self.placement.inputs();
        let extra: &[ElementId] = match &self.content {
            TextContent::Static(_) => &[],
            TextContent::Value(term) => term.deps(),
            TextContent::AnchorName(id) => std::slice::from_ref(id),
        };
        for id in extra {
            if !inputs.contains(id) {
                inputs.push(*id);
            }
        }
        inputs
    }

    fn compute(&self, view: &ArenaView<'_>, attrs: &Attributes) -> Result<Geom, UpdateError> {
        let position = self.placement.resolve(view)?;
        let content = match &self.content {
            TextContent::Static(s) => s.clone(),
            TextContent::Value(term) => {
                let digits = attrs.get_f64(&AttrKey::Digits).unwrap_or(2.0) as usize;
                let separator = attrs.get_str(&AttrKey::DecimalSeparator).unwrap_or(".");
                format_number(term.eval(view), digits, separator)
            }
            TextContent::AnchorName(id) => view.name(*id)?.to_string(),
        };
        Ok(Geom::Text { position, content })
    }

    fn render_kind(&self) -> RenderKind {
        RenderKind::Text
    }
}

/// Fixed-precision formatting with a locale decimal separator
pub fn format_number(value: f64, digits: usize, decimal_separator: &str) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.min(MAX_DIGITS);
    let formatted = format!("{value:.digits$}");
    if decimal_separator == "." {
        formatted
    } else {
        formatted.replacen('.', decimal_separator, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_with_locale_separator() {
        assert_eq!(format_number(3.14159, 2, "."), "3.14");
        assert_eq!(format_number(3.14159, 3, ","), "3,142");
        assert_eq!(format_number(2.0, 0, ","), "2");
        assert_eq!(format_number(f64::NAN, 2, ","), "NaN");
    }

    #[test]
    fn precision_is_capped() {
        assert_eq!(format_number(1.5, usize::MAX, ".").len(), 2 + MAX_DIGITS);
    }
}
