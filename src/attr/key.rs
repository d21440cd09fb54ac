//! Canonical attribute keys.
//!
//! User-facing keys are case-insensitive and may contain stray whitespace;
//! [`AttrKey::parse`] folds them into a closed set of recognized keys with an
//! [`AttrKey::Other`] escape hatch for renderer-specific passthrough values.

use std::fmt;

/// Largest fraction digit count a formatted number may ask for
pub const MAX_DIGITS: usize = 100;

/// What kind of value a key accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    /// Any finite number
    Number,
    /// Number in [0, 1]
    Unit,
    /// Number >= 0
    NonNegative,
    /// Integer >= 0
    Count,
    /// Integer in [0, MAX_DIGITS]
    Digits,
    Color,
    Text,
    /// true, false or inherit
    Visibility,
    /// Nested attribute patch for a sub-element
    Nested,
    Any,
}

macro_rules! attr_keys {
    ($($variant:ident => $name:literal : $kind:ident),* $(,)?) => {
        /// A recognized attribute key
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum AttrKey {
            $($variant,)*
            /// Unrecognized key, stored verbatim (normalized)
            Other(String),
        }

        impl AttrKey {
            /// Normalize a user key: strip whitespace, lowercase, match.
            pub fn parse(raw: &str) -> AttrKey {
                let norm: String = raw
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .flat_map(char::to_lowercase)
                    .collect();
                match norm.as_str() {
                    $($name => AttrKey::$variant,)*
                    _ => AttrKey::Other(norm),
                }
            }

            /// Canonical lowercase spelling
            pub fn as_str(&self) -> &str {
                match self {
                    $(AttrKey::$variant => $name,)*
                    AttrKey::Other(s) => s,
                }
            }

            pub fn kind(&self) -> ValueKind {
                match self {
                    $(AttrKey::$variant => ValueKind::$kind,)*
                    AttrKey::Other(_) => ValueKind::Any,
                }
            }
        }
    };
}

attr_keys! {
    Name => "name": Text,
    Id => "id": Text,
    Visible => "visible": Visibility,
    NeedsRegularUpdate => "needsregularupdate": Bool,
    WithLabel => "withlabel": Bool,
    Label => "label": Nested,
    Borders => "borders": Nested,
    LabelColor => "labelcolor": Color,
    Trace => "trace": Bool,
    Fixed => "fixed": Bool,
    Draft => "draft": Bool,
    Layer => "layer": Count,
    View => "view": Text,
    // Shortcuts, expanded before storage
    Color => "color": Color,
    Opacity => "opacity": Unit,
    HighlightColor => "highlightcolor": Color,
    HighlightOpacity => "highlightopacity": Unit,
    // Stroke and fill
    StrokeColor => "strokecolor": Color,
    FillColor => "fillcolor": Color,
    HighlightStrokeColor => "highlightstrokecolor": Color,
    HighlightFillColor => "highlightfillcolor": Color,
    StrokeOpacity => "strokeopacity": Unit,
    FillOpacity => "fillopacity": Unit,
    HighlightStrokeOpacity => "highlightstrokeopacity": Unit,
    HighlightFillOpacity => "highlightfillopacity": Unit,
    StrokeWidth => "strokewidth": NonNegative,
    HighlightStrokeWidth => "highlightstrokewidth": NonNegative,
    Dash => "dash": Count,
    Gradient => "gradient": Text,
    GradientSecondColor => "gradientsecondcolor": Color,
    GradientSecondOpacity => "gradientsecondopacity": Unit,
    // Kind-specific
    Size => "size": NonNegative,
    Face => "face": Text,
    StraightFirst => "straightfirst": Bool,
    StraightLast => "straightlast": Bool,
    WithLines => "withlines": Bool,
    FontSize => "fontsize": NonNegative,
    Digits => "digits": Digits,
    DecimalSeparator => "decimalseparator": Text,
}

/// Shortcut keys and the keys they fan out to
pub static SHORTCUTS: &[(AttrKey, &[AttrKey])] = &[
    (AttrKey::Color, &[AttrKey::StrokeColor, AttrKey::FillColor]),
    (AttrKey::Opacity, &[AttrKey::StrokeOpacity, AttrKey::FillOpacity]),
    (
        AttrKey::HighlightColor,
        &[AttrKey::HighlightStrokeColor, AttrKey::HighlightFillColor],
    ),
    (
        AttrKey::HighlightOpacity,
        &[AttrKey::HighlightStrokeOpacity, AttrKey::HighlightFillOpacity],
    ),
    (
        AttrKey::StrokeWidth,
        &[AttrKey::StrokeWidth, AttrKey::HighlightStrokeWidth],
    ),
];

impl AttrKey {
    /// Targets of a shortcut key, `None` for ordinary keys
    pub fn shortcut_targets(&self) -> Option<&'static [AttrKey]> {
        SHORTCUTS
            .iter()
            .find(|(key, _)| key == self)
            .map(|(_, targets)| *targets)
    }

    /// The opacity key that receives the alpha channel of an `#rrggbbaa` color
    pub fn opacity_partner(&self) -> Option<AttrKey> {
        match self {
            AttrKey::StrokeColor => Some(AttrKey::StrokeOpacity),
            AttrKey::FillColor => Some(AttrKey::FillOpacity),
            AttrKey::HighlightStrokeColor => Some(AttrKey::HighlightStrokeOpacity),
            AttrKey::HighlightFillColor => Some(AttrKey::HighlightFillOpacity),
            AttrKey::GradientSecondColor => Some(AttrKey::GradientSecondOpacity),
            _ => None,
        }
    }
}

impl From<&str> for AttrKey {
    fn from(raw: &str) -> Self {
        AttrKey::parse(raw)
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
