//! Hex color helpers: alpha splitting and interpolation for animations.

/// An RGB color parsed from `#rgb` or `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn parse(s: &str) -> Option<Rgb> {
        let hex = s.strip_prefix('#')?;
        let channel = |i: usize, w: usize| -> Option<u8> {
            let digits = hex.get(i * w..i * w + w)?;
            let v = u8::from_str_radix(digits, 16).ok()?;
            Some(if w == 1 { v * 17 } else { v })
        };
        match hex.len() {
            3 => Some(Rgb(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Some(Rgb(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Linear interpolation per channel, `t` in [0, 1]
    pub fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb(mix(self.0, to.0), mix(self.1, to.1), mix(self.2, to.2))
    }
}

/// Split `#rrggbbaa` into `#rrggbb` and an opacity in [0, 1].
///
/// Any other string is returned unchanged with no opacity.
pub fn split_alpha(color: &str) -> (String, Option<f64>) {
    if color.len() == 9 && color.starts_with('#') {
        if let (Some(rgb), Some(Ok(alpha))) = (
            color.get(..7).filter(|c| Rgb::parse(c).is_some()),
            color.get(7..).map(|a| u8::from_str_radix(a, 16)),
        ) {
            return (rgb.to_string(), Some(f64::from(alpha) / 255.0));
        }
    }
    (color.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_and_long_forms() {
        assert_eq!(Rgb::parse("#f00"), Some(Rgb(255, 0, 0)));
        assert_eq!(Rgb::parse("#00ff80"), Some(Rgb(0, 255, 128)));
        assert_eq!(Rgb::parse("red"), None);
        assert_eq!(Rgb::parse("#12345"), None);
    }

    #[test]
    fn split_alpha_channel() {
        let (color, opacity) = split_alpha("#ff000080");
        assert_eq!(color, "#ff0000");
        assert!((opacity.unwrap_or_default() - 128.0 / 255.0).abs() < 1e-12);

        assert_eq!(split_alpha("#ff0000"), ("#ff0000".to_string(), None));
        assert_eq!(split_alpha("none"), ("none".to_string(), None));
    }

    #[test]
    fn lerp_halfway() {
        let from = Rgb(0, 0, 0);
        let to = Rgb(255, 100, 10);
        assert_eq!(from.lerp(to, 0.5), Rgb(128, 50, 5));
        assert_eq!(from.lerp(to, 1.0).to_hex(), "#ff640a");
    }
}
