//! Attribute animation.
//!
//! An animation interpolates numeric and hex color attributes over a fixed
//! number of frames. The host calls [`Board::step_animations`] from its
//! timer; each call is one short pass.

use super::Board;
use crate::attr::{AttrKey, AttrPatch, AttrValue, Rgb, normalize, validate};
use crate::registry::ElementId;

#[derive(Debug, Clone)]
enum Track {
    Number { key: AttrKey, from: f64, to: f64 },
    Color { key: AttrKey, from: Rgb, to: Rgb },
}

impl Track {
    fn at(&self, t: f64) -> (String, AttrValue) {
        match self {
            Track::Number { key, from, to } => {
                (key.as_str().to_string(), AttrValue::Number(from + (to - from) * t))
            }
            Track::Color { key, from, to } => (
                key.as_str().to_string(),
                AttrValue::Text(from.lerp(*to, t).to_hex()),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Animation {
    pub(crate) element: ElementId,
    tracks: Vec<Track>,
    frame: usize,
    frames: usize,
}

impl Board {
    /// Start animating `id` towards `targets` over `frames` frames.
    ///
    /// Keys that are neither numeric nor hex colors on both ends are
    /// ignored. Returns false when nothing can be animated.
    pub fn animate(&mut self, id: ElementId, targets: impl Into<AttrPatch>, frames: usize) -> bool {
        let mut tracks = Vec::new();
        for (key, target) in normalize(&targets.into()) {
            if !validate(&key, &target) {
                continue;
            }
            let current = self.read_attribute(id, &key);
            let track = match (current, &target) {
                (Some(AttrValue::Number(from)), AttrValue::Number(to)) => Track::Number {
                    key,
                    from,
                    to: *to,
                },
                (Some(AttrValue::Text(from)), AttrValue::Text(to)) => {
                    match (Rgb::parse(&from), Rgb::parse(to)) {
                        (Some(from), Some(to)) => Track::Color { key, from, to },
                        _ => continue,
                    }
                }
                _ => continue,
            };
            tracks.push(track);
        }
        if tracks.is_empty() || !self.registry.contains(id) {
            return false;
        }
        self.animations.retain(|a| a.element != id);
        self.animations.push(Animation {
            element: id,
            tracks,
            frame: 0,
            frames: frames.max(1),
        });
        true
    }

    /// Advance every animation by one frame and run one pass.
    ///
    /// Returns how many animations are still running.
    pub fn step_animations(&mut self) -> usize {
        if self.animations.is_empty() {
            return 0;
        }
        let mut animations = std::mem::take(&mut self.animations);
        for animation in &mut animations {
            animation.frame += 1;
            let t = animation.frame as f64 / animation.frames as f64;
            let patch: AttrPatch = animation.tracks.iter().map(|track| track.at(t)).collect();
            if !self.apply_patch(animation.element, &patch).is_empty() {
                self.mark_dirty(animation.element);
            }
        }
        animations.retain(|a| a.frame < a.frames && self.registry.contains(a.element));
        self.animations = animations;
        self.update();
        self.animations.len()
    }

    pub fn is_animating(&self, id: ElementId) -> bool {
        self.animations.iter().any(|a| a.element == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::options::BoardOptions;
    use crate::parents;

    #[test]
    fn numbers_and_colors_interpolate() {
        let mut b = Board::new(BoardOptions::default().with_id("an"));
        let a = b
            .create(ElementType::Point, parents![(0.0, 0.0)], ("withlabel", false))
            .unwrap();
        let targets = AttrPatch::new()
            .with("size", 7)
            .with("strokecolor", "#0000ff")
            .with("face", "x");
        assert!(b.animate(a, targets, 2));
        assert!(b.is_animating(a));

        assert_eq!(b.step_animations(), 1);
        assert_eq!(b.get_attribute(a, "size"), Some(AttrValue::Number(5.0)));
        assert_eq!(
            b.get_attribute(a, "strokecolor"),
            Some(AttrValue::Text("#800080".into()))
        );

        assert_eq!(b.step_animations(), 0);
        assert_eq!(b.get_attribute(a, "size"), Some(AttrValue::Number(7.0)));
        assert_eq!(
            b.get_attribute(a, "strokecolor"),
            Some(AttrValue::Text("#0000ff".into()))
        );
        assert_eq!(b.get_attribute(a, "face"), Some(AttrValue::Text("o".into())));
        assert!(!b.is_animating(a));
    }

    #[test]
    fn nothing_to_animate() {
        let mut b = Board::new(BoardOptions::default().with_id("an"));
        let a = b.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
        assert!(!b.animate(a, ("face", "x"), 5));
        assert_eq!(b.step_animations(), 0);
    }
}
