//! Computed geometry of an element after its last update.

use glam::DVec2;

use crate::types::{BBox, Coords};

/// Geometry produced by an element's `compute`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Geom {
    /// Not computed yet
    #[default]
    Empty,
    Point(Coords),
    Line {
        p1: Coords,
        p2: Coords,
        straight_first: bool,
        straight_last: bool,
    },
    Circle {
        center: Coords,
        radius: f64,
    },
    Arc {
        center: Coords,
        radius: f64,
        start: f64,
        end: f64,
    },
    Polygon {
        vertices: Vec<Coords>,
    },
    Text {
        position: Coords,
        content: String,
    },
    Rect {
        origin: Coords,
        size: DVec2,
    },
}

impl Geom {
    /// Whether the geometry is defined. Degenerate inputs such as NaN
    /// coordinates, a zero-length defining segment or a radius under
    /// `epsilon` make an element not-real.
    pub fn is_real(&self, epsilon: f64) -> bool {
        match self {
            Geom::Empty => false,
            Geom::Point(p) => p.is_finite(),
            Geom::Line { p1, p2, .. } => {
                p1.is_finite() && p2.is_finite() && p1.distance(*p2) > epsilon
            }
            Geom::Circle { center, radius } | Geom::Arc { center, radius, .. } => {
                center.is_finite() && radius.is_finite() && *radius > epsilon
            }
            Geom::Polygon { vertices } => {
                vertices.len() >= 3 && vertices.iter().all(|v| v.is_finite())
            }
            Geom::Text { position, .. } => position.is_finite(),
            Geom::Rect { origin, size } => origin.is_finite() && size.is_finite(),
        }
    }

    pub fn radius(&self) -> Option<f64> {
        match self {
            Geom::Circle { radius, .. } | Geom::Arc { radius, .. } => Some(*radius),
            _ => None,
        }
    }

    pub fn center(&self) -> Option<Coords> {
        match self {
            Geom::Point(p) => Some(*p),
            Geom::Circle { center, .. } | Geom::Arc { center, .. } => Some(*center),
            _ => self.bounds().map(|b| b.center()),
        }
    }

    /// Hit test with a tolerance in user units
    pub fn has_point(&self, p: Coords, tolerance: f64) -> bool {
        match self {
            Geom::Empty => false,
            Geom::Point(q) => q.distance(p) <= tolerance,
            Geom::Line {
                p1,
                p2,
                straight_first,
                straight_last,
            } => {
                let d = *p2 - *p1;
                let len2 = d.length_squared();
                if len2 == 0.0 {
                    return p1.distance(p) <= tolerance;
                }
                let mut t = (p - *p1).dot(d) / len2;
                if !straight_first {
                    t = t.max(0.0);
                }
                if !straight_last {
                    t = t.min(1.0);
                }
                p1.offset(d * t).distance(p) <= tolerance
            }
            Geom::Circle { center, radius } => (center.distance(p) - radius).abs() <= tolerance,
            Geom::Arc {
                center,
                radius,
                start,
                end,
            } => {
                (center.distance(p) - radius).abs() <= tolerance
                    && angle_between(center.angle_to(p), *start, *end)
            }
            Geom::Polygon { vertices } => point_in_polygon(vertices, p),
            Geom::Text { .. } | Geom::Rect { .. } => {
                self.bounds().is_some_and(|b| b.contains(p, tolerance))
            }
        }
    }

    /// Bounding box; infinite lines report the box of their defining points
    pub fn bounds(&self) -> Option<BBox> {
        let bbox = match self {
            Geom::Empty => return None,
            Geom::Point(p) => BBox::from_points([*p]),
            Geom::Line { p1, p2, .. } => BBox::from_points([*p1, *p2]),
            Geom::Circle { center, radius } | Geom::Arc { center, radius, .. } => {
                let r = DVec2::splat(*radius);
                BBox::from_points([Coords(center.0 - r), Coords(center.0 + r)])
            }
            Geom::Polygon { vertices } => BBox::from_points(vertices.iter().copied()),
            Geom::Text { position, .. } => BBox::from_points([*position]),
            Geom::Rect { origin, size } => BBox::from_points([*origin, origin.offset(*size)]),
        };
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Where a label attached to this geometry is placed (before offset)
    pub fn label_anchor(&self) -> Option<Coords> {
        match self {
            Geom::Empty => None,
            Geom::Point(p) => Some(*p),
            Geom::Line { p1, p2, .. } => Some(p1.midpoint(*p2)),
            Geom::Circle { center, radius } => {
                // upper-left of the circle, on the circle
                let a = 0.75 * std::f64::consts::PI;
                Some(center.offset(DVec2::new(a.cos(), a.sin()) * *radius))
            }
            Geom::Arc {
                center,
                radius,
                start,
                end,
            } => {
                let mut sweep = end - start;
                if sweep < 0.0 {
                    sweep += std::f64::consts::TAU;
                }
                let a = start + sweep / 2.0;
                Some(center.offset(DVec2::new(a.cos(), a.sin()) * *radius))
            }
            Geom::Polygon { vertices } => {
                // top-most vertex
                vertices
                    .iter()
                    .copied()
                    .max_by(|a, b| a.y().total_cmp(&b.y()))
            }
            Geom::Text { position, .. } => Some(*position),
            Geom::Rect { origin, size } => Some(origin.offset(DVec2::new(0.0, size.y))),
        }
    }
}

/// Whether `angle` lies on the counter-clockwise sweep from `start` to `end`
fn angle_between(angle: f64, start: f64, end: f64) -> bool {
    let tau = std::f64::consts::TAU;
    let norm = |a: f64| a.rem_euclid(tau);
    let sweep = norm(end - start);
    norm(angle - start) <= sweep
}

/// Even-odd rule
fn point_in_polygon(vertices: &[Coords], p: Coords) -> bool {
    let mut inside = false;
    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + n - 1) % n];
        if (a.y() > p.y()) != (b.y() > p.y())
            && p.x() < (b.x() - a.x()) * (p.y() - a.y()) / (b.y() - a.y()) + a.x()
        {
            inside = !inside;
        }
    }
    inside
}
