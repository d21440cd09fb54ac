//! Coordinate and bounding-box primitives shared by every element kind.

use std::fmt;
use std::ops::{Add, Sub};

use glam::{DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
        }
    }
}

impl std::error::Error for NumericError {}

/// User coordinates of a point on the construction plane.
///
/// NaN components are legal and mean "currently undefined"; elements
/// computed from such coordinates end up not-real.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[repr(transparent)]
pub struct Coords(pub DVec2);

impl Coords {
    pub const ORIGIN: Coords = Coords(DVec2::ZERO);
    pub const NAN: Coords = Coords(DVec2::NAN);

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Coords(dvec2(x, y))
    }

    /// Create coordinates with validation (rejects NaN/infinite)
    pub fn try_new(x: f64, y: f64) -> Result<Self, NumericError> {
        for v in [x, y] {
            if v.is_nan() {
                return Err(NumericError::NaN);
            }
            if v.is_infinite() {
                return Err(NumericError::Infinite);
            }
        }
        Ok(Coords::new(x, y))
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.0.y
    }

    /// Both components are finite numbers.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    #[inline]
    pub fn distance(self, other: Coords) -> f64 {
        self.0.distance(other.0)
    }

    #[inline]
    pub fn midpoint(self, other: Coords) -> Coords {
        Coords((self.0 + other.0) * 0.5)
    }

    /// Angle of `other` seen from `self`, in radians.
    #[inline]
    pub fn angle_to(self, other: Coords) -> f64 {
        let d = other.0 - self.0;
        d.y.atan2(d.x)
    }

    #[inline]
    pub fn offset(self, by: DVec2) -> Coords {
        Coords(self.0 + by)
    }
}

impl From<(f64, f64)> for Coords {
    fn from((x, y): (f64, f64)) -> Self {
        Coords::new(x, y)
    }
}

impl From<DVec2> for Coords {
    fn from(v: DVec2) -> Self {
        Coords(v)
    }
}

impl Add<DVec2> for Coords {
    type Output = Coords;
    fn add(self, rhs: DVec2) -> Coords {
        Coords(self.0 + rhs)
    }
}

impl Sub for Coords {
    type Output = DVec2;
    fn sub(self, rhs: Coords) -> DVec2 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}

/// Axis-aligned bounding box in user coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BBox {
    /// An empty box that any point expands
    pub fn new() -> Self {
        Self {
            min: DVec2::INFINITY,
            max: DVec2::NEG_INFINITY,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Coords>) -> Self {
        let mut bbox = Self::new();
        for p in points {
            bbox.expand_point(p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_point(&mut self, p: Coords) {
        self.min = self.min.min(p.0);
        self.max = self.max.max(p.0);
    }

    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    pub fn center(&self) -> Coords {
        Coords((self.min + self.max) * 0.5)
    }

    /// Containment test with a tolerance band around the box
    pub fn contains(&self, p: Coords, tolerance: f64) -> bool {
        !self.is_empty()
            && p.x() >= self.min.x - tolerance
            && p.x() <= self.max.x + tolerance
            && p.y() >= self.min.y - tolerance
            && p.y() <= self.max.y + tolerance
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_try_new_rejects_nan_and_infinity() {
        assert_eq!(Coords::try_new(f64::NAN, 0.0), Err(NumericError::NaN));
        assert_eq!(Coords::try_new(0.0, f64::INFINITY), Err(NumericError::Infinite));
        assert!(Coords::try_new(1.0, -2.0).is_ok());
    }

    #[test]
    fn coords_nan_is_not_finite() {
        assert!(!Coords::NAN.is_finite());
        assert!(Coords::ORIGIN.is_finite());
    }

    #[test]
    fn coords_distance_and_midpoint() {
        let a = Coords::new(0.0, 0.0);
        let b = Coords::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.midpoint(b), Coords::new(1.5, 2.0));
    }

    #[test]
    fn bbox_expands_and_contains() {
        let bbox = BBox::from_points([Coords::new(-1.0, 0.0), Coords::new(2.0, 3.0)]);
        assert_eq!(bbox.width(), 3.0);
        assert_eq!(bbox.height(), 3.0);
        assert_eq!(bbox.center(), Coords::new(0.5, 1.5));
        assert!(bbox.contains(Coords::new(2.05, 3.0), 0.1));
        assert!(!bbox.contains(Coords::new(2.5, 3.0), 0.1));
    }

    #[test]
    fn empty_bbox_contains_nothing() {
        let bbox = BBox::new();
        assert!(bbox.is_empty());
        assert!(!bbox.contains(Coords::ORIGIN, 1.0));
    }
}
