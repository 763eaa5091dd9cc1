//! Query lines of nonnegative slope

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BipersError, Result};

/// The line `-x·sin θ + y·cos θ = offset`, θ in degrees within [0, 90]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineQuery {
    pub angle: f64,
    pub offset: f64,
}

impl LineQuery {
    pub fn new(angle: f64, offset: f64) -> Result<Self> {
        if !angle.is_finite() || !(0.0..=90.0).contains(&angle) {
            return Err(BipersError::parameter(format!("angle must be between 0 and 90 degrees, got {}", angle)));
        }
        if !offset.is_finite() {
            return Err(BipersError::parameter(format!("offset must be finite, got {}", offset)));
        }
        Ok(Self { angle, offset })
    }

    pub fn is_horizontal(&self) -> bool {
        self.angle == 0.0
    }

    pub fn is_vertical(&self) -> bool {
        self.angle == 90.0
    }

    /// (sin θ, cos θ), exact at the axis angles
    fn sin_cos(&self) -> (f64, f64) {
        if self.is_horizontal() {
            (0.0, 1.0)
        } else if self.is_vertical() {
            (1.0, 0.0)
        } else {
            self.angle.to_radians().sin_cos()
        }
    }

    /// Slope m of y = m·x + c; `None` for a vertical line
    pub fn slope(&self) -> Option<f64> {
        if self.is_vertical() {
            None
        } else if self.is_horizontal() {
            Some(0.0)
        } else {
            Some(self.angle.to_radians().tan())
        }
    }

    /// Whether the line passes above the point; a vertical line does when
    /// it lies strictly left of it. A non-vertical line through the point
    /// counts as above.
    ///
    /// The test runs in `f64`, so the tie rule is exact only at 0° and 90°.
    /// Elsewhere a line within rounding of the point may land on either
    /// side; both sides give the same barcode for a line through an anchor.
    pub fn passes_above(&self, x: f64, y: f64) -> bool {
        if self.is_vertical() {
            return -x - self.offset < 0.0;
        }
        let (sin, cos) = self.sin_cos();
        -x * sin + y * cos - self.offset <= 0.0
    }

    /// Position along the line of the least point ≥ (x, y), or +∞ when
    /// the line never dominates it
    pub fn push(&self, x: f64, y: f64) -> f64 {
        if self.is_horizontal() {
            return if y <= self.offset { x } else { f64::INFINITY };
        }
        if self.is_vertical() {
            return if x <= -self.offset { y } else { f64::INFINITY };
        }
        let (sin, cos) = self.sin_cos();
        if -x * sin + y * cos - self.offset > 0.0 {
            // the line meets y = const to the right of the point
            let x_star = (y * cos - self.offset) / sin;
            x_star * cos + y * sin
        } else {
            let y_star = (self.offset + x * sin) / cos;
            x * cos + y_star * sin
        }
    }
}

impl fmt::Display for LineQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.angle, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_range() {
        assert!(LineQuery::new(0.0, 1.0).is_ok());
        assert!(LineQuery::new(90.0, -1.0).is_ok());
        assert!(LineQuery::new(100.0, 0.92).is_err());
        assert!(LineQuery::new(-0.5, 0.0).is_err());
        assert!(LineQuery::new(f64::NAN, 0.0).is_err());
        assert!(LineQuery::new(45.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_axis_pushes() {
        let horizontal = LineQuery::new(0.0, 1.2).unwrap();
        assert_eq!(horizontal.push(0.5, 0.0), 0.5);
        assert_eq!(horizontal.push(0.5, 1.2), 0.5);
        assert_eq!(horizontal.push(0.5, 1.5), f64::INFINITY);

        let vertical = LineQuery::new(90.0, -1.0).unwrap();
        assert_eq!(vertical.push(0.0, 1.5), 1.5);
        assert_eq!(vertical.push(1.0, 3.0), 3.0);
        assert_eq!(vertical.push(1.5, 3.0), f64::INFINITY);
    }

    #[test]
    fn test_diagonal_push() {
        // y = x: offset 0 at 45 degrees, t is distance from the origin
        let diagonal = LineQuery::new(45.0, 0.0).unwrap();
        let root2 = 2f64.sqrt();
        assert!((diagonal.push(1.0, 1.0) - root2).abs() < 1e-12);
        assert!((diagonal.push(2.0, 1.0) - 2.0 * root2).abs() < 1e-12);
        assert!((diagonal.push(1.0, 3.0) - 3.0 * root2).abs() < 1e-12);
    }

    #[test]
    fn test_passes_above() {
        let line = LineQuery::new(45.0, 0.0).unwrap();
        assert!(line.passes_above(1.0, 0.5));
        assert!(!line.passes_above(0.5, 1.0));

        let horizontal = LineQuery::new(0.0, 1.0).unwrap();
        assert!(horizontal.passes_above(5.0, 1.0), "ties resolve upward");

        let vertical = LineQuery::new(90.0, -1.0).unwrap();
        assert!(!vertical.passes_above(1.0, 0.0), "ties resolve to the right");
        assert!(vertical.passes_above(1.5, 0.0));
        assert_eq!(vertical.slope(), None);
        assert_eq!(horizontal.slope(), Some(0.0));
    }
}
