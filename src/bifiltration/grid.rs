//! Grade grid and binning
//!
//! The engines work on integer grid points. Every finite grade is placed
//! at the least grid value ≥ it on each axis. Without binning the grid
//! values are the distinct finite grade values; with binning they are the
//! upper boundaries of the bins chosen by a [`BinPolicy`]. Rounding up keeps
//! the placed bifiltration monotone.

use num::{BigInt, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::grades::{Exact, Grade};
use super::Bifiltration;

/// Integer grade on the grid; derived order is lexicographic (x, then y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: usize,
    pub y: usize,
}

impl GridPoint {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Coordinatewise ≤
    pub fn precedes(&self, other: &GridPoint) -> bool {
        self.x <= other.x && self.y <= other.y
    }

    /// Strictly below in the partial order
    pub fn strictly_precedes(&self, other: &GridPoint) -> bool {
        self.precedes(other) && self != other
    }

    pub fn comparable(&self, other: &GridPoint) -> bool {
        self.precedes(other) || other.precedes(self)
    }

    pub fn join(&self, other: &GridPoint) -> GridPoint {
        GridPoint::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Chooses bin upper boundaries for one axis
///
/// `values` holds every finite grade value on the axis, sorted ascending,
/// with multiplicity. The returned boundaries must be ascending; the
/// largest value is always added as the final boundary.
pub trait BinPolicy: fmt::Debug + Send + Sync {
    fn boundaries(&self, values: &[Exact], bins: usize) -> Vec<Exact>;
}

/// Bins of equal width between the smallest and largest value
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWidth;

impl BinPolicy for EqualWidth {
    fn boundaries(&self, values: &[Exact], bins: usize) -> Vec<Exact> {
        let (Some(lo), Some(hi)) = (values.first(), values.last()) else {
            return Vec::new();
        };
        let width = (hi - lo) / Exact::from_integer(BigInt::from(bins));
        if width.is_zero() {
            return vec![hi.clone()];
        }
        (1..=bins)
            .map(|k| lo + &width * Exact::from_integer(BigInt::from(k)))
            .collect()
    }
}

/// Bins holding (as near as possible) the same number of grade values
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualOccupancy;

impl BinPolicy for EqualOccupancy {
    fn boundaries(&self, values: &[Exact], bins: usize) -> Vec<Exact> {
        let n = values.len();
        if n == 0 {
            return Vec::new();
        }
        (1..=bins)
            .map(|k| values[((k * n).div_ceil(bins)).max(1) - 1].clone())
            .collect()
    }
}

/// Grid values for both axes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GradeGrid {
    pub x_exact: Vec<Exact>,
    pub y_exact: Vec<Exact>,
}

impl GradeGrid {
    /// Build the grid of a bifiltration. A bin count of 0 (or one at
    /// least the number of distinct values) disables binning on that axis.
    pub fn build(bifiltration: &Bifiltration, x_bins: usize, y_bins: usize, policy: &dyn BinPolicy) -> Self {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for simplex in bifiltration.iter() {
            if let Some(x) = simplex.grade.x.finite() {
                xs.push(x.clone());
            }
            if let Some(y) = simplex.grade.y.finite() {
                ys.push(y.clone());
            }
        }
        Self {
            x_exact: axis_values(xs, x_bins, policy),
            y_exact: axis_values(ys, y_bins, policy),
        }
    }

    pub fn width(&self) -> usize {
        self.x_exact.len()
    }

    pub fn height(&self) -> usize {
        self.y_exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_exact.is_empty() || self.y_exact.is_empty()
    }

    /// Grid point of a grade; `None` if a coordinate is infinite or beyond the grid
    pub fn locate(&self, grade: &Grade) -> Option<GridPoint> {
        let x = grade.x.finite()?;
        let y = grade.y.finite()?;
        let i = self.x_exact.partition_point(|v| v < x);
        let j = self.y_exact.partition_point(|v| v < y);
        (i < self.width() && j < self.height()).then_some(GridPoint::new(i, j))
    }

    pub fn exact(&self, point: GridPoint) -> (&Exact, &Exact) {
        (&self.x_exact[point.x], &self.y_exact[point.y])
    }

    /// Every grid point in lexicographic order
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.width()).flat_map(move |x| (0..self.height()).map(move |y| GridPoint::new(x, y)))
    }
}

fn axis_values(mut values: Vec<Exact>, bins: usize, policy: &dyn BinPolicy) -> Vec<Exact> {
    values.sort();
    let mut distinct = values.clone();
    distinct.dedup();
    if bins == 0 || bins >= distinct.len() {
        return distinct;
    }

    let mut boundaries = policy.boundaries(&values, bins);
    if let Some(max) = distinct.last() {
        boundaries.push(max.clone());
    }
    boundaries.sort();
    boundaries.dedup();

    // keep only the boundaries some value rounds up to
    let mut used: Vec<Exact> = distinct
        .iter()
        .filter_map(|v| boundaries.get(boundaries.partition_point(|b| b < v)).cloned())
        .collect();
    used.dedup();
    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bifiltration::grades::parse_exact;

    fn values(text: &[&str]) -> Vec<Exact> {
        text.iter().map(|t| parse_exact(t).unwrap()).collect()
    }

    #[test]
    fn test_grid_point_order() {
        let a = GridPoint::new(0, 3);
        let b = GridPoint::new(1, 0);
        assert!(a < b, "lexicographic order puts x first");
        assert!(!a.comparable(&b));
        assert_eq!(a.join(&b), GridPoint::new(1, 3));
        assert!(GridPoint::new(0, 0).strictly_precedes(&a));
        assert!(!a.strictly_precedes(&a));
        assert!(a < b && !a.precedes(&b));
        let (ra, rb) = (&a, &b);
        assert!(!ra.precedes(rb));
    }

    #[test]
    fn test_no_binning_keeps_distinct_values() {
        let v = values(&["0", "1", "1", "2.5"]);
        assert_eq!(axis_values(v.clone(), 0, &EqualWidth), values(&["0", "1", "2.5"]));
        assert_eq!(axis_values(v, 3, &EqualWidth), values(&["0", "1", "2.5"]));
    }

    #[test]
    fn test_equal_width() {
        let v = values(&["0", "1", "2", "3", "4"]);
        // bins of width 2: (.., 2], (2, 4]
        assert_eq!(axis_values(v, 2, &EqualWidth), values(&["2", "4"]));
    }

    #[test]
    fn test_equal_occupancy() {
        let v = values(&["0", "0", "0", "0", "1", "5", "9"]);
        // the heavy value 0 fills one bin on its own
        assert_eq!(axis_values(v, 2, &EqualOccupancy), values(&["0", "9"]));
    }

    #[test]
    fn test_unused_bins_dropped() {
        let v = values(&["0", "0.1", "10"]);
        assert_eq!(axis_values(v, 2, &EqualWidth), values(&["5", "10"]));
    }

    #[test]
    fn test_locate_rounds_up() {
        let grid = GradeGrid { x_exact: values(&["1", "2"]), y_exact: values(&["0", "3"]) };
        let g = Grade::parse("1.5", "0").unwrap();
        assert_eq!(grid.locate(&g), Some(GridPoint::new(1, 0)));
        assert_eq!(grid.locate(&Grade::parse("inf", "0").unwrap()), None);
        assert_eq!(grid.locate(&Grade::parse("7", "0").unwrap()), None);
        assert_eq!(grid.points().count(), 4);
    }
}
