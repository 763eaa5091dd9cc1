//! Anchors and critical lines
//!
//! An anchor is the join of two incomparable points of supp ξ₀ ∪ supp ξ₁.
//! In the dual plane, where (m, c) stands for the line y = m·x + c, the
//! lines through anchor α form the critical line
//!
//!   c = α.y − α.x · m
//!
//! The barcode template is constant off the critical lines.

use num::{Signed, Zero};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

use crate::betti::TemplatePoints;
use crate::bifiltration::{Exact, GridPoint};

/// An anchor with its coordinates for query-time comparisons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub grade: GridPoint,
    pub x: f64,
    pub y: f64,
}

/// Sorted, deduplicated anchors of a set of template points
pub(crate) fn anchor_grades(template_points: &TemplatePoints) -> Vec<GridPoint> {
    let support: Vec<GridPoint> = template_points
        .points
        .iter()
        .filter(|p| p.is_support())
        .map(|p| p.grade())
        .collect();

    let mut pairs = 0usize;
    let mut anchors = BTreeSet::new();
    for (i, u) in support.iter().enumerate() {
        for v in &support[i + 1..] {
            if !u.comparable(v) {
                pairs += 1;
                anchors.insert(u.join(v));
            }
        }
    }
    debug!(incomparable_pairs = pairs, anchors = anchors.len(), "anchors collected, duplicates merged");
    anchors.into_iter().collect()
}

/// Dual line of an anchor: c = intercept + slope · m
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CriticalLine {
    pub anchor: usize,
    pub slope: Exact,
    pub intercept: Exact,
}

impl CriticalLine {
    pub fn new(anchor: usize, x: &Exact, y: &Exact) -> Self {
        Self { anchor, slope: -x.clone(), intercept: y.clone() }
    }

    pub fn value_at(&self, m: &Exact) -> Exact {
        &self.intercept + &self.slope * m
    }

    /// Position of (m, c) relative to the line: Greater means above
    pub fn side(&self, m: &Exact, c: &Exact) -> Ordering {
        c.cmp(&self.value_at(m))
    }

    /// m-coordinate of the crossing with another line, if any
    pub fn crossing(&self, other: &CriticalLine) -> Option<Exact> {
        if self.slope == other.slope {
            return None;
        }
        Some((&other.intercept - &self.intercept) / (&self.slope - &other.slope))
    }
}

/// Box [0, max_m] × [c_low, c_high] holding every crossing at m ≥ 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DualBox {
    pub max_m: Exact,
    pub c_low: Exact,
    pub c_high: Exact,
}

/// Critical-geometry precomputation, parallel over lines
pub(crate) fn dual_box(lines: &[CriticalLine]) -> DualBox {
    let one = Exact::from_integer(1.into());

    let last_crossing = (0..lines.len())
        .into_par_iter()
        .filter_map(|i| {
            lines[i + 1..]
                .iter()
                .filter_map(|other| lines[i].crossing(other))
                .filter(|m| m.is_positive())
                .max()
        })
        .max()
        .unwrap_or_else(Exact::zero);
    let max_m = last_crossing + &one;

    let zero = Exact::zero();
    let values: Vec<Exact> = lines
        .par_iter()
        .flat_map_iter(|l| [l.value_at(&zero), l.value_at(&max_m)])
        .collect();
    let c_low = values.iter().min().cloned().unwrap_or_else(Exact::zero) - &one;
    let c_high = values.iter().max().cloned().unwrap_or_else(Exact::zero) + &one;

    DualBox { max_m, c_low, c_high }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betti::TemplatePoint;
    use ndarray::Array2;
    use num::BigInt;

    fn q(n: i64) -> Exact {
        Exact::from_integer(BigInt::from(n))
    }

    fn points(list: &[(usize, usize, u32, u32)]) -> TemplatePoints {
        TemplatePoints {
            hom_degree: 0,
            x_exact: (0..5).map(q).collect(),
            y_exact: (0..5).map(q).collect(),
            homology_dimensions: Array2::zeros((5, 5)),
            points: list
                .iter()
                .map(|&(x, y, a, b)| TemplatePoint::new(GridPoint::new(x, y), a, b, 0))
                .collect(),
        }
    }

    #[test]
    fn test_anchors_from_incomparable_pairs() {
        let tp = points(&[(0, 2, 1, 0), (1, 1, 1, 0), (2, 0, 0, 1), (3, 3, 0, 1)]);
        let anchors = anchor_grades(&tp);
        assert_eq!(anchors, vec![GridPoint::new(1, 2), GridPoint::new(2, 1), GridPoint::new(2, 2)]);
    }

    #[test]
    fn test_xi2_only_points_ignored() {
        let tp = points(&[(0, 2, 1, 0), (2, 0, 0, 0)]);
        assert!(anchor_grades(&tp).is_empty());
    }

    #[test]
    fn test_crossing_and_box() {
        // anchors (1, 3) and (2, 1): 3 - m = 1 - 2m at m = -2, no positive crossing
        let a = CriticalLine::new(0, &q(1), &q(3));
        let b = CriticalLine::new(1, &q(2), &q(1));
        assert_eq!(a.crossing(&b), Some(q(-2)));
        let dual = dual_box(&[a.clone(), b]);
        assert_eq!(dual.max_m, q(1));
        assert_eq!(dual.c_low, q(-2));
        assert_eq!(dual.c_high, q(4));
        assert_eq!(a.side(&q(0), &q(5)), Ordering::Greater);
        assert_eq!(a.side(&q(1), &q(2)), Ordering::Equal);
    }

    #[test]
    fn test_empty_box() {
        let dual = dual_box(&[]);
        assert_eq!(dual.max_m, q(1));
        assert_eq!(dual.c_low, q(-1));
        assert_eq!(dual.c_high, q(1));
    }
}
