//! Slab point location
//!
//! The distinct m-coordinates of the DCEL vertices cut the half-plane
//! m ≥ 0 into vertical slabs. No two critical lines cross inside a slab,
//! so the lines crossing it are totally ordered bottom to top and the faces
//! between consecutive lines are fixed. A query costs two binary searches.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bifiltration::grades::{exact_to_f64, midpoint};
use crate::bifiltration::Exact;
use crate::error::{BipersError, Result};
use crate::query::LineQuery;

use super::anchors::Anchor;
use super::dcel::{Dcel, OUTER_FACE};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slab {
    /// Anchors of the crossing lines, bottom to top
    pub lines: Vec<usize>,
    /// `faces[k]` lies between `lines[k - 1]` and `lines[k]`
    pub faces: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlabIndex {
    /// Left boundary of each slab, increasing, starting at 0
    pub bounds: Vec<f64>,
    pub slabs: Vec<Slab>,
}

impl SlabIndex {
    pub fn build(dcel: &Dcel) -> Result<Self> {
        let mut starts: Vec<&Exact> = dcel.vertices.iter().map(|v| &v.m).filter(|m| **m < dcel.max_m).collect();
        starts.sort();
        starts.dedup();

        let mut bottoms: Vec<(&Exact, usize)> = (0..dcel.halfedges.len())
            .filter(|&h| {
                let he = &dcel.halfedges[h];
                he.face != OUTER_FACE
                    && dcel.vertices[he.origin].c == dcel.c_low
                    && dcel.vertices[dcel.dest(h)].c == dcel.c_low
            })
            .map(|h| (&dcel.vertices[dcel.halfedges[h].origin].m, h))
            .collect();
        bottoms.sort();

        let mut slabs = Vec::with_capacity(starts.len());
        for (k, &start) in starts.iter().enumerate() {
            let end = starts.get(k + 1).copied().unwrap_or(&dcel.max_m);
            let mid = midpoint(start, end);
            let below = bottoms.partition_point(|(m, _)| **m <= mid);
            let Some(&(_, bottom)) = below.checked_sub(1).and_then(|i| bottoms.get(i)) else {
                return Err(BipersError::computation(format!("no bottom edge under slab {}", k)));
            };
            slabs.push(walk_up(dcel, dcel.halfedges[bottom].face, &mid)?);
        }

        debug!(slabs = slabs.len(), "point-location index built");
        Ok(Self { bounds: starts.into_iter().map(exact_to_f64).collect(), slabs })
    }

    /// Face containing the dual point of `query`; a line through an anchor
    /// resolves as if its offset were infinitesimally larger, or smaller
    /// when vertical
    pub fn locate(&self, query: &LineQuery, anchors: &[Anchor]) -> usize {
        let slab = match query.slope() {
            Some(m) => self.bounds.partition_point(|&b| b <= m).saturating_sub(1),
            None => self.slabs.len().saturating_sub(1),
        };
        let Some(slab) = self.slabs.get(slab) else {
            return OUTER_FACE;
        };
        let k = slab.lines.partition_point(|&a| query.passes_above(anchors[a].x, anchors[a].y));
        slab.faces[k]
    }
}

/// Faces crossed by the vertical line m = mid, starting from `face` on the
/// bottom of the box
fn walk_up(dcel: &Dcel, mut face: usize, mid: &Exact) -> Result<Slab> {
    let mut slab = Slab { lines: Vec::new(), faces: vec![face] };
    loop {
        let top = dcel.face_cycle(face).into_iter().find(|&h| {
            let p = &dcel.vertices[dcel.halfedges[h].origin];
            let q = &dcel.vertices[dcel.dest(h)];
            p.m > *mid && *mid > q.m
        });
        let Some(top) = top else {
            return Err(BipersError::computation(format!("face {} has no upper edge at m = {}", face, mid)));
        };
        let above = dcel.halfedges[dcel.halfedges[top].twin].face;
        if above == OUTER_FACE {
            return Ok(slab);
        }
        let Some(anchor) = dcel.halfedges[top].anchor else {
            return Err(BipersError::computation(format!("interior edge {} carries no critical line", top)));
        };
        slab.lines.push(anchor);
        slab.faces.push(above);
        face = above;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::anchors::{dual_box, CriticalLine};
    use crate::arrangement::dcel::DcelBuilder;
    use num::BigInt;

    fn q(n: i64) -> Exact {
        Exact::from_integer(BigInt::from(n))
    }

    fn build(points: &[(i64, i64)]) -> (Dcel, Vec<Anchor>) {
        let lines: Vec<CriticalLine> =
            points.iter().enumerate().map(|(i, &(x, y))| CriticalLine::new(i, &q(x), &q(y))).collect();
        let mut builder = DcelBuilder::new(&dual_box(&lines));
        for line in &lines {
            builder.insert(line).unwrap();
        }
        let anchors = points
            .iter()
            .map(|&(x, y)| Anchor { grade: crate::bifiltration::GridPoint::new(0, 0), x: x as f64, y: y as f64 })
            .collect();
        (builder.finish(), anchors)
    }

    #[test]
    fn test_single_face() {
        let (dcel, anchors) = build(&[]);
        let index = SlabIndex::build(&dcel).unwrap();
        assert_eq!(index.bounds, vec![0.0]);
        assert_eq!(index.slabs, vec![Slab { lines: vec![], faces: vec![1] }]);
        for (angle, offset) in [(0.0, 0.0), (45.0, -3.0), (90.0, 2.0)] {
            assert_eq!(index.locate(&LineQuery::new(angle, offset).unwrap(), &anchors), 1);
        }
    }

    #[test]
    fn test_slabs_order_lines() {
        // c = 3 - m and c = 1 cross at m = 2
        let (dcel, _anchors) = build(&[(1, 3), (0, 1)]);
        let index = SlabIndex::build(&dcel).unwrap();
        assert_eq!(index.bounds, vec![0.0, 2.0]);
        assert_eq!(index.slabs[0].lines, vec![1, 0]);
        assert_eq!(index.slabs[1].lines, vec![0, 1]);
        for slab in &index.slabs {
            assert_eq!(slab.faces.len(), 3);
        }
        // same face below both lines on either side of the crossing
        assert_eq!(index.slabs[0].faces[0], index.slabs[1].faces[0]);
    }

    #[test]
    fn test_locate_matches_sides() {
        let points = [(1, 3), (0, 1), (2, 2)];
        let (dcel, anchors) = build(&points);
        let index = SlabIndex::build(&dcel).unwrap();
        let lines: Vec<CriticalLine> =
            points.iter().enumerate().map(|(i, &(x, y))| CriticalLine::new(i, &q(x), &q(y))).collect();

        for f in 1..dcel.faces.len() {
            let (m, c) = dcel.representative(f);
            let (mf, cf) = (exact_to_f64(&m), exact_to_f64(&c));
            // y = m x + c  <=>  -x sin + y cos = c cos
            let angle = mf.atan().to_degrees();
            let offset = cf * mf.atan().cos();
            let query = LineQuery::new(angle, offset).unwrap();
            let located = index.locate(&query, &anchors);
            let (lm, lc) = dcel.representative(located);
            for line in &lines {
                assert_eq!(line.side(&m, &c), line.side(&lm, &lc), "face {} located as {}", f, located);
            }
        }
    }

    #[test]
    fn test_vertical_uses_last_slab() {
        let (dcel, anchors) = build(&[(1, 3), (0, 1)]);
        let index = SlabIndex::build(&dcel).unwrap();
        // x = 0.5 passes right of (0, 1) and left of (1, 3)
        let face = index.locate(&LineQuery::new(90.0, -0.5).unwrap(), &anchors);
        let slab = index.slabs.last().unwrap();
        assert_eq!(face, slab.faces[1]);
    }
}
