//! Doubly connected edge list of the critical-line arrangement
//!
//! Geometry lives in the dual plane: a vertex (m, c) stands for the query
//! line y = m·x + c. All coordinates are exact.
//!
//! ## Layout
//!
//! - face 0 is the unbounded outer face
//! - face 1 starts as the interior of the box [0, M] × [c_low, c_high]
//! - interior boundaries run counterclockwise
//!
//! ## Line insertion
//!
//! Every critical line enters the box through the left edge (m = 0). The
//! walk starts at that point (splitting the left edge, or reusing a vertex
//! already there), picks the face the line enters, finds where the line
//! leaves that face (an existing vertex or a new split of an edge), splits
//! the face, and continues from the exit point until it reaches the right,
//! top or bottom side of the box.

use num::{BigInt, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::bifiltration::Exact;
use crate::error::{BipersError, Result};

use super::anchors::{CriticalLine, DualBox};

pub const OUTER_FACE: usize = 0;

const UNSET: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub m: Exact,
    pub c: Exact,
    /// Some outgoing halfedge
    pub incident: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Halfedge {
    pub origin: usize,
    pub twin: usize,
    pub next: usize,
    pub prev: usize,
    pub face: usize,
    /// Anchor whose critical line carries this edge; `None` on the box
    pub anchor: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// Some halfedge on the boundary
    pub boundary: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dcel {
    pub vertices: Vec<Vertex>,
    pub halfedges: Vec<Halfedge>,
    pub faces: Vec<Face>,
    pub max_m: Exact,
    pub c_low: Exact,
    pub c_high: Exact,
}

impl Dcel {
    pub fn dest(&self, h: usize) -> usize {
        self.halfedges[self.halfedges[h].twin].origin
    }

    /// Halfedges of the cycle through `h`, following `next`
    pub fn cycle(&self, h: usize) -> Vec<usize> {
        let mut out = vec![h];
        let mut x = self.halfedges[h].next;
        while x != h {
            out.push(x);
            x = self.halfedges[x].next;
        }
        out
    }

    pub fn face_cycle(&self, f: usize) -> Vec<usize> {
        self.cycle(self.faces[f].boundary)
    }

    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Vertex centroid of a face; interior to it since faces are convex
    pub fn representative(&self, f: usize) -> (Exact, Exact) {
        let cycle = self.face_cycle(f);
        let mut m = Exact::zero();
        let mut c = Exact::zero();
        for &h in &cycle {
            let v = &self.vertices[self.halfedges[h].origin];
            m += &v.m;
            c += &v.c;
        }
        let n = Exact::from_integer(BigInt::from(cycle.len()));
        (m / &n, c / &n)
    }

    /// Interior faces sharing an edge with `f`
    pub fn neighbours(&self, f: usize) -> Vec<usize> {
        self.face_cycle(f)
            .into_iter()
            .map(|h| self.halfedges[self.halfedges[h].twin].face)
            .filter(|&g| g != OUTER_FACE)
            .collect()
    }

    fn direction(&self, h: usize) -> (Exact, Exact) {
        let o = &self.vertices[self.halfedges[h].origin];
        let q = &self.vertices[self.dest(h)];
        (&q.m - &o.m, &q.c - &o.c)
    }

    fn add_vertex(&mut self, m: Exact, c: Exact) -> usize {
        self.vertices.push(Vertex { m, c, incident: UNSET });
        self.vertices.len() - 1
    }

    fn add_halfedge(&mut self, origin: usize, face: usize, anchor: Option<usize>) -> usize {
        self.halfedges.push(Halfedge { origin, twin: UNSET, next: UNSET, prev: UNSET, face, anchor });
        self.halfedges.len() - 1
    }

    fn link(&mut self, a: usize, b: usize) {
        self.halfedges[a].next = b;
        self.halfedges[b].prev = a;
    }

    fn pair(&mut self, a: usize, b: usize) {
        self.halfedges[a].twin = b;
        self.halfedges[b].twin = a;
    }

    /// Split the edge of `h` at (m, c). `h` keeps its origin; returns the
    /// new vertex and the halfedge leaving it along `h`'s direction.
    fn split_edge(&mut self, h: usize, m: Exact, c: Exact) -> (usize, usize) {
        let x = self.add_vertex(m, c);
        let t = self.halfedges[h].twin;
        let q = self.dest(h);
        let h2 = self.add_halfedge(x, self.halfedges[h].face, self.halfedges[h].anchor);
        let t2 = self.add_halfedge(q, self.halfedges[t].face, self.halfedges[t].anchor);

        let after_h = self.halfedges[h].next;
        self.link(h2, after_h);
        self.link(h, h2);
        let before_t = self.halfedges[t].prev;
        self.link(before_t, t2);
        self.link(t2, t);
        self.halfedges[t].origin = x;
        self.pair(h2, t2);

        if self.vertices[q].incident == t {
            self.vertices[q].incident = t2;
        }
        self.vertices[x].incident = h2;
        (x, h2)
    }

    /// Split face `f` by a new edge from `v` to `w` (both on its boundary)
    fn split_face(&mut self, f: usize, v: usize, w: usize, anchor: usize) -> Result<usize> {
        let cycle = self.face_cycle(f);
        let into = |target: usize| cycle.iter().copied().find(|&h| self.dest(h) == target);
        let (Some(a_in), Some(b_in)) = (into(v), into(w)) else {
            return Err(BipersError::computation(format!("vertices {} and {} are not both on face {}", v, w, f)));
        };
        let a_out = self.halfedges[a_in].next;
        let b_out = self.halfedges[b_in].next;

        let e = self.add_halfedge(v, f, Some(anchor));
        let et = self.add_halfedge(w, f, Some(anchor));
        self.pair(e, et);
        self.link(a_in, e);
        self.link(e, b_out);
        self.link(b_in, et);
        self.link(et, a_out);

        let new_face = self.faces.len();
        self.faces.push(Face { boundary: e });
        for h in self.cycle(e) {
            self.halfedges[h].face = new_face;
        }
        self.faces[f].boundary = et;
        Ok(new_face)
    }

    /// The interior face a line of the given slope enters when leaving `v`
    /// to the right
    fn face_around(&self, v: usize, slope: &Exact) -> Result<usize> {
        let d = (Exact::from_integer(BigInt::from(1)), slope.clone());
        let start = self.vertices[v].incident;
        let mut h = start;
        loop {
            let f = self.halfedges[h].face;
            if f != OUTER_FACE {
                let out = self.direction(h);
                let (pm, pc) = self.direction(self.halfedges[h].prev);
                let back = (-pm, -pc);
                if cross(&out, &d).is_positive() && cross(&d, &back).is_positive() {
                    return Ok(f);
                }
            }
            h = self.halfedges[self.halfedges[h].prev].twin;
            if h == start {
                return Err(BipersError::computation(format!("no face around vertex {} for slope {}", v, slope)));
            }
        }
    }
}

fn cross(a: &(Exact, Exact), b: &(Exact, Exact)) -> Exact {
    &a.0 * &b.1 - &a.1 * &b.0
}

/// Incremental construction; owns the left-boundary index
pub(crate) struct DcelBuilder {
    dcel: Dcel,
    /// Lower endpoint c of each downward left-boundary halfedge
    left: BTreeMap<Exact, usize>,
}

impl DcelBuilder {
    pub fn new(dual: &DualBox) -> Self {
        let mut dcel = Dcel {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: vec![Face { boundary: UNSET }, Face { boundary: UNSET }],
            max_m: dual.max_m.clone(),
            c_low: dual.c_low.clone(),
            c_high: dual.c_high.clone(),
        };
        let zero = Exact::zero();
        let corners = [
            dcel.add_vertex(zero.clone(), dual.c_low.clone()),
            dcel.add_vertex(dual.max_m.clone(), dual.c_low.clone()),
            dcel.add_vertex(dual.max_m.clone(), dual.c_high.clone()),
            dcel.add_vertex(zero, dual.c_high.clone()),
        ];

        // bottom, right, top, left
        let inner: Vec<usize> = corners.iter().map(|&v| dcel.add_halfedge(v, 1, None)).collect();
        let outer: Vec<usize> = (0..4).map(|k| dcel.add_halfedge(corners[(k + 1) % 4], OUTER_FACE, None)).collect();
        for k in 0..4 {
            dcel.link(inner[k], inner[(k + 1) % 4]);
            dcel.pair(inner[k], outer[k]);
            dcel.link(outer[(k + 1) % 4], outer[k]);
            dcel.vertices[corners[k]].incident = inner[k];
        }
        dcel.faces[OUTER_FACE].boundary = outer[0];
        dcel.faces[1].boundary = inner[0];

        let left = BTreeMap::from([(dual.c_low.clone(), inner[3])]);
        Self { dcel, left }
    }

    pub fn insert(&mut self, line: &CriticalLine) -> Result<()> {
        let c0 = line.intercept.clone();
        let mut v = match self.left.get(&c0).copied() {
            Some(h) => self.dcel.dest(h),
            None => {
                let (key, h) = match self.left.range(..&c0).next_back() {
                    Some((k, &h)) => (k.clone(), h),
                    None => {
                        return Err(BipersError::computation(format!("intercept {} lies below the box", c0)));
                    }
                };
                let (x, h2) = self.dcel.split_edge(h, Exact::zero(), c0.clone());
                self.left.insert(c0, h);
                self.left.insert(key, h2);
                x
            }
        };

        let mut f = self.dcel.face_around(v, &line.slope)?;
        loop {
            let w = self.exit_point(f, v, line)?;
            self.dcel.split_face(f, v, w, line.anchor)?;
            let end = &self.dcel.vertices[w];
            if end.m == self.dcel.max_m || end.c == self.dcel.c_low || end.c == self.dcel.c_high {
                return Ok(());
            }
            f = self.dcel.face_around(w, &line.slope)?;
            v = w;
        }
    }

    /// Where `line` leaves face `f` after entering at `v`
    fn exit_point(&mut self, f: usize, v: usize, line: &CriticalLine) -> Result<usize> {
        for h in self.dcel.face_cycle(f) {
            let p = self.dcel.halfedges[h].origin;
            let q = self.dcel.dest(h);
            let (pv, qv) = (&self.dcel.vertices[p], &self.dcel.vertices[q]);
            let sp = line.side(&pv.m, &pv.c);
            let sq = line.side(&qv.m, &qv.c);
            if q != v && sq == Ordering::Equal {
                return Ok(q);
            }
            if sp != Ordering::Equal && sq != Ordering::Equal && sp != sq {
                let fp = &pv.c - line.value_at(&pv.m);
                let fq = &qv.c - line.value_at(&qv.m);
                let t = &fp / (&fp - &fq);
                let m = &pv.m + &t * (&qv.m - &pv.m);
                let c = &pv.c + &t * (&qv.c - &pv.c);
                let (x, _) = self.dcel.split_edge(h, m, c);
                return Ok(x);
            }
        }
        Err(BipersError::computation(format!("line of anchor {} does not leave face {}", line.anchor, f)))
    }

    pub fn finish(self) -> Dcel {
        self.dcel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::anchors::dual_box;

    fn q(n: i64) -> Exact {
        Exact::from_integer(BigInt::from(n))
    }

    fn build(anchors: &[(i64, i64)]) -> Dcel {
        let lines: Vec<CriticalLine> =
            anchors.iter().enumerate().map(|(i, &(x, y))| CriticalLine::new(i, &q(x), &q(y))).collect();
        let mut builder = DcelBuilder::new(&dual_box(&lines));
        for line in &lines {
            builder.insert(line).unwrap();
        }
        builder.finish()
    }

    fn euler(d: &Dcel) -> i64 {
        d.vertices.len() as i64 - d.num_edges() as i64 + d.faces.len() as i64
    }

    #[test]
    fn test_empty_box() {
        let d = build(&[]);
        assert_eq!(d.faces.len(), 2);
        assert_eq!(d.face_cycle(1).len(), 4);
        assert_eq!(d.face_cycle(OUTER_FACE).len(), 4);
        assert_eq!(euler(&d), 2);
    }

    #[test]
    fn test_single_line() {
        let d = build(&[(1, 2)]);
        assert_eq!(d.faces.len(), 3);
        assert_eq!(euler(&d), 2);
        for f in 1..3 {
            for h in d.face_cycle(f) {
                assert_eq!(d.halfedges[h].face, f);
            }
        }
    }

    #[test]
    fn test_two_crossing_lines() {
        // c = 3 - m and c = 1 + 0 m cross at m = 2
        let d = build(&[(1, 3), (0, 1)]);
        assert_eq!(d.faces.len(), 5);
        assert_eq!(euler(&d), 2);
        assert!(d.vertices.iter().any(|v| v.m == q(2) && v.c == q(1)));
    }

    #[test]
    fn test_concurrent_lines() {
        // three lines through (m, c) = (1, 0)
        let d = build(&[(1, 1), (2, 2), (3, 3)]);
        assert_eq!(euler(&d), 2);
        assert_eq!(d.faces.len(), 7);
        let hub = d.vertices.iter().filter(|v| v.m == q(1) && v.c == q(0)).count();
        assert_eq!(hub, 1, "concurrent lines share one vertex");
    }

    #[test]
    fn test_shared_intercept() {
        // same entry point on the left edge
        let d = build(&[(1, 2), (2, 2)]);
        assert_eq!(euler(&d), 2);
        assert_eq!(d.faces.len(), 4);
    }

    #[test]
    fn test_representatives_distinct_sides() {
        let anchors = [(1, 3), (0, 1), (2, 2)];
        let d = build(&anchors);
        let lines: Vec<CriticalLine> =
            anchors.iter().enumerate().map(|(i, &(x, y))| CriticalLine::new(i, &q(x), &q(y))).collect();
        let mut seen = std::collections::HashSet::new();
        for f in 1..d.faces.len() {
            let (m, c) = d.representative(f);
            let signs: Vec<Ordering> = lines.iter().map(|l| l.side(&m, &c)).collect();
            assert!(signs.iter().all(|s| *s != Ordering::Equal));
            assert!(seen.insert(signs), "face {} repeats a sign vector", f);
        }
    }
}
