//! Barcode templates by vineyard updates
//!
//! The cells of the filtration along a line are the generators and the
//! relations of the minimal presentation, each tagged with its template
//! point. Inside one face of the arrangement the order in which a line
//! meets the template points does not change, so the barcode template is a
//! function of the face. Crossing an edge transposes cells whose template
//! points are tied at the crossed anchor.
//!
//! A decomposition `R = D·V` is kept under adjacent transpositions
//! (Cohen-Steiner, Edelsbrunner, Morozov). Only the first face is reduced
//! from scratch.

use num::Zero;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::algebra::SparseColumn;
use crate::betti::TemplatePoints;
use crate::bifiltration::Exact;
use crate::error::{BipersError, Result};
use crate::presentation::Presentation;

use super::dcel::{Dcel, OUTER_FACE};

/// One bar of a template: template-point indices, `None` for an
/// essential class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateBar {
    pub birth: usize,
    pub death: Option<usize>,
    pub multiplicity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeTemplate {
    pub bars: Vec<TemplateBar>,
}

impl BarcodeTemplate {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    fn from_counts(counts: BTreeMap<(usize, Option<usize>), u32>) -> Self {
        let bars = counts
            .into_iter()
            .map(|((birth, death), multiplicity)| TemplateBar { birth, death, multiplicity })
            .collect();
        Self { bars }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum CellKind {
    Generator,
    Relation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cell {
    pub kind: CellKind,
    /// Template-point index
    pub template: usize,
    /// Generator cells in the boundary
    pub boundary: Vec<usize>,
}

/// Generators first, then relations; cell ids of generators equal
/// generator indices
pub(crate) fn cells_from(presentation: &Presentation, template_points: &TemplatePoints) -> Result<Vec<Cell>> {
    let locate = |grade| {
        template_points
            .index_of(grade)
            .ok_or_else(|| BipersError::computation(format!("presentation grade {} is not a template point", grade)))
    };

    let mut cells = Vec::with_capacity(presentation.generators.len() + presentation.relations.len());
    for &grade in &presentation.generators {
        cells.push(Cell { kind: CellKind::Generator, template: locate(grade)?, boundary: Vec::new() });
    }
    for relation in &presentation.relations {
        cells.push(Cell {
            kind: CellKind::Relation,
            template: locate(relation.grade)?,
            boundary: relation.generators.clone(),
        });
    }
    Ok(cells)
}

/// x-coordinate where the line y = m·x + c (m > 0) first reaches the
/// upper set of (ux, uy)
fn push_x(ux: &Exact, uy: &Exact, m: &Exact, c: &Exact) -> Exact {
    if *uy > m * ux + c {
        (uy - c) / m
    } else {
        ux.clone()
    }
}

/// Cell ids in the order a line meets them
pub(crate) fn push_order(cells: &[Cell], template_points: &TemplatePoints, m: &Exact, c: &Exact) -> Vec<usize> {
    let pushes: Vec<Exact> = (0..template_points.len())
        .map(|i| {
            let (x, y) = template_points.exact_coordinates(i);
            push_x(x, y, m, c)
        })
        .collect();
    let mut order: Vec<usize> = (0..cells.len()).collect();
    order.sort_by(|&a, &b| {
        let (ca, cb) = (&cells[a], &cells[b]);
        pushes[ca.template]
            .cmp(&pushes[cb.template])
            .then(ca.template.cmp(&cb.template))
            .then(ca.kind.cmp(&cb.kind))
            .then(a.cmp(&b))
    });
    order
}

/// Reduced decomposition of the boundary matrix in the current order
pub(crate) struct Vineyard<'a> {
    cells: &'a [Cell],
    /// Cell id at each position
    order: Vec<usize>,
    r: Vec<SparseColumn>,
    v: Vec<SparseColumn>,
    transpositions: usize,
}

impl<'a> Vineyard<'a> {
    pub fn new(cells: &'a [Cell], order: Vec<usize>) -> Self {
        let mut position = vec![0; cells.len()];
        for (p, &id) in order.iter().enumerate() {
            position[id] = p;
        }
        let r = order
            .iter()
            .map(|&id| SparseColumn::from_indices(cells[id].boundary.iter().map(|&g| position[g])))
            .collect();
        let v = (0..order.len()).map(SparseColumn::unit).collect();
        let mut vineyard = Self { cells, order, r, v, transpositions: 0 };
        vineyard.repair();
        vineyard
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn transpositions(&self) -> usize {
        self.transpositions
    }

    /// Left-to-right reduction, recording column operations in V
    fn repair(&mut self) {
        let mut pivots: HashMap<usize, usize> = HashMap::new();
        for j in 0..self.r.len() {
            while let Some(low) = self.r[j].low() {
                match pivots.get(&low) {
                    Some(&k) => {
                        let (rk, vk) = (self.r[k].clone(), self.v[k].clone());
                        self.r[j].add_assign(&rk);
                        self.v[j].add_assign(&vk);
                    }
                    None => {
                        pivots.insert(low, j);
                        break;
                    }
                }
            }
        }
    }

    /// Exchange the cells at positions `i` and `i + 1`
    pub fn transpose(&mut self, i: usize) {
        for matrix in [&mut self.r, &mut self.v] {
            matrix.swap(i, i + 1);
            for column in matrix.iter_mut() {
                column.swap_rows(i, i + 1);
            }
        }
        // keep V upper triangular
        if self.v[i].contains(i + 1) {
            let (ri, vi) = (self.r[i + 1].clone(), self.v[i + 1].clone());
            self.v[i].add_assign(&vi);
            self.r[i].add_assign(&ri);
        }
        self.order.swap(i, i + 1);
        self.transpositions += 1;
        self.repair();
    }

    /// Reach `target` by adjacent transpositions
    pub fn move_to(&mut self, target: &[usize]) {
        let mut rank = vec![0; target.len()];
        for (r, &id) in target.iter().enumerate() {
            rank[id] = r;
        }
        let n = self.order.len();
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..n.saturating_sub(1) {
                if rank[self.order[i]] > rank[self.order[i + 1]] {
                    self.transpose(i);
                    changed = true;
                }
            }
        }
    }

    pub fn template(&self) -> BarcodeTemplate {
        let mut counts: BTreeMap<(usize, Option<usize>), u32> = BTreeMap::new();
        let mut lows = HashSet::new();
        for (j, column) in self.r.iter().enumerate() {
            if let Some(low) = column.low() {
                lows.insert(low);
                let birth = self.cells[self.order[low]].template;
                let death = self.cells[self.order[j]].template;
                *counts.entry((birth, Some(death))).or_default() += 1;
            }
        }
        for (p, &id) in self.order.iter().enumerate() {
            let cell = &self.cells[id];
            if cell.kind == CellKind::Generator && !lows.contains(&p) {
                *counts.entry((cell.template, None)).or_default() += 1;
            }
        }
        BarcodeTemplate::from_counts(counts)
    }
}

/// Template of every face, indexed by face; the outer face gets an empty
/// template. `progress(done, total)` is called once per interior face.
pub(crate) fn face_templates(
    dcel: &Dcel,
    cells: &[Cell],
    template_points: &TemplatePoints,
    progress: &mut dyn FnMut(usize, usize),
) -> Vec<BarcodeTemplate> {
    let total = dcel.faces.len() - 1;
    let mut templates = vec![BarcodeTemplate::default(); dcel.faces.len()];
    if cells.is_empty() || total == 0 {
        progress(total, total);
        return templates;
    }

    let order_of = |f: usize| {
        let (m, c) = dcel.representative(f);
        debug_assert!(m > Exact::zero());
        push_order(cells, template_points, &m, &c)
    };

    let first = 1;
    let mut vineyard = Vineyard::new(cells, order_of(first));
    let mut visited = vec![false; dcel.faces.len()];
    visited[OUTER_FACE] = true;
    visited[first] = true;
    templates[first] = vineyard.template();
    let mut done = 1;
    progress(done, total);

    // (face, its push order, unexplored neighbours)
    let mut stack = vec![(first, vineyard.order().to_vec(), dcel.neighbours(first))];
    while let Some((_, order, pending)) = stack.last_mut() {
        match pending.pop() {
            Some(g) if !visited[g] => {
                visited[g] = true;
                let parent = order.clone();
                if vineyard.order() != parent.as_slice() {
                    vineyard.move_to(&parent);
                }
                let target = order_of(g);
                vineyard.move_to(&target);
                templates[g] = vineyard.template();
                done += 1;
                progress(done, total);
                stack.push((g, target, dcel.neighbours(g)));
            }
            Some(_) => {}
            None => {
                stack.pop();
            }
        }
    }

    debug!(faces = total, transpositions = vineyard.transpositions(), "barcode templates computed");
    templates
}
