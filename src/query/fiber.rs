//! Fiber barcodes straight from the bifiltration
//!
//! Restricting the bifiltration to a line gives a one-parameter
//! filtration: each simplex enters at the push of its grade. The standard
//! algorithm (Edelsbrunner, Letscher, Zomorodian) then gives the barcode.
//! This bypasses the arrangement entirely and serves as a cross-check.

use std::collections::HashMap;

use crate::algebra::SparseColumn;
use crate::bifiltration::Bifiltration;

use super::{Bar, Barcode, LineQuery};

/// A simplex in the restricted filtration
#[derive(Debug, Clone, Copy)]
struct FilteredSimplex {
    /// Position along the line where the simplex appears
    birth: f64,
    dimension: usize,
    /// Index within its dimension
    index: usize,
}

pub fn fiber_barcode(bifiltration: &Bifiltration, degree: usize, line: &LineQuery) -> Barcode {
    let top = match bifiltration.dimension() {
        Some(top) if top >= degree => top.min(degree + 1),
        _ => return Barcode::default(),
    };

    // entry times, monotone along faces; None when the line never gets there
    let mut births: Vec<Vec<Option<f64>>> = Vec::with_capacity(top + 1);
    for dim in 0..=top {
        let level: Vec<Option<f64>> = bifiltration
            .simplices(dim)
            .iter()
            .map(|s| {
                if !s.grade.is_finite() {
                    return None;
                }
                let (x, y) = s.grade.to_f64();
                let own = line.push(x, y);
                if own.is_infinite() {
                    return None;
                }
                let mut t = own;
                for &f in &s.facets {
                    t = t.max(births[dim - 1][f]?);
                }
                Some(t)
            })
            .collect();
        births.push(level);
    }

    let mut simplices: Vec<FilteredSimplex> = births
        .iter()
        .enumerate()
        .flat_map(|(dimension, level)| {
            level
                .iter()
                .enumerate()
                .filter_map(move |(index, b)| b.map(|birth| FilteredSimplex { birth, dimension, index }))
        })
        .collect();

    // Sort by (birth, dimension, index)
    simplices.sort_by(|a, b| {
        a.birth
            .total_cmp(&b.birth)
            .then(a.dimension.cmp(&b.dimension))
            .then(a.index.cmp(&b.index))
    });

    let mut position: HashMap<(usize, usize), usize> = HashMap::new();
    for (p, s) in simplices.iter().enumerate() {
        position.insert((s.dimension, s.index), p);
    }

    // Reduce boundary matrix
    let mut columns: Vec<SparseColumn> = Vec::with_capacity(simplices.len());
    let mut low_to_col: HashMap<usize, usize> = HashMap::new();
    for (col, s) in simplices.iter().enumerate() {
        let mut boundary = if s.dimension == 0 {
            SparseColumn::new()
        } else {
            let facets = &bifiltration.simplices(s.dimension)[s.index].facets;
            SparseColumn::from_indices(facets.iter().filter_map(|&f| position.get(&(s.dimension - 1, f)).copied()))
        };
        while let Some(low) = boundary.low() {
            match low_to_col.get(&low) {
                Some(&pivot) => boundary.add_assign(&columns[pivot]),
                None => break,
            }
        }
        if let Some(low) = boundary.low() {
            low_to_col.insert(low, col);
        }
        columns.push(boundary);
    }

    // Extract persistence pairs in the requested degree
    let mut bars = Vec::new();
    for (col, column) in columns.iter().enumerate() {
        if let Some(low) = column.low() {
            if simplices[low].dimension == degree {
                bars.push(Bar::new(simplices[low].birth, simplices[col].birth, 1));
            }
        }
    }
    for (p, s) in simplices.iter().enumerate() {
        if s.dimension == degree && columns[p].is_zero() && !low_to_col.contains_key(&p) {
            bars.push(Bar::new(s.birth, f64::INFINITY, 1));
        }
    }
    Barcode::from_bars(bars)
}
