//! Bigraded Betti numbers via Koszul homology
//!
//! For each grid point a, with l = a − e₁, b = a − e₂ and lb = a − e₁ − e₂,
//! the Koszul complex of the module at a gives
//!
//! ```text
//! ξ₀(a) = dim M_a − rank(M_l ⊕ M_b → M_a)
//! ξ₂(a) = dim ker(M_lb → M_l ⊕ M_b)
//! ξ₁(a) = dim M_l + dim M_b − rank φ₁ − rank φ₂
//! ```
//!
//! With M_a = Z_a / B_a every rank reduces to a dimension of a sum of
//! subspaces of the d-chains:
//!
//! - rank φ₁ = dim(Z_l + Z_b + B_a) − dim B_a
//! - ξ₂ = dim B_l + dim B_b − dim(B_l + B_b) − dim B_lb
//! - rank φ₂ = dim M_lb − ξ₂
//!
//! The spaces at every grid point are computed in parallel.

use ndarray::Array2;
use rayon::prelude::*;

use crate::algebra::{span_dimension, DegreeChains, SparseColumn};
use crate::bifiltration::GridPoint;
use crate::error::{BipersError, Result};

use super::TemplatePoint;

/// Cycles and boundary generators at one grid point
struct PointSpaces {
    cycles: Vec<SparseColumn>,
    boundaries: Vec<SparseColumn>,
    boundary_rank: usize,
}

impl PointSpaces {
    fn homology(&self) -> i64 {
        self.cycles.len() as i64 - self.boundary_rank as i64
    }
}

fn neighbour<'a>(spaces: &'a [PointSpaces], none: &'a PointSpaces, ny: usize, x: isize, y: isize) -> &'a PointSpaces {
    if x < 0 || y < 0 {
        none
    } else {
        &spaces[x as usize * ny + y as usize]
    }
}

pub(crate) fn koszul_betti(chains: &DegreeChains) -> Result<(Array2<usize>, Vec<TemplatePoint>)> {
    let (nx, ny) = (chains.grid.width(), chains.grid.height());

    let spaces: Vec<PointSpaces> = (0..nx * ny)
        .into_par_iter()
        .map(|k| {
            let a = GridPoint::new(k / ny, k % ny);
            let boundaries = chains.boundaries_at(a);
            let boundary_rank = span_dimension(boundaries.iter());
            PointSpaces { cycles: chains.cycles_at(a), boundaries, boundary_rank }
        })
        .collect();

    let none = PointSpaces { cycles: Vec::new(), boundaries: Vec::new(), boundary_rank: 0 };

    let xi: Vec<Result<(GridPoint, [i64; 3])>> = (0..nx * ny)
        .into_par_iter()
        .map(|k| {
            let (x, y) = ((k / ny) as isize, (k % ny) as isize);
            let here = &spaces[k];
            let left = neighbour(&spaces, &none, ny, x - 1, y);
            let below = neighbour(&spaces, &none, ny, x, y - 1);
            let corner = neighbour(&spaces, &none, ny, x - 1, y - 1);

            let image = span_dimension(left.cycles.iter().chain(&below.cycles).chain(&here.boundaries)) as i64;
            let rank_phi1 = image - here.boundary_rank as i64;
            let xi0 = here.homology() - rank_phi1;

            let joint = span_dimension(left.boundaries.iter().chain(&below.boundaries)) as i64;
            let xi2 = left.boundary_rank as i64 + below.boundary_rank as i64 - joint - corner.boundary_rank as i64;
            let rank_phi2 = corner.homology() - xi2;
            let xi1 = left.homology() + below.homology() - rank_phi1 - rank_phi2;

            let a = GridPoint::new(x as usize, y as usize);
            if xi0 < 0 || xi1 < 0 || xi2 < 0 {
                return Err(BipersError::computation(format!(
                    "negative Betti number at {}: ({}, {}, {})",
                    a, xi0, xi1, xi2
                )));
            }
            Ok((a, [xi0, xi1, xi2]))
        })
        .collect();

    let mut hilbert = Array2::zeros((nx, ny));
    for (k, s) in spaces.iter().enumerate() {
        hilbert[[k / ny, k % ny]] = s.homology() as usize;
    }

    let mut points = Vec::new();
    for entry in xi {
        let (a, [xi0, xi1, xi2]) = entry?;
        if xi0 != 0 || xi1 != 0 || xi2 != 0 {
            points.push(TemplatePoint::new(a, xi0 as u32, xi1 as u32, xi2 as u32));
        }
    }
    Ok((hilbert, points))
}
