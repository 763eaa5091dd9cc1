//! Graded chain data at one homological degree
//!
//! For degree d the engines need two boundary matrices placed on the grid:
//!
//! - ∂_d: columns are the d-simplices, rows the (d-1)-simplices
//! - ∂_{d+1}: columns are the (d+1)-simplices, rows the d-simplices
//!
//! Simplices with an infinite grade never enter the grid and are dropped.
//! The d-simplices are re-indexed so that ∂_{d+1} rows match ∂_d columns.

use crate::bifiltration::{Bifiltration, GradeGrid, GridPoint};
use crate::error::{BipersError, Result};

use super::sparse::{kernel_basis, SparseColumn};

/// A boundary column placed at a grid point
#[derive(Debug, Clone)]
pub struct GradedColumn {
    pub grade: GridPoint,
    pub boundary: SparseColumn,
}

#[derive(Debug, Clone)]
pub struct DegreeChains {
    pub degree: usize,
    pub grid: GradeGrid,
    /// ∂_d, one column per finite d-simplex
    pub cycles_domain: Vec<GradedColumn>,
    /// ∂_{d+1}, one column per finite (d+1)-simplex
    pub boundaries: Vec<GradedColumn>,
}

impl DegreeChains {
    pub fn extract(bifiltration: &Bifiltration, grid: GradeGrid, degree: usize) -> Result<Self> {
        let mut position: Vec<Option<usize>> = Vec::with_capacity(bifiltration.simplices(degree).len());
        let mut cycles_domain = Vec::new();
        for simplex in bifiltration.simplices(degree) {
            match grid.locate(&simplex.grade) {
                Some(grade) => {
                    position.push(Some(cycles_domain.len()));
                    let boundary = if degree == 0 {
                        SparseColumn::new()
                    } else {
                        SparseColumn::from_indices(simplex.facets.iter().copied())
                    };
                    cycles_domain.push(GradedColumn { grade, boundary });
                }
                None => position.push(None),
            }
        }

        let mut boundaries = Vec::new();
        for simplex in bifiltration.simplices(degree + 1) {
            let Some(grade) = grid.locate(&simplex.grade) else {
                continue;
            };
            let mut boundary = SparseColumn::new();
            for &f in &simplex.facets {
                match position.get(f).copied().flatten() {
                    Some(p) => boundary.toggle(p),
                    None => {
                        return Err(BipersError::computation(format!(
                            "simplex {:?} has a facet outside the finite grid",
                            simplex.vertices
                        )))
                    }
                }
            }
            boundaries.push(GradedColumn { grade, boundary });
        }

        Ok(Self { degree, grid, cycles_domain, boundaries })
    }

    /// Basis of Z_a: d-cycles supported on simplices with grade ≤ a
    pub fn cycles_at(&self, a: GridPoint) -> Vec<SparseColumn> {
        kernel_basis(
            self.cycles_domain
                .iter()
                .enumerate()
                .filter(|(_, c)| c.grade.precedes(&a))
                .map(|(i, c)| (i, &c.boundary)),
        )
    }

    /// Generators of B_a: boundaries of (d+1)-simplices with grade ≤ a
    pub fn boundaries_at(&self, a: GridPoint) -> Vec<SparseColumn> {
        self.boundaries
            .iter()
            .filter(|c| c.grade.precedes(&a))
            .map(|c| c.boundary.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bifiltration::{EqualWidth, Grade};

    fn hollow_triangle() -> Bifiltration {
        let mut b = Bifiltration::builder();
        b.add_simplex([0], Grade::new(0, 0))
            .add_simplex([1], Grade::new(0, 0))
            .add_simplex([2], Grade::new(0, 0))
            .add_simplex([0, 1], Grade::new(0, 0))
            .add_simplex([1, 2], Grade::new(1, 0))
            .add_simplex([0, 2], Grade::new(0, 1))
            .add_simplex([0, 1, 2], Grade::parse("2", "inf").unwrap());
        b.build().unwrap()
    }

    #[test]
    fn test_cycles_appear_at_join() {
        let bif = hollow_triangle();
        let grid = GradeGrid::build(&bif, 0, 0, &EqualWidth);
        let chains = DegreeChains::extract(&bif, grid, 1).unwrap();
        assert_eq!(chains.cycles_domain.len(), 3);
        // the triangle has an infinite grade
        assert!(chains.boundaries.is_empty());
        assert!(chains.cycles_at(GridPoint::new(1, 0)).is_empty());
        assert_eq!(chains.cycles_at(GridPoint::new(1, 1)).len(), 1);
    }

    #[test]
    fn test_degree_zero_every_vertex_is_a_cycle() {
        let bif = hollow_triangle();
        let grid = GradeGrid::build(&bif, 0, 0, &EqualWidth);
        let chains = DegreeChains::extract(&bif, grid, 0).unwrap();
        assert_eq!(chains.cycles_at(GridPoint::new(0, 0)).len(), 3);
        assert_eq!(chains.boundaries_at(GridPoint::new(0, 0)).len(), 1);
        assert_eq!(chains.boundaries_at(GridPoint::new(1, 1)).len(), 3);
    }
}
