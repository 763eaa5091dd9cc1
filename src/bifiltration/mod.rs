//! Bifiltration: the engine's input object
//!
//! A one-critical bifiltered simplicial complex. Every simplex carries a
//! [`Grade`] and the indices of its facets in the dimension below.
//!
//! ## Invariants
//!
//! - vertex lists are non-empty, sorted and free of repeats
//! - every facet of a simplex is present
//! - monotonicity: grade(facet) ≤ grade(simplex) coordinatewise
//!
//! [`BifiltrationBuilder`] checks all three and reports `InputData`
//! errors. Trusted readers may skip the checks with
//! [`Bifiltration::from_levels_unchecked`]; the engines re-verify
//! monotonicity before computing.

pub mod grades;
pub mod grid;
pub mod reference;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{BipersError, Result};
pub use grades::{Coordinate, Exact, Grade};
pub use grid::{BinPolicy, EqualOccupancy, EqualWidth, GradeGrid, GridPoint};

/// A graded simplex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simplex {
    /// Vertex indices (sorted)
    pub vertices: Vec<usize>,
    /// Bigrade at which the simplex appears
    pub grade: Grade,
    /// Indices of the facets among the simplices one dimension lower
    pub facets: Vec<usize>,
}

impl Simplex {
    pub fn dimension(&self) -> usize {
        self.vertices.len() - 1
    }
}

/// Simplices grouped by dimension
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bifiltration {
    levels: Vec<Vec<Simplex>>,
}

impl Bifiltration {
    pub fn builder() -> BifiltrationBuilder {
        BifiltrationBuilder::default()
    }

    /// Assemble from per-dimension simplex lists without validation
    pub fn from_levels_unchecked(levels: Vec<Vec<Simplex>>) -> Self {
        Self { levels }
    }

    /// Top dimension, `None` for the empty complex
    pub fn dimension(&self) -> Option<usize> {
        self.levels.iter().rposition(|level| !level.is_empty())
    }

    pub fn simplices(&self, dim: usize) -> &[Simplex] {
        self.levels.get(dim).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Simplex> {
        self.levels.iter().flatten()
    }

    /// First violation of grade monotonicity, as a message
    pub fn monotonicity_violation(&self) -> Option<String> {
        for (dim, level) in self.levels.iter().enumerate().skip(1) {
            let below = self.simplices(dim - 1);
            for simplex in level {
                for &f in &simplex.facets {
                    let Some(facet) = below.get(f) else {
                        return Some(format!("simplex {:?} refers to missing facet {}", simplex.vertices, f));
                    };
                    if !facet.grade.le(&simplex.grade) {
                        return Some(format!(
                            "facet {:?} at {} is not below simplex {:?} at {}",
                            facet.vertices, facet.grade, simplex.vertices, simplex.grade
                        ));
                    }
                }
            }
        }
        None
    }

    /// Engine-side check: a violation here is an internal inconsistency
    pub fn verify_monotone(&self) -> Result<()> {
        match self.monotonicity_violation() {
            Some(msg) => Err(BipersError::computation(format!("grade monotonicity violated: {}", msg))),
            None => Ok(()),
        }
    }
}

/// Collects graded simplices and validates them into a [`Bifiltration`]
#[derive(Debug, Clone, Default)]
pub struct BifiltrationBuilder {
    entries: Vec<(Vec<usize>, Grade)>,
}

impl BifiltrationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_simplex(&mut self, vertices: impl IntoIterator<Item = usize>, grade: Grade) -> &mut Self {
        let mut vertices: Vec<usize> = vertices.into_iter().collect();
        vertices.sort_unstable();
        self.entries.push((vertices, grade));
        self
    }

    pub fn build(&self) -> Result<Bifiltration> {
        let mut levels: Vec<Vec<(Vec<usize>, Grade)>> = Vec::new();
        for (vertices, grade) in &self.entries {
            if vertices.is_empty() {
                return Err(BipersError::input("simplex with no vertices"));
            }
            if vertices.windows(2).any(|w| w[0] == w[1]) {
                return Err(BipersError::input(format!("simplex {:?} repeats a vertex", vertices)));
            }
            let dim = vertices.len() - 1;
            if levels.len() <= dim {
                levels.resize_with(dim + 1, Vec::new);
            }
            levels[dim].push((vertices.clone(), grade.clone()));
        }

        let mut built: Vec<Vec<Simplex>> = Vec::with_capacity(levels.len());
        let mut previous: HashMap<Vec<usize>, usize> = HashMap::new();
        for (dim, mut level) in levels.into_iter().enumerate() {
            level.sort_by(|a, b| a.0.cmp(&b.0));
            if let Some(w) = level.windows(2).find(|w| w[0].0 == w[1].0) {
                return Err(BipersError::input(format!("duplicate simplex {:?}", w[0].0)));
            }

            let mut simplices = Vec::with_capacity(level.len());
            for (vertices, grade) in level {
                let mut facets = Vec::new();
                if dim > 0 {
                    for i in 0..vertices.len() {
                        let mut face = vertices.clone();
                        face.remove(i);
                        match previous.get(&face) {
                            Some(&idx) => facets.push(idx),
                            None => {
                                return Err(BipersError::input(format!(
                                    "simplex {:?} is missing its facet {:?}",
                                    vertices, face
                                )))
                            }
                        }
                    }
                }
                simplices.push(Simplex { vertices, grade, facets });
            }

            previous = simplices.iter().enumerate().map(|(i, s)| (s.vertices.clone(), i)).collect();
            built.push(simplices);
        }

        let bifiltration = Bifiltration { levels: built };
        if let Some(msg) = bifiltration.monotonicity_violation() {
            return Err(BipersError::input(format!("grade monotonicity violated: {}", msg)));
        }
        debug!(simplices = bifiltration.len(), dimension = ?bifiltration.dimension(), "bifiltration built");
        Ok(bifiltration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_build_triangle() {
        let mut b = Bifiltration::builder();
        b.add_simplex([0], Grade::new(0, 0))
            .add_simplex([1], Grade::new(1, 0))
            .add_simplex([2], Grade::new(0, 1))
            .add_simplex([0, 1], Grade::new(1, 0))
            .add_simplex([1, 2], Grade::new(1, 1))
            .add_simplex([2, 0], Grade::new(0, 1))
            .add_simplex([2, 1, 0], Grade::new(2, 2));
        let bif = b.build().unwrap();
        assert_eq!(bif.len(), 7);
        assert_eq!(bif.dimension(), Some(2));
        assert_eq!(bif.simplices(1)[1].vertices, vec![0, 2]);
        let tri = &bif.simplices(2)[0];
        assert_eq!(tri.facets.len(), 3);
        assert!(bif.verify_monotone().is_ok());
    }

    #[test]
    fn test_missing_facet() {
        let mut b = Bifiltration::builder();
        b.add_simplex([0], Grade::new(0, 0)).add_simplex([0, 1], Grade::new(1, 1));
        let err = b.build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputData);
    }

    #[test]
    fn test_non_monotone_rejected() {
        let mut b = Bifiltration::builder();
        b.add_simplex([0], Grade::new(0, 2))
            .add_simplex([1], Grade::new(0, 0))
            .add_simplex([0, 1], Grade::new(1, 1));
        let err = b.build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputData);
        assert!(err.to_string().contains("monotonicity"));
    }

    #[test]
    fn test_duplicates_and_repeats() {
        let mut b = Bifiltration::builder();
        b.add_simplex([0], Grade::new(0, 0)).add_simplex([0], Grade::new(1, 1));
        assert!(b.build().is_err());

        let mut b = Bifiltration::builder();
        b.add_simplex([3, 3], Grade::new(0, 0));
        assert!(b.build().is_err());
    }

    #[test]
    fn test_unchecked_then_verified() {
        let vertex = |v: usize, x: i32, y: i32| Simplex { vertices: vec![v], grade: Grade::new(x, y), facets: vec![] };
        let edge = Simplex { vertices: vec![0, 1], grade: Grade::new(0, 0), facets: vec![0, 1] };
        let bif = Bifiltration::from_levels_unchecked(vec![vec![vertex(0, 1, 0), vertex(1, 0, 0)], vec![edge]]);
        let err = bif.verify_monotone().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
    }
}
