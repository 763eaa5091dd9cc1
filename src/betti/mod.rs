//! Template-Point Engine: Bigraded Betti Numbers
//!
//! For a fixed homological degree d, the module M = H_d of the
//! bifiltration has a minimal free resolution
//!
//!   0 → F₂ → F₁ → F₀ → M → 0
//!
//! and ξᵢ(a) counts the generators of Fᵢ at grade a:
//!
//! - ξ₀: births of homology classes
//! - ξ₁: relations among them
//! - ξ₂: relations among relations
//!
//! Grades where any ξᵢ is nonzero are the *template points*. They drive
//! the whole arrangement: anchors are joins of template points.
//!
//! ## Two Implementations
//!
//! - presentation-based: read ξ₀, ξ₁ off a minimal presentation and ξ₂
//!   off the Hilbert function
//! - Koszul-based: dimensions of sums of cycle and boundary spaces at each
//!   grid point, no presentation built
//!
//! Both give identical results.

mod koszul;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

use crate::algebra::DegreeChains;
use crate::bifiltration::grades::exact_to_f64;
use crate::bifiltration::{Bifiltration, Exact, GradeGrid, GridPoint};
use crate::config::{BettiAlgorithm, EngineConfig};
use crate::error::Result;
use crate::presentation::{presentation_of, Presentation};

/// Grade with nonzero bigraded Betti numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplatePoint {
    pub x: usize,
    pub y: usize,
    pub xi0: u32,
    pub xi1: u32,
    pub xi2: u32,
}

impl TemplatePoint {
    pub fn new(grade: GridPoint, xi0: u32, xi1: u32, xi2: u32) -> Self {
        Self { x: grade.x, y: grade.y, xi0, xi1, xi2 }
    }

    pub fn grade(&self) -> GridPoint {
        GridPoint::new(self.x, self.y)
    }

    /// Generators or relations live here; anchors are built from these
    pub fn is_support(&self) -> bool {
        self.xi0 > 0 || self.xi1 > 0
    }
}

/// Output of the Template-Point Engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePoints {
    pub hom_degree: usize,
    pub x_exact: Vec<Exact>,
    pub y_exact: Vec<Exact>,
    /// dim H_d at every grid point, indexed `[x, y]`
    pub homology_dimensions: Array2<usize>,
    /// Sorted lexicographically by (x, y)
    pub points: Vec<TemplatePoint>,
}

impl TemplatePoints {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the template point at `grade`
    pub fn index_of(&self, grade: GridPoint) -> Option<usize> {
        self.points.binary_search_by(|p| p.grade().cmp(&grade)).ok()
    }

    pub fn exact_coordinates(&self, index: usize) -> (&Exact, &Exact) {
        let p = &self.points[index];
        (&self.x_exact[p.x], &self.y_exact[p.y])
    }

    pub fn coordinates(&self, index: usize) -> (f64, f64) {
        let (x, y) = self.exact_coordinates(index);
        (exact_to_f64(x), exact_to_f64(y))
    }

    /// `xi_0:` style listing, one `(x, y, value)` per line
    pub fn write_betti<W: Write>(&self, out: &mut W) -> Result<()> {
        let tables: [(&str, fn(&TemplatePoint) -> u32); 3] =
            [("xi_0", |p| p.xi0), ("xi_1", |p| p.xi1), ("xi_2", |p| p.xi2)];
        for (label, value) in tables {
            writeln!(out, "{}:", label)?;
            for (i, p) in self.points.iter().enumerate() {
                if value(p) > 0 {
                    let (x, y) = self.coordinates(i);
                    writeln!(out, "({}, {}, {})", x, y, value(p))?;
                }
            }
        }
        Ok(())
    }

    /// Nonzero entries of the Hilbert function as `(x, y, dim)`
    pub fn write_dimensions<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Dimensions > 0:")?;
        for ((x, y), &dim) in self.homology_dimensions.indexed_iter() {
            if dim > 0 {
                writeln!(out, "({}, {}, {})", exact_to_f64(&self.x_exact[x]), exact_to_f64(&self.y_exact[y]), dim)?;
            }
        }
        Ok(())
    }
}

/// Computes template points with the configured algorithm
pub struct TemplatePointEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> TemplatePointEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn compute(&self, bifiltration: &Bifiltration) -> Result<TemplatePoints> {
        self.compute_with_presentation(bifiltration).map(|(tp, _)| tp)
    }

    /// Template points plus, for the presentation-based variant, the
    /// minimal presentation built along the way
    pub fn compute_with_presentation(&self, bifiltration: &Bifiltration) -> Result<(TemplatePoints, Option<Presentation>)> {
        bifiltration.verify_monotone()?;
        let grid = GradeGrid::build(bifiltration, self.config.x_bins, self.config.y_bins, self.config.binning.policy());
        let chains = DegreeChains::extract(bifiltration, grid, self.config.hom_degree)?;

        let (template_points, presentation) = match self.config.algorithm {
            BettiAlgorithm::PresentationBased => {
                let presentation = presentation_of(&chains)?;
                (presentation.template_points()?, Some(presentation))
            }
            BettiAlgorithm::KoszulBased => {
                let (hilbert, points) = koszul::koszul_betti(&chains)?;
                let tp = TemplatePoints {
                    hom_degree: chains.degree,
                    x_exact: chains.grid.x_exact.clone(),
                    y_exact: chains.grid.y_exact.clone(),
                    homology_dimensions: hilbert,
                    points,
                };
                (tp, None)
            }
        };

        info!(
            algorithm = ?self.config.algorithm,
            degree = template_points.hom_degree,
            x_grades = template_points.x_exact.len(),
            y_grades = template_points.y_exact.len(),
            template_points = template_points.len(),
            "template points computed"
        );
        Ok((template_points, presentation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bifiltration::Grade;

    fn engine_config(degree: usize, algorithm: BettiAlgorithm) -> EngineConfig {
        EngineConfig { hom_degree: degree, algorithm, ..EngineConfig::default() }
    }

    /// Loop 0-1-2 closing at (1, 1), filled by a triangle at (2, 1) and by
    /// a cone over vertex 3 at (1, 2)
    fn loop_filled_twice() -> Bifiltration {
        let mut b = Bifiltration::builder();
        for v in 0..3 {
            b.add_simplex([v], Grade::new(0, 0));
        }
        b.add_simplex([3], Grade::new(1, 2))
            .add_simplex([0, 1], Grade::new(0, 0))
            .add_simplex([1, 2], Grade::new(1, 0))
            .add_simplex([0, 2], Grade::new(0, 1))
            .add_simplex([0, 1, 2], Grade::new(2, 1));
        for edge in [[0, 3], [1, 3], [2, 3]] {
            b.add_simplex(edge, Grade::new(1, 2));
        }
        for tri in [[0, 1, 3], [1, 2, 3], [0, 2, 3]] {
            b.add_simplex(tri, Grade::new(1, 2));
        }
        b.build().unwrap()
    }

    #[test]
    fn test_xi2_from_two_fillings() {
        let bif = loop_filled_twice();
        for algorithm in [BettiAlgorithm::PresentationBased, BettiAlgorithm::KoszulBased] {
            let tp = TemplatePointEngine::new(&engine_config(1, algorithm)).compute(&bif).unwrap();
            let at = |x, y| tp.points[tp.index_of(GridPoint::new(x, y)).unwrap()];
            assert_eq!(at(1, 1).xi0, 1, "{:?}", algorithm);
            assert_eq!(at(2, 1).xi1, 1);
            assert_eq!(at(1, 2).xi1, 1);
            assert_eq!(at(2, 2).xi2, 1, "two fillings of one loop meet at (2, 2)");
            assert_eq!(tp.len(), 4);

            let tp0 = TemplatePointEngine::new(&engine_config(0, algorithm)).compute(&bif).unwrap();
            let p = tp0.points[tp0.index_of(GridPoint::new(0, 0)).unwrap()];
            assert_eq!(p.xi0, 2);
            assert_eq!(tp0.points[tp0.index_of(GridPoint::new(1, 1)).unwrap()].xi2, 1);
        }
    }

    #[test]
    fn test_algorithms_agree_on_reference() {
        let bif = crate::bifiltration::reference::reference_module().unwrap();
        for degree in 0..3 {
            let a = TemplatePointEngine::new(&engine_config(degree, BettiAlgorithm::PresentationBased))
                .compute(&bif)
                .unwrap();
            let b = TemplatePointEngine::new(&engine_config(degree, BettiAlgorithm::KoszulBased))
                .compute(&bif)
                .unwrap();
            assert_eq!(a, b, "degree {}", degree);
        }
    }

    #[test]
    fn test_reference_degree_zero_points() {
        let bif = crate::bifiltration::reference::reference_module().unwrap();
        let (tp, pres) = TemplatePointEngine::new(&engine_config(0, BettiAlgorithm::PresentationBased))
            .compute_with_presentation(&bif)
            .unwrap();
        assert!(pres.is_some());
        let listed: Vec<((f64, f64), (u32, u32, u32))> =
            (0..tp.len()).map(|i| (tp.coordinates(i), (tp.points[i].xi0, tp.points[i].xi1, tp.points[i].xi2))).collect();
        assert_eq!(
            listed,
            vec![
                ((0.0, 1.5), (1, 0, 0)),
                ((0.5, 0.0), (1, 0, 0)),
                ((1.0, 3.0), (0, 1, 0)),
                ((1.5, 2.5), (0, 1, 0)),
                ((1.5, 3.0), (0, 0, 1)),
                ((2.5, 0.5), (1, 0, 0)),
                ((2.5, 1.0), (0, 1, 0)),
            ]
        );
    }

    #[test]
    fn test_non_monotone_is_computation_error() {
        use crate::bifiltration::Simplex;
        use crate::error::ErrorKind;
        let levels = vec![
            vec![Simplex { vertices: vec![0], grade: Grade::new(3, 3), facets: vec![] }],
            vec![],
        ];
        let mut edges = levels;
        edges[0].push(Simplex { vertices: vec![1], grade: Grade::new(0, 0), facets: vec![] });
        edges[1].push(Simplex { vertices: vec![0, 1], grade: Grade::new(1, 1), facets: vec![0, 1] });
        let bif = Bifiltration::from_levels_unchecked(edges);
        let err = TemplatePointEngine::new(&EngineConfig::default()).compute(&bif).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
    }

    #[test]
    fn test_empty_bifiltration() {
        let bif = Bifiltration::default();
        let tp = TemplatePointEngine::new(&EngineConfig::default()).compute(&bif).unwrap();
        assert!(tp.is_empty());
        let mut out = Vec::new();
        tp.write_betti(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "xi_0:\nxi_1:\nxi_2:\n");
    }
}
