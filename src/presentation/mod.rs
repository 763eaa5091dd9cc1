//! Minimal-Presentation Engine
//!
//! Computes a minimal presentation of the persistence module H_d over F₂:
//! generators with grades, and relations (grade + the generators they sum).
//!
//! Minimal means
//!
//! - no relation is a combination of relations at lower or equal grades
//! - no relation involves a generator of its own grade
//!
//! so ξ₀(a) is the number of generators at a and ξ₁(a) the number of
//! relations at a. See [`Presentation::template_points`] for the
//! derivation of ξ₂ from the Hilbert function.

mod reduce;

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, info};

use crate::algebra::{span_dimension, DegreeChains, SparseColumn};
use crate::betti::{TemplatePoint, TemplatePoints};
use crate::bifiltration::grades::exact_to_f64;
use crate::bifiltration::{Bifiltration, Exact, GradeGrid, GridPoint};
use crate::config::EngineConfig;
use crate::error::{BipersError, Result};

/// A relation: the sum of `generators` vanishes from `grade` on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub grade: GridPoint,
    /// Sorted generator indices
    pub generators: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub hom_degree: usize,
    pub x_exact: Vec<Exact>,
    pub y_exact: Vec<Exact>,
    /// Generator grades, sorted
    pub generators: Vec<GridPoint>,
    /// Relations, sorted by grade
    pub relations: Vec<Relation>,
}

impl Presentation {
    pub fn grid(&self) -> GradeGrid {
        GradeGrid { x_exact: self.x_exact.clone(), y_exact: self.y_exact.clone() }
    }

    /// dim M_a = #generators ≤ a − rank(relations ≤ a), indexed `[x, y]`
    pub fn hilbert_function(&self) -> Array2<usize> {
        let (nx, ny) = (self.x_exact.len(), self.y_exact.len());
        let columns: Vec<SparseColumn> = self
            .relations
            .iter()
            .map(|r| SparseColumn::from_indices(r.generators.iter().copied()))
            .collect();

        let rows: Vec<Vec<usize>> = (0..nx)
            .into_par_iter()
            .map(|x| {
                (0..ny)
                    .map(|y| {
                        let a = GridPoint::new(x, y);
                        let gens = self.generators.iter().filter(|g| g.precedes(&a)).count();
                        let rank = span_dimension(
                            self.relations
                                .iter()
                                .zip(&columns)
                                .filter(|(r, _)| r.grade.precedes(&a))
                                .map(|(_, c)| c),
                        );
                        gens - rank
                    })
                    .collect()
            })
            .collect();

        let mut table = Array2::zeros((nx, ny));
        for (x, row) in rows.into_iter().enumerate() {
            for (y, value) in row.into_iter().enumerate() {
                table[[x, y]] = value;
            }
        }
        table
    }

    /// Bigraded Betti numbers read off the presentation
    ///
    /// ξ₀ and ξ₁ count generators and relations. ξ₂ follows from the
    /// mixed difference of the Hilbert function:
    ///
    ///   Δ²dim(a) = ξ₀(a) − ξ₁(a) + ξ₂(a)
    pub fn template_points(&self) -> Result<TemplatePoints> {
        let (nx, ny) = (self.x_exact.len(), self.y_exact.len());
        let hilbert = self.hilbert_function();
        let h = |x: usize, y: usize, dx: usize, dy: usize| -> i64 {
            if x < dx || y < dy {
                0
            } else {
                hilbert[[x - dx, y - dy]] as i64
            }
        };

        let mut points = Vec::new();
        for x in 0..nx {
            for y in 0..ny {
                let a = GridPoint::new(x, y);
                let xi0 = self.generators.iter().filter(|g| **g == a).count() as i64;
                let xi1 = self.relations.iter().filter(|r| r.grade == a).count() as i64;
                let mixed = h(x, y, 0, 0) - h(x, y, 1, 0) - h(x, y, 0, 1) + h(x, y, 1, 1);
                let xi2 = mixed - xi0 + xi1;
                if xi2 < 0 {
                    return Err(BipersError::computation(format!("negative xi_2 at {}", a)));
                }
                if xi0 != 0 || xi1 != 0 || xi2 != 0 {
                    points.push(TemplatePoint::new(a, xi0 as u32, xi1 as u32, xi2 as u32));
                }
            }
        }

        Ok(TemplatePoints {
            hom_degree: self.hom_degree,
            x_exact: self.x_exact.clone(),
            y_exact: self.y_exact.clone(),
            homology_dimensions: hilbert,
            points,
        })
    }

    /// No relation at a generator's own grade and no redundant relation
    pub fn is_minimal(&self) -> bool {
        let own_grade = self
            .relations
            .iter()
            .any(|r| r.generators.iter().any(|&g| self.generators[g] == r.grade));
        if own_grade {
            return false;
        }
        self.relations.iter().enumerate().all(|(i, r)| {
            let below = self
                .relations
                .iter()
                .enumerate()
                .filter(|(j, s)| s.grade.strictly_precedes(&r.grade) || (s.grade == r.grade && *j < i))
                .map(|(_, s)| SparseColumn::from_indices(s.generators.iter().copied()))
                .collect::<Vec<_>>();
            let before = span_dimension(below.iter());
            let column = SparseColumn::from_indices(r.generators.iter().copied());
            span_dimension(below.iter().chain(std::iter::once(&column))) > before
        })
    }

    /// Sparse textual form: grades, then one relation per line
    pub fn write_sparse<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "x-grades")?;
        for x in &self.x_exact {
            writeln!(out, "{}", exact_to_f64(x))?;
        }
        writeln!(out, "y-grades")?;
        for y in &self.y_exact {
            writeln!(out, "{}", exact_to_f64(y))?;
        }
        writeln!(out, "generators: {}", self.generators.len())?;
        for (i, g) in self.generators.iter().enumerate() {
            writeln!(out, "{} ; {}", i, g)?;
        }
        writeln!(out, "relations: {}", self.relations.len())?;
        for r in &self.relations {
            let gens: Vec<String> = r.generators.iter().map(|g| g.to_string()).collect();
            writeln!(out, "{} ; {}", r.grade, gens.join(" "))?;
        }
        Ok(())
    }
}

/// Computes minimal presentations
pub struct MinimalPresentationEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> MinimalPresentationEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn compute(&self, bifiltration: &Bifiltration) -> Result<Presentation> {
        bifiltration.verify_monotone()?;
        let grid = GradeGrid::build(bifiltration, self.config.x_bins, self.config.y_bins, self.config.binning.policy());
        let chains = DegreeChains::extract(bifiltration, grid, self.config.hom_degree)?;
        presentation_of(&chains)
    }
}

pub(crate) fn presentation_of(chains: &DegreeChains) -> Result<Presentation> {
    let generators = reduce::kernel_generators(chains);
    let relations = reduce::boundary_relations(chains, &generators)?;
    debug!(generators = generators.len(), relations = relations.len(), "unminimized presentation");

    let relations = reduce::minimize_relations(relations);
    let grades: Vec<GridPoint> = generators.iter().map(|g| g.grade).collect();
    let minimized = reduce::eliminate_pairs(&grades, relations);

    // re-index surviving generators in grade order
    let mut order = minimized.generators;
    order.sort_by_key(|&g| (grades[g], g));
    let mut remap = vec![usize::MAX; grades.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = new;
    }

    let mut relations: Vec<Relation> = minimized
        .relations
        .into_iter()
        .map(|r| {
            let mut generators: Vec<usize> = r.generators.iter().map(|g| remap[g]).collect();
            generators.sort_unstable();
            Relation { grade: r.grade, generators }
        })
        .collect();
    relations.sort_by(|a, b| (a.grade, &a.generators).cmp(&(b.grade, &b.generators)));

    let presentation = Presentation {
        hom_degree: chains.degree,
        x_exact: chains.grid.x_exact.clone(),
        y_exact: chains.grid.y_exact.clone(),
        generators: order.iter().map(|&g| grades[g]).collect(),
        relations,
    };
    info!(
        generators = presentation.generators.len(),
        relations = presentation.relations.len(),
        degree = presentation.hom_degree,
        "minimal presentation computed"
    );
    Ok(presentation)
}
