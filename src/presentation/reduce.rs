//! Construction and minimization of the presentation
//!
//! ## Steps
//!
//! 1. Kernel generators: walk the grid in lexicographic order; at each
//!    grid point a, extend the span of generators at grades strictly below
//!    a by a basis of Z_a. Every new independent cycle is a generator at a.
//! 2. Relations: write the boundary of each (d+1)-simplex in terms of the
//!    generators at grades ≤ its grade.
//! 3. Minimize relations: drop a relation already spanned by kept
//!    relations at strictly lower grades or earlier at its own grade.
//! 4. Eliminate pairs: a relation containing a generator of its own grade
//!    cancels that generator.

use std::collections::{BTreeMap, BTreeSet};

use crate::algebra::{DegreeChains, EchelonBasis, SparseColumn};
use crate::bifiltration::GridPoint;
use crate::error::{BipersError, Result};

/// A cycle chosen as a generator, with its grade
#[derive(Debug, Clone)]
pub(crate) struct CycleGenerator {
    pub grade: GridPoint,
    pub cycle: SparseColumn,
}

/// A relation in generator coordinates
#[derive(Debug, Clone)]
pub(crate) struct RawRelation {
    pub grade: GridPoint,
    pub generators: SparseColumn,
}

// Step 1
pub(crate) fn kernel_generators(chains: &DegreeChains) -> Vec<CycleGenerator> {
    let mut generators: Vec<CycleGenerator> = Vec::new();
    for a in chains.grid.points() {
        let cycles = chains.cycles_at(a);
        if cycles.is_empty() {
            continue;
        }
        let mut span = EchelonBasis::new();
        for g in generators.iter().filter(|g| g.grade.strictly_precedes(&a)) {
            span.insert(g.cycle.clone());
        }
        for z in cycles {
            if span.insert(z.clone()) {
                generators.push(CycleGenerator { grade: a, cycle: z });
            }
        }
    }
    generators
}

// Step 2
pub(crate) fn boundary_relations(chains: &DegreeChains, generators: &[CycleGenerator]) -> Result<Vec<RawRelation>> {
    let mut by_grade: BTreeMap<GridPoint, Vec<&SparseColumn>> = BTreeMap::new();
    for column in &chains.boundaries {
        by_grade.entry(column.grade).or_default().push(&column.boundary);
    }

    let mut relations = Vec::new();
    for (grade, boundaries) in by_grade {
        let mut basis = EchelonBasis::new();
        for (i, g) in generators.iter().enumerate().filter(|(_, g)| g.grade.precedes(&grade)) {
            if !basis.insert_tracked(g.cycle.clone(), SparseColumn::unit(i)) {
                return Err(BipersError::computation(format!(
                    "generator {} at {} is dependent on generators below it",
                    i, grade
                )));
            }
        }
        for boundary in boundaries {
            let (rest, coords) = basis.reduce(boundary.clone(), SparseColumn::new());
            if !rest.is_zero() {
                return Err(BipersError::computation(format!(
                    "boundary at {} is not in the span of the cycles below it",
                    grade
                )));
            }
            relations.push(RawRelation { grade, generators: coords });
        }
    }
    Ok(relations)
}

// Step 3. `relations` arrive sorted by grade
pub(crate) fn minimize_relations(relations: Vec<RawRelation>) -> Vec<RawRelation> {
    let mut kept: Vec<RawRelation> = Vec::new();
    let mut current: Option<(GridPoint, EchelonBasis)> = None;
    for relation in relations {
        let fresh = !matches!(&current, Some((g, _)) if *g == relation.grade);
        if fresh {
            let mut span = EchelonBasis::new();
            for r in kept.iter().filter(|r| r.grade.strictly_precedes(&relation.grade)) {
                span.insert(r.generators.clone());
            }
            current = Some((relation.grade, span));
        }
        if let Some((_, span)) = current.as_mut() {
            if span.insert(relation.generators.clone()) {
                kept.push(relation);
            }
        }
    }
    kept
}

/// Result of step 4: surviving generator indices and relations
pub(crate) struct Minimized {
    pub generators: Vec<usize>,
    pub relations: Vec<RawRelation>,
}

// Step 4
pub(crate) fn eliminate_pairs(generator_grades: &[GridPoint], mut relations: Vec<RawRelation>) -> Minimized {
    let mut alive: BTreeSet<usize> = (0..generator_grades.len()).collect();
    loop {
        let found = relations.iter().enumerate().find_map(|(r, rel)| {
            rel.generators
                .iter()
                .rev()
                .find(|&g| generator_grades[g] == rel.grade)
                .map(|g| (r, g))
        });
        let Some((r, g)) = found else {
            break;
        };

        let pivot = relations.remove(r);
        for other in relations.iter_mut().filter(|o| o.generators.contains(g)) {
            other.generators.add_assign(&pivot.generators);
        }
        relations.retain(|o| !o.generators.is_zero());
        alive.remove(&g);
    }
    Minimized { generators: alive.into_iter().collect(), relations }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(x: usize, y: usize, gens: &[usize]) -> RawRelation {
        RawRelation { grade: GridPoint::new(x, y), generators: SparseColumn::from_indices(gens.iter().copied()) }
    }

    #[test]
    fn test_minimize_drops_redundant() {
        let relations = vec![rel(0, 1, &[0]), rel(1, 0, &[1]), rel(1, 1, &[0, 1]), rel(1, 1, &[0])];
        let kept = minimize_relations(relations);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.grade != GridPoint::new(1, 1)));
    }

    #[test]
    fn test_minimize_keeps_independent_at_same_grade() {
        let relations = vec![rel(1, 1, &[0]), rel(1, 1, &[1]), rel(1, 1, &[0, 1])];
        assert_eq!(minimize_relations(relations).len(), 2);
    }

    #[test]
    fn test_eliminate_pairs() {
        // generator 1 is killed at its own grade
        let grades = [GridPoint::new(0, 0), GridPoint::new(1, 1), GridPoint::new(0, 2)];
        let relations = vec![rel(1, 1, &[0, 1]), rel(1, 2, &[1, 2])];
        let out = eliminate_pairs(&grades, relations);
        assert_eq!(out.generators, vec![0, 2]);
        assert_eq!(out.relations.len(), 1);
        assert_eq!(out.relations[0].generators.to_vec(), vec![0, 2]);
    }
}
