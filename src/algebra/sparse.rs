//! Sparse F₂ linear algebra
//!
//! Vectors over Z/2Z are sets of nonzero indices. Addition is symmetric
//! difference. The pivot of a vector is its largest index ("low").

use std::collections::{BTreeSet, HashMap};

/// Sparse column over Z/2Z
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SparseColumn {
    /// Non-zero row indices
    rows: BTreeSet<usize>,
}

impl SparseColumn {
    pub fn new() -> Self {
        Self { rows: BTreeSet::new() }
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut column = Self::new();
        for i in indices {
            column.toggle(i);
        }
        column
    }

    pub fn unit(index: usize) -> Self {
        Self { rows: BTreeSet::from([index]) }
    }

    pub fn is_zero(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the lowest (maximum) non-zero index
    pub fn low(&self) -> Option<usize> {
        self.rows.iter().next_back().copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.rows.contains(&index)
    }

    /// Flip one entry
    pub fn toggle(&mut self, index: usize) {
        if !self.rows.remove(&index) {
            self.rows.insert(index);
        }
    }

    /// XOR (symmetric difference) with another column - addition in Z/2Z
    pub fn add_assign(&mut self, other: &SparseColumn) {
        for &row in &other.rows {
            self.toggle(row);
        }
    }

    /// Exchange the entries at `a` and `b`
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if self.contains(a) != self.contains(b) {
            self.toggle(a);
            self.toggle(b);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

/// Echelon form keyed by pivot, with optional tracking of combinations
///
/// Every stored vector has a distinct pivot. `track` records which input
/// vectors (by caller-chosen index) were summed to produce it.
#[derive(Debug, Clone, Default)]
pub struct EchelonBasis {
    pivots: HashMap<usize, (SparseColumn, SparseColumn)>,
}

impl EchelonBasis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    /// Reduce `vector` against the basis. Returns the remainder and the
    /// accumulated tracking; a zero remainder means `vector` is in the span.
    pub fn reduce(&self, mut vector: SparseColumn, mut track: SparseColumn) -> (SparseColumn, SparseColumn) {
        while let Some(low) = vector.low() {
            match self.pivots.get(&low) {
                Some((v, t)) => {
                    vector.add_assign(v);
                    track.add_assign(t);
                }
                None => break,
            }
        }
        (vector, track)
    }

    pub fn in_span(&self, vector: &SparseColumn) -> bool {
        self.reduce(vector.clone(), SparseColumn::new()).0.is_zero()
    }

    /// Insert without tracking; returns `true` if the rank grew
    pub fn insert(&mut self, vector: SparseColumn) -> bool {
        self.insert_tracked(vector, SparseColumn::new())
    }

    /// Insert with tracking; returns `true` if the rank grew
    pub fn insert_tracked(&mut self, vector: SparseColumn, track: SparseColumn) -> bool {
        let (v, t) = self.reduce(vector, track);
        match v.low() {
            Some(low) => {
                self.pivots.insert(low, (v, t));
                true
            }
            None => false,
        }
    }
}

/// Dimension of the span of a family of vectors
pub fn span_dimension<'a>(vectors: impl IntoIterator<Item = &'a SparseColumn>) -> usize {
    let mut basis = EchelonBasis::new();
    vectors.into_iter().filter(|v| basis.insert((*v).clone())).count()
}

/// Basis of the kernel of the matrix whose columns are given with their
/// column indices. Kernel vectors are expressed in those indices.
pub fn kernel_basis<'a>(columns: impl IntoIterator<Item = (usize, &'a SparseColumn)>) -> Vec<SparseColumn> {
    let mut basis = EchelonBasis::new();
    let mut kernel = Vec::new();
    for (index, column) in columns {
        let (v, t) = basis.reduce(column.clone(), SparseColumn::unit(index));
        match v.low() {
            Some(low) => {
                basis.pivots.insert(low, (v, t));
            }
            None => kernel.push(t),
        }
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ops() {
        let mut a = SparseColumn::from_indices([1, 3, 5]);
        let b = SparseColumn::from_indices([3, 4]);
        a.add_assign(&b);
        assert_eq!(a.to_vec(), vec![1, 4, 5]);
        assert_eq!(a.low(), Some(5));
        a.swap_rows(4, 6);
        assert_eq!(a.to_vec(), vec![1, 5, 6]);
        a.swap_rows(5, 6);
        assert_eq!(a.to_vec(), vec![1, 5, 6]);
        // repeated index cancels
        assert!(SparseColumn::from_indices([2, 2]).is_zero());
    }

    #[test]
    fn test_span_dimension() {
        let v = [
            SparseColumn::from_indices([0, 1]),
            SparseColumn::from_indices([1, 2]),
            SparseColumn::from_indices([0, 2]),
            SparseColumn::from_indices([3]),
        ];
        assert_eq!(span_dimension(v.iter()), 3);
    }

    #[test]
    fn test_tracking() {
        let mut basis = EchelonBasis::new();
        assert!(basis.insert_tracked(SparseColumn::from_indices([0, 1]), SparseColumn::unit(0)));
        assert!(basis.insert_tracked(SparseColumn::from_indices([1, 2]), SparseColumn::unit(1)));
        let (rest, track) = basis.reduce(SparseColumn::from_indices([0, 2]), SparseColumn::new());
        assert!(rest.is_zero());
        assert_eq!(track.to_vec(), vec![0, 1]);
        assert!(!basis.insert(SparseColumn::from_indices([0, 2])));
        assert_eq!(basis.rank(), 2);
    }

    #[test]
    fn test_kernel_of_triangle_boundary() {
        // edges 01, 02, 12 over vertices 0, 1, 2
        let cols = [
            SparseColumn::from_indices([0, 1]),
            SparseColumn::from_indices([0, 2]),
            SparseColumn::from_indices([1, 2]),
        ];
        let kernel = kernel_basis(cols.iter().enumerate());
        assert_eq!(kernel.len(), 1);
        assert_eq!(kernel[0].to_vec(), vec![0, 1, 2]);
    }
}
