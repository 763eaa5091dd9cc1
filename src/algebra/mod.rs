//! Linear algebra over F₂ for the homology engines

pub mod chain;
pub mod sparse;

pub use chain::{DegreeChains, GradedColumn};
pub use sparse::{kernel_basis, span_dimension, EchelonBasis, SparseColumn};
