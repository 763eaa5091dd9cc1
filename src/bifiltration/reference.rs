//! Reference module
//!
//! A small fixed bifiltration (five vertices, seven edges, two triangles)
//! with nontrivial homology in degrees 0 and 1. The demo binary runs the
//! full pipeline on it and the integration tests pin its barcodes.

use super::{Bifiltration, Grade};
use crate::error::Result;

const VERTICES: [(&[usize], &str, &str); 5] = [
    (&[0], "0", "1.5"),
    (&[1], "0.5", "0"),
    (&[2], "1", "1"),
    (&[3], "2.5", "0.5"),
    (&[4], "1.5", "2"),
];

const EDGES: [(&[usize], &str, &str); 7] = [
    (&[0, 1], "1.5", "2.5"),
    (&[1, 2], "1", "1"),
    (&[2, 3], "2.5", "1"),
    (&[1, 3], "3", "2"),
    (&[0, 4], "1.5", "2"),
    (&[2, 4], "2", "2.5"),
    (&[0, 2], "1", "3"),
];

const TRIANGLES: [(&[usize], &str, &str); 2] = [
    (&[1, 2, 3], "3", "2.5"),
    (&[0, 2, 4], "2.5", "3.5"),
];

pub fn reference_module() -> Result<Bifiltration> {
    let mut builder = Bifiltration::builder();
    for (vertices, x, y) in VERTICES.iter().chain(EDGES.iter()).chain(TRIANGLES.iter()) {
        builder.add_simplex(vertices.iter().copied(), Grade::parse(x, y)?);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_builds() {
        let bif = reference_module().unwrap();
        assert_eq!(bif.len(), 14);
        assert_eq!(bif.dimension(), Some(2));
    }
}
