#![allow(dead_code)]

use bipersistence::{Bar, Barcode, Bifiltration, Grade};
use rand::rngs::StdRng;
use rand::Rng;

pub const TOLERANCE: f64 = 1e-9;

/// Random bifiltration on a small integer grid: vertices, then edges and
/// triangles graded at the join of their facets plus a random step
pub fn random_bifiltration(rng: &mut StdRng, vertices: usize, grid: i64) -> Bifiltration {
    let mut builder = Bifiltration::builder();
    let mut grade = Vec::new();
    for v in 0..vertices {
        let g = (rng.gen_range(0..grid), rng.gen_range(0..grid));
        builder.add_simplex([v], Grade::new(g.0, g.1));
        grade.push(g);
    }

    let mut edges = std::collections::HashMap::new();
    for a in 0..vertices {
        for b in a + 1..vertices {
            if rng.gen_bool(0.6) {
                let g = (
                    grade[a].0.max(grade[b].0) + rng.gen_range(0..2),
                    grade[a].1.max(grade[b].1) + rng.gen_range(0..2),
                );
                builder.add_simplex([a, b], Grade::new(g.0, g.1));
                edges.insert((a, b), g);
            }
        }
    }

    for a in 0..vertices {
        for b in a + 1..vertices {
            for c in b + 1..vertices {
                let (Some(ab), Some(bc), Some(ac)) = (edges.get(&(a, b)), edges.get(&(b, c)), edges.get(&(a, c))) else {
                    continue;
                };
                if rng.gen_bool(0.5) {
                    let x = ab.0.max(bc.0).max(ac.0) + rng.gen_range(0..2);
                    let y = ab.1.max(bc.1).max(ac.1) + rng.gen_range(0..2);
                    builder.add_simplex([a, b, c], Grade::new(x, y));
                }
            }
        }
    }
    builder.build().expect("random bifiltration is valid")
}

/// Bars expanded by multiplicity, dropping those shorter than the tolerance
fn expand(barcode: &Barcode) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    for bar in barcode.iter() {
        if bar.death - bar.birth < TOLERANCE {
            continue;
        }
        for _ in 0..bar.multiplicity {
            out.push((bar.birth, bar.death));
        }
    }
    out
}

fn close(a: f64, b: f64) -> bool {
    (a.is_infinite() && b.is_infinite()) || (a - b).abs() < TOLERANCE
}

/// Equal as multisets of intervals, up to the tolerance
pub fn same_barcode(a: &Barcode, b: &Barcode) -> bool {
    let mut rest = expand(b);
    for (birth, death) in expand(a) {
        match rest.iter().position(|&(x, y)| close(x, birth) && close(y, death)) {
            Some(i) => {
                rest.swap_remove(i);
            }
            None => return false,
        }
    }
    rest.is_empty()
}

pub fn bars(list: &[(f64, f64)]) -> Barcode {
    Barcode::from_bars(list.iter().map(|&(b, d)| Bar::new(b, d, 1)))
}
