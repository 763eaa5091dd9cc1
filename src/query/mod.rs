//! Query Engine
//!
//! Barcodes along lines of nonnegative slope, answered from a built
//! [`Arrangement`]: locate the face of the line's dual point, then map the
//! face's barcode template through the push map of the line.
//!
//! Ties (a line through an anchor) behave as if the line's offset were
//! infinitesimally larger, or smaller for a vertical line, so that the
//! anchor's own push stays finite.

mod barcode;
mod batch;
mod fiber;
mod line;

pub use barcode::{Bar, Barcode};
pub use batch::{format_barcode_line, format_general, parse_query_batch, read_query_batch};
pub use fiber::fiber_barcode;
pub use line::LineQuery;

use rayon::prelude::*;

use crate::arrangement::{Arrangement, Bounds};

/// Barcode of the restriction of the module to `line`
pub fn barcode(arrangement: &Arrangement, line: &LineQuery) -> Barcode {
    let template = arrangement.template(arrangement.locate(line));
    let push = |index: usize| {
        let (x, y) = arrangement.points[index];
        line.push(x, y)
    };
    Barcode::from_bars(template.bars.iter().map(|bar| {
        let death = bar.death.map_or(f64::INFINITY, push);
        Bar::new(push(bar.birth), death, bar.multiplicity)
    }))
}

pub fn bounds(arrangement: &Arrangement) -> Bounds {
    arrangement.bounds
}

/// One barcode per query, in request order
pub fn barcodes(arrangement: &Arrangement, lines: &[LineQuery]) -> Vec<Barcode> {
    lines.par_iter().map(|line| barcode(arrangement, line)).collect()
}
