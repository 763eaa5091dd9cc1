//! Barcodes along a line

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An interval [birth, death) with multiplicity; `death` is
/// `f64::INFINITY` for an essential class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub birth: f64,
    pub death: f64,
    pub multiplicity: u32,
}

impl Bar {
    pub fn new(birth: f64, death: f64, multiplicity: u32) -> Self {
        Self { birth, death, multiplicity }
    }

    pub fn is_essential(&self) -> bool {
        self.death.is_infinite()
    }

    pub fn length(&self) -> f64 {
        self.death - self.birth
    }
}

/// Canonical order: birth ascending, then death descending
fn canonical(a: &Bar, b: &Bar) -> Ordering {
    a.birth.total_cmp(&b.birth).then(b.death.total_cmp(&a.death))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Barcode {
    pub bars: Vec<Bar>,
}

impl Barcode {
    /// Drops bars with infinite birth or no length, merges equal
    /// intervals and sorts canonically
    pub fn from_bars(bars: impl IntoIterator<Item = Bar>) -> Self {
        let mut kept: Vec<Bar> = bars
            .into_iter()
            .filter(|b| b.birth.is_finite() && b.birth < b.death && b.multiplicity > 0)
            .collect();
        kept.sort_by(canonical);

        let mut merged: Vec<Bar> = Vec::with_capacity(kept.len());
        for bar in kept {
            match merged.last_mut() {
                Some(last) if last.birth == bar.birth && last.death == bar.death => {
                    last.multiplicity += bar.multiplicity;
                }
                _ => merged.push(bar),
            }
        }
        Self { bars: merged }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Total number of intervals counted with multiplicity
    pub fn total_multiplicity(&self) -> u32 {
        self.bars.iter().map(|b| b.multiplicity).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }
}
