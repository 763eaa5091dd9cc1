//! Arrangement Builder: the Augmented Arrangement
//!
//! A line y = m·x + c of nonnegative slope is the point (m, c) of the dual
//! plane. The barcode of the module along a line only changes, up to the
//! positions of its endpoints, when the line crosses an anchor. The dual
//! critical lines of the anchors therefore cut the dual plane into faces
//! with constant *barcode templates*: bars whose endpoints are indices of
//! template points. A query maps a template to real numbers by pushing the
//! template points onto the query line.
//!
//! ## Construction
//!
//! 1. anchors from the template points
//! 2. the dual box holding every crossing (parallel)
//! 3. the DCEL, one critical line at a time (serial)
//! 4. barcode templates by a depth-first vineyard walk over the faces
//! 5. the slab point-location index
//!
//! Zero template points give a single face with an empty template.

pub(crate) mod anchors;
pub mod dcel;
pub mod location;
pub mod vineyard;

pub use anchors::Anchor;
pub use dcel::{Dcel, OUTER_FACE};
pub use location::{Slab, SlabIndex};
pub use vineyard::{BarcodeTemplate, TemplateBar};

use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

use crate::betti::TemplatePoints;
use crate::bifiltration::grades::exact_to_f64;
use crate::error::{BipersError, Result};
use crate::pipeline::{Progress, Stage};
use crate::presentation::Presentation;
use crate::query::{format_general, LineQuery};

use anchors::{anchor_grades, dual_box, CriticalLine};
use dcel::DcelBuilder;

/// Extent of the template points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_low: f64,
    pub y_low: f64,
    pub x_high: f64,
    pub y_high: f64,
}

impl Bounds {
    /// Bounding box of `points`; all zero when there are none
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let Some(&(x0, y0)) = points.first() else {
            return Self::default();
        };
        points.iter().fold(Self { x_low: x0, y_low: y0, x_high: x0, y_high: y0 }, |b, &(x, y)| Self {
            x_low: b.x_low.min(x),
            y_low: b.y_low.min(y),
            x_high: b.x_high.max(x),
            y_high: b.y_high.max(y),
        })
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x_low <= x && x <= self.x_high && self.y_low <= y && y <= self.y_high
    }
}

/// The augmented arrangement of one homological degree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrangement {
    pub hom_degree: usize,
    /// Template-point coordinates, indexed like the template points
    pub points: Vec<(f64, f64)>,
    pub anchors: Vec<Anchor>,
    pub dcel: Dcel,
    /// Barcode template of each face; empty for the outer face
    pub templates: Vec<BarcodeTemplate>,
    pub location: SlabIndex,
    pub bounds: Bounds,
}

impl Arrangement {
    /// Interior faces
    pub fn num_faces(&self) -> usize {
        self.dcel.faces.len() - 1
    }

    /// Face holding the dual point of `line`
    pub fn locate(&self, line: &LineQuery) -> usize {
        self.location.locate(line, &self.anchors)
    }

    pub fn template(&self, face: usize) -> &BarcodeTemplate {
        &self.templates[face]
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// One line per interior face: `face <k>: <birth> <death|inf> x<mult>, ...`
    /// in template-point coordinates
    pub fn write_templates<W: Write>(&self, out: &mut W) -> Result<()> {
        let point = |i: usize| {
            let (x, y) = self.points[i];
            format!("({}, {})", format_general(x), format_general(y))
        };
        writeln!(out, "Barcode templates ({} faces):", self.num_faces())?;
        for (face, template) in self.templates.iter().enumerate().skip(1) {
            let bars: Vec<String> = template
                .bars
                .iter()
                .map(|b| {
                    let death = b.death.map_or_else(|| "inf".to_string(), point);
                    format!("{} {} x{}", point(b.birth), death, b.multiplicity)
                })
                .collect();
            writeln!(out, "face {}: {}", face, bars.join(", "))?;
        }
        Ok(())
    }
}

/// Builds the arrangement from template points and the minimal
/// presentation of the same module
pub struct ArrangementBuilder<'a> {
    template_points: &'a TemplatePoints,
    presentation: &'a Presentation,
}

impl<'a> ArrangementBuilder<'a> {
    pub fn new(template_points: &'a TemplatePoints, presentation: &'a Presentation) -> Result<Self> {
        if template_points.hom_degree != presentation.hom_degree {
            return Err(BipersError::computation(format!(
                "template points are in degree {} but the presentation is in degree {}",
                template_points.hom_degree, presentation.hom_degree
            )));
        }
        if template_points.x_exact != presentation.x_exact || template_points.y_exact != presentation.y_exact {
            return Err(BipersError::computation("template points and presentation use different grade grids"));
        }
        Ok(Self { template_points, presentation })
    }

    pub fn build(&self) -> Result<Arrangement> {
        self.build_with(None, &mut |_, _| {})
    }

    /// Parallel precomputation runs on `pool` when given; line insertion,
    /// the template walk and every `progress` call stay on this thread.
    pub fn build_with(&self, pool: Option<&ThreadPool>, progress: &mut dyn FnMut(Stage, Progress)) -> Result<Arrangement> {
        let tp = self.template_points;
        let grades = anchor_grades(tp);
        let lines: Vec<CriticalLine> = grades
            .iter()
            .enumerate()
            .map(|(i, g)| CriticalLine::new(i, &tp.x_exact[g.x], &tp.y_exact[g.y]))
            .collect();

        let dual = match pool {
            Some(pool) => pool.install(|| dual_box(&lines)),
            None => dual_box(&lines),
        };

        let mut builder = DcelBuilder::new(&dual);
        for (i, line) in lines.iter().enumerate() {
            builder.insert(line)?;
            progress(Stage::CriticalLines, Progress { amount: i + 1, max: lines.len() });
        }
        let dcel = builder.finish();

        let cells = vineyard::cells_from(self.presentation, tp)?;
        let templates = vineyard::face_templates(&dcel, &cells, tp, &mut |done, total| {
            progress(Stage::BarcodeTemplates, Progress { amount: done, max: total })
        });
        let location = SlabIndex::build(&dcel)?;

        let points: Vec<(f64, f64)> = (0..tp.len()).map(|i| tp.coordinates(i)).collect();
        let anchors = grades
            .iter()
            .map(|g| Anchor { grade: *g, x: exact_to_f64(&tp.x_exact[g.x]), y: exact_to_f64(&tp.y_exact[g.y]) })
            .collect();

        let arrangement = Arrangement {
            hom_degree: tp.hom_degree,
            bounds: Bounds::from_points(&points),
            points,
            anchors,
            dcel,
            templates,
            location,
        };
        info!(
            degree = arrangement.hom_degree,
            anchors = arrangement.anchors.len(),
            vertices = arrangement.dcel.vertices.len(),
            edges = arrangement.dcel.num_edges(),
            faces = arrangement.num_faces(),
            "arrangement built"
        );
        Ok(arrangement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betti::TemplatePointEngine;
    use crate::bifiltration::reference::reference_module;
    use crate::bifiltration::{Bifiltration, Grade};
    use crate::config::EngineConfig;

    fn arrangement_of(bif: &Bifiltration, degree: usize) -> Arrangement {
        let config = EngineConfig { hom_degree: degree, ..EngineConfig::default() };
        let (tp, pres) = TemplatePointEngine::new(&config).compute_with_presentation(bif).unwrap();
        let pres = pres.unwrap();
        ArrangementBuilder::new(&tp, &pres).unwrap().build().unwrap()
    }

    #[test]
    fn test_empty_module_one_face() {
        let mut b = Bifiltration::builder();
        b.add_simplex([0], Grade::new(0, 0));
        let arrangement = arrangement_of(&b.build().unwrap(), 1);
        assert_eq!(arrangement.num_faces(), 1);
        assert!(arrangement.template(1).is_empty());
        assert_eq!(arrangement.bounds(), Bounds::default());
    }

    #[test]
    fn test_reference_faces_cover_lines() {
        let arrangement = arrangement_of(&reference_module().unwrap(), 0);
        assert!(arrangement.num_faces() > 1);
        assert_eq!(arrangement.templates.len(), arrangement.dcel.faces.len());
        let vertices = arrangement.dcel.vertices.len() as i64;
        let edges = arrangement.dcel.num_edges() as i64;
        let faces = arrangement.dcel.faces.len() as i64;
        assert_eq!(vertices - edges + faces, 2);
        for face in 1..arrangement.dcel.faces.len() {
            let template = arrangement.template(face);
            let essential: u32 = template.bars.iter().filter(|b| b.death.is_none()).map(|b| b.multiplicity).sum();
            // H_0 of the reference complex has three generators merging into one class
            assert_eq!(essential, 1, "face {}", face);
        }
        for &(x, y) in &arrangement.points {
            assert!(arrangement.bounds.contains(x, y));
        }
    }

    #[test]
    fn test_mismatched_degrees_rejected() {
        let bif = reference_module().unwrap();
        let tp0 = TemplatePointEngine::new(&EngineConfig::default()).compute(&bif).unwrap();
        let config = EngineConfig { hom_degree: 1, ..EngineConfig::default() };
        let (_, pres1) = TemplatePointEngine::new(&config).compute_with_presentation(&bif).unwrap();
        assert!(ArrangementBuilder::new(&tp0, &pres1.unwrap()).is_err());
    }

    #[test]
    fn test_progress_reported() {
        let bif = reference_module().unwrap();
        let config = EngineConfig::default();
        let (tp, pres) = TemplatePointEngine::new(&config).compute_with_presentation(&bif).unwrap();
        let pres = pres.unwrap();
        let mut seen = Vec::new();
        let arrangement = ArrangementBuilder::new(&tp, &pres)
            .unwrap()
            .build_with(None, &mut |stage, p| seen.push((stage, p)))
            .unwrap();
        let lines: Vec<_> = seen.iter().filter(|(s, _)| *s == Stage::CriticalLines).collect();
        assert_eq!(lines.len(), arrangement.anchors.len());
        let last = seen.last().unwrap();
        assert_eq!(last.0, Stage::BarcodeTemplates);
        assert_eq!(last.1, Progress { amount: arrangement.num_faces(), max: arrangement.num_faces() });
    }
}
