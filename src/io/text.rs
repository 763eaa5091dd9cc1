//! Plain-text report

use std::io::Write;

use crate::bifiltration::grades::exact_to_f64;
use crate::bifiltration::Exact;
use crate::error::Result;

use super::Artifacts;

fn write_grades<W: Write>(out: &mut W, label: &str, grades: &[Exact]) -> Result<()> {
    let values: Vec<String> = grades.iter().map(|g| exact_to_f64(g).to_string()).collect();
    writeln!(out, "{} [{}]: {}", label, grades.len(), values.join(" "))?;
    Ok(())
}

pub fn write_text_report<W: Write>(out: &mut W, artifacts: &Artifacts<'_>) -> Result<()> {
    let params = artifacts.parameters;
    writeln!(out, "Two-parameter persistence report")?;
    writeln!(out, "homological degree: {}", params.hom_degree)?;
    writeln!(out, "axes: {} / {}", params.x_label, params.y_label)?;
    writeln!(out, "bins: {} x {} ({:?})", params.x_bins, params.y_bins, params.binning)?;
    writeln!(out, "algorithm: {:?}", params.algorithm)?;

    if let Some(tp) = artifacts.template_points {
        writeln!(out)?;
        write_grades(out, &format!("{}-grades", params.x_label), &tp.x_exact)?;
        write_grades(out, &format!("{}-grades", params.y_label), &tp.y_exact)?;
        tp.write_dimensions(out)?;
        writeln!(out, "Betti numbers ({} template points):", tp.len())?;
        tp.write_betti(out)?;
    }

    if let Some(presentation) = artifacts.presentation {
        writeln!(out)?;
        writeln!(out, "Minimal presentation:")?;
        presentation.write_sparse(out)?;
    }

    if let Some(arrangement) = artifacts.arrangement {
        writeln!(out)?;
        let b = arrangement.bounds();
        writeln!(out, "bounds: [{}, {}] x [{}, {}]", b.x_low, b.x_high, b.y_low, b.y_high)?;
        writeln!(
            out,
            "arrangement: {} anchors, {} vertices, {} edges",
            arrangement.anchors.len(),
            arrangement.dcel.vertices.len(),
            arrangement.dcel.num_edges()
        )?;
        arrangement.write_templates(out)?;
    }
    Ok(())
}
