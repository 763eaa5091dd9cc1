//! Module invariants container
//!
//! ```text
//! BIPERSISTENCE_invariants
//! {RunParameters as JSON}
//! {TemplatePoints as JSON}
//! {Arrangement as JSON}
//! ```
//!
//! The leading tag lets a reader tell a container from raw input data
//! before parsing anything else.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::debug;

use crate::arrangement::Arrangement;
use crate::betti::TemplatePoints;
use crate::config::RunParameters;
use crate::error::{BipersError, Result};

pub const INVARIANTS_TAG: &str = "BIPERSISTENCE_invariants";

/// Everything needed to answer queries without recomputation
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInvariants {
    pub parameters: RunParameters,
    pub template_points: TemplatePoints,
    pub arrangement: Arrangement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Invariants,
    RawData,
}

pub fn write_invariants_to<W: Write>(
    out: &mut W,
    parameters: &RunParameters,
    template_points: &TemplatePoints,
    arrangement: &Arrangement,
) -> Result<()> {
    writeln!(out, "{}", INVARIANTS_TAG)?;
    serde_json::to_writer(&mut *out, parameters)?;
    writeln!(out)?;
    serde_json::to_writer(&mut *out, template_points)?;
    writeln!(out)?;
    serde_json::to_writer(&mut *out, arrangement)?;
    writeln!(out)?;
    Ok(())
}

/// Classify content by its first line; consumes that line
pub fn probe_content<R: BufRead>(reader: &mut R) -> Result<ContentKind> {
    let mut first = String::new();
    reader.read_line(&mut first)?;
    if first.trim() == INVARIANTS_TAG {
        Ok(ContentKind::Invariants)
    } else {
        Ok(ContentKind::RawData)
    }
}

pub fn probe_file(path: &Path) -> Result<ContentKind> {
    probe_content(&mut BufReader::new(File::open(path)?))
}

fn next_record<T: DeserializeOwned>(lines: &mut impl Iterator<Item = std::io::Result<String>>, what: &str) -> Result<T> {
    match lines.next() {
        Some(line) => Ok(serde_json::from_str(&line?)?),
        None => Err(BipersError::input(format!("invariants container ends before the {} record", what))),
    }
}

pub fn read_invariants<R: BufRead>(mut reader: R) -> Result<ModuleInvariants> {
    if probe_content(&mut reader)? != ContentKind::Invariants {
        return Err(BipersError::input(format!("missing '{}' tag", INVARIANTS_TAG)));
    }
    let mut lines = reader.lines();
    let parameters: RunParameters = next_record(&mut lines, "run parameters")?;
    parameters.validate()?;
    let template_points: TemplatePoints = next_record(&mut lines, "template points")?;
    let arrangement: Arrangement = next_record(&mut lines, "arrangement")?;
    if arrangement.hom_degree != template_points.hom_degree || arrangement.points.len() != template_points.len() {
        return Err(BipersError::input("arrangement does not belong to the stored template points"));
    }
    debug!(
        template_points = template_points.len(),
        faces = arrangement.num_faces(),
        "invariants container read"
    );
    Ok(ModuleInvariants { parameters, template_points, arrangement })
}

pub fn load_invariants(path: &Path) -> Result<ModuleInvariants> {
    read_invariants(BufReader::new(File::open(path)?))
}
