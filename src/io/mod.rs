//! Persistence and reports
//!
//! Output is written to a temporary file next to the target and renamed
//! into place only once the whole artifact is written. The temporary file
//! is removed on every error path when it goes out of scope.

pub mod invariants;
pub mod text;

pub use invariants::{
    load_invariants, probe_content, probe_file, read_invariants, write_invariants_to, ContentKind, ModuleInvariants,
    INVARIANTS_TAG,
};
pub use text::write_text_report;

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::info;

use crate::arrangement::Arrangement;
use crate::betti::TemplatePoints;
use crate::config::{PipelineMode, RunParameters};
use crate::error::{BipersError, Result};
use crate::pipeline::PipelineOutput;
use crate::presentation::Presentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Invariants,
    Text,
}

impl FromStr for OutputFormat {
    type Err = BipersError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "invariants" => Ok(Self::Invariants),
            "text" => Ok(Self::Text),
            other => Err(BipersError::parameter(format!("unsupported output format '{}'", other))),
        }
    }
}

impl OutputFormat {
    /// Invariants containers hold an arrangement, so only full runs fill one
    pub fn check_mode(&self, mode: PipelineMode) -> Result<()> {
        match (self, mode) {
            (OutputFormat::Invariants, PipelineMode::BettiOnly | PipelineMode::PresentationOnly) => Err(
                BipersError::parameter(format!("the invariants format needs a full run, not mode {:?}", mode)),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Invariants => write!(f, "invariants"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Borrowed view of what a run produced
#[derive(Debug, Clone, Copy)]
pub struct Artifacts<'a> {
    pub parameters: &'a RunParameters,
    pub template_points: Option<&'a TemplatePoints>,
    pub presentation: Option<&'a Presentation>,
    pub arrangement: Option<&'a Arrangement>,
}

impl<'a> Artifacts<'a> {
    pub fn from_output(parameters: &'a RunParameters, output: &'a PipelineOutput) -> Self {
        Self {
            parameters,
            template_points: output.template_points.as_deref(),
            presentation: output.presentation.as_deref(),
            arrangement: output.arrangement.as_deref(),
        }
    }
}

pub trait ArtifactWriter {
    fn format(&self) -> OutputFormat;

    fn write_to(&self, out: &mut dyn Write, artifacts: &Artifacts<'_>) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InvariantsWriter;

impl ArtifactWriter for InvariantsWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Invariants
    }

    fn write_to(&self, mut out: &mut dyn Write, artifacts: &Artifacts<'_>) -> Result<()> {
        let (Some(tp), Some(arrangement)) = (artifacts.template_points, artifacts.arrangement) else {
            return Err(BipersError::parameter("the invariants format needs template points and an arrangement"));
        };
        write_invariants_to(&mut out, artifacts.parameters, tp, arrangement)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextWriter;

impl ArtifactWriter for TextWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn write_to(&self, mut out: &mut dyn Write, artifacts: &Artifacts<'_>) -> Result<()> {
        write_text_report(&mut out, artifacts)
    }
}

pub fn writer_for(format: OutputFormat) -> Box<dyn ArtifactWriter> {
    match format {
        OutputFormat::Invariants => Box::new(InvariantsWriter),
        OutputFormat::Text => Box::new(TextWriter),
    }
}

/// Write through a temporary file in the target's directory, then rename
pub fn write_atomic(path: &Path, writer: &dyn ArtifactWriter, artifacts: &Artifacts<'_>) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        writer.write_to(&mut out, artifacts)?;
        out.flush()?;
    }
    tmp.persist(path)?;
    info!(path = %path.display(), format = %writer.format(), "output written");
    Ok(())
}
