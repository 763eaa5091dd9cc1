//! Pipeline states, events and observers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::Sender;
use tracing::{debug, info};

/// Pipeline state machine
///
/// ```text
/// Init → BifiltrationLoaded → TemplatePointsReady → MinimalPresentationReady → ArrangementReady
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    Init,
    BifiltrationLoaded,
    TemplatePointsReady,
    MinimalPresentationReady,
    ArrangementReady,
}

impl PipelineState {
    pub fn stage_index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::BifiltrationLoaded => "bifiltration loaded",
            PipelineState::TemplatePointsReady => "template points ready",
            PipelineState::MinimalPresentationReady => "minimal presentation ready",
            PipelineState::ArrangementReady => "arrangement ready",
        };
        write!(f, "{}", name)
    }
}

/// Unit of work an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    LoadBifiltration,
    TemplatePoints,
    MinimalPresentation,
    CriticalLines,
    BarcodeTemplates,
    Arrangement,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LoadBifiltration => "loading bifiltration",
            Stage::TemplatePoints => "computing template points",
            Stage::MinimalPresentation => "computing minimal presentation",
            Stage::CriticalLines => "inserting critical lines",
            Stage::BarcodeTemplates => "computing barcode templates",
            Stage::Arrangement => "building arrangement",
        };
        write!(f, "{}", name)
    }
}

/// `amount` of `max` units done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub amount: usize,
    pub max: usize,
}

/// A state transition (`progress` is `None`) or in-stage progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub stage: Stage,
    pub state: PipelineState,
    pub progress: Option<Progress>,
}

impl PipelineEvent {
    pub fn transition(stage: Stage, state: PipelineState) -> Self {
        Self { stage, state, progress: None }
    }

    pub fn is_transition(&self) -> bool {
        self.progress.is_none()
    }
}

/// Receives pipeline events, always on the thread that called
/// [`Pipeline::run`](super::Pipeline::run)
pub trait PipelineObserver {
    fn notify(&mut self, event: &PipelineEvent);
}

impl<F: FnMut(&PipelineEvent)> PipelineObserver for F {
    fn notify(&mut self, event: &PipelineEvent) {
        self(event)
    }
}

impl PipelineObserver for Sender<PipelineEvent> {
    fn notify(&mut self, event: &PipelineEvent) {
        // a dropped receiver only means nobody is listening
        let _ = self.send(event.clone());
    }
}

/// Writes events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl PipelineObserver for LoggingObserver {
    fn notify(&mut self, event: &PipelineEvent) {
        match event.progress {
            None => info!(stage = %event.stage, state = %event.state, "pipeline state changed"),
            Some(p) => debug!(stage = %event.stage, amount = p.amount, max = p.max, "progress"),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn notify(&mut self, _event: &PipelineEvent) {}
}
