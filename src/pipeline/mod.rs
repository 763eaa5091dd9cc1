//! Pipeline Controller
//!
//! Drives a bifiltration through the engines:
//!
//! 1. verify the bifiltration
//! 2. template points (Template-Point Engine)
//! 3. minimal presentation, reused from step 2 when the
//!    presentation-based algorithm already built it
//! 4. augmented arrangement
//!
//! [`PipelineMode`] selects where the run stops. Every state transition is
//! reported to a [`PipelineObserver`] before the next stage starts. A rayon
//! pool with `num_threads` workers runs the parallel sections; observers
//! are only ever called from the caller's thread.

mod events;

pub use events::{LoggingObserver, NullObserver, PipelineEvent, PipelineObserver, PipelineState, Progress, Stage};

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::info;

use crate::arrangement::{Arrangement, ArrangementBuilder};
use crate::betti::{TemplatePointEngine, TemplatePoints};
use crate::bifiltration::Bifiltration;
use crate::config::{EngineConfig, PipelineMode};
use crate::error::{BipersError, Result};
use crate::presentation::{MinimalPresentationEngine, Presentation};

/// Artifacts of a finished run; what is present depends on the mode
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Terminal state reached
    pub state: PipelineState,
    pub template_points: Option<Arc<TemplatePoints>>,
    pub presentation: Option<Arc<Presentation>>,
    pub arrangement: Option<Arc<Arrangement>>,
}

pub struct Pipeline {
    config: EngineConfig,
}

impl Pipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn thread_pool(&self) -> Result<ThreadPool> {
        ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()
            .map_err(|e| BipersError::computation(format!("cannot start worker pool: {}", e)))
    }

    pub fn run(&self, bifiltration: &Bifiltration, observer: &mut dyn PipelineObserver) -> Result<PipelineOutput> {
        self.config.validate()?;
        let pool = self.thread_pool()?;
        let config = &self.config;

        let mut state = PipelineState::Init;
        let mut advance = |stage: Stage, next: PipelineState, observer: &mut dyn PipelineObserver| {
            state = next;
            info!(%stage, state = %next, "stage finished");
            observer.notify(&PipelineEvent::transition(stage, next));
        };

        bifiltration.verify_monotone()?;
        info!(simplices = bifiltration.len(), dimension = ?bifiltration.dimension(), "bifiltration loaded");
        advance(Stage::LoadBifiltration, PipelineState::BifiltrationLoaded, observer);

        let mut output = PipelineOutput {
            state: PipelineState::BifiltrationLoaded,
            template_points: None,
            presentation: None,
            arrangement: None,
        };

        if config.mode == PipelineMode::PresentationOnly {
            let presentation = pool.install(|| MinimalPresentationEngine::new(config).compute(bifiltration))?;
            advance(Stage::MinimalPresentation, PipelineState::MinimalPresentationReady, observer);
            output.state = PipelineState::MinimalPresentationReady;
            output.presentation = Some(Arc::new(presentation));
            return Ok(output);
        }

        let (template_points, presentation) =
            pool.install(|| TemplatePointEngine::new(config).compute_with_presentation(bifiltration))?;
        advance(Stage::TemplatePoints, PipelineState::TemplatePointsReady, observer);
        output.state = PipelineState::TemplatePointsReady;
        let template_points = Arc::new(template_points);
        output.template_points = Some(Arc::clone(&template_points));
        if config.mode == PipelineMode::BettiOnly {
            return Ok(output);
        }

        let presentation = match presentation {
            Some(p) => p,
            None => pool.install(|| MinimalPresentationEngine::new(config).compute(bifiltration))?,
        };
        advance(Stage::MinimalPresentation, PipelineState::MinimalPresentationReady, observer);
        output.state = PipelineState::MinimalPresentationReady;
        let presentation = Arc::new(presentation);
        output.presentation = Some(Arc::clone(&presentation));

        let arrangement = ArrangementBuilder::new(&template_points, &presentation)?.build_with(
            Some(&pool),
            &mut |stage, progress| {
                observer.notify(&PipelineEvent {
                    stage,
                    state: PipelineState::MinimalPresentationReady,
                    progress: Some(progress),
                })
            },
        )?;
        advance(Stage::Arrangement, PipelineState::ArrangementReady, observer);
        output.state = PipelineState::ArrangementReady;
        output.arrangement = Some(Arc::new(arrangement));
        debug_assert_eq!(state, output.state);
        Ok(output)
    }
}
