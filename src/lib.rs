//! # bipersistence
//!
//! Two-Parameter Persistent Homology: Bigraded Betti Numbers, Minimal
//! Presentations and Augmented Arrangements
//!
//! ## Theoretical Framework
//!
//! A bifiltered simplicial complex gives, in each homological degree d, a
//! persistence module M = H_d over two parameters. Such modules have no
//! barcode, but every line of nonnegative slope through the parameter
//! plane restricts M to a one-parameter module that does. This crate
//! precomputes enough structure to answer those restrictions quickly.
//!
//! ### Invariants
//!
//! 1. **Template points**: the bigraded Betti numbers ξ₀, ξ₁, ξ₂ of M,
//!    computed from a minimal presentation or from Koszul homology
//!
//! 2. **Minimal presentation**: generators and relations of M over F₂
//!
//! 3. **Augmented arrangement**: the subdivision of the space of lines by
//!    the critical lines of the anchors (joins of incomparable template
//!    points), with a barcode template stored in every face
//!
//! ### Queries
//!
//! For a line `-x·sin θ + y·cos θ = offset` the barcode is read off the
//! template of the face holding the line, in O(log n + k) for k bars.
//!
//! ## Usage
//!
//! ```no_run
//! use bipersistence::{barcode, reference_module, EngineConfig, LineQuery, NullObserver, Pipeline};
//!
//! let bifiltration = reference_module().unwrap();
//! let output = Pipeline::new(EngineConfig::default()).run(&bifiltration, &mut NullObserver).unwrap();
//! let arrangement = output.arrangement.unwrap();
//! let bars = barcode(&arrangement, &LineQuery::new(23.0, -0.22).unwrap());
//! println!("{:?}", bars);
//! ```
//!
//! ## References
//!
//! - Lesnick & Wright, "Interactive Visualization of 2-D Persistence
//!   Modules" (2015)
//! - Lesnick & Wright, "Computing Minimal Presentations and Bigraded Betti
//!   Numbers of 2-Parameter Persistent Homology" (2022)
//! - Cohen-Steiner, Edelsbrunner & Morozov, "Vines and Vineyards by
//!   Updating Persistence in Linear Time" (2006)
//! - Edelsbrunner & Harer, "Computational Topology" (2010)

pub mod algebra;
pub mod arrangement;
pub mod betti;
pub mod bifiltration;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod presentation;
pub mod query;

// Re-exports from bifiltration
pub use bifiltration::{
    reference::reference_module,
    Bifiltration,
    BifiltrationBuilder,
    Coordinate,
    Exact,
    Grade,
    GradeGrid,
    GridPoint,
    Simplex,
};

// Re-exports of the engines
pub use betti::{TemplatePoint, TemplatePointEngine, TemplatePoints};
pub use presentation::{MinimalPresentationEngine, Presentation, Relation};
pub use arrangement::{Arrangement, ArrangementBuilder, BarcodeTemplate, Bounds};

// Re-exports from query
pub use query::{barcode, barcodes, bounds, fiber_barcode, Bar, Barcode, LineQuery};

// Re-exports from pipeline
pub use pipeline::{
    LoggingObserver,
    NullObserver,
    Pipeline,
    PipelineEvent,
    PipelineObserver,
    PipelineOutput,
    PipelineState,
    Progress,
};

pub use config::{BettiAlgorithm, BinningPolicy, EngineConfig, PipelineMode, RunParameters};
pub use error::{BipersError, ErrorKind, Result};
pub use io::{ModuleInvariants, OutputFormat};
