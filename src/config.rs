//! Configuration
//!
//! [`EngineConfig`] holds what the engines need. [`RunParameters`] is the
//! persisted record written at the head of an invariants container; it adds
//! the descriptive fields (labels, input data type) and is validated before
//! any computation starts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bifiltration::{BinPolicy, EqualOccupancy, EqualWidth};
use crate::error::{BipersError, Result};

/// Template-point algorithm variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BettiAlgorithm {
    #[default]
    PresentationBased,
    KoszulBased,
}

impl FromStr for BettiAlgorithm {
    type Err = BipersError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "presentation" => Ok(Self::PresentationBased),
            "koszul" => Ok(Self::KoszulBased),
            other => Err(BipersError::parameter(format!("unsupported Betti algorithm '{}'", other))),
        }
    }
}

/// Grade-grid coarsening policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinningPolicy {
    #[default]
    EqualWidth,
    EqualOccupancy,
}

impl BinningPolicy {
    pub fn policy(&self) -> &'static dyn BinPolicy {
        match self {
            BinningPolicy::EqualWidth => &EqualWidth,
            BinningPolicy::EqualOccupancy => &EqualOccupancy,
        }
    }
}

impl FromStr for BinningPolicy {
    type Err = BipersError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "width" | "equal-width" => Ok(Self::EqualWidth),
            "occupancy" | "equal-occupancy" => Ok(Self::EqualOccupancy),
            other => Err(BipersError::parameter(format!("unsupported binning policy '{}'", other))),
        }
    }
}

/// Where the pipeline stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PipelineMode {
    /// Through the arrangement
    #[default]
    Full,
    /// Stop once template points are known
    BettiOnly,
    /// Skip template points and the arrangement
    PresentationOnly,
}

impl FromStr for PipelineMode {
    type Err = BipersError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(Self::Full),
            "betti" | "betti-only" => Ok(Self::BettiOnly),
            "presentation" | "presentation-only" => Ok(Self::PresentationOnly),
            other => Err(BipersError::parameter(format!("unsupported pipeline mode '{}'", other))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Homological degree d
    pub hom_degree: usize,
    /// Bins on the x axis (0 = no binning)
    pub x_bins: usize,
    /// Bins on the y axis (0 = no binning)
    pub y_bins: usize,
    pub binning: BinningPolicy,
    pub algorithm: BettiAlgorithm,
    /// Worker threads (0 = rayon default)
    pub num_threads: usize,
    pub mode: PipelineMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hom_degree: 0,
            x_bins: 0,
            y_bins: 0,
            binning: BinningPolicy::EqualWidth,
            algorithm: BettiAlgorithm::PresentationBased,
            num_threads: 0,
            mode: PipelineMode::Full,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.x_bins == 1 || self.y_bins == 1 {
            return Err(BipersError::parameter("a bin count of 1 collapses the axis; use 0 to disable binning"));
        }
        Ok(())
    }
}

/// Kind of raw input the bifiltration was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataType {
    Points,
    PointsWithFunction,
    Metric,
    MetricWithFunction,
    #[default]
    Bifiltration,
    FiniteRepresentation,
}

impl DataType {
    pub fn has_function_values(&self) -> bool {
        matches!(self, DataType::PointsWithFunction | DataType::MetricWithFunction)
    }
}

impl FromStr for DataType {
    type Err = BipersError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "points" => Ok(Self::Points),
            "points_fn" => Ok(Self::PointsWithFunction),
            "metric" => Ok(Self::Metric),
            "metric_fn" => Ok(Self::MetricWithFunction),
            "bifiltration" => Ok(Self::Bifiltration),
            "firep" => Ok(Self::FiniteRepresentation),
            other => Err(BipersError::parameter(format!("unsupported data type '{}'", other))),
        }
    }
}

/// Second filtration parameter for point or metric data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FiltrationKind {
    #[default]
    Degree,
    Function,
}

impl FromStr for FiltrationKind {
    type Err = BipersError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "degree" => Ok(Self::Degree),
            "function" => Ok(Self::Function),
            other => Err(BipersError::parameter(format!("unsupported filtration kind '{}'", other))),
        }
    }
}

impl fmt::Display for FiltrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiltrationKind::Degree => write!(f, "degree"),
            FiltrationKind::Function => write!(f, "function"),
        }
    }
}

/// Run parameters, persisted ahead of the computed invariants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    pub hom_degree: usize,
    pub x_bins: usize,
    pub y_bins: usize,
    pub binning: BinningPolicy,
    pub algorithm: BettiAlgorithm,
    pub num_threads: usize,
    pub x_label: String,
    pub y_label: String,
    pub data_type: DataType,
    pub filtration: FiltrationKind,
    /// 0 (silent) to 10 (everything)
    pub verbosity: u8,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            hom_degree: 0,
            x_bins: 0,
            y_bins: 0,
            binning: BinningPolicy::EqualWidth,
            algorithm: BettiAlgorithm::PresentationBased,
            num_threads: 0,
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            data_type: DataType::Bifiltration,
            filtration: FiltrationKind::Degree,
            verbosity: 2,
        }
    }
}

impl RunParameters {
    pub const MAX_VERBOSITY: u8 = 10;

    pub fn validate(&self) -> Result<()> {
        if self.verbosity > Self::MAX_VERBOSITY {
            return Err(BipersError::parameter(format!(
                "verbosity must be between 0 and {}, got {}",
                Self::MAX_VERBOSITY,
                self.verbosity
            )));
        }
        if self.x_label.trim().is_empty() || self.y_label.trim().is_empty() {
            return Err(BipersError::parameter("axis labels must not be empty"));
        }
        if self.filtration == FiltrationKind::Function && !self.data_type.has_function_values() {
            return Err(BipersError::parameter(format!(
                "a function filtration needs function values, but the data type is {:?}",
                self.data_type
            )));
        }
        self.engine_config().validate()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            hom_degree: self.hom_degree,
            x_bins: self.x_bins,
            y_bins: self.y_bins,
            binning: self.binning,
            algorithm: self.algorithm,
            num_threads: self.num_threads,
            mode: PipelineMode::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(RunParameters::default().validate().is_ok());
    }

    #[test]
    fn test_verbosity_range() {
        let params = RunParameters { verbosity: 11, ..RunParameters::default() };
        assert_eq!(params.validate().unwrap_err().kind(), ErrorKind::Parameter);
    }

    #[test]
    fn test_function_filtration_needs_values() {
        let params = RunParameters {
            data_type: DataType::Points,
            filtration: FiltrationKind::Function,
            ..RunParameters::default()
        };
        assert!(params.validate().is_err());

        let params = RunParameters {
            data_type: DataType::PointsWithFunction,
            filtration: FiltrationKind::Function,
            ..RunParameters::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_empty_label() {
        let params = RunParameters { x_label: " ".into(), ..RunParameters::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_parse_selections() {
        assert_eq!("koszul".parse::<BettiAlgorithm>().unwrap(), BettiAlgorithm::KoszulBased);
        assert_eq!("metric_fn".parse::<DataType>().unwrap(), DataType::MetricWithFunction);
        assert_eq!("occupancy".parse::<BinningPolicy>().unwrap(), BinningPolicy::EqualOccupancy);
        let err = "spectral".parse::<BettiAlgorithm>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
        assert!("edge".parse::<FiltrationKind>().is_err());
        assert_eq!("betti".parse::<PipelineMode>().unwrap(), PipelineMode::BettiOnly);
        assert!("arrangement".parse::<PipelineMode>().is_err());
    }

    #[test]
    fn test_single_bin_rejected() {
        let config = EngineConfig { x_bins: 1, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }
}
