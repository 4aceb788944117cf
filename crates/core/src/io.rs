//! Configuration file parsing and serialization.
//!
//! A job file describes one Poisson solve: grid, solver mode, planning
//! options and where results go. `JobConfig` parses from TOML and resolves
//! into the [`Grid2D`] and [`SolverOptions`] the solver consumes.
//!
//! # File Format
//!
//! ```toml
//! mode = "fft"
//! threads = 4
//! wisdom = ".wisdom"
//! rigor = "measure"
//!
//! [grid]
//! m = 256
//! n = 256
//! # hx, hy default to 2π/(m+1) and 2π/(n+1)
//!
//! [boundaries]
//! lower = "dirichlet"
//! upper = "neumann"
//!
//! [metrics]
//! enabled = true
//! output = "metrics.jsonl"
//!
//! [dump]
//! prefix = "poisson2d_fft"
//! grads = true
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    field::{Real, PI},
    grid::Grid2D,
    metrics::MetricsConfig,
    poisson::{SolverMode, SolverOptions},
    shutter::YBoundaries,
    transform::{PlanRigor, WisdomCache},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

// ============================================================================
// Grid
// ============================================================================

/// Interior grid as written in a job file. Missing steps make the domain
/// span one period of 2π along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub m: usize,
    pub n: usize,
    #[serde(default)]
    pub hx: Option<Real>,
    #[serde(default)]
    pub hy: Option<Real>,
}

impl GridSpec {
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            m,
            n,
            hx: None,
            hy: None,
        }
    }

    pub fn resolve(&self) -> Grid2D {
        Grid2D::new(
            self.m,
            self.n,
            self.hx.unwrap_or_else(|| period_step(self.m)),
            self.hy.unwrap_or_else(|| period_step(self.n)),
        )
    }
}

fn period_step(points: usize) -> Real {
    2.0 * PI / (points + 1) as Real
}

// ============================================================================
// Output
// ============================================================================

/// Raw dumps of computed and reference solutions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// File prefix; nothing is written when unset.
    pub prefix: Option<String>,
    /// Also write GrADS descriptor and scripts next to each dump.
    pub grads: bool,
}

// ============================================================================
// Job Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_mode")]
    pub mode: SolverMode,
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Wisdom file; planning knowledge stays in memory when unset.
    #[serde(default)]
    pub wisdom: Option<PathBuf>,
    #[serde(default)]
    pub rigor: PlanRigor,
    pub grid: GridSpec,
    #[serde(default)]
    pub boundaries: YBoundaries,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub dump: DumpConfig,
}

fn default_mode() -> SolverMode {
    SolverMode::Fft
}

fn default_threads() -> usize {
    1
}

impl JobConfig {
    /// Config for an `m × n` FFT solve with every other setting defaulted.
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            mode: default_mode(),
            threads: default_threads(),
            wisdom: None,
            rigor: PlanRigor::default(),
            grid: GridSpec::new(m, n),
            boundaries: YBoundaries::default(),
            metrics: MetricsConfig::default(),
            dump: DumpConfig::default(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn grid(&self) -> Grid2D {
        self.grid.resolve()
    }

    pub fn wisdom_cache(&self) -> WisdomCache {
        match &self.wisdom {
            Some(path) => WisdomCache::persistent(path),
            None => WisdomCache::in_memory(),
        }
    }

    /// Solver options without a metrics recorder; attach one from
    /// [`MetricsConfig::build_recorder`] when needed.
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            threads: self.threads.max(1),
            rigor: self.rigor,
            boundaries: self.boundaries,
            wisdom: Arc::new(self.wisdom_cache()),
            metrics: None,
        }
    }
}
