//! Persisted transform-planning knowledge ("wisdom").
//!
//! A [`WisdomCache`] remembers which DST-I kernel was measured fastest for
//! each transform length. When it is backed by a file, every plan creation
//! reads the file (open-read-close) before planning and rewrites it
//! (open-write-close) when the plan added something new. The file is never
//! held open between plan creations.
//!
//! Wisdom only selects between kernels that compute the same transform; it
//! changes planning cost, not what a solve computes.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": { "32": "odd_extension", "6": "direct" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::dst::DstAlgorithm;
use crate::error::SolverResult;

pub const WISDOM_VERSION: u32 = 1;

/// Default file name used by the command-line driver.
pub const DEFAULT_WISDOM_FILE: &str = ".wisdom";

#[derive(Debug, Serialize, Deserialize)]
struct WisdomFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<usize, DstAlgorithm>,
}

/// Outcome of resolving one transform length against the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub algorithm: DstAlgorithm,
    pub from_wisdom: bool,
}

/// What the planner decided when the cache had no say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Choice {
    pub algorithm: DstAlgorithm,
    /// Only measured choices are worth remembering.
    pub measured: bool,
}

/// Shared planning knowledge. Plan creation locks the cache, so concurrent
/// planners sharing one cache (and one file) are serialised.
#[derive(Debug, Default)]
pub struct WisdomCache {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<usize, DstAlgorithm>>,
}

impl WisdomCache {
    /// A cache that lives only as long as this object.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A cache mirrored to `path`. The file is created on the first plan
    /// that measures something; a missing file is not an error.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn lookup(&self, len: usize) -> Option<DstAlgorithm> {
        self.entries.lock().get(&len).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run one plan-creation transaction for transform length `len`.
    ///
    /// `choose` is only consulted when the cache has no entry; its measured
    /// choices are recorded and persisted.
    pub(crate) fn resolve<F>(&self, len: usize, choose: F) -> SolverResult<Resolution>
    where
        F: FnOnce() -> SolverResult<Choice>,
    {
        let mut entries = self.entries.lock();
        self.import(&mut entries);

        if let Some(&algorithm) = entries.get(&len) {
            return Ok(Resolution {
                algorithm,
                from_wisdom: true,
            });
        }

        let choice = choose()?;
        if choice.measured {
            entries.insert(len, choice.algorithm);
            self.export(&entries);
        }
        Ok(Resolution {
            algorithm: choice.algorithm,
            from_wisdom: false,
        })
    }

    fn import(&self, entries: &mut BTreeMap<usize, DstAlgorithm>) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no wisdom file at {}", path.display());
                return;
            }
            Err(err) => {
                warn!("failed to read wisdom file {}: {err}", path.display());
                return;
            }
        };
        match serde_json::from_str::<WisdomFile>(&text) {
            Ok(file) if file.version == WISDOM_VERSION => {
                let before = entries.len();
                for (len, algorithm) in file.entries {
                    entries.entry(len).or_insert(algorithm);
                }
                debug!(
                    "imported {} wisdom entries from {}",
                    entries.len() - before,
                    path.display()
                );
            }
            Ok(file) => warn!(
                "ignoring wisdom file {} with version {} (expected {WISDOM_VERSION})",
                path.display(),
                file.version
            ),
            Err(err) => warn!("ignoring malformed wisdom file {}: {err}", path.display()),
        }
    }

    fn export(&self, entries: &BTreeMap<usize, DstAlgorithm>) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let file = WisdomFile {
            version: WISDOM_VERSION,
            entries: entries.clone(),
        };
        let result = serde_json::to_string_pretty(&file)
            .map_err(io::Error::from)
            .and_then(|text| fs::write(path, text));
        match result {
            Ok(()) => debug!("exported {} wisdom entries to {}", entries.len(), path.display()),
            Err(err) => warn!("failed to write wisdom file {}: {err}", path.display()),
        }
    }
}
