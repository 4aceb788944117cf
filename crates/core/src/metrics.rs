//! Lightweight metrics recorder (JSONL) for solver lifecycle events.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::warn;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::poisson::SolverMode;
use crate::transform::DstAlgorithm;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub output: Option<PathBuf>,
}

impl MetricsConfig {
    pub fn build_recorder(&self) -> io::Result<Option<MetricsRecorder>> {
        if !self.enabled {
            return Ok(None);
        }
        let path = self.output.as_ref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "metrics.output must be set when metrics are enabled",
            )
        })?;
        MetricsRecorder::new(path).map(Some)
    }
}

pub struct MetricsRecorder {
    writer: Mutex<File>,
}

impl MetricsRecorder {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(file),
        })
    }

    /// Write one event. Failures are logged and otherwise ignored.
    pub fn emit(&self, event: MetricsEvent) {
        if let Err(err) = self.write_event(event) {
            warn!("failed to write metrics event: {err}");
        }
    }

    fn write_event(&self, event: MetricsEvent) -> io::Result<()> {
        let envelope = EventEnvelope {
            timestamp_ms: now_millis(),
            event,
        };
        let mut guard = self.writer.lock();
        serde_json::to_writer(&mut *guard, &envelope)?;
        guard.write_all(b"\n")?;
        guard.flush()
    }
}

#[derive(Serialize)]
struct EventEnvelope {
    timestamp_ms: f64,
    #[serde(flatten)]
    event: MetricsEvent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MetricsEvent {
    SolverInit {
        mode: SolverMode,
        m: usize,
        n: usize,
        hx: f64,
        hy: f64,
        threads: usize,
    },
    PlanCreated {
        len: usize,
        howmany: usize,
        algorithm: DstAlgorithm,
        from_wisdom: bool,
        duration_ms: f64,
    },
    Solve {
        m: usize,
        n: usize,
        duration_ms: f64,
        flops: f64,
    },
    Dispose {
        mode: SolverMode,
    },
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
