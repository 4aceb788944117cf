//! Named phase timers for performance analysis.
//!
//! **Profiling is disabled by default and costs nothing.** Build with
//! `--features profiling` to collect timings:
//!
//! ```
//! use breeze2d_core::profiler::{start_timer, stop_timer, log_profile};
//!
//! start_timer("solve");
//! // ... work ...
//! stop_timer("solve");
//! log_profile();
//! ```

/// Accumulated timings of one named section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    pub name: String,
    pub calls: usize,
    pub total_ms: f64,
    pub min_us: f64,
    pub max_us: f64,
}

#[cfg(feature = "profiling")]
mod enabled {
    use std::collections::HashMap;
    use std::sync::LazyLock;
    use std::time::{Duration, Instant};

    use parking_lot::Mutex;

    use super::ProfileEntry;

    #[derive(Debug)]
    struct Section {
        total: Duration,
        calls: usize,
        min: Duration,
        max: Duration,
        active: Option<Instant>,
    }

    impl Default for Section {
        fn default() -> Self {
            Self {
                total: Duration::ZERO,
                calls: 0,
                min: Duration::MAX,
                max: Duration::ZERO,
                active: None,
            }
        }
    }

    static SECTIONS: LazyLock<Mutex<HashMap<String, Section>>> =
        LazyLock::new(|| Mutex::new(HashMap::new()));

    #[inline]
    pub fn start_timer(name: &str) {
        let mut sections = SECTIONS.lock();
        sections.entry(name.to_string()).or_default().active = Some(Instant::now());
    }

    #[inline]
    pub fn stop_timer(name: &str) {
        let mut sections = SECTIONS.lock();
        if let Some(section) = sections.get_mut(name) {
            if let Some(start) = section.active.take() {
                let elapsed = start.elapsed();
                section.total += elapsed;
                section.calls += 1;
                section.min = section.min.min(elapsed);
                section.max = section.max.max(elapsed);
            }
        }
    }

    pub fn reset_profile() {
        SECTIONS.lock().clear();
    }

    /// Sections sorted by total time, longest first.
    pub fn profile_entries() -> Vec<ProfileEntry> {
        let sections = SECTIONS.lock();
        let mut entries: Vec<_> = sections
            .iter()
            .map(|(name, section)| ProfileEntry {
                name: name.clone(),
                calls: section.calls,
                total_ms: section.total.as_secs_f64() * 1e3,
                min_us: if section.calls == 0 {
                    0.0
                } else {
                    section.min.as_secs_f64() * 1e6
                },
                max_us: section.max.as_secs_f64() * 1e6,
            })
            .collect();
        entries.sort_by(|a, b| b.total_ms.total_cmp(&a.total_ms));
        entries
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use super::ProfileEntry;

    #[inline(always)]
    pub fn start_timer(_name: &str) {}

    #[inline(always)]
    pub fn stop_timer(_name: &str) {}

    #[inline(always)]
    pub fn reset_profile() {}

    #[inline(always)]
    pub fn profile_entries() -> Vec<ProfileEntry> {
        Vec::new()
    }
}

#[cfg(feature = "profiling")]
pub use enabled::*;

#[cfg(not(feature = "profiling"))]
pub use disabled::*;

/// Log every collected section at info level.
pub fn log_profile() {
    for entry in profile_entries() {
        log::info!(
            "[profile] {:<24} calls={:>6} total={:>10.3} ms min={:>9.1} us max={:>9.1} us",
            entry.name,
            entry.calls,
            entry.total_ms,
            entry.min_us,
            entry.max_us
        );
    }
}
