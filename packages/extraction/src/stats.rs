//! Process-wide per-strategy extraction statistics.
//!
//! All counters live behind one mutex so a full reset is atomic with respect
//! to concurrent recording.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default)]
struct Counters {
    success_count: u64,
    failure_count: u64,
    cumulative_time: Duration,
}

#[derive(Debug, Default)]
struct StatsState {
    strategies: Vec<(&'static str, bool, Counters)>,
    total_calls: u64,
    successful_calls: u64,
}

impl StatsState {
    fn counters(&mut self, name: &'static str) -> &mut Counters {
        // Names not registered at construction get a slot on first use.
        let idx = match self.strategies.iter().position(|(n, _, _)| *n == name) {
            Some(idx) => idx,
            None => {
                self.strategies.push((name, true, Counters::default()));
                self.strategies.len() - 1
            }
        };
        &mut self.strategies[idx].2
    }
}

/// Statistics for one strategy at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyStatsSnapshot {
    pub name: String,
    pub available: bool,
    pub success_count: u64,
    pub failure_count: u64,
    /// Percentage of attempts that produced accepted text (0-100).
    pub success_rate: f64,
    /// Mean time per success, in milliseconds.
    pub avg_time_ms: f64,
}

/// Statistics for the whole extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub strategies: Vec<StrategyStatsSnapshot>,
    pub available_extractors: Vec<String>,
    pub total_calls: u64,
    pub successful_calls: u64,
    /// Percentage of `extract` calls that returned text (0-100).
    pub overall_success_rate: f64,
}

impl StatsSnapshot {
    /// Look up one strategy by name.
    pub fn strategy(&self, name: &str) -> Option<&StrategyStatsSnapshot> {
        self.strategies.iter().find(|s| s.name == name)
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Shared statistics store with record/read/reset lifecycle.
#[derive(Debug, Default)]
pub struct ExtractorStats {
    state: Mutex<StatsState>,
}

impl ExtractorStats {
    /// Initialize counters for the given `(name, available)` strategies.
    pub fn new(known: &[(&'static str, bool)]) -> Self {
        let strategies = known
            .iter()
            .map(|(name, available)| (*name, *available, Counters::default()))
            .collect();
        Self {
            state: Mutex::new(StatsState {
                strategies,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StatsState> {
        // A panic while holding the lock cannot leave counters half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A strategy produced accepted text; `elapsed` is added to its time.
    pub fn record_success(&self, strategy: &'static str, elapsed: Duration) {
        let mut state = self.lock();
        let counters = state.counters(strategy);
        counters.success_count += 1;
        counters.cumulative_time += elapsed;
    }

    /// A strategy failed, found nothing, or produced rejected text.
    pub fn record_failure(&self, strategy: &'static str) {
        self.lock().counters(strategy).failure_count += 1;
    }

    /// One `extract` call finished.
    pub fn record_call(&self, succeeded: bool) {
        let mut state = self.lock();
        state.total_calls += 1;
        if succeeded {
            state.successful_calls += 1;
        }
    }

    /// Consistent copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        let state = self.lock();
        let strategies = state
            .strategies
            .iter()
            .map(|(name, available, c)| {
                let attempts = c.success_count + c.failure_count;
                let avg_time_ms = if c.success_count == 0 {
                    0.0
                } else {
                    c.cumulative_time.as_secs_f64() * 1000.0 / c.success_count as f64
                };
                StrategyStatsSnapshot {
                    name: name.to_string(),
                    available: *available,
                    success_count: c.success_count,
                    failure_count: c.failure_count,
                    success_rate: percentage(c.success_count, attempts),
                    avg_time_ms,
                }
            })
            .collect();

        StatsSnapshot {
            strategies,
            available_extractors: state
                .strategies
                .iter()
                .filter(|(_, available, _)| *available)
                .map(|(name, _, _)| name.to_string())
                .collect(),
            total_calls: state.total_calls,
            successful_calls: state.successful_calls,
            overall_success_rate: percentage(state.successful_calls, state.total_calls),
        }
    }

    /// Reset every counter (`None`) or one strategy's counters.
    ///
    /// Returns `false` when `name` is not a known strategy.
    pub fn reset(&self, name: Option<&str>) -> bool {
        let mut state = self.lock();
        match name {
            None => {
                for (_, _, counters) in state.strategies.iter_mut() {
                    *counters = Counters::default();
                }
                state.total_calls = 0;
                state.successful_calls = 0;
                info!("All extractor statistics reset");
                true
            }
            Some(name) => match state.strategies.iter_mut().find(|(n, _, _)| *n == name) {
                Some((_, _, counters)) => {
                    *counters = Counters::default();
                    info!(strategy = name, "Extractor statistics reset");
                    true
                }
                None => false,
            },
        }
    }
}
