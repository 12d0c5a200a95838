//! Scheduling settings.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Upper bound for the ceiling and for the queue capacity.
pub const MAX_ENGINE_PERMITS: usize = 1 << 20;

/// Controls how many compiler invocations run at once and how many may wait.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Processor count used for the default ceiling. Detected when unset.
    pub processors: Option<usize>,
    /// Explicit concurrency ceiling, overrides the processor heuristic.
    pub concurrency: Option<usize>,
    /// Maximum number of admitted jobs waiting for a slot. Unbounded when unset.
    pub queue_capacity: Option<usize>,
}

impl EngineConfig {
    /// Concurrency ceiling `K` given the number of processors the host reports.
    ///
    /// Defaults to `2 * processors + 1` so that enough compilers are in flight
    /// to keep the host busy while some of them wait on I/O.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ccv_config::EngineConfig;
    ///
    /// assert_eq!(EngineConfig::default().concurrency_limit(4), 9);
    /// ```
    pub fn concurrency_limit(&self, available_processors: usize) -> usize {
        match self.concurrency {
            Some(limit) => limit,
            None => self
                .processors
                .unwrap_or(available_processors)
                .saturating_mul(2)
                .saturating_add(1),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.concurrency == Some(0) {
            return Err(Error::InvalidValue {
                key: "engine.concurrency",
                reason: String::from("must be at least 1"),
            });
        }
        let processor_limit = self
            .processors
            .map(|processors| processors.saturating_mul(2).saturating_add(1));
        check_bound("engine.concurrency", self.concurrency)?;
        check_bound("engine.processors", processor_limit)?;
        check_bound("engine.queue_capacity", self.queue_capacity)?;
        Ok(())
    }
}

fn check_bound(key: &'static str, value: Option<usize>) -> Result<()> {
    match value {
        Some(value) if value > MAX_ENGINE_PERMITS => Err(Error::InvalidValue {
            key,
            reason: format!("{value} exceeds the maximum of {MAX_ENGINE_PERMITS}"),
        }),
        _ => Ok(()),
    }
}
