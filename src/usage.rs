//! Daily text-generation budget and call pacing.
//!
//! [`UsageStore`] is the only state carried between runs: a date-keyed call
//! counter read once at start-up and written once at the end. Increments go
//! through a mutex so concurrent region tasks never lose an update.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub calls: u32,
}

pub struct UsageStore {
    path: Option<PathBuf>,
    limit: u32,
    state: Mutex<UsageRecord>,
}

impl UsageStore {
    /// Loads the counter from `path`, resetting it when the stored date is not
    /// `today`. A missing or unreadable file starts a fresh count.
    pub fn load(path: impl Into<PathBuf>, limit: u32, today: NaiveDate) -> Self {
        let path = path.into();
        let stored = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<UsageRecord>(&content) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Usage file unreadable, starting fresh");
                    None
                }
            },
            Err(_) => None,
        };

        let record = match stored {
            Some(r) if r.date == today => r,
            _ => UsageRecord {
                date: today,
                calls: 0,
            },
        };
        debug!(date = %record.date, calls = record.calls, limit, "Loaded API usage");

        Self {
            path: Some(path),
            limit,
            state: Mutex::new(record),
        }
    }

    /// A store that is never persisted.
    pub fn in_memory(limit: u32) -> Self {
        Self {
            path: None,
            limit,
            state: Mutex::new(UsageRecord {
                date: Utc::now().date_naive(),
                calls: 0,
            }),
        }
    }

    /// Reserves one call. Returns `false` when the daily limit is reached,
    /// unless `force` is set.
    pub fn try_acquire(&self, force: bool) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.calls >= self.limit && !force {
            return false;
        }
        state.calls += 1;
        true
    }

    pub fn calls(&self) -> u32 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.calls())
    }

    pub fn snapshot(&self) -> UsageRecord {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Writes the counter back to disk. No-op for in-memory stores.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, body)
            .with_context(|| format!("writing usage file '{}'", path.display()))?;
        Ok(())
    }
}

/// Enforces a minimum delay between consecutive external calls.
pub struct CallPacer {
    delay: Duration,
    last: tokio::sync::Mutex<Option<Instant>>,
}

impl CallPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: tokio::sync::Mutex::new(None),
        }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits until at least `delay` has passed since the previous call.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
