// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (intentionally minimal in build mode).
//!
//! Build mode does not auto-execute agents, so the scheduler is disabled by
//! default. This module exists to keep the crate modular:
//! - a caller submits jobs through [`crate::ControlPlane`]
//! - a scheduler would select runnable jobs
//! - an executor would perform bounded work under a `JobContract`
//!
//! Only the first of those exists today.

use crate::config::SchedulerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler is not implemented in build mode")]
    NotImplemented,
}

/// A disabled-by-default poller. `run_forever` either logs and returns
/// immediately (disabled) or returns [`SchedulerError::NotImplemented`] —
/// background execution is out of scope for build mode.
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn run_forever(&self) -> Result<(), SchedulerError> {
        if !self.config.enabled {
            tracing::info!(event = "scheduler_disabled", "scheduler is disabled; no background execution will occur");
            return Ok(());
        }
        Err(SchedulerError::NotImplemented)
    }
}
