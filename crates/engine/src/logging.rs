// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup.
//!
//! JSON-formatted, one line per event, so audit fields (`job_id`, `org_id`,
//! `evaluation_id`, `artifact_id`, `event`, `code`) survive as structured
//! `tracing` fields rather than being smashed into a free-text message. The
//! default filter can be overridden with `RUST_LOG`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Initializes the global `tracing` subscriber.
///
/// Returns a [`WorkerGuard`] that must be kept alive for the lifetime of the
/// process — dropping it flushes and stops the non-blocking file writer.
/// When `log_dir` is `None`, logs go to stderr only.
pub fn init(log_dir: Option<&Path>) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (writer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "control-plane.log");
            tracing_appender::non_blocking(appender)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::fmt().json().with_env_filter(filter).with_writer(writer).with_target(true).init();

    guard
}
