// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global hard limits (§4.3.2), loaded from configuration and never
//! exceeded regardless of what an org or job declares.

/// Upper bounds enforced on every JobContract at submission, independent of
/// org policy. An org may be stricter than these; it may never be looser.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_iterations_upper_bound: i64,
    pub max_runtime_seconds_upper_bound: i64,
    pub max_cost_upper_bound_currency: String,
    pub max_cost_upper_bound: f64,
    pub max_expires_in_seconds_upper_bound: i64,
    pub require_known_org: bool,
}
