// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{control_plane, document};
use crate::exit_error::ExitError;
use serde_json::json;
use std::path::Path;

pub fn submit(runtime_config_path: &Path, limits_config_path: &Path, file: &Path) -> Result<(), ExitError> {
    let cp = control_plane::open(runtime_config_path, limits_config_path)?;
    let evaluation = document::read(file)?;
    let (stored_evaluation, updated_job) = cp.submit_evaluation(&evaluation).map_err(ExitError::from)?;
    document::print(&json!({"evaluation": stored_evaluation, "job": updated_job}));
    Ok(())
}
