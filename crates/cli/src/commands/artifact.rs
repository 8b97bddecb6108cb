// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{control_plane, document};
use crate::exit_error::ExitError;
use std::path::Path;

pub fn submit(runtime_config_path: &Path, limits_config_path: &Path, file: &Path) -> Result<(), ExitError> {
    let cp = control_plane::open(runtime_config_path, limits_config_path)?;
    let artifact = document::read(file)?;
    let stored = cp.submit_artifact(&artifact).map_err(ExitError::from)?;
    document::print(&stored);
    Ok(())
}

pub fn get(runtime_config_path: &Path, limits_config_path: &Path, artifact_id: &str) -> Result<(), ExitError> {
    let cp = control_plane::open(runtime_config_path, limits_config_path)?;
    let artifact = cp.get_artifact(artifact_id).map_err(ExitError::from)?;
    document::print(&artifact);
    Ok(())
}
