// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles a [`bp_engine::ControlPlane`] from the two config documents,
//! the same way a long-running process would at startup. The CLI pays the
//! full startup cost (schema load, registry load, sqlite open) per
//! invocation; it is a diagnostic and admission tool, not a daemon.

use crate::exit_error::ExitError;
use bp_engine::config::{load_limits_config, load_runtime_config};
use bp_engine::ControlPlane;
use bp_registry::RegistryDirs;
use std::path::Path;

pub fn open(runtime_config_path: &Path, limits_config_path: &Path) -> Result<ControlPlane, ExitError> {
    let runtime = load_runtime_config(runtime_config_path).map_err(ExitError::from)?;
    let limits = load_limits_config(limits_config_path).map_err(ExitError::from)?;

    let registry_dirs = RegistryDirs {
        orgs_dir: &runtime.registry.orgs_dir,
        agent_definitions_dir: &runtime.registry.agent_definitions_dir,
        skill_contracts_dir: &runtime.registry.skill_contracts_dir,
    };

    ControlPlane::open(&runtime.registry.schemas_dir, registry_dirs, &runtime.storage.sqlite_path, limits.into()).map_err(ExitError::from)
}
