// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema-only validation, independent of policy or storage. The
//! registry's own documents can be checked with this before a process ever
//! tries to load them.

use super::document;
use crate::exit_error::ExitError;
use bp_engine::config::load_runtime_config;
use bp_schema::{Kind, SchemaValidator};
use std::path::Path;
use std::str::FromStr;

pub fn run(runtime_config_path: &Path, kind: &str, file: &Path) -> Result<(), ExitError> {
    let runtime = load_runtime_config(runtime_config_path).map_err(ExitError::from)?;
    let validator = SchemaValidator::load_from_dir(&runtime.registry.schemas_dir).map_err(ExitError::from)?;
    let kind = Kind::from_str(kind).map_err(ExitError::from)?;
    let doc = document::read(file)?;

    validator.validate(kind, &doc).map_err(ExitError::from)?;
    println!("{kind} at {} is valid", file.display());
    Ok(())
}
