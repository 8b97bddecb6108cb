// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads the seven canonical schemas and validates documents against them
//! (C1).
//!
//! Schemas are authored as YAML but are valid JSON Schema Draft 2020-12
//! documents. `jsonschema` resolves the draft's own meta-schema from its
//! bundled copy, so a `SkillContract` schema that `$ref`s
//! `https://json-schema.org/draft/2020-12/schema` compiles without any
//! network access.

use crate::kind::Kind;
use crate::normalize::normalize_regex_patterns;
use bp_core::{CoreError, CoreResult, Violation};
use jsonschema::Validator;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

struct SchemaBundle {
    schema: Value,
    source_path: PathBuf,
    validator: Validator,
}

/// Loads canonical schemas once and validates documents by [`Kind`].
pub struct SchemaValidator {
    bundles: HashMap<Kind, SchemaBundle>,
}

impl SchemaValidator {
    /// Load all seven canonical schemas from `schemas_dir`. Fails closed if
    /// any schema file is missing, fails to parse, or does not compile into
    /// a sane Draft 2020-12 schema.
    pub fn load_from_dir(schemas_dir: impl AsRef<Path>) -> CoreResult<Self> {
        let schemas_dir = schemas_dir.as_ref();
        if !schemas_dir.is_dir() {
            return Err(CoreError::internal(format!("schemas directory not found: {}", schemas_dir.display())));
        }

        let mut bundles = HashMap::new();
        for kind in Kind::ALL {
            let path = schemas_dir.join(kind.schema_filename());
            let schema = load_yaml_object(&path)?;
            let validator = jsonschema::validator_for(&schema)
                .map_err(|e| CoreError::internal(format!("invalid schema for {kind} at {}: {e}", path.display())))?;
            bundles.insert(kind, SchemaBundle { schema, source_path: path, validator });
        }
        Ok(Self { bundles })
    }

    /// The on-disk path the schema for `kind` was loaded from.
    pub fn schema_path_for_kind(&self, kind: Kind) -> CoreResult<&Path> {
        Ok(self.require_bundle(kind)?.source_path.as_path())
    }

    /// The raw schema document for `kind`, after pattern normalization.
    pub fn schema_for_kind(&self, kind: Kind) -> CoreResult<&Value> {
        Ok(&self.require_bundle(kind)?.schema)
    }

    /// Validate `document` against the canonical schema for `kind`.
    /// Returns every violation at once, sorted by `(path, message)`.
    pub fn validate(&self, kind: Kind, document: &Value) -> CoreResult<()> {
        let bundle = self.require_bundle(kind)?;

        let violations: Vec<Violation> = bundle
            .validator
            .iter_errors(document)
            .map(|err| Violation::new(err.instance_path.to_string(), err.to_string()))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(CoreError::schema_validation(kind.as_str(), violations))
        }
    }

    fn require_bundle(&self, kind: Kind) -> CoreResult<&SchemaBundle> {
        self.bundles
            .get(&kind)
            .ok_or_else(|| CoreError::internal(format!("schema bundle not loaded for {kind}")))
    }
}

fn load_yaml_object(path: &Path) -> CoreResult<Value> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CoreError::internal(format!("failed to read schema file {}: {e}", path.display())))?;
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(&raw)
        .map_err(|e| CoreError::internal(format!("failed to parse YAML schema {}: {e}", path.display())))?;
    let mut json_value: Value = serde_json::to_value(yaml_value)
        .map_err(|e| CoreError::internal(format!("failed to convert schema {} to JSON: {e}", path.display())))?;

    if !json_value.is_object() {
        return Err(CoreError::internal(format!("schema root must be a YAML object: {}", path.display())));
    }
    normalize_regex_patterns(&mut json_value);
    Ok(json_value)
}
