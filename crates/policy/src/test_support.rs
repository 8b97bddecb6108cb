// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for policy tests: a minimal on-disk registry plus a
//! permissive schema validator, so admission tests can exercise real
//! `Registry`/`SchemaValidator` instances instead of mocks.

use bp_registry::{Registry, RegistryDirs};
use bp_schema::{Kind, SchemaValidator};
use std::fs;
use std::path::PathBuf;

const PERMISSIVE_SCHEMA: &str = "\"$schema\": \"https://json-schema.org/draft/2020-12/schema\"\ntype: object\n";

pub(crate) struct TestRepo {
    _tmp: tempfile::TempDir,
    pub repo_root: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let repo_root = tmp.path().join("repo");
        fs::create_dir_all(repo_root.join("orgs")).unwrap();
        fs::create_dir_all(repo_root.join("agents/definitions")).unwrap();
        fs::create_dir_all(repo_root.join("schemas")).unwrap();
        Self { _tmp: tmp, repo_root }
    }

    pub fn schema_validator(&self) -> SchemaValidator {
        let schemas_dir = self.repo_root.join("schemas");
        for kind in Kind::ALL {
            fs::write(schemas_dir.join(kind.schema_filename()), PERMISSIVE_SCHEMA).unwrap();
        }
        SchemaValidator::load_from_dir(&schemas_dir).unwrap()
    }

    pub fn write_agent(&self, file: &str, agent_id: &str, role: &str, authority_level: &str) {
        fs::write(
            self.repo_root.join("agents/definitions").join(file),
            format!(
                "kind: AgentDefinition\nmetadata:\n  agent_id: {agent_id}\n  role: {role}\nspec:\n  role: {role}\n  authority:\n    level: {authority_level}\n  org_inclusion:\n    mode: any\n"
            ),
        )
        .unwrap();
    }

    /// `spec_yaml` is the full body under `spec:` (already indented two
    /// spaces), letting callers attach arbitrary org policy fields.
    pub fn write_org(&self, file: &str, org_id: &str, spec_yaml: &str) {
        fs::write(self.repo_root.join("orgs").join(file), format!("kind: OrganizationManifest\nmetadata:\n  org_id: {org_id}\nspec:\n{spec_yaml}\n"))
            .unwrap();
    }

    pub fn registry(&self, validator: &SchemaValidator) -> Registry {
        let orgs_dir = self.repo_root.join("orgs");
        let agent_definitions_dir = self.repo_root.join("agents/definitions");
        let skill_contracts_dir = self.repo_root.join("skills/contracts");
        Registry::load(
            RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir },
            validator,
        )
        .unwrap()
    }
}
