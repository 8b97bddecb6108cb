// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory registry snapshot (C2).
//!
//! Loaded once at process start from a repo tree; read-only for the
//! lifetime of the process and safe to share across concurrent request
//! workers. Any load or ref-resolution failure aborts startup — the core
//! fails closed rather than running with a partial or ambiguous registry.

use crate::loader::{iter_yaml_files, load_yaml_document, resolve_repo_ref};
use bp_core::pointer::{deep_get_array_or_empty, deep_get_opt, deep_get_str};
use bp_core::{CoreError, CoreResult};
use bp_schema::{Kind, SchemaValidator};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// A loaded `OrganizationManifest`, keyed by `org_id`.
pub struct OrgRecord {
    pub org_id: String,
    pub path: PathBuf,
    pub document: Value,
}

/// A loaded `AgentDefinition`, keyed by `agent_id`.
pub struct AgentRecord {
    pub agent_id: String,
    pub role: String,
    pub path: PathBuf,
    pub document: Value,
}

/// A loaded `SkillContract`, keyed by `(skill_id, version)`.
pub struct SkillRecord {
    pub skill_id: String,
    pub version: String,
    pub path: PathBuf,
    pub document: Value,
}

/// The read-only registry snapshot: organizations, the agents they
/// transitively include, and (optionally) skill contracts.
pub struct Registry {
    repo_root: PathBuf,
    orgs: HashMap<String, OrgRecord>,
    agents: HashMap<String, AgentRecord>,
    agents_by_path: HashMap<PathBuf, String>,
    skills: HashMap<(String, String), SkillRecord>,
}

/// The three registry directories, in load order.
pub struct RegistryDirs<'a> {
    pub orgs_dir: &'a Path,
    pub agent_definitions_dir: &'a Path,
    pub skill_contracts_dir: &'a Path,
}

impl Registry {
    /// Load the registry per §4.2's ordered protocol. `repo_root` is the
    /// directory agent role refs are resolved against — `orgs_dir`'s parent.
    pub fn load(dirs: RegistryDirs<'_>, validator: &SchemaValidator) -> CoreResult<Self> {
        let parent = dirs.orgs_dir.parent().ok_or_else(|| CoreError::internal("orgs_dir has no parent to use as repo root"))?;
        let repo_root = parent.canonicalize().unwrap_or_else(|_| parent.to_path_buf());

        let mut agents: HashMap<String, AgentRecord> = HashMap::new();
        let mut agents_by_path: HashMap<PathBuf, String> = HashMap::new();

        // 1. Agent definitions directory, scanned recursively.
        for path in iter_yaml_files(dirs.agent_definitions_dir) {
            let doc = load_yaml_document(&path)?;
            if doc.kind() != Some(Kind::AgentDefinition.as_str()) {
                continue;
            }
            validator.validate(Kind::AgentDefinition, &doc.data)?;
            let agent_id = deep_get_str(&doc.data, &["metadata", "agent_id"])?;
            let role = deep_get_str(&doc.data, &["metadata", "role"])?;
            let canon_path = canonicalize_or_self(&doc.path);

            if agents.contains_key(&agent_id) {
                return Err(CoreError::internal(format!("duplicate AgentDefinition agent_id: {agent_id} ({})", doc.path.display())));
            }
            agents_by_path.insert(canon_path.clone(), agent_id.clone());
            agents.insert(agent_id.clone(), AgentRecord { agent_id, role, path: canon_path, document: doc.data });
        }

        // 2. Organization manifests.
        let mut orgs: HashMap<String, OrgRecord> = HashMap::new();
        for path in iter_yaml_files(dirs.orgs_dir) {
            let doc = load_yaml_document(&path)?;
            if doc.kind() != Some(Kind::OrganizationManifest.as_str()) {
                continue;
            }
            validator.validate(Kind::OrganizationManifest, &doc.data)?;
            let org_id = deep_get_str(&doc.data, &["metadata", "org_id"])?;
            if orgs.contains_key(&org_id) {
                return Err(CoreError::internal(format!("duplicate OrganizationManifest org_id: {org_id} ({})", doc.path.display())));
            }
            orgs.insert(org_id.clone(), OrgRecord { org_id, path: doc.path, document: doc.data });
        }

        // 3. Resolve and validate every org's agent role refs.
        for org in orgs.values() {
            let roles = deep_get_array_or_empty(&org.document, &["spec", "agent_roles"]);
            for role_ref in roles {
                let role_ref = role_ref
                    .as_object()
                    .ok_or_else(|| CoreError::internal(format!("invalid agent role ref in {} (expected object)", org.path.display())))?;
                let role_id = role_ref.get("role_id").and_then(Value::as_str).unwrap_or("");
                let ref_str = role_ref
                    .get("ref")
                    .and_then(Value::as_str)
                    .ok_or_else(|| CoreError::internal(format!("invalid agent role ref.ref in {} (expected string)", org.path.display())))?;

                let agent_path = resolve_repo_ref(&repo_root, ref_str)?;
                if !agent_path.exists() {
                    return Err(CoreError::internal(format!(
                        "org {} references missing AgentDefinition: {ref_str} (resolved: {})",
                        org.org_id,
                        agent_path.display()
                    )));
                }

                let agent_id = match agents_by_path.get(&agent_path) {
                    Some(id) => id.clone(),
                    None => {
                        // Referenced outside the default directory; load it directly.
                        let loaded = load_yaml_document(&agent_path)?;
                        if loaded.kind() != Some(Kind::AgentDefinition.as_str()) {
                            return Err(CoreError::internal(format!("referenced agent role ref is not an AgentDefinition: {ref_str}")));
                        }
                        validator.validate(Kind::AgentDefinition, &loaded.data)?;
                        let agent_id = deep_get_str(&loaded.data, &["metadata", "agent_id"])?;
                        let role = deep_get_str(&loaded.data, &["metadata", "role"])?;
                        if agents.contains_key(&agent_id) {
                            return Err(CoreError::internal(format!("AgentDefinition agent_id collision when loading by ref: {agent_id}")));
                        }
                        agents_by_path.insert(agent_path.clone(), agent_id.clone());
                        agents.insert(agent_id.clone(), AgentRecord { agent_id: agent_id.clone(), role, path: agent_path.clone(), document: loaded.data });
                        agent_id
                    }
                };

                let agent = agents
                    .get(&agent_id)
                    .ok_or_else(|| CoreError::internal(format!("agent {agent_id} missing from registry after insert/lookup")))?;
                if !role_id.is_empty() && agent.role != role_id {
                    return Err(CoreError::internal(format!(
                        "org {} role_id '{role_id}' does not match referenced AgentDefinition.metadata.role '{}'",
                        org.org_id, agent.role
                    )));
                }

                let inclusion = deep_get_opt(&agent.document, &["spec", "org_inclusion"]);
                let mode = inclusion.and_then(|i| i.get("mode")).and_then(Value::as_str).unwrap_or("any");
                if mode == "allowlist" {
                    let allow: HashSet<&str> = inclusion
                        .and_then(|i| i.get("allow_org_ids"))
                        .and_then(Value::as_array)
                        .map(|a| a.iter().filter_map(Value::as_str).collect())
                        .unwrap_or_default();
                    if !allow.contains(org.org_id.as_str()) {
                        return Err(CoreError::internal(format!(
                            "AgentDefinition {agent_id} is not allowed to be included by org_id {} (not in allow_org_ids)",
                            org.org_id
                        )));
                    }
                }
            }
        }

        // 4. Skill contracts are optional.
        let mut skills: HashMap<(String, String), SkillRecord> = HashMap::new();
        if dirs.skill_contracts_dir.exists() {
            for path in iter_yaml_files(dirs.skill_contracts_dir) {
                let doc = load_yaml_document(&path)?;
                if doc.kind() != Some(Kind::SkillContract.as_str()) {
                    continue;
                }
                validator.validate(Kind::SkillContract, &doc.data)?;
                let skill_id = deep_get_str(&doc.data, &["metadata", "skill_id"])?;
                let version = deep_get_str(&doc.data, &["metadata", "version"])?;
                let key = (skill_id.clone(), version.clone());
                if skills.contains_key(&key) {
                    return Err(CoreError::internal(format!("duplicate SkillContract {skill_id}@{version}")));
                }
                skills.insert(key, SkillRecord { skill_id, version, path: doc.path, document: doc.data });
            }
        }

        Ok(Self { repo_root, orgs, agents, agents_by_path, skills })
    }

    pub fn get_org(&self, org_id: &str) -> Option<&Value> {
        self.orgs.get(org_id).map(|r| &r.document)
    }

    pub fn has_org(&self, org_id: &str) -> bool {
        self.orgs.contains_key(org_id)
    }

    pub fn get_agent(&self, agent_id: &str) -> Option<&Value> {
        self.agents.get(agent_id).map(|r| &r.document)
    }

    /// Resolve an org's `agent_roles[*].ref` to the loaded agent document.
    pub fn resolve_agent_ref(&self, ref_str: &str) -> CoreResult<&Value> {
        let path = resolve_repo_ref(&self.repo_root, ref_str)?;
        let agent_id = self.agents_by_path.get(&path).ok_or_else(|| CoreError::not_found("AgentDefinition", ref_str))?;
        let agent = self
            .agents
            .get(agent_id)
            .ok_or_else(|| CoreError::internal(format!("agents_by_path points at unloaded agent: {agent_id}")))?;
        Ok(&agent.document)
    }

    /// The set of `agent_id`s reachable through `org_id`'s `agent_roles`.
    pub fn included_agent_ids_for_org(&self, org_id: &str) -> CoreResult<HashSet<String>> {
        let org = self.orgs.get(org_id).ok_or_else(|| CoreError::not_found("OrganizationManifest", org_id))?;
        let mut ids = HashSet::new();
        for role_ref in deep_get_array_or_empty(&org.document, &["spec", "agent_roles"]) {
            if let Some(ref_str) = role_ref.get("ref").and_then(Value::as_str) {
                ids.insert(self.resolve_agent_ref(ref_str)?.pointer("/metadata/agent_id").and_then(Value::as_str).unwrap_or_default().to_string());
            }
        }
        Ok(ids)
    }

    pub fn skill(&self, skill_id: &str, version: &str) -> Option<&Value> {
        self.skills.get(&(skill_id.to_string(), version.to_string())).map(|r| &r.document)
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }
}

fn canonicalize_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
