use super::*;
use bp_schema::{Kind, SchemaValidator};
use std::fs;
use std::path::Path;

const PERMISSIVE_SCHEMA: &str = r#"
"$schema": "https://json-schema.org/draft/2020-12/schema"
type: object
"#;

fn write_schemas(dir: &Path) -> SchemaValidator {
    for kind in Kind::ALL {
        fs::write(dir.join(kind.schema_filename()), PERMISSIVE_SCHEMA).unwrap();
    }
    SchemaValidator::load_from_dir(dir).unwrap()
}

struct Fixture {
    _tmp: tempfile::TempDir,
    repo_root: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let repo_root = tmp.path().join("repo");
        fs::create_dir_all(repo_root.join("orgs")).unwrap();
        fs::create_dir_all(repo_root.join("agents/definitions")).unwrap();
        Self { _tmp: tmp, repo_root }
    }

    fn orgs_dir(&self) -> std::path::PathBuf {
        self.repo_root.join("orgs")
    }

    fn agents_dir(&self) -> std::path::PathBuf {
        self.repo_root.join("agents/definitions")
    }

    fn skills_dir(&self) -> std::path::PathBuf {
        self.repo_root.join("skills/contracts")
    }

    fn write_agent(&self, rel: &str, agent_id: &str, role: &str, org_inclusion: &str) {
        let path = self.agents_dir().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            path,
            format!(
                "kind: AgentDefinition\nmetadata:\n  agent_id: {agent_id}\n  role: {role}\nspec:\n  role: {role}\n  authority:\n    level: senior\n  org_inclusion:\n{org_inclusion}\n"
            ),
        )
        .unwrap();
    }

    fn write_org(&self, rel: &str, org_id: &str, roles_yaml: &str) {
        let path = self.orgs_dir().join(rel);
        fs::write(path, format!("kind: OrganizationManifest\nmetadata:\n  org_id: {org_id}\nspec:\n  agent_roles:\n{roles_yaml}\n")).unwrap();
    }
}

fn dirs<'a>(f: &'a Fixture) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    (f.orgs_dir(), f.agents_dir(), f.skills_dir())
}

#[test]
fn loads_org_and_included_agent() {
    let f = Fixture::new();
    f.write_agent("a1.yaml", "agent-1", "worker", "    mode: any");
    f.write_org("o1.yaml", "org-1", "    - role_id: worker\n      ref: agents/definitions/a1.yaml");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);

    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);
    let registry =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap();

    assert!(registry.has_org("org-1"));
    assert!(registry.get_agent("agent-1").is_some());
    let included = registry.included_agent_ids_for_org("org-1").unwrap();
    assert!(included.contains("agent-1"));
}

#[test]
fn duplicate_org_id_is_fatal() {
    let f = Fixture::new();
    f.write_org("o1.yaml", "org-1", "    []");
    f.write_org("o2.yaml", "org-1", "    []");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);
    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);

    let err =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap_err();
    assert!(matches!(err, bp_core::CoreError::Internal(_)));
}

#[test]
fn missing_agent_ref_is_fatal() {
    let f = Fixture::new();
    f.write_org("o1.yaml", "org-1", "    - role_id: worker\n      ref: agents/definitions/missing.yaml");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);
    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);

    let err =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap_err();
    assert!(matches!(err, bp_core::CoreError::Internal(_)));
}

#[test]
fn role_id_mismatch_is_fatal() {
    let f = Fixture::new();
    f.write_agent("a1.yaml", "agent-1", "worker", "    mode: any");
    f.write_org("o1.yaml", "org-1", "    - role_id: reviewer\n      ref: agents/definitions/a1.yaml");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);
    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);

    let err =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap_err();
    assert!(matches!(err, bp_core::CoreError::Internal(_)));
}

#[test]
fn allowlist_inclusion_rejects_non_member_org() {
    let f = Fixture::new();
    f.write_agent("a1.yaml", "agent-1", "worker", "    mode: allowlist\n    allow_org_ids: [other-org]");
    f.write_org("o1.yaml", "org-1", "    - role_id: worker\n      ref: agents/definitions/a1.yaml");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);
    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);

    let err =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap_err();
    assert!(matches!(err, bp_core::CoreError::Internal(_)));
}

#[test]
fn allowlist_inclusion_accepts_listed_org() {
    let f = Fixture::new();
    f.write_agent("a1.yaml", "agent-1", "worker", "    mode: allowlist\n    allow_org_ids: [org-1]");
    f.write_org("o1.yaml", "org-1", "    - role_id: worker\n      ref: agents/definitions/a1.yaml");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);
    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);

    let registry =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap();
    assert!(registry.included_agent_ids_for_org("org-1").unwrap().contains("agent-1"));
}

#[test]
fn absolute_ref_is_rejected() {
    let f = Fixture::new();
    f.write_agent("a1.yaml", "agent-1", "worker", "    mode: any");
    f.write_org("o1.yaml", "org-1", "    - role_id: worker\n      ref: /etc/passwd");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);
    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);

    let err =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap_err();
    assert!(matches!(err, bp_core::CoreError::PolicyViolation(_)));
}

#[test]
fn escaping_ref_is_rejected() {
    let f = Fixture::new();
    f.write_org("o1.yaml", "org-1", "    - role_id: worker\n      ref: \"../../../etc/passwd\"");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);
    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);

    let err =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap_err();
    assert!(matches!(err, bp_core::CoreError::PolicyViolation(_)));
}

#[test]
fn skill_contracts_directory_is_optional() {
    let f = Fixture::new();
    f.write_org("o1.yaml", "org-1", "    []");

    let schemas_dir = f.repo_root.join("schemas");
    fs::create_dir_all(&schemas_dir).unwrap();
    let validator = write_schemas(&schemas_dir);
    let (orgs_dir, agent_definitions_dir, skill_contracts_dir) = dirs(&f);

    let registry =
        Registry::load(RegistryDirs { orgs_dir: &orgs_dir, agent_definitions_dir: &agent_definitions_dir, skill_contracts_dir: &skill_contracts_dir }, &validator)
            .unwrap();
    assert!(registry.skill("anything", "1.0.0").is_none());
}
