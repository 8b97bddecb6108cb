//! Workspace-level end-to-end tests: drives the `bp` binary exactly the way
//! an external caller would, against a throwaway registry/config/sqlite
//! fixture. Unit-level coverage of the decision engine lives in
//! `bp-engine`'s own test module; these tests exist to catch wiring bugs
//! between the CLI, config loading, and the control plane that no single
//! crate's tests can see.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

struct Fixture {
    _tmp: tempfile::TempDir,
    runtime_config: PathBuf,
    limits_config: PathBuf,
}

const PERMISSIVE_SCHEMA: &str = "\"$schema\": \"https://json-schema.org/draft/2020-12/schema\"\ntype: object\n";

const ORG_SPEC: &str = "kind: OrganizationManifest\nmetadata:\n  org_id: org-1\nspec:\n  agent_roles:\n    - role_id: worker\n      ref: agents/definitions/a1.yaml\n  artifact_policy:\n    allowed_types: []\n    denied_types: []\n  skill_policy:\n    default_rule: allow\n    allow: {}\n    deny: {}\n  external_access:\n    mcp:\n      allowed: []\n    direct_network:\n      policy: allow_all\n      allowlist: {}\n      denylist: {}\n  execution_limits:\n    concurrency:\n      max_active_jobs: 5\n    rate_limits:\n      max_job_starts_per_minute: 10\n    cost_caps:\n      currency: USD\n      max_cost_per_job: 100.0\n    timeouts:\n      max_job_runtime_seconds: 3600\n";

const AGENT_SPEC: &str = "kind: AgentDefinition\nmetadata:\n  agent_id: agent-1\n  role: worker\nspec:\n  role: worker\n  authority:\n    level: senior\n  org_inclusion:\n    mode: any\n";

fn job_doc(job_id: &str) -> String {
    format!(
        "{{\"metadata\": {{\"job_id\": \"{job_id}\", \"org_id\": \"org-1\"}}, \"spec\": {{\
         \"status\": {{\"state\": \"created\", \"status_updated_at\": \"2026-01-01T00:00:00.000Z\"}}, \
         \"timestamps\": {{\"created_at\": \"2026-01-01T00:00:00.000Z\", \"expires_at\": \"2026-01-01T01:00:00.000Z\"}}, \
         \"execution_limits\": {{\"max_iterations\": 10, \"max_runtime_seconds\": 60, \
         \"cost_cap\": {{\"currency\": \"USD\", \"max_cost\": 1.0}}}}}}}}"
    )
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let registry = tmp.path().join("registry");
        fs::create_dir_all(registry.join("orgs")).unwrap();
        fs::create_dir_all(registry.join("agents/definitions")).unwrap();
        fs::create_dir_all(registry.join("schemas")).unwrap();
        for kind in bp_schema::Kind::ALL {
            fs::write(registry.join("schemas").join(kind.schema_filename()), PERMISSIVE_SCHEMA).unwrap();
        }
        fs::write(registry.join("orgs/o1.yaml"), ORG_SPEC).unwrap();
        fs::write(registry.join("agents/definitions/a1.yaml"), AGENT_SPEC).unwrap();

        let config = tmp.path().join("config");
        fs::create_dir_all(&config).unwrap();
        let runtime_config = config.join("runtime.yaml");
        fs::write(
            &runtime_config,
            "registry:\n  schemas_dir: ../registry/schemas\n  orgs_dir: ../registry/orgs\n  agent_definitions_dir: ../registry/agents/definitions\n  skill_contracts_dir: ../registry/skills/contracts\nstorage:\n  driver: sqlite\n  sqlite:\n    path: ../state/core.sqlite\n",
        )
        .unwrap();
        let limits_config = config.join("limits.yaml");
        fs::write(&limits_config, "job_contract:\n  max_cost_upper_bound:\n    currency: USD\n    max_cost: 100.0\n").unwrap();

        Self { _tmp: tmp, runtime_config, limits_config }
    }

    fn write_doc(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn path(&self) -> &Path {
        self.runtime_config.parent().unwrap().parent().unwrap()
    }

    fn bp(&self) -> Command {
        let mut cmd = Command::cargo_bin("bp").unwrap();
        cmd.arg("--runtime-config").arg(&self.runtime_config).arg("--limits-config").arg(&self.limits_config);
        cmd
    }
}

#[test]
fn validate_accepts_a_well_formed_job_contract() {
    let f = Fixture::new();
    let job = f.write_doc("job.json", &job_doc("job-1"));

    f.bp().args(["validate", "JobContract"]).arg(&job).assert().success().stdout(predicates::str::contains("is valid"));
}

#[test]
fn submit_job_then_get_job_roundtrips_through_the_cli() {
    let f = Fixture::new();
    let job = f.write_doc("job.json", &job_doc("job-1"));

    f.bp().args(["submit-job"]).arg(&job).assert().success();
    f.bp().args(["get-job", "job-1"]).assert().success().stdout(predicates::str::contains("\"created\""));
}

#[test]
fn stop_job_on_a_freshly_created_job_is_a_conflict() {
    let f = Fixture::new();
    let job = f.write_doc("job.json", &job_doc("job-1"));

    f.bp().args(["submit-job"]).arg(&job).assert().success();
    f.bp().args(["stop-job", "job-1"]).assert().failure().code(49);
}
