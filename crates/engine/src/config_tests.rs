use super::*;
use bp_core::CoreError;

#[test]
fn loads_runtime_config_with_relative_paths_resolved_against_config_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_dir = tmp.path().join("runtime/core/config");
    std::fs::create_dir_all(&cfg_dir).unwrap();
    std::fs::create_dir_all(tmp.path().join("schemas")).unwrap();
    std::fs::write(
        cfg_dir.join("runtime.yaml"),
        "runtime:\n  role: compute\n  strict_validation: true\n  fail_closed: true\nservice:\n  host: 127.0.0.1\n  port: 9090\nregistry:\n  schemas_dir: ../../../schemas\n  orgs_dir: ../../../orgs\n  agent_definitions_dir: ../../../agents/definitions\n  skill_contracts_dir: ../../../skills/contracts\nstorage:\n  driver: sqlite\n  sqlite:\n    path: ../state/core.sqlite\nscheduler:\n  enabled: false\n  poll_interval_seconds: 5\n",
    )
    .unwrap();

    let cfg = load_runtime_config(cfg_dir.join("runtime.yaml")).unwrap();
    assert_eq!(cfg.flags.role, "compute");
    assert_eq!(cfg.service.port, 9090);
    assert_eq!(cfg.registry.schemas_dir, tmp.path().join("schemas").canonicalize().unwrap());
    assert_eq!(cfg.storage.sqlite_path, tmp.path().join("runtime/core/state/core.sqlite"));
    assert!(!cfg.scheduler.enabled);
}

#[test]
fn runtime_config_applies_defaults_for_missing_sections() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("runtime.yaml");
    std::fs::write(&path, "runtime: {}\n").unwrap();

    let cfg = load_runtime_config(&path).unwrap();
    assert_eq!(cfg.flags.role, "dev");
    assert!(cfg.flags.strict_validation);
    assert!(cfg.flags.fail_closed);
    assert_eq!(cfg.service.host, "0.0.0.0");
    assert_eq!(cfg.service.port, 8080);
    assert!(!cfg.scheduler.enabled);
}

#[test]
fn missing_runtime_config_file_fails_closed() {
    let tmp = tempfile::tempdir().unwrap();
    let err = load_runtime_config(tmp.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, CoreError::Internal(_)));
}

#[test]
fn loads_limits_config_with_explicit_values() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("limits.yaml");
    std::fs::write(
        &path,
        "job_contract:\n  max_iterations_upper_bound: 10\n  max_runtime_seconds_upper_bound: 60\n  max_cost_upper_bound:\n    currency: USD\n    max_cost: 1.5\n  max_expires_in_seconds_upper_bound: 3600\nregistry:\n  require_known_org: false\n",
    )
    .unwrap();

    let limits = load_limits_config(&path).unwrap();
    assert_eq!(limits.max_iterations_upper_bound, 10);
    assert_eq!(limits.max_cost_upper_bound_currency, "USD");
    assert_eq!(limits.max_cost_upper_bound, 1.5);
    assert!(!limits.require_known_org);
}

#[test]
fn limits_config_applies_defaults_when_file_is_empty_mapping() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("limits.yaml");
    std::fs::write(&path, "{}\n").unwrap();

    let limits = load_limits_config(&path).unwrap();
    assert_eq!(limits.max_iterations_upper_bound, 500);
    assert_eq!(limits.max_cost_upper_bound_currency, "USD");
    assert!(limits.require_known_org);
}
