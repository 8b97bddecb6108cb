// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup configuration: two YAML documents, loaded once, fail-closed.
//!
//! Every relative path in the runtime document is resolved against that
//! document's own directory, never the process's working directory, so the
//! config tree stays relocatable.

use bp_core::{CoreError, CoreResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RuntimeFlags {
    pub role: String,
    pub strict_validation: bool,
    pub fail_closed: bool,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub schemas_dir: PathBuf,
    pub orgs_dir: PathBuf,
    pub agent_definitions_dir: PathBuf,
    pub skill_contracts_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub driver: String,
    pub sqlite_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub poll_interval_seconds: u64,
}

/// Everything needed to start a [`crate::ControlPlane`], aside from the
/// global limits (loaded separately as [`LimitsConfig`]).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub flags: RuntimeFlags,
    pub service: ServiceConfig,
    pub registry: RegistryConfig,
    pub storage: StorageConfig,
    pub scheduler: SchedulerConfig,
    pub config_dir: PathBuf,
}

/// Global upper bounds, independent of org policy (§4.3.2 of the job
/// contract rules `bp-policy` enforces).
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_iterations_upper_bound: i64,
    pub max_runtime_seconds_upper_bound: i64,
    pub max_cost_upper_bound_currency: String,
    pub max_cost_upper_bound: f64,
    pub max_expires_in_seconds_upper_bound: i64,
    pub require_known_org: bool,
}

impl From<LimitsConfig> for bp_policy::LimitsConfig {
    fn from(c: LimitsConfig) -> Self {
        bp_policy::LimitsConfig {
            max_iterations_upper_bound: c.max_iterations_upper_bound,
            max_runtime_seconds_upper_bound: c.max_runtime_seconds_upper_bound,
            max_cost_upper_bound_currency: c.max_cost_upper_bound_currency,
            max_cost_upper_bound: c.max_cost_upper_bound,
            max_expires_in_seconds_upper_bound: c.max_expires_in_seconds_upper_bound,
            require_known_org: c.require_known_org,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RuntimeRaw {
    #[serde(default)]
    runtime: RuntimeFlagsRaw,
    #[serde(default)]
    service: ServiceRaw,
    #[serde(default)]
    registry: RegistryRaw,
    #[serde(default)]
    storage: StorageRaw,
    #[serde(default)]
    scheduler: SchedulerRaw,
}

#[derive(Debug, Deserialize)]
struct RuntimeFlagsRaw {
    #[serde(default = "default_role")]
    role: String,
    #[serde(default = "default_true")]
    strict_validation: bool,
    #[serde(default = "default_true")]
    fail_closed: bool,
}

impl Default for RuntimeFlagsRaw {
    fn default() -> Self {
        Self { role: default_role(), strict_validation: true, fail_closed: true }
    }
}

fn default_role() -> String {
    "dev".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ServiceRaw {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServiceRaw {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize)]
struct RegistryRaw {
    #[serde(default = "default_schemas_dir")]
    schemas_dir: String,
    #[serde(default = "default_orgs_dir")]
    orgs_dir: String,
    #[serde(default = "default_agent_definitions_dir")]
    agent_definitions_dir: String,
    #[serde(default = "default_skill_contracts_dir")]
    skill_contracts_dir: String,
}

impl Default for RegistryRaw {
    fn default() -> Self {
        Self {
            schemas_dir: default_schemas_dir(),
            orgs_dir: default_orgs_dir(),
            agent_definitions_dir: default_agent_definitions_dir(),
            skill_contracts_dir: default_skill_contracts_dir(),
        }
    }
}

fn default_schemas_dir() -> String {
    "../../../schemas".to_string()
}
fn default_orgs_dir() -> String {
    "../../../orgs".to_string()
}
fn default_agent_definitions_dir() -> String {
    "../../../agents/definitions".to_string()
}
fn default_skill_contracts_dir() -> String {
    "../../../skills/contracts".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct StorageRaw {
    #[serde(default = "default_driver")]
    driver: String,
    #[serde(default)]
    sqlite: SqliteRaw,
}

fn default_driver() -> String {
    "sqlite".to_string()
}

#[derive(Debug, Deserialize)]
struct SqliteRaw {
    #[serde(default = "default_sqlite_path")]
    path: String,
}

impl Default for SqliteRaw {
    fn default() -> Self {
        Self { path: default_sqlite_path() }
    }
}

fn default_sqlite_path() -> String {
    "../state/core.sqlite".to_string()
}

#[derive(Debug, Deserialize)]
struct SchedulerRaw {
    #[serde(default)]
    enabled: bool,
    #[serde(default = "default_poll_interval")]
    poll_interval_seconds: u64,
}

impl Default for SchedulerRaw {
    fn default() -> Self {
        Self { enabled: false, poll_interval_seconds: default_poll_interval() }
    }
}

fn default_poll_interval() -> u64 {
    10
}

#[derive(Debug, Default, Deserialize)]
struct LimitsRaw {
    #[serde(default)]
    job_contract: JobContractLimitsRaw,
    #[serde(default)]
    registry: LimitsRegistryRaw,
}

#[derive(Debug, Deserialize)]
struct JobContractLimitsRaw {
    #[serde(default = "default_max_iterations")]
    max_iterations_upper_bound: i64,
    #[serde(default = "default_max_runtime")]
    max_runtime_seconds_upper_bound: i64,
    #[serde(default)]
    max_cost_upper_bound: MaxCostRaw,
    #[serde(default = "default_max_expires")]
    max_expires_in_seconds_upper_bound: i64,
}

impl Default for JobContractLimitsRaw {
    fn default() -> Self {
        Self {
            max_iterations_upper_bound: default_max_iterations(),
            max_runtime_seconds_upper_bound: default_max_runtime(),
            max_cost_upper_bound: MaxCostRaw::default(),
            max_expires_in_seconds_upper_bound: default_max_expires(),
        }
    }
}

fn default_max_iterations() -> i64 {
    500
}
fn default_max_runtime() -> i64 {
    86_400
}
fn default_max_expires() -> i64 {
    604_800
}

#[derive(Debug, Deserialize)]
struct MaxCostRaw {
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default = "default_max_cost")]
    max_cost: f64,
}

impl Default for MaxCostRaw {
    fn default() -> Self {
        Self { currency: default_currency(), max_cost: default_max_cost() }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}
fn default_max_cost() -> f64 {
    100.0
}

#[derive(Debug, Deserialize)]
struct LimitsRegistryRaw {
    #[serde(default = "default_true")]
    require_known_org: bool,
}

impl Default for LimitsRegistryRaw {
    fn default() -> Self {
        Self { require_known_org: true }
    }
}

fn resolve_path(base_dir: &Path, raw: &str) -> PathBuf {
    let p = Path::new(raw);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    let joined = base_dir.join(p);
    joined.canonicalize().unwrap_or(joined)
}

fn load_yaml(path: &Path) -> CoreResult<serde_yaml::Value> {
    if !path.exists() {
        return Err(CoreError::internal(format!("missing required config file: {}", path.display())));
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CoreError::internal(format!("reading config file {}: {e}", path.display())))?;
    let value: serde_yaml::Value = serde_yaml::from_str(&raw)
        .map_err(|e| CoreError::internal(format!("parsing config file {}: {e}", path.display())))?;
    if !value.is_mapping() {
        return Err(CoreError::internal(format!("config file root must be a YAML mapping: {}", path.display())));
    }
    Ok(value)
}

/// Load `runtime.yaml`-shaped configuration. Every relative path inside is
/// resolved against `runtime_config_path`'s own directory.
pub fn load_runtime_config(runtime_config_path: impl AsRef<Path>) -> CoreResult<RuntimeConfig> {
    let runtime_config_path = runtime_config_path.as_ref();
    let cfg_dir = runtime_config_path
        .parent()
        .map(|p| p.canonicalize().unwrap_or_else(|_| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    let raw = load_yaml(runtime_config_path)?;
    let raw: RuntimeRaw = serde_yaml::from_value(raw)
        .map_err(|e| CoreError::internal(format!("invalid runtime config shape {}: {e}", runtime_config_path.display())))?;

    let sqlite_path = crate::env::sqlite_path().unwrap_or_else(|| resolve_path(&cfg_dir, &raw.storage.sqlite.path));

    Ok(RuntimeConfig {
        flags: RuntimeFlags {
            role: raw.runtime.role,
            strict_validation: raw.runtime.strict_validation,
            fail_closed: raw.runtime.fail_closed,
        },
        service: ServiceConfig { host: raw.service.host, port: raw.service.port },
        registry: RegistryConfig {
            schemas_dir: resolve_path(&cfg_dir, &raw.registry.schemas_dir),
            orgs_dir: resolve_path(&cfg_dir, &raw.registry.orgs_dir),
            agent_definitions_dir: resolve_path(&cfg_dir, &raw.registry.agent_definitions_dir),
            skill_contracts_dir: resolve_path(&cfg_dir, &raw.registry.skill_contracts_dir),
        },
        storage: StorageConfig { driver: raw.storage.driver, sqlite_path },
        scheduler: SchedulerConfig { enabled: raw.scheduler.enabled, poll_interval_seconds: raw.scheduler.poll_interval_seconds },
        config_dir: cfg_dir,
    })
}

/// Load `limits.yaml`-shaped configuration.
pub fn load_limits_config(limits_config_path: impl AsRef<Path>) -> CoreResult<LimitsConfig> {
    let limits_config_path = limits_config_path.as_ref();
    let raw = load_yaml(limits_config_path)?;
    let raw: LimitsRaw = serde_yaml::from_value(raw)
        .map_err(|e| CoreError::internal(format!("invalid limits config shape {}: {e}", limits_config_path.display())))?;

    Ok(LimitsConfig {
        max_iterations_upper_bound: raw.job_contract.max_iterations_upper_bound,
        max_runtime_seconds_upper_bound: raw.job_contract.max_runtime_seconds_upper_bound,
        max_cost_upper_bound_currency: raw.job_contract.max_cost_upper_bound.currency,
        max_cost_upper_bound: raw.job_contract.max_cost_upper_bound.max_cost,
        max_expires_in_seconds_upper_bound: raw.job_contract.max_expires_in_seconds_upper_bound,
        require_known_org: raw.registry.require_known_org,
    })
}

/// Conventional config file locations relative to the process's working
/// directory, used when no environment override is set.
pub fn default_config_paths() -> (PathBuf, PathBuf) {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    (cwd.join("config/runtime.yaml"), cwd.join("config/limits.yaml"))
}

/// Resolve the runtime and limits config paths, honoring [`crate::env`]
/// overrides before falling back to [`default_config_paths`].
pub fn resolve_config_paths() -> (PathBuf, PathBuf) {
    let (default_runtime, default_limits) = default_config_paths();
    (crate::env::runtime_config_path().unwrap_or(default_runtime), crate::env::limits_config_path().unwrap_or(default_limits))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
