// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seven canonical document kinds and their on-disk schema filenames.

use bp_core::{simple_display, CoreError, CoreResult};
use std::str::FromStr;

/// A canonical document kind. Every document carries its kind in
/// `metadata.kind`, and the schema directory carries exactly one schema file
/// per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    OrganizationManifest,
    AgentDefinition,
    SkillContract,
    MemoryEntry,
    JobContract,
    Artifact,
    Evaluation,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::OrganizationManifest,
        Kind::AgentDefinition,
        Kind::SkillContract,
        Kind::MemoryEntry,
        Kind::JobContract,
        Kind::Artifact,
        Kind::Evaluation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::OrganizationManifest => "OrganizationManifest",
            Kind::AgentDefinition => "AgentDefinition",
            Kind::SkillContract => "SkillContract",
            Kind::MemoryEntry => "MemoryEntry",
            Kind::JobContract => "JobContract",
            Kind::Artifact => "Artifact",
            Kind::Evaluation => "Evaluation",
        }
    }

    /// The schema filename this kind loads from the schemas directory.
    pub fn schema_filename(self) -> &'static str {
        match self {
            Kind::OrganizationManifest => "organization_manifest.schema.yaml",
            Kind::AgentDefinition => "agent_definition.schema.yaml",
            Kind::SkillContract => "skill_contract.schema.yaml",
            Kind::MemoryEntry => "memory_entry.schema.yaml",
            Kind::JobContract => "job_contract.schema.yaml",
            Kind::Artifact => "artifact.schema.yaml",
            Kind::Evaluation => "evaluation.schema.yaml",
        }
    }
}

simple_display! {
    Kind {
        OrganizationManifest => "OrganizationManifest",
        AgentDefinition => "AgentDefinition",
        SkillContract => "SkillContract",
        MemoryEntry => "MemoryEntry",
        JobContract => "JobContract",
        Artifact => "Artifact",
        Evaluation => "Evaluation",
    }
}

impl FromStr for Kind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::contract_violation("UNKNOWN_KIND", format!("unknown schema kind: {s}")))
    }
}
