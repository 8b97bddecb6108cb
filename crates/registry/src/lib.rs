// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bp-registry: the read-only snapshot of organizations, agent definitions,
//! and skill contracts loaded from a repo tree at startup (C2).
//!
//! Depends on `bp-schema` because every loaded document is validated on
//! load (§4.2 step 1-4); depends on `bp-core` for the shared error taxonomy
//! and document-pointer helpers. Holds no database connection and performs
//! no I/O after [`Registry::load`] returns.

mod loader;
mod registry;

pub use registry::{AgentRecord, OrgRecord, Registry, RegistryDirs, SkillRecord};
