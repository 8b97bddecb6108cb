// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document identifiers.
//!
//! Every identifier is an opaque string taken from a document's `metadata`
//! subtree; the core never generates one (that is the caller's job when it
//! authors a document). Keeping them as distinct newtypes instead of bare
//! `String` prevents accidentally comparing a `JobId` to an `AgentId`.

crate::define_doc_id!(JobId);
crate::define_doc_id!(OrgId);
crate::define_doc_id!(AgentId);
crate::define_doc_id!(ArtifactId);
crate::define_doc_id!(EvaluationId);
crate::define_doc_id!(SkillId);
