//! Canonical content hashing of rule sets.
//!
//! The hash must be invariant to the declaration order of the source
//! `nodes` list: two documents with the same nodes in a different order are
//! the same rule set and must audit identically. Canonicalization therefore
//! serializes the node map in sorted-id order (a `BTreeMap` guarantees
//! this) with fixed struct field order, and hashes the resulting JSON bytes
//! with BLAKE3.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{RuleMeta, RuleNode};

#[derive(Serialize)]
struct Canonical<'a> {
    meta: &'a RuleMeta,
    nodes: &'a BTreeMap<String, RuleNode>,
}

/// Hex-encoded BLAKE3 digest of the canonical rule set form.
///
/// Computed once per load and cached by the [`RuleSet`](crate::RuleSet) for
/// its lifetime.
pub(crate) fn canonical_hash(
    meta: &RuleMeta,
    nodes: &BTreeMap<String, RuleNode>,
) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(&Canonical { meta, nodes })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
