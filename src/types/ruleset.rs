use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parse::{self, ParseError};
use crate::CarepathError;

use super::case::CaseRecord;
use super::error::LoadError;
use super::evaluation::Evaluation;
use super::expr::Expr;
use super::node::RuleNode;

/// Rule set metadata: which profile this is, its version, and where
/// traversal starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMeta {
    pub profile: String,
    pub version: String,
    pub entry: String,
}

/// The raw document shape: metadata plus an ordered list of node records.
///
/// This is the wire form produced by an external document parser (or by
/// [`RuleSet::from_json`]); [`RuleSet::load`] turns it into the indexed,
/// hashed graph model.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSetSource {
    pub meta: RuleMeta,
    pub nodes: Vec<SourceNode>,
}

/// One node record in a source document: its id plus the node body.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceNode {
    pub id: String,
    #[serde(flatten)]
    pub node: RuleNode,
}

/// A loaded, immutable rule graph. Thread-safe and designed to live behind
/// `Arc`: nodes, expression cache, and canonical hash are all fixed at load
/// time, so concurrent evaluations need no synchronization.
///
/// # Example
///
/// ```
/// use carepath::{CaseRecord, RuleSet};
///
/// let ruleset = RuleSet::from_json(
///     r#"{
///         "meta": {"profile": "dr_triage", "version": "1.0.0", "entry": "qc_check"},
///         "nodes": [
///             {"id": "qc_check", "type": "decision",
///              "when": "qc.fundus_pass == true",
///              "goto_true": "done", "goto_false": "qc_fail"},
///             {"id": "qc_fail", "type": "action",
///              "actions": [{"type": "abstain", "reason": "insufficient image quality"}]},
///             {"id": "done", "type": "action",
///              "actions": [{"type": "set_followup", "interval": "12m"}]}
///         ]
///     }"#,
/// )
/// .unwrap();
///
/// let case = CaseRecord::new().set("qc.fundus_pass", true);
/// let eval = ruleset.evaluate(&case).unwrap();
/// assert!(!eval.is_safety_stopped());
/// ```
#[derive(Debug)]
pub struct RuleSet {
    meta: RuleMeta,
    nodes: BTreeMap<String, RuleNode>,
    /// Expression cache keyed by source string, populated once at load.
    /// Parse failures are cached too, so the interpreter can surface them
    /// as safety stops instead of the loader rejecting the document.
    exprs: HashMap<String, Result<Expr, ParseError>>,
    hash: String,
}

impl RuleSet {
    /// Build a rule set from metadata and `(id, node)` pairs.
    ///
    /// Enforced here: at least one node, unique ids, and a defined entry
    /// node. Goto targets are checked at traversal time, not here, because
    /// references may be forward (and a dangling one must become a safety
    /// stop, not a load failure).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if validation fails.
    pub fn load(
        meta: RuleMeta,
        nodes: impl IntoIterator<Item = (String, RuleNode)>,
    ) -> Result<Self, LoadError> {
        let mut map = BTreeMap::new();
        for (id, node) in nodes {
            if map.insert(id.clone(), node).is_some() {
                return Err(LoadError::DuplicateNode { id });
            }
        }
        if map.is_empty() {
            return Err(LoadError::Empty);
        }
        if !map.contains_key(&meta.entry) {
            return Err(LoadError::MissingEntry {
                entry: meta.entry.clone(),
            });
        }

        let hash = crate::hash::canonical_hash(&meta, &map)?;

        let mut exprs: HashMap<String, Result<Expr, ParseError>> = HashMap::new();
        for node in map.values() {
            if let RuleNode::Decision { when, .. } = node {
                exprs
                    .entry(when.clone())
                    .or_insert_with(|| parse::parse(when));
            }
        }

        Ok(Self {
            meta,
            nodes: map,
            exprs,
            hash,
        })
    }

    /// Build a rule set from a parsed source document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if validation fails.
    pub fn from_source(source: RuleSetSource) -> Result<Self, LoadError> {
        Self::load(source.meta, source.nodes.into_iter().map(|n| (n.id, n.node)))
    }

    /// Deserialize a JSON rule document and load it.
    ///
    /// # Errors
    ///
    /// Returns [`CarepathError`] on malformed JSON (including unknown node
    /// or action `type` tags) or load failure.
    pub fn from_json(input: &str) -> Result<Self, CarepathError> {
        let source: RuleSetSource = serde_json::from_str(input)?;
        Ok(Self::from_source(source)?)
    }

    /// Read a JSON rule document from a file and load it.
    ///
    /// # Errors
    ///
    /// Returns [`CarepathError`] on I/O, document, or load failure.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, CarepathError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    #[must_use]
    pub fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    /// The cached canonical BLAKE3 hash, hex-encoded. Identical semantic
    /// content always yields an identical hash, regardless of the node
    /// order in the source document.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Resolve a node id. `None` means a dangling reference.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&RuleNode> {
        self.nodes.get(id)
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in canonical (sorted) order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// The cached parse of a decision expression, keyed by its source text.
    pub(crate) fn expr(&self, when: &str) -> Option<&Result<Expr, ParseError>> {
        self.exprs.get(when)
    }

    /// Evaluate a case with the default interpreter limits.
    ///
    /// This is a convenience wrapper over
    /// [`Interpreter::run`](crate::Interpreter::run).
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation`](crate::PreconditionViolation) only
    /// on caller misuse; graph and expression faults become safety stops
    /// inside the returned [`Evaluation`].
    pub fn evaluate(
        &self,
        case: &CaseRecord,
    ) -> Result<Evaluation, crate::PreconditionViolation> {
        crate::Interpreter::new().run(self, case)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} v{}, {} nodes, entry '{}')",
            self.meta.profile,
            self.meta.version,
            self.nodes.len(),
            self.meta.entry,
        )
    }
}
