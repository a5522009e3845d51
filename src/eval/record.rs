//! Evaluation records produced by the explain path
//!
//! A record is a rooted, ordered tree with one entry per visited node.
//! Entries that were never evaluated (short-circuited junction operands,
//! elements past a quantifier cut) are absent, never shown as false.
//!
//! Expectations are assigned top-down once the tree is complete, starting
//! from an expected `true` at the root.

use serde::Serialize;

use crate::node::QuantifierKind;

/// Which node kind produced an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Leaf,
    Not,
    All { shortcut: bool },
    Any { shortcut: bool },
    /// Mapper then checker
    Transform,
    /// A single transformer segment
    Mapper,
    /// A flattened composition of transformer segments
    Chain,
    Quantifier { quantifier: QuantifierKind },
    /// Opens a fresh bundle scope and binds slot 0
    Nested { quantifier: QuantifierKind },
    /// Binds the next bundle slot inside a scope
    Bind { quantifier: QuantifierKind },
    Context { indices: Vec<usize> },
}

impl EntryKind {
    fn quantifier(&self) -> Option<QuantifierKind> {
        match self {
            EntryKind::Quantifier { quantifier }
            | EntryKind::Nested { quantifier }
            | EntryKind::Bind { quantifier } => Some(*quantifier),
            _ => None,
        }
    }
}

/// What a node produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Output {
    /// A check result
    Bool(bool),
    /// A transformer result, rendered
    Value(String),
    /// The node's behavior raised; the rendered error
    Fault(String),
    /// A descendant raised, so this node never produced a value
    Aborted,
}

impl Output {
    /// Returns the boolean result, if this is a check output
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Output::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns true for `Fault` and `Aborted`
    pub fn is_fault(&self) -> bool {
        matches!(self, Output::Fault(_) | Output::Aborted)
    }
}

/// Snapshot of the elements a quantifier did not consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Remaining {
    Elements { values: Vec<String>, truncated: bool },
    /// The source cannot report what it has not produced yet
    Unavailable,
}

/// One visited node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationEntry {
    kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    description: String,
    input: String,
    output: Output,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<bool>,
    mismatch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expectation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<Remaining>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<EvaluationEntry>,
}

/// Entry fields collected while a node is being evaluated.
#[derive(Debug)]
pub(crate) struct EntryDraft {
    pub kind: EntryKind,
    pub label: Option<String>,
    pub description: String,
    pub input: String,
    pub expectation: Option<String>,
    pub actual: Option<String>,
    pub remaining: Option<Remaining>,
    pub children: Vec<EvaluationEntry>,
}

impl EntryDraft {
    pub(crate) fn finish(self, output: Output) -> EvaluationEntry {
        EvaluationEntry {
            kind: self.kind,
            label: self.label,
            description: self.description,
            input: self.input,
            output,
            expected: None,
            mismatch: false,
            expectation: self.expectation,
            actual: self.actual,
            remaining: self.remaining,
            children: self.children,
        }
    }
}

impl EvaluationEntry {
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Position label, e.g. `[2]` for the third quantified element
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Snapshot of the value fed into the node
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// What this entry should have produced for the root to pass.
    ///
    /// `None` when the entry did not contribute to the outcome.
    pub fn expected(&self) -> Option<bool> {
        self.expected
    }

    pub fn is_mismatch(&self) -> bool {
        self.mismatch
    }

    /// Domain-specific expectation from an explainable leaf
    pub fn expectation(&self) -> Option<&str> {
        self.expectation.as_deref()
    }

    /// Domain-specific rendering of the actual value from an explainable leaf
    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    pub fn remaining(&self) -> Option<&Remaining> {
        self.remaining.as_ref()
    }

    pub fn children(&self) -> &[EvaluationEntry] {
        &self.children
    }

    /// Returns true if this entry or any descendant mismatches
    pub fn contains_mismatch(&self) -> bool {
        self.mismatch || self.children.iter().any(EvaluationEntry::contains_mismatch)
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a EvaluationEntry>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }

    /// Assigns expectations and mismatch flags to this subtree.
    fn assign(&mut self, expected: Option<bool>) {
        self.expected = match self.output {
            Output::Bool(_) => expected,
            _ => None,
        };
        self.mismatch = match (&self.output, self.expected) {
            (Output::Fault(_), _) => true,
            (Output::Bool(actual), Some(expected)) => *actual != expected,
            _ => false,
        };

        let child_expected = if self.mismatch {
            self.child_expectation()
        } else {
            None
        };
        for child in &mut self.children {
            child.assign(child_expected);
        }
    }

    /// Expectation passed down to the children of a mismatching entry.
    fn child_expectation(&self) -> Option<bool> {
        let expected = self.expected?;
        if let Some(quantifier) = self.kind.quantifier() {
            // Cut seen: the deciding element should not have hit the cut.
            // No cut seen: some element should have.
            let cut_seen = self.output.as_bool() == Some(!quantifier.default_value());
            return Some(if cut_seen {
                !quantifier.cut_value()
            } else {
                quantifier.cut_value()
            });
        }
        match self.kind {
            EntryKind::Not => Some(!expected),
            EntryKind::All { .. }
            | EntryKind::Any { .. }
            | EntryKind::Transform
            | EntryKind::Context { .. } => Some(expected),
            _ => None,
        }
    }
}

/// Complete trace of one explain run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    root: EvaluationEntry,
}

impl EvaluationRecord {
    pub(crate) fn new(mut root: EvaluationEntry) -> Self {
        root.assign(Some(true));
        Self { root }
    }

    pub fn root(&self) -> &EvaluationEntry {
        &self.root
    }

    /// The root's boolean result, `None` for transformer roots and faults
    pub fn outcome(&self) -> Option<bool> {
        self.root.output.as_bool()
    }

    /// All entries in depth-first order
    pub fn entries(&self) -> Vec<&EvaluationEntry> {
        let mut out = Vec::new();
        self.root.collect(&mut out);
        out
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Always false: a record has at least its root entry
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Entries flagged as mismatching, depth-first
    pub fn mismatches(&self) -> Vec<&EvaluationEntry> {
        self.entries().into_iter().filter(|e| e.mismatch).collect()
    }

    /// The entry whose behavior raised, if any
    pub fn fault_origin(&self) -> Option<&EvaluationEntry> {
        self.entries()
            .into_iter()
            .find(|e| matches!(e.output, Output::Fault(_)))
    }

    /// First entry with the given description, depth-first
    pub fn find(&self, description: &str) -> Option<&EvaluationEntry> {
        self.entries()
            .into_iter()
            .find(|e| e.description == description)
    }

    /// Serializes the record as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, description: &str, output: Output, children: Vec<EvaluationEntry>) -> EvaluationEntry {
        EntryDraft {
            kind,
            label: None,
            description: description.to_string(),
            input: "v".to_string(),
            expectation: None,
            actual: None,
            remaining: None,
            children,
        }
        .finish(output)
    }

    #[test]
    fn test_only_deciding_child_flagged() {
        let root = entry(
            EntryKind::All { shortcut: true },
            "a&&b",
            Output::Bool(false),
            vec![
                entry(EntryKind::Leaf, "a", Output::Bool(true), vec![]),
                entry(EntryKind::Leaf, "b", Output::Bool(false), vec![]),
            ],
        );
        let record = EvaluationRecord::new(root);

        let flagged: Vec<&str> = record.mismatches().iter().map(|e| e.description()).collect();
        assert_eq!(flagged, vec!["a&&b", "b"]);
    }

    #[test]
    fn test_negation_flips_expectation() {
        let root = entry(
            EntryKind::Not,
            "!(a)",
            Output::Bool(false),
            vec![entry(EntryKind::Leaf, "a", Output::Bool(true), vec![])],
        );
        let record = EvaluationRecord::new(root);

        let child = &record.root().children()[0];
        assert_eq!(child.expected(), Some(false));
        assert!(child.is_mismatch());
    }

    #[test]
    fn test_passing_subtree_carries_no_expectation() {
        let root = entry(
            EntryKind::Any { shortcut: true },
            "a||b",
            Output::Bool(true),
            vec![
                entry(EntryKind::Leaf, "a", Output::Bool(false), vec![]),
                entry(EntryKind::Leaf, "b", Output::Bool(true), vec![]),
            ],
        );
        let record = EvaluationRecord::new(root);

        assert!(record.mismatches().is_empty());
        assert_eq!(record.root().children()[0].expected(), None);
    }

    #[test]
    fn test_quantifier_cut_expectation() {
        let root = entry(
            EntryKind::Quantifier {
                quantifier: QuantifierKind::None,
            },
            "none(a)",
            Output::Bool(false),
            vec![
                entry(EntryKind::Leaf, "a", Output::Bool(false), vec![]),
                entry(EntryKind::Leaf, "a", Output::Bool(true), vec![]),
            ],
        );
        let record = EvaluationRecord::new(root);

        let children = record.root().children();
        assert_eq!(children[0].expected(), Some(false));
        assert!(!children[0].is_mismatch());
        assert!(children[1].is_mismatch());
    }

    #[test]
    fn test_fault_is_mismatch_and_origin() {
        let root = entry(
            EntryKind::Not,
            "!(boom)",
            Output::Aborted,
            vec![entry(EntryKind::Leaf, "boom", Output::Fault("boom".into()), vec![])],
        );
        let record = EvaluationRecord::new(root);

        assert_eq!(record.outcome(), None);
        assert_eq!(record.fault_origin().map(|e| e.description()), Some("boom"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_to_json() {
        let record = EvaluationRecord::new(entry(EntryKind::Leaf, "a", Output::Bool(false), vec![]));
        let json = record.to_json().unwrap();
        assert!(json.contains("\"description\": \"a\""));
        assert!(json.contains("\"mismatch\": true"));
    }
}
