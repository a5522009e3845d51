//! Evaluation-local explain context
//!
//! One `Explainer` exists per explain call. Nodes push an entry on the way
//! down and complete it on the way up; leaves attach their explainable
//! expectation here instead of keeping any state of their own, so the same
//! tree can be explained concurrently from several threads.

use std::fmt::Debug;

use super::config::ExplainConfig;
use super::errors::BoxError;
use super::record::{EntryDraft, EntryKind, EvaluationEntry, EvaluationRecord, Output, Remaining};
use crate::identity::RenderScope;

pub(crate) struct Explainer {
    config: ExplainConfig,
    stack: Vec<EntryDraft>,
    root: Option<EvaluationEntry>,
    pending_label: Option<String>,
    // Node descriptions render once per run.
    _render: RenderScope,
}

impl Explainer {
    pub(crate) fn new(config: ExplainConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            root: None,
            pending_label: None,
            _render: RenderScope::open(),
        }
    }

    pub(crate) fn config(&self) -> &ExplainConfig {
        &self.config
    }

    /// Renders a value for the record
    pub(crate) fn snapshot<V: ?Sized + Debug>(&self, value: &V) -> String {
        self.config.clip(format!("{:?}", value))
    }

    /// Labels the next entry to be opened
    pub(crate) fn label_next(&mut self, label: String) {
        self.pending_label = Some(label);
    }

    pub(crate) fn enter(&mut self, kind: EntryKind, description: String, input: String) {
        self.stack.push(EntryDraft {
            kind,
            label: self.pending_label.take(),
            description,
            input,
            expectation: None,
            actual: None,
            remaining: None,
            children: Vec::new(),
        });
    }

    /// Attaches an explainable leaf's expectation to the open entry
    pub(crate) fn annotate(&mut self, expectation: String, actual: Option<String>) {
        if let Some(draft) = self.stack.last_mut() {
            draft.expectation = Some(self.config.clip(expectation));
            draft.actual = actual.map(|a| self.config.clip(a));
        }
    }

    pub(crate) fn set_remaining(&mut self, remaining: Remaining) {
        if let Some(draft) = self.stack.last_mut() {
            draft.remaining = Some(remaining);
        }
    }

    /// Completes the open entry with a check result
    pub(crate) fn exit_check(&mut self, outcome: &Result<bool, BoxError>) {
        let output = match outcome {
            Ok(b) => Output::Bool(*b),
            Err(err) => Output::Fault(err.to_string()),
        };
        self.exit(output);
    }

    /// Completes the open entry with a transformer result
    pub(crate) fn exit_value<O: Debug>(&mut self, outcome: &Result<O, BoxError>) {
        let output = match outcome {
            Ok(value) => Output::Value(self.snapshot(value)),
            Err(err) => Output::Fault(err.to_string()),
        };
        self.exit(output);
    }

    fn exit(&mut self, output: Output) {
        let Some(draft) = self.stack.pop() else {
            return;
        };
        // A fault travelling up from a child is recorded once, at its origin.
        let output = match output {
            Output::Fault(message) => {
                if draft.children.iter().any(|c| c.output().is_fault()) {
                    Output::Aborted
                } else {
                    tracing::warn!(node = %draft.description, error = %message, "evaluation fault captured");
                    Output::Fault(message)
                }
            }
            other => other,
        };
        let entry = draft.finish(output);
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(entry),
            None => self.root = Some(entry),
        }
    }

    /// Closes the run and produces the record.
    ///
    /// If no entry was ever completed the record holds a single aborted
    /// entry described by `root`, reporting that no detail is available.
    pub(crate) fn finish(mut self, root: &str) -> EvaluationRecord {
        while !self.stack.is_empty() {
            self.exit(Output::Aborted);
        }
        let entry = self.root.unwrap_or_else(|| {
            EntryDraft {
                kind: EntryKind::Leaf,
                label: None,
                description: root.to_string(),
                input: "detail unavailable".to_string(),
                expectation: None,
                actual: None,
                remaining: None,
                children: Vec::new(),
            }
            .finish(Output::Aborted)
        });
        EvaluationRecord::new(entry)
    }
}
