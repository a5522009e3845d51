//! Check nodes
//!
//! `Check<T>` is the printable wrapper for everything check-shaped: an
//! identity, a description and the node behavior. Calling [`Check::test`]
//! runs the composed behaviors directly; the explain path walks the same
//! node through `explain_into`.

use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::errors::ConstructionResult;
use super::logic::{self, Junction};
use crate::eval::explainer::Explainer;
use crate::eval::{BoxError, EntryKind, EvaluationRecord, Evaluator, ExplainResult};
use crate::identity::{Description, Identity};

/// A primitive check wrapped by a leaf node.
///
/// Implementors can override the two `explain_*` hooks to give the report a
/// domain-specific expected/actual pair instead of the generic description.
pub trait LeafCheck<T: ?Sized>: Send + Sync {
    fn test(&self, value: &T) -> Result<bool, BoxError>;

    /// What the leaf expected, e.g. the literal of an equality check
    fn explain_expectation(&self) -> Option<String> {
        None
    }

    /// How the actual value should be shown next to the expectation
    fn explain_actual(&self, value: &T) -> Option<String> {
        let _ = value;
        None
    }
}

/// Adapts an infallible closure
pub(crate) struct FnLeaf<F>(pub(crate) F);

impl<T: ?Sized, F> LeafCheck<T> for FnLeaf<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn test(&self, value: &T) -> Result<bool, BoxError> {
        Ok((self.0)(value))
    }
}

/// Adapts a fallible closure
pub(crate) struct TryFnLeaf<F>(pub(crate) F);

impl<T: ?Sized, F> LeafCheck<T> for TryFnLeaf<F>
where
    F: Fn(&T) -> Result<bool, BoxError> + Send + Sync,
{
    fn test(&self, value: &T) -> Result<bool, BoxError> {
        (self.0)(value)
    }
}

/// Node behaviors whose children have a different input type.
pub(crate) trait Composite<T: ?Sized>: Send + Sync {
    fn kind(&self) -> EntryKind;
    fn test(&self, value: &T) -> Result<bool, BoxError>;
    fn explain(&self, value: &T, cx: &mut Explainer) -> Result<bool, BoxError>;
}

pub(crate) enum CheckNode<T: ?Sized> {
    Leaf(Box<dyn LeafCheck<T>>),
    Not(Check<T>),
    Junction {
        junction: Junction,
        shortcut: bool,
        operands: Vec<Check<T>>,
    },
    Composite(Box<dyn Composite<T>>),
}

impl<T: ?Sized> CheckNode<T> {
    fn test(&self, value: &T) -> Result<bool, BoxError> {
        match self {
            CheckNode::Leaf(leaf) => leaf.test(value),
            CheckNode::Not(inner) => inner.test(value).map(|b| !b),
            CheckNode::Junction {
                junction,
                shortcut,
                operands,
            } => junction.test(*shortcut, operands, value),
            CheckNode::Composite(composite) => composite.test(value),
        }
    }

    fn kind(&self) -> EntryKind {
        match self {
            CheckNode::Leaf(_) => EntryKind::Leaf,
            CheckNode::Not(_) => EntryKind::Not,
            CheckNode::Junction {
                junction: Junction::All,
                shortcut,
                ..
            } => EntryKind::All {
                shortcut: *shortcut,
            },
            CheckNode::Junction {
                junction: Junction::Any,
                shortcut,
                ..
            } => EntryKind::Any {
                shortcut: *shortcut,
            },
            CheckNode::Composite(composite) => composite.kind(),
        }
    }
}

/// A boolean-valued node of the expression tree.
///
/// Equality and hashing are decided by the
/// [`Identity`] alone; the wrapped closures never take part.
pub struct Check<T: ?Sized> {
    identity: Identity,
    description: Description,
    node: Arc<CheckNode<T>>,
}

impl<T: ?Sized> Clone for Check<T> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            description: self.description.clone(),
            node: Arc::clone(&self.node),
        }
    }
}

impl<T: ?Sized> Check<T> {
    pub(crate) fn from_node(identity: Identity, description: Description, node: CheckNode<T>) -> Self {
        Self {
            identity,
            description,
            node: Arc::new(node),
        }
    }

    /// Returns the value identity used for equality and hashing
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the description shown in reports
    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Evaluates the check. This is the fast path: no record, no logging.
    ///
    /// # Errors
    ///
    /// Returns whatever error a wrapped behavior raised, unmodified.
    pub fn test(&self, value: &T) -> Result<bool, BoxError> {
        self.node.test(value)
    }

    /// Operands, if this node is a junction
    pub(crate) fn junction(&self) -> Option<(Junction, bool, &[Check<T>])> {
        match &*self.node {
            CheckNode::Junction {
                junction,
                shortcut,
                operands,
            } => Some((*junction, *shortcut, operands.as_slice())),
            _ => None,
        }
    }

    /// Whether the description needs parentheses inside a junction
    pub(crate) fn is_compound(&self) -> bool {
        self.junction().is_some_and(|(_, _, operands)| operands.len() > 1)
    }

    /// Explain-path evaluation: records this node and its children.
    pub(crate) fn explain_into(&self, value: &T, cx: &mut Explainer) -> Result<bool, BoxError>
    where
        T: Debug,
    {
        let input = cx.snapshot(value);
        cx.enter(self.node.kind(), self.description.render().into_owned(), input);

        let outcome = match &*self.node {
            CheckNode::Leaf(leaf) => {
                let outcome = leaf.test(value);
                if outcome.is_ok() {
                    if let Some(expectation) = leaf.explain_expectation() {
                        cx.annotate(expectation, leaf.explain_actual(value));
                    }
                }
                outcome
            }
            CheckNode::Not(inner) => inner.explain_into(value, cx).map(|b| !b),
            CheckNode::Junction {
                junction,
                shortcut,
                operands,
            } => junction.explain(*shortcut, operands, value, cx),
            CheckNode::Composite(composite) => composite.explain(value, cx),
        };

        cx.exit_check(&outcome);
        outcome
    }

    /// Explains this check with a default [`Evaluator`].
    ///
    /// # Errors
    ///
    /// See [`Evaluator::explain`].
    pub fn explain(&self, value: &T) -> ExplainResult<EvaluationRecord>
    where
        T: Debug,
    {
        Evaluator::default().explain(self, value)
    }
}

impl<T: ?Sized + 'static> Check<T> {
    /// Wraps a primitive check under an explicit identity.
    ///
    /// Two checks wrapped with equal identities compare equal and hash
    /// equally regardless of the behavior passed.
    pub fn with_identity<L>(identity: Identity, description: impl Into<Description>, leaf: L) -> Self
    where
        L: LeafCheck<T> + 'static,
    {
        Self::from_node(identity, description.into(), CheckNode::Leaf(Box::new(leaf)))
    }

    /// Wraps an anonymous closure. Every call yields a distinct identity.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let identity = Identity::anonymous();
        let description = Description::literal(identity.to_string());
        Self::with_identity(identity, description, FnLeaf(f))
    }

    /// Wraps a closure under a name, used as both identity and description.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::EmptyCreator` for a blank name.
    pub fn named<F>(name: impl Into<Cow<'static, str>>, f: F) -> ConstructionResult<Self>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let identity = Identity::new(name, Vec::new())?;
        let description = Description::literal(identity.creator().to_string());
        Ok(Self::with_identity(identity, description, FnLeaf(f)))
    }

    /// Like [`Check::named`], for closures that can fail.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::EmptyCreator` for a blank name.
    pub fn try_named<F, E>(name: impl Into<Cow<'static, str>>, f: F) -> ConstructionResult<Self>
    where
        F: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let identity = Identity::new(name, Vec::new())?;
        let description = Description::literal(identity.creator().to_string());
        let leaf = TryFnLeaf(move |value: &T| -> Result<bool, BoxError> { f(value).map_err(Into::into) });
        Ok(Self::with_identity(identity, description, leaf))
    }

    /// Short-circuit conjunction
    pub fn and(self, other: impl IntoCheck<T>) -> Self {
        logic::connect(Junction::All, true, vec![self, other.into_check()])
    }

    /// Conjunction that evaluates every operand
    pub fn and_eager(self, other: impl IntoCheck<T>) -> Self {
        logic::connect(Junction::All, false, vec![self, other.into_check()])
    }

    /// Short-circuit disjunction
    pub fn or(self, other: impl IntoCheck<T>) -> Self {
        logic::connect(Junction::Any, true, vec![self, other.into_check()])
    }

    /// Disjunction that evaluates every operand
    pub fn or_eager(self, other: impl IntoCheck<T>) -> Self {
        logic::connect(Junction::Any, false, vec![self, other.into_check()])
    }

    /// Logical complement
    pub fn negate(self) -> Self {
        logic::not(self)
    }
}

impl<T: ?Sized + 'static> std::ops::Not for Check<T> {
    type Output = Check<T>;

    fn not(self) -> Self::Output {
        logic::not(self)
    }
}

impl<T: ?Sized> fmt::Display for Check<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.description, f)
    }
}

impl<T: ?Sized> fmt::Debug for Check<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Check").field(&self.description.render()).finish()
    }
}

impl<T: ?Sized> PartialEq for Check<T> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<T: ?Sized> Eq for Check<T> {}

impl<T: ?Sized> Hash for Check<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

/// Conversion into a check node.
///
/// Nodes convert to themselves, so a check is never wrapped twice.
pub trait IntoCheck<T: ?Sized> {
    fn into_check(self) -> Check<T>;
}

impl<T: ?Sized> IntoCheck<T> for Check<T> {
    fn into_check(self) -> Check<T> {
        self
    }
}

impl<T: ?Sized + 'static, F> IntoCheck<T> for F
where
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn into_check(self) -> Check<T> {
        Check::from_fn(self)
    }
}
