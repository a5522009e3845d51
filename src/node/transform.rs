//! Transformer nodes and function-composition chains
//!
//! A chain built with [`Transformer::and_then`] keeps every segment's own
//! identity and description. Chains flatten: `a.and_then(b).and_then(c)`
//! and `a.and_then(b.and_then(c))` are the same three-segment chain, render
//! as `a.then(b).then(c)`, and explain as three sibling entries.

use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::check::{Check, CheckNode, Composite, IntoCheck};
use super::errors::ConstructionResult;
use crate::eval::explainer::Explainer;
use crate::eval::{BoxError, EntryKind, EvaluationRecord, Evaluator, ExplainResult};
use crate::identity::{Arg, Description, Identity};

/// Identity and description of one chain segment
#[derive(Clone)]
pub(crate) struct Segment {
    identity: Identity,
    description: Description,
}

pub(crate) trait TransformNode<I: ?Sized, O>: Send + Sync {
    fn apply(&self, value: &I) -> Result<O, BoxError>;
    fn explain(&self, value: &I, cx: &mut Explainer) -> Result<O, BoxError>;

    /// Flattened segments, for chains only
    fn segments(&self) -> Option<Vec<Segment>> {
        None
    }
}

struct FnTransform<F>(F);

impl<I: ?Sized, O, F> TransformNode<I, O> for FnTransform<F>
where
    F: Fn(&I) -> Result<O, BoxError> + Send + Sync,
{
    fn apply(&self, value: &I) -> Result<O, BoxError> {
        (self.0)(value)
    }

    fn explain(&self, value: &I, _cx: &mut Explainer) -> Result<O, BoxError> {
        (self.0)(value)
    }
}

struct Chain<I: ?Sized, M, O> {
    head: Transformer<I, M>,
    tail: Transformer<M, O>,
}

impl<I, M, O> TransformNode<I, O> for Chain<I, M, O>
where
    I: ?Sized + Debug,
    M: Debug,
    O: Debug,
{
    fn apply(&self, value: &I) -> Result<O, BoxError> {
        let mid = self.head.apply(value)?;
        self.tail.apply(&mid)
    }

    fn explain(&self, value: &I, cx: &mut Explainer) -> Result<O, BoxError> {
        let mid = self.head.explain_flat(value, cx)?;
        self.tail.explain_flat(&mid, cx)
    }

    fn segments(&self) -> Option<Vec<Segment>> {
        let mut segments = self.head.segments();
        segments.extend(self.tail.segments());
        Some(segments)
    }
}

/// A value-producing node of the expression tree.
pub struct Transformer<I: ?Sized, O> {
    identity: Identity,
    description: Description,
    node: Arc<dyn TransformNode<I, O>>,
}

impl<I: ?Sized, O> Clone for Transformer<I, O> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            description: self.description.clone(),
            node: Arc::clone(&self.node),
        }
    }
}

impl<I: ?Sized, O> Transformer<I, O> {
    /// Returns the value identity used for equality and hashing
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Applies the transformer. Fast path, faults propagate unmodified.
    ///
    /// # Errors
    ///
    /// Returns whatever error a segment raised.
    pub fn apply(&self, value: &I) -> Result<O, BoxError> {
        self.node.apply(value)
    }

    /// Number of segments; 1 unless this is a chain
    pub fn segment_count(&self) -> usize {
        self.node.segments().map_or(1, |s| s.len())
    }

    pub(crate) fn segments(&self) -> Vec<Segment> {
        self.node.segments().unwrap_or_else(|| {
            vec![Segment {
                identity: self.identity.clone(),
                description: self.description.clone(),
            }]
        })
    }

    fn is_chain(&self) -> bool {
        self.node.segments().is_some()
    }

    fn entry_kind(&self) -> EntryKind {
        if self.is_chain() {
            EntryKind::Chain
        } else {
            EntryKind::Mapper
        }
    }

    /// Explain-path application: records this transformer.
    pub(crate) fn explain_into(&self, value: &I, cx: &mut Explainer) -> Result<O, BoxError>
    where
        I: Debug,
        O: Debug,
    {
        let input = cx.snapshot(value);
        cx.enter(self.entry_kind(), self.description.render().into_owned(), input);
        let outcome = self.node.explain(value, cx);
        cx.exit_value(&outcome);
        outcome
    }

    /// Records a nested chain's segments directly into the enclosing chain.
    fn explain_flat(&self, value: &I, cx: &mut Explainer) -> Result<O, BoxError>
    where
        I: Debug,
        O: Debug,
    {
        if self.is_chain() {
            self.node.explain(value, cx)
        } else {
            self.explain_into(value, cx)
        }
    }

    /// Explains this transformer with a default [`Evaluator`].
    ///
    /// # Errors
    ///
    /// See [`Evaluator::explain_apply`].
    pub fn explain(&self, value: &I) -> ExplainResult<(O, EvaluationRecord)>
    where
        I: Debug,
        O: Debug,
    {
        Evaluator::default().explain_apply(self, value)
    }
}

impl<I: ?Sized + 'static, O: 'static> Transformer<I, O> {
    fn from_behavior<F>(identity: Identity, description: Description, f: F) -> Self
    where
        F: Fn(&I) -> Result<O, BoxError> + Send + Sync + 'static,
    {
        Self {
            identity,
            description,
            node: Arc::new(FnTransform(f)),
        }
    }

    /// Wraps a closure under an explicit identity
    pub fn with_identity<F>(identity: Identity, description: impl Into<Description>, f: F) -> Self
    where
        F: Fn(&I) -> O + Send + Sync + 'static,
    {
        Self::from_behavior(identity, description.into(), move |value: &I| -> Result<O, BoxError> {
            Ok(f(value))
        })
    }

    /// Wraps an anonymous closure. Every call yields a distinct identity.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&I) -> O + Send + Sync + 'static,
    {
        let identity = Identity::anonymous();
        let description = Description::literal(identity.to_string());
        Self::with_identity(identity, description, f)
    }

    /// Wraps a closure under a name, used as both identity and description.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::EmptyCreator` for a blank name.
    pub fn named<F>(name: impl Into<Cow<'static, str>>, f: F) -> ConstructionResult<Self>
    where
        F: Fn(&I) -> O + Send + Sync + 'static,
    {
        let identity = Identity::new(name, Vec::new())?;
        let description = Description::literal(identity.creator().to_string());
        Ok(Self::with_identity(identity, description, f))
    }

    /// Like [`Transformer::named`], for closures that can fail.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::EmptyCreator` for a blank name.
    pub fn try_named<F, E>(name: impl Into<Cow<'static, str>>, f: F) -> ConstructionResult<Self>
    where
        F: Fn(&I) -> Result<O, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let identity = Identity::new(name, Vec::new())?;
        let description = Description::literal(identity.creator().to_string());
        Ok(Self::from_behavior(identity, description, move |value: &I| -> Result<O, BoxError> {
            f(value).map_err(Into::into)
        }))
    }

    /// Sequential composition: `self` first, then `next`.
    pub fn and_then<P>(self, next: impl IntoTransformer<O, P>) -> Transformer<I, P>
    where
        I: Debug,
        O: Debug,
        P: Debug + 'static,
    {
        let chain = Chain {
            head: self,
            tail: next.into_transformer(),
        };
        let segments = chain.segments().unwrap_or_default();
        let identity = Identity::builtin(
            "and_then",
            segments.iter().map(|s| Arg::Node(s.identity.clone())).collect(),
        );
        let parts: Vec<Description> = segments.into_iter().map(|s| s.description).collect();
        let description = Description::lazy(move || {
            let mut rendered = String::new();
            for (i, part) in parts.iter().enumerate() {
                if i == 0 {
                    rendered.push_str(&part.render());
                } else {
                    rendered.push_str(&format!(".then({})", part));
                }
            }
            rendered
        });
        Transformer {
            identity,
            description,
            node: Arc::new(chain),
        }
    }

    /// Checks the transformed value: `checker(self(input))`.
    pub fn check(self, checker: impl IntoCheck<O>) -> Check<I>
    where
        I: Debug,
        O: Debug,
    {
        let checker = checker.into_check();
        let identity = Identity::builtin(
            "transform",
            vec![
                Arg::Node(self.identity.clone()),
                Arg::Node(checker.identity().clone()),
            ],
        );
        let (mapper_desc, checker_desc) = (self.description.clone(), checker.description().clone());
        let description = Description::lazy(move || format!("{} {}", mapper_desc, checker_desc));
        Check::from_node(
            identity,
            description,
            CheckNode::Composite(Box::new(TransformCheck {
                mapper: self,
                checker,
            })),
        )
    }
}

impl<I: Debug + 'static, O: Debug + 'static> Transformer<I, O> {
    /// Sequential composition: `before` first, then `self`.
    pub fn compose<H>(self, before: impl IntoTransformer<H, I>) -> Transformer<H, O>
    where
        H: ?Sized + Debug + 'static,
    {
        before.into_transformer().and_then(self)
    }
}

/// Mapper then checker
struct TransformCheck<T: ?Sized, M> {
    mapper: Transformer<T, M>,
    checker: Check<M>,
}

impl<T, M> Composite<T> for TransformCheck<T, M>
where
    T: ?Sized + Debug,
    M: Debug,
{
    fn kind(&self) -> EntryKind {
        EntryKind::Transform
    }

    fn test(&self, value: &T) -> Result<bool, BoxError> {
        let mapped = self.mapper.apply(value)?;
        self.checker.test(&mapped)
    }

    fn explain(&self, value: &T, cx: &mut Explainer) -> Result<bool, BoxError> {
        let mapped = self.mapper.explain_into(value, cx)?;
        self.checker.explain_into(&mapped, cx)
    }
}

/// Starts a transform check: `transform(length()).check(less_than(100))`
pub fn transform<I, O>(mapper: impl IntoTransformer<I, O>) -> Transformer<I, O>
where
    I: ?Sized,
{
    mapper.into_transformer()
}

impl<I: ?Sized, O> fmt::Display for Transformer<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.description, f)
    }
}

impl<I: ?Sized, O> fmt::Debug for Transformer<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transformer")
            .field(&self.description.render())
            .finish()
    }
}

impl<I: ?Sized, O> PartialEq for Transformer<I, O> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<I: ?Sized, O> Eq for Transformer<I, O> {}

impl<I: ?Sized, O> Hash for Transformer<I, O> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

/// Conversion into a transformer node. Nodes convert to themselves.
pub trait IntoTransformer<I: ?Sized, O> {
    fn into_transformer(self) -> Transformer<I, O>;
}

impl<I: ?Sized, O> IntoTransformer<I, O> for Transformer<I, O> {
    fn into_transformer(self) -> Transformer<I, O> {
        self
    }
}

impl<I: ?Sized + 'static, O: 'static, F> IntoTransformer<I, O> for F
where
    F: Fn(&I) -> O + Send + Sync + 'static,
{
    fn into_transformer(self) -> Transformer<I, O> {
        Transformer::from_fn(self)
    }
}
