//! Indexed value bundles and context checks
//!
//! [`nested`] opens a [`Scope`] over an input slice and quantifies over its
//! elements, binding each one into slot 0 of the scope's [`Bundle`].
//! [`bind`] quantifies once more inside a scope, binding the next slot.
//! [`context`] gathers bound values by index and hands them, in index
//! order, to a relation check.
//!
//! Combinations are evaluated lazily: each bound element extends its
//! parent's bundle by one value, and the quantifier cut stops the walk, so
//! no cross product is ever built.
//!
//! ```
//! use checktrace::prelude::*;
//!
//! // Some word is no longer than every word.
//! let shortest = nested(
//!     QuantifierKind::Any,
//!     bind(
//!         QuantifierKind::All,
//!         context(&[0, 1], relation2("no_longer", |a: &&str, b: &&str| a.len() <= b.len())?)?,
//!     ),
//! );
//! assert!(shortest.test(&["hello", "hi", "world"][..])?);
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

use std::fmt::{self, Debug};
use std::sync::Arc;

use super::check::{Check, CheckNode, Composite, IntoCheck, TryFnLeaf};
use super::errors::{BundleError, ConstructionError, ConstructionResult};
use super::quantifier::{record_remaining, visit_explained, QuantifierKind};
use crate::eval::explainer::Explainer;
use crate::eval::{BoxError, EntryKind};
use crate::identity::{Arg, Description, Identity};

/// Ordered, fixed-size, read-only values addressed by position.
#[derive(Clone, PartialEq, Eq)]
pub struct Bundle<T> {
    values: Vec<T>,
}

impl<T> Bundle<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Gathers the values at `indices`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns `BundleError::IndexOutOfRange` for the first missing index.
    pub fn gather(&self, indices: &[usize]) -> Result<Vec<T>, BundleError>
    where
        T: Clone,
    {
        indices
            .iter()
            .map(|&index| {
                self.get(index).cloned().ok_or(BundleError::IndexOutOfRange {
                    index,
                    len: self.len(),
                })
            })
            .collect()
    }
}

impl<T: Clone> Bundle<T> {
    /// Copy of this bundle with `value` bound into the next slot
    fn extended(&self, value: T) -> Self {
        let mut values = Vec::with_capacity(self.values.len() + 1);
        values.extend_from_slice(&self.values);
        values.push(value);
        Self { values }
    }
}

impl<T> Default for Bundle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Debug> Debug for Bundle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

/// The sequence being quantified plus the values bound so far.
#[derive(Clone)]
pub struct Scope<T> {
    elements: Arc<[T]>,
    bound: Bundle<T>,
}

impl<T: Clone> Scope<T> {
    /// A scope over `elements` with nothing bound yet
    pub fn new(elements: impl Into<Arc<[T]>>) -> Self {
        Self {
            elements: elements.into(),
            bound: Bundle::empty(),
        }
    }

    /// Child scope with `value` bound into the next slot
    pub fn bind(&self, value: T) -> Self {
        Self {
            elements: Arc::clone(&self.elements),
            bound: self.bound.extended(value),
        }
    }
}

impl<T> Scope<T> {
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn bound(&self) -> &Bundle<T> {
        &self.bound
    }
}

impl<T: Debug> Debug for Scope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.bound, f)
    }
}

/// Quantifies `inner` over a scope's elements, one binding per element.
struct Binder<T> {
    kind: QuantifierKind,
    inner: Check<Scope<T>>,
}

impl<T> Binder<T>
where
    T: Clone + Debug,
{
    fn test(&self, scope: &Scope<T>) -> Result<bool, BoxError> {
        let cut = self.kind.cut_value();
        for element in scope.elements.iter() {
            if self.inner.test(&scope.bind(element.clone()))? == cut {
                return Ok(self.kind.result(true));
            }
        }
        Ok(self.kind.result(false))
    }

    fn explain(&self, scope: &Scope<T>, cx: &mut Explainer) -> Result<bool, BoxError> {
        let (hit, consumed) = visit_explained(self.kind, &*scope.elements, cx, |element, cx| {
            self.inner.explain_into(&scope.bind(element.clone()), cx)
        })?;
        record_remaining(&*scope.elements, consumed, hit, cx);
        Ok(self.kind.result(hit))
    }
}

struct Nested<T>(Binder<T>);

impl<T> Composite<[T]> for Nested<T>
where
    T: Clone + Debug + Send + Sync,
{
    fn kind(&self) -> EntryKind {
        EntryKind::Nested {
            quantifier: self.0.kind,
        }
    }

    fn test(&self, values: &[T]) -> Result<bool, BoxError> {
        self.0.test(&Scope::new(values))
    }

    fn explain(&self, values: &[T], cx: &mut Explainer) -> Result<bool, BoxError> {
        self.0.explain(&Scope::new(values), cx)
    }
}

struct Bind<T>(Binder<T>);

impl<T> Composite<Scope<T>> for Bind<T>
where
    T: Clone + Debug + Send + Sync,
{
    fn kind(&self) -> EntryKind {
        EntryKind::Bind {
            quantifier: self.0.kind,
        }
    }

    fn test(&self, scope: &Scope<T>) -> Result<bool, BoxError> {
        self.0.test(scope)
    }

    fn explain(&self, scope: &Scope<T>, cx: &mut Explainer) -> Result<bool, BoxError> {
        self.0.explain(scope, cx)
    }
}

struct ContextCheck<T> {
    indices: Vec<usize>,
    relation: Check<[T]>,
}

impl<T> Composite<Scope<T>> for ContextCheck<T>
where
    T: Clone + Debug + Send + Sync,
{
    fn kind(&self) -> EntryKind {
        EntryKind::Context {
            indices: self.indices.clone(),
        }
    }

    fn test(&self, scope: &Scope<T>) -> Result<bool, BoxError> {
        let gathered = scope.bound.gather(&self.indices)?;
        self.relation.test(&gathered)
    }

    fn explain(&self, scope: &Scope<T>, cx: &mut Explainer) -> Result<bool, BoxError> {
        let gathered = scope.bound.gather(&self.indices)?;
        self.relation.explain_into(&gathered[..], cx)
    }
}

fn binder_node<T, S>(
    creator: &'static str,
    kind: QuantifierKind,
    inner: Check<Scope<T>>,
    node: impl FnOnce(Binder<T>) -> CheckNode<S>,
) -> Check<S>
where
    T: 'static,
    S: ?Sized,
{
    let identity = Identity::builtin(
        creator,
        vec![Arg::from(kind.name()), Arg::Node(inner.identity().clone())],
    );
    let rendered = inner.description().clone();
    let description = Description::lazy(move || format!("{}({}({}))", creator, kind, rendered));
    Check::from_node(identity, description, node(Binder { kind, inner }))
}

/// Opens a bundle scope over the input slice and quantifies `inner` over
/// its elements, binding each into slot 0.
pub fn nested<T>(kind: QuantifierKind, inner: impl IntoCheck<Scope<T>>) -> Check<[T]>
where
    T: Clone + Debug + Send + Sync + 'static,
{
    binder_node("nested", kind, inner.into_check(), |binder| {
        CheckNode::Composite(Box::new(Nested(binder)))
    })
}

/// Quantifies `inner` over the scope's elements again, binding the next slot.
pub fn bind<T>(kind: QuantifierKind, inner: impl IntoCheck<Scope<T>>) -> Check<Scope<T>>
where
    T: Clone + Debug + Send + Sync + 'static,
{
    binder_node("bind", kind, inner.into_check(), |binder| {
        CheckNode::Composite(Box::new(Bind(binder)))
    })
}

/// Applies `relation` to the bound values at `indices`, rendered `@[i, j] relation`.
///
/// # Errors
///
/// Returns `ConstructionError::MissingIndices` if `indices` is empty.
pub fn context<T>(indices: &[usize], relation: impl IntoCheck<[T]>) -> ConstructionResult<Check<Scope<T>>>
where
    T: Clone + Debug + Send + Sync + 'static,
{
    if indices.is_empty() {
        return Err(ConstructionError::MissingIndices);
    }
    let relation = relation.into_check();
    let identity = Identity::builtin(
        "context",
        vec![
            Arg::List(indices.iter().map(|&i| Arg::from(i)).collect()),
            Arg::Node(relation.identity().clone()),
        ],
    );
    let (slots, rendered) = (indices.to_vec(), relation.description().clone());
    let description = Description::lazy(move || format!("@{:?} {}", slots, rendered));
    Ok(Check::from_node(
        identity,
        description,
        CheckNode::Composite(Box::new(ContextCheck {
            indices: indices.to_vec(),
            relation,
        })),
    ))
}

/// A named relation over exactly `arity` positional values.
///
/// Receiving any other number of values is an evaluation fault.
///
/// # Errors
///
/// Returns `ConstructionError::EmptyCreator` for a blank name.
pub fn relation<T, F>(name: &'static str, arity: usize, f: F) -> ConstructionResult<Check<[T]>>
where
    T: 'static,
    F: Fn(&[T]) -> bool + Send + Sync + 'static,
{
    let identity = Identity::new(name, vec![Arg::from(arity)])?;
    let leaf = TryFnLeaf(move |values: &[T]| -> Result<bool, BoxError> {
        if values.len() != arity {
            return Err(BundleError::Arity {
                relation: name.to_string(),
                expected: arity,
                actual: values.len(),
            }
            .into());
        }
        Ok(f(values))
    });
    Ok(Check::with_identity(identity, name, leaf))
}

/// Binary relation, the common case for [`context`] over two slots.
///
/// # Errors
///
/// Returns `ConstructionError::EmptyCreator` for a blank name.
pub fn relation2<T, F>(name: &'static str, f: F) -> ConstructionResult<Check<[T]>>
where
    T: 'static,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    let identity = Identity::new(name, vec![Arg::from(2usize)])?;
    let leaf = TryFnLeaf(move |values: &[T]| -> Result<bool, BoxError> {
        match values {
            [a, b] => Ok(f(a, b)),
            _ => Err(BundleError::Arity {
                relation: name.to_string(),
                expected: 2,
                actual: values.len(),
            }
            .into()),
        }
    });
    Ok(Check::with_identity(identity, name, leaf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Output;

    fn less() -> Check<[i32]> {
        relation2("less", |a: &i32, b: &i32| a < b).unwrap()
    }

    #[test]
    fn test_bundle_gather() {
        let bundle = Bundle::new(vec![10, 20, 30]);
        assert_eq!(bundle.gather(&[2, 0]).unwrap(), vec![30, 10]);
        assert_eq!(
            bundle.gather(&[3]).unwrap_err(),
            BundleError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn test_scope_bind_extends_copy() {
        let scope = Scope::new(vec![1, 2]);
        let child = scope.bind(1);
        let grandchild = child.bind(2);
        assert!(scope.bound().is_empty());
        assert_eq!(child.bound().as_slice(), &[1]);
        assert_eq!(grandchild.bound().as_slice(), &[1, 2]);
        assert_eq!(format!("{:?}", grandchild), "[1, 2]");
    }

    #[test]
    fn test_nested_bind_context() {
        // Some element is no greater than every element.
        let same = relation2("same", |a: &i32, b: &i32| a == b).unwrap();
        let minimum = nested(
            QuantifierKind::Any,
            bind(
                QuantifierKind::All,
                context(&[0, 1], less()).unwrap().or(context(&[0, 1], same).unwrap()),
            ),
        );
        assert!(minimum.test(&[3, 1, 2][..]).unwrap());
        assert!(minimum.test(&[1, 1][..]).unwrap());
        assert!(!minimum.test(&[][..]).unwrap());
    }

    #[test]
    fn test_description() {
        let check = nested(QuantifierKind::All, bind(QuantifierKind::None, context(&[1, 0], less()).unwrap()));
        assert_eq!(check.to_string(), "nested(all(bind(none(@[1, 0] less))))");
    }

    #[test]
    fn test_missing_indices_rejected() {
        assert_eq!(
            context::<i32>(&[], less()).unwrap_err(),
            ConstructionError::MissingIndices
        );
    }

    #[test]
    fn test_unbound_index_faults() {
        let check = nested(QuantifierKind::All, context(&[0, 1], less()).unwrap());
        let err = check.test(&[1, 2][..]).unwrap_err();
        assert_eq!(err.to_string(), "bundle index 1 out of range for 1 bound values");
    }

    #[test]
    fn test_relation_arity_fault() {
        let check = relation("pair", 2, |values: &[i32]| values[0] < values[1]).unwrap();
        assert!(check.test(&[1, 2]).unwrap());
        assert!(check.test(&[1]).is_err());
    }

    #[test]
    fn test_explain_records_only_consumed_bindings() {
        let no_greater = relation2("no_greater", |a: &i32, b: &i32| a <= b).unwrap();
        let check = nested(
            QuantifierKind::All,
            bind(QuantifierKind::All, context(&[0, 1], no_greater).unwrap()),
        );
        // 2 fails against the third element; 3 and 1 are never bound in slot 0.
        let record = check.explain(&[2, 3, 1][..]).unwrap();
        assert_eq!(record.outcome(), Some(false));

        let outer = record.root();
        assert_eq!(outer.children().len(), 1);
        let inner = &outer.children()[0];
        assert_eq!(inner.label(), Some("[0]"));
        assert_eq!(inner.input(), "[2]");
        assert_eq!(inner.children().len(), 3);

        let failing = &inner.children()[2];
        assert_eq!(failing.input(), "[2, 1]");
        assert_eq!(failing.output(), &Output::Bool(false));
        assert!(failing.is_mismatch());
        assert!(!inner.children()[0].is_mismatch());
        assert_eq!(failing.children()[0].input(), "[2, 1]");
    }
}
