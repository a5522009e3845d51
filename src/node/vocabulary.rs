//! Standard vocabulary of leaf checks and transformers
//!
//! Every constructor here builds a node with a builtin identity derived from
//! its arguments, so two independently built `equal_to("x")` checks compare
//! equal, hash equally and render as `==["x"]`.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::marker::PhantomData;

use super::check::{Check, FnLeaf, LeafCheck};
use super::transform::Transformer;
use crate::eval::BoxError;
use crate::identity::{Arg, Description, Identity};

fn leaf<T, F>(creator: &'static str, args: Vec<Arg>, description: Description, f: F) -> Check<T>
where
    T: ?Sized + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    Check::with_identity(Identity::builtin(creator, args), description, FnLeaf(f))
}

/// Description that renders `operator[value]`
fn bracketed<V>(operator: &'static str, value: V) -> Description
where
    V: Debug + Send + Sync + 'static,
{
    Description::lazy(move || format!("{}[{:?}]", operator, value))
}

struct EqualTo<V, T: ?Sized> {
    expected: V,
    negated: bool,
    input: PhantomData<fn(&T)>,
}

impl<V, T> LeafCheck<T> for EqualTo<V, T>
where
    T: ?Sized + PartialEq + Debug,
    V: Borrow<T> + Debug + Send + Sync,
{
    fn test(&self, value: &T) -> Result<bool, BoxError> {
        Ok((Borrow::<T>::borrow(&self.expected) == value) != self.negated)
    }

    fn explain_expectation(&self) -> Option<String> {
        if self.negated {
            Some(format!("anything but {:?}", self.expected))
        } else {
            Some(format!("{:?}", self.expected))
        }
    }

    fn explain_actual(&self, value: &T) -> Option<String> {
        Some(format!("{:?}", value))
    }
}

fn equality<T, V>(expected: V, negated: bool) -> Check<T>
where
    T: ?Sized + PartialEq + Debug + 'static,
    V: Borrow<T> + Debug + Clone + Into<Arg> + Send + Sync + 'static,
{
    let (creator, operator) = if negated {
        ("not_equal_to", "!=")
    } else {
        ("equal_to", "==")
    };
    let identity = Identity::builtin(creator, vec![expected.clone().into()]);
    let description = bracketed(operator, expected.clone());
    Check::with_identity(
        identity,
        description,
        EqualTo {
            expected,
            negated,
            input: PhantomData,
        },
    )
}

/// Value equals `expected`; the report shows the literal expected value
pub fn equal_to<T, V>(expected: V) -> Check<T>
where
    T: ?Sized + PartialEq + Debug + 'static,
    V: Borrow<T> + Debug + Clone + Into<Arg> + Send + Sync + 'static,
{
    equality(expected, false)
}

/// Value differs from `expected`, rendered `!=[expected]`
pub fn not_equal_to<T, V>(expected: V) -> Check<T>
where
    T: ?Sized + PartialEq + Debug + 'static,
    V: Borrow<T> + Debug + Clone + Into<Arg> + Send + Sync + 'static,
{
    equality(expected, true)
}

macro_rules! ordering {
    ($(#[$doc:meta])* $name:ident, $op:literal, $cmp:tt) => {
        $(#[$doc])*
        pub fn $name<T>(bound: T) -> Check<T>
        where
            T: PartialOrd + Debug + Clone + Into<Arg> + Send + Sync + 'static,
        {
            let args = vec![bound.clone().into()];
            let description = bracketed($op, bound.clone());
            leaf(stringify!($name), args, description, move |value: &T| *value $cmp bound)
        }
    };
}

ordering!(
    /// Value is strictly below `bound`, rendered `<[bound]`
    less_than, "<", <
);
ordering!(
    /// Value is at most `bound`, rendered `<=[bound]`
    less_or_equal, "<=", <=
);
ordering!(
    /// Value is strictly above `bound`, rendered `>[bound]`
    greater_than, ">", >
);
ordering!(
    /// Value is at least `bound`, rendered `>=[bound]`
    greater_or_equal, ">=", >=
);

/// Inclusive range, rendered `in[low, high]`
pub fn between<T>(low: T, high: T) -> Check<T>
where
    T: PartialOrd + Debug + Clone + Into<Arg> + Send + Sync + 'static,
{
    let args = vec![low.clone().into(), high.clone().into()];
    let (lo, hi) = (low.clone(), high.clone());
    let description = Description::lazy(move || format!("in[{:?}, {:?}]", lo, hi));
    leaf("between", args, description, move |value: &T| low <= *value && *value <= high)
}

/// Passes every value, rendered `true`
pub fn always_true<T: ?Sized + 'static>() -> Check<T> {
    leaf("always_true", Vec::new(), Description::literal("true"), |_: &T| true)
}

/// Fails every value, rendered `false`
pub fn always_false<T: ?Sized + 'static>() -> Check<T> {
    leaf("always_false", Vec::new(), Description::literal("false"), |_: &T| false)
}

/// String starts with `prefix`
pub fn starts_with<S>(prefix: impl Into<String>) -> Check<S>
where
    S: ?Sized + AsRef<str> + 'static,
{
    let prefix = prefix.into();
    let description = bracketed("starts_with", prefix.clone());
    leaf("starts_with", vec![Arg::from(&prefix)], description, move |s: &S| {
        s.as_ref().starts_with(prefix.as_str())
    })
}

/// String ends with `suffix`
pub fn ends_with<S>(suffix: impl Into<String>) -> Check<S>
where
    S: ?Sized + AsRef<str> + 'static,
{
    let suffix = suffix.into();
    let description = bracketed("ends_with", suffix.clone());
    leaf("ends_with", vec![Arg::from(&suffix)], description, move |s: &S| {
        s.as_ref().ends_with(suffix.as_str())
    })
}

/// String contains `needle`
pub fn contains<S>(needle: impl Into<String>) -> Check<S>
where
    S: ?Sized + AsRef<str> + 'static,
{
    let needle = needle.into();
    let description = bracketed("contains", needle.clone());
    leaf("contains", vec![Arg::from(&needle)], description, move |s: &S| {
        s.as_ref().contains(needle.as_str())
    })
}

/// String has no characters
pub fn is_empty<S>() -> Check<S>
where
    S: ?Sized + AsRef<str> + 'static,
{
    leaf("is_empty", Vec::new(), Description::literal("is_empty"), |s: &S| {
        s.as_ref().is_empty()
    })
}

/// Option holds a value
pub fn is_some<V: 'static>() -> Check<Option<V>> {
    leaf("is_some", Vec::new(), Description::literal("is_some"), |v: &Option<V>| v.is_some())
}

pub fn is_none<V: 'static>() -> Check<Option<V>> {
    leaf("is_none", Vec::new(), Description::literal("is_none"), |v: &Option<V>| v.is_none())
}

/// Length of a string in characters
pub fn length<S>() -> Transformer<S, usize>
where
    S: ?Sized + AsRef<str> + 'static,
{
    Transformer::with_identity(
        Identity::builtin("length", Vec::new()),
        "length",
        |s: &S| s.as_ref().chars().count(),
    )
}

/// String with surrounding whitespace removed
pub fn trim<S>() -> Transformer<S, String>
where
    S: ?Sized + AsRef<str> + 'static,
{
    Transformer::with_identity(
        Identity::builtin("trim", Vec::new()),
        "trim",
        |s: &S| s.as_ref().trim().to_string(),
    )
}

/// Lowercased copy of a string
pub fn lowercase<S>() -> Transformer<S, String>
where
    S: ?Sized + AsRef<str> + 'static,
{
    Transformer::with_identity(
        Identity::builtin("lowercase", Vec::new()),
        "lowercase",
        |s: &S| s.as_ref().to_lowercase(),
    )
}

/// Number of elements in a slice
pub fn size<E: 'static>() -> Transformer<[E], usize> {
    Transformer::with_identity(Identity::builtin("size", Vec::new()), "size", |s: &[E]| s.len())
}
