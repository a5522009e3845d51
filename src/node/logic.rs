//! Negation, conjunction and disjunction
//!
//! Junctions carry a `shortcut` flag. With it, both evaluation paths stop
//! at the first decisive operand (`false` for conjunction, `true` for
//! disjunction) and later operands are neither evaluated nor recorded.
//! Without it every operand is evaluated, left to right.
//!
//! Junctions of the same kind and shortcut flatten, so `a.and(b).and(c)`
//! is one conjunction of three operands rendered `a&&b&&c`.

use std::fmt::Debug;

use super::check::{Check, CheckNode, IntoCheck};
use super::errors::{ConstructionError, ConstructionResult};
use crate::eval::explainer::Explainer;
use crate::eval::BoxError;
use crate::identity::{Arg, Description, Identity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Junction {
    All,
    Any,
}

impl Junction {
    /// The operand result that decides the junction
    fn decisive(self) -> bool {
        match self {
            Junction::All => false,
            Junction::Any => true,
        }
    }

    fn creator(self, shortcut: bool) -> &'static str {
        match (self, shortcut) {
            (Junction::All, true) => "and",
            (Junction::All, false) => "and_eager",
            (Junction::Any, true) => "or",
            (Junction::Any, false) => "or_eager",
        }
    }

    fn operator(self, shortcut: bool) -> &'static str {
        match (self, shortcut) {
            (Junction::All, true) => "&&",
            (Junction::All, false) => "&",
            (Junction::Any, true) => "||",
            (Junction::Any, false) => "|",
        }
    }

    pub(crate) fn test<T: ?Sized>(
        self,
        shortcut: bool,
        operands: &[Check<T>],
        value: &T,
    ) -> Result<bool, BoxError> {
        let decisive = self.decisive();
        let mut decided = false;
        for operand in operands {
            if operand.test(value)? == decisive {
                decided = true;
                if shortcut {
                    break;
                }
            }
        }
        Ok(if decided { decisive } else { !decisive })
    }

    pub(crate) fn explain<T: ?Sized + Debug>(
        self,
        shortcut: bool,
        operands: &[Check<T>],
        value: &T,
        cx: &mut Explainer,
    ) -> Result<bool, BoxError> {
        let decisive = self.decisive();
        let mut decided = false;
        for operand in operands {
            if operand.explain_into(value, cx)? == decisive {
                decided = true;
                if shortcut {
                    break;
                }
            }
        }
        Ok(if decided { decisive } else { !decisive })
    }
}

/// Builds a junction, flattening operands of the same kind.
pub(crate) fn connect<T: ?Sized + 'static>(
    junction: Junction,
    shortcut: bool,
    operands: Vec<Check<T>>,
) -> Check<T> {
    let mut flat = Vec::with_capacity(operands.len());
    for operand in operands {
        let nested = match operand.junction() {
            Some((j, s, inner)) if j == junction && s == shortcut => Some(inner.to_vec()),
            _ => None,
        };
        match nested {
            Some(inner) => flat.extend(inner),
            None => flat.push(operand),
        }
    }

    let identity = Identity::builtin(
        junction.creator(shortcut),
        flat.iter().map(|op| Arg::Node(op.identity().clone())).collect(),
    );
    let rendered = flat.clone();
    let operator = junction.operator(shortcut);
    let description = Description::lazy(move || {
        rendered
            .iter()
            .map(|op| {
                if op.is_compound() {
                    format!("({})", op)
                } else {
                    op.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(operator)
    });

    Check::from_node(
        identity,
        description,
        CheckNode::Junction {
            junction,
            shortcut,
            operands: flat,
        },
    )
}

/// Logical complement, rendered `!(check)`
pub fn not<T: ?Sized + 'static>(check: impl IntoCheck<T>) -> Check<T> {
    let inner = check.into_check();
    let identity = Identity::builtin("not", vec![Arg::Node(inner.identity().clone())]);
    let rendered = inner.clone();
    let description = Description::lazy(move || format!("!({})", rendered));
    Check::from_node(identity, description, CheckNode::Not(inner))
}

/// Short-circuit conjunction of two checks
pub fn and<T: ?Sized + 'static>(a: impl IntoCheck<T>, b: impl IntoCheck<T>) -> Check<T> {
    connect(Junction::All, true, vec![a.into_check(), b.into_check()])
}

/// Short-circuit disjunction of two checks
pub fn or<T: ?Sized + 'static>(a: impl IntoCheck<T>, b: impl IntoCheck<T>) -> Check<T> {
    connect(Junction::Any, true, vec![a.into_check(), b.into_check()])
}

/// Short-circuit conjunction of one or more checks.
///
/// # Errors
///
/// Returns `ConstructionError::MissingOperands` for an empty list.
pub fn all_of<T, I>(checks: I) -> ConstructionResult<Check<T>>
where
    T: ?Sized + 'static,
    I: IntoIterator,
    I::Item: IntoCheck<T>,
{
    let operands: Vec<Check<T>> = checks.into_iter().map(IntoCheck::into_check).collect();
    if operands.is_empty() {
        return Err(ConstructionError::MissingOperands("all_of"));
    }
    Ok(connect(Junction::All, true, operands))
}

/// Short-circuit disjunction of one or more checks.
///
/// # Errors
///
/// Returns `ConstructionError::MissingOperands` for an empty list.
pub fn any_of<T, I>(checks: I) -> ConstructionResult<Check<T>>
where
    T: ?Sized + 'static,
    I: IntoIterator,
    I::Item: IntoCheck<T>,
{
    let operands: Vec<Check<T>> = checks.into_iter().map(IntoCheck::into_check).collect();
    if operands.is_empty() {
        return Err(ConstructionError::MissingOperands("any_of"));
    }
    Ok(connect(Junction::Any, true, operands))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn named(name: &'static str, result: bool) -> Check<i32> {
        Check::named(name, move |_: &i32| result).unwrap()
    }

    fn counting(name: &'static str, result: bool, calls: Arc<AtomicUsize>) -> Check<i32> {
        Check::named(name, move |_: &i32| {
            calls.fetch_add(1, Ordering::SeqCst);
            result
        })
        .unwrap()
    }

    #[test]
    fn test_not_and_formatting() {
        let check = not(and(named("a", true), named("b", true)));
        assert_eq!(check.to_string(), "!(a&&b)");
    }

    #[test]
    fn test_nested_junction_parenthesized() {
        let check = or(and(named("a", true), named("b", true)), named("c", true));
        assert_eq!(check.to_string(), "(a&&b)||c");
    }

    #[test]
    fn test_junctions_flatten() {
        let left = named("a", true).and(named("b", true)).and(named("c", true));
        let right = named("a", true).and(named("b", true).and(named("c", true)));
        assert_eq!(left.to_string(), "a&&b&&c");
        assert_eq!(left, right);
        assert_eq!(left.junction().map(|(_, _, ops)| ops.len()), Some(3));
    }

    #[test]
    fn test_eager_does_not_flatten_into_shortcut() {
        let check = named("a", true).and_eager(named("b", true)).and(named("c", true));
        assert_eq!(check.to_string(), "(a&b)&&c");
    }

    #[test]
    fn test_shortcut_skips_later_operands() {
        let calls = Arc::new(AtomicUsize::new(0));
        let check = named("a", false).and(counting("b", true, calls.clone()));
        assert!(!check.test(&1).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_eager_evaluates_every_operand() {
        let calls = Arc::new(AtomicUsize::new(0));
        let check = named("a", false).and_eager(counting("b", true, calls.clone()));
        assert!(!check.test(&1).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let check = named("a", true).or_eager(counting("b", false, calls.clone()));
        assert!(check.test(&1).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_truth_tables() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            assert_eq!(and(named("a", a), named("b", b)).test(&0).unwrap(), a && b);
            assert_eq!(or(named("a", a), named("b", b)).test(&0).unwrap(), a || b);
            assert_eq!(named("a", a).and_eager(named("b", b)).test(&0).unwrap(), a & b);
            assert_eq!(named("a", a).or_eager(named("b", b)).test(&0).unwrap(), a | b);
        }
        assert!(!not(named("a", true)).test(&0).unwrap());
        assert!((!named("a", false)).test(&0).unwrap());
    }

    #[test]
    fn test_empty_operands_rejected() {
        let empty: Vec<Check<i32>> = Vec::new();
        assert_eq!(
            all_of(empty.clone()).unwrap_err(),
            ConstructionError::MissingOperands("all_of")
        );
        assert!(any_of(empty).is_err());
    }

    #[test]
    fn test_single_operand_junction() {
        let check = all_of(vec![named("a", true)]).unwrap();
        assert!(check.test(&0).unwrap());
        assert_eq!(check.to_string(), "a");
    }
}
