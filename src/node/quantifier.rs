//! Quantifiers over element sequences
//!
//! A quantifier drives an [`ElementSource`] in order and stops consuming at
//! the first element whose result equals the cut value. Both evaluation
//! paths stop at the same element, so the record holds exactly the elements
//! the fast path consumed.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::rc::Rc;

use serde::Serialize;

use super::check::{Check, CheckNode, Composite, IntoCheck};
use crate::eval::explainer::Explainer;
use crate::eval::{BoxError, EntryKind, Remaining};
use crate::identity::{Arg, Description, Identity};

/// Which quantifier a node applies.
///
/// | kind | default | cut   |
/// |------|---------|-------|
/// | All  | true    | false |
/// | Any  | false   | true  |
/// | None | true    | true  |
///
/// The result is the default when no element hits the cut, including for
/// an empty sequence, and its complement otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantifierKind {
    All,
    Any,
    None,
}

impl QuantifierKind {
    pub fn default_value(self) -> bool {
        match self {
            QuantifierKind::All | QuantifierKind::None => true,
            QuantifierKind::Any => false,
        }
    }

    pub fn cut_value(self) -> bool {
        match self {
            QuantifierKind::All => false,
            QuantifierKind::Any | QuantifierKind::None => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QuantifierKind::All => "all",
            QuantifierKind::Any => "any",
            QuantifierKind::None => "none",
        }
    }

    /// Result given whether the cut was hit
    pub(crate) fn result(self, cut_hit: bool) -> bool {
        if cut_hit {
            !self.default_value()
        } else {
            self.default_value()
        }
    }
}

impl fmt::Display for QuantifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Visitor callback: `Break` stops consumption.
pub type Visitor<'a, E> = dyn FnMut(&E) -> Result<ControlFlow<()>, BoxError> + 'a;

/// A sequence a quantifier can consume in order.
pub trait ElementSource {
    type Item: Debug;

    /// Feeds elements to `visitor` in order until it breaks or the source
    /// is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `visitor`.
    fn visit(&self, visitor: &mut Visitor<'_, Self::Item>) -> Result<(), BoxError>;

    /// Snapshot of up to `limit` elements after the first `consumed`.
    ///
    /// Sources that cannot look ahead without consuming report
    /// [`Remaining::Unavailable`].
    fn remaining(&self, consumed: usize, limit: usize, render: &dyn Fn(&Self::Item) -> String) -> Remaining {
        let _ = (consumed, limit, render);
        Remaining::Unavailable
    }
}

impl<E: Debug> ElementSource for [E] {
    type Item = E;

    fn visit(&self, visitor: &mut Visitor<'_, E>) -> Result<(), BoxError> {
        for element in self {
            if visitor(element)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    fn remaining(&self, consumed: usize, limit: usize, render: &dyn Fn(&E) -> String) -> Remaining {
        let rest = self.get(consumed..).unwrap_or_default();
        Remaining::Elements {
            values: rest.iter().take(limit).map(render).collect(),
            truncated: rest.len() > limit,
        }
    }
}

impl<E: Debug> ElementSource for Vec<E> {
    type Item = E;

    fn visit(&self, visitor: &mut Visitor<'_, E>) -> Result<(), BoxError> {
        self.as_slice().visit(visitor)
    }

    fn remaining(&self, consumed: usize, limit: usize, render: &dyn Fn(&E) -> String) -> Remaining {
        self.as_slice().remaining(consumed, limit, render)
    }
}

fn peek_clone<I: Iterator + Clone>(pass: &I, n: usize) -> Vec<I::Item> {
    pass.clone().take(n).collect()
}

/// A single-pass iterator consumed at most once.
///
/// Every element pulled from the iterator is buffered, so a later visit
/// (typically the explain path after a failing fast path) replays the
/// elements already consumed before pulling new ones. The iterator itself
/// is never restarted.
///
/// Built with [`ReplaySource::snapshotting`], the source can also report
/// the elements not yet consumed, by looking ahead on a clone of the
/// iterator. Otherwise the remaining elements are reported as unavailable.
pub struct ReplaySource<I: Iterator> {
    pass: RefCell<I>,
    seen: RefCell<Vec<Rc<I::Item>>>,
    peek: Option<fn(&I, usize) -> Vec<I::Item>>,
}

impl<I: Iterator> ReplaySource<I> {
    pub fn new(pass: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            pass: RefCell::new(pass.into_iter()),
            seen: RefCell::new(Vec::new()),
            peek: None,
        }
    }

    /// Number of elements pulled from the iterator so far
    pub fn consumed(&self) -> usize {
        self.seen.borrow().len()
    }

    fn element(&self, index: usize) -> Option<Rc<I::Item>> {
        let buffered = self.seen.borrow().get(index).cloned();
        if buffered.is_some() {
            return buffered;
        }
        let next = self.pass.borrow_mut().next()?;
        let next = Rc::new(next);
        self.seen.borrow_mut().push(Rc::clone(&next));
        Some(next)
    }
}

impl<I: Iterator + Clone> ReplaySource<I> {
    /// A replay source that can snapshot its unconsumed elements
    pub fn snapshotting(pass: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            peek: Some(peek_clone::<I>),
            ..Self::new(pass)
        }
    }
}

impl<I> ElementSource for ReplaySource<I>
where
    I: Iterator,
    I::Item: Debug,
{
    type Item = I::Item;

    fn visit(&self, visitor: &mut Visitor<'_, I::Item>) -> Result<(), BoxError> {
        let mut index = 0;
        while let Some(element) = self.element(index) {
            index += 1;
            if visitor(&*element)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    fn remaining(&self, consumed: usize, limit: usize, render: &dyn Fn(&I::Item) -> String) -> Remaining {
        let Some(peek) = self.peek else {
            return Remaining::Unavailable;
        };
        // One extra element tells whether the snapshot was truncated.
        let wanted = limit.saturating_add(1);
        let mut values: Vec<String> = {
            let seen = self.seen.borrow();
            seen.iter().skip(consumed).take(wanted).map(|e| render(&**e)).collect()
        };
        if values.len() < wanted {
            let ahead = peek(&*self.pass.borrow(), wanted - values.len());
            values.extend(ahead.iter().map(render));
        }
        let truncated = values.len() > limit;
        values.truncate(limit);
        Remaining::Elements { values, truncated }
    }
}

impl<I: Iterator> Debug for ReplaySource<I>
where
    I::Item: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        if let Ok(seen) = self.seen.try_borrow() {
            list.entries(seen.iter());
        }
        list.entry(&format_args!("..")).finish()
    }
}

struct Quantifier<S: ?Sized + ElementSource> {
    kind: QuantifierKind,
    element: Check<S::Item>,
    source: PhantomData<fn(&S)>,
}

impl<S> Composite<S> for Quantifier<S>
where
    S: ?Sized + ElementSource,
{
    fn kind(&self) -> EntryKind {
        EntryKind::Quantifier {
            quantifier: self.kind,
        }
    }

    fn test(&self, source: &S) -> Result<bool, BoxError> {
        let cut = self.kind.cut_value();
        let mut hit = false;
        source.visit(&mut |element| {
            if self.element.test(element)? == cut {
                hit = true;
                return Ok(ControlFlow::Break(()));
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(self.kind.result(hit))
    }

    fn explain(&self, source: &S, cx: &mut Explainer) -> Result<bool, BoxError> {
        let (hit, consumed) = visit_explained(self.kind, source, cx, |element, cx| {
            self.element.explain_into(element, cx)
        })?;
        record_remaining(source, consumed, hit, cx);
        Ok(self.kind.result(hit))
    }
}

/// Explain-path consumption shared by every quantifying node.
///
/// Labels each element entry `[i]` and returns whether the cut was hit and
/// how many elements were consumed.
pub(crate) fn visit_explained<S, F>(
    kind: QuantifierKind,
    source: &S,
    cx: &mut Explainer,
    mut explain: F,
) -> Result<(bool, usize), BoxError>
where
    S: ?Sized + ElementSource,
    F: FnMut(&S::Item, &mut Explainer) -> Result<bool, BoxError>,
{
    let cut = kind.cut_value();
    let mut hit = false;
    let mut consumed = 0;
    source.visit(&mut |element| {
        cx.label_next(format!("[{}]", consumed));
        consumed += 1;
        if explain(element, cx)? == cut {
            hit = true;
            return Ok(ControlFlow::Break(()));
        }
        Ok(ControlFlow::Continue(()))
    })?;
    Ok((hit, consumed))
}

/// Snapshots what the quantifier left unconsumed, if it stopped early.
pub(crate) fn record_remaining<S>(source: &S, consumed: usize, hit: bool, cx: &mut Explainer)
where
    S: ?Sized + ElementSource,
{
    if !hit || !cx.config().record_remaining {
        return;
    }
    let limit = cx.config().max_remaining;
    let remaining = source.remaining(consumed, limit, &|element| cx.snapshot(element));
    cx.set_remaining(remaining);
}

/// Quantifies `element` over any [`ElementSource`].
pub fn quantify<S>(kind: QuantifierKind, element: impl IntoCheck<S::Item>) -> Check<S>
where
    S: ?Sized + ElementSource + 'static,
    S::Item: 'static,
{
    let element = element.into_check();
    let identity = Identity::builtin(
        match kind {
            QuantifierKind::All => "all_match",
            QuantifierKind::Any => "any_match",
            QuantifierKind::None => "none_match",
        },
        vec![Arg::Node(element.identity().clone())],
    );
    let rendered = element.description().clone();
    let description = Description::lazy(move || format!("{}({})", kind, rendered));
    Check::from_node(
        identity,
        description,
        CheckNode::Composite(Box::new(Quantifier {
            kind,
            element,
            source: PhantomData,
        })),
    )
}

/// Every element satisfies `element`
pub fn all_match<E: Debug + 'static>(element: impl IntoCheck<E>) -> Check<[E]> {
    quantify(QuantifierKind::All, element)
}

/// At least one element satisfies `element`
pub fn any_match<E: Debug + 'static>(element: impl IntoCheck<E>) -> Check<[E]> {
    quantify(QuantifierKind::Any, element)
}

/// No element satisfies `element`
pub fn none_match<E: Debug + 'static>(element: impl IntoCheck<E>) -> Check<[E]> {
    quantify(QuantifierKind::None, element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{Evaluator, ExplainConfig};
    use crate::node::check::FnLeaf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn positive() -> Check<i32> {
        Check::named("positive", |n: &i32| *n > 0).unwrap()
    }

    #[test]
    fn test_element_description_renders_once_per_explain() {
        let renders = Arc::new(AtomicUsize::new(0));
        let counter = renders.clone();
        let description = Description::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "counted".to_string()
        });
        let element: Check<i32> = Check::with_identity(
            Identity::new("counted", Vec::new()).unwrap(),
            description,
            FnLeaf(|n: &i32| *n < 100),
        );
        let check = all_match(element);
        let values: Vec<i32> = (0..50).collect();

        let record = check.explain(&values).unwrap();
        assert_eq!(record.root().children().len(), 50);
        assert_eq!(record.root().children()[49].description(), "counted");
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_kind_table() {
        assert!(QuantifierKind::All.default_value());
        assert!(!QuantifierKind::All.cut_value());
        assert!(!QuantifierKind::Any.default_value());
        assert!(QuantifierKind::Any.cut_value());
        assert!(QuantifierKind::None.default_value());
        assert!(QuantifierKind::None.cut_value());
    }

    #[test]
    fn test_empty_sequence_yields_default() {
        let empty: [i32; 0] = [];
        assert!(all_match(positive()).test(&empty).unwrap());
        assert!(!any_match(positive()).test(&empty).unwrap());
        assert!(none_match(positive()).test(&empty).unwrap());
    }

    #[test]
    fn test_quantifier_results() {
        let mixed = [1, -1, 2];
        assert!(!all_match(positive()).test(&mixed).unwrap());
        assert!(any_match(positive()).test(&mixed).unwrap());
        assert!(!none_match(positive()).test(&mixed).unwrap());
        assert!(none_match(positive()).test(&[-1, -2]).unwrap());
    }

    #[test]
    fn test_fast_path_stops_at_cut() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let check: Check<[i32]> = all_match(move |n: &i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            *n > 0
        });
        assert!(!check.test(&[1, 2, -3, 4]).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_description() {
        assert_eq!(all_match(positive()).to_string(), "all(positive)");
        assert_eq!(none_match(positive()).to_string(), "none(positive)");
    }

    #[test]
    fn test_explain_labels_and_remaining() {
        let check = all_match(positive());
        let record = check.explain(&[1, 2, -3, 4, 5]).unwrap();
        let root = record.root();
        assert_eq!(root.children().len(), 3);
        assert_eq!(root.children()[2].label(), Some("[2]"));
        assert_eq!(
            root.remaining(),
            Some(&Remaining::Elements {
                values: vec!["4".to_string(), "5".to_string()],
                truncated: false,
            })
        );
    }

    #[test]
    fn test_remaining_respects_limit() {
        let evaluator = Evaluator::new(ExplainConfig {
            max_remaining: 1,
            ..ExplainConfig::default()
        });
        let record = evaluator.explain(&all_match(positive()), &[-1, 2, 3][..]).unwrap();
        assert_eq!(
            record.root().remaining(),
            Some(&Remaining::Elements {
                values: vec!["2".to_string()],
                truncated: true,
            })
        );
    }

    #[test]
    fn test_replay_source_consumes_once() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let source = ReplaySource::new([1, 2, -3, 4].into_iter().inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let check: Check<ReplaySource<_>> = quantify(QuantifierKind::All, positive());

        assert!(!check.test(&source).unwrap());
        assert_eq!(pulled.load(Ordering::SeqCst), 3);

        let record = Evaluator::default().explain(&check, &source).unwrap();
        assert_eq!(record.outcome(), Some(false));
        assert_eq!(record.root().children().len(), 3);
        assert_eq!(pulled.load(Ordering::SeqCst), 3);
        assert_eq!(source.consumed(), 3);
        assert_eq!(record.root().remaining(), Some(&Remaining::Unavailable));
    }

    #[test]
    fn test_snapshotting_replay_source_reports_remaining() {
        let source = ReplaySource::snapshotting(vec![1, -2, 3, 4]);
        let check: Check<ReplaySource<_>> = quantify(QuantifierKind::All, positive());
        assert!(!check.test(&source).unwrap());

        let record = Evaluator::default().explain(&check, &source).unwrap();
        assert_eq!(
            record.root().remaining(),
            Some(&Remaining::Elements {
                values: vec!["3".to_string(), "4".to_string()],
                truncated: false,
            })
        );
        assert_eq!(source.consumed(), 2);
    }

    #[test]
    fn test_replay_source_debug_shows_buffer() {
        let source = ReplaySource::new(vec![7, 8]);
        assert_eq!(format!("{:?}", source), "[..]");
        let check: Check<ReplaySource<_>> = quantify(QuantifierKind::Any, positive());
        assert!(check.test(&source).unwrap());
        assert_eq!(format!("{:?}", source), "[7, ..]");
    }
}
