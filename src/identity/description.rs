//! Node descriptions
//!
//! A description is either a literal or a supplier. Suppliers are invoked
//! each time the node is rendered. While a `RenderScope` is open on the
//! current thread (one explain run), each supplier runs at most once and
//! later renders reuse its text; the memo is dropped with the scope.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Supplier = Arc<dyn Fn() -> String + Send + Sync>;

thread_local! {
    // Keyed by supplier address; the supplier is held so the address stays live.
    static RENDER_MEMO: RefCell<Option<HashMap<usize, (Supplier, String)>>> = const { RefCell::new(None) };
}

/// Memoizes lazy renders on this thread until dropped.
///
/// Nested scopes share the outermost scope's memo.
pub(crate) struct RenderScope {
    owner: bool,
}

impl RenderScope {
    pub(crate) fn open() -> Self {
        let owner = RENDER_MEMO.with(|memo| {
            let mut memo = memo.borrow_mut();
            if memo.is_some() {
                return false;
            }
            *memo = Some(HashMap::new());
            true
        });
        Self { owner }
    }
}

impl Drop for RenderScope {
    fn drop(&mut self) {
        if self.owner {
            // Take the map out first so suppliers drop outside the borrow.
            let memo = RENDER_MEMO.with(|memo| memo.borrow_mut().take());
            drop(memo);
        }
    }
}

fn memoized(supplier: &Supplier) -> String {
    let key = Arc::as_ptr(supplier) as *const () as usize;
    let hit = RENDER_MEMO.with(|memo| {
        memo.borrow()
            .as_ref()
            .and_then(|m| m.get(&key).map(|(_, text)| text.clone()))
    });
    if let Some(text) = hit {
        return text;
    }
    // Suppliers render their children, so no borrow is held here.
    let text = supplier();
    RENDER_MEMO.with(|memo| {
        if let Some(m) = memo.borrow_mut().as_mut() {
            m.insert(key, (Arc::clone(supplier), text.clone()));
        }
    });
    text
}

/// Human-readable rendering of a node.
#[derive(Clone)]
pub enum Description {
    Literal(Cow<'static, str>),
    Lazy(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Description {
    /// A fixed description
    pub fn literal(text: impl Into<Cow<'static, str>>) -> Self {
        Description::Literal(text.into())
    }

    /// A description computed on each render
    pub fn lazy<F>(supplier: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Description::Lazy(Arc::new(supplier))
    }

    /// Renders the description
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Description::Literal(text) => Cow::Borrowed(text.as_ref()),
            Description::Lazy(supplier) => Cow::Owned(memoized(supplier)),
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Description::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Description::Lazy(_) => f.debug_tuple("Lazy").field(&self.render()).finish(),
        }
    }
}

impl From<&'static str> for Description {
    fn from(text: &'static str) -> Self {
        Description::literal(text)
    }
}

impl From<String> for Description {
    fn from(text: String) -> Self {
        Description::literal(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_literal_render() {
        assert_eq!(Description::literal("length").to_string(), "length");
    }

    #[test]
    fn test_lazy_evaluated_per_render() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let description = Description::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "lazy".to_string()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(description.to_string(), "lazy");
        assert_eq!(description.to_string(), "lazy");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scope_renders_each_supplier_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let inner = Description::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "inner".to_string()
        });
        let nested = inner.clone();
        let outer = Description::lazy(move || format!("outer({})", nested));

        {
            let _scope = RenderScope::open();
            let _nested_scope = RenderScope::open();
            assert_eq!(outer.to_string(), "outer(inner)");
            assert_eq!(inner.to_string(), "inner");
            assert_eq!(outer.to_string(), "outer(inner)");
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        assert_eq!(inner.to_string(), "inner");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
