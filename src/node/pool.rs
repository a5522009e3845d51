//! Process-wide pool of nodes built from named plain functions
//!
//! A node is keyed by its name and the function signature, populated on
//! first use and never evicted. The name is the identity: registering a
//! second function under a name already pooled for the same signature
//! returns the first node.
//!
//! ```
//! use checktrace::node::pool::{pooled_check, pooled_count};
//!
//! fn is_even(n: &i64) -> bool {
//!     n % 2 == 0
//! }
//!
//! let a = pooled_check("is_even", is_even as fn(&i64) -> bool)?;
//! let b = pooled_check("is_even", is_even as fn(&i64) -> bool)?;
//! assert_eq!(a, b);
//! assert!(pooled_count() >= 1);
//! # Ok::<(), checktrace::ConstructionError>(())
//! ```

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use super::check::{Check, FnLeaf};
use super::errors::ConstructionResult;
use super::transform::Transformer;
use crate::identity::Identity;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PoolKey {
    kind: &'static str,
    identity: Identity,
    signature: TypeId,
}

type PoolMap = HashMap<PoolKey, Arc<dyn Any + Send + Sync>>;

static POOL: Lazy<RwLock<PoolMap>> = Lazy::new(|| RwLock::new(HashMap::new()));

fn pooled<N>(key: PoolKey, build: impl FnOnce() -> N) -> N
where
    N: Clone + Send + Sync + 'static,
{
    let cached = {
        let pool = POOL.read().unwrap_or_else(PoisonError::into_inner);
        pool.get(&key).and_then(|node| node.downcast_ref::<N>()).cloned()
    };
    if let Some(node) = cached {
        return node;
    }

    let mut pool = POOL.write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have populated the slot between the two locks.
    if let Some(node) = pool.get(&key).and_then(|node| node.downcast_ref::<N>()) {
        return node.clone();
    }
    let node = build();
    tracing::trace!(kind = key.kind, name = %key.identity, "pooled node created");
    pool.insert(key, Arc::new(node.clone()));
    node
}

/// Pooled check wrapping a plain function.
///
/// # Errors
///
/// Returns `ConstructionError::EmptyCreator` for a blank name.
pub fn pooled_check<T>(name: impl Into<Cow<'static, str>>, f: fn(&T) -> bool) -> ConstructionResult<Check<T>>
where
    T: ?Sized + 'static,
{
    let identity = Identity::new(name, Vec::new())?;
    let key = PoolKey {
        kind: "check",
        identity: identity.clone(),
        signature: TypeId::of::<fn(&T) -> bool>(),
    };
    Ok(pooled(key, || {
        let description = identity.creator().to_string();
        Check::with_identity(identity, description, FnLeaf(f))
    }))
}

/// Pooled transformer wrapping a plain function.
///
/// # Errors
///
/// Returns `ConstructionError::EmptyCreator` for a blank name.
pub fn pooled_transformer<I, O>(
    name: impl Into<Cow<'static, str>>,
    f: fn(&I) -> O,
) -> ConstructionResult<Transformer<I, O>>
where
    I: ?Sized + 'static,
    O: 'static,
{
    let identity = Identity::new(name, Vec::new())?;
    let key = PoolKey {
        kind: "transformer",
        identity: identity.clone(),
        signature: TypeId::of::<fn(&I) -> O>(),
    };
    Ok(pooled(key, || {
        let description = identity.creator().to_string();
        Transformer::with_identity(identity, description, f)
    }))
}

/// Number of pooled nodes
pub fn pooled_count() -> usize {
    POOL.read().unwrap_or_else(PoisonError::into_inner).len()
}
