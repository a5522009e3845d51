//! Identity layer for check and transformer nodes
//!
//! Closures have no natural equality or description. Every node therefore
//! carries an [`Identity`] (creator tag plus ordered arguments) that decides
//! equality, hashing and the default rendering, and a [`Description`] that
//! is rendered on demand.
//!
//! # Invariants
//!
//! - Two identities are equal iff creator and arguments are equal by value
//! - Identities are never used for execution
//! - Identities are immutable once built

mod description;
mod identity;

pub use description::Description;
pub(crate) use description::RenderScope;
pub use identity::{Arg, Identity};
