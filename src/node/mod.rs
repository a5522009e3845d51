//! # Check Expression Tree
//!
//! Node kinds:
//!
//! - Leaf: a user-supplied [`LeafCheck`], usually a closure
//! - Negation, Conjunction, Disjunction ([`logic`])
//! - Transform: mapper then checker ([`transform`])
//! - Quantifier over an element source ([`quantifier`])
//! - Nested / Bind / Context over an indexed value bundle ([`context`])
//! - Function-composition chain of transformers ([`Transformer::and_then`])
//!
//! Every node carries an [`crate::Identity`] used for equality and hashing,
//! and a description used for printing. Nodes are immutable and cheap to
//! clone; composing never mutates an operand.

mod check;
pub mod context;
mod errors;
pub mod logic;
pub mod pool;
pub mod quantifier;
pub mod transform;
pub mod vocabulary;

pub use check::{Check, IntoCheck, LeafCheck};
pub use errors::{BundleError, ConstructionError, ConstructionResult};
pub use quantifier::{ElementSource, QuantifierKind};
pub use transform::{IntoTransformer, Transformer};
