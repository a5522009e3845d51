//! Identity objects: creator tag plus ordered argument list

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::node::ConstructionError;

/// Sequence for anonymous closure identities.
static ANONYMOUS_SEQ: AtomicU64 = AtomicU64::new(1);

/// A single constructor argument recorded in an [`Identity`].
///
/// Floats compare and hash by bit pattern so that `Arg` can be `Eq`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Arg {
    Unit,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    List(Vec<Arg>),
    /// Identity of a child node
    Node(Identity),
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::Unit, Arg::Unit) => true,
            (Arg::Bool(a), Arg::Bool(b)) => a == b,
            (Arg::Int(a), Arg::Int(b)) => a == b,
            (Arg::UInt(a), Arg::UInt(b)) => a == b,
            (Arg::Float(a), Arg::Float(b)) => a.to_bits() == b.to_bits(),
            (Arg::Char(a), Arg::Char(b)) => a == b,
            (Arg::Str(a), Arg::Str(b)) => a == b,
            (Arg::List(a), Arg::List(b)) => a == b,
            (Arg::Node(a), Arg::Node(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Arg {}

impl Hash for Arg {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Arg::Unit => {}
            Arg::Bool(b) => b.hash(state),
            Arg::Int(i) => i.hash(state),
            Arg::UInt(u) => u.hash(state),
            Arg::Float(f) => f.to_bits().hash(state),
            Arg::Char(c) => c.hash(state),
            Arg::Str(s) => s.hash(state),
            Arg::List(items) => items.hash(state),
            Arg::Node(id) => id.hash(state),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Unit => write!(f, "()"),
            Arg::Bool(b) => write!(f, "{}", b),
            Arg::Int(i) => write!(f, "{}", i),
            Arg::UInt(u) => write!(f, "{}", u),
            Arg::Float(x) => write!(f, "{:?}", x),
            Arg::Char(c) => write!(f, "{:?}", c),
            Arg::Str(s) => write!(f, "{:?}", s),
            Arg::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Arg::Node(id) => write!(f, "{}", id),
        }
    }
}

macro_rules! arg_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Arg {
                fn from(value: $source) -> Self {
                    Arg::$variant(value as $target)
                }
            }
        )+
    };
}

arg_from!(Int as i64: i8, i16, i32, i64, isize);
arg_from!(UInt as u64: u8, u16, u32, u64, usize);
arg_from!(Float as f64: f32, f64);

impl From<()> for Arg {
    fn from(_: ()) -> Self {
        Arg::Unit
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Str(value.clone())
    }
}

impl From<Identity> for Arg {
    fn from(value: Identity) -> Self {
        Arg::Node(value)
    }
}

impl<A: Into<Arg>> From<Vec<A>> for Arg {
    fn from(values: Vec<A>) -> Self {
        Arg::List(values.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Arg>> From<Option<A>> for Arg {
    fn from(value: Option<A>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Arg::Unit,
        }
    }
}

/// Value identity of a node: who built it, and from what.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    creator: Cow<'static, str>,
    args: Vec<Arg>,
}

impl Identity {
    /// Creates an identity from a creator tag and its arguments.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::EmptyCreator` if the tag is empty or blank.
    pub fn new(
        creator: impl Into<Cow<'static, str>>,
        args: Vec<Arg>,
    ) -> Result<Self, ConstructionError> {
        let creator = creator.into();
        if creator.trim().is_empty() {
            return Err(ConstructionError::EmptyCreator);
        }
        Ok(Self { creator, args })
    }

    /// Identity for the crate's own constructors, whose tags are constants.
    pub(crate) fn builtin(creator: &'static str, args: Vec<Arg>) -> Self {
        Self {
            creator: Cow::Borrowed(creator),
            args,
        }
    }

    /// A fresh identity for a closure nobody named.
    ///
    /// Never equal to any other identity handed out by this function.
    pub fn anonymous() -> Self {
        let seq = ANONYMOUS_SEQ.fetch_add(1, Ordering::Relaxed);
        Self::builtin("closure", vec![Arg::UInt(seq)])
    }

    /// Returns the creator tag
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// Returns the ordered argument list
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Returns true if this identity was produced by [`Identity::anonymous`]
    pub fn is_anonymous(&self) -> bool {
        self.creator == "closure" && matches!(self.args.as_slice(), [Arg::UInt(_)])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            if let [Arg::UInt(seq)] = self.args.as_slice() {
                return write!(f, "closure#{}", seq);
            }
        }
        if self.args.is_empty() {
            return write!(f, "{}", self.creator);
        }
        write!(f, "{}(", self.creator)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
