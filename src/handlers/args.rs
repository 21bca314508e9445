use crate::convert::{FromScalar, Scalar};
use crate::server::UploadedFile;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::any::Any;
use std::fmt;

/// Maximum number of handler arguments before heap allocation.
pub const MAX_INLINE_ARGS: usize = 8;

/// Session attribute map, as loaded for one request.
pub type SessionMap = Map<String, Value>;

/// One resolved handler argument.
pub enum Argument {
    /// No value could be bound (missing parameter, missing upload, ...)
    Absent,
    Scalar(Scalar),
    /// Merged request parameters and path variables
    Params(Map<String, Value>),
    /// Copy of the client session; written back after the handler returns
    Session(SessionMap),
    File(UploadedFile),
    /// Object produced by an [`ObjectBinder`](super::ObjectBinder)
    Object(Box<dyn Any + Send>),
}

impl Argument {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Argument::Absent)
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Absent => f.write_str("Absent"),
            Argument::Scalar(s) => f.debug_tuple("Scalar").field(s).finish(),
            Argument::Params(m) => f.debug_tuple("Params").field(m).finish(),
            Argument::Session(m) => f.debug_tuple("Session").field(m).finish(),
            Argument::File(file) => f.debug_tuple("File").field(file).finish(),
            Argument::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// Resolved arguments, positionally aligned with the handler's parameters.
#[derive(Debug, Default)]
pub struct CallArguments {
    args: SmallVec<[Argument; MAX_INLINE_ARGS]>,
}

impl CallArguments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: Argument) {
        self.args.push(arg);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.args.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter()
    }

    /// Scalar argument converted to `T`; `None` when absent or of another kind.
    #[must_use]
    pub fn scalar<T: FromScalar>(&self, index: usize) -> Option<T> {
        match self.args.get(index) {
            Some(Argument::Scalar(s)) => T::from_scalar(s.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn text(&self, index: usize) -> Option<&str> {
        match self.args.get(index) {
            Some(Argument::Scalar(Scalar::Text(s))) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn params(&self, index: usize) -> Option<&Map<String, Value>> {
        match self.args.get(index) {
            Some(Argument::Params(m)) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn session(&self, index: usize) -> Option<&SessionMap> {
        match self.args.get(index) {
            Some(Argument::Session(m)) => Some(m),
            _ => None,
        }
    }

    /// Mutable session map; changes are saved to the client session after the call.
    pub fn session_mut(&mut self, index: usize) -> Option<&mut SessionMap> {
        match self.args.get_mut(index) {
            Some(Argument::Session(m)) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn file(&self, index: usize) -> Option<&UploadedFile> {
        match self.args.get(index) {
            Some(Argument::File(file)) => Some(file),
            _ => None,
        }
    }

    #[must_use]
    pub fn object<T: 'static>(&self, index: usize) -> Option<&T> {
        match self.args.get(index) {
            Some(Argument::Object(obj)) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Move a bound object out, leaving [`Argument::Absent`] in its slot.
    pub fn take_object<T: 'static>(&mut self, index: usize) -> Option<T> {
        let slot = self.args.get_mut(index)?;
        match std::mem::replace(slot, Argument::Absent) {
            Argument::Object(obj) => match obj.downcast::<T>() {
                Ok(value) => Some(*value),
                Err(obj) => {
                    *slot = Argument::Object(obj);
                    None
                }
            },
            other => {
                *slot = other;
                None
            }
        }
    }
}

impl FromIterator<Argument> for CallArguments {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}
