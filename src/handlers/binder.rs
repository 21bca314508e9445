//! Field binding for object parameters.
//!
//! An object parameter is bound by instantiating a default value and then
//! assigning every path variable and request parameter whose name matches a
//! declared field. The fields are declared up front with typed setters:
//!
//! ```rust
//! use frontdispatch::handlers::{FieldBinder, ObjectBinder};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Employee { id: i32, name: String }
//!
//! let binder = FieldBinder::<Employee>::new()
//!     .field("id", |e: &mut Employee, v: i32| e.id = v)
//!     .field("name", |e: &mut Employee, v: String| e.name = v);
//!
//! let mut obj = binder.instantiate().unwrap();
//! binder.bind_field(obj.as_mut(), "id", "42").unwrap();
//! assert!(binder.bind_field(obj.as_mut(), "salary", "10").is_err());
//! assert_eq!(obj.downcast_ref::<Employee>().unwrap().id, 42);
//! ```

use crate::convert::{ConversionError, FromScalar};
use std::any::Any;
use std::marker::PhantomData;

/// A single field could not be assigned. Recovered by the resolver: the field
/// keeps its default value and binding continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingFailure {
    #[error("no settable field `{field}`")]
    UnknownField { field: String },
    #[error("field `{field}`: {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConversionError,
    },
    #[error("binder for `{expected}` received an object of another type")]
    TypeMismatch { expected: &'static str },
}

/// Builds and fills objects of one declared type.
pub trait ObjectBinder: Send + Sync {
    /// Name of the bound type, for logs.
    fn type_name(&self) -> &'static str;

    /// Fresh default instance; `None` when the type cannot be constructed.
    fn instantiate(&self) -> Option<Box<dyn Any + Send>>;

    /// Convert `raw` and assign it to `field` of `target`.
    fn bind_field(
        &self,
        target: &mut (dyn Any + Send),
        field: &str,
        raw: &str,
    ) -> Result<(), BindingFailure>;
}

type Setter<T> = Box<dyn Fn(&mut T, &str) -> Result<(), ConversionError> + Send + Sync>;
type Factory<T> = Box<dyn Fn() -> Option<T> + Send + Sync>;

/// [`ObjectBinder`] built from a factory and a list of named, typed setters.
pub struct FieldBinder<T> {
    factory: Factory<T>,
    fields: Vec<(String, Setter<T>)>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Default + Send + 'static> FieldBinder<T> {
    /// Binder that instantiates with `T::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(|| Some(T::default()))
    }
}

impl<T: Default + Send + 'static> Default for FieldBinder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> FieldBinder<T> {
    /// Binder with a custom constructor. Returning `None` makes the parameter
    /// fall back to plain value binding.
    #[must_use]
    pub fn with_factory(factory: impl Fn() -> Option<T> + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a settable field. The raw value is converted to `V` first.
    #[must_use]
    pub fn field<V, F>(mut self, name: &str, set: F) -> Self
    where
        V: FromScalar,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter: Setter<T> = Box::new(move |target, raw| {
            let value = V::parse_raw(raw)?;
            set(target, value);
            Ok(())
        });
        self.fields.push((name.to_string(), setter));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl<T: Send + 'static> ObjectBinder for FieldBinder<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn instantiate(&self) -> Option<Box<dyn Any + Send>> {
        (self.factory)().map(|v| Box::new(v) as Box<dyn Any + Send>)
    }

    fn bind_field(
        &self,
        target: &mut (dyn Any + Send),
        field: &str,
        raw: &str,
    ) -> Result<(), BindingFailure> {
        let (_, setter) = self
            .fields
            .iter()
            .find(|(name, _)| name == field)
            .ok_or_else(|| BindingFailure::UnknownField {
                field: field.to_string(),
            })?;
        let target = target
            .downcast_mut::<T>()
            .ok_or(BindingFailure::TypeMismatch {
                expected: self.type_name(),
            })?;
        setter(target, raw).map_err(|source| BindingFailure::Conversion {
            field: field.to_string(),
            source,
        })
    }
}
