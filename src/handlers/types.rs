use super::args::CallArguments;
use super::binder::ObjectBinder;
use crate::convert::ScalarKind;
use crate::render::Renderable;
use std::fmt;
use std::sync::Arc;

/// Declared type of a handler parameter.
#[derive(Clone)]
pub enum ParamKind {
    /// Single converted value, looked up by binding name
    Scalar(ScalarKind),
    /// Object filled field-by-field from path variables and request parameters
    Object(Arc<dyn ObjectBinder>),
    /// Every request parameter plus every path variable, as a map
    Params,
    /// Uploaded file from the multipart part named after the parameter
    File,
    /// Copy of the client session, saved back after the call
    Session,
}

impl fmt::Debug for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Scalar(kind) => write!(f, "Scalar({kind})"),
            ParamKind::Object(binder) => write!(f, "Object({})", binder.type_name()),
            ParamKind::Params => f.write_str("Params"),
            ParamKind::File => f.write_str("File"),
            ParamKind::Session => f.write_str("Session"),
        }
    }
}

/// One declared handler parameter.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    name: String,
    kind: ParamKind,
    binding: Option<String>,
}

impl ParameterDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            binding: None,
        }
    }

    #[must_use]
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, ParamKind::Scalar(kind))
    }

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Text)
    }

    #[must_use]
    pub fn object(name: impl Into<String>, binder: impl ObjectBinder + 'static) -> Self {
        Self::new(name, ParamKind::Object(Arc::new(binder)))
    }

    #[must_use]
    pub fn params(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Params)
    }

    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::File)
    }

    #[must_use]
    pub fn session(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Session)
    }

    /// Look this parameter up under `binding` instead of its declared name.
    #[must_use]
    pub fn bind_as(mut self, binding: impl Into<String>) -> Self {
        self.binding = Some(binding.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Name used for path-variable, parameter and part lookups.
    #[must_use]
    pub fn binding_name(&self) -> &str {
        self.binding.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn is_session(&self) -> bool {
        matches!(self.kind, ParamKind::Session)
    }
}

/// Handler body: reads its arguments, may mutate session arguments in place.
pub type HandlerFn = dyn Fn(&mut CallArguments) -> anyhow::Result<Renderable> + Send + Sync;

/// A registered handler: its name, parameter list, output mode and body.
#[derive(Clone)]
pub struct HandlerDescriptor {
    name: String,
    parameters: Vec<ParameterDescriptor>,
    json: bool,
    call: Arc<HandlerFn>,
}

impl HandlerDescriptor {
    #[must_use]
    pub fn new<F>(name: impl Into<String>, call: F) -> Self
    where
        F: Fn(&mut CallArguments) -> anyhow::Result<Renderable> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            json: false,
            call: Arc::new(call),
        }
    }

    #[must_use]
    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Render every result of this handler as JSON.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    #[must_use]
    pub fn produces_json(&self) -> bool {
        self.json
    }

    pub fn invoke(&self, args: &mut CallArguments) -> anyhow::Result<Renderable> {
        (self.call)(args)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("json", &self.json)
            .finish_non_exhaustive()
    }
}
