use serde::Serialize;
use serde_json::{Map, Value};

/// A view identifier plus the model data handed to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelView {
    view: String,
    data: Map<String, Value>,
}

impl ModelView {
    #[must_use]
    pub fn new(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            data: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Insert any serializable record under `key`.
    pub fn insert_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.data.insert(key.into(), value);
        Ok(())
    }

    #[must_use]
    pub fn view(&self) -> &str {
        &self.view
    }

    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Map<String, Value>) {
        (self.view, self.data)
    }
}

/// What a handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Renderable {
    /// Written literally (or encoded as a JSON string on JSON routes)
    Text(String),
    /// Forwarded to the view layer (or its model encoded on JSON routes)
    View(ModelView),
    /// Structured value; only JSON routes can render it
    Data(Value),
}

impl Renderable {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Renderable::Text(text.into())
    }

    /// Structured result from any serializable value.
    pub fn data<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Renderable::Data)
    }

    /// Short description of the result shape, for diagnostics.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Renderable::Text(_) => "text",
            Renderable::View(_) => "view",
            Renderable::Data(Value::Null) => "null",
            Renderable::Data(Value::Bool(_)) => "boolean",
            Renderable::Data(Value::Number(_)) => "number",
            Renderable::Data(Value::String(_)) => "string",
            Renderable::Data(Value::Array(_)) => "array",
            Renderable::Data(Value::Object(_)) => "object",
        }
    }
}

impl From<ModelView> for Renderable {
    fn from(mv: ModelView) -> Self {
        Renderable::View(mv)
    }
}

impl From<Value> for Renderable {
    fn from(value: Value) -> Self {
        Renderable::Data(value)
    }
}

impl From<String> for Renderable {
    fn from(text: String) -> Self {
        Renderable::Text(text)
    }
}

impl From<&str> for Renderable {
    fn from(text: &str) -> Self {
        Renderable::Text(text.to_string())
    }
}
