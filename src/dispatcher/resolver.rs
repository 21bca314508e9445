//! Argument resolution: request data to handler arguments.
//!
//! Each declared parameter is resolved independently, by the first rule that
//! applies to its kind:
//!
//! 1. session map: a copy of the client session
//! 2. params map: every request parameter, then every path variable on top
//! 3. uploaded file: the multipart part named by the binding name
//! 4. object: a default instance filled field-by-field
//! 5. scalar: the path variable, else the first request value, converted

use crate::convert::{ConversionError, Scalar, ScalarKind};
use crate::handlers::{
    Argument, CallArguments, ObjectBinder, ParamKind, ParameterDescriptor, SessionMap,
};
use crate::router::MatchResult;
use crate::server::InboundRequest;
use serde_json::{Map, Value};
use tracing::debug;

/// Default largest accepted uploaded part (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
/// Default largest accepted total of all parts (50 MiB).
pub const DEFAULT_MAX_REQUEST_SIZE: u64 = 50 * 1024 * 1024;

/// Size caps applied to multipart uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: u64,
    pub max_request_size: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
        }
    }
}

/// Arguments could not be resolved; the handler is not invoked.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("parameter `{parameter}` could not be bound")]
    Conversion {
        parameter: String,
        #[source]
        source: ConversionError,
    },
    #[error("upload `{parameter}` is {size} bytes, limit is {limit}")]
    UploadTooLarge {
        parameter: String,
        size: u64,
        limit: u64,
    },
    #[error("multipart request is {size} bytes, limit is {limit}")]
    RequestTooLarge { size: u64, limit: u64 },
}

/// Builds [`CallArguments`] for a matched handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentResolver {
    limits: UploadLimits,
}

impl ArgumentResolver {
    #[must_use]
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    /// Resolve every parameter, in order.
    ///
    /// `session` is the request's copy of the client session; it is only
    /// consulted for session parameters.
    pub fn resolve(
        &self,
        parameters: &[ParameterDescriptor],
        matched: &MatchResult<'_>,
        request: &InboundRequest,
        session: Option<&SessionMap>,
    ) -> Result<CallArguments, BindError> {
        if request.is_multipart()
            && parameters
                .iter()
                .any(|p| matches!(p.kind(), ParamKind::File))
        {
            self.check_request_size(request)?;
        }

        let mut args = CallArguments::new();
        for parameter in parameters {
            let arg = match parameter.kind() {
                ParamKind::Session => Argument::Session(session.cloned().unwrap_or_default()),
                ParamKind::Params => Argument::Params(Self::params_map(matched, request)),
                ParamKind::File => self.file(parameter, request)?,
                ParamKind::Object(binder) => Self::object(parameter, binder.as_ref(), matched, request),
                ParamKind::Scalar(kind) => Self::scalar(parameter, *kind, matched, request)?,
            };
            args.push(arg);
        }
        Ok(args)
    }

    fn check_request_size(&self, request: &InboundRequest) -> Result<(), BindError> {
        let size: u64 = request.parts().iter().map(|p| p.body().len() as u64).sum();
        if size > self.limits.max_request_size {
            return Err(BindError::RequestTooLarge {
                size,
                limit: self.limits.max_request_size,
            });
        }
        Ok(())
    }

    fn params_map(matched: &MatchResult<'_>, request: &InboundRequest) -> Map<String, Value> {
        let mut map = Map::with_capacity(request.params().len() + matched.variables.len());
        for (key, values) in request.params().iter() {
            let value = match values {
                [single] => Value::String(single.clone()),
                many => Value::Array(many.iter().cloned().map(Value::String).collect()),
            };
            map.insert(key.to_string(), value);
        }
        for (name, value) in &matched.variables {
            map.insert(name.to_string(), Value::String(value.clone()));
        }
        map
    }

    fn file(
        &self,
        parameter: &ParameterDescriptor,
        request: &InboundRequest,
    ) -> Result<Argument, BindError> {
        let name = parameter.binding_name();
        let Some(file) = request.part(name).and_then(|p| p.to_uploaded_file()) else {
            debug!(parameter = %name, multipart = request.is_multipart(), "No uploaded file");
            return Ok(Argument::Absent);
        };
        if file.size() > self.limits.max_file_size {
            return Err(BindError::UploadTooLarge {
                parameter: name.to_string(),
                size: file.size(),
                limit: self.limits.max_file_size,
            });
        }
        debug!(
            parameter = %name,
            file_name = %file.file_name(),
            size = file.size(),
            "Uploaded file bound"
        );
        Ok(Argument::File(file))
    }

    fn object(
        parameter: &ParameterDescriptor,
        binder: &dyn ObjectBinder,
        matched: &MatchResult<'_>,
        request: &InboundRequest,
    ) -> Argument {
        let Some(mut object) = binder.instantiate() else {
            debug!(
                parameter = %parameter.name(),
                type_name = binder.type_name(),
                "Object could not be instantiated, binding as plain value"
            );
            return Self::raw_text(parameter.binding_name(), matched, request);
        };

        let path_fields = matched
            .variables
            .iter()
            .map(|(name, value)| (name.as_ref(), value.as_str()));
        let request_fields = request
            .params()
            .iter()
            .filter_map(|(key, values)| values.first().map(|v| (key, v.as_str())));

        for (field, raw) in path_fields.chain(request_fields) {
            if let Err(e) = binder.bind_field(object.as_mut(), field, raw) {
                debug!(
                    parameter = %parameter.name(),
                    type_name = binder.type_name(),
                    field = %field,
                    error = %e,
                    "Field binding skipped"
                );
            }
        }
        Argument::Object(object)
    }

    fn lookup<'r>(
        name: &str,
        matched: &'r MatchResult<'_>,
        request: &'r InboundRequest,
    ) -> Option<&'r str> {
        matched
            .variable(name)
            .or_else(|| request.params().first(name))
    }

    fn raw_text(name: &str, matched: &MatchResult<'_>, request: &InboundRequest) -> Argument {
        match Self::lookup(name, matched, request) {
            Some(raw) => Argument::Scalar(Scalar::Text(raw.to_string())),
            None => Argument::Absent,
        }
    }

    fn scalar(
        parameter: &ParameterDescriptor,
        kind: ScalarKind,
        matched: &MatchResult<'_>,
        request: &InboundRequest,
    ) -> Result<Argument, BindError> {
        let raw = Self::lookup(parameter.binding_name(), matched, request);
        match kind.convert(raw) {
            Ok(Some(value)) => Ok(Argument::Scalar(value)),
            Ok(None) => Ok(Argument::Absent),
            Err(source) => Err(BindError::Conversion {
                parameter: parameter.name().to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{FieldBinder, HandlerDescriptor};
    use crate::render::Renderable;
    use crate::router::{Route, RouteTable};
    use crate::server::MultipartPart;
    use http::Method;
    use serde_json::json;

    #[derive(Default, Debug, PartialEq)]
    struct Employee {
        id: i32,
        name: String,
    }

    fn employee_binder() -> FieldBinder<Employee> {
        FieldBinder::new()
            .field("id", |e: &mut Employee, v: i32| e.id = v)
            .field("name", |e: &mut Employee, v: String| e.name = v)
    }

    fn table(template: &str) -> RouteTable {
        RouteTable::builder()
            .register(
                Route::any(template),
                HandlerDescriptor::new("h", |_| Ok(Renderable::text(""))),
            )
            .unwrap()
            .build()
    }

    #[test]
    fn test_scalar_prefers_path_variable() {
        let t = table("/emp/{id}");
        let req = InboundRequest::new(Method::GET, "/emp/42?id=7");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let params = [ParameterDescriptor::scalar("id", ScalarKind::Int)];
        let args = ArgumentResolver::default()
            .resolve(&params, &m, &req, None)
            .unwrap();
        assert_eq!(args.scalar::<i32>(0), Some(42));
    }

    #[test]
    fn test_binding_name_override() {
        let t = table("/emp/{id}");
        let req = InboundRequest::new(Method::GET, "/emp/5");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let params = [ParameterDescriptor::scalar("employeeId", ScalarKind::Long).bind_as("id")];
        let args = ArgumentResolver::default()
            .resolve(&params, &m, &req, None)
            .unwrap();
        assert_eq!(args.scalar::<i64>(0), Some(5));
    }

    #[test]
    fn test_missing_scalar_is_absent() {
        let t = table("/x");
        let req = InboundRequest::new(Method::GET, "/x");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let params = [ParameterDescriptor::scalar("n", ScalarKind::Double)];
        let args = ArgumentResolver::default()
            .resolve(&params, &m, &req, None)
            .unwrap();
        assert!(args.get(0).unwrap().is_absent());
    }

    #[test]
    fn test_bad_scalar_fails_resolution() {
        let t = table("/emp/{id}");
        let req = InboundRequest::new(Method::GET, "/emp/abc");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let params = [ParameterDescriptor::scalar("id", ScalarKind::Int)];
        let err = ArgumentResolver::default()
            .resolve(&params, &m, &req, None)
            .unwrap_err();
        assert!(matches!(err, BindError::Conversion { ref parameter, .. } if parameter == "id"));
    }

    #[test]
    fn test_params_map_overlays_path_variables() {
        let t = table("/emp/{id}");
        let req = InboundRequest::new(Method::GET, "/emp/1?id=9&tag=a&tag=b&q=x");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let params = [ParameterDescriptor::params("all")];
        let args = ArgumentResolver::default()
            .resolve(&params, &m, &req, None)
            .unwrap();
        let map = args.params(0).unwrap();
        assert_eq!(map.get("id"), Some(&json!("1")));
        assert_eq!(map.get("tag"), Some(&json!(["a", "b"])));
        assert_eq!(map.get("q"), Some(&json!("x")));
    }

    #[test]
    fn test_object_binding_skips_bad_fields() {
        let t = table("/emp/{id}");
        let req = InboundRequest::new(Method::POST, "/emp/42?name=Ann&salary=10");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let params = [ParameterDescriptor::object("emp", employee_binder())];
        let mut args = ArgumentResolver::default()
            .resolve(&params, &m, &req, None)
            .unwrap();
        assert_eq!(
            args.take_object::<Employee>(0),
            Some(Employee {
                id: 42,
                name: "Ann".into()
            })
        );
    }

    #[test]
    fn test_object_field_conversion_failure_keeps_default() {
        let t = table("/emp");
        let req = InboundRequest::new(Method::POST, "/emp?id=forty&name=Bo");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let params = [ParameterDescriptor::object("emp", employee_binder())];
        let args = ArgumentResolver::default()
            .resolve(&params, &m, &req, None)
            .unwrap();
        let emp = args.object::<Employee>(0).unwrap();
        assert_eq!(emp.id, 0);
        assert_eq!(emp.name, "Bo");
    }

    #[test]
    fn test_object_instantiation_failure_falls_back() {
        let t = table("/emp");
        let req = InboundRequest::new(Method::POST, "/emp?emp=raw");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let binder: FieldBinder<Employee> = FieldBinder::with_factory(|| None);
        let params = [ParameterDescriptor::object("emp", binder)];
        let args = ArgumentResolver::default()
            .resolve(&params, &m, &req, None)
            .unwrap();
        assert_eq!(args.text(0), Some("raw"));
    }

    #[test]
    fn test_session_parameter_gets_copy() {
        let t = table("/cart");
        let req = InboundRequest::new(Method::GET, "/cart");
        let m = t.resolve(req.path(), req.method()).unwrap();
        let mut session = SessionMap::new();
        session.insert("user".into(), json!("ann"));
        let params = [ParameterDescriptor::session("s")];
        let mut args = ArgumentResolver::default()
            .resolve(&params, &m, &req, Some(&session))
            .unwrap();
        args.session_mut(0).unwrap().insert("x".into(), json!(1));
        assert_eq!(session.len(), 1);
        assert_eq!(args.session(0).unwrap().len(), 2);
    }

    #[test]
    fn test_file_requires_multipart_part() {
        let t = table("/up");
        let plain = InboundRequest::new(Method::POST, "/up");
        let m = t.resolve(plain.path(), plain.method()).unwrap();
        let params = [ParameterDescriptor::file("doc")];
        let r = ArgumentResolver::default();
        assert!(r.resolve(&params, &m, &plain, None).unwrap().get(0).unwrap().is_absent());

        let other = InboundRequest::new(Method::POST, "/up")
            .with_part(MultipartPart::file("photo", "a.png", "image/png", vec![1]));
        assert!(r.resolve(&params, &m, &other, None).unwrap().get(0).unwrap().is_absent());

        let no_name = InboundRequest::new(Method::POST, "/up")
            .with_part(MultipartPart::new("doc", b"text".to_vec()));
        assert!(r.resolve(&params, &m, &no_name, None).unwrap().get(0).unwrap().is_absent());

        let ok = InboundRequest::new(Method::POST, "/up").with_part(MultipartPart::file(
            "doc",
            "C:\\tmp\\cv.pdf",
            "application/pdf",
            vec![0; 4],
        ));
        let args = r.resolve(&params, &m, &ok, None).unwrap();
        let file = args.file(0).unwrap();
        assert_eq!(file.file_name(), "cv.pdf");
        assert_eq!(file.size(), 4);
    }

    #[test]
    fn test_upload_limits() {
        let t = table("/up");
        let req = InboundRequest::new(Method::POST, "/up")
            .with_part(MultipartPart::file("doc", "a.bin", "application/octet-stream", vec![0; 16]));
        let m = t.resolve(req.path(), req.method()).unwrap();
        let params = [ParameterDescriptor::file("doc")];

        let per_file = ArgumentResolver::new(UploadLimits {
            max_file_size: 8,
            max_request_size: 100,
        });
        assert!(matches!(
            per_file.resolve(&params, &m, &req, None),
            Err(BindError::UploadTooLarge { size: 16, limit: 8, .. })
        ));

        let per_request = ArgumentResolver::new(UploadLimits {
            max_file_size: 100,
            max_request_size: 8,
        });
        assert!(matches!(
            per_request.resolve(&params, &m, &req, None),
            Err(BindError::RequestTooLarge { size: 16, limit: 8 })
        ));
    }
}
