mod common;

use common::{employee_binder, Employee};
use frontdispatch::convert::ScalarKind;
use frontdispatch::dispatcher::{ArgumentResolver, BindError, UploadLimits};
use frontdispatch::handlers::{Argument, FieldBinder, HandlerDescriptor, ParameterDescriptor, SessionMap};
use frontdispatch::render::Renderable;
use frontdispatch::router::{Route, RouteTable};
use frontdispatch::server::{InboundRequest, MultipartPart};
use http::Method;
use serde_json::json;

fn table(template: &str, params: Vec<ParameterDescriptor>) -> RouteTable {
    let handler = params.into_iter().fold(
        HandlerDescriptor::new("h", |_| Ok(Renderable::text("ok"))),
        HandlerDescriptor::param,
    );
    RouteTable::builder()
        .register(Route::any(template), handler)
        .unwrap()
        .build()
}

fn resolve(
    table: &RouteTable,
    resolver: ArgumentResolver,
    request: &InboundRequest,
    session: Option<&SessionMap>,
) -> Result<frontdispatch::handlers::CallArguments, BindError> {
    let matched = table.resolve(request.path(), request.method()).unwrap();
    resolver.resolve(matched.entry.handler().parameters(), &matched, request, session)
}

#[test]
fn test_object_binding_ignores_unknown_names() {
    let t = table("/emp", vec![ParameterDescriptor::object("emp", employee_binder())]);
    let req = InboundRequest::new(Method::POST, "/emp?id=42&name=Ann&shoe_size=44");
    let mut args = resolve(&t, ArgumentResolver::default(), &req, None).unwrap();
    assert_eq!(
        args.take_object::<Employee>(0),
        Some(Employee {
            id: 42,
            name: "Ann".into(),
            active: false
        })
    );
}

#[test]
fn test_object_request_value_overrides_path_variable() {
    let t = table("/emp/{id}", vec![ParameterDescriptor::object("emp", employee_binder())]);
    let req = InboundRequest::new(Method::POST, "/emp/7?id=8&name=Bo&name=Cy");
    let args = resolve(&t, ArgumentResolver::default(), &req, None).unwrap();
    let emp = args.object::<Employee>(0).unwrap();
    assert_eq!(emp.id, 8);
    assert_eq!(emp.name, "Bo");
}

#[test]
fn test_uninstantiable_object_binds_raw_value() {
    let binder = FieldBinder::<Employee>::with_factory(|| None);
    let t = table("/emp/{emp}", vec![ParameterDescriptor::object("emp", binder)]);
    let req = InboundRequest::new(Method::GET, "/emp/raw-value");
    let args = resolve(&t, ArgumentResolver::default(), &req, None).unwrap();
    assert_eq!(args.text(0), Some("raw-value"));
}

#[test]
fn test_scalar_prefers_path_variable() {
    let t = table(
        "/orders/{id}",
        vec![
            ParameterDescriptor::scalar("id", ScalarKind::Long),
            ParameterDescriptor::scalar("qty", ScalarKind::Short),
            ParameterDescriptor::scalar("missing", ScalarKind::Int),
        ],
    );
    let req = InboundRequest::new(Method::GET, "/orders/9000000000?id=1&qty=3&qty=4");
    let args = resolve(&t, ArgumentResolver::default(), &req, None).unwrap();
    assert_eq!(args.scalar::<i64>(0), Some(9_000_000_000));
    assert_eq!(args.scalar::<i16>(1), Some(3));
    assert!(args.get(2).is_some_and(Argument::is_absent));
}

#[test]
fn test_scalar_conversion_failure_names_parameter() {
    let t = table("/orders/{id}", vec![ParameterDescriptor::scalar("id", ScalarKind::Int)]);
    let req = InboundRequest::new(Method::GET, "/orders/ten");
    match resolve(&t, ArgumentResolver::default(), &req, None) {
        Err(BindError::Conversion { parameter, source }) => {
            assert_eq!(parameter, "id");
            assert!(source.to_string().contains("ten"));
        }
        other => panic!("expected conversion error, got {other:?}"),
    }
}

#[test]
fn test_session_argument_is_a_copy() {
    let t = table("/s", vec![ParameterDescriptor::session("session")]);
    let mut session = SessionMap::new();
    session.insert("profile".into(), json!("admin"));
    let req = InboundRequest::new(Method::GET, "/s");
    let mut args = resolve(&t, ArgumentResolver::default(), &req, Some(&session)).unwrap();
    args.session_mut(0).unwrap().insert("cart".into(), json!([]));
    assert!(!session.contains_key("cart"));

    let args = resolve(&t, ArgumentResolver::default(), &req, None).unwrap();
    assert!(args.session(0).unwrap().is_empty());
}

#[test]
fn test_missing_upload_is_absent() {
    let t = table("/up", vec![ParameterDescriptor::file("doc")]);
    let req = InboundRequest::new(Method::POST, "/up")
        .with_part(MultipartPart::new("other", b"text".to_vec()));
    let args = resolve(&t, ArgumentResolver::default(), &req, None).unwrap();
    assert!(args.file(0).is_none());
    assert!(args.get(0).is_some_and(Argument::is_absent));
}

#[test]
fn test_upload_size_limits() {
    let t = table("/up", vec![ParameterDescriptor::file("doc")]);
    let limits = UploadLimits {
        max_file_size: 4,
        max_request_size: 8,
    };
    let resolver = ArgumentResolver::new(limits);

    let small = InboundRequest::new(Method::POST, "/up")
        .with_part(MultipartPart::file("doc", "a.txt", "text/plain", b"abcd".to_vec()));
    assert_eq!(resolve(&t, resolver, &small, None).unwrap().file(0).unwrap().size(), 4);

    let big_file = InboundRequest::new(Method::POST, "/up")
        .with_part(MultipartPart::file("doc", "a.txt", "text/plain", b"abcde".to_vec()));
    assert!(matches!(
        resolve(&t, resolver, &big_file, None),
        Err(BindError::UploadTooLarge { size: 5, limit: 4, .. })
    ));

    let big_request = InboundRequest::new(Method::POST, "/up")
        .with_part(MultipartPart::file("doc", "a.txt", "text/plain", b"ab".to_vec()))
        .with_part(MultipartPart::new("notes", b"0123456789".to_vec()));
    assert!(matches!(
        resolve(&t, resolver, &big_request, None),
        Err(BindError::RequestTooLarge { size: 12, limit: 8 })
    ));
}

#[test]
fn test_repeated_path_name_binds_first_capture() {
    let t = table("/org/{id}/user/{id}", vec![ParameterDescriptor::scalar("id", ScalarKind::Int)]);
    let req = InboundRequest::new(Method::GET, "/org/1/user/2");
    let args = resolve(&t, ArgumentResolver::default(), &req, None).unwrap();
    assert_eq!(args.scalar::<i32>(0), Some(1));
}

#[test]
fn test_bool_parameter_rejects_other_words() {
    let t = table("/emp", vec![ParameterDescriptor::scalar("active", ScalarKind::Bool)]);
    let ok = InboundRequest::new(Method::GET, "/emp?active=False");
    let args = resolve(&t, ArgumentResolver::default(), &ok, None).unwrap();
    assert_eq!(args.scalar::<bool>(0), Some(false));

    let req = InboundRequest::new(Method::GET, "/emp?active=yes");
    match resolve(&t, ArgumentResolver::default(), &req, None) {
        Err(BindError::Conversion { parameter, source }) => {
            assert_eq!(parameter, "active");
            assert_eq!(source.kind, ScalarKind::Bool);
        }
        other => panic!("expected conversion error, got {other:?}"),
    }
}
