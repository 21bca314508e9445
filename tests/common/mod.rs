#![allow(dead_code)]

use frontdispatch::convert::ScalarKind;
use frontdispatch::handlers::{FieldBinder, HandlerDescriptor, ParameterDescriptor};
use frontdispatch::render::{ModelView, Renderable};
use frontdispatch::router::{Route, RouteTable};
use serde::Serialize;
use serde_json::{json, Value};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub active: bool,
}

pub fn employee_binder() -> FieldBinder<Employee> {
    FieldBinder::new()
        .field("id", |e: &mut Employee, v: i32| e.id = v)
        .field("name", |e: &mut Employee, v: String| e.name = v)
        .field("active", |e: &mut Employee, v: bool| e.active = v)
}

/// Counts handler invocations across every route of [`sample_routes`].
#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A small employee application exercising every parameter kind.
pub fn sample_routes(calls: &Calls) -> RouteTable {
    let c = calls.clone();
    let list = HandlerDescriptor::new("list_employees", move |_| {
        c.hit();
        let staff = vec![
            Employee {
                id: 1,
                name: "Ann".into(),
                active: true,
            },
            Employee {
                id: 2,
                name: "Bo".into(),
                active: false,
            },
        ];
        Ok(Renderable::data(&staff)?)
    })
    .json();

    let c = calls.clone();
    let show = HandlerDescriptor::new("show_employee", move |args| {
        c.hit();
        let id: i32 = args.scalar(0).unwrap_or_default();
        Ok(ModelView::new("emp/show.html")
            .with("id", id)
            .with("title", "Employee")
            .into())
    })
    .param(ParameterDescriptor::scalar("id", ScalarKind::Int));

    let c = calls.clone();
    let show_json = HandlerDescriptor::new("show_employee_json", move |args| {
        c.hit();
        let id: i32 = args.scalar(0).unwrap_or_default();
        Ok(ModelView::new("ignored.html").with("id", id).into())
    })
    .param(ParameterDescriptor::scalar("employeeId", ScalarKind::Int).bind_as("id"))
    .json();

    let c = calls.clone();
    let save = HandlerDescriptor::new("save_employee", move |args| {
        c.hit();
        let emp = args.take_object::<Employee>(0).unwrap_or_default();
        Ok(Renderable::text(format!(
            "saved {} {} {}",
            emp.id, emp.name, emp.active
        )))
    })
    .param(ParameterDescriptor::object("emp", employee_binder()));

    let c = calls.clone();
    let item = HandlerDescriptor::new("show_item", move |args| {
        c.hit();
        Ok(Renderable::text(format!("item {}", args.text(0).unwrap_or("?"))))
    })
    .param(ParameterDescriptor::text("id"));

    let c = calls.clone();
    let new_item = HandlerDescriptor::new("new_item", move |_| {
        c.hit();
        Ok(Renderable::text("new item form"))
    });

    let c = calls.clone();
    let admin = HandlerDescriptor::new("admin_area", move |_| {
        c.hit();
        Ok(Renderable::text("admin area"))
    });

    let c = calls.clone();
    let admin_json = HandlerDescriptor::new("admin_report", move |_| {
        c.hit();
        Ok(Renderable::Data(json!({"ok": true})))
    })
    .json();

    let c = calls.clone();
    let cart_add = HandlerDescriptor::new("cart_add", move |args| {
        c.hit();
        let item = args.text(1).unwrap_or("nothing").to_string();
        let session = args
            .session_mut(0)
            .ok_or_else(|| anyhow::anyhow!("session argument missing"))?;
        let cart = session.entry("cart").or_insert_with(|| json!([]));
        if let Value::Array(items) = &mut *cart {
            items.push(Value::String(item));
        }
        Ok(Renderable::Data(cart.clone()))
    })
    .param(ParameterDescriptor::session("session"))
    .param(ParameterDescriptor::text("item"))
    .json();

    let c = calls.clone();
    let login = HandlerDescriptor::new("login", move |args| {
        c.hit();
        let role = args.text(1).unwrap_or("user").to_string();
        if let Some(session) = args.session_mut(0) {
            session.insert("profile".into(), Value::String(role));
        }
        Ok(Renderable::text("logged in"))
    })
    .param(ParameterDescriptor::session("session"))
    .param(ParameterDescriptor::text("role"));

    let c = calls.clone();
    let upload = HandlerDescriptor::new("upload", move |args| {
        c.hit();
        Ok(Renderable::text(match args.file(0) {
            Some(f) => format!("{} {} {}", f.file_name(), f.size(), f.extension()),
            None => "no file".to_string(),
        }))
    })
    .param(ParameterDescriptor::file("document").bind_as("doc"));

    let c = calls.clone();
    let search = HandlerDescriptor::new("search", move |args| {
        c.hit();
        let all = args.params(0).cloned().unwrap_or_default();
        Ok(Renderable::Data(Value::Object(all)))
    })
    .param(ParameterDescriptor::params("all"))
    .json();

    let c = calls.clone();
    let fail = HandlerDescriptor::new("fail", move |_| {
        c.hit();
        Err(anyhow::anyhow!("database unavailable"))
    });

    let c = calls.clone();
    let boom = HandlerDescriptor::new("boom", move |_| -> anyhow::Result<Renderable> {
        c.hit();
        panic!("handler exploded")
    })
    .json();

    let c = calls.clone();
    let raw = HandlerDescriptor::new("raw", move |_| {
        c.hit();
        Ok(Renderable::Data(json!({"a": 1})))
    });

    RouteTable::builder()
        .register(Route::get("/emp"), list)
        .and_then(|b| b.register(Route::get("/emp/{id}"), show))
        .and_then(|b| b.register(Route::get("/emp/{id}/json"), show_json))
        .and_then(|b| b.register(Route::post("/emp"), save))
        .and_then(|b| b.register(Route::get("/items/{id}"), item))
        .and_then(|b| b.register(Route::get("/items/new"), new_item))
        .and_then(|b| b.register(Route::get("/admin").roles(["admin", "manager"]), admin))
        .and_then(|b| b.register(Route::get("/admin/report").roles(["admin"]), admin_json))
        .and_then(|b| b.register(Route::any("/cart/add"), cart_add))
        .and_then(|b| b.register(Route::post("/login"), login))
        .and_then(|b| b.register(Route::post("/upload"), upload))
        .and_then(|b| b.register(Route::get("/search/{scope}"), search))
        .and_then(|b| b.register(Route::get("/fail"), fail))
        .and_then(|b| b.register(Route::get("/boom"), boom))
        .and_then(|b| b.register(Route::get("/raw"), raw))
        .map(|b| b.build())
        .expect("sample routes compile")
}

/// In-memory writer for capturing formatted log output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
