use criterion::{criterion_group, criterion_main, Criterion};
use frontdispatch::convert::ScalarKind;
use frontdispatch::handlers::{HandlerDescriptor, ParameterDescriptor};
use frontdispatch::render::{ModelView, Renderable};
use frontdispatch::router::{Route, RouteTable};
use frontdispatch::server::InboundRequest;
use frontdispatch::FrontController;
use http::Method;
use std::hint::black_box;

fn zoo_table() -> RouteTable {
    let templates = [
        Route::get("/"),
        Route::get("/zoo/animals"),
        Route::post("/zoo/animals"),
        Route::get("/zoo/animals/{id}"),
        Route::get("/zoo/animals/{id}/toys/{toy_id}"),
        Route::get("/zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}"),
        Route::post("/inventory/{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}"),
        Route::get("/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}"),
        Route::any("/zoo/health"),
    ];
    let mut builder = RouteTable::builder();
    for (i, route) in templates.into_iter().enumerate() {
        let handler = HandlerDescriptor::new(format!("handler_{i}"), |_| Ok(Renderable::text("ok")));
        builder = builder.register(route, handler).expect("valid template");
    }
    builder.build()
}

fn bench_route_throughput(c: &mut Criterion) {
    let table = zoo_table();
    c.bench_function("route_match", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/123"),
            (Method::GET, "/zoo/animals/123/toys/456"),
            (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
            (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
        ];
        b.iter(|| {
            for (method, path) in test_paths.iter() {
                let res = table.resolve(path, method);
                black_box(&res);
            }
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let show = HandlerDescriptor::new("show", |args| {
        let id: i64 = args.scalar(0).unwrap_or_default();
        Ok(ModelView::new("animal.html").with("id", id).into())
    })
    .param(ParameterDescriptor::scalar("id", ScalarKind::Long))
    .json();
    let routes = RouteTable::builder()
        .register(Route::get("/zoo/animals/{id}"), show)
        .expect("valid template")
        .build();
    let controller = FrontController::new(routes);
    let request = InboundRequest::new(Method::GET, "/zoo/animals/123?verbose=true");

    c.bench_function("dispatch_json", |b| {
        b.iter(|| black_box(controller.handle(black_box(&request))))
    });
}

criterion_group!(benches, bench_route_throughput, bench_dispatch);
criterion_main!(benches);
