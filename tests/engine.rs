//! Request handling through the fully layered router.

use axum::http::{header, StatusCode};
use serde_json::json;

use lei::{Controller, FnModel, LeiConfig, LeiError, ResponseDescriptor, Route, Engine};

mod common;

#[tokio::test]
async fn test_renders_model_data() {
    let dir = common::template_dir();
    let mut engine = common::engine();
    engine
        .add_route(Route::get(
            "index",
            "/",
            Controller::new(
                common::view(&dir, "index.html", "Hello {{ name }}!"),
                FnModel::new(|_| Ok(ResponseDescriptor::new().data("name", "Ada"))),
            ),
        ))
        .unwrap();

    let response = common::send(&engine.router(), common::get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html")));
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(common::body_text(response).await, "Hello Ada!");
}

#[tokio::test]
async fn test_route_without_method_is_get() {
    let dir = common::template_dir();
    let mut engine = common::engine();
    engine
        .add_route(Route::new(
            "index",
            "/",
            Controller::new(common::view(&dir, "index.html", "ok"), lei::mvc::EmptyModel),
        ))
        .unwrap();
    let router = engine.router();

    let response = common::send(&router, common::get("/")).await;
    assert_eq!(common::body_text(response).await, "ok");

    let response = common::send(&router, common::post("/", "text/plain", "")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unsupported_method_is_not_registered() {
    let mut engine = common::engine();
    let err = engine
        .add_route(Route::new("put", "/items", Controller::default()).with_method("PUT"))
        .unwrap_err();
    assert_eq!(err.to_string(), "The method 'PUT' is not supported yet");

    let response = common::send(&engine.router(), common::get("/items")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_text(response).await, "Cannot GET /items");
}

#[tokio::test]
async fn test_path_params() {
    let dir = common::template_dir();
    let mut engine = common::engine();
    engine
        .add_route(Route::get(
            "user",
            "/users/:id",
            Controller::new(
                common::view(&dir, "user.html", "user {{ id }}"),
                FnModel::new(|ctx| Ok(ResponseDescriptor::new().data("id", ctx.param("id").cloned()))),
            ),
        ))
        .unwrap();

    let response = common::send(&engine.router(), common::get("/users/42")).await;
    assert_eq!(common::body_text(response).await, "user 42");
}

#[tokio::test]
async fn test_json_and_form_bodies() {
    let dir = common::template_dir();
    let mut engine = common::engine();
    engine
        .add_route(Route::post(
            "echo",
            "/echo",
            Controller::new(
                common::view(&dir, "echo.html", "{{ name }} {{ tags|join(',') }}"),
                FnModel::new(|ctx| Ok(ResponseDescriptor::with_data(ctx.body().clone()))),
            ),
        ))
        .unwrap();
    let router = engine.router();

    let body = json!({ "name": "Ada", "tags": ["a", "b"] }).to_string();
    let response = common::send(&router, common::post("/echo", "application/json", body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_text(response).await, "Ada a,b");

    let response = common::send(
        &router,
        common::post("/echo", "application/x-www-form-urlencoded", "name=Ada&tags=a&tags=b"),
    )
    .await;
    assert_eq!(common::body_text(response).await, "Ada a,b");

    let response = common::send(&router, common::post("/echo", "application/json", "{oops")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_multipart_upload() {
    let dir = common::template_dir();
    let mut engine = common::engine();
    engine
        .add_route(Route::post(
            "upload",
            "/upload",
            Controller::new(
                common::view(&dir, "upload.html", "{{ title }}:{{ file }}:{{ size }}"),
                FnModel::new(|ctx| {
                    let file = ctx.file("doc").ok_or("no file")?;
                    Ok(ResponseDescriptor::new()
                        .data("title", ctx.param("title").cloned())
                        .data("file", file.file_name.clone())
                        .data("size", file.len()))
                }),
            ),
        ))
        .unwrap();

    let body = concat!(
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"title\"\r\n\r\n",
        "hello\r\n",
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n",
        "Content-Type: text/plain\r\n\r\n",
        "file contents\r\n",
        "--XBOUNDARY--\r\n",
    );
    let response = common::send(
        &engine.router(),
        common::post("/upload", "multipart/form-data; boundary=XBOUNDARY", body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_text(response).await, "hello:a.txt:13");
}

#[tokio::test]
async fn test_redirect_sets_session_cookie() {
    let dir = common::template_dir();
    let mut engine = common::engine();
    engine
        .add_route(Route::post(
            "login",
            "/login",
            Controller::new(
                lei::View::empty(),
                FnModel::new(|ctx| {
                    Ok(ResponseDescriptor::new()
                        .redirect("/me")
                        .session("user", ctx.param("user").cloned()))
                }),
            ),
        ))
        .unwrap();
    engine
        .add_route(Route::get(
            "me",
            "/me",
            Controller::new(
                common::view(&dir, "me.html", "user={{ user }} init={{ initialised }}"),
                FnModel::new(|ctx| {
                    let session = ctx.session().snapshot();
                    Ok(ResponseDescriptor::with_data(session))
                }),
            ),
        ))
        .unwrap();
    let router = engine.router();

    let response = common::send(
        &router,
        common::post("/login", "application/json", json!({ "user": "ada" }).to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.test/me"
    );
    let cookie = common::cookie_pair(&response).expect("session cookie");
    assert!(cookie.starts_with("lei.sid=s:"));
    assert_eq!(
        common::body_text(response).await,
        "Redirecting to http://example.test/me"
    );

    let mut request = common::get("/me");
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = common::send(&router, request).await;
    assert_eq!(common::body_text(response).await, "user=ada init=true");

    // A tampered signature falls back to a fresh, empty session.
    let mut request = common::get("/me");
    let tampered = format!("{}x", cookie);
    request
        .headers_mut()
        .insert(header::COOKIE, tampered.parse().unwrap());
    let response = common::send(&router, request).await;
    assert_eq!(common::body_text(response).await, "user= init=");
}

#[tokio::test]
async fn test_redirect_carries_data_as_query() {
    let mut config = LeiConfig::default();
    config.redirect.default_status = 302;
    let mut engine = Engine::new(config).unwrap();
    engine
        .add_route(Route::get(
            "search",
            "/go",
            Controller::new(
                lei::View::empty(),
                FnModel::new(|_| {
                    Ok(ResponseDescriptor::new()
                        .redirect("/search")
                        .data("q", "rust lang")
                        .data("page", 2))
                }),
            ),
        ))
        .unwrap();

    let response = common::send(&engine.router(), common::get("/go")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.test/search?page=2&q=rust+lang"
    );
}

#[tokio::test]
async fn test_model_status_and_errors() {
    let dir = common::template_dir();
    let mut engine = common::engine();
    engine
        .add_route(Route::post(
            "create",
            "/items",
            Controller::new(
                common::view(&dir, "created.html", "created"),
                FnModel::new(|_| Ok(ResponseDescriptor::new().status(201))),
            ),
        ))
        .unwrap();
    engine
        .add_route(Route::get(
            "broken",
            "/broken",
            Controller::new(
                common::view(&dir, "broken.html", "never"),
                FnModel::new(|_| Err("database unavailable".into())),
            ),
        ))
        .unwrap();
    let router = engine.router();

    let response = common::send(&router, common::post("/items", "text/plain", "")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(common::body_text(response).await, "created");

    let response = common::send(&router, common::get("/broken")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(common::body_text(response).await, "Internal Server Error");
}

#[tokio::test]
async fn test_invalid_route_path() {
    let mut engine = common::engine();
    let err = engine
        .add_route(Route::get("bad", "no-slash", Controller::default()))
        .unwrap_err();
    assert!(matches!(err, LeiError::InvalidRoutePath(_)));
    assert!(engine.routes().is_empty());
}

#[tokio::test]
async fn test_wildcard_route_and_escaped_handlebars_view() {
    let dir = common::template_dir();
    let mut engine = common::engine();
    engine
        .add_route(Route::get(
            "files",
            "/files/*rest",
            Controller::new(
                common::view(&dir, "file.hbs", "file={{rest}} q={{q}}"),
                FnModel::new(|ctx| {
                    Ok(ResponseDescriptor::new()
                        .data("rest", ctx.param("rest").cloned())
                        .data("q", ctx.param("q").cloned()))
                }),
            ),
        ))
        .unwrap();
    let err = engine
        .add_route(Route::post("upload", "/files/*path", Controller::default()))
        .unwrap_err();
    assert!(matches!(err, LeiError::ConflictingRoute { .. }));

    let response = common::send(&engine.router(), common::get("/files/docs?q=%3Cb%3E")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_text(response).await, "file=docs q=&lt;b&gt;");
}
