//! End-to-end routing behavior through the public builder and dispatch
//! surface.

use arbor_core::{Arbor, BoxedHandler, Handler, HandlerStatus, HttpResponse, Method, Request, Response};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::BodyExt;

fn respond(text: &'static str) -> impl Handler {
    move |_req: Request, res: Response| async move {
        res.send_text(text);
        HandlerStatus::Final
    }
}

fn respond_kind(suffix: &'static str) -> impl Handler {
    move |req: Request, res: Response| async move {
        let kind = req.param("kind").unwrap_or("").to_string();
        res.send_text(format!("{}{}", kind, suffix));
        HandlerStatus::Final
    }
}

fn get(path: &str) -> http::Request<Bytes> {
    http::Request::builder()
        .method("GET")
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

async fn body_text(response: HttpResponse) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn root_and_literal_routes() {
    let app = Arbor::new()
        .get("/", respond("1"))
        .get("/hello", respond("2"))
        .build();

    for (path, expected) in [("/", "1"), ("http://localhost//", "1"), ("/hello", "2")] {
        let response = app.handle(get(path)).await;
        assert_eq!(response.status(), StatusCode::OK, "path {}", path);
        assert_eq!(body_text(response).await, expected, "path {}", path);
    }
}

#[tokio::test]
async fn literal_parameter_mix() {
    let app = Arbor::new()
        .get("/test", respond("test1"))
        .get("/:kind/test", respond_kind("2"))
        .get("/:kind", respond_kind("3"))
        .build();

    for (path, expected) in [
        ("/test", "test1"),
        ("/banana/test", "banana2"),
        ("/apple", "apple3"),
        ("/peach/test", "peach2"),
    ] {
        let response = app.handle(get(path)).await;
        assert_eq!(response.status(), StatusCode::OK, "path {}", path);
        assert_eq!(body_text(response).await, expected, "path {}", path);
    }
}

#[tokio::test]
async fn uncovered_paths_return_not_found() {
    let app = Arbor::new()
        .get("/test", respond("test1"))
        .get("/:kind/test", respond_kind("2"))
        .build();

    for path in ["/test/blah", "/blah/blah", "/", "http://localhost"] {
        let response = app.handle(get(path)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {}", path);
    }

    let response = app.handle(get("/test")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "test1");
}

#[tokio::test]
async fn wildcard_precedence_follows_registration_order() {
    // Specific-first registration: /hello resolves to the deeper catch-all.
    let app = Arbor::new()
        .get("/hello/world", respond("world"))
        .get("/hello/*", respond("hello-star"))
        .get("/*", respond("root-star"))
        .build();
    assert_eq!(body_text(app.handle(get("/hello")).await).await, "hello-star");
    assert_eq!(body_text(app.handle(get("/hello/world")).await).await, "world");

    // Reversed registration: the root catch-all wins for the same path.
    let app = Arbor::new()
        .get("/*", respond("root-star"))
        .get("/hello/*", respond("hello-star"))
        .get("/hello/world", respond("world"))
        .build();
    assert_eq!(body_text(app.handle(get("/hello")).await).await, "root-star");
    assert_eq!(body_text(app.handle(get("/hello/world")).await).await, "world");
}

#[tokio::test]
async fn trees_are_independent_per_method() {
    let app = Arbor::new()
        .get("/hello", respond("get"))
        .post("/hello", respond("post"))
        .build();

    let response = app.handle(get("/hello")).await;
    assert_eq!(body_text(response).await, "get");

    let post = http::Request::builder()
        .method("POST")
        .uri("/hello")
        .body(Bytes::new())
        .unwrap();
    assert_eq!(body_text(app.handle(post).await).await, "post");

    // DELETE has no tree at all; that is a plain miss.
    let delete = http::Request::builder()
        .method("DELETE")
        .uri("/hello")
        .body(Bytes::new())
        .unwrap();
    assert_eq!(app.handle(delete).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn parameters_bind_across_depths() {
    let app = Arbor::new()
        .get(
            "/users/:id/posts/:post",
            |req: Request, res: Response| async move {
                res.send_text(format!(
                    "{}:{}",
                    req.param("id").unwrap_or("?"),
                    req.param("post").unwrap_or("?")
                ));
                HandlerStatus::Final
            },
        )
        .build();

    let response = app.handle(get("/users/42/posts/7")).await;
    assert_eq!(body_text(response).await, "42:7");
}

#[tokio::test]
async fn repeated_resolution_is_stable() {
    let app = Arbor::new()
        .get("/a/:b", respond_kind("x"))
        .get("/a/*", respond("star"))
        .build();

    let first = body_text(app.handle(get("/a/1/2")).await).await;
    for _ in 0..5 {
        assert_eq!(body_text(app.handle(get("/a/1/2")).await).await, first);
    }
}

#[test]
#[should_panic(expected = "duplicate route")]
fn duplicate_registration_panics() {
    let _ = Arbor::new()
        .get("/users/:id", respond("a"))
        .get("/users/:name", respond("b"));
}

#[test]
#[should_panic(expected = "wildcard must be the final segment")]
fn misplaced_wildcard_panics() {
    let _ = Arbor::new().get("/a/*/b", respond("a"));
}

#[test]
fn empty_handler_chain_is_a_registration_error() {
    let err = Arbor::new()
        .try_route(Method::Get, "/x", Vec::<BoxedHandler>::new())
        .err()
        .expect("empty chain must be rejected");
    assert!(err.to_string().contains("no handlers"));
}
