//! End-to-end tests for the HTTP front end

use super::*;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ETAG};
use hyper::StatusCode;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plook_registry::{AuthConfig, ClientConfig, NpmRegistry};
use plook_resolver::{CandidateRacer, PackageResolver, RacerConfig};
use relay::X_EXPANDED_URL;

struct Upstreams {
    registry: MockServer,
    raw: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        let registry = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/foo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "foo",
                "dist-tags": { "latest": "1.0.0" },
                "versions": {
                    "0.9.0": { "version": "0.9.0" },
                    "1.0.0": {
                        "version": "1.0.0",
                        "repository": { "type": "git", "url": "git://github.com/foo/bar.git" }
                    }
                }
            })))
            .mount(&registry)
            .await;

        Self {
            registry,
            raw: MockServer::start().await,
        }
    }

    fn app(&self, cors: bool) -> App {
        let registry = NpmRegistry::with_config(
            &self.registry.uri(),
            &ClientConfig::default(),
            &AuthConfig::default(),
        )
        .unwrap();
        let racer = CandidateRacer::with_config(RacerConfig {
            raw_host: self.raw.uri(),
            ..RacerConfig::default()
        })
        .unwrap();

        App::new(Plook::new(PackageResolver::new(Arc::new(registry)), racer), cors)
    }

    async fn serve_file(&self, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(&self.raw)
            .await;
    }
}

fn get(uri: &str) -> Request<()> {
    Request::get(uri).body(()).unwrap()
}

async fn body_text(response: Response<ResponseBody>) -> String {
    let bytes: Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_file_is_relayed() {
    let upstreams = Upstreams::start().await;
    upstreams
        .serve_file(
            "/foo/bar/1.0.0/bar.js",
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/plain; charset=utf-8")
                .insert_header("ETag", "\"abc\"")
                .set_body_string("console.log('bar');"),
        )
        .await;

    let app = upstreams.app(true);
    let response = app.handle(get("/foo/1.0.0/bar.js")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers[CONTENT_TYPE].to_str().unwrap().ends_with("javascript; charset=UTF-8"));
    assert_eq!(headers[ETAG], "\"abc\"");
    assert_eq!(
        headers[&X_EXPANDED_URL].to_str().unwrap(),
        format!("{}/foo/bar/1.0.0/bar.js", upstreams.raw.uri())
    );
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body_text(response).await, "console.log('bar');");
}

#[tokio::test]
async fn test_latest_resolves_to_newest_version() {
    let upstreams = Upstreams::start().await;
    upstreams
        .serve_file("/foo/bar/v1.0.0/dist/bar.css", ResponseTemplate::new(200).set_body_string("a{}"))
        .await;

    let app = upstreams.app(false);
    let response = app.handle(get("/foo/latest/dist/bar.css")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/css");
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert_eq!(body_text(response).await, "a{}");
}

#[tokio::test]
async fn test_unknown_version() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app(true);

    let response = app.handle(get("/foo/2.0.0/bar.js")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    assert!(response.headers().get(&X_EXPANDED_URL).is_none());
    assert_eq!(body_text(response).await, "Version not found");
    assert!(upstreams.raw.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_missing_everywhere() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app(true);

    let response = app.handle(get("/foo/1.0.0/missing.js")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(&X_EXPANDED_URL).is_some());
    assert_eq!(body_text(response).await, "File not found");
}

#[tokio::test]
async fn test_unknown_package() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app(true);

    let response = app.handle(get("/nope/1.0.0/bar.js")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Package not found");
}

#[tokio::test]
async fn test_package_name_stays_one_registry_segment() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app(true);

    for uri in ["/nosuch%2F..%2Ffoo/1.0.0/bar.js", "/%2E%2E/1.0.0/bar.js"] {
        let response = app.handle(get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_text(response).await, "Package not found");
    }

    let registry_paths: Vec<String> = upstreams.registry.received_requests().await.unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(registry_paths, vec!["/nosuch%2F..%2Ffoo".to_string()]);
    assert!(upstreams.raw.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_package_name() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app(true);

    let response = app.handle(get("//1.0.0/bar.js")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Package name not provided");
    assert!(upstreams.registry.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unmatched_routes() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app(true);

    for uri in ["/", "/foo", "/foo/1.0.0", "/foo/1.0.0/../x.js"] {
        let response = app.handle(get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_text(response).await, "Not found");
    }

    let post = Request::post("/foo/1.0.0/bar.js").body(()).unwrap();
    assert_eq!(app.handle(post).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_head_request_has_headers_but_no_body() {
    let upstreams = Upstreams::start().await;
    upstreams
        .serve_file("/foo/bar/v1.0.0/bar.js", ResponseTemplate::new(200).set_body_string("body"))
        .await;

    let app = upstreams.app(true);
    let request = Request::head("/foo/1.0.0/bar.js").body(()).unwrap();
    let response = app.handle(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(&X_EXPANDED_URL).is_some());
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn test_if_none_match_is_forwarded() {
    let upstreams = Upstreams::start().await;
    Mock::given(method("GET"))
        .and(path("/foo/bar/v1.0.0/bar.js"))
        .and(header("If-None-Match", "\"abc\""))
        .respond_with(ResponseTemplate::new(304).insert_header("ETag", "\"abc\""))
        .mount(&upstreams.raw)
        .await;

    let app = upstreams.app(true);
    let request = Request::get("/foo/1.0.0/bar.js")
        .header("If-None-Match", "\"abc\"")
        .body(())
        .unwrap();
    let response = app.handle(request).await;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(response.headers()[ETAG], "\"abc\"");
}

#[tokio::test]
async fn test_serve_until_shutdown() {
    let upstreams = Upstreams::start().await;
    upstreams
        .serve_file("/foo/bar/1.0.0/bar.js", ResponseTemplate::new(200).set_body_string("served"))
        .await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, Arc::new(upstreams.app(true)), async move {
        let _ = stopped.await;
    }));

    let response = reqwest::get(format!("http://{}/foo/1.0.0/bar.js", address)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.text().await.unwrap(), "served");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
