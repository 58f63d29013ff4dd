//! Unit tests for the candidate racer

use super::*;

use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{header, method, path};

fn racer_for(server: &MockServer) -> CandidateRacer {
    CandidateRacer::with_config(RacerConfig {
        raw_host: server.uri(),
        ..RacerConfig::default()
    })
    .unwrap()
}

fn foo_bar() -> RepositorySlug {
    RepositorySlug::new("foo", "bar")
}

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

#[test]
fn test_candidates_against_default_host() {
    let racer = CandidateRacer::new().unwrap();
    let [prefixed, bare] = racer.candidates(&foo_bar(), "1.0.0", "bar.js");

    assert_eq!(prefixed.as_str(), "https://raw.githubusercontent.com/foo/bar/v1.0.0/bar.js");
    assert_eq!(bare.as_str(), "https://raw.githubusercontent.com/foo/bar/1.0.0/bar.js");
}

#[tokio::test]
async fn test_single_success_wins() {
    let server = MockServer::start().await;
    mount(&server, "/foo/bar/v1.0.0/bar.js", ResponseTemplate::new(404)).await;
    mount(&server, "/foo/bar/1.0.0/bar.js", ResponseTemplate::new(200).set_body_string("ok")).await;

    let racer = racer_for(&server);
    let candidates = racer.candidates(&foo_bar(), "1.0.0", "bar.js");
    let result = racer.race(candidates, &ConditionalHeaders::default()).await.unwrap();

    assert_eq!(result.status(), StatusCode::OK);
    assert!(result.url().ends_with("/foo/bar/1.0.0/bar.js"));
}

#[tokio::test]
async fn test_first_completed_success_wins() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/foo/bar/v1.0.0/bar.js",
        ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
    )
    .await;
    mount(&server, "/foo/bar/1.0.0/bar.js", ResponseTemplate::new(200)).await;

    let racer = racer_for(&server);
    let candidates = racer.candidates(&foo_bar(), "1.0.0", "bar.js");
    let result = racer.race(candidates, &ConditionalHeaders::default()).await.unwrap();

    assert!(result.url().ends_with("/foo/bar/1.0.0/bar.js"));
}

#[tokio::test]
async fn test_all_candidates_fail() {
    let server = MockServer::start().await;
    mount(&server, "/foo/bar/v1.0.0/bar.js", ResponseTemplate::new(404)).await;
    mount(&server, "/foo/bar/1.0.0/bar.js", ResponseTemplate::new(400)).await;

    let racer = racer_for(&server);
    let candidates = racer.candidates(&foo_bar(), "1.0.0", "bar.js");
    let error = racer.race(candidates, &ConditionalHeaders::default()).await.unwrap_err();

    assert_eq!(error.status_code(), 404);
    assert_eq!(error.to_string(), "File not found");
    let url = error.expanded_url().unwrap();
    assert!(url.ends_with("/foo/bar/v1.0.0/bar.js") || url.ends_with("/foo/bar/1.0.0/bar.js"));

    // Both candidates were attempted before giving up
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_conditional_header_forwarded_to_every_candidate() {
    let server = MockServer::start().await;

    for route in ["/foo/bar/v1.0.0/bar.js", "/foo/bar/1.0.0/bar.js"] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("If-None-Match", "\"abc123\""))
            .respond_with(ResponseTemplate::new(304).insert_header("ETag", "\"abc123\""))
            .mount(&server)
            .await;
    }

    let racer = racer_for(&server);
    let candidates = racer.candidates(&foo_bar(), "1.0.0", "bar.js");
    let conditional = ConditionalHeaders {
        if_none_match: Some("\"abc123\"".to_string()),
    };
    let result = racer.race(candidates, &conditional).await.unwrap();

    assert_eq!(result.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(result.etag(), Some("\"abc123\""));
}

#[tokio::test]
async fn test_race_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let racer = CandidateRacer::with_config(RacerConfig {
        raw_host: server.uri(),
        race_timeout: Duration::from_millis(100),
        ..RacerConfig::default()
    })
    .unwrap();

    let candidates = racer.candidates(&foo_bar(), "1.0.0", "bar.js");
    let error = racer.race(candidates, &ConditionalHeaders::default()).await.unwrap_err();
    assert!(matches!(error, PlookError::UpstreamTimeout));
}

#[tokio::test]
async fn test_transport_failure_is_file_not_found() {
    let racer = CandidateRacer::with_config(RacerConfig {
        raw_host: "http://127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(2),
        ..RacerConfig::default()
    })
    .unwrap();

    let candidates = racer.candidates(&foo_bar(), "1.0.0", "bar.js");
    let error = racer.race(candidates, &ConditionalHeaders::default()).await.unwrap_err();

    match error {
        PlookError::FileNotFound { url, upstream_status } => {
            assert_eq!(url, "http://127.0.0.1:1/foo/bar/v1.0.0/bar.js");
            assert_eq!(upstream_status, None);
        }
        other => panic!("Expected FileNotFound error, got {:?}", other),
    }
}

/// Serve a 200 whose body arrives in small pieces spread over `pieces * gap`
async fn trickle_server(pieces: usize, gap: Duration) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    pieces * 2
                );
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                for _ in 0..pieces {
                    tokio::time::sleep(gap).await;
                    if socket.write_all(b"ab").await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    format!("http://{}", address)
}

#[tokio::test]
async fn test_slow_body_outlives_fetch_timeout() {
    let raw_host = trickle_server(5, Duration::from_millis(300)).await;
    let racer = CandidateRacer::with_config(RacerConfig {
        raw_host,
        timeout: Duration::from_secs(1),
        race_timeout: Duration::from_secs(1),
        ..RacerConfig::default()
    })
    .unwrap();

    let candidates = racer.candidates(&foo_bar(), "1.0.0", "bar.js");
    let result = racer.race(candidates, &ConditionalHeaders::default()).await.unwrap();
    assert_eq!(result.status(), StatusCode::OK);

    // The body takes longer than the timeout but never stalls for that long
    let body = result.response.bytes().await.unwrap();
    assert_eq!(&body[..], b"ababababab");
}
