//! Turns pipeline outcomes into HTTP responses

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use hyper::header::{HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ETAG};
use hyper::{Response, StatusCode};

use plook_core::error::ResolutionError;
use plook_resolver::UpstreamResult;

/// Error type of streamed response bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body of every response the server sends
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;

/// Header naming the upstream URL a response came from
pub static X_EXPANDED_URL: HeaderName = HeaderName::from_static("x-expanded-url");

/// Options shared by every relayed response
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayOptions {
    /// Attach `Access-Control-Allow-Origin: *`
    pub cors: bool,
    /// Drop the body, the request was `HEAD`
    pub head: bool,
}

/// Content type of a relayed file.
///
/// The extension guess wins; it gets `; charset=UTF-8` only when upstream
/// declared a charset. Without a guess, upstream's type is passed through.
pub fn content_type_for(file: &str, upstream: Option<&str>) -> Option<String> {
    match mime_guess::from_path(file).first() {
        Some(guess) => {
            let mut content_type = guess.to_string();
            if upstream.is_some_and(|value| value.to_ascii_lowercase().contains("charset")) {
                content_type.push_str("; charset=UTF-8");
            }
            Some(content_type)
        }
        None => upstream.map(str::to_string),
    }
}

/// Relay the winning upstream response, streaming its body
pub fn success(result: UpstreamResult, file: &str, options: RelayOptions) -> Response<ResponseBody> {
    let status = StatusCode::from_u16(result.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = content_type_for(file, result.content_type());
    let etag = result.etag().map(str::to_string);
    let url = result.url().to_string();

    let body = if options.head {
        empty()
    } else {
        let stream = result.response
            .bytes_stream()
            .map_ok(Frame::data)
            .map_err(|e| Box::new(e) as BoxError);
        StreamBody::new(stream).boxed_unsync()
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Some(value) = content_type.and_then(|value| HeaderValue::from_str(&value).ok()) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Some(value) = etag.and_then(|value| HeaderValue::from_str(&value).ok()) {
        headers.insert(ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&url) {
        headers.insert(X_EXPANDED_URL.clone(), value);
    }

    with_cors(response, options)
}

/// Answer with a failure: its status, its message as plain text, and the upstream URL if it has one
pub fn failure(error: &ResolutionError, options: RelayOptions) -> Response<ResponseBody> {
    let status = StatusCode::from_u16(error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = if options.head {
        empty()
    } else {
        Full::new(Bytes::from(error.message.clone()))
            .map_err(|never| match never {})
            .boxed_unsync()
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    if let Some(value) = error.url.as_deref().and_then(|url| HeaderValue::from_str(url).ok()) {
        headers.insert(X_EXPANDED_URL.clone(), value);
    }

    with_cors(response, options)
}

fn with_cors(mut response: Response<ResponseBody>, options: RelayOptions) -> Response<ResponseBody> {
    if options.cors {
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
    response
}

fn empty() -> ResponseBody {
    Empty::new().map_err(|never| match never {}).boxed_unsync()
}
