//! Maps inbound requests onto file routes.
//!
//! There is exactly one route, `/{package}/{version}/{file...}`, answered for
//! `GET` and `HEAD`. Everything else is reported as `RouteNotFound`.

use std::borrow::Cow;
use hyper::Method;
use percent_encoding::percent_decode_str;

use plook_core::error::{PlookError, PlookResult};
use plook_core::utils::path::{is_safe_file_path, split_request_path};

/// A matched file route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRoute {
    /// Package name, percent-decoded
    pub package: String,
    /// Version segment, percent-decoded
    pub version: String,
    /// File path within the repository, as received
    pub file: String,
}

/// Match a request method and path against the file route
pub fn route(method: &Method, path: &str) -> PlookResult<FileRoute> {
    if method != Method::GET && method != Method::HEAD {
        return Err(PlookError::RouteNotFound);
    }

    let (package, version, file) = split_request_path(path).ok_or(PlookError::RouteNotFound)?;

    // Encoded dot segments are normalized by URL parsers, so check the decoded form
    if !is_safe_file_path(&decode(file)?) {
        return Err(PlookError::RouteNotFound);
    }

    Ok(FileRoute {
        package: decode(package)?.into_owned(),
        version: decode(version)?.into_owned(),
        file: file.to_string(),
    })
}

fn decode(segment: &str) -> PlookResult<Cow<'_, str>> {
    percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| PlookError::RouteNotFound)
}
