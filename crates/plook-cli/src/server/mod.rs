//! HTTP front end: accept loop, request handling and response relay.
//!
//! Each connection is served by hyper on its own task. A request is routed,
//! resolved through the [`Plook`] pipeline and relayed; failures are answered
//! per request and never affect other connections.

pub mod relay;
pub mod router;

use std::convert::Infallible;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hyper::header::IF_NONE_MATCH;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info, warn, Instrument};

use plook_core::context::RequestContext;
use plook_core::error::ResolutionError;
use plook_resolver::{ConditionalHeaders, FileRequest, Plook};

use relay::{RelayOptions, ResponseBody};

/// Request handler shared by every connection
#[derive(Debug)]
pub struct App {
    plook: Plook,
    cors: bool,
    next_id: AtomicU64,
}

impl App {
    /// Create a handler around a resolution pipeline
    pub fn new(plook: Plook, cors: bool) -> Self {
        Self {
            plook,
            cors,
            next_id: AtomicU64::new(1),
        }
    }

    /// Answer one request
    pub async fn handle<B>(&self, request: Request<B>) -> Response<ResponseBody> {
        let ctx = RequestContext::new(self.next_id.fetch_add(1, Ordering::Relaxed), request.uri().path());
        let options = RelayOptions {
            cors: self.cors,
            head: request.method() == Method::HEAD,
        };

        let route = match router::route(request.method(), request.uri().path()) {
            Ok(route) => route,
            Err(error) => {
                debug!("{} {} unmatched", request.method(), request.uri().path());
                return relay::failure(&ResolutionError::from(error), options);
            }
        };

        let if_none_match = request.headers()
            .get(IF_NONE_MATCH)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let file_request = FileRequest {
            package: route.package,
            version: route.version,
            file: route.file,
            conditional: ConditionalHeaders { if_none_match },
        };

        match self.plook.get(&file_request, &ctx).await {
            Ok(result) => relay::success(result, &file_request.file, options),
            Err(error) => relay::failure(&error, options),
        }
    }
}

/// Serve connections from `listener` until `shutdown` resolves.
///
/// Connections still in flight when the loop stops are dropped with the runtime.
pub async fn serve<F>(listener: TcpListener, app: Arc<App>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };

                let app = app.clone();
                let span = tracing::debug_span!("connection", %peer);
                tokio::spawn(
                    async move {
                        let service = service_fn(move |request| {
                            let app = app.clone();
                            async move { Ok::<_, Infallible>(app.handle(request).await) }
                        });

                        if let Err(e) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            debug!("Connection closed with error: {}", e);
                        }
                    }
                    .instrument(span),
                );
            }
            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
