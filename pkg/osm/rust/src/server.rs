// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Read-only HTTP surface.
//!
//! - `GET /amenities/` lists amenities as a FeatureCollection.
//! - `GET /amenities/{id}/` returns one Feature, or 404.
//!
//! Both accept `name`, `amenity_type` and `in_bbox`. `HEAD` is served like
//! `GET`; every other method on these paths is a 405. The trailing slash is
//! optional.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use http::request::Parts;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::errors::Error;
use crate::feature::{Feature, FeatureCollection};
use crate::query::Filter;
use crate::store::Store;

pub type ResponseBody = BoxBody<Bytes, std::io::Error>;

const COLLECTION_PATH: &str = "/amenities";
const ALLOWED_METHODS: &str = "GET, HEAD";

static NOT_FOUND_DETAIL: &str = "Not found.";
static INTERNAL_ERROR_BODY: &[u8] = br#"{"detail":"Internal server error."}"#;

#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

#[derive(Debug, PartialEq)]
enum Route {
    List,
    /// `None` when the decoded id segment is not an integer; such ids never exist.
    Detail(Option<i64>),
    Unknown,
}

fn route(path: &str) -> Route {
    let Some(rest) = path.strip_prefix(COLLECTION_PATH) else {
        return Route::Unknown;
    };
    let rest = match rest {
        "" | "/" => return Route::List,
        _ => match rest.strip_prefix('/') {
            Some(rest) => rest,
            None => return Route::Unknown,
        },
    };
    let segment = rest.strip_suffix('/').unwrap_or(rest);
    if segment.is_empty() || segment.contains('/') {
        return Route::Unknown;
    }
    let id = urlencoding::decode(segment)
        .ok()
        .and_then(|segment| segment.parse().ok());
    Route::Detail(id)
}

fn full(bytes: impl Into<Bytes>) -> ResponseBody {
    Full::new(bytes.into()).map_err(|e| match e {}).boxed()
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<ResponseBody>> {
    let body = serde_json::to_vec(value).context("Failed to serialize response")?;
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(full(body))
        .map_err(|e| anyhow!("Failed to build response: {}", e))
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Result<Response<ResponseBody>> {
    json_response(
        status,
        &ErrorDetail {
            detail: detail.into(),
        },
    )
}

fn not_found() -> Result<Response<ResponseBody>> {
    error_response(StatusCode::NOT_FOUND, NOT_FOUND_DETAIL)
}

fn method_not_allowed(method: &Method) -> Result<Response<ResponseBody>> {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method \"{method}\" not allowed."),
    )?;
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    Ok(response)
}

fn internal_error() -> Response<ResponseBody> {
    let mut response = Response::new(full(INTERNAL_ERROR_BODY));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Run a store read on the blocking pool.
async fn read<T, F>(store: &Arc<Store>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> crate::errors::Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    let result = tokio::task::spawn_blocking(move || f(&store))
        .await
        .context("store read task failed")?;
    Ok(result?)
}

async fn handle_list(store: &Arc<Store>, filter: Filter) -> Result<Response<ResponseBody>> {
    let amenities = read(store, move |s| s.list(&filter)).await?;
    debug!("Matched {} amenities", amenities.len());
    let collection: FeatureCollection = amenities.iter().collect();
    json_response(StatusCode::OK, &collection)
}

async fn handle_detail(
    store: &Arc<Store>,
    id: Option<i64>,
    filter: Filter,
) -> Result<Response<ResponseBody>> {
    let Some(id) = id else {
        return not_found();
    };
    match read(store, move |s| s.get(id, &filter)).await? {
        Some(amenity) => json_response(StatusCode::OK, &Feature::from(&amenity)),
        None => not_found(),
    }
}

/// Route and answer one request from its head; bodies are never read.
pub async fn handle_request(store: &Arc<Store>, req: &Parts) -> Result<Response<ResponseBody>> {
    let route = route(req.uri.path());
    if route == Route::Unknown {
        return not_found();
    }
    if !matches!(req.method, Method::GET | Method::HEAD) {
        return method_not_allowed(&req.method);
    }

    let filter = match Filter::from_query(req.uri.query()) {
        Ok(filter) => filter,
        Err(e @ Error::InvalidBBox { .. }) => {
            warn!("Rejecting request for {}: {e}", req.uri);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
        Err(e) => return Err(e.into()),
    };
    if !filter.is_empty() {
        debug!("Applying {filter:?}");
    }

    match route {
        Route::List => handle_list(store, filter).await,
        Route::Detail(id) => handle_detail(store, id, filter).await,
        Route::Unknown => not_found(),
    }
}

/// Like [`handle_request`], but folds failures into a 500 and logs the outcome.
pub async fn respond<B>(store: &Arc<Store>, req: Request<B>) -> Response<ResponseBody> {
    let (parts, _body) = req.into_parts();
    let response = handle_request(store, &parts).await.unwrap_or_else(|e| {
        error!("Request handling failed for {}: {e:#}", parts.uri);
        internal_error()
    });
    info!(
        "{} {} {}",
        parts.method,
        parts.uri,
        response.status().as_u16()
    );
    response
}

/// Serve HTTP/1 connections from `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, store: Arc<Store>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                let (stream, peer) = match accept_result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        // Usually fd exhaustion; the listener itself stays usable.
                        error!("Failed to accept connection: {e}");
                        continue;
                    }
                };
                debug!("Accepted connection from {peer}");

                let io = TokioIo::new(stream);
                let store = Arc::clone(&store);

                tokio::task::spawn(async move {
                    let service = service_fn(move |req| {
                        let store = Arc::clone(&store);
                        async move { Ok::<_, Infallible>(respond(&store, req).await) }
                    });
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection: {err}");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                return Ok(());
            }
        }
    }
}
