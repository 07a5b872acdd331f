//! Tower layer that puts a resource's routes behind the cache gate.
//!
//! The layer describes each request to [`ConditionalCacheGate`] (method,
//! resource, path, decoded query and the authenticated [`Caller`]), lets
//! the gate decide, and writes the cache annotations back as headers. It
//! must run inside the auth middleware so the caller is already known.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Request, Response, StatusCode, header},
};
use flora_cache::{CacheAnnotations, CachePayload, ConditionalCacheGate, RequestDescriptor};
use tower::{Layer, Service};
use tracing::warn;

use crate::auth::Caller;

/// Layer que cachea las respuestas GET de un recurso.
#[derive(Clone)]
pub struct ResponseCacheLayer {
    gate: Arc<ConditionalCacheGate>,
    resource: &'static str,
}

impl ResponseCacheLayer {
    /// `resource` is the name the routes were registered under.
    pub fn new(gate: Arc<ConditionalCacheGate>, resource: &'static str) -> Self {
        Self { gate, resource }
    }
}

impl<S> Layer<S> for ResponseCacheLayer {
    type Service = ResponseCacheMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseCacheMiddleware {
            inner,
            gate: Arc::clone(&self.gate),
            resource: self.resource,
        }
    }
}

#[derive(Clone)]
pub struct ResponseCacheMiddleware<S> {
    inner: S,
    gate: Arc<ConditionalCacheGate>,
    resource: &'static str,
}

impl<S> Service<Request<Body>> for ResponseCacheMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let descriptor = describe(&request, self.resource);
        let gate = Arc::clone(&self.gate);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = gate
                .handle(&descriptor, || async move {
                    let response = inner.call(request).await?;
                    Ok::<_, S::Error>(BufferedResponse::from_response(response).await)
                })
                .await?;

            Ok(response.value.into_response(response.annotations.as_ref()))
        })
    }
}

fn describe(request: &Request<Body>, resource: &str) -> RequestDescriptor {
    let query = request
        .uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect::<Vec<_>>())
        .unwrap_or_default();

    let descriptor = RequestDescriptor::new(
        request.method().as_str(),
        resource,
        request.uri().path(),
    )
    .with_query(query);

    match request.extensions().get::<Caller>() {
        Some(caller) => descriptor.with_caller(caller.id.as_str()),
        None => descriptor,
    }
}

/// Respuesta con el body ya leido, para poder guardarla en el store.
#[derive(Debug)]
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl BufferedResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();

        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(body) => Self {
                status: parts.status,
                headers: parts.headers,
                body,
            },
            Err(error) => {
                warn!(error = %error, "Failed to read handler response body");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    headers: HeaderMap::new(),
                    body: Bytes::new(),
                }
            },
        }
    }

    fn json(body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    /// Solo se guardan respuestas 200 con body JSON.
    fn is_storable(&self) -> bool {
        self.status == StatusCode::OK
            && self
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.starts_with("application/json"))
    }

    fn into_response(self, annotations: Option<&CacheAnnotations>) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;

        if let Some(annotations) = annotations {
            for (name, value) in annotations.headers() {
                match HeaderValue::from_str(&value) {
                    Ok(value) => {
                        response.headers_mut().insert(name, value);
                    },
                    Err(_) => warn!(header = name, "Cache annotation is not a valid header value"),
                }
            }
        }

        response
    }
}

impl CachePayload for BufferedResponse {
    fn to_cache_bytes(&self) -> Option<Vec<u8>> {
        self.is_storable().then(|| self.body.to_vec())
    }

    fn from_cache_bytes(bytes: Vec<u8>) -> Option<Self> {
        // Un payload corrupto se trata como miss
        serde_json::from_slice::<serde::de::IgnoredAny>(&bytes).ok()?;
        Some(Self::json(Bytes::from(bytes)))
    }
}
