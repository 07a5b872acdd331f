//! Middleware stack para el servidor HTTP.
//!
//! Este modulo contiene los middleware de Tower del servidor:
//! - `RequestIdLayer`: Genera/propaga X-Request-Id (todas las requests)
//! - `LoggingLayer`: Logging estructurado de requests (todas las requests)
//! - `ResponseCacheLayer`: Cache de respuestas GET por recurso

mod logging;
mod request_id;
mod response_cache;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdMiddleware};
pub use response_cache::{BufferedResponse, ResponseCacheLayer, ResponseCacheMiddleware};
