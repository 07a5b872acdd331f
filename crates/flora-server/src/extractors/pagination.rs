use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::dictionary::PageRequest;
use crate::error::AppError;

/// Raw query as sent; parsed by hand so bad values become JSON 400s.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawListQuery {
    search: Option<String>,
    limit: Option<String>,
    page: Option<String>,
}

impl RawListQuery {
    fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        Query::<RawListQuery>::try_from_uri(&parts.uri)
            .map(|Query(raw)| raw)
            .map_err(|e| AppError::BadRequest(e.body_text()))
    }

    fn page_request(&self) -> Result<PageRequest, AppError> {
        let limit = parse_bounded(
            "limit",
            self.limit.as_deref(),
            PageRequest::DEFAULT_LIMIT,
            PageRequest::MAX_LIMIT,
        )?;
        let page = parse_bounded("page", self.page.as_deref(), 1, u32::MAX)?;
        Ok(PageRequest { page, limit })
    }
}

fn parse_bounded(name: &str, raw: Option<&str>, default: u32, max: u32) -> Result<u32, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{name} must be a positive integer")))?;

    if value == 0 || value > max {
        return Err(AppError::BadRequest(if max == u32::MAX {
            format!("{name} must be at least 1")
        } else {
            format!("{name} must be between 1 and {max}")
        }));
    }
    Ok(value)
}

/// `limit` (1..=100, default 10) y `page` (>= 1, default 1).
#[derive(Debug, Clone, Copy)]
pub struct Pagination(pub PageRequest);

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        RawListQuery::from_parts(parts)?
            .page_request()
            .map(Pagination)
    }
}

/// Search term (default empty) plus pagination.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub search: String,
    pub page: PageRequest,
}

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawListQuery::from_parts(parts)?;
        let page = raw.page_request()?;

        Ok(SearchQuery {
            search: raw.search.unwrap_or_default(),
            page,
        })
    }
}
