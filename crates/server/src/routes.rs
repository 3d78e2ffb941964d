//! Product resource routes.
//!
//! - `POST   /products`       create a product from a JSON record
//! - `GET    /products`       list, optionally filtered by `available`, `name` or `category`
//! - `GET    /products/{id}`  read one product
//! - `PUT    /products/{id}`  replace a product's fields
//! - `DELETE /products/{id}`  delete; succeeds whether or not the product exists

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_core::domain::product::{Product, ProductId};
use catalog_core::errors::{ApplicationError, InterfaceError, ValidationError};
use catalog_db::ProductFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;

pub const CORRELATION_HEADER: &str = "x-correlation-id";
const JSON_MEDIA_TYPE: &str = "application/json";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(read_product).put(update_product).delete(delete_product))
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub available: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
}

impl ListParams {
    /// At most one filter applies: `available`, then `name`, then `category`.
    /// Empty values count as absent.
    pub fn filter(&self) -> Result<ProductFilter, ValidationError> {
        if let Some(available) = present(&self.available) {
            return Ok(ProductFilter::Availability(is_truthy(available)));
        }
        if let Some(name) = present(&self.name) {
            return Ok(ProductFilter::Name(name.to_string()));
        }
        if let Some(category) = present(&self.category) {
            return Ok(ProductFilter::Category(category.parse()?));
        }
        Ok(ProductFilter::All)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error"),
            message: self.0.message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

struct RequestContext {
    correlation_id: String,
}

impl RequestContext {
    fn from_headers(headers: &HeaderMap) -> Self {
        let correlation_id = headers
            .get(CORRELATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self { correlation_id }
    }

    fn fail(&self, error: impl Into<ApplicationError>) -> ApiError {
        let error = error.into();
        match &error {
            ApplicationError::Persistence(detail) => error!(
                event_name = "http.products.failed",
                correlation_id = %self.correlation_id,
                error = %detail,
                "product request failed in the store"
            ),
            other => warn!(
                event_name = "http.products.rejected",
                correlation_id = %self.correlation_id,
                error = %other,
                "product request rejected"
            ),
        }
        ApiError(error.into_interface(self.correlation_id.clone()))
    }
}

fn require_json(headers: &HeaderMap) -> Result<(), ApplicationError> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim);

    match media_type {
        Some(media_type) if media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE) => Ok(()),
        _ => Err(ApplicationError::UnsupportedMediaType { expected: JSON_MEDIA_TYPE }),
    }
}

fn parse_record(body: &Bytes) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|_| ValidationError::NotAnObject)
}

fn parse_id(raw_id: &str) -> Result<ProductId, ApplicationError> {
    raw_id.parse().map_err(|_| ApplicationError::NotFound(raw_id.to_string()))
}

fn location(headers: &HeaderMap, id: ProductId) -> String {
    match headers.get(header::HOST).and_then(|value| value.to_str().ok()) {
        Some(host) => format!("http://{host}/products/{id}"),
        None => format!("/products/{id}"),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::from_headers(&headers);
    info!(
        event_name = "http.products.create",
        correlation_id = %ctx.correlation_id,
        "request to create a product"
    );

    require_json(&headers).map_err(|e| ctx.fail(e))?;
    let record = parse_record(&body).map_err(|e| ctx.fail(e))?;
    let mut product = Product::from_record(&record).map_err(|e| ctx.fail(e))?;
    let id = state.repository.create(&mut product).await.map_err(|e| ctx.fail(e))?;

    info!(
        event_name = "http.products.created",
        correlation_id = %ctx.correlation_id,
        product_id = %id,
        "product saved"
    );
    let location_url = location(&headers, id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location_url)], Json(product.to_record()))
        .into_response())
}

async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::from_headers(&headers);
    let filter = params.filter().map_err(|e| ctx.fail(e))?;
    info!(
        event_name = "http.products.list",
        correlation_id = %ctx.correlation_id,
        filter = ?filter,
        "request to list products"
    );

    let products = state.repository.list(&filter).await.map_err(|e| ctx.fail(e))?;
    if products.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    info!(
        event_name = "http.products.listed",
        correlation_id = %ctx.correlation_id,
        count = products.len(),
        "products returned"
    );
    let records: Vec<Value> = products.iter().map(Product::to_record).collect();
    Ok((StatusCode::OK, Json(records)).into_response())
}

async fn read_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::from_headers(&headers);
    info!(
        event_name = "http.products.read",
        correlation_id = %ctx.correlation_id,
        product_id = %raw_id,
        "request to read a product"
    );

    let id = parse_id(&raw_id).map_err(|e| ctx.fail(e))?;
    let product = state
        .repository
        .find(id)
        .await
        .map_err(|e| ctx.fail(e))?
        .ok_or_else(|| ctx.fail(ApplicationError::NotFound(raw_id.clone())))?;

    Ok((StatusCode::OK, Json(product.to_record())).into_response())
}

async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::from_headers(&headers);
    info!(
        event_name = "http.products.update",
        correlation_id = %ctx.correlation_id,
        product_id = %raw_id,
        "request to update a product"
    );

    require_json(&headers).map_err(|e| ctx.fail(e))?;
    let id = parse_id(&raw_id).map_err(|e| ctx.fail(e))?;
    let mut product = state
        .repository
        .find(id)
        .await
        .map_err(|e| ctx.fail(e))?
        .ok_or_else(|| ctx.fail(ApplicationError::NotFound(raw_id.clone())))?;

    let record = parse_record(&body).map_err(|e| ctx.fail(e))?;
    product.apply_record(&record).map_err(|e| ctx.fail(e))?;

    // The row may have been deleted between the lookup and the write.
    if !state.repository.update(&product).await.map_err(|e| ctx.fail(e))? {
        return Err(ctx.fail(ApplicationError::NotFound(raw_id)));
    }

    Ok((StatusCode::OK, Json(product.to_record())).into_response())
}

async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::from_headers(&headers);

    if let Ok(id) = raw_id.parse::<ProductId>() {
        let deleted = state.repository.delete(id).await.map_err(|e| ctx.fail(e))?;
        info!(
            event_name = "http.products.delete",
            correlation_id = %ctx.correlation_id,
            product_id = %id,
            deleted,
            "request to delete a product"
        );
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}
