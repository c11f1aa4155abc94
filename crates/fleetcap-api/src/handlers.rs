//! Capacity request handlers.
//!
//! Both entry points authenticate, summarize the requested (or default)
//! region, and render in the format chosen from the request headers.

use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::auth::extract_token;
use crate::error::ApiError;
use crate::format::{render, Format};
use crate::ApiState;

/// JSON body returned with every non-2xx response.
#[derive(serde::Serialize)]
pub(crate) struct ErrorBody {
    success: bool,
    error: String,
}

impl ErrorBody {
    pub(crate) fn new(msg: String) -> Json<Self> {
        Json(Self {
            success: false,
            error: msg,
        })
    }
}

/// Query-string or form fields of a capacity request.
#[derive(Debug, Default, Deserialize)]
pub struct CapacityParams {
    pub token: Option<String>,
    pub region: Option<String>,
    /// Slash-command argument; used as the region when `region` is absent.
    pub text: Option<String>,
}

impl CapacityParams {
    fn region(&self) -> Option<&str> {
        self.region.as_deref().or(self.text.as_deref())
    }
}

/// GET /capacity
pub async fn capacity_query(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(params): Query<CapacityParams>,
) -> Response {
    respond(&state, &headers, params).await
}

/// POST /capacity
pub async fn capacity_command(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Form(params): Form<CapacityParams>,
) -> Response {
    respond(&state, &headers, params).await
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn respond(state: &ApiState, headers: &HeaderMap, params: CapacityParams) -> Response {
    if let Err(e) = state
        .auth
        .verify(extract_token(params.token.as_deref(), headers))
    {
        return e.into_response();
    }

    let format = Format::from_headers(headers);
    debug!(?format, region = ?params.region(), "capacity request accepted");

    match state.service.summarize(params.region()).await {
        Ok(report) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, format.content_type())],
            render(&report, format),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
