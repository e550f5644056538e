//! Request routing and the upload-and-convert handler.

use std::convert::Infallible;
use std::sync::Arc;

use hyper::body::HttpBody;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_LENGTH, CONTENT_TYPE, HeaderValue,
};
use hyper::{Body, Method, Request, Response, StatusCode};
use pageforge_core::{ConversionOutcome, ConversionRequest, Converter, SilentProgress};
use pageforge_shared::{ConversionMethod, ConversionWarning, DocumentType, PageForgeError};
use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::multipart;

/// Shared, read-only state handed to every request.
#[derive(Debug)]
pub struct ServerState {
    converter: Converter,
    max_upload_bytes: u64,
}

impl ServerState {
    pub fn new(converter: Converter, max_upload_bytes: u64) -> Self {
        Self {
            converter,
            max_upload_bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ConvertResponse {
    success: bool,
    html: String,
    method: ConversionMethod,
    document_type: DocumentType,
    platform: Option<String>,
    warnings: Vec<ConversionWarning>,
}

impl From<ConversionOutcome> for ConvertResponse {
    fn from(outcome: ConversionOutcome) -> Self {
        Self {
            success: true,
            html: outcome.html,
            method: outcome.method,
            document_type: outcome.document_type,
            platform: outcome.platform,
            warnings: outcome.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
}

/// A failed request: status plus the message returned to the client.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn too_large(limit: u64) -> Self {
        Self::bad_request(format!("Upload exceeds the {limit} byte limit"))
    }

    fn into_response(self) -> Response<Body> {
        json_response(
            self.status,
            &ErrorBody {
                success: false,
                error: &self.message,
            },
        )
    }
}

impl From<PageForgeError> for ApiError {
    fn from(e: PageForgeError) -> Self {
        let status = if e.is_input_error() || matches!(e, PageForgeError::Validation { .. }) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

fn with_cors(mut response: Response<Body>) -> Response<Body> {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            with_cors(response)
        }
        Err(e) => {
            warn!(error = %e, "failed to serialize response");
            let mut response = Response::new(Body::from("internal error"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            with_cors(response)
        }
    }
}

fn preflight() -> Response<Body> {
    let mut response = with_cors(Response::new(Body::empty()));
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Entry point for every connection's requests. Never fails: errors become
/// JSON error responses.
pub async fn handle(
    state: Arc<ServerState>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let span = info_span!(
        "request",
        id = %Uuid::now_v7(),
        method = %req.method(),
        path = %req.uri().path(),
    );
    Ok(route(&state, req).instrument(span).await)
}

async fn route(state: &ServerState, req: Request<Body>) -> Response<Body> {
    match (req.method(), req.uri().path()) {
        (&Method::OPTIONS, _) => preflight(),
        (&Method::GET, "/health") => with_cors(Response::new(Body::from("OK"))),
        (&Method::POST, "/api/convert") => match convert(state, req).await {
            Ok(body) => json_response(StatusCode::OK, &body),
            Err(e) => {
                warn!(status = %e.status, error = %e.message, "conversion request failed");
                e.into_response()
            }
        },
        _ => ApiError {
            status: StatusCode::NOT_FOUND,
            message: "Not Found".into(),
        }
        .into_response(),
    }
}

async fn convert(state: &ServerState, req: Request<Body>) -> Result<ConvertResponse, ApiError> {
    let limit = state.max_upload_bytes;

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let boundary = multipart::boundary(content_type)
        .ok_or_else(|| ApiError::bad_request("No boundary found in Content-Type"))?
        .to_string();

    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::too_large(limit));
    }

    let body = read_body(req.into_body(), limit).await?;
    let form = multipart::parse(&body, &boundary)?;

    let file = form
        .get("file")
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let template_type = match form.text("template_type").filter(|t| !t.trim().is_empty()) {
        Some(t) => t.parse::<DocumentType>()?,
        None => DocumentType::default(),
    };
    let platform = form
        .text("platform")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    info!(
        bytes = file.data.len(),
        filename = file.filename.as_deref().unwrap_or("-"),
        %template_type,
        platform = platform.as_deref().unwrap_or("-"),
        "conversion requested"
    );

    let request = ConversionRequest {
        html: String::from_utf8_lossy(&file.data).into_owned(),
        template_type: Some(template_type),
        platform,
    };
    let outcome = state.converter.convert(&request, &SilentProgress).await?;

    Ok(ConvertResponse::from(outcome))
}

/// Collect the body, refusing anything over `limit` bytes.
async fn read_body(mut body: Body, limit: u64) -> Result<Vec<u8>, ApiError> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk =
            chunk.map_err(|e| ApiError::bad_request(format!("failed to read request body: {e}")))?;
        if (buf.len() + chunk.len()) as u64 > limit {
            return Err(ApiError::too_large(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}
