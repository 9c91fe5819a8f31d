//! HTTP routes
//!
//! `POST /api/ai-edit` applies one natural-language edit to the document
//! in the request body and returns the edited document. The endpoint is
//! stateless; persistence stays with the caller.

use crate::dto::{AiEditRequest, AiEditResponse, ErrorBody};
use serde::Serialize;
use serde_json::Value;
use sitegen_core::{CancelToken, EditMerger, ErrorKind};
use sitegen_document::Document;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// 400 message when a required request field is absent
pub const MISSING_FIELDS: &str = "Missing instruction or currentSiteData";

/// 400 message when neither the document nor `contactInfo` gives a full contact
pub const MISSING_CONTACT: &str = "Missing contact phone, location or companyName";

/// 405 message for anything but `POST`
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// `/api/ai-edit`, any method
pub fn ai_edit(
    merger: Arc<EditMerger>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "ai-edit")
        .and(warp::method())
        .and(warp::body::bytes())
        .and_then(move |method: Method, body: Bytes| {
            let merger = Arc::clone(&merger);
            async move { Ok::<_, Infallible>(handle_ai_edit(&merger, &method, &body).await) }
        })
}

fn reply<T: Serialize>(status: StatusCode, body: &T) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    reply(status, &ErrorBody::new(message))
}

/// Decode the caller's document; a missing contact block is tolerated
/// since `contactInfo` may supply it
fn decode_current(mut value: Value) -> Result<Document, serde_json::Error> {
    if let Some(map) = value.as_object_mut() {
        map.entry("contact").or_insert_with(|| {
            serde_json::json!({ "phone": "", "location": "", "companyName": "" })
        });
    }
    serde_json::from_value(value)
}

async fn handle_ai_edit(merger: &EditMerger, method: &Method, body: &[u8]) -> Response {
    if method != Method::POST {
        return error_reply(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED);
    }

    let request: AiEditRequest = if body.iter().all(u8::is_ascii_whitespace) {
        AiEditRequest::default()
    } else {
        match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                return error_reply(StatusCode::BAD_REQUEST, format!("Invalid request body: {e}"))
            }
        }
    };

    let instruction = request
        .instruction
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty());
    let current = request.current_site_data.filter(|v| !v.is_null());
    let (Some(instruction), Some(current)) = (instruction, current) else {
        return error_reply(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };

    let mut document = match decode_current(current) {
        Ok(document) => document,
        Err(e) => {
            return error_reply(StatusCode::BAD_REQUEST, format!("Invalid currentSiteData: {e}"))
        }
    };
    if let Some(info) = &request.contact_info {
        info.apply_to(&mut document.contact);
    }
    if !document.contact.is_complete() {
        return error_reply(StatusCode::BAD_REQUEST, MISSING_CONTACT);
    }

    tracing::info!(instruction, "AI edit request");
    match merger.apply_edit(instruction, &document, &CancelToken::new()).await {
        Ok(data) => {
            tracing::info!("AI edit request succeeded");
            reply(StatusCode::OK, &AiEditResponse { success: true, data })
        }
        Err(e) if e.kind() == ErrorKind::InputValidation => {
            error_reply(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            tracing::error!("AI edit request failed: {}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
