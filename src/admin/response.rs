// Admin action response envelope
// Every background action answers {"success": bool, "message": string[, "data": ...]}

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::PromoError;
use crate::logger;

#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub success: bool,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(
                    r#"{"success":false,"message":"Error interno"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-store")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Successful action, optionally carrying a payload
pub fn success<T: Serialize>(message: &str, data: Option<T>) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &Envelope {
            success: true,
            message,
            data,
        },
    )
}

/// Failed action with an explicit status
pub fn failure_with_status(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(
        status,
        &Envelope::<()> {
            success: false,
            message,
            data: None,
        },
    )
}

/// Failed action, status taken from the error kind
pub fn failure(err: &PromoError) -> Response<Full<Bytes>> {
    failure_with_status(err.status(), &err.to_string())
}
