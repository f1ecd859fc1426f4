//! Response bodies and error mapping for the HTTP service.

use crate::error::ZooError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Detail used when the store cannot be reached on lookup and write routes.
pub const CONNECTION_DETAIL: &str = "Erro ao conectar ao banco de dados.";

/// `{"mensagem": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub mensagem: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            mensagem: message.into(),
        }
    }
}

/// `{"msg": ...}`, returned by the procedure and trigger routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub msg: String,
}

/// Outcome of a direct insert. Both variants are sent with status 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsertResponse {
    Done { mensagem: String },
    Failed { erro: String },
}

/// `{"detail": ...}` with a 4xx/5xx status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Maps a catalog failure; `not_found` is the detail used for 404.
    pub fn from_catalog(error: &ZooError, not_found: &str) -> Self {
        match error {
            ZooError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, not_found),
            ZooError::Rejected { message, .. } => Self::new(StatusCode::BAD_REQUEST, message),
            ZooError::Connection(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, CONNECTION_DETAIL),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.message()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            detail: &self.detail,
        });
        (self.status, body).into_response()
    }
}
