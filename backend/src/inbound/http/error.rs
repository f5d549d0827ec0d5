//! HTTP mapping for domain errors.
//!
//! The domain [`Error`] stays framework-free; this module gives it a status
//! code and a JSON body. Internal and unavailable-dependency failures are
//! logged in full and sent to the client with a generic message.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const REDACTED_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn client_view(err: &Error) -> Error {
    let message = match err.code() {
        ErrorCode::InternalError => {
            error!(message = err.message(), trace_id = ?err.trace_id(), "internal error");
            REDACTED_MESSAGE
        }
        ErrorCode::ServiceUnavailable => {
            error!(message = err.message(), trace_id = ?err.trace_id(), "dependency unavailable");
            UNAVAILABLE_MESSAGE
        }
        _ => return err.clone(),
    };
    let redacted = Error::new(err.code(), message);
    match err.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}
