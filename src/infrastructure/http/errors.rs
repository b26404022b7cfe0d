use reqwest::{Response, StatusCode};

use crate::domain::error::ServiceError;

/// Map a transport failure onto the service error taxonomy.
pub fn from_reqwest(err: &reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout
    } else if err.is_decode() {
        ServiceError::MalformedResponse(err.to_string())
    } else {
        ServiceError::Network(err.to_string())
    }
}

/// Classify a non-success status code.
pub fn from_status(status: StatusCode, body: String) -> ServiceError {
    match status.as_u16() {
        400 => ServiceError::InvalidRequest(body),
        401 => ServiceError::InvalidApiKey,
        403 => ServiceError::Forbidden(body),
        404 => ServiceError::NotFound,
        429 => ServiceError::RateLimitExceeded,
        code @ 500..=599 => ServiceError::ServerError(code, body),
        code => ServiceError::UnexpectedStatus(code, body),
    }
}

/// Pass a successful response through, turning anything else into an error.
pub async fn error_for_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    Err(from_status(status, body))
}
