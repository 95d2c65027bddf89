use ::core::fmt::Display;

use ::axum::response::{IntoResponse, Response};
use ::cirrus_common::error::{CirrusError, CirrusErrorType::*};
use ::http::StatusCode;

/// [CirrusServerError] is a wrapper for [CirrusError] to convert it into Axum response
#[derive(Debug)]
pub struct CirrusServerError(CirrusError);

pub(crate) type Result<T> = std::result::Result<T, CirrusServerError>;

impl CirrusServerError {
    fn get_status_code(&self) -> StatusCode {
        match self.0.get_error_type() {
            IllegalArgument => StatusCode::BAD_REQUEST,
            DagAlreadyExists => StatusCode::CONFLICT,
            NoSuchDag => StatusCode::NOT_FOUND,
            NoSuchFunction => StatusCode::NOT_FOUND,
            NoResources => StatusCode::SERVICE_UNAVAILABLE,
            FailToContactExecutor => StatusCode::BAD_GATEWAY,
            FailToConnectStore => StatusCode::INTERNAL_SERVER_ERROR,
            FailToUpdateStore => StatusCode::INTERNAL_SERVER_ERROR,
            FailToReadStore => StatusCode::INTERNAL_SERVER_ERROR,
            FailToLoadConfig => StatusCode::INTERNAL_SERVER_ERROR,
            FailToStartServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CirrusError> for CirrusServerError {
    fn from(error: CirrusError) -> Self {
        Self(error)
    }
}

/// [CirrusServerError] displays in the same way as [CirrusError]
impl Display for CirrusServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IntoResponse for CirrusServerError {
    fn into_response(self) -> Response {
        let status = self.get_status_code();
        (status, self.to_string()).into_response()
    }
}
