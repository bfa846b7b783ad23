//! Request extractors that reject with [`AppError`] instead of axum's plain
//! text rejections.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor. Malformed bodies become 400s in the standard error
/// envelope.
///
/// Handlers that gate on the caller take `Result<ApiJson<T>, AppError>` and
/// unwrap it after the check, so anonymous writes see 401 rather than 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            AppError::invalid_field("non_field_errors", err.body_text())
        }
        JsonRejection::JsonSyntaxError(err) => {
            AppError::bad_request(format!("JSON parse error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(err) => AppError::bad_request(err.body_text()),
        other => AppError::bad_request(other.body_text()),
    }
}
