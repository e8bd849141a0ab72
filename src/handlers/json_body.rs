use axum::{async_trait, body::Bytes, extract::FromRequest, http::Request};
use log::warn;
use serde::de::DeserializeOwned;

use crate::model::error::ApiError;

/// JSON request body whose decoding failures surface as the localized
/// bad-input error instead of axum's plain-text rejection.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice::<T>(body).map_err(|e| {
        warn!("rejecting request body: {}", e);
        ApiError::bad_input()
    })
}

#[async_trait]
impl<S, B, T> FromRequest<S, B> for JsonBody<T>
where
    Bytes: FromRequest<S, B>,
    S: Send + Sync,
    B: Send + 'static,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|_| {
            warn!("failed to read request body");
            ApiError::bad_input()
        })?;

        decode_body(&body).map(JsonBody)
    }
}
