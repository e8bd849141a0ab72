//! Query-style entry point used in handler mode. A single route receives every
//! voucher request and picks the operation from the method plus the `id` and
//! `action` query parameters.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    appstate::AppState,
    handlers::{json_body::decode_body, vouchers},
    middleware::request_tracing::RequestTraceData,
    model::{error::ApiError, payload::VoucherPayload},
};

pub const ACTION_IMPORT: &str = "import";
pub const ACTION_DELETE_ALL: &str = "deleteAll";

#[derive(Debug, Default, Deserialize)]
pub struct DispatchParams {
    pub id: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Route {
    Preflight,
    List,
    Create,
    Update(String),
    Delete(String),
    DeleteAll,
    Import,
}

pub fn resolve(method: &Method, params: &DispatchParams) -> Option<Route> {
    let id = params.id.as_deref().filter(|id| !id.is_empty());
    let action = params.action.as_deref().filter(|a| !a.is_empty());

    match (method.as_str(), id, action) {
        ("OPTIONS", _, _) => Some(Route::Preflight),
        ("GET", None, None) => Some(Route::List),
        ("POST", _, Some(ACTION_IMPORT)) => Some(Route::Import),
        ("POST", None, None) => Some(Route::Create),
        ("PUT", Some(id), None) => Some(Route::Update(id.to_string())),
        ("DELETE", _, Some(ACTION_DELETE_ALL)) => Some(Route::DeleteAll),
        ("DELETE", Some(id), None) => Some(Route::Delete(id.to_string())),
        _ => None,
    }
}

pub async fn dispatch(
    State(app_state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<DispatchParams>, QueryRejection>,
    Extension(request_trace_data): Extension<RequestTraceData>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = request_trace_data.get_id();
    let Query(params) = query.map_err(|e| {
        info!("[{}] rejecting query string: {}", request_id, e);
        ApiError::bad_input()
    })?;
    let route = resolve(&method, &params).ok_or_else(|| {
        info!(
            "[{}] no operation for {} {:?}",
            request_id, method, params
        );
        ApiError::PathNotFound(uri.to_string())
    })?;

    let db = app_state.get_db();
    let response = match route {
        Route::Preflight => StatusCode::OK.into_response(),
        Route::List => vouchers::list_vouchers(&db, &request_id)?.into_response(),
        Route::Create => {
            let payload = decode_body::<VoucherPayload>(&body)?;
            vouchers::create_voucher(&db, &request_id, payload)?.into_response()
        }
        Route::Update(id) => {
            let payload = decode_body::<VoucherPayload>(&body)?;
            vouchers::update_voucher(&db, &request_id, &id, payload)?.into_response()
        }
        Route::Delete(id) => vouchers::delete_voucher(&db, &request_id, &id)?.into_response(),
        Route::DeleteAll => vouchers::delete_all_vouchers(&db, &request_id)?.into_response(),
        Route::Import => {
            let payload = decode_body::<Value>(&body)?;
            vouchers::import_vouchers(&db, &request_id, payload)?.into_response()
        }
    };

    Ok(response)
}
