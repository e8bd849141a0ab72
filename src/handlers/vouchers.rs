use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    appstate::AppState,
    db::Db,
    handlers::json_body::JsonBody,
    middleware::request_tracing::RequestTraceData,
    model::{
        error::{messages, ApiError},
        payload::{NewVoucher, VoucherPayload},
        voucher::Voucher,
    },
};

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct VoucherResponse {
    pub success: bool,
    pub voucher: Voucher,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct ImportResponse {
    pub success: bool,
    pub count: usize,
}

pub(crate) fn parse_voucher_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::bad_input())
}

pub(crate) fn list_vouchers(db: &Db, request_id: &str) -> Result<Json<Vec<Voucher>>, ApiError> {
    info!("[{}] list_vouchers", request_id);

    let vouchers = db
        .list_vouchers()
        .map_err(|e| e.into_api_error(messages::LIST_FAILED))?;

    Ok(Json(vouchers))
}

pub(crate) fn create_voucher(
    db: &Db,
    request_id: &str,
    payload: VoucherPayload,
) -> Result<Json<VoucherResponse>, ApiError> {
    info!("[{}] create_voucher called with {:?}", request_id, payload);

    let voucher = payload.into_new_voucher()?;
    let created = db
        .create_voucher(&voucher)
        .map_err(|e| e.into_api_error(messages::CREATE_FAILED))?;

    Ok(Json(VoucherResponse {
        success: true,
        voucher: created,
    }))
}

pub(crate) fn update_voucher(
    db: &Db,
    request_id: &str,
    raw_id: &str,
    payload: VoucherPayload,
) -> Result<Json<VoucherResponse>, ApiError> {
    info!(
        "[{}] update_voucher {} called with {:?}",
        request_id, raw_id, payload
    );

    let voucher_id = parse_voucher_id(raw_id)?;
    let updated = db
        .update_voucher(&payload.into_new_voucher_with_id(voucher_id))
        .map_err(|e| e.into_api_error(messages::UPDATE_FAILED))?;

    Ok(Json(VoucherResponse {
        success: true,
        voucher: updated,
    }))
}

pub(crate) fn delete_voucher(
    db: &Db,
    request_id: &str,
    raw_id: &str,
) -> Result<Json<SuccessResponse>, ApiError> {
    info!("[{}] delete_voucher {}", request_id, raw_id);

    let voucher_id = parse_voucher_id(raw_id)?;
    db.delete_voucher(voucher_id)
        .map_err(|e| e.into_api_error(messages::DELETE_FAILED))?;

    Ok(Json(SuccessResponse { success: true }))
}

pub(crate) fn delete_all_vouchers(
    db: &Db,
    request_id: &str,
) -> Result<Json<SuccessResponse>, ApiError> {
    info!("[{}] delete_all_vouchers", request_id);

    db.delete_all_vouchers()
        .map_err(|e| e.into_api_error(messages::DELETE_ALL_FAILED))?;

    Ok(Json(SuccessResponse { success: true }))
}

pub(crate) fn import_vouchers(
    db: &Db,
    request_id: &str,
    body: Value,
) -> Result<Json<ImportResponse>, ApiError> {
    if !body.is_array() {
        info!("[{}] import_vouchers rejected non-array payload", request_id);
        return Err(ApiError::bad_input());
    }

    let payloads: Vec<VoucherPayload> = serde_json::from_value(body).map_err(|e| {
        info!("[{}] import_vouchers rejected payload: {}", request_id, e);
        ApiError::bad_input()
    })?;
    info!(
        "[{}] import_vouchers called with {} vouchers",
        request_id,
        payloads.len()
    );

    let vouchers = payloads
        .into_iter()
        .map(VoucherPayload::into_new_voucher)
        .collect::<Result<Vec<NewVoucher>, ApiError>>()?;

    let count = db
        .import_vouchers(&vouchers)
        .map_err(|e| e.into_api_error(messages::IMPORT_FAILED))?;

    Ok(Json(ImportResponse {
        success: true,
        count,
    }))
}

pub async fn list(
    State(app_state): State<Arc<AppState>>,
    Extension(request_trace_data): Extension<RequestTraceData>,
) -> Result<Json<Vec<Voucher>>, ApiError> {
    list_vouchers(&app_state.get_db(), &request_trace_data.get_id())
}

pub async fn create(
    State(app_state): State<Arc<AppState>>,
    Extension(request_trace_data): Extension<RequestTraceData>,
    JsonBody(payload): JsonBody<VoucherPayload>,
) -> Result<Json<VoucherResponse>, ApiError> {
    create_voucher(&app_state.get_db(), &request_trace_data.get_id(), payload)
}

pub async fn update(
    State(app_state): State<Arc<AppState>>,
    Path(voucher_id): Path<String>,
    Extension(request_trace_data): Extension<RequestTraceData>,
    JsonBody(payload): JsonBody<VoucherPayload>,
) -> Result<Json<VoucherResponse>, ApiError> {
    update_voucher(
        &app_state.get_db(),
        &request_trace_data.get_id(),
        &voucher_id,
        payload,
    )
}

pub async fn delete(
    State(app_state): State<Arc<AppState>>,
    Path(voucher_id): Path<String>,
    Extension(request_trace_data): Extension<RequestTraceData>,
) -> Result<Json<SuccessResponse>, ApiError> {
    delete_voucher(
        &app_state.get_db(),
        &request_trace_data.get_id(),
        &voucher_id,
    )
}

/// Bare `DELETE /api/vouchers`, only routed in server mode.
pub async fn delete_all(
    State(app_state): State<Arc<AppState>>,
    Extension(request_trace_data): Extension<RequestTraceData>,
) -> Result<Json<SuccessResponse>, ApiError> {
    delete_all_vouchers(&app_state.get_db(), &request_trace_data.get_id())
}

pub async fn import(
    State(app_state): State<Arc<AppState>>,
    Extension(request_trace_data): Extension<RequestTraceData>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<ImportResponse>, ApiError> {
    import_vouchers(&app_state.get_db(), &request_trace_data.get_id(), body)
}
