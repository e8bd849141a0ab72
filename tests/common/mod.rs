#![allow(dead_code)]

use axum::{
    body::Body,
    http::{self, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::{Service, ServiceExt};
use vouchers_api::model::voucher::Voucher;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_thread_ids(true).try_init();
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &mut Router, method: Method, uri: &str, request_body: Option<&str>) -> TestResponse {
    let request = Request::builder().method(method).uri(uri);
    let request = match request_body {
        Some(body) => request
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.ready().await.unwrap().call(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();

    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &mut Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &mut Router, uri: &str, request_body: &str) -> TestResponse {
    send(app, Method::POST, uri, Some(request_body)).await
}

pub async fn put(app: &mut Router, uri: &str, request_body: &str) -> TestResponse {
    send(app, Method::PUT, uri, Some(request_body)).await
}

pub async fn delete(app: &mut Router, uri: &str) -> TestResponse {
    send(app, Method::DELETE, uri, None).await
}

pub fn to_vouchers(json: Value) -> Vec<Voucher> {
    serde_json::from_value::<Vec<Voucher>>(json).unwrap()
}

pub fn to_voucher_ids(json: Value) -> Vec<i64> {
    to_vouchers(json).iter().map(|v| v.id).collect()
}
