mod common;

use std::sync::Arc;

use axum::http::{Method, Request, StatusCode};
use chrono::NaiveDate;
use serde_json::json;
use tower::{Service, ServiceExt};
use vouchers_api::{
    db::Db,
    handlers::vouchers::VoucherResponse,
    model::{
        amount::Amount,
        voucher::{Redemption, Voucher},
    },
    router,
};

use common::{delete, get, init_logging, post, put, send, to_voucher_ids, to_vouchers};

fn cafe_voucher(redemptions: Vec<Redemption>) -> Voucher {
    Voucher {
        id: 1,
        name: String::from("Café"),
        initial_value: Amount::from_minor_units(10000),
        code: String::new(),
        description: String::new(),
        redemptions,
        is_redeemed: false,
    }
}

fn amounts(voucher: &Voucher) -> Vec<Amount> {
    voucher.redemptions.iter().map(|r| r.amount).collect()
}

#[tokio::test]
async fn e2e_test() {
    init_logging();

    let db = Arc::new(Db::open_in_memory().unwrap());
    let mut app = router(db.clone());

    //
    // Store starts empty
    //
    let response = get(&mut app, "/api/vouchers").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));

    //
    // Create a voucher without redemptions, then list it with defaults filled in
    //
    let response = post(
        &mut app,
        "/api/vouchers",
        r#"{"id":1,"name":"Café","initialValue":100.00}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        serde_json::from_value::<VoucherResponse>(response.body).unwrap(),
        VoucherResponse {
            success: true,
            voucher: cafe_voucher(vec![])
        }
    );

    let response = get(&mut app, "/api/vouchers").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body[0]["redemptions"], json!([]));
    assert_eq!(response.body[0]["isRedeemed"], json!(false));
    assert_eq!(response.body[0]["code"], json!(""));
    assert_eq!(to_vouchers(response.body), vec![cafe_voucher(vec![])]);

    //
    // Update with one redemption
    //
    let response = put(
        &mut app,
        "/api/vouchers/1",
        r#"{"name":"Café","initialValue":100.00,"redemptions":[{"amount":30,"date":"2024-01-01"}]}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = serde_json::from_value::<VoucherResponse>(response.body).unwrap();
    assert!(updated.success);
    assert_eq!(amounts(&updated.voucher), vec![Amount::from_minor_units(3000)]);

    let response = get(&mut app, "/api/vouchers").await;
    let vouchers = to_vouchers(response.body);
    assert_eq!(vouchers.len(), 1);
    assert_eq!(amounts(&vouchers[0]), vec![Amount::from_minor_units(3000)]);
    assert_eq!(
        vouchers[0].redemptions[0].date,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );

    //
    // A second update replaces the redemptions instead of merging them
    //
    let response = put(
        &mut app,
        "/api/vouchers/1",
        r#"{"id":1,"name":"Café","initialValue":100.00,"code":"C-1","isRedeemed":true,
            "redemptions":[{"amount":10.5,"date":"2024-02-01"},{"amount":20,"date":"2024-03-01"}]}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = get(&mut app, "/api/vouchers").await;
    let vouchers = to_vouchers(response.body);
    assert_eq!(vouchers.len(), 1);
    assert_eq!(vouchers[0].code, "C-1");
    assert!(vouchers[0].is_redeemed);
    assert_eq!(
        amounts(&vouchers[0]),
        vec![Amount::from_minor_units(2000), Amount::from_minor_units(1050)]
    );
    assert_eq!(db.get_redemptions_for_voucher(1).unwrap().len(), 2);

    //
    // Delete the voucher; its redemptions go with it
    //
    let response = delete(&mut app, "/api/vouchers/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"success": true}));

    let response = get(&mut app, "/api/vouchers").await;
    assert_eq!(response.body, json!([]));
    assert!(db.get_redemptions_for_voucher(1).unwrap().is_empty());

    //
    // Missing vouchers are 404 and nothing is created
    //
    let response = put(
        &mut app,
        "/api/vouchers/999",
        r#"{"name":"ghost","initialValue":1,"redemptions":[{"amount":1,"date":"2024-01-01"}]}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"error": "שובר לא נמצא"}));

    let response = delete(&mut app, "/api/vouchers/999").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = get(&mut app, "/api/vouchers").await;
    assert_eq!(response.body, json!([]));
    assert!(db.get_redemptions_for_voucher(999).unwrap().is_empty());
}

#[tokio::test]
async fn import_test() {
    init_logging();

    let db = Arc::new(Db::open_in_memory().unwrap());
    let mut app = router(db.clone());

    let response = post(
        &mut app,
        "/api/vouchers",
        r#"{"id":1,"name":"old","initialValue":5,"redemptions":[{"amount":1,"date":"2024-01-01"}]}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    //
    // Non-array payload is rejected and nothing changes
    //
    let response = post(&mut app, "/api/vouchers/import", r#"{"id":2,"name":"x"}"#).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({"error": "נתונים לא תקינים"}));
    assert_eq!(to_voucher_ids(get(&mut app, "/api/vouchers").await.body), vec![1]);

    //
    // Failing partway rolls back the whole import
    //
    let response = post(
        &mut app,
        "/api/vouchers/import",
        r#"[{"id":2,"name":"x","initialValue":1},{"id":2,"name":"y","initialValue":1}]"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, json!({"error": "שגיאה בייבוא השוברים"}));
    assert_eq!(to_voucher_ids(get(&mut app, "/api/vouchers").await.body), vec![1]);
    assert_eq!(db.get_redemptions_for_voucher(1).unwrap().len(), 1);

    //
    // A valid import replaces the whole store
    //
    let response = post(
        &mut app,
        "/api/vouchers/import",
        r#"[
            {"id":3,"name":"b","initialValue":50,"redemptions":[{"amount":5,"date":"2024-01-02"}]},
            {"id":2,"name":"a","initialValue":20.5,"description":"gift"}
        ]"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"success": true, "count": 2}));

    let vouchers = to_vouchers(get(&mut app, "/api/vouchers").await.body);
    assert_eq!(vouchers.iter().map(|v| v.id).collect::<Vec<i64>>(), vec![2, 3]);
    assert_eq!(vouchers[0].description, "gift");
    assert_eq!(vouchers[0].initial_value, Amount::from_minor_units(2050));
    assert_eq!(amounts(&vouchers[1]), vec![Amount::from_minor_units(500)]);
    assert!(db.get_redemptions_for_voucher(1).unwrap().is_empty());

    //
    // Bare DELETE wipes everything in server mode
    //
    let response = delete(&mut app, "/api/vouchers").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"success": true}));
    assert_eq!(get(&mut app, "/api/vouchers").await.body, json!([]));
    assert!(db.get_redemptions_for_voucher(3).unwrap().is_empty());
}

#[tokio::test]
async fn errors_test() {
    init_logging();

    let db = Arc::new(Db::open_in_memory().unwrap());
    let mut app = router(db);

    let body = r#"{"id":1,"name":"a","initialValue":1}"#;
    assert_eq!(post(&mut app, "/api/vouchers", body).await.status, StatusCode::OK);

    let response = post(&mut app, "/api/vouchers", body).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, json!({"error": "שגיאה ביצירת השובר"}));

    let response = post(&mut app, "/api/vouchers", r#"{"name":"no id","initialValue":1}"#).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({"error": "נתונים לא תקינים"}));

    let response = post(&mut app, "/api/vouchers", r#"{"id":2,"name":"a","initialValue":1.234}"#).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = post(&mut app, "/api/vouchers", "not json").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = put(&mut app, "/api/vouchers/abc", body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    //
    // Known paths with an unsupported method are 404, like unknown paths
    //
    let response = send(&mut app, Method::PUT, "/api/vouchers", Some("{}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"error": "הנתיב '/api/vouchers' לא נמצא"}));

    let response = get(&mut app, "/api/vouchers/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"error": "הנתיב '/api/vouchers/1' לא נמצא"}));

    let response = get(&mut app, "/api/vouchers/import").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body,
        json!({"error": "הנתיב '/api/vouchers/import' לא נמצא"})
    );

    let response = delete(&mut app, "/api/health").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = get(&mut app, "/api/unknown").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"error": "הנתיב '/api/unknown' לא נמצא"}));
}

#[tokio::test]
async fn health_and_headers_test() {
    init_logging();

    let db = Arc::new(Db::open_in_memory().unwrap());
    let mut app = router(db);

    let response = get(&mut app, "/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"status": "ok", "database": "connected"})
    );
    assert!(response.headers.contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/api/vouchers")
        .header("origin", "https://example.org")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.ready().await.unwrap().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );

    let response = send(&mut app, Method::OPTIONS, "/api/vouchers", None).await;
    assert_eq!(response.status, StatusCode::OK);
}
