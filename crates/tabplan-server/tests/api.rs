//! HTTP round trips against the axum router
//!
//! Run with: cargo test --package tabplan-server --test api

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use tabplan_server::{router, AppState, Config};

fn app() -> axum::Router {
    router(AppState::new(Config::default()).unwrap())
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, body).await;
    (status, serde_json::from_str(&text).unwrap())
}

fn sales() -> Value {
    json!([
        {"Date": "2023-10-01", "Region": "Seoul", "Category": "Food", "Amount": 12000},
        {"Date": "2023-10-02", "Region": "Busan", "Category": "Lodging", "Amount": 180000},
        {"Date": "2023-10-03", "Region": "Seoul", "Category": "Transport", "Amount": 1234567},
    ])
}

async fn upload(app: &axum::Router, name: &str, records: Value) {
    let (status, body) = send_json(app, "POST", &format!("/tables/{}", name), Some(records)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_execute_stores_first_non_empty_result() {
    let app = app();
    upload(&app, "sales.csv", sales()).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/smart-transform/execute",
        Some(json!({"prompt": "서울 지역만 필터링해줘", "filename": "sales.csv"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["outputFilename"], "region_filter_table_sales.csv");
    assert_eq!(body["validation"]["valid"], true);
    assert_eq!(
        body["previewData"],
        json!([
            {"Date": "2023-10-01", "Region": "Seoul", "Category": "Food", "Amount": "12,000"},
            {"Date": "2023-10-03", "Region": "Seoul", "Category": "Transport", "Amount": "1,234,567"},
        ])
    );

    // the stored copy keeps raw values
    let (_, catalog) = send_json(&app, "GET", "/tables/region_filter_table_sales.csv", None).await;
    assert_eq!(catalog["row_count"], 2);
    assert_eq!(catalog["sample_data"][1]["Amount"], 1234567);

    let (_, lineage) = send_json(&app, "GET", "/lineage", None).await;
    let ids: Vec<&str> = lineage["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec!["sales.csv", "transform_region_filter_table_sales.csv", "region_filter_table_sales.csv"]
    );
    assert_eq!(lineage["edges"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_execute_falls_back_to_source_copy() {
    let app = app();
    upload(&app, "busan.csv", json!([{"Region": "Busan", "Amount": 50}])).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/smart-transform/execute",
        Some(json!({"prompt": "서울 지역만 필터링해줘", "filename": "busan.csv"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outputFilename"], "smart_busan.csv");
    assert_eq!(body["previewData"], json!([{"Region": "Busan", "Amount": "50"}]));
}

#[tokio::test]
async fn test_execute_unknown_file_is_404() {
    let (status, body) = send_json(
        &app(),
        "POST",
        "/smart-transform/execute",
        Some(json!({"prompt": "상세 내역", "filename": "missing.csv"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Table not found: missing.csv");
}

#[tokio::test]
async fn test_execution_error_is_400_and_isolated() {
    let app = app();
    upload(
        &app,
        "bad.csv",
        json!([{"Region": "Seoul", "Amount": "n/a"}, {"Region": "Busan", "Amount": "?"}]),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/smart-transform/execute",
        Some(json!({"prompt": "지역별로 그룹화하고 합계를 계산해줘", "filename": "bad.csv"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("non-numeric"));

    upload(&app, "sales.csv", sales()).await;
    let (status, body) = send_json(
        &app,
        "POST",
        "/smart-transform/execute",
        Some(json!({"prompt": "지역별로 그룹화하고 합계를 계산해줘", "filename": "sales.csv"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outputFilename"], "group_summary_table_sales.csv");
    assert_eq!(body["previewData"][0], json!({"Region": "Seoul", "합계": 1246567}));

    let (_, metrics) = send(&app, "GET", "/metrics", None).await;
    assert!(metrics.contains("tabplan_transforms_total{outcome=\"error\"} 1"));
    assert!(metrics.contains("tabplan_transforms_total{outcome=\"success\"} 1"));
}

#[tokio::test]
async fn test_execute_reports_diagnostics() {
    let app = app();
    upload(&app, "sales.csv", sales()).await;

    let plan = json!({
        "tables": [{"id": "t", "title": "t", "operations": [
            {"type": "FILTER", "field": "Ghost", "value": 1},
            {"type": "LIMIT", "count": 1}
        ]}],
        "isValidRequest": true
    });
    let (status, body) = send_json(
        &app,
        "POST",
        "/smart/plan/execute",
        Some(json!({"plan": plan, "file_ids": ["sales.csv"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"]["t"]["columns"], json!(["Date", "Region", "Category", "Amount"]));
    assert_eq!(body["results"]["t"]["data"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["diagnostics"],
        json!([{"tableId": "t", "opIndex": 0, "op": "FILTER", "reason": "missing_field", "field": "Ghost"}])
    );

    let (_, metrics) = send(&app, "GET", "/metrics", None).await;
    assert!(metrics.contains("tabplan_noop_operations_total 1"));
}

#[tokio::test]
async fn test_plan_execute_runs_no_op_operations() {
    let app = app();
    upload(&app, "sales.csv", sales()).await;

    let plan = json!({
        "tables": [{"id": "t", "title": "t", "operations": [
            {"type": "GROUP_BY", "keys": [], "aggregations": []}
        ]}],
        "layout": {"sections": [{"title": "elsewhere", "content": ["ghost"]}]}
    });
    let (status, body) = send_json(
        &app,
        "POST",
        "/smart/plan/execute",
        Some(json!({"plan": plan, "file_ids": ["sales.csv"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"]["t"]["data"].as_array().unwrap().len(), 3);
    assert_eq!(
        body["diagnostics"],
        json!([{"tableId": "t", "opIndex": 0, "op": "GROUP_BY", "reason": "no_group_keys", "keys": []}])
    );
    assert!(body["results"].get("ghost").is_none());
}

#[tokio::test]
async fn test_plan_execute_rejects_bad_table_ids() {
    let app = app();
    upload(&app, "sales.csv", sales()).await;

    let plan = json!({
        "tables": [
            {"id": "t", "title": "t", "operations": []},
            {"id": "t", "title": "again", "operations": []}
        ]
    });
    let (status, body) = send_json(
        &app,
        "POST",
        "/smart/plan/execute",
        Some(json!({"plan": plan, "file_ids": ["sales.csv"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Duplicate table id: t"));

    let (status, _) = send_json(
        &app,
        "POST",
        "/smart/plan/execute",
        Some(json!({"plan": {"tables": []}, "file_ids": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate() {
    let app = app();

    let (_, body) = send_json(&app, "POST", "/smart/validate", Some(json!({"prompt": "!!!!"}))).await;
    assert_eq!(body["valid"], false);

    let (_, body) = send_json(&app, "POST", "/smart/validate", Some(json!({"prompt": "상위 10개 보여줘"}))).await;
    assert_eq!(body, json!({"valid": true}));
}

#[tokio::test]
async fn test_generate_uses_demo_schema() {
    let (status, body) = send_json(
        &app(),
        "POST",
        "/smart-transform/generate",
        Some(json!({"prompt": "부서별 합계"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["tables"][0]["id"], "group_summary_table");
    assert_eq!(body["plan"]["tables"][0]["operations"][0]["keys"], json!(["Dept"]));
    assert_eq!(body["nodes"][1]["data"]["icon"], "GitMerge");
    assert_eq!(body["connections"].as_array().unwrap().len(), 2);
    assert_eq!(body["previewData"], json!([]));
    assert_eq!(body["fingerprint"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_plan_generate_and_catalog() {
    let app = app();
    upload(&app, "sales.csv", sales()).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/smart/plan/generate",
        Some(json!({"prompt": "금액 상위 5개", "file_ids": ["sales.csv"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["tables"][0]["id"], "top_amount_table");
    assert_eq!(body["plan"]["tables"][0]["operations"][2], json!({"type": "LIMIT", "count": 5}));

    let (status, md) = send(&app, "GET", "/tables/sales.csv?format=markdown", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(md.contains("| `Date` | date |"));

    let (_, tables) = send_json(&app, "GET", "/tables", None).await;
    assert_eq!(tables["tables"][0]["name"], "sales.csv");
    assert_eq!(tables["tables"][0]["rows"], 3);
}

#[tokio::test]
async fn test_upload_rejects_non_objects() {
    let (status, body) = send_json(&app(), "POST", "/tables/x.csv", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid table: Record 0 is not a JSON object");
}
