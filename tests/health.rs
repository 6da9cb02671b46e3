mod support;

#[tokio::test]
async fn when_health_is_requested_then_server_reports_ok() {
    let res = reqwest::get(support::http_url("/health"))
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = res.json().await.expect("json body");
    assert_eq!(body["status"], "ok");
    assert!(body["players"].is_u64());
    assert!(body["uptime"].is_u64());
}
