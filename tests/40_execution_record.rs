mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::TestServer;

/// One interface, two successful runs and one rejected run
async fn seed(server: &TestServer, token: &str) -> Result<i64> {
    let id = server
        .create_interface(
            token,
            json!({
                "name": "echo",
                "method": "GET",
                "url": server.upstream.url("/echo"),
                "urlParams": [{ "name": "q", "required": true }]
            }),
        )
        .await?;

    server
        .execute(token, json!({ "interfaceId": id, "urlParams": { "q": 1 }, "remark": "first" }))
        .await?;
    server
        .execute(token, json!({ "interfaceId": id, "urlParams": { "q": 2 } }))
        .await?;
    server.execute(token, json!({ "interfaceId": id })).await?;
    Ok(id)
}

#[tokio::test]
async fn list_filters_records() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let id = seed(&server, &token).await?;

    let (status, body) = server
        .call(
            Method::POST,
            "/interface/execution/record/list",
            &token,
            Some(json!({ "interfaceId": id, "success": false })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let failed = &body["data"]["records"][0];
    assert_eq!(failed["responseStatus"], 400);
    assert_eq!(failed["interfaceName"], "echo");
    assert_eq!(failed["executorName"], common::ADMIN_USER);
    assert_eq!(failed["errorMessage"], "URL parameter q is required");

    let (_, body) = server
        .call(
            Method::POST,
            "/interface/execution/record/list",
            &token,
            Some(json!({ "keyword": "first" })),
        )
        .await?;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["requestParams"], r#"{"q":1}"#);

    Ok(())
}

#[tokio::test]
async fn detail_includes_caller_details() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let id = server
        .create_interface(
            &token,
            json!({ "name": "echo", "method": "GET", "url": server.upstream.url("/echo") }),
        )
        .await?;

    let res = server
        .client
        .post(server.url("/interface/execute"))
        .bearer_auth(&token)
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .header("user-agent", "record-test/1.0")
        .json(&json!({ "interfaceId": id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, list) = server
        .call(
            Method::POST,
            "/interface/execution/record/list",
            &token,
            Some(json!({ "interfaceId": id })),
        )
        .await?;
    let record_id = list["data"]["records"][0]["id"].as_i64().unwrap();

    let (status, body) = server
        .call(
            Method::GET,
            &format!("/interface/execution/record/{}", record_id),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["clientIp"], "203.0.113.9");
    assert_eq!(body["data"]["userAgent"], "record-test/1.0");
    assert_eq!(body["data"]["requestHeaders"], "{}");
    assert_eq!(body["data"]["success"], true);

    let (status, _) = server
        .call(Method::GET, "/interface/execution/record/999999", &token, None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn records_by_executor_are_newest_first() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    seed(&server, &token).await?;

    let (_, me) = server.call(Method::GET, "/auth/current/user", &token, None).await?;
    let uid = me["data"]["id"].as_i64().unwrap();

    let (status, body) = server
        .call(
            Method::GET,
            &format!("/interface/execution/record/executor/{}?limit=2", uid),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0]["id"].as_i64() > records[1]["id"].as_i64());
    assert_eq!(records[0]["success"], false);

    let (status, _) = server
        .call(
            Method::GET,
            &format!("/interface/execution/record/executor/{}?limit=0", uid),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn stats_summarize_interface_history() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let id = seed(&server, &token).await?;

    let (status, body) = server
        .call(
            Method::GET,
            &format!("/interface/execution/record/stats/{}", id),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let stats = &body["data"];
    assert_eq!(stats["interfaceName"], "echo");
    assert_eq!(stats["totalExecutions"], 3);
    assert_eq!(stats["successExecutions"], 2);
    assert_eq!(stats["failedExecutions"], 1);
    let rate = stats["successRate"].as_f64().unwrap();
    assert!((rate - 200.0 / 3.0).abs() < 1e-6);
    assert!(stats["lastExecutionTime"].is_string());

    let (_, body) = server
        .call(Method::GET, "/interface/execution/record/stats/777", &token, None)
        .await?;
    assert_eq!(body["data"]["totalExecutions"], 0);
    assert_eq!(body["data"]["successRate"], 0.0);

    Ok(())
}

#[tokio::test]
async fn count_requires_ordered_range() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    seed(&server, &token).await?;

    let now = chrono::Utc::now().timestamp_millis();
    let (status, body) = server
        .call(
            Method::GET,
            &format!(
                "/interface/execution/record/count?startTime={}&endTime={}",
                now - 60_000,
                now + 60_000
            ),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], 3);

    let (status, _) = server
        .call(
            Method::GET,
            &format!("/interface/execution/record/count?startTime={}&endTime={}", now, now - 1),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .call(Method::GET, "/interface/execution/record/count", &token, None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn cleanup_deletes_older_records() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let id = seed(&server, &token).await?;

    let (status, _) = server
        .call(Method::DELETE, "/interface/execution/record/cleanup", &token, None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = server
        .call(
            Method::DELETE,
            "/interface/execution/record/cleanup?beforeTime=1",
            &token,
            None,
        )
        .await?;
    assert_eq!(body["data"], 0);

    let future = chrono::Utc::now().timestamp_millis() + 60_000;
    let (status, body) = server
        .call(
            Method::DELETE,
            &format!("/interface/execution/record/cleanup?beforeTime={}", future),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], 3);

    let (_, body) = server
        .call(
            Method::POST,
            "/interface/execution/record/list",
            &token,
            Some(json!({ "interfaceId": id })),
        )
        .await?;
    assert_eq!(body["data"]["total"], 0);

    Ok(())
}

#[tokio::test]
async fn oversized_page_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;

    let (status, body) = server
        .call(
            Method::POST,
            "/interface/execution/record/list",
            &token,
            Some(json!({ "page": i64::MAX, "size": 10 })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "page is out of range");

    Ok(())
}
