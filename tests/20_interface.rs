mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::TestServer;

fn lookup_form(url: &str) -> Value {
    json!({
        "name": "user lookup",
        "method": "POST",
        "url": url,
        "postType": "application/json",
        "environment": "TEST",
        "timeout": 5,
        "valuePath": "$.data.id",
        "urlParams": [
            { "name": " q ", "displayName": "Query", "inputType": "TEXT", "dataType": "STRING" }
        ],
        "headerParams": [
            { "name": "X-Trace", "chineseName": "Trace", "required": true }
        ],
        "bodyParams": [
            { "name": "uid", "paramType": "URL_PARAM", "dataType": "INTEGER", "required": true }
        ]
    })
}

#[tokio::test]
async fn create_and_fetch_interface() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;

    let id = server
        .create_interface(&token, lookup_form("https://upstream.example/users"))
        .await?;

    let (status, body) = server
        .call(Method::GET, &format!("/interface/{}", id), &token, None)
        .await?;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["name"], "user lookup");
    assert_eq!(data["status"], 1);
    assert_eq!(data["urlParams"][0]["name"], "q");
    assert_eq!(data["urlParams"][0]["paramType"], "URL_PARAM");
    assert_eq!(data["headerParams"][0]["displayName"], "Trace");
    // bucket wins over the declared location
    assert_eq!(data["bodyParams"][0]["paramType"], "BODY_PARAM");
    assert!(data["createTime"].as_str().is_some_and(|t| !t.is_empty()));

    Ok(())
}

#[tokio::test]
async fn invalid_definitions_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;

    let cases = [
        json!({ "name": "x", "method": "POST", "url": "https://a.example" }),
        json!({ "name": "x", "method": "TRACE", "url": "https://a.example" }),
        json!({ "name": "x", "method": "GET", "url": "not a url" }),
        json!({ "name": "", "method": "GET", "url": "https://a.example" }),
        json!({ "name": "x", "method": "GET", "url": "https://a.example", "timeout": 0 }),
        json!({ "name": "x", "method": "GET", "url": "https://a.example", "environment": "DEV" }),
        json!({ "name": "x", "method": "PUT", "url": "https://a.example", "postType": "text/xml" }),
    ];

    for form in cases {
        let (status, body) = server
            .call(Method::POST, "/interface", &token, Some(form.clone()))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {}: {}", form, body);
        assert_eq!(body["code"], 400);
    }

    Ok(())
}

#[tokio::test]
async fn list_filters_and_pages_newest_first() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;

    for name in ["orders", "order items", "users"] {
        server
            .create_interface(
                &token,
                json!({ "name": name, "method": "GET", "url": "https://a.example/x" }),
            )
            .await?;
    }

    let (_, body) = server
        .call(Method::GET, "/interface/list?name=order&page=1&size=1", &token, None)
        .await?;
    let page = &body["data"];
    assert_eq!(page["total"], 2);
    assert_eq!(page["records"].as_array().unwrap().len(), 1);
    assert_eq!(page["records"][0]["name"], "order items");

    let (status, _) = server
        .call(Method::GET, "/interface/list?size=0", &token, None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn update_keeps_status_and_identity() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let id = server
        .create_interface(&token, json!({ "name": "a", "method": "GET", "url": "https://a.example" }))
        .await?;

    let (status, _) = server
        .call(Method::PUT, &format!("/interface/{}/status?status=0", id), &token, None)
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .call(
            Method::PUT,
            &format!("/interface/{}", id),
            &token,
            Some(json!({ "name": "renamed", "method": "DELETE", "url": "https://b.example" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["name"], "renamed");
    assert_eq!(body["data"]["status"], 0);

    let (status, _) = server
        .call(
            Method::PUT,
            "/interface/9999",
            &token,
            Some(json!({ "name": "x", "method": "GET", "url": "https://b.example" })),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn status_only_accepts_zero_or_one() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let id = server
        .create_interface(&token, json!({ "name": "a", "method": "GET", "url": "https://a.example" }))
        .await?;

    let (status, _) = server
        .call(Method::PUT, &format!("/interface/{}/status?status=2", id), &token, None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .call(Method::PUT, &format!("/interface/{}/status", id), &token, None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn copy_creates_enabled_duplicate() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let id = server
        .create_interface(&token, lookup_form("https://upstream.example/users"))
        .await?;
    server
        .call(Method::PUT, &format!("/interface/{}/status?status=0", id), &token, None)
        .await?;

    let (status, body) = server
        .call(Method::POST, &format!("/interface/{}/copy", id), &token, None)
        .await?;
    assert_eq!(status, StatusCode::OK);

    let copy = &body["data"];
    assert_ne!(copy["id"], id);
    assert_eq!(copy["name"], "user lookup_copy");
    assert_eq!(copy["status"], 1);
    assert_eq!(copy["bodyParams"][0]["name"], "uid");

    Ok(())
}

#[tokio::test]
async fn delete_removes_interface() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let id = server
        .create_interface(&token, json!({ "name": "a", "method": "GET", "url": "https://a.example" }))
        .await?;

    let path = format!("/interface/{}", id);
    let (status, body) = server.call(Method::DELETE, &path, &token, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, _) = server.call(Method::GET, &path, &token, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.call(Method::DELETE, &path, &token, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn oversized_list_inputs_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;

    let (status, body) = server
        .call(
            Method::GET,
            &format!("/interface/most/used?days={}", i64::MAX),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "days is out of range");

    let (status, _) = server
        .call(
            Method::GET,
            &format!("/interface/list?page={}&size=10", i64::MAX),
            &token,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}
