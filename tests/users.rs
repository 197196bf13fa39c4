mod common;

use anyhow::Result;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn signup_never_returns_password() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let resp = app
        .client
        .post(app.url("/users"))
        .json(&json!({ "email": "ann@example.test", "password": "pw" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await?;
    assert_eq!(body["email"], "ann@example.test");
    assert!(body.get("password").is_none());
    app.cleanup().await
}

#[tokio::test]
async fn login_returns_token_pair() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let creds = json!({ "email": "bob@example.test", "password": "pw" });
    app.client.post(app.url("/users")).json(&creds).send().await?;

    let resp = app.client.post(app.url("/users/login")).json(&creds).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
    app.cleanup().await
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    app.client
        .post(app.url("/users"))
        .json(&json!({ "email": "cy@example.test", "password": "right" }))
        .send()
        .await?;

    let wrong = app
        .client
        .post(app.url("/users/login"))
        .json(&json!({ "email": "cy@example.test", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body: Value = wrong.json().await?;
    assert_eq!(wrong_body["message"], "Invalid email or password.");

    let unknown = app
        .client
        .post(app.url("/users/login"))
        .json(&json!({ "email": "nobody@example.test", "password": "right" }))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body: Value = unknown.json().await?;
    assert_eq!(wrong_body, unknown_body);
    app.cleanup().await
}

#[tokio::test]
async fn duplicate_email_is_rejected_by_the_store() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let creds = json!({ "email": "dup@example.test", "password": "pw" });
    let first = app.client.post(app.url("/users")).json(&creds).send().await?;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = app.client.post(app.url("/users")).json(&creds).send().await?;
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = second.json().await?;
    assert!(body["message"].as_str().unwrap_or_default().contains("duplicate key"));
    app.cleanup().await
}

#[tokio::test]
async fn readiness_reports_store_ok() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let body: Value = app.client.get(app.url("/ready")).send().await?.json().await?;
    assert_eq!(body, json!({ "status": "ok", "database": "ok" }));
    app.cleanup().await
}
