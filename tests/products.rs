mod common;

use anyhow::Result;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_then_get_round_trips_fields() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let cat_id = app.create_category("Stationery").await?;
    let auth = app.bearer().await?;
    let input = json!({ "name": "Pen", "price": 2.5, "cat_id": cat_id, "image": "pen.png" });

    let resp = app.client.post(app.url("/products")).json(&input).send().await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    let id = created["id"].as_i64().expect("generated id");

    let resp = app
        .client
        .get(app.url(&format!("/products/{}", id)))
        .header("authorization", &auth)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await?;
    assert_eq!(
        fetched,
        json!({ "id": id, "name": "Pen", "price": 2.5, "cat_id": cat_id, "image": "pen.png" })
    );
    app.cleanup().await
}

#[tokio::test]
async fn incomplete_product_is_rejected() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let resp = app.client.post(app.url("/products")).json(&json!({ "name": "Pen" })).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Product name, price, and category ID are required!");
    app.cleanup().await
}

#[tokio::test]
async fn unknown_ids_are_404_not_500() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let cat_id = app.create_category("Misc").await?;
    let auth = app.bearer().await?;
    let url = app.url("/products/999999");

    let get = app.client.get(&url).header("authorization", &auth).send().await?;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);

    let put = app
        .client
        .put(&url)
        .header("authorization", &auth)
        .json(&json!({ "name": "X", "price": 1, "cat_id": cat_id }))
        .send()
        .await?;
    assert_eq!(put.status(), StatusCode::NOT_FOUND);

    let del = app.client.delete(&url).header("authorization", &auth).send().await?;
    assert_eq!(del.status(), StatusCode::NOT_FOUND);
    let body: Value = del.json().await?;
    assert_eq!(body["message"], "Not found product with id 999999.");
    app.cleanup().await
}

#[tokio::test]
async fn hard_delete_is_final() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let cat_id = app.create_category("Misc").await?;
    let auth = app.bearer().await?;
    let created: Value = app
        .client
        .post(app.url("/products"))
        .json(&json!({ "name": "Cup", "price": 0, "cat_id": cat_id }))
        .send()
        .await?
        .json()
        .await?;
    let url = app.url(&format!("/products/{}", created["id"]));

    let first = app.client.delete(&url).header("authorization", &auth).send().await?;
    assert_eq!(first.status(), StatusCode::OK);
    let body: Value = first.json().await?;
    assert_eq!(body["message"], "Product was deleted successfully!");

    let list: Vec<Value> = app.client.get(app.url("/products")).send().await?.json().await?;
    assert!(list.is_empty());

    let second = app.client.delete(&url).header("authorization", &auth).send().await?;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    app.cleanup().await
}

#[tokio::test]
async fn delete_all_empties_the_list() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let cat_id = app.create_category("Misc").await?;
    let auth = app.bearer().await?;
    for name in ["A", "B", "C"] {
        let resp = app
            .client
            .post(app.url("/products"))
            .json(&json!({ "name": name, "price": 1.25, "cat_id": cat_id }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app.client.delete(app.url("/products")).header("authorization", &auth).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let list: Vec<Value> = app.client.get(app.url("/products")).send().await?.json().await?;
    assert_eq!(list, Vec::<Value>::new());
    app.cleanup().await
}

#[tokio::test]
async fn protected_routes_check_credentials() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let missing = app.client.delete(app.url("/products")).send().await?;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let invalid = app
        .client
        .delete(app.url("/products"))
        .header("authorization", "Bearer not.a.token")
        .send()
        .await?;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let body: Value = invalid.json().await?;
    assert_eq!(body["message"], "Invalid access token.");
    app.cleanup().await
}

#[tokio::test]
async fn unknown_category_reference_is_a_store_error() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let resp = app
        .client
        .post(app.url("/products"))
        .json(&json!({ "name": "Orphan", "price": 1, "cat_id": 987654 }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await?;
    assert!(body["message"].as_str().unwrap_or_default().contains("foreign key"));
    app.cleanup().await
}
