mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn valid_values_come_back_normalized() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .post(
            "/validate",
            json!({
                "rules": [
                    { "kind": "email", "field": "email" },
                    { "kind": "name", "field": "name" },
                    { "kind": "integer", "field": "quantity", "constraints": { "min": 1, "max": 99 } },
                    { "kind": "decimal", "field": "price", "constraints": { "excess_precision": "round" } },
                    { "kind": "string", "field": "notes", "constraints": { "max_length": 50 } },
                    { "kind": "phone", "field": "phone", "required": false },
                    { "kind": "date", "field": "due" },
                    { "kind": "choice", "field": "status", "constraints": { "choices": ["paid", "unpaid"] } }
                ],
                "values": {
                    "email": " Owner@GoldenTurf.com ",
                    "name": "mary-jane o'neil",
                    "quantity": 12,
                    "price": "4.125",
                    "notes": "Sod & seed <fast>",
                    "due": "2024-02-29",
                    "status": "paid"
                }
            }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let values = &res.body["data"]["values"];
    assert_eq!(res.body["data"]["valid"], true);
    assert_eq!(values["email"], "owner@goldenturf.com");
    assert_eq!(values["name"], "Mary-Jane O'Neil");
    assert_eq!(values["quantity"], 12);
    assert_eq!(values["price"], "4.13");
    assert_eq!(values["notes"], "Sod &amp; seed &lt;fast&gt;");
    assert_eq!(values["phone"], serde_json::Value::Null);
    assert_eq!(values["due"], "2024-02-29");
    assert_eq!(values["status"], "paid");
    Ok(())
}

#[tokio::test]
async fn every_failing_field_is_reported() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .post(
            "/validate",
            json!({
                "rules": [
                    { "kind": "email", "field": "email" },
                    { "kind": "integer", "field": "quantity", "constraints": { "max": 10 } },
                    { "kind": "date", "field": "due" },
                    { "kind": "password", "field": "password", "constraints": { "require_special": true } }
                ],
                "values": { "email": "not-an-email", "quantity": "11", "due": "2023-02-30", "password": "abc" }
            }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["success"], false);
    let kinds: Vec<(&str, &str)> = res.body["field_errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| Some((e["field"].as_str()?, e["kind"].as_str()?)))
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(
        kinds,
        vec![
            ("email", "format"),
            ("quantity", "range"),
            ("due", "format"),
            ("password", "weakness"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn unknown_rule_kind_is_rejected_as_bad_json() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .post(
            "/validate",
            json!({ "rules": [{ "kind": "telepathy", "field": "x" }], "values": {} }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn malformed_pattern_is_an_invalid_rule() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .post(
            "/validate",
            json!({
                "rules": [{ "kind": "string", "field": "code", "constraints": { "pattern": "([a-z" } }],
                "values": { "code": "abc" }
            }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["field_errors"][0]["kind"], "invalid_rule");
    Ok(())
}

#[tokio::test]
async fn non_scalar_values_are_rejected_as_bad_json() -> Result<()> {
    let app = TestApp::new()?;
    for value in [json!([1, 2]), json!({ "amount": 3 })] {
        let res = app
            .post(
                "/validate",
                json!({
                    "rules": [{ "kind": "string", "field": "notes" }],
                    "values": { "notes": value }
                }),
            )
            .await?;

        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);
        assert_eq!(res.body["code"], "INVALID_JSON");
    }
    Ok(())
}
