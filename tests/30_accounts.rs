mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use golden_turf::auth::{CredentialStore, Role};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn account_routes_need_the_profiles_permission() -> Result<()> {
    let app = TestApp::new()?;
    app.seed_user("ada@example.com", "Turf4Ever", Role::User, "clients").await?;
    let token = app.login("ada@example.com", "Turf4Ever").await?;

    let anonymous = app.get("/api/accounts", None).await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let denied = app.get("/api/accounts", Some(&token)).await?;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let create = app
        .send(
            Method::POST,
            "/api/accounts",
            Some(&token),
            Some(json!({ "name": "Eve", "email": "eve@example.com", "password": "Turf4Ever", "role": "admin" })),
        )
        .await?;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
    assert_eq!(app.credentials.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn profiles_holders_create_accounts_with_a_role() -> Result<()> {
    let app = TestApp::new()?;
    app.seed_user("hr@example.com", "Turf4Ever", Role::User, "profiles").await?;
    let token = app.login("hr@example.com", "Turf4Ever").await?;

    let res = app
        .send(
            Method::POST,
            "/api/accounts",
            Some(&token),
            Some(json!({ "name": "ada lovelace", "email": "Ada@Example.com", "password": "Engine1843", "role": "admin" })),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["data"]["name"], "Ada Lovelace");
    assert_eq!(res.body["data"]["role"], "admin");

    let list = app.get("/api/accounts", Some(&token)).await?;
    assert_eq!(list.status, StatusCode::OK);
    let emails: Vec<&str> = list.body["data"]
        .as_array()
        .map(|accounts| accounts.iter().filter_map(|a| a["email"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(emails, vec!["hr@example.com", "ada@example.com"]);

    app.login("ada@example.com", "Engine1843").await?;
    Ok(())
}

#[tokio::test]
async fn editing_an_account_revokes_its_sessions() -> Result<()> {
    let app = TestApp::new()?;
    app.seed_user("boss@example.com", "Boss4Ever", Role::Admin, "").await?;
    let ada = app.seed_user("ada@example.com", "Turf4Ever", Role::User, "dashboard").await?;
    let admin = app.login("boss@example.com", "Boss4Ever").await?;
    let user = app.login("ada@example.com", "Turf4Ever").await?;

    let res = app
        .send(
            Method::PUT,
            &format!("/api/accounts/{ada}"),
            Some(&admin),
            Some(json!({ "name": "Ada", "email": "ada@example.com", "permissions": ["invoice", "clients"] })),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["permissions"], json!(["clients", "invoice"]));

    let stale = app.get("/api/auth/whoami", Some(&user)).await?;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let user = app.login("ada@example.com", "Turf4Ever").await?;
    let granted = app.get("/api/auth/permissions/invoice", Some(&user)).await?;
    assert_eq!(granted.status, StatusCode::OK);

    let still_admin = app.get("/api/auth/whoami", Some(&admin)).await?;
    assert_eq!(still_admin.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_modules_are_rejected() -> Result<()> {
    let app = TestApp::new()?;
    app.seed_user("boss@example.com", "Boss4Ever", Role::Admin, "").await?;
    let ada = app.seed_user("ada@example.com", "Turf4Ever", Role::User, "").await?;
    let admin = app.login("boss@example.com", "Boss4Ever").await?;

    let res = app
        .send(
            Method::PUT,
            &format!("/api/accounts/{ada}"),
            Some(&admin),
            Some(json!({ "name": "Ada", "email": "ada@example.com", "permissions": ["payroll"] })),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["field_errors"][0]["field"], "permissions");
    assert_eq!(res.body["field_errors"][0]["kind"], "choice");
    Ok(())
}

#[tokio::test]
async fn toggling_admin_swaps_role_and_logs_the_account_out() -> Result<()> {
    let app = TestApp::new()?;
    app.seed_user("boss@example.com", "Boss4Ever", Role::Admin, "").await?;
    let ada = app.seed_user("ada@example.com", "Turf4Ever", Role::User, "").await?;
    let admin = app.login("boss@example.com", "Boss4Ever").await?;
    let user = app.login("ada@example.com", "Turf4Ever").await?;

    let res = app
        .send(Method::POST, &format!("/api/accounts/{ada}/toggle-admin"), Some(&admin), None)
        .await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["role"], "admin");

    let stale = app.get("/api/auth/whoami", Some(&user)).await?;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let missing = app
        .send(Method::POST, "/api/accounts/999/toggle-admin", Some(&admin), None)
        .await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_the_last_admin_promotes_the_oldest_account() -> Result<()> {
    let app = TestApp::new()?;
    let first = app.seed_user("first@example.com", "Turf4Ever", Role::User, "").await?;
    let boss = app.seed_user("boss@example.com", "Boss4Ever", Role::Admin, "").await?;
    let admin = app.login("boss@example.com", "Boss4Ever").await?;

    let res = app
        .send(Method::DELETE, &format!("/api/accounts/{boss}"), Some(&admin), None)
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(app.sessions.len().await, 0);

    let promoted = app
        .credentials
        .find_credential_by_id(first)
        .await?
        .map(|record| record.role);
    assert_eq!(promoted, Some(Role::Admin));

    let again = app
        .send(Method::DELETE, &format!("/api/accounts/{boss}"), Some(&admin), None)
        .await?;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
