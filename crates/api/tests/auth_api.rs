//! HTTP-level tests for authentication, RBAC and admin user management.

mod common;

use common::{
    body_json, create_user, delete_auth, get, get_auth, login, post_json, post_json_auth,
    put_json_auth, user_token, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Login, refresh, logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_and_user(pool: PgPool) {
    let user = create_user(&pool, "ana", "coach").await;
    let app = common::build_test_app(pool);

    let body = json!({ "username": "ana", "password": TEST_PASSWORD });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 200);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let data = &json["data"];
    assert!(data["access_token"].is_string());
    assert_eq!(data["refresh_token"].as_str().unwrap().len(), 64);
    assert_eq!(data["user"]["id"], user.id);
    assert_eq!(data["user"]["role"], "coach");
    assert!(data["user"]["player_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_accepts_email(pool: PgPool) {
    create_user(&pool, "bruno", "player").await;
    let app = common::build_test_app(pool);

    let body = json!({ "username": "bruno@test.com", "password": TEST_PASSWORD });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 200);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_is_401_with_error_envelope(pool: PgPool) {
    create_user(&pool, "carla", "player").await;
    let app = common::build_test_app(pool);

    let body = json!({ "username": "carla", "password": "not-the-password" });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 401);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_locks_after_five_failures(pool: PgPool) {
    create_user(&pool, "dario", "player").await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let body = json!({ "username": "dario", "password": "wrong" });
        let response = post_json(&app, "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), 401);
    }

    let body = json!({ "username": "dario", "password": TEST_PASSWORD });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 403);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    create_user(&pool, "eva", "player").await;
    let app = common::build_test_app(pool);

    let body = json!({ "username": "eva", "password": TEST_PASSWORD });
    let json = body_json(post_json(&app, "/api/v1/auth/login", body).await).await;
    let refresh_token = json["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), 200);

    // The old token was revoked by the rotation.
    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), 401);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_sessions(pool: PgPool) {
    create_user(&pool, "fede", "player").await;
    let app = common::build_test_app(pool);

    let body = json!({ "username": "fede", "password": TEST_PASSWORD });
    let json = body_json(post_json(&app, "/api/v1/auth/login", body).await).await;
    let access = json["data"]["access_token"].as_str().unwrap().to_string();
    let refresh_token = json["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = post_json_auth(&app, "/api/v1/auth/logout", json!({}), &access).await;
    assert_eq!(response.status(), 204);

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), 401);
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_routes_require_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(&app, "/api/v1/circuit/stages").await;
    assert_eq!(response.status(), 401);

    let response = get_auth(&app, "/api/v1/circuit/stages", "garbage").await;
    assert_eq!(response.status(), 401);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn players_cannot_manage_users_or_circuit(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "gabi", "player").await;

    let response = get_auth(&app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), 403);

    let body = json!({ "name": "Etapa", "starts_on": "2026-03-01", "ends_on": "2026-05-01" });
    let response = post_json_auth(&app, "/api/v1/circuit/stages", body, &token).await;
    assert_eq!(response.status(), 403);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn coaches_are_staff_but_not_admin(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "hugo", "coach").await;

    let body = json!({ "name": "Etapa", "starts_on": "2026-03-01", "ends_on": "2026-05-01" });
    let response = post_json_auth(&app, "/api/v1/circuit/stages", body, &token).await;
    assert_eq!(response.status(), 201);

    let response = get_auth(&app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), 403);
}

// ---------------------------------------------------------------------------
// Admin user management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_and_lists_users(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "root", "admin").await;

    let body = json!({
        "username": "ines",
        "email": "ines@test.com",
        "password": "a-long-enough-password",
        "role": "coach"
    });
    let response = post_json_auth(&app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), 201);
    let created = body_json(response).await;
    assert_eq!(created["data"]["role"], "coach");

    let response = get_auth(&app, "/api/v1/admin/users", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weak_password_and_duplicate_username_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "root", "admin").await;

    let body = json!({
        "username": "juan", "email": "juan@test.com", "password": "short", "role": "player"
    });
    let response = post_json_auth(&app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), 400);

    let body = json!({
        "username": "root", "email": "other@test.com",
        "password": "a-long-enough-password", "role": "player"
    });
    let response = post_json_auth(&app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), 409);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_user_cannot_log_in(pool: PgPool) {
    let target = create_user(&pool, "karen", "player").await;
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "root", "admin").await;

    let uri = format!("/api/v1/admin/users/{}", target.id);
    let response = delete_auth(&app, &uri, &token).await;
    assert_eq!(response.status(), 204);

    let body = json!({ "username": "karen", "password": TEST_PASSWORD });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 403);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_password_allows_new_login(pool: PgPool) {
    let target = create_user(&pool, "luis", "player").await;
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "root", "admin").await;

    let uri = format!("/api/v1/admin/users/{}/reset-password", target.id);
    let body = json!({ "new_password": "brand-new-password-1" });
    let response = post_json_auth(&app, &uri, body, &token).await;
    assert_eq!(response.status(), 204);

    let body = json!({ "username": "luis", "password": "brand-new-password-1" });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 200);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_updates_role(pool: PgPool) {
    let target = create_user(&pool, "mora", "player").await;
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "root", "admin").await;

    let uri = format!("/api/v1/admin/users/{}", target.id);
    let response = put_json_auth(&app, &uri, json!({ "role": "coach" }), &token).await;
    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "coach");

    // New role is effective on the next login.
    let token = login(&app, "mora").await;
    let response = get_auth(&app, "/api/v1/players", &token).await;
    assert_eq!(response.status(), 200);
}
