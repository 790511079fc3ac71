//! HTTP-level tests for the league circuit: stages, divisions, enrollments,
//! draws, results, standings, replacements and movements.

mod common;

use axum::Router;
use common::{
    body_json, create_player, delete_auth, get_auth, post_json_auth, put_json_auth, user_token,
};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_stage(app: &Router, token: &str, name: &str) -> i64 {
    let body = json!({
        "name": name,
        "starts_on": "2026-03-01",
        "ends_on": "2026-05-31",
        "min_matches": 0
    });
    let response = post_json_auth(app, "/api/v1/circuit/stages", body, token).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_division(app: &Router, token: &str, stage_id: i64, level: i32) -> i64 {
    let uri = format!("/api/v1/circuit/stages/{stage_id}/divisions");
    let body = json!({ "name": format!("Division {level}"), "level": level });
    let response = post_json_auth(app, &uri, body, token).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn enroll(app: &Router, token: &str, stage_id: i64, body: Value) -> Value {
    let uri = format!("/api/v1/circuit/stages/{stage_id}/enrollments");
    let response = post_json_auth(app, &uri, body, token).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"].clone()
}

async fn set_stage_status(app: &Router, token: &str, stage_id: i64, status: &str) -> u16 {
    let uri = format!("/api/v1/circuit/stages/{stage_id}/status");
    post_json_auth(app, &uri, json!({ "status": status }), token)
        .await
        .status()
        .as_u16()
}

/// Enroll `count` new players as active in `division_id`.
async fn fill_division(
    pool: &PgPool,
    app: &Router,
    token: &str,
    stage_id: i64,
    division_id: i64,
    prefix: &str,
    count: usize,
) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let player = create_player(pool, prefix, &format!("Player{i}"), None).await;
        let enrollment = enroll(
            app,
            token,
            stage_id,
            json!({ "player_id": player.id, "division_id": division_id }),
        )
        .await;
        ids.push(enrollment["id"].as_i64().unwrap());
    }
    ids
}

// ---------------------------------------------------------------------------
// Stages and divisions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn stage_defaults_and_lifecycle(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;

    let stage_id = create_stage(&app, &token, "Apertura").await;
    let uri = format!("/api/v1/circuit/stages/{stage_id}");
    let json = body_json(get_auth(&app, &uri, &token).await).await;
    assert_eq!(json["data"]["status"], "planned");
    assert_eq!(json["data"]["quota_mode"], "fixed");
    assert_eq!(json["data"]["promotion_quota"], 2);
    assert_eq!(json["data"]["relegation_quota"], 2);

    // planned -> finished skips a step.
    assert_eq!(set_stage_status(&app, &token, stage_id, "finished").await, 409);
    assert_eq!(set_stage_status(&app, &token, stage_id, "active").await, 200);
    assert_eq!(set_stage_status(&app, &token, stage_id, "finished").await, 200);

    // Finished stages are read-only.
    let uri = format!("/api/v1/circuit/stages/{stage_id}");
    let response = put_json_auth(&app, &uri, json!({ "name": "Renamed" }), &token).await;
    assert_eq!(response.status(), 409);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_stage_input_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;

    let body = json!({ "name": "Bad", "starts_on": "2026-05-01", "ends_on": "2026-03-01" });
    let response = post_json_auth(&app, "/api/v1/circuit/stages", body, &token).await;
    assert_eq!(response.status(), 400);

    let body = json!({
        "name": "Bad", "starts_on": "2026-03-01", "ends_on": "2026-05-01",
        "quota_mode": "percentage", "promotion_quota": 150
    });
    let response = post_json_auth(&app, "/api/v1/circuit/stages", body, &token).await;
    assert_eq!(response.status(), 400);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn division_levels_are_unique_per_stage(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;

    create_division(&app, &token, stage_id, 1).await;
    let uri = format!("/api/v1/circuit/stages/{stage_id}/divisions");
    let response =
        post_json_auth(&app, &uri, json!({ "name": "Again", "level": 1 }), &token).await;
    assert_eq!(response.status(), 409);

    let response = post_json_auth(&app, &uri, json!({ "name": "Zero", "level": 0 }), &token).await;
    assert_eq!(response.status(), 400);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn division_with_active_players_cannot_be_deleted(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "root", "admin").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;
    let division_id = create_division(&app, &token, stage_id, 1).await;
    fill_division(&pool, &app, &token, stage_id, division_id, "Del", 1).await;

    let uri = format!("/api/v1/circuit/divisions/{division_id}");
    let response = delete_auth(&app, &uri, &token).await;
    assert_eq!(response.status(), 409);
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn enrollment_rules(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;
    let other_stage = create_stage(&app, &token, "Clausura").await;
    let foreign_division = create_division(&app, &token, other_stage, 1).await;
    let division_id = create_division(&app, &token, stage_id, 1).await;
    let player = create_player(&pool, "Lola", "Mora", None).await;
    let uri = format!("/api/v1/circuit/stages/{stage_id}/enrollments");

    // Active without a division.
    let response = post_json_auth(&app, &uri, json!({ "player_id": player.id }), &token).await;
    assert_eq!(response.status(), 400);

    // Division of another stage.
    let body = json!({ "player_id": player.id, "division_id": foreign_division });
    let response = post_json_auth(&app, &uri, body, &token).await;
    assert_eq!(response.status(), 400);

    let body = json!({ "player_id": player.id, "division_id": division_id });
    let response = post_json_auth(&app, &uri, body.clone(), &token).await;
    assert_eq!(response.status(), 201);

    // One enrollment per player per stage.
    let response = post_json_auth(&app, &uri, body, &token).await;
    assert_eq!(response.status(), 409);

    // A substitute needs no division.
    let sub = create_player(&pool, "Suplente", "Uno", None).await;
    let body = json!({ "player_id": sub.id, "status": "substitute" });
    let response = post_json_auth(&app, &uri, body, &token).await;
    assert_eq!(response.status(), 201);

    let response = get_auth(&app, &format!("{uri}?status=substitute"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["player_name"], "Suplente Uno");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn enrollment_with_pending_matches_stays_put(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;
    let top = create_division(&app, &token, stage_id, 1).await;
    let second = create_division(&app, &token, stage_id, 2).await;
    fill_division(&pool, &app, &token, stage_id, top, "Busy", 4).await;
    assert_eq!(set_stage_status(&app, &token, stage_id, "active").await, 200);

    let uri = format!("/api/v1/circuit/divisions/{top}/match-days");
    let day = body_json(post_json_auth(&app, &uri, json!({}), &token).await).await;
    let day_id = day["data"]["id"].as_i64().unwrap();
    let draw_uri = format!("/api/v1/circuit/match-days/{day_id}/draw");
    let drawn = body_json(
        post_json_auth(&app, &draw_uri, json!({ "mode": "random", "seed": 1 }), &token).await,
    )
    .await;
    let m = &drawn["data"]["matches"][0];
    let match_id = m["id"].as_i64().unwrap();
    let busy = m["team_a_player1"].as_i64().unwrap();
    let enrollment_uri = format!("/api/v1/circuit/enrollments/{busy}");

    let response =
        put_json_auth(&app, &enrollment_uri, json!({ "division_id": second }), &token).await;
    assert_eq!(response.status(), 409);
    let response =
        put_json_auth(&app, &enrollment_uri, json!({ "status": "substitute" }), &token).await;
    assert_eq!(response.status(), 409);

    // Restating the current placement is not a move.
    let response =
        put_json_auth(&app, &enrollment_uri, json!({ "division_id": top }), &token).await;
    assert_eq!(response.status(), 200);

    let result_uri = format!("/api/v1/circuit/matches/{match_id}/result");
    let response =
        put_json_auth(&app, &result_uri, json!({ "games_a": 6, "games_b": 4 }), &token).await;
    assert_eq!(response.status(), 200);

    let response =
        put_json_auth(&app, &enrollment_uri, json!({ "division_id": second }), &token).await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await["data"]["division_id"], second);
}

// ---------------------------------------------------------------------------
// Draw, results and standings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn draw_requires_an_active_stage_and_four_players(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;
    let division_id = create_division(&app, &token, stage_id, 1).await;
    fill_division(&pool, &app, &token, stage_id, division_id, "Few", 3).await;

    let uri = format!("/api/v1/circuit/divisions/{division_id}/match-days");
    let response = post_json_auth(&app, &uri, json!({}), &token).await;
    assert_eq!(response.status(), 201);
    let day_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let draw_uri = format!("/api/v1/circuit/match-days/{day_id}/draw");

    let response = post_json_auth(&app, &draw_uri, json!({ "mode": "random" }), &token).await;
    assert_eq!(response.status(), 409, "stage is still planned");

    assert_eq!(set_stage_status(&app, &token, stage_id, "active").await, 200);
    let response = post_json_auth(&app, &draw_uri, json!({ "mode": "random" }), &token).await;
    assert_eq!(response.status(), 400, "only three players");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn draw_result_and_standings(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;
    let division_id = create_division(&app, &token, stage_id, 1).await;
    fill_division(&pool, &app, &token, stage_id, division_id, "Draw", 5).await;
    assert_eq!(set_stage_status(&app, &token, stage_id, "active").await, 200);

    let uri = format!("/api/v1/circuit/divisions/{division_id}/match-days");
    let response = post_json_auth(&app, &uri, json!({ "played_on": "2026-03-07" }), &token).await;
    let day = body_json(response).await;
    assert_eq!(day["data"]["round_number"], 1);
    let day_id = day["data"]["id"].as_i64().unwrap();

    let draw_uri = format!("/api/v1/circuit/match-days/{day_id}/draw");
    let response =
        post_json_auth(&app, &draw_uri, json!({ "mode": "random", "seed": 42 }), &token).await;
    assert_eq!(response.status(), 200);
    let drawn = body_json(response).await;
    assert_eq!(drawn["data"]["status"], "drawn");
    assert_eq!(drawn["data"]["draw_mode"], "random");
    assert_eq!(drawn["data"]["matches"].as_array().unwrap().len(), 1);
    assert_eq!(drawn["data"]["byes"].as_array().unwrap().len(), 1);

    // Redrawing before any result replaces the draw.
    let response = post_json_auth(&app, &draw_uri, json!({ "mode": "ranking" }), &token).await;
    assert_eq!(response.status(), 200);
    let drawn = body_json(response).await;
    let m = &drawn["data"]["matches"][0];
    let match_id = m["id"].as_i64().unwrap();
    let winners = [
        m["team_a_player1"].as_i64().unwrap(),
        m["team_a_player2"].as_i64().unwrap(),
    ];

    let result_uri = format!("/api/v1/circuit/matches/{match_id}/result");
    let response = put_json_auth(
        &app,
        &result_uri,
        json!({ "games_a": 6, "games_b": 3, "forfeited_side": "x" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), 400);

    let body = json!({ "games_a": 6, "games_b": 3 });
    let response = put_json_auth(&app, &result_uri, body, &token).await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await["data"]["status"], "played");

    // The day is complete once its only match has a result.
    let response = get_auth(&app, &format!("/api/v1/circuit/match-days/{day_id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "played");
    assert_eq!(json["data"]["byes"].as_array().unwrap().len(), 1);

    // No redraw after results.
    let response = post_json_auth(&app, &draw_uri, json!({ "mode": "random" }), &token).await;
    assert_eq!(response.status(), 409);

    let uri = format!("/api/v1/circuit/divisions/{division_id}/standings");
    let json = body_json(get_auth(&app, &uri, &token).await).await;
    let rows = json["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    let leaders: Vec<i64> = rows[..2]
        .iter()
        .map(|r| r["enrollment_id"].as_i64().unwrap())
        .collect();
    assert!(leaders.contains(&winners[0]) && leaders.contains(&winners[1]));
    assert_eq!(rows[0]["points"], 3);
    assert_eq!(rows[0]["played"], 1);
    assert_eq!(rows[0]["position"], 1);
    assert_eq!(rows[4]["played"], 0);
}

// ---------------------------------------------------------------------------
// Replacements
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn withdrawal_brings_in_substitute_with_inheritance(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;
    let division_id = create_division(&app, &token, stage_id, 1).await;
    let lower_division = create_division(&app, &token, stage_id, 2).await;
    fill_division(&pool, &app, &token, stage_id, division_id, "Rep", 4).await;

    let far = create_player(&pool, "Far", "Sub", None).await;
    let far = enroll(
        &app,
        &token,
        stage_id,
        json!({ "player_id": far.id, "division_id": lower_division, "status": "substitute" }),
    )
    .await;
    let near = create_player(&pool, "Near", "Sub", None).await;
    let near = enroll(
        &app,
        &token,
        stage_id,
        json!({ "player_id": near.id, "division_id": division_id, "status": "substitute" }),
    )
    .await;
    assert_eq!(set_stage_status(&app, &token, stage_id, "active").await, 200);

    let uri = format!(
        "/api/v1/circuit/stages/{stage_id}/replacement-candidates?division_id={division_id}"
    );
    let json = body_json(get_auth(&app, &uri, &token).await).await;
    let candidates = json["data"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["enrollment_id"], near["id"]);
    assert_eq!(candidates[1]["enrollment_id"], far["id"]);

    // Play one match so the withdrawn player has something to pass on.
    let uri = format!("/api/v1/circuit/divisions/{division_id}/match-days");
    let response = post_json_auth(&app, &uri, json!({}), &token).await;
    let day_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let draw_uri = format!("/api/v1/circuit/match-days/{day_id}/draw");
    let response = post_json_auth(&app, &draw_uri, json!({ "mode": "ranking" }), &token).await;
    let drawn = body_json(response).await;
    let m = &drawn["data"]["matches"][0];
    let winner = m["team_a_player1"].as_i64().unwrap();
    let result_uri = format!("/api/v1/circuit/matches/{}/result", m["id"]);
    let body = json!({ "games_a": 6, "games_b": 2 });
    let response = put_json_auth(&app, &result_uri, body, &token).await;
    assert_eq!(response.status(), 200);

    let uri = format!("/api/v1/circuit/enrollments/{winner}/withdraw");
    let response = post_json_auth(&app, &uri, json!({}), &token).await;
    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    assert_eq!(json["data"]["withdrawn"]["status"], "withdrawn");
    let replacement = &json["data"]["replacement"];
    assert_eq!(replacement["id"], near["id"]);
    assert_eq!(replacement["status"], "active");
    assert_eq!(replacement["division_id"], division_id);
    assert_eq!(replacement["inherited_points"], 3);
    assert_eq!(replacement["inherited_matches"], 1);
    assert_eq!(replacement["replaces_enrollment_id"], winner);

    // The substitute now shows in the standings with the inherited record.
    let uri = format!("/api/v1/circuit/divisions/{division_id}/standings");
    let json = body_json(get_auth(&app, &uri, &token).await).await;
    let rows = json["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    let row = rows
        .iter()
        .find(|r| r["enrollment_id"] == near["id"])
        .expect("substitute should be ranked");
    assert_eq!(row["points"], 3);
    assert_eq!(row["played"], 1);

    // Withdrawing twice is a conflict.
    let uri = format!("/api/v1/circuit/enrollments/{winner}/withdraw");
    let response = post_json_auth(&app, &uri, json!({}), &token).await;
    assert_eq!(response.status(), 409);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn withdrawal_without_inheritance_or_replacement(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;
    let division_id = create_division(&app, &token, stage_id, 1).await;
    let active = fill_division(&pool, &app, &token, stage_id, division_id, "Wd", 2).await;
    let sub = create_player(&pool, "Only", "Sub", None).await;
    let body = json!({ "player_id": sub.id, "status": "substitute" });
    let sub = enroll(&app, &token, stage_id, body).await;

    let uri = format!("/api/v1/circuit/enrollments/{}/withdraw", active[0]);
    let response = post_json_auth(&app, &uri, json!({ "skip_replacement": true }), &token).await;
    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    assert!(json["data"]["replacement"].is_null());

    let uri = format!("/api/v1/circuit/enrollments/{}/withdraw", active[1]);
    let body = json!({ "inherit": false, "replacement_enrollment_id": sub["id"] });
    let response = post_json_auth(&app, &uri, body, &token).await;
    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    assert_eq!(json["data"]["replacement"]["inherited_points"], 0);
    assert_eq!(json["data"]["replacement"]["division_id"], division_id);
}

// ---------------------------------------------------------------------------
// Movements
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn movements_preview_and_apply(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = user_token(&pool, &app, "coach", "coach").await;
    let stage_id = create_stage(&app, &token, "Apertura").await;
    let top = create_division(&app, &token, stage_id, 1).await;
    let bottom = create_division(&app, &token, stage_id, 2).await;
    fill_division(&pool, &app, &token, stage_id, top, "Top", 4).await;
    fill_division(&pool, &app, &token, stage_id, bottom, "Bottom", 4).await;

    let uri = format!("/api/v1/circuit/stages/{stage_id}/movements/preview");
    let json = body_json(get_auth(&app, &uri, &token).await).await;
    let movements = json["data"]["movements"].as_array().unwrap();
    assert_eq!(movements.len(), 8);
    let count = |kind: &str| movements.iter().filter(|m| m["kind"] == kind).count();
    assert_eq!(count("promotion"), 2);
    assert_eq!(count("relegation"), 2);
    assert_eq!(count("stay"), 4);

    let next_stage = create_stage(&app, &token, "Clausura").await;
    let apply_uri = format!("/api/v1/circuit/stages/{stage_id}/movements/apply");
    let body = json!({ "target_stage_id": next_stage });

    // Source stage must be finished.
    let response = post_json_auth(&app, &apply_uri, body.clone(), &token).await;
    assert_eq!(response.status(), 409);
    assert_eq!(set_stage_status(&app, &token, stage_id, "active").await, 200);
    assert_eq!(set_stage_status(&app, &token, stage_id, "finished").await, 200);

    // Target stage needs matching division levels.
    let response = post_json_auth(&app, &apply_uri, body.clone(), &token).await;
    assert_eq!(response.status(), 409);
    let next_top = create_division(&app, &token, next_stage, 1).await;
    create_division(&app, &token, next_stage, 2).await;

    let response = post_json_auth(&app, &apply_uri, body.clone(), &token).await;
    assert_eq!(response.status(), 201);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 8);

    // Next stage is seeded: two stay in the top division, two come up.
    let uri = format!("/api/v1/circuit/stages/{next_stage}/enrollments?division_id={next_top}");
    let json = body_json(get_auth(&app, &uri, &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 4);

    let response = post_json_auth(&app, &apply_uri, body, &token).await;
    assert_eq!(response.status(), 409, "movements apply once");

    let uri = format!("/api/v1/circuit/stages/{stage_id}/movements");
    let json = body_json(get_auth(&app, &uri, &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 8);
}
