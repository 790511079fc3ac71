use chrono::{Duration, Utc};
use padel_db::models::session::CreateSession;
use padel_db::models::user::CreateUser;
use padel_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use sqlx::PgPool;

async fn new_user(pool: &PgPool) -> i64 {
    let role = RoleRepo::find_by_name(pool, "player").await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            username: "sofia".into(),
            email: "sofia@club.test".into(),
            password_hash: "not-a-real-hash".into(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
    .id
}

fn session(user_id: i64, hash: &str, expires_in: Duration) -> CreateSession {
    CreateSession {
        user_id,
        refresh_token_hash: hash.into(),
        expires_at: Utc::now() + expires_in,
        user_agent: Some("tests".into()),
        ip_address: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_token_can_be_consumed_once(pool: PgPool) {
    let user_id = new_user(&pool).await;
    SessionRepo::create(&pool, &session(user_id, "hash-1", Duration::days(1)))
        .await
        .unwrap();

    let first = SessionRepo::consume_refresh_token(&pool, "hash-1").await.unwrap();
    assert_eq!(first.map(|s| s.user_id), Some(user_id));

    let second = SessionRepo::consume_refresh_token(&pool, "hash-1").await.unwrap();
    assert!(second.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_session_is_not_consumed_and_gets_cleaned(pool: PgPool) {
    let user_id = new_user(&pool).await;
    SessionRepo::create(&pool, &session(user_id, "old", -Duration::hours(1)))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session(user_id, "live", Duration::days(1)))
        .await
        .unwrap();

    assert!(SessionRepo::consume_refresh_token(&pool, "old").await.unwrap().is_none());
    assert_eq!(SessionRepo::cleanup_for_user(&pool, user_id).await.unwrap(), 1);
    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_names_resolve(pool: PgPool) {
    let roles = RoleRepo::list(&pool).await.unwrap();
    assert_eq!(roles.len(), 3);
    let coach = RoleRepo::find_by_name(&pool, "coach").await.unwrap().unwrap();
    assert_eq!(RoleRepo::name_of(&pool, coach.id).await.unwrap(), "coach");
    assert!(RoleRepo::find_by_name(&pool, "referee").await.unwrap().is_none());
}
