//! Integration tests for tournaments, registrations and payments.

use chrono::NaiveDate;
use padel_core::payment::{registration_effect, PAYMENT_APPROVED, PAYMENT_PENDING};
use padel_db::models::player::CreatePlayer;
use padel_db::models::registration::NewRegistration;
use padel_db::models::tournament::CreateTournament;
use padel_db::repositories::{PaymentRepo, PlayerRepo, RegistrationRepo, TournamentRepo};
use sqlx::PgPool;
use uuid::Uuid;

async fn tournament(pool: &PgPool, fee: i64) -> i64 {
    tournament_with_capacity(pool, fee, 16).await
}

async fn tournament_with_capacity(pool: &PgPool, fee: i64, max_pairs: i32) -> i64 {
    TournamentRepo::create(
        pool,
        &CreateTournament {
            name: "Open de Otoño".into(),
            description: None,
            category: Some("4ta".into()),
            starts_on: NaiveDate::from_ymd_opt(2030, 4, 10).unwrap(),
            ends_on: None,
            registration_deadline: None,
            max_pairs: Some(max_pairs),
            entry_fee_cents: Some(fee),
        },
    )
    .await
    .unwrap()
    .id
}

async fn player(pool: &PgPool, email: &str) -> i64 {
    PlayerRepo::create(
        pool,
        &CreatePlayer {
            user_id: None,
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            email: email.into(),
            phone: None,
            category: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn registration(tournament_id: i64, player_id: i64) -> NewRegistration<'static> {
    NewRegistration {
        tournament_id,
        player_id,
        partner_id: None,
        notes: None,
        status: "pending",
        payment_status: "pending",
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tournament_lifecycle_queries(pool: PgPool) {
    let id = tournament(&pool, 0).await;
    assert!(TournamentRepo::list_public(&pool, 10).await.unwrap().is_empty());

    TournamentRepo::update_status(&pool, id, "draft", "open")
        .await
        .unwrap()
        .unwrap();
    let public = TournamentRepo::list_public(&pool, 10).await.unwrap();
    assert_eq!(public.len(), 1);

    assert!(TournamentRepo::delete(&pool, id).await.unwrap());
    assert!(TournamentRepo::find_by_id(&pool, id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_registration_creates_payment(pool: PgPool) {
    let t = tournament(&pool, 2500).await;
    let p = player(&pool, "ana@example.com").await;
    let reference = Uuid::new_v4();

    let (reg, payment) =
        RegistrationRepo::create(&pool, &registration(t, p), Some((reference, 2500)))
            .await
            .unwrap()
            .unwrap();
    let payment = payment.unwrap();
    assert_eq!(payment.registration_id, reg.id);
    assert_eq!(payment.status, PAYMENT_PENDING);
    assert_eq!(TournamentRepo::count_registered(&pool, t).await.unwrap(), 1);

    let listed = RegistrationRepo::list_for_tournament(&pool, t, None).await.unwrap();
    assert_eq!(listed[0].player_name, "Ana Pérez");
    assert!(listed[0].partner_name.is_none());

    // Same player twice is a unique violation.
    let err = RegistrationRepo::create(&pool, &registration(t, p), None)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().unwrap().constraint(),
        Some("uq_tournament_registrations_player")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_payment_transition_updates_registration(pool: PgPool) {
    let t = tournament(&pool, 2500).await;
    let p = player(&pool, "ana@example.com").await;
    let reference = Uuid::new_v4();
    let (reg, payment) =
        RegistrationRepo::create(&pool, &registration(t, p), Some((reference, 2500)))
            .await
            .unwrap()
            .unwrap();
    let payment = payment.unwrap();

    let found = PaymentRepo::find_for_webhook(&pool, "gw-1", Some(reference))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, payment.id);

    let payload = serde_json::json!({ "type": "payment" });
    let updated = PaymentRepo::apply_transition(
        &pool,
        payment.id,
        PAYMENT_PENDING,
        PAYMENT_APPROVED,
        "gw-1",
        registration_effect(PAYMENT_APPROVED),
        &payload,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.status, PAYMENT_APPROVED);
    assert_eq!(updated.external_id.as_deref(), Some("gw-1"));

    let reg = RegistrationRepo::find_by_id(&pool, reg.id).await.unwrap().unwrap();
    assert_eq!(reg.payment_status, "paid");
    assert_eq!(reg.status, "confirmed");

    // The same expected status no longer matches: nothing is written.
    let again = PaymentRepo::apply_transition(
        &pool,
        payment.id,
        PAYMENT_PENDING,
        PAYMENT_APPROVED,
        "gw-1",
        registration_effect(PAYMENT_APPROVED),
        &payload,
    )
    .await
    .unwrap();
    assert!(again.is_none());

    // Later lookups resolve by gateway id alone.
    let by_id = PaymentRepo::find_for_webhook(&pool, "gw-1", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.id, payment.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_tournament_rejects_registration(pool: PgPool) {
    let t = tournament_with_capacity(&pool, 0, 1).await;
    let ana = player(&pool, "ana@example.com").await;
    let bea = player(&pool, "bea@example.com").await;

    let (first, _) = RegistrationRepo::create(&pool, &registration(t, ana), None)
        .await
        .unwrap()
        .unwrap();
    assert!(RegistrationRepo::create(&pool, &registration(t, bea), None)
        .await
        .unwrap()
        .is_none());
    assert_eq!(TournamentRepo::count_registered(&pool, t).await.unwrap(), 1);

    // Cancelling frees the slot.
    RegistrationRepo::update_status(&pool, first.id, "cancelled")
        .await
        .unwrap()
        .unwrap();
    assert!(RegistrationRepo::create(&pool, &registration(t, bea), None)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_registrations_respect_capacity(pool: PgPool) {
    let t = tournament_with_capacity(&pool, 0, 1).await;
    let mut players = Vec::new();
    for n in 0..6 {
        players.push(player(&pool, &format!("p{n}@example.com")).await);
    }

    let handles: Vec<_> = players
        .into_iter()
        .map(|p| {
            let pool = pool.clone();
            tokio::spawn(async move {
                RegistrationRepo::create(&pool, &registration(t, p), None)
                    .await
                    .unwrap()
                    .is_some()
            })
        })
        .collect();
    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(TournamentRepo::count_registered(&pool, t).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reinstate_needs_a_free_slot(pool: PgPool) {
    let t = tournament_with_capacity(&pool, 0, 1).await;
    let ana = player(&pool, "ana@example.com").await;
    let bea = player(&pool, "bea@example.com").await;

    let (first, _) = RegistrationRepo::create(&pool, &registration(t, ana), None)
        .await
        .unwrap()
        .unwrap();
    RegistrationRepo::update_status(&pool, first.id, "cancelled")
        .await
        .unwrap()
        .unwrap();
    let (second, _) = RegistrationRepo::create(&pool, &registration(t, bea), None)
        .await
        .unwrap()
        .unwrap();

    assert!(RegistrationRepo::reinstate(&pool, first.id, t, "confirmed")
        .await
        .unwrap()
        .is_none());

    RegistrationRepo::update_status(&pool, second.id, "cancelled")
        .await
        .unwrap()
        .unwrap();
    let back = RegistrationRepo::reinstate(&pool, first.id, t, "confirmed")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(back.status, "confirmed");

    // Only a cancelled registration can be reinstated.
    RegistrationRepo::update_status(&pool, second.id, "cancelled")
        .await
        .unwrap()
        .unwrap();
    assert!(RegistrationRepo::reinstate(&pool, first.id, t, "pending")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_late_approval_keeps_cancelled_registration(pool: PgPool) {
    let t = tournament(&pool, 2500).await;
    let p = player(&pool, "ana@example.com").await;
    let (reg, payment) =
        RegistrationRepo::create(&pool, &registration(t, p), Some((Uuid::new_v4(), 2500)))
            .await
            .unwrap()
            .unwrap();
    RegistrationRepo::update_status(&pool, reg.id, "cancelled")
        .await
        .unwrap()
        .unwrap();

    PaymentRepo::apply_transition(
        &pool,
        payment.unwrap().id,
        PAYMENT_PENDING,
        PAYMENT_APPROVED,
        "gw-late",
        registration_effect(PAYMENT_APPROVED),
        &serde_json::json!({ "type": "payment" }),
    )
    .await
    .unwrap()
    .unwrap();

    let reg = RegistrationRepo::find_by_id(&pool, reg.id).await.unwrap().unwrap();
    assert_eq!(reg.payment_status, "paid");
    assert_eq!(reg.status, "cancelled");
}
