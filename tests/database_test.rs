mod helpers;

use campus_hub::error::RepositoryError;
use campus_hub::models::*;
use helpers::*;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

// ============================================================================
// Migration Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_migrations_ran(pool: PgPool) {
    let tables = vec![
        "users",
        "events",
        "event_registrations",
        "event_feedback",
        "hackathon_groups",
        "group_members",
        "group_posts",
        "flat_profiles",
    ];

    for table in tables {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .expect("Failed to query information_schema");

        let exists: bool = row.get(0);
        assert!(exists, "Table {} should exist", table);
    }
}

// ============================================================================
// Event Repository Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_ping_round_trips(pool: PgPool) {
    let database = campus_hub::database::Database::new(pool.clone());
    database.ping().await.unwrap();

    pool.close().await;
    let err = database.ping().await.unwrap_err();
    assert!(matches!(err, campus_hub::database::DatabaseError::Query(_)));
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_create_and_find_event(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;

    let event = create_test_event(&db, "Tech Fest", 50).await;
    assert_eq!(event.status_enum(), EventStatus::Pending);
    assert_eq!(event.current_participants, 0);
    assert_eq!(event.tags, vec!["fest".to_string()]);

    let found = db
        .event_repo
        .find_by_id(event.id)
        .await
        .expect("Failed to find event")
        .expect("Event should exist");
    assert_events_equal(&event, &found);

    assert!(db.event_repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_register_increments_participants(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let event = create_test_event(&db, "Hack Night", 2).await;

    let updated = db
        .event_repo
        .register(event.id, "user_a", "Asha Rao")
        .await
        .expect("Failed to register");
    assert_eq!(updated.current_participants, 1);

    assert!(db.event_repo.is_registered(event.id, "user_a").await.unwrap());
    assert!(!db.event_repo.is_registered(event.id, "user_b").await.unwrap());

    let names = db.event_repo.registered_user_names(event.id).await.unwrap();
    assert_eq!(names, vec!["Asha Rao".to_string()]);
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_register_twice_rejected(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let event = create_test_event(&db, "Hack Night", 10).await;

    db.event_repo.register(event.id, "user_a", "Asha").await.unwrap();
    let err = db
        .event_repo
        .register(event.id, "user_a", "Asha")
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::BusinessRule(ref msg) if msg == "Already registered for this event"));

    let event = db.event_repo.find_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(event.current_participants, 1);
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_register_full_event_rejected(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let event = create_test_event(&db, "Small Workshop", 1).await;

    db.event_repo.register(event.id, "user_a", "Asha").await.unwrap();
    let err = db
        .event_repo
        .register(event.id, "user_b", "Bhavesh")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Event is full");
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_register_unknown_event(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;

    let err = db
        .event_repo
        .register(Uuid::new_v4(), "user_a", "Asha")
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_concurrent_registrations_respect_capacity(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let event = create_test_event(&db, "Limited Seats", 3).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let repo = db.event_repo.clone();
        handles.push(tokio::spawn(async move {
            repo.register(event.id, &format!("user_{}", i), "Student").await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 3);
    let event = db.event_repo.find_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(event.current_participants, 3);
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_update_cannot_drop_capacity_below_registrations(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let event = create_test_event(&db, "Tech Fest", 5).await;

    db.event_repo.register(event.id, "user_a", "Asha").await.unwrap();
    db.event_repo.register(event.id, "user_b", "Bhavesh").await.unwrap();

    let err = db
        .event_repo
        .update(event.id, &event_draft("Tech Fest", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::BusinessRule(_)));

    let mut draft = event_draft("Tech Fest 2025", 2);
    draft.status = EventStatus::Approved;
    let updated = db.event_repo.update(event.id, &draft).await.unwrap();
    assert_eq!(updated.title, "Tech Fest 2025");
    assert_eq!(updated.max_participants, 2);
    assert_eq!(updated.current_participants, 2);
    assert!(updated.is_approved());
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_find_by_status_and_by_start(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;

    let mut later = event_draft("Later", 10);
    later.start_date = later.start_date + chrono::Duration::days(7);
    later.end_date = later.start_date + chrono::Duration::hours(2);
    let later = db.event_repo.create("admin_1", &later).await.unwrap();
    let sooner = create_test_event(&db, "Sooner", 10).await;

    db.event_repo
        .update_status(later.id, EventStatus::Approved)
        .await
        .unwrap()
        .expect("Event should exist");

    let approved = db.event_repo.find_by_status(EventStatus::Approved).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, later.id);

    let pending = db.event_repo.find_by_status(EventStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, sooner.id);

    let all: Vec<Uuid> = db
        .event_repo
        .find_all_by_start()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(all, vec![sooner.id, later.id]);

    let missing = db
        .event_repo
        .update_status(Uuid::new_v4(), EventStatus::Rejected)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_feedback_round_trip(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let event = create_test_event(&db, "Tech Fest", 10).await;

    let feedback = db
        .event_repo
        .add_feedback(event.id, "user_a", 4, Some("Great talks"))
        .await
        .unwrap();
    assert_eq!(feedback.rating, 4);

    let all = db.event_repo.feedback_for_event(event.id).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].comment.as_deref(), Some("Great talks"));
}

// ============================================================================
// Group Repository Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_create_group_adds_creator_as_member(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let group = create_test_group(&db, "creator_1", 4).await;

    assert!(group.is_open());
    assert_eq!(group.member_count, 1);

    assert!(db.group_member_repo.is_member(group.id, "creator_1").await.unwrap());
    let members = db.group_member_repo.approved_members(group.id).await.unwrap();
    assert_eq!(members, vec!["creator_1".to_string()]);

    let mine = db.group_repo.find_by_creator("creator_1").await.unwrap();
    assert_eq!(mine.len(), 1);
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_find_open_excludes_creator_and_closed(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let mine = create_test_group(&db, "creator_1", 4).await;
    let theirs = create_test_group(&db, "creator_2", 4).await;
    let closed = create_test_group(&db, "creator_3", 4).await;
    db.group_repo.close(closed.id).await.unwrap();

    let all: Vec<Uuid> = db.group_repo.find_open(None).await.unwrap().iter().map(|g| g.id).collect();
    assert_eq!(all.len(), 2);
    assert!(all.contains(&mine.id));
    assert!(!all.contains(&closed.id));

    let others = db.group_repo.find_open(Some("creator_1")).await.unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].id, theirs.id);
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_join_and_approve_flow(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let group = create_test_group(&db, "creator_1", 3).await;

    let pending = db.group_member_repo.request_join(group.id, "user_a").await.unwrap();
    assert_eq!(pending.status_enum(), MembershipStatus::Pending);
    assert!(pending.approved_at.is_none());

    let err = db.group_member_repo.request_join(group.id, "user_a").await.unwrap_err();
    assert_eq!(err.to_string(), "Already requested to join");

    assert_eq!(
        db.group_member_repo.pending_members(group.id).await.unwrap(),
        vec!["user_a".to_string()]
    );

    let (group, member) = db
        .group_member_repo
        .approve(group.id, "creator_1", "user_a")
        .await
        .unwrap();
    assert!(member.is_approved());
    assert!(member.approved_at.is_some());
    assert_eq!(group.member_count, 2);

    let err = db.group_member_repo.request_join(group.id, "user_a").await.unwrap_err();
    assert_eq!(err.to_string(), "Already a member");

    let posts = db.post_repo.find_by_group(group.id).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].post_type_enum(), PostType::MemberAdded);
    assert_eq!(posts[0].added_members, vec!["user_a".to_string()]);

    assert_eq!(db.group_member_repo.groups_for_user("user_a").await.unwrap(), vec![group.id]);
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_only_creator_approves(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let group = create_test_group(&db, "creator_1", 3).await;
    db.group_member_repo.request_join(group.id, "user_a").await.unwrap();

    let err = db
        .group_member_repo
        .approve(group.id, "user_b", "user_a")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Only the creator can approve requests");

    let err = db
        .group_member_repo
        .approve(group.id, "creator_1", "nobody")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No pending request found");
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_full_group_rejects_requests_and_approvals(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let group = create_test_group(&db, "creator_1", 2).await;

    db.group_member_repo.request_join(group.id, "user_a").await.unwrap();
    db.group_member_repo.request_join(group.id, "user_b").await.unwrap();
    db.group_member_repo.approve(group.id, "creator_1", "user_a").await.unwrap();

    let err = db
        .group_member_repo
        .approve(group.id, "creator_1", "user_b")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Group is full");

    let err = db.group_member_repo.request_join(group.id, "user_c").await.unwrap_err();
    assert_eq!(err.to_string(), "Group is full");
}

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_closed_group_rejects_requests(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let group = create_test_group(&db, "creator_1", 4).await;

    let closed = db.group_repo.close(group.id).await.unwrap().unwrap();
    assert_eq!(closed.status_enum(), GroupStatus::Closed);

    let err = db.group_member_repo.request_join(group.id, "user_a").await.unwrap_err();
    assert_eq!(err.to_string(), "Group is closed");
}

// ============================================================================
// Flat Repository Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_flat_create_find_delete(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;

    let flat = db
        .flat_repo
        .create("owner_1", &new_flat("Sunrise Residency", 10000, 3))
        .await
        .unwrap();
    assert_eq!(flat.total_rent, Decimal::new(10000, 0));
    assert_eq!(flat.rent_per_person(), Decimal::new(3334, 0));
    assert!(flat.is_owned_by("owner_1"));

    assert_eq!(db.flat_repo.find_all().await.unwrap().len(), 1);

    assert!(db.flat_repo.delete(flat.id).await.unwrap());
    assert!(!db.flat_repo.delete(flat.id).await.unwrap());
    assert!(db.flat_repo.find_by_id(flat.id).await.unwrap().is_none());
}

// ============================================================================
// User Repository Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires Postgres; run with DATABASE_URL set"]
async fn test_user_upsert_keeps_optional_fields(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;

    let user = db
        .user_repo
        .upsert("user_a", "Asha", "asha@viit.ac.in", Some("9876543210"), None)
        .await
        .unwrap();
    assert_eq!(user.phone_number, "9876543210");
    assert_eq!(user.status, UserStatus::Active.as_str());

    let user = db
        .user_repo
        .upsert("user_a", "Asha Rao", "asha@viit.ac.in", None, Some("https://img/asha.png"))
        .await
        .unwrap();
    assert_eq!(user.name, "Asha Rao");
    assert_eq!(user.phone_number, "9876543210");
    assert_eq!(user.profile_picture.as_deref(), Some("https://img/asha.png"));

    let by_email = db.user_repo.find_by_email("ASHA@viit.ac.in").await.unwrap().unwrap();
    assert_eq!(by_email.id, "user_a");
}
