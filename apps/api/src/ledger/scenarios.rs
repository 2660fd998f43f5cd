//! State-machine scenario tests against a live PostgreSQL.
//! Set DATABASE_URL and run `cargo test -- --ignored`.

use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::archive::archive_version;
use crate::ledger::store::{self, LedgerRef};
use crate::locked::manager;
use crate::public::resolver;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for scenario tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to PostgreSQL");
    sqlx::migrate!().run(&pool).await.expect("migrations failed");
    pool
}

async fn seed_owner(pool: &PgPool) -> (Uuid, String) {
    let id = Uuid::new_v4();
    let username = format!("user-{}", id.simple());
    sqlx::query("INSERT INTO owners (id, username, email) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(&username)
        .bind(format!("{username}@example.com"))
        .execute(pool)
        .await
        .expect("failed to seed owner");
    (id, username)
}

fn content(tag: &str) -> Value {
    json!({ "personal": { "name": tag, "email": "test@example.com" } })
}

async fn main_ledger(pool: &PgPool, owner_id: Uuid) -> LedgerRef {
    let resume_id = store::resume_ledger_id(pool, owner_id)
        .await
        .expect("ledger lookup failed")
        .expect("ledger should exist");
    LedgerRef::resume(resume_id)
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn first_version_starts_at_one_and_is_master() {
    let pool = test_pool().await;
    let (owner_id, _) = seed_owner(&pool).await;

    let v1 = store::create_version(&pool, owner_id, &content("C1"))
        .await
        .expect("create failed");
    assert_eq!(v1.version_number, 1);
    assert!(v1.is_master);
    assert_eq!(v1.content, content("C1"));

    let ledger = main_ledger(&pool, owner_id).await;
    let master = store::get_master(&pool, ledger)
        .await
        .expect("get_master failed")
        .expect("master should exist");
    assert_eq!(master.id, v1.id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn new_version_retargets_master_and_leaves_history_intact() {
    let pool = test_pool().await;
    let (owner_id, _) = seed_owner(&pool).await;

    store::create_version(&pool, owner_id, &content("C1"))
        .await
        .expect("create v1 failed");
    let v2 = store::create_version(&pool, owner_id, &content("C2"))
        .await
        .expect("create v2 failed");
    assert_eq!(v2.version_number, 2);
    assert!(v2.is_master);

    let ledger = main_ledger(&pool, owner_id).await;
    let v1 = store::get_version(&pool, ledger, 1)
        .await
        .expect("get_version failed")
        .expect("version 1 should exist");
    assert!(!v1.is_master);
    assert_eq!(v1.content, content("C1"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn archive_hides_but_never_deletes() {
    let pool = test_pool().await;
    let (owner_id, _) = seed_owner(&pool).await;

    let v1 = store::create_version(&pool, owner_id, &content("C1"))
        .await
        .expect("create v1 failed");
    let v2 = store::create_version(&pool, owner_id, &content("C2"))
        .await
        .expect("create v2 failed");

    // The live version cannot be archived.
    let err = archive_version(&pool, owner_id, v2.id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");

    archive_version(&pool, owner_id, v1.id)
        .await
        .expect("archive v1 failed");
    // Idempotent: archiving again is a no-op success.
    archive_version(&pool, owner_id, v1.id)
        .await
        .expect("second archive failed");

    let ledger = main_ledger(&pool, owner_id).await;
    let visible = store::list_versions(&pool, ledger, false)
        .await
        .expect("list failed");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].version_number, 2);

    let all = store::list_versions(&pool, ledger, true)
        .await
        .expect("list all failed");
    assert_eq!(all.len(), 2);

    // Direct numeric addressing still works.
    let archived = store::get_version(&pool, ledger, 1)
        .await
        .expect("get_version failed")
        .expect("archived version must remain resolvable");
    assert!(archived.is_archived);
    assert_eq!(archived.content, content("C1"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn restore_creates_a_new_version_and_leaves_the_old_untouched() {
    let pool = test_pool().await;
    let (owner_id, _) = seed_owner(&pool).await;

    let v1 = store::create_version(&pool, owner_id, &content("C1"))
        .await
        .expect("create v1 failed");
    let v2 = store::create_version(&pool, owner_id, &content("C2"))
        .await
        .expect("create v2 failed");

    let restored = store::set_live(&pool, owner_id, v1.id)
        .await
        .expect("set_live failed");
    assert_eq!(restored.version_number, 3);
    assert!(restored.is_master);
    assert_eq!(restored.content, content("C1"));

    let ledger = main_ledger(&pool, owner_id).await;
    let old_v1 = store::get_version(&pool, ledger, 1)
        .await
        .expect("get failed")
        .expect("v1 exists");
    let old_v2 = store::get_version(&pool, ledger, 2)
        .await
        .expect("get failed")
        .expect("v2 exists");
    assert!(!old_v1.is_master, "restored source must stay non-master");
    assert!(!old_v2.is_master, "previous master must be unset");
    assert_eq!(old_v1.content, content("C1"));

    // Restoring the current master is rejected as a no-op.
    let err = store::set_live(&pool, owner_id, restored.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");

    // Unknown version id and foreign ownership fail distinctly.
    let err = store::set_live(&pool, owner_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    let (stranger, _) = seed_owner(&pool).await;
    let err = store::set_live(&pool, stranger, v2.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden), "got {err:?}");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn restoring_an_archived_version_leaves_it_archived() {
    let pool = test_pool().await;
    let (owner_id, _) = seed_owner(&pool).await;

    let v1 = store::create_version(&pool, owner_id, &content("C1"))
        .await
        .expect("create v1 failed");
    store::create_version(&pool, owner_id, &content("C2"))
        .await
        .expect("create v2 failed");
    archive_version(&pool, owner_id, v1.id)
        .await
        .expect("archive failed");

    let restored = store::set_live(&pool, owner_id, v1.id)
        .await
        .expect("set_live on archived target should be permitted");
    assert!(!restored.is_archived);
    assert_eq!(restored.content, content("C1"));

    let ledger = main_ledger(&pool, owner_id).await;
    let original = store::get_version(&pool, ledger, 1)
        .await
        .expect("get failed")
        .expect("v1 exists");
    assert!(original.is_archived, "original must stay hidden");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn locking_requires_a_master_resume() {
    let pool = test_pool().await;
    let (owner_id, _) = seed_owner(&pool).await;

    let err = manager::create_profile(&pool, owner_id, "acme")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn locked_profiles_are_forks_not_links() {
    let pool = test_pool().await;
    let (owner_id, _) = seed_owner(&pool).await;

    store::create_version(&pool, owner_id, &content("C1"))
        .await
        .expect("create v1 failed");
    let (profile, seeded) = manager::create_profile(&pool, owner_id, "acme")
        .await
        .expect("create profile failed");
    assert_eq!(seeded.version_number, 1);
    assert!(seeded.is_master);
    assert_eq!(seeded.content, content("C1"));

    // Editing the master must not reach the frozen fork.
    store::create_version(&pool, owner_id, &content("C2"))
        .await
        .expect("create v2 failed");
    let frozen = store::get_master(&pool, LedgerRef::locked(profile.id))
        .await
        .expect("get_master failed")
        .expect("locked master exists");
    assert_eq!(frozen.content, content("C1"));

    // Only an explicit refresh pulls new master content in.
    let refreshed = manager::refresh_profile(&pool, owner_id, "acme")
        .await
        .expect("refresh failed");
    assert_eq!(refreshed.version_number, 2);
    assert!(refreshed.is_master);
    assert_eq!(refreshed.content, content("C2"));

    // Duplicate names are rejected per owner.
    let err = manager::create_profile(&pool, owner_id, "acme")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    // Refreshing an unknown profile is a distinct failure.
    let err = manager::refresh_profile(&pool, owner_id, "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn concurrent_writers_never_duplicate_numbers_or_masters() {
    let pool = test_pool().await;
    let (owner_id, _) = seed_owner(&pool).await;

    store::create_version(&pool, owner_id, &content("C1"))
        .await
        .expect("create v1 failed");

    let content_a = content("A");
    let content_b = content("B");
    let (a, b) = tokio::join!(
        store::create_version(&pool, owner_id, &content_a),
        store::create_version(&pool, owner_id, &content_b),
    );
    let a = a.expect("concurrent create A failed");
    let b = b.expect("concurrent create B failed");

    let mut numbers = vec![a.version_number, b.version_number];
    numbers.sort();
    assert_eq!(numbers, vec![2, 3], "numbers must never collide");

    let ledger = main_ledger(&pool, owner_id).await;
    let all = store::list_versions(&pool, ledger, true)
        .await
        .expect("list failed");
    let masters = all.iter().filter(|v| v.is_master).count();
    assert_eq!(masters, 1, "exactly one master after concurrent writes");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn public_links_resolve_and_unknowns_do_not() {
    let pool = test_pool().await;
    let (owner_id, username) = seed_owner(&pool).await;

    store::create_version(&pool, owner_id, &content("C1"))
        .await
        .expect("create v1 failed");
    store::create_version(&pool, owner_id, &content("C2"))
        .await
        .expect("create v2 failed");
    manager::create_profile(&pool, owner_id, "acme")
        .await
        .expect("create profile failed");

    let floating = resolver::resolve_master(&pool, &username)
        .await
        .expect("resolve_master failed");
    assert_eq!(floating.content, content("C2"));

    // Permanent link: version 1 resolves forever, master state irrelevant.
    let permanent = resolver::resolve_version(&pool, &username, 1)
        .await
        .expect("resolve_version failed");
    assert_eq!(permanent.content, content("C1"));

    let locked = resolver::resolve_locked_master(&pool, &username, "acme")
        .await
        .expect("resolve_locked_master failed");
    assert_eq!(locked.content, content("C2"));

    let locked_v1 = resolver::resolve_locked_version(&pool, &username, "acme", 1)
        .await
        .expect("resolve_locked_version failed");
    assert_eq!(locked_v1.content, content("C2"));

    let err = resolver::resolve_master(&pool, "no-such-user")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    let err = resolver::resolve_version(&pool, &username, 99)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    let err = resolver::resolve_locked_master(&pool, &username, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}
