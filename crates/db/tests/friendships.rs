//! Integration tests for the friendships repository against a real database.
//!
//! Exercises `FriendshipRepo` end to end:
//! - Unordered-pair uniqueness (a second request in either direction fails)
//! - Self-request rejection at the schema level
//! - Pending-only response transitions (no double responses)
//! - Accepted-friend and pending-request listings

use confab_core::friendship::FriendshipStatus;
use confab_db::models::user::CreateUser;
use confab_db::repositories::{FriendshipRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, username: &str) -> i64 {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$fake".to_string(),
            display_name: username.to_string(),
            avatar_url: None,
        },
    )
    .await
    .unwrap();
    user.id
}

// ---------------------------------------------------------------------------
// Pair uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_pair_rejected_in_both_directions(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    let request = FriendshipRepo::create(&pool, alice, bob).await.unwrap();
    assert_eq!(request.status, "pending");

    let same_direction = FriendshipRepo::create(&pool, alice, bob).await;
    assert!(same_direction.is_err(), "duplicate request should fail");

    let reversed = FriendshipRepo::create(&pool, bob, alice).await;
    assert!(reversed.is_err(), "reversed duplicate should also fail");

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM friendships")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1, "only the original row should exist");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_self_request_rejected(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;

    let result = FriendshipRepo::create(&pool, alice, alice).await;
    assert!(result.is_err(), "self-request should violate the check constraint");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_between_matches_either_direction(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let carol = create_user(&pool, "carol").await;

    let request = FriendshipRepo::create(&pool, alice, bob).await.unwrap();

    let forward = FriendshipRepo::find_between(&pool, alice, bob).await.unwrap();
    let backward = FriendshipRepo::find_between(&pool, bob, alice).await.unwrap();
    assert_eq!(forward.unwrap().id, request.id);
    assert_eq!(backward.unwrap().id, request.id);

    let unrelated = FriendshipRepo::find_between(&pool, alice, carol).await.unwrap();
    assert!(unrelated.is_none());
}

// ---------------------------------------------------------------------------
// Response transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_respond_transitions_only_pending(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    let request = FriendshipRepo::create(&pool, alice, bob).await.unwrap();

    let accepted = FriendshipRepo::respond(&pool, request.id, FriendshipStatus::Accepted)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(accepted.status, "accepted");

    // A second response finds no pending row and changes nothing.
    let double = FriendshipRepo::respond(&pool, request.id, FriendshipStatus::Declined)
        .await
        .unwrap();
    assert!(double.is_none(), "accepted request must not be re-responded");

    let row = FriendshipRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, "accepted");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_respond_unknown_id_is_none(pool: PgPool) {
    let result = FriendshipRepo::respond(&pool, 999_999, FriendshipStatus::Accepted)
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_accepted_friend_ids_spans_both_directions(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let carol = create_user(&pool, "carol").await;
    let dave = create_user(&pool, "dave").await;

    // alice -> bob accepted, carol -> alice accepted, alice -> dave pending.
    let with_bob = FriendshipRepo::create(&pool, alice, bob).await.unwrap();
    FriendshipRepo::respond(&pool, with_bob.id, FriendshipStatus::Accepted)
        .await
        .unwrap();
    let with_carol = FriendshipRepo::create(&pool, carol, alice).await.unwrap();
    FriendshipRepo::respond(&pool, with_carol.id, FriendshipStatus::Accepted)
        .await
        .unwrap();
    FriendshipRepo::create(&pool, alice, dave).await.unwrap();

    let mut friends = FriendshipRepo::accepted_friend_ids(&pool, alice).await.unwrap();
    friends.sort_unstable();
    assert_eq!(friends, vec![bob, carol]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pending_for_addressee_lists_only_incoming_pending(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let carol = create_user(&pool, "carol").await;
    let dave = create_user(&pool, "dave").await;

    // Incoming pending for bob, outgoing from bob, and a declined incoming.
    FriendshipRepo::create(&pool, alice, bob).await.unwrap();
    FriendshipRepo::create(&pool, bob, carol).await.unwrap();
    let declined = FriendshipRepo::create(&pool, dave, bob).await.unwrap();
    FriendshipRepo::respond(&pool, declined.id, FriendshipStatus::Declined)
        .await
        .unwrap();

    let pending = FriendshipRepo::pending_for_addressee(&pool, bob).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].requester_id, alice);
    assert_eq!(pending[0].status, "pending");
}
