// tests/stores.rs
mod common;

use common::{register_fields, test_pool};
use mchat_server::error::ChatError;
use mchat_server::messages::MessageStore;
use mchat_server::users::UserStore;
use std::time::Duration;

#[tokio::test]
async fn register_then_get_round_trip() {
    let pool = test_pool().await;
    let users = UserStore::new(pool, 4);

    let fields = register_fields("alice");
    users.register(&fields).await.unwrap();

    let profile = users.get("alice").await.unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.first_name, fields.first_name);
    assert_eq!(profile.last_name, fields.last_name);
    assert_eq!(profile.phone, fields.phone);
    assert_eq!(profile.join_at, profile.last_login_at);
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let pool = test_pool().await;
    let users = UserStore::new(pool, 4);

    users.register(&register_fields("alice")).await.unwrap();
    let err = users.register(&register_fields("alice")).await.unwrap_err();
    assert!(matches!(err, ChatError::Conflict(_)));
}

#[tokio::test]
async fn blank_field_is_validation_and_writes_nothing() {
    let pool = test_pool().await;
    let users = UserStore::new(pool, 4);

    let mut fields = register_fields("alice");
    fields.phone = "  ".to_string();
    let err = users.register(&fields).await.unwrap_err();
    assert!(matches!(err, ChatError::Validation(_)));

    // 校验失败不应落库
    assert!(users.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn authenticate_matches_password_only() {
    let pool = test_pool().await;
    let users = UserStore::new(pool, 4);

    users.register(&register_fields("alice")).await.unwrap();

    assert!(users.authenticate("alice", "secret123").await.unwrap());
    assert!(!users.authenticate("alice", "wrong").await.unwrap());

    // 用户不存在是错误，而不是 false
    let err = users.authenticate("ghost", "secret123").await.unwrap_err();
    assert!(matches!(err, ChatError::Auth(_)));
}

#[tokio::test]
async fn login_timestamp_strictly_increases() {
    let pool = test_pool().await;
    let users = UserStore::new(pool, 4);

    users.register(&register_fields("alice")).await.unwrap();
    let before = users.get("alice").await.unwrap().last_login_at;

    tokio::time::sleep(Duration::from_millis(10)).await;
    users.update_login_timestamp("alice").await.unwrap();

    let after = users.get("alice").await.unwrap().last_login_at;
    assert!(after > before);
}

#[tokio::test]
async fn update_login_timestamp_unknown_user_is_not_found() {
    let pool = test_pool().await;
    let users = UserStore::new(pool, 4);

    let err = users.update_login_timestamp("ghost").await.unwrap_err();
    assert!(matches!(err, ChatError::NotFound(_)));
}

#[tokio::test]
async fn get_unknown_user_is_not_found() {
    let pool = test_pool().await;
    let users = UserStore::new(pool, 4);

    let err = users.get("ghost").await.unwrap_err();
    assert!(matches!(err, ChatError::NotFound(_)));
}

#[tokio::test]
async fn empty_tables_yield_empty_lists() {
    let pool = test_pool().await;
    let users = UserStore::new(pool, 4);

    assert!(users.all().await.unwrap().is_empty());
    assert!(users.messages_from("ghost").await.unwrap().is_empty());
    assert!(users.messages_to("ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn message_lifecycle() {
    let pool = test_pool().await;
    let users = UserStore::new(pool.clone(), 4);
    let messages = MessageStore::new(pool);

    users.register(&register_fields("alice")).await.unwrap();
    users.register(&register_fields("bob")).await.unwrap();

    let created = messages.create("alice", "bob", "你好").await.unwrap();
    assert!(created.read_at.is_none());

    let detail = messages.get(created.id).await.unwrap();
    assert_eq!(detail.from_user.username, "alice");
    assert_eq!(detail.to_user.username, "bob");
    assert_eq!(detail.body, "你好");
    assert!(detail.read_at.is_none());

    let read_at = messages.mark_read(created.id).await.unwrap();
    let detail = messages.get(created.id).await.unwrap();
    assert_eq!(detail.read_at, Some(read_at));

    // 重复标记是幂等的，时间戳不变
    tokio::time::sleep(Duration::from_millis(10)).await;
    let again = messages.mark_read(created.id).await.unwrap();
    assert_eq!(again, read_at);
    let detail = messages.get(created.id).await.unwrap();
    assert_eq!(detail.read_at, Some(read_at));
}

#[tokio::test]
async fn message_to_unknown_user_is_validation() {
    let pool = test_pool().await;
    let users = UserStore::new(pool.clone(), 4);
    let messages = MessageStore::new(pool);

    users.register(&register_fields("alice")).await.unwrap();

    let err = messages.create("alice", "ghost", "喂").await.unwrap_err();
    assert!(matches!(err, ChatError::Validation(_)));
    let err = messages.create("ghost", "alice", "喂").await.unwrap_err();
    assert!(matches!(err, ChatError::Validation(_)));
}

#[tokio::test]
async fn missing_message_is_not_found() {
    let pool = test_pool().await;
    let messages = MessageStore::new(pool);

    assert!(matches!(messages.get(42).await.unwrap_err(), ChatError::NotFound(_)));
    assert!(matches!(messages.mark_read(42).await.unwrap_err(), ChatError::NotFound(_)));
}

#[tokio::test]
async fn boxes_partition_by_endpoint() {
    let pool = test_pool().await;
    let users = UserStore::new(pool.clone(), 4);
    let messages = MessageStore::new(pool);

    users.register(&register_fields("alice")).await.unwrap();
    users.register(&register_fields("bob")).await.unwrap();
    users.register(&register_fields("carol")).await.unwrap();

    let to_bob = messages.create("alice", "bob", "给 bob").await.unwrap();
    let to_carol = messages.create("alice", "carol", "给 carol").await.unwrap();
    messages.create("bob", "alice", "回 alice").await.unwrap();

    let sent = users.messages_from("alice").await.unwrap();
    let sent_ids: Vec<i64> = sent.iter().map(|m| m.id).collect();
    assert_eq!(sent_ids, vec![to_bob.id, to_carol.id]);
    assert_eq!(sent[0].to_user.username, "bob");
    assert_eq!(sent[1].to_user.username, "carol");

    let inbox = users.messages_to("bob").await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, to_bob.id);
    assert_eq!(inbox[0].from_user.username, "alice");
}
