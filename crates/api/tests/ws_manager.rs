//! Connection and subscription bookkeeping tests for [`WsManager`].

use axum::extract::ws::Message;
use confab_api::ws::WsManager;
use confab_core::channels::Channel;

fn text(s: &str) -> Message {
    Message::Text(s.to_string().into())
}

#[tokio::test]
async fn add_auto_subscribes_to_own_user_channel() {
    let manager = WsManager::new();
    let mut rx = manager.add("c1".into(), 1).await;

    let sent = manager
        .send_to_channel(&Channel::User(1), text("hi"), None)
        .await;
    assert_eq!(sent, 1);
    assert!(matches!(rx.recv().await, Some(Message::Text(_))));
}

#[tokio::test]
async fn subscribe_is_idempotent_per_connection() {
    let manager = WsManager::new();
    let _rx = manager.add("c1".into(), 1).await;

    assert!(manager.subscribe("c1", &Channel::Meeting(5)).await);
    assert!(!manager.subscribe("c1", &Channel::Meeting(5)).await);
    assert!(!manager.subscribe("ghost", &Channel::Meeting(5)).await);
}

#[tokio::test]
async fn send_to_channel_reaches_only_subscribers() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("c1".into(), 1).await;
    let mut rx2 = manager.add("c2".into(), 2).await;

    manager.subscribe("c1", &Channel::Note(9)).await;

    let sent = manager
        .send_to_channel(&Channel::Note(9), text("update"), None)
        .await;
    assert_eq!(sent, 1);
    assert!(rx1.recv().await.is_some());
    assert!(rx2.try_recv().is_err());
}

#[tokio::test]
async fn exclude_user_suppresses_all_of_their_connections() {
    let manager = WsManager::new();
    let mut rx1a = manager.add("c1a".into(), 1).await;
    let mut rx1b = manager.add("c1b".into(), 1).await;
    let mut rx2 = manager.add("c2".into(), 2).await;

    for conn in ["c1a", "c1b", "c2"] {
        manager.subscribe(conn, &Channel::Note(9)).await;
    }

    let sent = manager
        .send_to_channel(&Channel::Note(9), text("update"), Some(1))
        .await;
    assert_eq!(sent, 1);
    assert!(rx2.recv().await.is_some());
    assert!(rx1a.try_recv().is_err());
    assert!(rx1b.try_recv().is_err());
}

#[tokio::test]
async fn send_to_user_hits_every_connection_of_that_user() {
    let manager = WsManager::new();
    let mut rx1a = manager.add("c1a".into(), 1).await;
    let mut rx1b = manager.add("c1b".into(), 1).await;

    let sent = manager.send_to_user(1, text("ping")).await;
    assert_eq!(sent, 2);
    assert!(rx1a.recv().await.is_some());
    assert!(rx1b.recv().await.is_some());
}

#[tokio::test]
async fn channel_member_ids_deduplicates_multi_connection_users() {
    let manager = WsManager::new();
    let _rx1a = manager.add("c1a".into(), 1).await;
    let _rx1b = manager.add("c1b".into(), 1).await;
    let _rx2 = manager.add("c2".into(), 2).await;

    let presence = Channel::MeetingPresence(5);
    for conn in ["c1a", "c1b", "c2"] {
        manager.subscribe(conn, &presence).await;
    }

    assert_eq!(manager.channel_member_ids(&presence).await, vec![1, 2]);
}

#[tokio::test]
async fn user_subscribed_tracks_last_connection() {
    let manager = WsManager::new();
    let _rx1a = manager.add("c1a".into(), 1).await;
    let _rx1b = manager.add("c1b".into(), 1).await;

    let presence = Channel::MeetingPresence(5);
    manager.subscribe("c1a", &presence).await;
    manager.subscribe("c1b", &presence).await;

    manager.unsubscribe("c1a", &presence).await;
    assert!(manager.user_subscribed(1, &presence).await);

    manager.unsubscribe("c1b", &presence).await;
    assert!(!manager.user_subscribed(1, &presence).await);
}

#[tokio::test]
async fn remove_returns_subscribed_channel_names() {
    let manager = WsManager::new();
    let _rx = manager.add("c1".into(), 1).await;
    manager.subscribe("c1", &Channel::MeetingPresence(5)).await;

    let mut channels = manager.remove("c1").await;
    channels.sort();
    assert_eq!(channels, vec!["presence:meeting:5", "user:1"]);
    assert_eq!(manager.connection_count().await, 0);

    assert!(manager.remove("c1").await.is_empty());
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx = manager.add("c1".into(), 1).await;

    manager.shutdown_all().await;
    assert!(matches!(rx.recv().await, Some(Message::Close(_))));
    assert_eq!(manager.connection_count().await, 0);
}
