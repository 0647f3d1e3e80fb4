//! Routing tests driving [`NotificationRouter::route_event`] directly with
//! stubbed presence lookup and a recording notifier.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use confab_api::notifications::NotificationRouter;
use confab_api::presence::PresenceLookup;
use confab_core::channels::Channel;
use confab_core::types::DbId;
use confab_events::{Actor, DomainEvent, EventKind, NotificationEvent, Notifier, NotifyError};

/// Presence stub returning a fixed set of online users.
struct StubPresence {
    online: Vec<DbId>,
}

#[async_trait]
impl PresenceLookup for StubPresence {
    async fn online_user_ids(&self, user_ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        Ok(user_ids
            .iter()
            .copied()
            .filter(|id| self.online.contains(id))
            .collect())
    }
}

/// Presence stub whose lookup always fails.
struct BrokenPresence;

#[async_trait]
impl PresenceLookup for BrokenPresence {
    async fn online_user_ids(&self, _user_ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        Err(sqlx::Error::PoolClosed)
    }
}

/// Records every publish; optionally fails the first `fail_first` attempts.
#[derive(Clone)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(NotificationEvent, Option<DbId>)>>>,
    fail_first: Arc<Mutex<usize>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail_first: Arc::new(Mutex::new(0)),
        }
    }

    fn failing_first(n: usize) -> Self {
        let notifier = Self::new();
        *notifier.fail_first.lock().unwrap() = n;
        notifier
    }

    fn sent(&self) -> Vec<(NotificationEvent, Option<DbId>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(
        &self,
        event: &NotificationEvent,
        exclude_user: Option<DbId>,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((event.clone(), exclude_user));
        let mut remaining = self.fail_first.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(NotifyError::Unavailable("stub broker down".into()));
        }
        Ok(())
    }
}

fn actor(user_id: DbId) -> Actor {
    Actor {
        user_id,
        display_name: format!("user-{user_id}"),
        avatar_url: None,
    }
}

#[tokio::test]
async fn friend_request_goes_to_addressee_user_channel() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(StubPresence { online: vec![] }, notifier.clone());

    router
        .route_event(&DomainEvent::FriendRequestCreated {
            friendship_id: 10,
            requester: actor(1),
            addressee_id: 2,
        })
        .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    let (event, exclude) = &sent[0];
    assert_eq!(event.channel.name(), "user:2");
    assert_eq!(exclude, &None);
    assert_matches!(&event.kind, EventKind::FriendRequestReceived(p) => {
        assert_eq!(p.friendship_id, 10);
        assert_eq!(p.requester_id, 1);
    });
}

#[tokio::test]
async fn friend_request_response_goes_to_requester_with_friendship_context() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(StubPresence { online: vec![] }, notifier.clone());

    router
        .route_event(&DomainEvent::FriendRequestResponded {
            friendship_id: 10,
            requester_id: 1,
            responder: actor(2),
            accepted: true,
        })
        .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.channel.name(), "user:1");
    assert_matches!(&sent[0].0.kind, EventKind::InvitationAccepted(p) => {
        assert_eq!(p.friendship_id, Some(10));
        assert_eq!(p.meeting_id, None);
        assert_eq!(p.responder_id, 2);
    });
}

#[tokio::test]
async fn declined_invitation_goes_to_host_with_meeting_context() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(StubPresence { online: vec![] }, notifier.clone());

    router
        .route_event(&DomainEvent::InvitationResponded {
            meeting_id: 5,
            meeting_title: "Standup".into(),
            host_id: 1,
            responder: actor(3),
            accepted: false,
        })
        .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.channel.name(), "user:1");
    assert_matches!(&sent[0].0.kind, EventKind::InvitationDeclined(p) => {
        assert_eq!(p.meeting_id, Some(5));
        assert_eq!(p.meeting_title.as_deref(), Some("Standup"));
        assert_eq!(p.friendship_id, None);
    });
}

#[tokio::test]
async fn meeting_started_pages_only_online_invitees() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(
        StubPresence {
            online: vec![2, 4],
        },
        notifier.clone(),
    );

    router
        .route_event(&DomainEvent::MeetingStarted {
            meeting_id: 5,
            meeting_title: "Standup".into(),
            host: actor(1),
            invitee_ids: vec![2, 3, 4],
        })
        .await;

    let sent = notifier.sent();
    let channels: Vec<String> = sent.iter().map(|(e, _)| e.channel.name()).collect();
    assert_eq!(channels, vec!["user:2", "user:4"]);
    for (event, _) in &sent {
        assert_matches!(&event.kind, EventKind::MeetingStarted(p) => {
            assert_eq!(p.meeting_id, 5);
            assert_eq!(p.host_id, 1);
        });
    }
}

#[tokio::test]
async fn meeting_started_fan_out_skipped_when_presence_lookup_fails() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(BrokenPresence, notifier.clone());

    router
        .route_event(&DomainEvent::MeetingStarted {
            meeting_id: 5,
            meeting_title: "Standup".into(),
            host: actor(1),
            invitee_ids: vec![2, 3],
        })
        .await;

    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn publish_failure_does_not_abort_sibling_publishes() {
    let notifier = RecordingNotifier::failing_first(1);
    let router = NotificationRouter::new(
        StubPresence {
            online: vec![2, 3, 4],
        },
        notifier.clone(),
    );

    router
        .route_event(&DomainEvent::MeetingStarted {
            meeting_id: 5,
            meeting_title: "Standup".into(),
            host: actor(1),
            invitee_ids: vec![2, 3, 4],
        })
        .await;

    // The first publish failed but all three were still attempted.
    assert_eq!(notifier.sent().len(), 3);
}

#[tokio::test]
async fn note_share_excludes_the_actor_on_the_note_channel() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(StubPresence { online: vec![] }, notifier.clone());

    router
        .route_event(&DomainEvent::NoteShared {
            note_id: 9,
            actor: actor(1),
            collaborator_id: 2,
        })
        .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    let (event, exclude) = &sent[0];
    assert_eq!(event.channel.name(), "note:9");
    assert_eq!(exclude, &Some(1));
    assert_matches!(&event.kind, EventKind::CollaboratorAdded(p) => {
        assert_eq!(p.user_id, 2);
    });
}

#[tokio::test]
async fn note_update_excludes_the_actor() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(StubPresence { online: vec![] }, notifier.clone());

    router
        .route_event(&DomainEvent::NoteUpdated {
            note_id: 9,
            title: "Renamed".into(),
            actor: actor(1),
        })
        .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, Some(1));
    assert_matches!(&sent[0].0.kind, EventKind::NoteUpdated(p) => {
        assert_eq!(p.title, "Renamed");
    });
}

#[tokio::test]
async fn action_item_delete_targets_note_channel_with_item_id() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(StubPresence { online: vec![] }, notifier.clone());

    router
        .route_event(&DomainEvent::ActionItemDeleted {
            note_id: 9,
            actor: actor(1),
            item_id: 42,
        })
        .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.channel.name(), "note:9");
    assert_eq!(sent[0].1, Some(1));
    assert_matches!(&sent[0].0.kind, EventKind::ActionItemDeleted(p) => {
        assert_eq!(p.item_id, 42);
    });
}

#[tokio::test]
async fn run_loop_exits_when_bus_is_dropped() {
    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(StubPresence { online: vec![] }, notifier.clone());

    let bus = confab_events::EventBus::default();
    let handle = tokio::spawn(router.run(bus.subscribe()));

    bus.publish(DomainEvent::FriendRequestCreated {
        friendship_id: 1,
        requester: actor(1),
        addressee_id: 2,
    });
    drop(bus);

    tokio::time::timeout(std::time::Duration::from_secs(1), handle)
        .await
        .expect("router did not shut down")
        .unwrap();
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn transcript_append_targets_meeting_channel_without_exclusion() {
    use chrono::Utc;
    use confab_db::models::meeting::TranscriptLine;

    let notifier = RecordingNotifier::new();
    let router = NotificationRouter::new(StubPresence { online: vec![] }, notifier.clone());

    router
        .route_event(&DomainEvent::TranscriptAppended {
            meeting_id: 5,
            line: TranscriptLine {
                id: 1,
                meeting_id: 5,
                speaker_id: 3,
                content: "hello".into(),
                spoken_at: Utc::now(),
                created_at: Utc::now(),
            },
        })
        .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.channel.name(), "meeting:5");
    assert_eq!(sent[0].1, None);
    assert!(sent[0].0.triggered_by.is_none());
}

#[tokio::test]
async fn channel_parse_round_trips_router_targets() {
    // The names the router emits must parse back to the same channel so
    // clients can subscribe with the name they received.
    for channel in [
        Channel::User(1),
        Channel::Meeting(2),
        Channel::MeetingPresence(2),
        Channel::Note(3),
    ] {
        let parsed = Channel::parse(&channel.name()).unwrap();
        assert_eq!(parsed.name(), channel.name());
    }
}
