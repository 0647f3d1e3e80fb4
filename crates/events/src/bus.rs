//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DomainEvent`]s. Domain
//! handlers publish after their mutation has committed; the notification
//! router consumes and fans out. Publishing is best-effort: it never blocks
//! the publishing request and never rolls back the domain action.

use confab_core::types::DbId;
use confab_db::models::meeting::TranscriptLine;
use confab_db::models::note::ActionItem;
use tokio::sync::broadcast;

use crate::event::Actor;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A completed domain action, carrying everything the notification router
/// needs to compute recipients and build payloads without re-reading the
/// triggering request.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A friend request was created (already committed as `pending`).
    FriendRequestCreated {
        friendship_id: DbId,
        requester: Actor,
        addressee_id: DbId,
    },
    /// The addressee accepted or declined a pending friend request.
    FriendRequestResponded {
        friendship_id: DbId,
        requester_id: DbId,
        responder: Actor,
        accepted: bool,
    },
    /// An invitee accepted or declined a meeting invitation.
    InvitationResponded {
        meeting_id: DbId,
        meeting_title: String,
        host_id: DbId,
        responder: Actor,
        accepted: bool,
    },
    /// The host started a meeting.
    MeetingStarted {
        meeting_id: DbId,
        meeting_title: String,
        host: Actor,
        invitee_ids: Vec<DbId>,
    },
    /// A transcript line was appended to a live meeting.
    TranscriptAppended { meeting_id: DbId, line: TranscriptLine },
    /// A note was shared with a new collaborator.
    NoteShared {
        note_id: DbId,
        actor: Actor,
        collaborator_id: DbId,
    },
    /// A collaborator was removed from a note.
    NoteUnshared {
        note_id: DbId,
        actor: Actor,
        collaborator_id: DbId,
    },
    /// A note's content changed.
    NoteUpdated {
        note_id: DbId,
        title: String,
        actor: Actor,
    },
    /// An action item was created on a note.
    ActionItemCreated {
        note_id: DbId,
        actor: Actor,
        item: ActionItem,
    },
    /// An action item was edited.
    ActionItemUpdated {
        note_id: DbId,
        actor: Actor,
        item: ActionItem,
    },
    /// An action item was deleted.
    ActionItemDeleted {
        note_id: DbId,
        actor: Actor,
        item_id: DbId,
    },
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// notification delivery is best-effort by design.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(user_id: DbId) -> Actor {
        Actor {
            user_id,
            display_name: format!("user-{user_id}"),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::MeetingStarted {
            meeting_id: 42,
            meeting_title: "Kickoff".to_string(),
            host: actor(7),
            invitee_ids: vec![1, 2, 3],
        });

        let received = rx.recv().await.expect("should receive the event");
        match received {
            DomainEvent::MeetingStarted {
                meeting_id,
                host,
                invitee_ids,
                ..
            } => {
                assert_eq!(meeting_id, 42);
                assert_eq!(host.user_id, 7);
                assert_eq!(invitee_ids, vec![1, 2, 3]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DomainEvent::FriendRequestCreated {
            friendship_id: 1,
            requester: actor(2),
            addressee_id: 3,
        });

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert!(matches!(e1, DomainEvent::FriendRequestCreated { .. }));
        assert!(matches!(e2, DomainEvent::FriendRequestCreated { .. }));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers -- this must not panic.
        bus.publish(DomainEvent::NoteUpdated {
            note_id: 5,
            title: "orphan".to_string(),
            actor: actor(1),
        });
    }
}
