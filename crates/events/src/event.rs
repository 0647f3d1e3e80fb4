//! Typed notification events pushed to live subscribers.
//!
//! Every event delivered over a channel is a [`NotificationEvent`]: the
//! target channel, a closed tagged [`EventKind`] with a fixed payload per
//! kind, the acting user's display metadata, and a timestamp. Events are
//! transient -- constructed by the router, handed to the notifier by value,
//! never persisted.

use chrono::Utc;
use confab_core::channels::Channel;
use confab_core::types::{DbId, Timestamp};
use confab_db::models::meeting::TranscriptLine;
use confab_db::models::note::ActionItem;
use serde::{Deserialize, Serialize};

/// Identity and display metadata of the user that triggered an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub user_id: DbId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// A notification event bound to a target channel.
///
/// Serializes as
/// `{ "channel", "type", "payload", "triggered_by", "timestamp" }`.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    /// The channel this event is addressed to (`user:<id>`,
    /// `meeting:<id>`, `note:<id>`).
    pub channel: Channel,
    #[serde(flatten)]
    pub kind: EventKind,
    pub triggered_by: Option<Actor>,
    pub timestamp: Timestamp,
}

impl NotificationEvent {
    /// Build an event addressed to `channel`, stamped with the current time.
    pub fn new(channel: Channel, kind: EventKind, triggered_by: Option<Actor>) -> Self {
        Self {
            channel,
            kind,
            triggered_by,
            timestamp: Utc::now(),
        }
    }
}

/// The closed set of event kinds, each with a fixed typed payload.
///
/// The wire tag is the kebab-case kind name under `"type"`, with the
/// payload under `"payload"`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum EventKind {
    /// A friend request was created; delivered to the addressee.
    FriendRequestReceived(FriendRequestPayload),
    /// A pending request or invitation was accepted; delivered to the
    /// requester (friendship) or the meeting host (invitation).
    InvitationAccepted(InvitationResponsePayload),
    /// A pending request or invitation was declined.
    InvitationDeclined(InvitationResponsePayload),
    /// A meeting went live; delivered only to invitees who are online.
    MeetingStarted(MeetingStartedPayload),
    /// A transcript line was appended; delivered to the meeting channel.
    NewTranscript(TranscriptPayload),
    /// Note content changed; delivered to the note channel.
    NoteUpdated(NotePayload),
    /// A user was added to a note's collaborator list.
    CollaboratorAdded(CollaboratorPayload),
    /// A user was removed from a note's collaborator list.
    CollaboratorRemoved(CollaboratorPayload),
    ActionItemCreated(ActionItemPayload),
    ActionItemUpdated(ActionItemPayload),
    ActionItemDeleted(ActionItemDeletedPayload),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FriendRequestPayload {
    pub friendship_id: DbId,
    pub requester_id: DbId,
}

/// Payload for accepted/declined responses. For meeting invitations the
/// meeting fields are set; for friend requests the friendship id is.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvitationResponsePayload {
    pub responder_id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendship_id: Option<DbId>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MeetingStartedPayload {
    pub meeting_id: DbId,
    pub meeting_title: String,
    pub host_id: DbId,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptPayload {
    pub meeting_id: DbId,
    /// The full transcript row, so subscribers need no follow-up read.
    pub line: TranscriptLine,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotePayload {
    pub note_id: DbId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollaboratorPayload {
    pub note_id: DbId,
    pub user_id: DbId,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionItemPayload {
    pub note_id: DbId,
    pub item: ActionItem,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionItemDeletedPayload {
    pub note_id: DbId,
    pub item_id: DbId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor {
            user_id: 7,
            display_name: "Ada".to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn serializes_kebab_case_type_tag_and_payload() {
        let event = NotificationEvent::new(
            Channel::User(3),
            EventKind::MeetingStarted(MeetingStartedPayload {
                meeting_id: 11,
                meeting_title: "Standup".to_string(),
                host_id: 7,
            }),
            Some(actor()),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["channel"], "user:3");
        assert_eq!(json["type"], "meeting-started");
        assert_eq!(json["payload"]["meeting_id"], 11);
        assert_eq!(json["payload"]["host_id"], 7);
        assert_eq!(json["triggered_by"]["display_name"], "Ada");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn action_item_kinds_use_distinct_tags() {
        let deleted = EventKind::ActionItemDeleted(ActionItemDeletedPayload {
            note_id: 1,
            item_id: 2,
        });
        let json = serde_json::to_value(&deleted).unwrap();
        assert_eq!(json["type"], "action-item-deleted");
        assert_eq!(json["payload"]["item_id"], 2);
    }

    #[test]
    fn invitation_response_omits_unset_context_fields() {
        let kind = EventKind::InvitationDeclined(InvitationResponsePayload {
            responder_id: 4,
            meeting_id: None,
            meeting_title: None,
            friendship_id: Some(9),
        });
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "invitation-declined");
        assert_eq!(json["payload"]["friendship_id"], 9);
        assert!(json["payload"].get("meeting_id").is_none());
    }
}
