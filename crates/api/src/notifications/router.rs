//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] subscribes to the domain event bus and maps each
//! [`DomainEvent`] to one or more [`NotificationEvent`]s on the affected
//! channels. The mapping is exhaustive over the event enum:
//!
//! | Domain event              | Recipients                                  |
//! |---------------------------|---------------------------------------------|
//! | FriendRequestCreated      | addressee's user channel                    |
//! | FriendRequestResponded    | requester's user channel                    |
//! | InvitationResponded       | meeting host's user channel                 |
//! | MeetingStarted            | user channel of each *online* invitee       |
//! | TranscriptAppended        | meeting resource channel                    |
//! | Note* / ActionItem*       | note resource channel, excluding the actor  |
//!
//! Publishing is best-effort throughout: a failure for one channel or
//! recipient is logged and never aborts sibling publishes.

use confab_core::channels::Channel;
use confab_core::types::DbId;
use confab_events::event::{
    ActionItemDeletedPayload, ActionItemPayload, CollaboratorPayload, FriendRequestPayload,
    InvitationResponsePayload, MeetingStartedPayload, NotePayload, TranscriptPayload,
};
use confab_events::{DomainEvent, EventKind, NotificationEvent, Notifier};
use tokio::sync::broadcast;

use crate::presence::PresenceLookup;

/// Routes domain events to channel notifications.
///
/// Presence lookup and publishing are injected so tests can stub both and
/// drive [`route_event`](Self::route_event) directly.
pub struct NotificationRouter<P, N> {
    presence: P,
    notifier: N,
}

impl<P: PresenceLookup, N: Notifier> NotificationRouter<P, N> {
    pub fn new(presence: P, notifier: N) -> Self {
        Self { presence, notifier }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](confab_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Map a single domain event to its notifications and publish them.
    pub async fn route_event(&self, event: &DomainEvent) {
        match event {
            DomainEvent::FriendRequestCreated {
                friendship_id,
                requester,
                addressee_id,
            } => {
                self.publish(
                    NotificationEvent::new(
                        Channel::User(*addressee_id),
                        EventKind::FriendRequestReceived(FriendRequestPayload {
                            friendship_id: *friendship_id,
                            requester_id: requester.user_id,
                        }),
                        Some(requester.clone()),
                    ),
                    None,
                )
                .await;
            }

            DomainEvent::FriendRequestResponded {
                friendship_id,
                requester_id,
                responder,
                accepted,
            } => {
                let payload = InvitationResponsePayload {
                    responder_id: responder.user_id,
                    meeting_id: None,
                    meeting_title: None,
                    friendship_id: Some(*friendship_id),
                };
                self.publish(
                    NotificationEvent::new(
                        Channel::User(*requester_id),
                        response_kind(*accepted, payload),
                        Some(responder.clone()),
                    ),
                    None,
                )
                .await;
            }

            DomainEvent::InvitationResponded {
                meeting_id,
                meeting_title,
                host_id,
                responder,
                accepted,
            } => {
                let payload = InvitationResponsePayload {
                    responder_id: responder.user_id,
                    meeting_id: Some(*meeting_id),
                    meeting_title: Some(meeting_title.clone()),
                    friendship_id: None,
                };
                self.publish(
                    NotificationEvent::new(
                        Channel::User(*host_id),
                        response_kind(*accepted, payload),
                        Some(responder.clone()),
                    ),
                    None,
                )
                .await;
            }

            DomainEvent::MeetingStarted {
                meeting_id,
                meeting_title,
                host,
                invitee_ids,
            } => {
                // Page only the invitees whose effective presence is online;
                // everyone else discovers the meeting through ordinary reads.
                let online = match self.presence.online_user_ids(invitee_ids).await {
                    Ok(online) => online,
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            meeting_id,
                            "Presence lookup failed, skipping meeting-started fan-out"
                        );
                        return;
                    }
                };

                for user_id in online {
                    self.publish(
                        NotificationEvent::new(
                            Channel::User(user_id),
                            EventKind::MeetingStarted(MeetingStartedPayload {
                                meeting_id: *meeting_id,
                                meeting_title: meeting_title.clone(),
                                host_id: host.user_id,
                            }),
                            Some(host.clone()),
                        ),
                        None,
                    )
                    .await;
                }
            }

            DomainEvent::TranscriptAppended { meeting_id, line } => {
                self.publish(
                    NotificationEvent::new(
                        Channel::Meeting(*meeting_id),
                        EventKind::NewTranscript(TranscriptPayload {
                            meeting_id: *meeting_id,
                            line: line.clone(),
                        }),
                        None,
                    ),
                    None,
                )
                .await;
            }

            DomainEvent::NoteShared {
                note_id,
                actor,
                collaborator_id,
            } => {
                self.publish(
                    NotificationEvent::new(
                        Channel::Note(*note_id),
                        EventKind::CollaboratorAdded(CollaboratorPayload {
                            note_id: *note_id,
                            user_id: *collaborator_id,
                        }),
                        Some(actor.clone()),
                    ),
                    Some(actor.user_id),
                )
                .await;
            }

            DomainEvent::NoteUnshared {
                note_id,
                actor,
                collaborator_id,
            } => {
                self.publish(
                    NotificationEvent::new(
                        Channel::Note(*note_id),
                        EventKind::CollaboratorRemoved(CollaboratorPayload {
                            note_id: *note_id,
                            user_id: *collaborator_id,
                        }),
                        Some(actor.clone()),
                    ),
                    Some(actor.user_id),
                )
                .await;
            }

            DomainEvent::NoteUpdated {
                note_id,
                title,
                actor,
            } => {
                self.publish(
                    NotificationEvent::new(
                        Channel::Note(*note_id),
                        EventKind::NoteUpdated(NotePayload {
                            note_id: *note_id,
                            title: title.clone(),
                        }),
                        Some(actor.clone()),
                    ),
                    Some(actor.user_id),
                )
                .await;
            }

            DomainEvent::ActionItemCreated {
                note_id,
                actor,
                item,
            } => {
                self.publish(
                    NotificationEvent::new(
                        Channel::Note(*note_id),
                        EventKind::ActionItemCreated(ActionItemPayload {
                            note_id: *note_id,
                            item: item.clone(),
                        }),
                        Some(actor.clone()),
                    ),
                    Some(actor.user_id),
                )
                .await;
            }

            DomainEvent::ActionItemUpdated {
                note_id,
                actor,
                item,
            } => {
                self.publish(
                    NotificationEvent::new(
                        Channel::Note(*note_id),
                        EventKind::ActionItemUpdated(ActionItemPayload {
                            note_id: *note_id,
                            item: item.clone(),
                        }),
                        Some(actor.clone()),
                    ),
                    Some(actor.user_id),
                )
                .await;
            }

            DomainEvent::ActionItemDeleted {
                note_id,
                actor,
                item_id,
            } => {
                self.publish(
                    NotificationEvent::new(
                        Channel::Note(*note_id),
                        EventKind::ActionItemDeleted(ActionItemDeletedPayload {
                            note_id: *note_id,
                            item_id: *item_id,
                        }),
                        Some(actor.clone()),
                    ),
                    Some(actor.user_id),
                )
                .await;
            }
        }
    }

    /// Publish one notification; failures are logged and dropped so they
    /// never abort sibling publishes.
    async fn publish(&self, event: NotificationEvent, exclude_user: Option<DbId>) {
        if let Err(e) = self.notifier.publish(&event, exclude_user).await {
            tracing::error!(
                error = %e,
                channel = %event.channel,
                "Failed to publish notification"
            );
        }
    }
}

fn response_kind(accepted: bool, payload: InvitationResponsePayload) -> EventKind {
    if accepted {
        EventKind::InvitationAccepted(payload)
    } else {
        EventKind::InvitationDeclined(payload)
    }
}
