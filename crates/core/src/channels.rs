//! Channel names and authorization classes for real-time fan-out.
//!
//! A channel is a named pub/sub destination. Three classes exist:
//!
//! - **user channels** (`user:<id>`) -- private to exactly one recipient;
//!   a client may only subscribe to its own.
//! - **resource channels** (`meeting:<id>`, `note:<id>`) -- scoped to a
//!   shared object; subscribing requires participation/collaboration.
//! - **presence channels** (`presence:meeting:<id>`) -- carry member-list
//!   side information for "who's watching" UIs; join authorization only.
//!
//! Channel names appear on the wire (subscribe frames, event envelopes),
//! so parsing is strict: anything that does not match one of the patterns
//! above is a validation error.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// A parsed channel name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Private per-user channel: `user:<id>`.
    User(DbId),
    /// Meeting resource channel: `meeting:<id>`.
    Meeting(DbId),
    /// Note resource channel: `note:<id>`.
    Note(DbId),
    /// Meeting presence channel: `presence:meeting:<id>`.
    MeetingPresence(DbId),
}

impl Channel {
    /// The wire name of this channel.
    pub fn name(&self) -> String {
        match self {
            Channel::User(id) => format!("user:{id}"),
            Channel::Meeting(id) => format!("meeting:{id}"),
            Channel::Note(id) => format!("note:{id}"),
            Channel::MeetingPresence(id) => format!("presence:meeting:{id}"),
        }
    }

    /// Parse a wire channel name.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        let invalid = || {
            CoreError::Validation(format!(
                "Invalid channel name '{name}'. Expected user:<id>, meeting:<id>, \
                 note:<id>, or presence:meeting:<id>"
            ))
        };

        let (class, rest) = name.split_once(':').ok_or_else(invalid)?;
        match class {
            "user" => Ok(Channel::User(parse_id(rest).ok_or_else(invalid)?)),
            "meeting" => Ok(Channel::Meeting(parse_id(rest).ok_or_else(invalid)?)),
            "note" => Ok(Channel::Note(parse_id(rest).ok_or_else(invalid)?)),
            "presence" => {
                let id = rest.strip_prefix("meeting:").and_then(parse_id);
                Ok(Channel::MeetingPresence(id.ok_or_else(invalid)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Whether this channel carries member-list side information.
    pub fn is_presence(&self) -> bool {
        matches!(self, Channel::MeetingPresence(_))
    }
}

fn parse_id(s: &str) -> Option<DbId> {
    s.parse::<DbId>().ok().filter(|id| *id > 0)
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for Channel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Channel::parse(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_parse_round_trip() {
        for channel in [
            Channel::User(42),
            Channel::Meeting(7),
            Channel::Note(9),
            Channel::MeetingPresence(7),
        ] {
            assert_eq!(Channel::parse(&channel.name()).unwrap(), channel);
        }
    }

    #[test]
    fn parse_rejects_malformed_names() {
        for name in [
            "",
            "user",
            "user:",
            "user:abc",
            "user:-1",
            "user:0",
            "room:3",
            "presence:note:3",
            "presence:meeting:",
            "meeting:7:extra",
        ] {
            assert!(
                Channel::parse(name).is_err(),
                "expected parse failure for {name:?}"
            );
        }
    }

    #[test]
    fn serializes_as_wire_name() {
        let json = serde_json::to_string(&Channel::MeetingPresence(5)).unwrap();
        assert_eq!(json, "\"presence:meeting:5\"");

        let parsed: Channel = serde_json::from_str("\"note:12\"").unwrap();
        assert_eq!(parsed, Channel::Note(12));
    }
}
