//! Confab event bus and notification fan-out building blocks.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, carrying typed [`DomainEvent`]s.
//! - [`NotificationEvent`] / [`EventKind`] -- the closed, typed envelope
//!   pushed to live subscribers over a channel.
//! - [`Notifier`] -- the publish primitive the notification router fans out
//!   through; implemented over the WebSocket manager in the api crate and
//!   by test doubles.

pub mod bus;
pub mod event;
pub mod notifier;

pub use bus::{DomainEvent, EventBus};
pub use event::{Actor, EventKind, NotificationEvent};
pub use notifier::{Notifier, NotifyError};
