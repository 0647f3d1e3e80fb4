//! Event-to-notification routing: consumes domain events from the bus and
//! fans them out to channel subscribers.

mod notifier;
mod router;

pub use notifier::WsNotifier;
pub use router::NotificationRouter;
