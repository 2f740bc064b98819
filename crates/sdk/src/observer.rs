//! Session lifecycle notifications.
//!
//! The controller calls a [`SessionObserver`] on every terminal transition.
//! Callbacks run inline on the controller's task and must not block.

use sdk_core::SuiAddress;
use tokio::sync::mpsc;

use crate::{ErrorKind, ZkLoginError};

/// Receives session lifecycle events.
pub trait SessionObserver: Send + Sync {
    /// The session resolved and can sign.
    fn on_ready(&self, address: &SuiAddress);

    /// Resolution failed. Followed by [`on_disconnected`](Self::on_disconnected).
    fn on_failed(&self, error: &ZkLoginError);

    /// All session state was cleared.
    fn on_disconnected(&self);
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_ready(&self, _: &SuiAddress) {}
    fn on_failed(&self, _: &ZkLoginError) {}
    fn on_disconnected(&self) {}
}

/// An owned snapshot of a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Ready { address: SuiAddress },
    Failed { kind: ErrorKind, message: String },
    Disconnected,
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: SessionEvent) {
        // A dropped receiver only means nobody is listening.
        let _ = self.tx.send(event);
    }
}

impl SessionObserver for ChannelObserver {
    fn on_ready(&self, address: &SuiAddress) {
        self.send(SessionEvent::Ready { address: *address });
    }

    fn on_failed(&self, error: &ZkLoginError) {
        self.send(SessionEvent::Failed {
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    fn on_disconnected(&self) {
        self.send(SessionEvent::Disconnected);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_observer_forwards_in_order() {
        let (observer, mut rx) = ChannelObserver::new();
        observer.on_ready(&SuiAddress::ZERO);
        observer.on_failed(&ZkLoginError::NonceMismatch);
        observer.on_disconnected();

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Ready {
                address: SuiAddress::ZERO
            }
        );
        match rx.try_recv().unwrap() {
            SessionEvent::Failed { kind, .. } => assert_eq!(kind, ErrorKind::Invalid),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Disconnected);
    }

    #[test]
    fn dropped_receiver_is_harmless() {
        let (observer, rx) = ChannelObserver::new();
        drop(rx);
        observer.on_disconnected();
    }
}
