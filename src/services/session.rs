// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-state notifications.
//!
//! Views subscribe to sign-in/sign-out changes for a user. Each `(user, view)`
//! pair holds at most one live subscription: subscribing again replaces the
//! previous one, and a replaced subscription stops yielding states even if
//! some were already queued for it. Dropping a subscription unregisters it.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Session state as seen by a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    SignedIn { uid: String, email: String },
    SignedOut,
}

type ViewKey = (String, String);

struct Slot {
    id: u64,
    tx: mpsc::UnboundedSender<SessionState>,
}

#[derive(Default)]
struct Registry {
    slots: DashMap<ViewKey, Slot>,
    next_id: AtomicU64,
}

/// Publishes session-state changes to subscribed views.
#[derive(Clone, Default)]
pub struct SessionHub {
    registry: Arc<Registry>,
}

/// A view's live subscription. Unregisters itself when dropped.
pub struct SessionSubscription {
    registry: Arc<Registry>,
    key: ViewKey,
    id: u64,
    rx: mpsc::UnboundedReceiver<SessionState>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `view` to session changes for `user_id`, replacing any
    /// existing subscription for the same view.
    pub fn subscribe(&self, user_id: &str, view: &str) -> SessionSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let key = (user_id.to_string(), view.to_string());

        if self
            .registry
            .slots
            .insert(key.clone(), Slot { id, tx })
            .is_some()
        {
            tracing::debug!(user_id, view, "Replaced existing session subscription");
        }

        SessionSubscription {
            registry: Arc::clone(&self.registry),
            key,
            id,
            rx,
        }
    }

    /// Deliver `state` to every view subscribed for `user_id`.
    ///
    /// Returns the number of views it was delivered to.
    pub fn publish(&self, user_id: &str, state: SessionState) -> usize {
        let delivered = self
            .registry
            .slots
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .filter(|entry| entry.value().tx.send(state.clone()).is_ok())
            .count();

        tracing::debug!(user_id, delivered, state = ?state, "Published session state");
        delivered
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.registry.slots.len()
    }
}

impl SessionSubscription {
    fn is_current(&self) -> bool {
        self.registry
            .slots
            .get(&self.key)
            .is_some_and(|slot| slot.id == self.id)
    }

    /// Wait for the next state.
    ///
    /// Returns `None` once this subscription has been replaced; anything
    /// still queued for it is discarded.
    pub async fn recv(&mut self) -> Option<SessionState> {
        let state = self.rx.recv().await?;
        if self.is_current() {
            Some(state)
        } else {
            tracing::debug!(view = %self.key.1, "Discarding state for replaced subscription");
            self.rx.close();
            None
        }
    }

    pub fn view(&self) -> &str {
        &self.key.1
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        // Only remove our own slot; a newer subscription may have replaced it.
        let id = self.id;
        self.registry.slots.remove_if(&self.key, |_, slot| slot.id == id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> SessionState {
        SessionState::SignedIn {
            uid: "u1".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_each_view() {
        let hub = SessionHub::new();
        let mut dashboard = hub.subscribe("u1", "dashboard");
        let mut profile = hub.subscribe("u1", "profile");
        let _other = hub.subscribe("u2", "dashboard");

        assert_eq!(hub.publish("u1", SessionState::SignedOut), 2);
        assert_eq!(dashboard.recv().await, Some(SessionState::SignedOut));
        assert_eq!(profile.recv().await, Some(SessionState::SignedOut));
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_previous() {
        let hub = SessionHub::new();
        let mut first = hub.subscribe("u1", "dashboard");
        let mut second = hub.subscribe("u1", "dashboard");
        assert_eq!(hub.subscription_count(), 1);

        hub.publish("u1", signed_in());
        assert_eq!(second.recv().await, Some(signed_in()));
        // The replaced subscription's sender is gone
        assert_eq!(first.recv().await, None);
    }

    #[tokio::test]
    async fn test_replaced_subscription_discards_queued_state() {
        let hub = SessionHub::new();
        let mut first = hub.subscribe("u1", "dashboard");
        hub.publish("u1", signed_in());

        let _second = hub.subscribe("u1", "dashboard");
        assert_eq!(first.recv().await, None);
    }

    #[test]
    fn test_drop_unregisters() {
        let hub = SessionHub::new();
        let sub = hub.subscribe("u1", "dashboard");
        assert_eq!(hub.subscription_count(), 1);
        drop(sub);
        assert_eq!(hub.subscription_count(), 0);
        assert_eq!(hub.publish("u1", SessionState::SignedOut), 0);
    }

    #[test]
    fn test_dropping_replaced_subscription_keeps_newer() {
        let hub = SessionHub::new();
        let first = hub.subscribe("u1", "dashboard");
        let _second = hub.subscribe("u1", "dashboard");
        drop(first);
        assert_eq!(hub.subscription_count(), 1);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(SessionState::SignedOut).unwrap();
        assert_eq!(json["state"], "signed_out");

        let json = serde_json::to_value(signed_in()).unwrap();
        assert_eq!(json["state"], "signed_in");
        assert_eq!(json["uid"], "u1");
    }
}
