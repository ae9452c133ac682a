// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process message bus for tests and broker-less runs.

use parking_lot::Mutex;

use super::{MessageBus, MessageHandler, SubscriptionId, TopicDispatcher};

/// A [`MessageBus`] that short-circuits the broker.
///
/// Inbound traffic is injected with [`LoopbackBus::inject`]; outbound
/// publishes are recorded for inspection and also delivered to any local
/// subscriber of the target topic, which lets a test simulate a device by
/// subscribing to its own command topic.
///
/// # Examples
///
/// ```
/// use switchsync_lib::bus::{LoopbackBus, MessageBus};
///
/// let bus = LoopbackBus::new();
/// bus.publish("zigbee/0x1/set/state", "ON");
///
/// assert_eq!(
///     bus.take_published(),
///     vec![("zigbee/0x1/set/state".to_string(), "ON".to_string())]
/// );
/// ```
#[derive(Debug, Default)]
pub struct LoopbackBus {
    dispatcher: TopicDispatcher,
    published: Mutex<Vec<(String, String)>>,
}

impl LoopbackBus {
    /// Creates an empty loopback bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a message as if it arrived from the broker.
    ///
    /// Returns the number of handlers that received it.
    pub fn inject(&self, topic: &str, payload: &str) -> usize {
        self.dispatcher.dispatch(topic, payload)
    }

    /// Returns a snapshot of everything published so far.
    #[must_use]
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().clone()
    }

    /// Drains and returns everything published so far.
    #[must_use]
    pub fn take_published(&self) -> Vec<(String, String)> {
        std::mem::take(&mut self.published.lock())
    }

    /// Returns the number of distinct subscribed topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.dispatcher.topic_count()
    }
}

impl MessageBus for LoopbackBus {
    fn subscribe(&self, topic: &str, handler: MessageHandler) -> SubscriptionId {
        self.dispatcher.register(topic, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.dispatcher.unregister(id).is_some()
    }

    fn publish(&self, topic: &str, payload: &str) {
        tracing::debug!(topic = %topic, payload = %payload, "Loopback publish");
        self.published
            .lock()
            .push((topic.to_string(), payload.to_string()));
        let _ = self.dispatcher.dispatch(topic, payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn inject_reaches_subscriber() {
        let bus = LoopbackBus::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);
        let _id = bus.subscribe(
            "zigbee/0x1/action",
            Arc::new(move |_, _| {
                let _ = counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(bus.inject("zigbee/0x1/action", "ON"), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn publish_is_recorded() {
        let bus = LoopbackBus::new();
        bus.publish("a/b", "1");
        bus.publish("c/d", "2");

        assert_eq!(bus.published().len(), 2);
        assert_eq!(bus.take_published().len(), 2);
        assert!(bus.published().is_empty());
    }

    #[test]
    fn publish_loops_back_to_subscribers() {
        let bus = LoopbackBus::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);
        let _id = bus.subscribe(
            "zigbee/0x2/set/state",
            Arc::new(move |_, _| {
                let _ = counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        bus.publish("zigbee/0x2/set/state", "ON");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = LoopbackBus::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);
        let id = bus.subscribe(
            "zigbee/0x1/action",
            Arc::new(move |_, _| {
                let _ = counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.inject("zigbee/0x1/action", "ON"), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
