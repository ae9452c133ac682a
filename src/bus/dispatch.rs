// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topic dispatch table for inbound messages.
//!
//! Maps exact subscription topics to their registered handlers. Several
//! handlers may share one topic (two buttons of one device report on the
//! same `action` topic), so topics hold handler lists and the transport
//! layer subscribes at the broker only for the first handler and
//! unsubscribes after the last one is gone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::{MessageHandler, SubscriptionId};

struct Route {
    id: SubscriptionId,
    handler: MessageHandler,
}

/// Dispatch table from exact topic strings to message handlers.
///
/// Thread-safe; dispatch snapshots the handler list so callbacks run
/// without holding the table lock.
#[derive(Default)]
pub struct TopicDispatcher {
    next_id: AtomicU64,
    routes: RwLock<HashMap<String, Vec<Route>>>,
}

impl TopicDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a topic and returns its subscription id.
    pub fn register(&self, topic: impl Into<String>, handler: MessageHandler) -> SubscriptionId {
        let topic = topic.into();
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(topic = %topic, id = %id, "Registering handler for topic");
        self.routes
            .write()
            .entry(topic)
            .or_default()
            .push(Route { id, handler });
        id
    }

    /// Removes a handler by subscription id.
    ///
    /// Returns the topic the handler was registered for, or `None` if the
    /// id is unknown.
    pub fn unregister(&self, id: SubscriptionId) -> Option<String> {
        let mut routes = self.routes.write();
        let topic = routes
            .iter()
            .find(|(_, handlers)| handlers.iter().any(|route| route.id == id))
            .map(|(topic, _)| topic.clone())?;

        let handlers = routes.get_mut(&topic)?;
        handlers.retain(|route| route.id != id);
        if handlers.is_empty() {
            let _ = routes.remove(&topic);
        }
        tracing::debug!(topic = %topic, id = %id, "Unregistered handler");
        Some(topic)
    }

    /// Returns `true` if at least one handler is registered for the topic.
    #[must_use]
    pub fn has_topic(&self, topic: &str) -> bool {
        self.routes.read().contains_key(topic)
    }

    /// Delivers a message to every handler registered for its topic.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, topic: &str, payload: &str) -> usize {
        let handlers: Vec<MessageHandler> = {
            let routes = self.routes.read();
            match routes.get(topic) {
                Some(handlers) => handlers.iter().map(|r| r.handler.clone()).collect(),
                None => {
                    tracing::trace!(topic = %topic, "No handler for topic");
                    return 0;
                }
            }
        };

        for handler in &handlers {
            handler(topic, payload);
        }
        handlers.len()
    }

    /// Returns the number of distinct topics with handlers.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.routes.read().len()
    }

    /// Returns the total number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.routes.read().values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for TopicDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicDispatcher")
            .field("topic_count", &self.topic_count())
            .field("handler_count", &self.handler_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;

    fn counting_handler(counter: &Arc<AtomicU32>) -> MessageHandler {
        let counter = Arc::clone(counter);
        Arc::new(move |_topic, _payload| {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn register_and_dispatch() {
        let dispatcher = TopicDispatcher::new();
        let counter = Arc::new(AtomicU32::new(0));
        let _id = dispatcher.register("zigbee/0x1/action", counting_handler(&counter));

        assert_eq!(dispatcher.dispatch("zigbee/0x1/action", "ON"), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_unknown_topic() {
        let dispatcher = TopicDispatcher::new();
        assert_eq!(dispatcher.dispatch("nobody/home", "ON"), 0);
    }

    #[test]
    fn multiple_handlers_share_a_topic() {
        let dispatcher = TopicDispatcher::new();
        let counter = Arc::new(AtomicU32::new(0));
        let _a = dispatcher.register("zigbee/0x1/action", counting_handler(&counter));
        let _b = dispatcher.register("zigbee/0x1/action", counting_handler(&counter));

        assert_eq!(dispatcher.topic_count(), 1);
        assert_eq!(dispatcher.handler_count(), 2);
        assert_eq!(dispatcher.dispatch("zigbee/0x1/action", "ON"), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unregister_removes_only_target() {
        let dispatcher = TopicDispatcher::new();
        let counter = Arc::new(AtomicU32::new(0));
        let a = dispatcher.register("zigbee/0x1/action", counting_handler(&counter));
        let _b = dispatcher.register("zigbee/0x1/action", counting_handler(&counter));

        assert_eq!(dispatcher.unregister(a).as_deref(), Some("zigbee/0x1/action"));
        assert!(dispatcher.has_topic("zigbee/0x1/action"));
        assert_eq!(dispatcher.dispatch("zigbee/0x1/action", "ON"), 1);
    }

    #[test]
    fn topic_drops_with_last_handler() {
        let dispatcher = TopicDispatcher::new();
        let counter = Arc::new(AtomicU32::new(0));
        let id = dispatcher.register("zigbee/0x1/action", counting_handler(&counter));

        assert!(dispatcher.unregister(id).is_some());
        assert!(!dispatcher.has_topic("zigbee/0x1/action"));
        assert_eq!(dispatcher.topic_count(), 0);
    }

    #[test]
    fn unregister_unknown_id() {
        let dispatcher = TopicDispatcher::new();
        assert!(dispatcher.unregister(SubscriptionId::new(999)).is_none());
    }

    #[test]
    fn handlers_receive_topic_and_payload() {
        let dispatcher = TopicDispatcher::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::<(String, String)>::new()));
        let seen_clone = Arc::clone(&seen);
        let _id = dispatcher.register(
            "shellies/s1/status/0",
            Arc::new(move |topic, payload| {
                seen_clone.lock().push((topic.to_string(), payload.to_string()));
            }),
        );

        let _ = dispatcher.dispatch("shellies/s1/status/0", r#"{"output": true}"#);
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "shellies/s1/status/0");
        assert_eq!(seen[0].1, r#"{"output": true}"#);
    }
}
