// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Publish/subscribe boundary consumed by the coordination core.
//!
//! The core never talks to a broker directly; it goes through the
//! [`MessageBus`] trait. Publish and subscribe are fire-and-forget: a slow
//! or unavailable broker must not stall the dispatch path, so no delivery
//! acknowledgment is surfaced to callers. Implementations log failures and
//! the core proceeds, relying on the next inbound status report for
//! eventual convergence.

mod dispatch;
mod loopback;
#[cfg(feature = "mqtt")]
mod mqtt;

pub use dispatch::TopicDispatcher;
pub use loopback::LoopbackBus;
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttBus, MqttBusBuilder, MqttBusConfig};

use std::fmt;
use std::sync::Arc;

/// Handler invoked with (topic, payload) for each inbound message on a
/// subscribed topic.
pub type MessageHandler = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Unique identifier for one topic subscription.
///
/// Returned by [`MessageBus::subscribe`] and used to unsubscribe later.
/// IDs are unique within a bus instance's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Transport boundary contract.
///
/// The bus is the one resource shared across all switch groups; the core
/// only issues subscribe/unsubscribe/publish calls and never mutates the
/// connection itself.
pub trait MessageBus: Send + Sync {
    /// Registers a handler for an exact topic and starts delivery.
    fn subscribe(&self, topic: &str, handler: MessageHandler) -> SubscriptionId;

    /// Removes a previously registered handler.
    ///
    /// Returns `true` if the subscription existed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Publishes a payload to a topic, fire-and-forget.
    ///
    /// Failures are the implementation's concern; callers receive no result
    /// and must not be stalled.
    fn publish(&self, topic: &str, payload: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_id_display() {
        assert_eq!(SubscriptionId::new(42).to_string(), "Sub(42)");
    }

    #[test]
    fn subscription_id_equality() {
        assert_eq!(SubscriptionId::new(1), SubscriptionId::new(1));
        assert_ne!(SubscriptionId::new(1), SubscriptionId::new(2));
    }
}
