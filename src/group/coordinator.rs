// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group coordination: turning one member's state report into commands for
//! the rest of its group.
//!
//! Handling one inbound message is fully synchronous: decode, record the
//! originator's state, then fan the target state out to every same-button
//! member that is not already converged. Fan-outs for one group are
//! serialized by a per-group lock, so two buttons can never race the group
//! to opposite states; unrelated groups share nothing and proceed
//! concurrently. Publishes are fire-and-forget, and every command is
//! recorded optimistically in the cache so duplicate deliveries of the
//! same report produce no outbound traffic.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::bus::MessageBus;
use crate::cache::StateCache;
use crate::group::Switch;
use crate::types::GroupId;

/// State and fan-out logic of one running switch group.
///
/// Owns the group's debounce cache and its members (each bound to one
/// adapter). The bus is shared across groups; handlers registered there
/// hold only weak references back to this core.
pub(crate) struct GroupCore {
    id: GroupId,
    members: Vec<Switch>,
    cache: StateCache,
    state_ttl: Duration,
    bus: Arc<dyn MessageBus>,
    /// Serializes fan-outs for this group only.
    fanout_lock: Mutex<()>,
}

impl GroupCore {
    pub(crate) fn new(
        id: GroupId,
        members: Vec<Switch>,
        state_ttl: Duration,
        bus: Arc<dyn MessageBus>,
    ) -> Self {
        Self {
            id,
            members,
            cache: StateCache::new(),
            state_ttl,
            bus,
            fanout_lock: Mutex::new(()),
        }
    }

    pub(crate) fn id(&self) -> GroupId {
        self.id
    }

    pub(crate) fn members(&self) -> &[Switch] {
        &self.members
    }

    /// Returns the distinct topics this group listens on.
    ///
    /// Buttons of one device share a report topic, so this can be shorter
    /// than the member list.
    pub(crate) fn subscription_topics(&self) -> Vec<String> {
        let mut topics = Vec::new();
        for member in &self.members {
            let topic = member.subscription_topic();
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        topics
    }

    /// Handles one inbound (topic, payload) delivered by the bus.
    ///
    /// Resolves the owning member by subscription topic, decodes, and on
    /// success applies the state change. Malformed or irrelevant messages
    /// are dropped without side effects.
    pub(crate) fn handle_message(&self, topic: &str, payload: &str) {
        for member in &self.members {
            if member.subscription_topic() != topic {
                continue;
            }
            let Some(normalized) = member.decode(topic, payload) else {
                continue;
            };
            // Identity keys are unique, so at most one member decodes this.
            self.apply_state_change(member, &normalized.state);
            return;
        }

        tracing::trace!(
            group = %self.id,
            topic = %topic,
            "No member claimed message"
        );
    }

    /// Records the originator's observed state and fans it out.
    fn apply_state_change(&self, originator: &Switch, target: &str) {
        tracing::info!(
            group = %self.id,
            switch = %originator,
            state = %target,
            "Switch state updated"
        );

        self.cache
            .set(originator.key(), target, self.state_ttl);

        let _guard = self.fanout_lock.lock();
        for candidate in &self.members {
            if candidate.button() != originator.button() {
                continue;
            }
            let key = candidate.key();
            if key == originator.key() {
                // Never echo back to the source; the broker will already
                // replay our command as its next status update.
                continue;
            }
            if self.cache.get(&key).as_deref() == Some(target) {
                tracing::trace!(group = %self.id, switch = %candidate, "Already converged");
                continue;
            }

            let command_topic = candidate.command_topic();
            let payload = candidate.encode(target);
            tracing::debug!(
                group = %self.id,
                switch = %candidate,
                topic = %command_topic,
                state = %target,
                "Fanning out state"
            );
            self.bus.publish(&command_topic, &payload);
            // Optimistic: assume the command lands. A later status report
            // reconciles if it does not.
            self.cache.set(key, target, self.state_ttl);
        }
    }

    /// Blocks until any in-flight fan-out has completed.
    ///
    /// Used during teardown, after the group's topics are unsubscribed.
    pub(crate) fn quiesce(&self) {
        drop(self.fanout_lock.lock());
    }

    #[cfg(test)]
    pub(crate) fn cached_state(&self, key: &crate::group::SwitchKey) -> Option<String> {
        self.cache.get(key)
    }
}

impl std::fmt::Debug for GroupCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupCore")
            .field("id", &self.id)
            .field("members", &self.members.len())
            .finish()
    }
}
