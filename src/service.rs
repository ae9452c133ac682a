// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registration API and group registry.
//!
//! The [`SwitchGroups`] service owns every group in an id-keyed registry.
//! Operators declare a group, add its member switches, then start it; from
//! that point membership is fixed until the group is torn down. All
//! configuration mistakes (unknown vendor, duplicate identity, late adds)
//! surface here, before any subscription is made.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use switchsync_lib::bus::LoopbackBus;
//! use switchsync_lib::service::SwitchGroups;
//! use switchsync_lib::types::ButtonName;
//!
//! # fn main() -> switchsync_lib::error::Result<()> {
//! let bus = Arc::new(LoopbackBus::new());
//! let service = SwitchGroups::new(bus);
//!
//! let group = service.register_group();
//! service.add_switch(group, "Aqara", "zigbee", "0x1234", ButtonName::unnamed())?;
//! service.add_switch(group, "Aqara", "zigbee", "0x5678", ButtonName::unnamed())?;
//! service.run_group(group)?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::bus::{MessageBus, MessageHandler, SubscriptionId};
use crate::error::{ConfigError, Error, Result};
use crate::group::Switch;
use crate::group::coordinator::GroupCore;
use crate::types::{ButtonName, GroupId};

/// Default lifetime of a debounce-cache entry.
const DEFAULT_STATE_TTL: Duration = Duration::from_secs(2);

/// Tunables shared by every group of one service.
#[derive(Debug, Clone)]
pub struct GroupSettings {
    state_ttl: Duration,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            state_ttl: DEFAULT_STATE_TTL,
        }
    }
}

impl GroupSettings {
    /// Creates settings with defaults (2 second state TTL).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how long a cached switch state stays trustworthy.
    #[must_use]
    pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = ttl;
        self
    }

    /// Returns the configured state TTL.
    #[must_use]
    pub fn state_ttl(&self) -> Duration {
        self.state_ttl
    }
}

/// One registry slot: a group being declared, or a started one.
enum GroupEntry {
    Building(Vec<Switch>),
    Running(RunningGroup),
}

struct RunningGroup {
    core: Arc<GroupCore>,
    subscriptions: Vec<SubscriptionId>,
}

/// Registry and lifecycle manager for switch groups.
///
/// Groups and their switches live here, keyed by [`GroupId`]; a switch
/// refers to its group by id only, never by reference. The service shares
/// one message bus across all groups and hands each running group's
/// handler to the bus as a weak reference, so dropping a group leaves no
/// dangling routes.
pub struct SwitchGroups {
    bus: Arc<dyn MessageBus>,
    settings: GroupSettings,
    groups: RwLock<HashMap<GroupId, GroupEntry>>,
}

impl SwitchGroups {
    /// Creates a service with default settings on the given bus.
    #[must_use]
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self::with_settings(bus, GroupSettings::default())
    }

    /// Creates a service with explicit settings.
    #[must_use]
    pub fn with_settings(bus: Arc<dyn MessageBus>, settings: GroupSettings) -> Self {
        Self {
            bus,
            settings,
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Declares a new, empty switch group and returns its handle.
    pub fn register_group(&self) -> GroupId {
        let id = GroupId::new();
        tracing::debug!(group = %id, "Registered switch group");
        let _ = self.groups.write().insert(id, GroupEntry::Building(Vec::new()));
        id
    }

    /// Adds a switch to a declared group.
    ///
    /// The vendor discriminator selects the adapter (`"Aqara"`/`"Tuya"`/
    /// `"Shelly"`). Use [`ButtonName::unnamed`] for one-button devices.
    ///
    /// # Errors
    ///
    /// - [`Error::GroupNotFound`] for a dangling group id
    /// - [`ConfigError::GroupRunning`] once the group has started
    /// - [`ConfigError::UnknownVendor`] for an unrecognized discriminator;
    ///   the group stays usable for its other members
    /// - [`ConfigError::DuplicateMember`] when (device, button) is taken
    pub fn add_switch(
        &self,
        group: GroupId,
        vendor: &str,
        topic_prefix: &str,
        device_id: &str,
        button: impl Into<ButtonName>,
    ) -> Result<()> {
        let button = button.into();
        let mut groups = self.groups.write();
        let entry = groups.get_mut(&group).ok_or(Error::GroupNotFound)?;
        let GroupEntry::Building(members) = entry else {
            return Err(ConfigError::GroupRunning.into());
        };

        let switch = Switch::create(vendor, topic_prefix, device_id, button)
            .map_err(Error::Config)?;
        if members.iter().any(|member| member.key() == switch.key()) {
            return Err(ConfigError::DuplicateMember {
                device_id: switch.device_id().to_string(),
                button: switch.button().as_str().to_string(),
            }
            .into());
        }

        tracing::debug!(group = %group, switch = %switch, "Added switch to group");
        members.push(switch);
        Ok(())
    }

    /// Starts a group: freezes its membership and subscribes every member
    /// topic on the bus.
    ///
    /// # Errors
    ///
    /// - [`Error::GroupNotFound`] for a dangling group id
    /// - [`ConfigError::GroupRunning`] when the group is already running
    pub fn run_group(&self, group: GroupId) -> Result<()> {
        let mut groups = self.groups.write();
        let entry = groups.get_mut(&group).ok_or(Error::GroupNotFound)?;
        let GroupEntry::Building(members) = &mut *entry else {
            return Err(ConfigError::GroupRunning.into());
        };

        let core = Arc::new(GroupCore::new(
            group,
            std::mem::take(members),
            self.settings.state_ttl(),
            Arc::clone(&self.bus),
        ));

        let mut subscriptions = Vec::new();
        for topic in core.subscription_topics() {
            let weak = Arc::downgrade(&core);
            let handler: MessageHandler = Arc::new(move |topic, payload| {
                if let Some(core) = weak.upgrade() {
                    core.handle_message(topic, payload);
                }
            });
            subscriptions.push(self.bus.subscribe(&topic, handler));
        }

        tracing::info!(
            group = %group,
            members = core.members().len(),
            topics = subscriptions.len(),
            "Switch group running"
        );
        *entry = GroupEntry::Running(RunningGroup {
            core,
            subscriptions,
        });
        Ok(())
    }

    /// Tears a group down: unsubscribes its topics, lets any in-flight
    /// fan-out finish, and discards its cache and adapters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GroupNotFound`] for a dangling group id.
    pub fn stop_group(&self, group: GroupId) -> Result<()> {
        let entry = self
            .groups
            .write()
            .remove(&group)
            .ok_or(Error::GroupNotFound)?;

        if let GroupEntry::Running(running) = entry {
            for id in running.subscriptions {
                let _ = self.bus.unsubscribe(id);
            }
            // A fan-out that already entered its critical section runs to
            // completion before the group state is dropped.
            running.core.quiesce();
        }

        tracing::info!(group = %group, "Switch group stopped");
        Ok(())
    }

    /// Returns the number of registered groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.read().len()
    }

    /// Returns whether a group has been started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GroupNotFound`] for a dangling group id.
    pub fn is_running(&self, group: GroupId) -> Result<bool> {
        match self.groups.read().get(&group) {
            Some(GroupEntry::Running(_)) => Ok(true),
            Some(GroupEntry::Building(_)) => Ok(false),
            None => Err(Error::GroupNotFound),
        }
    }

    /// Returns the number of switches in a group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GroupNotFound`] for a dangling group id.
    pub fn member_count(&self, group: GroupId) -> Result<usize> {
        match self.groups.read().get(&group) {
            Some(GroupEntry::Building(members)) => Ok(members.len()),
            Some(GroupEntry::Running(running)) => Ok(running.core.members().len()),
            None => Err(Error::GroupNotFound),
        }
    }
}

impl std::fmt::Debug for SwitchGroups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchGroups")
            .field("group_count", &self.group_count())
            .finish()
    }
}
