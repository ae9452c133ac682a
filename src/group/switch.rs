// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch members and their identity keys.

use std::fmt;

use crate::adapter::{NormalizedState, VendorAdapter};
use crate::error::ConfigError;
use crate::types::ButtonName;

/// Identity of a switch-button within a group: (device, button).
///
/// No two members of one group may share the same key. The key is also what
/// the debounce cache is indexed by, and what excludes the originator from
/// its own fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwitchKey {
    device_id: String,
    button: ButtonName,
}

impl SwitchKey {
    /// Creates a key from its parts.
    #[must_use]
    pub fn new(device_id: impl Into<String>, button: ButtonName) -> Self {
        Self {
            device_id: device_id.into(),
            button,
        }
    }

    /// Returns the physical device identifier.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the button name.
    #[must_use]
    pub fn button(&self) -> &ButtonName {
        &self.button
    }
}

impl fmt::Display for SwitchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.button)
    }
}

/// One logical control surface of a physical device, bound to its vendor
/// adapter.
///
/// A switch is created through the factory ([`Switch::create`]) when an
/// operator registers it into a group, and is immutable thereafter. It does
/// not hold a reference to its group; groups own their switches and are
/// looked up by id in the service registry.
///
/// # Examples
///
/// ```
/// use switchsync_lib::group::Switch;
/// use switchsync_lib::types::ButtonName;
///
/// let switch = Switch::create("Aqara", "zigbee", "0x1234", ButtonName::unnamed())?;
/// assert_eq!(switch.subscription_topic(), "zigbee/0x1234/action");
/// # Ok::<(), switchsync_lib::error::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Switch {
    adapter: VendorAdapter,
    topic_prefix: String,
    device_id: String,
    button: ButtonName,
}

impl Switch {
    /// Creates a switch bound to the adapter matching the vendor
    /// discriminator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownVendor`] when the discriminator names
    /// no known adapter variant. This surfaces at registration time, before
    /// any subscription is made.
    pub fn create(
        vendor: &str,
        topic_prefix: impl Into<String>,
        device_id: impl Into<String>,
        button: ButtonName,
    ) -> Result<Self, ConfigError> {
        let adapter = VendorAdapter::for_vendor(vendor)?;
        Ok(Self {
            adapter,
            topic_prefix: topic_prefix.into(),
            device_id: device_id.into(),
            button,
        })
    }

    /// Returns the adapter variant this switch is bound to.
    #[must_use]
    pub fn adapter(&self) -> VendorAdapter {
        self.adapter
    }

    /// Returns the vendor/site-specific topic prefix.
    #[must_use]
    pub fn topic_prefix(&self) -> &str {
        &self.topic_prefix
    }

    /// Returns the stable physical identifier (e.g. a MAC).
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the button name.
    #[must_use]
    pub fn button(&self) -> &ButtonName {
        &self.button
    }

    /// Returns the identity key of this switch.
    #[must_use]
    pub fn key(&self) -> SwitchKey {
        SwitchKey::new(self.device_id.clone(), self.button.clone())
    }

    /// Returns the topic this switch listens on for state reports.
    #[must_use]
    pub fn subscription_topic(&self) -> String {
        self.adapter.subscription_topic(self)
    }

    /// Decodes an inbound message addressed to this switch's subscription.
    ///
    /// Returns `None` for malformed or irrelevant payloads.
    #[must_use]
    pub fn decode(&self, topic: &str, payload: &str) -> Option<NormalizedState> {
        self.adapter.decode(self, topic, payload)
    }

    /// Returns the topic commands for this switch are published to.
    #[must_use]
    pub fn command_topic(&self) -> String {
        self.adapter.command_topic(self)
    }

    /// Encodes a target state into this switch's command payload.
    #[must_use]
    pub fn encode(&self, target_state: &str) -> String {
        self.adapter.encode(self, target_state)
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Id:{}, Btn:{})", self.device_id, self.button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_binds_matching_adapter() {
        let aqara = Switch::create("Aqara", "zigbee", "0x1", ButtonName::unnamed()).unwrap();
        assert_eq!(aqara.adapter(), VendorAdapter::BasicSwitch);

        let shelly = Switch::create("Shelly", "shellies", "s1", ButtonName::new("0")).unwrap();
        assert_eq!(shelly.adapter(), VendorAdapter::ShellyRelay);
    }

    #[test]
    fn factory_rejects_unknown_vendor() {
        let err = Switch::create("Foo", "zigbee", "0x1", ButtonName::unnamed()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownVendor(_)));
    }

    #[test]
    fn key_identity() {
        let a = Switch::create("Aqara", "zigbee", "0x1", ButtonName::new("left")).unwrap();
        let b = Switch::create("Tuya", "other", "0x1", ButtonName::new("left")).unwrap();
        let c = Switch::create("Aqara", "zigbee", "0x1", ButtonName::new("right")).unwrap();

        // Identity is (device, button); prefix and vendor do not contribute.
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn key_display() {
        let key = SwitchKey::new("0x1234", ButtonName::new("left"));
        assert_eq!(key.to_string(), "0x1234/left");
    }

    #[test]
    fn switch_display_shows_identity() {
        let switch = Switch::create("Aqara", "zigbee", "0x1234", ButtonName::unnamed()).unwrap();
        assert_eq!(switch.to_string(), "(Id:0x1234, Btn:main)");
    }
}
