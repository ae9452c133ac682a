// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor adapters: per-vendor message codecs.
//!
//! An adapter translates between a vendor's wire format and the canonical
//! (button, state) pair the coordination layer works with. Adapters form a
//! closed set of variants with one decode/encode arm each; supporting a new
//! vendor family means adding one variant, not a type hierarchy.
//!
//! # Wire formats
//!
//! | Vendor family | Inbound | Outbound |
//! |---|---|---|
//! | `BasicSwitch` (Aqara, Tuya) | `{prefix}/{id}/action` with `"<STATE>_<BUTTON>"` or bare `"<STATE>"` | `{prefix}/{id}/set/state[_{button}]` with `"<STATE>"` |
//! | `ShellyRelay` | `{prefix}/{id}/status/{button}` with `{"output": <bool>}` | `{prefix}/{id}/command/{button}` with `"on"`/`"off"` |

mod basic_switch;
mod shelly;

use crate::error::ConfigError;
use crate::group::Switch;
use crate::types::ButtonName;

/// A decoded inbound message, normalized across vendors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedState {
    /// The button the report refers to.
    pub button: ButtonName,
    /// The reported state value, in the vendor's own spelling.
    pub state: String,
}

/// Message codec for one vendor family.
///
/// Selected at registration time from a vendor discriminator string via
/// [`VendorAdapter::for_vendor`]; an unknown discriminator is a configuration
/// error and never reaches the message path.
///
/// # Examples
///
/// ```
/// use switchsync_lib::adapter::VendorAdapter;
///
/// assert!(VendorAdapter::for_vendor("Aqara").is_ok());
/// assert!(VendorAdapter::for_vendor("Shelly").is_ok());
/// assert!(VendorAdapter::for_vendor("Foo").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorAdapter {
    /// Compound-token protocol shared by the Aqara/Tuya switch families.
    BasicSwitch,
    /// JSON relay-status protocol spoken by Shelly devices.
    ShellyRelay,
}

impl VendorAdapter {
    /// Resolves a vendor discriminator string to its adapter variant.
    ///
    /// Accepts `"Aqara"` and `"Tuya"` for the compound-token family and
    /// `"Shelly"` for relays, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownVendor`] for any other discriminator.
    pub fn for_vendor(vendor: &str) -> Result<Self, ConfigError> {
        match vendor.to_ascii_lowercase().as_str() {
            "aqara" | "tuya" => Ok(Self::BasicSwitch),
            "shelly" => Ok(Self::ShellyRelay),
            _ => Err(ConfigError::UnknownVendor(vendor.to_string())),
        }
    }

    /// Returns the topic a switch listens on for state reports.
    #[must_use]
    pub fn subscription_topic(self, switch: &Switch) -> String {
        match self {
            Self::BasicSwitch => basic_switch::subscription_topic(switch),
            Self::ShellyRelay => shelly::subscription_topic(switch),
        }
    }

    /// Decodes an inbound message into a normalized state report.
    ///
    /// Returns `None` for malformed payloads and for reports that belong to
    /// a different button of the same device; both are dropped silently.
    #[must_use]
    pub fn decode(self, switch: &Switch, topic: &str, payload: &str) -> Option<NormalizedState> {
        match self {
            Self::BasicSwitch => basic_switch::decode(switch, topic, payload),
            Self::ShellyRelay => shelly::decode(switch, topic, payload),
        }
    }

    /// Returns the topic a command for this switch is published to.
    #[must_use]
    pub fn command_topic(self, switch: &Switch) -> String {
        match self {
            Self::BasicSwitch => basic_switch::command_topic(switch),
            Self::ShellyRelay => shelly::command_topic(switch),
        }
    }

    /// Encodes a target state into the vendor's command payload.
    #[must_use]
    pub fn encode(self, switch: &Switch, target_state: &str) -> String {
        match self {
            Self::BasicSwitch => basic_switch::encode(switch, target_state),
            Self::ShellyRelay => shelly::encode(switch, target_state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_lookup_is_case_insensitive() {
        assert_eq!(
            VendorAdapter::for_vendor("aqara").unwrap(),
            VendorAdapter::BasicSwitch
        );
        assert_eq!(
            VendorAdapter::for_vendor("TUYA").unwrap(),
            VendorAdapter::BasicSwitch
        );
        assert_eq!(
            VendorAdapter::for_vendor("shelly").unwrap(),
            VendorAdapter::ShellyRelay
        );
    }

    #[test]
    fn unknown_vendor_is_config_error() {
        let err = VendorAdapter::for_vendor("Foo").unwrap_err();
        assert_eq!(err, ConfigError::UnknownVendor("Foo".to_string()));
    }
}
