// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `SwitchSync` library.
//!
//! This module provides the error hierarchy for handling failures across the
//! library: group/switch configuration and transport-boundary communication.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error in group or switch configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error at the transport boundary.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The referenced group does not exist in the registry.
    #[error("switch group not found")]
    GroupNotFound,
}

/// Errors raised while declaring groups and their member switches.
///
/// These are configuration-time failures: they surface from the registration
/// API, before a group starts subscribing, and never from the message path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The vendor discriminator does not name a known adapter variant.
    #[error("unknown switch vendor: {0}")]
    UnknownVendor(String),

    /// Two members of one group share the same (device, button) identity.
    #[error("duplicate switch {device_id}/{button} in group")]
    DuplicateMember {
        /// Physical identifier of the clashing switch.
        device_id: String,
        /// Button name of the clashing switch.
        button: String,
    },

    /// Membership is frozen once a group has started its subscriptions.
    #[error("group is already running; membership is fixed")]
    GroupRunning,
}

/// Errors related to the transport boundary (MQTT).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::UnknownVendor("Foo".to_string());
        assert_eq!(err.to_string(), "unknown switch vendor: Foo");
    }

    #[test]
    fn duplicate_member_display() {
        let err = ConfigError::DuplicateMember {
            device_id: "0x1234".to_string(),
            button: "left".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate switch 0x1234/left in group");
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::GroupRunning.into();
        assert!(matches!(err, Error::Config(ConfigError::GroupRunning)));
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::InvalidAddress("no host".to_string());
        assert_eq!(err.to_string(), "invalid address: no host");
    }

    #[test]
    fn group_not_found_display() {
        assert_eq!(Error::GroupNotFound.to_string(), "switch group not found");
    }
}
