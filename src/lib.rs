// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `SwitchSync` Lib - A Rust library to keep groups of smart switches in sync.
//!
//! This library mirrors the on/off state of a physical switch-button across
//! a group of heterogeneous smart-home devices over MQTT: when one device
//! reports a state change, every other device in its group is commanded to
//! the same state, without echoing back to the originator and without
//! re-sending commands the devices already satisfy.
//!
//! # How It Works
//!
//! - **Vendor adapters** translate each vendor's wire format (Aqara/Tuya
//!   compound action tokens, Shelly JSON relay status) into one canonical
//!   (button, state) pair and back.
//! - A **debounce cache** remembers each switch's last known state for a
//!   short TTL, so duplicate or retained broker deliveries never trigger a
//!   burst of redundant commands.
//! - A **group coordinator** serializes fan-outs per group: two buttons can
//!   never race one group to opposite states, while unrelated groups
//!   proceed concurrently.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use switchsync_lib::{MqttBus, SwitchGroups};
//! use switchsync_lib::types::ButtonName;
//!
//! #[tokio::main]
//! async fn main() -> switchsync_lib::Result<()> {
//!     // One broker connection shared by every group
//!     let bus = Arc::new(
//!         MqttBus::builder()
//!             .host("192.168.1.50")
//!             .port(1883)
//!             .credentials("user", "password")
//!             .build()
//!             .await?,
//!     );
//!
//!     let service = SwitchGroups::new(bus);
//!
//!     // A hallway group: two one-button Aqara switches and a Shelly relay
//!     let hallway = service.register_group();
//!     service.add_switch(hallway, "Aqara", "zigbee2mqtt", "0x04cf8cdf", ButtonName::unnamed())?;
//!     service.add_switch(hallway, "Aqara", "zigbee2mqtt", "0x04cf8ce0", ButtonName::unnamed())?;
//!     service.run_group(hallway)?;
//!
//!     // Groups run until stopped
//!     tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
//!     service.stop_group(hallway)?;
//!     Ok(())
//! }
//! ```
//!
//! # Testing Without a Broker
//!
//! The [`bus::LoopbackBus`] short-circuits the broker for tests and dry
//! runs: inbound reports are injected directly and outbound commands are
//! recorded for inspection.
//!
//! ```
//! use std::sync::Arc;
//! use switchsync_lib::SwitchGroups;
//! use switchsync_lib::bus::LoopbackBus;
//! use switchsync_lib::types::ButtonName;
//!
//! # fn main() -> switchsync_lib::Result<()> {
//! let bus = Arc::new(LoopbackBus::new());
//! let service = SwitchGroups::new(bus.clone());
//!
//! let group = service.register_group();
//! service.add_switch(group, "Aqara", "zigbee", "A", ButtonName::unnamed())?;
//! service.add_switch(group, "Aqara", "zigbee", "B", ButtonName::unnamed())?;
//! service.run_group(group)?;
//!
//! // Device A reports ON; device B gets commanded to follow.
//! bus.inject("zigbee/A/action", "ON");
//! assert_eq!(
//!     bus.take_published(),
//!     vec![("zigbee/B/set/state".to_string(), "ON".to_string())]
//! );
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod bus;
pub mod cache;
pub mod error;
pub mod group;
pub mod service;
pub mod types;

pub use adapter::{NormalizedState, VendorAdapter};
pub use bus::{LoopbackBus, MessageBus, MessageHandler, SubscriptionId};
#[cfg(feature = "mqtt")]
pub use bus::{MqttBus, MqttBusBuilder, MqttBusConfig};
pub use cache::StateCache;
pub use error::{ConfigError, Error, ProtocolError, Result};
pub use group::{Switch, SwitchKey};
pub use service::{GroupSettings, SwitchGroups};
pub use types::{ButtonName, GroupId};
