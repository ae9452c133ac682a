// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT implementation of the message bus.
//!
//! One persistent broker connection is shared by every switch group; groups
//! only issue subscribe/publish calls against it. Publishing goes through
//! the client's non-blocking queue (`try_publish`), so the dispatch path
//! never waits on the broker: a failed enqueue is logged and dropped, and
//! the next inbound status report restores convergence.
//!
//! # Examples
//!
//! ```no_run
//! use switchsync_lib::bus::MqttBus;
//!
//! # async fn example() -> switchsync_lib::error::Result<()> {
//! let bus = MqttBus::builder()
//!     .host("192.168.1.50")
//!     .port(1883)
//!     .credentials("user", "password")
//!     .build()
//!     .await?;
//!
//! assert!(bus.is_connected());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::oneshot;

use crate::error::ProtocolError;

use super::{MessageBus, MessageHandler, SubscriptionId, TopicDispatcher};

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Configuration for an MQTT bus connection.
#[derive(Debug, Clone)]
pub struct MqttBusConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    connection_timeout: Duration,
}

impl Default for MqttBusConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
        }
    }
}

/// An MQTT-backed [`MessageBus`].
///
/// Cheaply cloneable (via `Arc`); all clones share one broker connection
/// and one dispatch table.
#[derive(Clone)]
pub struct MqttBus {
    inner: Arc<MqttBusInner>,
}

struct MqttBusInner {
    /// The MQTT async client for publishing and subscribing.
    client: AsyncClient,
    /// Dispatch table from subscription topics to group handlers.
    dispatcher: TopicDispatcher,
    /// Configuration used for this connection.
    config: MqttBusConfig,
    /// Connection status.
    connected: AtomicBool,
}

impl MqttBus {
    /// Creates a new builder for configuring an MQTT bus connection.
    #[must_use]
    pub fn builder() -> MqttBusBuilder {
        MqttBusBuilder::default()
    }

    /// Returns whether the bus is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the host address of the broker.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    /// Returns the port of the broker.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.inner.config.port
    }

    /// Returns whether authentication is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.inner.config.credentials.is_some()
    }

    /// Returns the number of distinct subscribed topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.inner.dispatcher.topic_count()
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect operation fails.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );
        self.inner
            .client
            .disconnect()
            .await
            .map_err(ProtocolError::Mqtt)?;
        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }
}

impl MessageBus for MqttBus {
    fn subscribe(&self, topic: &str, handler: MessageHandler) -> SubscriptionId {
        let first_for_topic = !self.inner.dispatcher.has_topic(topic);
        let id = self.inner.dispatcher.register(topic, handler);

        if first_for_topic
            && let Err(e) = self.inner.client.try_subscribe(topic, QoS::AtLeastOnce)
        {
            tracing::warn!(topic = %topic, error = %e, "MQTT subscribe failed");
        }
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Some(topic) = self.inner.dispatcher.unregister(id) else {
            return false;
        };

        if !self.inner.dispatcher.has_topic(&topic)
            && let Err(e) = self.inner.client.try_unsubscribe(&topic)
        {
            tracing::warn!(topic = %topic, error = %e, "MQTT unsubscribe failed");
        }
        true
    }

    fn publish(&self, topic: &str, payload: &str) {
        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT command");
        if let Err(e) = self
            .inner
            .client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
        {
            // Fire-and-forget: the next status report re-triggers convergence.
            tracing::warn!(topic = %topic, error = %e, "MQTT publish failed");
        }
    }
}

impl std::fmt::Debug for MqttBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBus")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Builder for creating an MQTT bus connection.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use switchsync_lib::bus::MqttBus;
///
/// # async fn example() -> switchsync_lib::error::Result<()> {
/// let bus = MqttBus::builder()
///     .host("192.168.1.50")
///     .port(1883)
///     .credentials("user", "password")
///     .keep_alive(Duration::from_secs(60))
///     .connection_timeout(Duration::from_secs(5))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MqttBusBuilder {
    config: MqttBusConfig,
}

impl MqttBusBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Builds and connects to the MQTT broker.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host is not set
    /// - Connection fails
    /// - Connection times out
    pub async fn build(self) -> Result<MqttBus, ProtocolError> {
        if self.config.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        // Generate unique client ID
        let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let client_id = format!("switchsync_{}_{}", std::process::id(), counter);

        let mut mqtt_options = MqttOptions::new(&client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);

        let bus = MqttBus {
            inner: Arc::new(MqttBusInner {
                client,
                dispatcher: TopicDispatcher::new(),
                config: self.config.clone(),
                connected: AtomicBool::new(false),
            }),
        };

        // Channel to signal when ConnAck is received
        let (connack_tx, connack_rx) = oneshot::channel();

        // Spawn event loop handler
        let bus_clone = bus.clone();
        let _handle = tokio::spawn(async move {
            handle_bus_events(event_loop, bus_clone, Some(connack_tx)).await;
        });

        // Wait for ConnAck with timeout
        let timeout = self.config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                bus.inner.connected.store(true, Ordering::Release);
                tracing::info!(
                    host = %self.config.host,
                    port = %self.config.port,
                    "Connected to MQTT broker"
                );
            }
            Ok(Err(_)) => {
                return Err(ProtocolError::ConnectionFailed(
                    "MQTT event loop terminated unexpectedly".to_string(),
                ));
            }
            Err(_) => {
                return Err(ProtocolError::ConnectionFailed(format!(
                    "MQTT connection timeout after {}s",
                    timeout.as_secs()
                )));
            }
        }

        Ok(bus)
    }
}

/// Handles MQTT events for the bus connection.
async fn handle_bus_events(
    mut event_loop: EventLoop,
    bus: MqttBus,
    connack_tx: Option<oneshot::Sender<()>>,
) {
    use rumqttc::{Event, Packet};

    let mut connack_tx = connack_tx;

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT connected");
                bus.inner.connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if let Ok(payload) = String::from_utf8(publish.payload.to_vec()) {
                    tracing::debug!(
                        topic = %publish.topic,
                        payload = %payload,
                        "MQTT message received"
                    );
                    let _ = bus.inner.dispatcher.dispatch(&publish.topic, &payload);
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                bus.inner.connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error");
                bus.inner.connected.store(false, Ordering::Release);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_default_values() {
        let builder = MqttBusBuilder::default();
        assert_eq!(builder.config.port, 1883);
        assert!(builder.config.host.is_empty());
        assert!(builder.config.credentials.is_none());
        assert_eq!(builder.config.keep_alive, Duration::from_secs(30));
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_chain() {
        let builder = MqttBusBuilder::default()
            .host("192.168.1.50")
            .port(8883)
            .credentials("admin", "secret")
            .keep_alive(Duration::from_secs(45))
            .connection_timeout(Duration::from_secs(15));

        assert_eq!(builder.config.host, "192.168.1.50");
        assert_eq!(builder.config.port, 8883);
        assert!(builder.config.credentials.is_some());
        assert_eq!(builder.config.keep_alive, Duration::from_secs(45));
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn builder_missing_host_fails() {
        let result = MqttBusBuilder::default().build().await;
        assert!(matches!(
            result.unwrap_err(),
            ProtocolError::InvalidAddress(_)
        ));
    }

    #[test]
    fn config_default() {
        let config = MqttBusConfig::default();
        assert!(config.host.is_empty());
        assert_eq!(config.port, 1883);
        assert!(config.credentials.is_none());
    }
}
