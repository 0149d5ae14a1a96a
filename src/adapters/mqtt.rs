//! MQTT inbound adapter.
//!
//! Feeds every received `(topic, payload)` into the
//! [`MessageRouter`] and re-subscribes to the device's wildcard topic on
//! every (re)connect.
//!
//! ```text
//!   ESP-MQTT task ──▶ connection thread ──on_message──▶ MessageRouter
//!                           │
//!                           └──on_connected──▶ Signal ──▶ subscriber (main)
//! ```
//!
//! The client API must not be called from the connection thread, so
//! subscribing happens on the caller's thread after the connect signal.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{info, warn};

use crate::app::ports::StoragePort;
use crate::router::MessageRouter;

/// Broker-independent half of the link: what each event does.
pub struct MqttHandler<S> {
    router: MessageRouter<S>,
    connected: Arc<Signal<CriticalSectionRawMutex, ()>>,
}

impl<S> Clone for MqttHandler<S> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            connected: Arc::clone(&self.connected),
        }
    }
}

impl<S: StoragePort> MqttHandler<S> {
    pub fn new(router: MessageRouter<S>) -> Self {
        Self {
            router,
            connected: Arc::new(Signal::new()),
        }
    }

    pub fn on_connected(&self) {
        info!("MQTT: connected");
        self.connected.signal(());
    }

    pub fn on_disconnected(&self) {
        info!("MQTT: disconnected");
    }

    /// One complete inbound message. Fragments without a topic are
    /// dropped.
    pub fn on_message(&self, topic: Option<&str>, payload: &[u8]) {
        match topic {
            Some(topic) => self.router.dispatch(topic, payload),
            None => warn!("MQTT: dropping {}-byte message without topic", payload.len()),
        }
    }

    /// Wait for the next connect event.
    pub async fn wait_connected(&self) {
        self.connected.wait().await;
    }

    /// Whether a connect happened that nobody has waited for yet.
    pub fn connect_pending(&self) -> bool {
        self.connected.signaled()
    }
}

// ═══════════════════════════════════════════════════════════════
//  ESP-IDF client
// ═══════════════════════════════════════════════════════════════

#[cfg(feature = "espidf")]
pub use esp::{MqttLink, MqttStartError};

#[cfg(feature = "espidf")]
mod esp {
    use super::MqttHandler;
    use crate::app::ports::StoragePort;
    use crate::drivers::task_pin::{self, Core};
    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
    };
    use esp_idf_svc::sys::EspError;
    use log::{info, warn};

    #[derive(Debug)]
    pub enum MqttStartError {
        Client(EspError),
        Spawn,
    }

    impl core::fmt::Display for MqttStartError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            match self {
                Self::Client(e) => write!(f, "MQTT client init failed: {e}"),
                Self::Spawn => write!(f, "MQTT connection thread spawn failed"),
            }
        }
    }

    impl core::error::Error for MqttStartError {}

    pub struct MqttLink<S> {
        client: EspMqttClient<'static>,
        handler: MqttHandler<S>,
        topic: heapless::String<64>,
    }

    impl<S: StoragePort + Send + 'static> MqttLink<S> {
        /// Connect to `url` and start the connection thread.
        pub fn start(
            url: &str,
            client_id: &str,
            topic: heapless::String<64>,
            handler: MqttHandler<S>,
        ) -> Result<Self, MqttStartError> {
            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                ..Default::default()
            };
            let (client, mut connection) =
                EspMqttClient::new(url, &conf).map_err(MqttStartError::Client)?;

            let events = handler.clone();
            task_pin::spawn_on_core(Core::Pro, 6, 6, "mqtt-conn\0", move || {
                while let Ok(event) = connection.next() {
                    match event.payload() {
                        EventPayload::Connected(_) => events.on_connected(),
                        EventPayload::Disconnected => events.on_disconnected(),
                        EventPayload::Received {
                            topic,
                            data,
                            details: Details::Complete,
                            ..
                        } => events.on_message(topic, data),
                        EventPayload::Received { .. } => {
                            warn!("MQTT: chunked message ignored");
                        }
                        EventPayload::Error(e) => warn!("MQTT: {:?}", e),
                        _ => {}
                    }
                }
                info!("MQTT: connection closed");
            })
            .map_err(|_| MqttStartError::Spawn)?;

            info!("MQTT: client started ({})", url);
            Ok(Self {
                client,
                handler,
                topic,
            })
        }

        /// Subscribe after every connect. Never returns.
        pub fn run(mut self) -> ! {
            loop {
                futures_lite::future::block_on(self.handler.wait_connected());
                match self.client.subscribe(&self.topic, QoS::AtMostOnce) {
                    Ok(_) => info!("MQTT: subscribed to {}", self.topic),
                    Err(e) => warn!("MQTT: subscribe to {} failed: {}", self.topic, e),
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Simulation
// ═══════════════════════════════════════════════════════════════

/// In-process stand-in for the broker connection.
#[cfg(not(feature = "espidf"))]
pub struct SimLink<S> {
    handler: MqttHandler<S>,
    topic: heapless::String<64>,
    subscriptions: Vec<heapless::String<64>>,
}

#[cfg(not(feature = "espidf"))]
impl<S: StoragePort> SimLink<S> {
    pub fn new(topic: heapless::String<64>, handler: MqttHandler<S>) -> Self {
        Self {
            handler,
            topic,
            subscriptions: Vec::new(),
        }
    }

    /// Simulate a broker (re)connect and the subscribe that follows it.
    pub fn connect(&mut self) {
        self.handler.on_connected();
        futures_lite::future::block_on(self.handler.wait_connected());
        self.subscriptions.push(self.topic.clone());
    }

    pub fn deliver(&self, topic: &str, payload: &[u8]) {
        self.handler.on_message(Some(topic), payload);
    }

    pub fn subscriptions(&self) -> &[heapless::String<64>] {
        &self.subscriptions
    }
}
