//! Event channel names and live connection tuning

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::websocket::{ConnectionSettings, HubConfig};

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Channel carrying `booking.*` events
    #[serde(default = "default_booking_channel")]
    pub booking_events_channel: String,

    /// Channel carrying `runner.location_update` events
    #[serde(default = "default_runner_channel")]
    pub runner_events_channel: String,

    /// Channel that `tracking.*` notifications are published to
    #[serde(default = "default_tracking_channel")]
    pub tracking_events_channel: String,

    /// Outbound frames buffered per observer before it is evicted
    #[serde(default = "default_queue_capacity")]
    pub connection_queue_capacity: usize,

    #[serde(default = "default_command_buffer")]
    pub hub_command_buffer: usize,

    #[serde(default = "default_write_wait")]
    pub write_wait_secs: u64,

    /// Silence tolerated from an observer before it is dropped
    #[serde(default = "default_pong_wait")]
    pub pong_wait_secs: u64,

    /// Largest inbound frame accepted from an observer
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl TrackingConfig {
    /// Channels the consumer subscribes to.
    pub fn inbound_channels(&self) -> Vec<String> {
        vec![
            self.booking_events_channel.clone(),
            self.runner_events_channel.clone(),
        ]
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            queue_capacity: self.connection_queue_capacity,
            command_buffer: self.hub_command_buffer,
        }
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(
            Duration::from_secs(self.write_wait_secs),
            Duration::from_secs(self.pong_wait_secs),
            self.max_message_size,
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.booking_events_channel.trim().is_empty() {
            return Err(ValidationError::EmptyChannel("booking events"));
        }
        if self.runner_events_channel.trim().is_empty() {
            return Err(ValidationError::EmptyChannel("runner events"));
        }
        if self.tracking_events_channel.trim().is_empty() {
            return Err(ValidationError::EmptyChannel("tracking events"));
        }
        if self.connection_queue_capacity == 0 || self.hub_command_buffer == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        if self.write_wait_secs == 0 {
            return Err(ValidationError::InvalidConnectionTiming("write wait must be positive"));
        }
        let settings = self.connection_settings();
        if settings.ping_period.is_zero() || settings.ping_period >= settings.pong_wait {
            return Err(ValidationError::InvalidConnectionTiming(
                "ping period must be positive and shorter than pong wait",
            ));
        }
        if self.max_message_size == 0 {
            return Err(ValidationError::InvalidConnectionTiming("max message size must be positive"));
        }
        Ok(())
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            booking_events_channel: default_booking_channel(),
            runner_events_channel: default_runner_channel(),
            tracking_events_channel: default_tracking_channel(),
            connection_queue_capacity: default_queue_capacity(),
            hub_command_buffer: default_command_buffer(),
            write_wait_secs: default_write_wait(),
            pong_wait_secs: default_pong_wait(),
            max_message_size: default_max_message_size(),
        }
    }
}

fn default_booking_channel() -> String {
    "booking-events".to_string()
}

fn default_runner_channel() -> String {
    "runner-events".to_string()
}

fn default_tracking_channel() -> String {
    "tracking-events".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

fn default_command_buffer() -> usize {
    1024
}

fn default_write_wait() -> u64 {
    10
}

fn default_pong_wait() -> u64 {
    60
}

fn default_max_message_size() -> usize {
    512
}
