//! System configuration parameters
//!
//! All tunable parameters for the sprayer controller.  Values come from the
//! compiled-in defaults or a JSON document supplied by the board wiring;
//! nothing is persisted across restarts.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins::{MAX_CHANNELS, SPRAYER_GPIOS};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SprayerConfig {
    // --- Identity (consumed by the parameter transport) ---
    /// Device id announced on the broker.
    pub device_id: String<32>,
    /// Human-readable device name.
    pub device_name: String<64>,
    /// Broker host for an external publish/subscribe parameter transport.
    /// Carried and logged only; the controller and the line transport never
    /// connect to it.
    pub broker_host: String<64>,

    // --- Channels ---
    /// Output GPIO per channel, in registry order.
    pub output_gpios: Vec<i32, MAX_CHANNELS>,

    // --- Timing ---
    /// Length of one runner tick (milliseconds).  One second on hardware.
    pub tick_ms: u32,
    /// Upper bound accepted for any on/off duration (seconds).
    pub max_phase_secs: u32,
    /// Initial value of every on/off duration (seconds).
    pub default_phase_secs: u32,
    /// Telemetry report interval (seconds), 0 disables.
    pub telemetry_interval_secs: u32,
}

impl Default for SprayerConfig {
    fn default() -> Self {
        let mut device_id = String::new();
        let _ = device_id.push_str("rpi-sprayers");
        let mut device_name = String::new();
        let _ = device_name.push_str("Nice sprayers on RPi");
        let mut broker_host = String::new();
        let _ = broker_host.push_str("localhost");

        let mut output_gpios = Vec::new();
        let _ = output_gpios.extend_from_slice(&SPRAYER_GPIOS);

        Self {
            device_id,
            device_name,
            broker_host,
            output_gpios,

            // Timing
            tick_ms: 1000,          // 1 Hz
            max_phase_secs: 3600,   // 1 h
            default_phase_secs: 1,
            telemetry_interval_secs: 60,
        }
    }
}

impl SprayerConfig {
    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the controller cannot run safely.
    pub fn validate(&self) -> Result<()> {
        if self.output_gpios.is_empty() {
            return Err(Error::Config("no output channels"));
        }
        for (i, gpio) in self.output_gpios.iter().enumerate() {
            if *gpio < 0 {
                return Err(Error::Config("negative GPIO number"));
            }
            if self.output_gpios[..i].contains(gpio) {
                return Err(Error::Config("GPIO assigned to two channels"));
            }
        }
        if self.tick_ms == 0 {
            return Err(Error::Config("tick_ms must be > 0"));
        }
        if self.max_phase_secs == 0 {
            return Err(Error::Config("max_phase_secs must be > 0"));
        }
        if self.default_phase_secs > self.max_phase_secs {
            return Err(Error::Config("default_phase_secs exceeds max_phase_secs"));
        }
        Ok(())
    }

    /// Number of channels in the registry.
    pub fn channel_count(&self) -> usize {
        self.output_gpios.len()
    }

    pub fn tick(&self) -> core::time::Duration {
        core::time::Duration::from_millis(u64::from(self.tick_ms))
    }
}
