//! GPIO output adapter.
//!
//! Implements [`OutputPort`] over any set of `embedded-hal` output pins.
//! On ESP-IDF each channel is an `esp_idf_hal` `PinDriver` opened from the
//! configured GPIO number; on host builds [`SimPin`] keeps the level in
//! memory so the whole controller runs without hardware.

use embedded_hal::digital::{Error as _, OutputPin, PinState};
use heapless::Vec;
use log::{debug, warn};

use crate::app::ports::OutputPort;
use crate::control::level::Level;
use crate::error::OutputError;
use crate::pins::MAX_CHANNELS;

/// Channel-indexed bank of output pins.
pub struct PinBank<P> {
    pins: Vec<P, MAX_CHANNELS>,
}

impl<P: OutputPin> PinBank<P> {
    /// Take ownership of already-opened pins, in channel order.
    ///
    /// Pins beyond [`MAX_CHANNELS`] are rejected.
    pub fn new(pins: impl IntoIterator<Item = P>) -> Result<Self, OutputError> {
        let mut bank = Vec::new();
        for pin in pins {
            let ch = bank.len();
            if bank.push(pin).is_err() {
                return Err(OutputError::NoSuchChannel(ch));
            }
        }
        Ok(Self { pins: bank })
    }
}

impl<P: OutputPin + Send> OutputPort for PinBank<P> {
    fn channel_count(&self) -> usize {
        self.pins.len()
    }

    fn write(&mut self, channel: usize, level: Level) -> Result<(), OutputError> {
        let pin = self
            .pins
            .get_mut(channel)
            .ok_or(OutputError::NoSuchChannel(channel))?;
        pin.set_state(PinState::from(level)).map_err(|e| {
            warn!("GPIO: channel {} write failed: {:?}", channel, e.kind());
            OutputError::WriteFailed(channel)
        })
    }
}

// ── Simulation pin ───────────────────────────────────────────

/// In-memory output pin for host builds.
#[derive(Debug, Default)]
pub struct SimPin {
    gpio: i32,
    level: Level,
}

impl SimPin {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            level: Level::Low,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        debug!("SIM GPIO{} LOW", self.gpio);
        self.level = Level::Low;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        debug!("SIM GPIO{} HIGH", self.gpio);
        self.level = Level::High;
        Ok(())
    }
}

// ── Opening the configured lines ─────────────────────────────

#[cfg(target_os = "espidf")]
pub type BoardPin = esp_idf_hal::gpio::PinDriver<
    'static,
    esp_idf_hal::gpio::AnyOutputPin,
    esp_idf_hal::gpio::Output,
>;

#[cfg(not(target_os = "espidf"))]
pub type BoardPin = SimPin;

/// Open every configured GPIO as an output and drive it LOW.
///
/// Fails on the first line that cannot be opened; lines opened before it
/// are released when the partial bank is dropped.
#[cfg(target_os = "espidf")]
pub fn open_outputs(gpios: &[i32]) -> Result<PinBank<BoardPin>, OutputError> {
    use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};

    let mut pins: Vec<BoardPin, MAX_CHANNELS> = Vec::new();
    for &gpio in gpios {
        // SAFETY: every GPIO number comes from a validated configuration
        // with no duplicates, so each pin is claimed exactly once.
        let pin = unsafe { AnyOutputPin::new(gpio) };
        let mut driver = PinDriver::output(pin).map_err(|e| {
            warn!("GPIO{}: open failed: {}", gpio, e);
            OutputError::OpenFailed(gpio)
        })?;
        driver
            .set_low()
            .map_err(|_| OutputError::OpenFailed(gpio))?;
        pins.push(driver)
            .map_err(|_| OutputError::OpenFailed(gpio))?;
        debug!("GPIO{}: output, LOW", gpio);
    }
    PinBank::new(pins)
}

#[cfg(not(target_os = "espidf"))]
pub fn open_outputs(gpios: &[i32]) -> Result<PinBank<BoardPin>, OutputError> {
    for &gpio in gpios {
        if gpio < 0 {
            return Err(OutputError::OpenFailed(gpio));
        }
    }
    PinBank::new(gpios.iter().map(|&gpio| SimPin::new(gpio)))
}
