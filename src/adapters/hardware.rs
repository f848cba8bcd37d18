//! Hardware adapter — bridges the node's peripherals to domain port traits.
//!
//! Exposes the sensor drivers through [`DriverPort`], the status LED
//! through [`IndicatorPort`], and a gravity-axis [`FaceClassifier`] for
//! the accelerometer.  Driver settings are recorded here so the main loop
//! can hand them to the sampling timers; on non-espidf targets the LED
//! is tracked in memory only.
//!
//! ## LED patterns
//!
//! | Request      | Output                                   |
//! |--------------|------------------------------------------|
//! | `pulse(ms)`  | On for `ms`, then off                    |
//! | `blink(n)`   | `n` × (on 150 ms, off 150 ms)            |
//!
//! The main loop calls [`HardwareAdapter::tick`] with the elapsed time and
//! the adapter drives the GPIO level.

use log::{debug, info};

use crate::app::ports::{DriverPort, FaceClassifier, IndicatorPort};
use crate::config::PirSensitivity;
use crate::gate::Tick;
use crate::orientation::{Acceleration, Face};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Status LED, active HIGH.
pub const STATUS_LED_GPIO: i32 = 2;

const BLINK_HALF_PERIOD_MS: u32 = 150;

/// Minimum magnitude (g) of the dominant axis before a face is trusted.
const FACE_MIN_G: f32 = 0.7;

/// Current LED pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedPattern {
    Off,
    Pulse { remaining_ms: u32 },
    Blink { half_periods_left: u8, phase_ms: u32 },
}

impl LedPattern {
    fn level(self) -> bool {
        match self {
            Self::Off => false,
            Self::Pulse { .. } => true,
            // Even half-periods remaining ⇒ on phase.
            Self::Blink { half_periods_left, .. } => half_periods_left % 2 == 0,
        }
    }

    fn advance(self, delta_ms: u32) -> Self {
        match self {
            Self::Off => Self::Off,
            Self::Pulse { remaining_ms } => match remaining_ms.checked_sub(delta_ms) {
                Some(left) if left > 0 => Self::Pulse { remaining_ms: left },
                _ => Self::Off,
            },
            Self::Blink { mut half_periods_left, mut phase_ms } => {
                phase_ms = phase_ms.saturating_add(delta_ms);
                while phase_ms >= BLINK_HALF_PERIOD_MS && half_periods_left > 0 {
                    phase_ms -= BLINK_HALF_PERIOD_MS;
                    half_periods_left -= 1;
                }
                if half_periods_left == 0 {
                    Self::Off
                } else {
                    Self::Blink { half_periods_left, phase_ms }
                }
            }
        }
    }
}

/// Concrete adapter that combines the node's peripherals behind port traits.
pub struct HardwareAdapter {
    pir_sensitivity: PirSensitivity,
    temperature_interval_ms: Tick,
    accelerometer_interval_ms: Tick,
    battery_interval_ms: Tick,
    led: LedPattern,
    led_on: bool,
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    pub fn new() -> Self {
        Self {
            pir_sensitivity: PirSensitivity::Medium,
            temperature_interval_ms: 0,
            accelerometer_interval_ms: 0,
            battery_interval_ms: 0,
            led: LedPattern::Off,
            led_on: false,
        }
    }

    /// Configure the status LED pin as an output.
    #[cfg(target_os = "espidf")]
    pub fn init(&mut self) -> Result<(), crate::error::Error> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << STATUS_LED_GPIO,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called once from the main task before the loop starts.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(crate::error::Error::Init("status LED gpio_config"));
        }
        self.write_led(false);
        info!("HardwareAdapter: status LED on GPIO {}", STATUS_LED_GPIO);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn init(&mut self) -> Result<(), crate::error::Error> {
        info!("HardwareAdapter: simulation backend");
        Ok(())
    }

    /// Advance the LED pattern by `delta_ms` and update the pin.
    pub fn tick(&mut self, delta_ms: u32) {
        self.led = self.led.advance(delta_ms);
        self.apply_led();
    }

    pub fn pir_sensitivity(&self) -> PirSensitivity {
        self.pir_sensitivity
    }

    pub fn temperature_interval_ms(&self) -> Tick {
        self.temperature_interval_ms
    }

    pub fn accelerometer_interval_ms(&self) -> Tick {
        self.accelerometer_interval_ms
    }

    pub fn battery_interval_ms(&self) -> Tick {
        self.battery_interval_ms
    }

    pub fn is_led_on(&self) -> bool {
        self.led_on
    }

    fn apply_led(&mut self) {
        let level = self.led.level();
        if level != self.led_on {
            self.write_led(level);
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_led(&mut self, high: bool) {
        // SAFETY: pin configured as output in `init`; main-loop only.
        unsafe {
            gpio_set_level(STATUS_LED_GPIO, u32::from(high));
        }
        self.led_on = high;
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_led(&mut self, high: bool) {
        self.led_on = high;
    }
}

// ── DriverPort implementation ─────────────────────────────────

impl DriverPort for HardwareAdapter {
    fn set_pir_sensitivity(&mut self, sensitivity: PirSensitivity) {
        self.pir_sensitivity = sensitivity;
        info!("PIR sensitivity set to {:?}", sensitivity);
    }

    fn set_temperature_interval(&mut self, interval_ms: Tick) {
        self.temperature_interval_ms = interval_ms;
        info!("Thermometer update interval {} ms", interval_ms);
    }

    fn set_accelerometer_interval(&mut self, interval_ms: Tick) {
        self.accelerometer_interval_ms = interval_ms;
        info!("Accelerometer update interval {} ms", interval_ms);
    }

    fn set_battery_interval(&mut self, interval_ms: Tick) {
        self.battery_interval_ms = interval_ms;
        info!("Battery update interval {} ms", interval_ms);
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn pulse(&mut self, duration_ms: u32) {
        self.led = if duration_ms == 0 {
            LedPattern::Off
        } else {
            LedPattern::Pulse { remaining_ms: duration_ms }
        };
        self.apply_led();
    }

    fn blink(&mut self, count: u8) {
        self.led = if count == 0 {
            LedPattern::Off
        } else {
            LedPattern::Blink {
                half_periods_left: count.saturating_mul(2),
                phase_ms: 0,
            }
        };
        self.apply_led();
    }
}

// ── FaceClassifier implementation ─────────────────────────────

impl FaceClassifier for HardwareAdapter {
    /// Pick the face whose axis carries gravity.
    ///
    /// | Dominant axis | Face  |
    /// |---------------|-------|
    /// | +Z            | One   |
    /// | +X            | Two   |
    /// | +Y            | Three |
    /// | −Y            | Four  |
    /// | −X            | Five  |
    /// | −Z            | Six   |
    fn classify(&mut self, sample: Acceleration) -> Face {
        let Acceleration { x, y, z } = sample;
        let (ax, ay, az) = (x.abs(), y.abs(), z.abs());

        let face = if az >= ax && az >= ay {
            if az < FACE_MIN_G {
                Face::Unknown
            } else if z > 0.0 {
                Face::One
            } else {
                Face::Six
            }
        } else if ax >= ay {
            if ax < FACE_MIN_G {
                Face::Unknown
            } else if x > 0.0 {
                Face::Two
            } else {
                Face::Five
            }
        } else if ay < FACE_MIN_G {
            Face::Unknown
        } else if y > 0.0 {
            Face::Three
        } else {
            Face::Four
        };

        debug!("Accelerometer ({:.2}, {:.2}, {:.2}) g -> {:?}", x, y, z, face);
        face
    }
}
