//! Sensor subsystem: driver traits and the aggregating [`SensorHub`].
//!
//! Register programming and calibration live inside the concrete
//! drivers.  The hub only applies plausibility limits so a glitching
//! sensor shows up as "no reading" instead of as a bogus emergency.

use log::debug;

use crate::app::ports::{ClimateReading, SensorPort};

/// Plausible heart-rate range in beats/min.
const HEART_RATE_RANGE: core::ops::RangeInclusive<f32> = 20.0..=250.0;
const TEMPERATURE_RANGE: core::ops::RangeInclusive<f32> = -20.0..=60.0;
const HUMIDITY_RANGE: core::ops::RangeInclusive<f32> = 0.0..=100.0;

/// Pulse sensor driver.
pub trait HeartRateMonitor {
    /// Latest beats/min, `None` if no finger or no beat detected yet.
    fn read_bpm(&mut self) -> Option<f32>;
}

/// Temperature/humidity driver.
pub trait ClimateSensor {
    /// `(celsius, relative humidity %)`, `None` on a failed read.
    fn read(&mut self) -> Option<(f32, f32)>;
}

/// Placeholder for a sensor that is not fitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

impl HeartRateMonitor for Disconnected {
    fn read_bpm(&mut self) -> Option<f32> {
        None
    }
}

impl ClimateSensor for Disconnected {
    fn read(&mut self) -> Option<(f32, f32)> {
        None
    }
}

/// Aggregates the sensor drivers behind [`SensorPort`].
pub struct SensorHub<H, C> {
    pub heart_rate: H,
    pub climate: C,
}

impl<H: HeartRateMonitor, C: ClimateSensor> SensorHub<H, C> {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(heart_rate: H, climate: C) -> Self {
        Self {
            heart_rate,
            climate,
        }
    }
}

impl<H: HeartRateMonitor, C: ClimateSensor> SensorPort for SensorHub<H, C> {
    fn read_heart_rate(&mut self) -> f32 {
        match self.heart_rate.read_bpm() {
            Some(bpm) if HEART_RATE_RANGE.contains(&bpm) => bpm,
            Some(bpm) => {
                debug!("Sensors: implausible heart rate {:.0} dropped", bpm);
                0.0
            }
            None => 0.0,
        }
    }

    fn read_climate(&mut self) -> ClimateReading {
        match self.climate.read() {
            Some((t, h)) if TEMPERATURE_RANGE.contains(&t) && HUMIDITY_RANGE.contains(&h) => {
                ClimateReading {
                    temperature_c: t,
                    humidity_pct: h,
                }
            }
            Some((t, h)) => {
                debug!("Sensors: implausible climate {:.1}C {:.0}% dropped", t, h);
                ClimateReading::UNAVAILABLE
            }
            None => ClimateReading::UNAVAILABLE,
        }
    }
}
