//! Command-line surface
//!
//! Argument parsing and the startup checks that need no display: config
//! validation and the sensor reachability check.

use clap::Parser;
use log::warn;

use crate::config::{Builder, BuilderError, Config, PinLayout, RetryPolicy, parse_address};
use crate::sensor::W1Slave;

const AFTER_HELP: &str = "\
Command line example:
  lcdclock -d /dev/i2c-0 -a 0x3f -s 22-1234567c1111 -b -r -n

Output pin configuration:
  P7  P6  P5  P4  P3  P2  P1  P0
  LED RS  RW  EN  D7  D6  D5  D4 (normal)
  LED EN  RW  RS  D7  D6  D5  D4 (reverse)

LCD panel error codes for DS1820 sensor:
  'FalseCRC'  Temperature read returned a false CRC code.
              Communication error with the sensor or high noise; try '-r'.
  'TempFail'  Temperature read returned a false positive CRC code.
              The read took too long (kernel module issue).
  'NoSensor'  The sensor is inaccessible via the 1-wire slave device.
              The sensor isn't connected to the 1-wire bus or load is high.";

/// LCD Clock for HD44780 16x2 displays over I2C by PCF8574 bus expander,
/// with a 1-wire thermal sensor extension for DS1820
#[derive(Parser, Debug, Default, PartialEq)]
#[command(version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Args {
    /// I2C bus selection, e.g. '/dev/i2c-0' (required)
    #[arg(short = 'd', long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Address of the PCF8574, e.g. '0x3f' (required)
    #[arg(short = 'a', long, value_name = "ADDRESS")]
    pub address: Option<String>,

    /// DS1820 sensor ID, e.g. '22-1234567c1111' (required unless -n)
    #[arg(short = 's', long, value_name = "SENSOR")]
    pub sensor: Option<String>,

    /// Turn on the backlight
    #[arg(short = 'b', long)]
    pub backlight: bool,

    /// Re-read the sensor until its CRC is valid
    #[arg(short = 'r', long)]
    pub retry: bool,

    /// Start even without a reachable sensor
    #[arg(short = 'n', long)]
    pub no_sensor: bool,

    /// Reverse control pin configuration (swap RS and EN)
    #[arg(short = 'p', long)]
    pub reverse_pins: bool,
}

impl Args {
    /// Whether nothing at all was given
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate into a [`Config`] without touching any device
    ///
    /// # Errors
    ///
    /// Returns a [`BuilderError`] for missing or malformed values.
    pub fn into_config(self) -> Result<Config, BuilderError> {
        let mut builder = Builder::new()
            .pin_layout(if self.reverse_pins {
                PinLayout::Reversed
            } else {
                PinLayout::Normal
            })
            .backlight(self.backlight)
            .retry(if self.retry {
                RetryPolicy::Unbounded
            } else {
                RetryPolicy::Disabled
            })
            .allow_missing_sensor(self.no_sensor);

        if let Some(device) = self.device {
            builder = builder.device(device);
        }
        if let Some(address) = self.address {
            builder = builder.address(parse_address(&address)?);
        }
        if let Some(sensor) = self.sensor {
            builder = builder.sensor_id(sensor);
        }
        builder.build()
    }
}

/// The sensor file is not readable and missing sensors are not allowed
#[derive(Debug, PartialEq)]
pub struct SensorUnavailable;

impl core::fmt::Display for SensorUnavailable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Sensor Error: device isn't connected to w1 bus")
    }
}

impl core::error::Error for SensorUnavailable {}

/// Open the configured sensor, checking it is reachable
///
/// With [`Config::allow_missing_sensor`] an unreachable sensor is only
/// logged; it will show up as `NoSensor` on the panel.
///
/// # Errors
///
/// Returns [`SensorUnavailable`] if the file cannot be opened and missing
/// sensors are not allowed.
pub fn open_sensor(config: &Config) -> Result<W1Slave, SensorUnavailable> {
    let source = config
        .sensor_path()
        .map_or_else(W1Slave::absent, W1Slave::new);
    if !source.is_accessible() {
        if !config.allow_missing_sensor {
            return Err(SensorUnavailable);
        }
        warn!("{SensorUnavailable}, starting anyway");
    }
    Ok(source)
}
