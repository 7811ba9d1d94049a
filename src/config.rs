//! Display configuration types and builder

#[cfg(feature = "std")]
use std::path::{Path, PathBuf};

#[cfg(feature = "std")]
pub use crate::error::BuilderError;
pub use crate::error::{MAX_BUS_ADDRESS, SENSOR_ID_LEN};

/// Default root of the kernel's 1-wire device tree
#[cfg(feature = "std")]
pub const DEFAULT_W1_ROOT: &str = "/sys/bus/w1/devices";

/// Wiring of the PCF8574 outputs to the HD44780 control lines
///
/// ```text
/// P7  P6  P5  P4  P3  P2  P1  P0
/// LED RS  RW  EN  D7  D6  D5  D4 (normal)
/// LED EN  RW  RS  D7  D6  D5  D4 (reversed)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PinLayout {
    /// RS on P6, EN on P4
    #[default]
    Normal,
    /// RS and EN swapped: RS on P4, EN on P6
    Reversed,
}

/// Bit positions of the control lines within the expander output byte
///
/// Fixed at startup and never changed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinMap {
    /// Backlight bit, or 0 when the backlight is off
    pub backlight: u8,
    /// Register select (high = character data)
    pub rs: u8,
    /// Read/write line (always held low by this driver)
    pub rw: u8,
    /// Enable strobe
    pub en: u8,
}

impl PinMap {
    /// Backlight bit on P7
    pub const BACKLIGHT_BIT: u8 = 0x80;

    /// Build the pin map for a layout
    pub const fn new(layout: PinLayout, backlight: bool) -> Self {
        let (rs, en) = match layout {
            PinLayout::Normal => (0x40, 0x10),
            PinLayout::Reversed => (0x10, 0x40),
        };
        Self {
            backlight: if backlight { Self::BACKLIGHT_BIT } else { 0x00 },
            rs,
            rw: 0x20,
            en,
        }
    }

    /// Base offset for instruction bytes (RS low)
    pub const fn command_offset(&self) -> u8 {
        self.backlight
    }

    /// Base offset for character bytes (RS high)
    pub const fn data_offset(&self) -> u8 {
        self.backlight | self.rs
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self::new(PinLayout::Normal, false)
    }
}

/// What to do when the sensor reports a failed CRC
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Report the failure immediately
    #[default]
    Disabled,
    /// Re-read until the CRC is valid, however long that takes
    Unbounded,
    /// Re-read at most this many extra times, then report the failure
    Limited(u32),
}

/// A validated 1-wire sensor identifier, e.g. `28-0316a2794aff`
#[cfg(feature = "std")]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorId(String);

#[cfg(feature = "std")]
impl SensorId {
    /// Validate an identifier
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidSensorId` unless the identifier is exactly
    /// [`SENSOR_ID_LEN`] characters long.
    pub fn new(id: &str) -> Result<Self, BuilderError> {
        if id.len() != SENSOR_ID_LEN {
            return Err(BuilderError::InvalidSensorId { len: id.len() });
        }
        Ok(Self(id.to_string()))
    }

    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parse a bus address the way `strtoul(s, NULL, 0)` does
///
/// `0x`/`0X` selects hex, a leading `0` selects octal, anything else is decimal.
///
/// # Errors
///
/// Returns `BuilderError::InvalidAddress` if the text is not a number.
///
/// ```
/// use lcdclock::config::parse_address;
///
/// assert_eq!(parse_address("0x3f"), Ok(0x3f));
/// assert_eq!(parse_address("077"), Ok(0o77));
/// assert_eq!(parse_address("39"), Ok(39));
/// assert!(parse_address("zz").is_err());
/// ```
#[cfg(feature = "std")]
pub fn parse_address(text: &str) -> Result<u32, BuilderError> {
    let trimmed = text.trim();
    let (digits, radix) = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        (hex, 16)
    } else if trimmed.len() > 1 && trimmed.starts_with('0') {
        (&trimmed[1..], 8)
    } else {
        (trimmed, 10)
    };
    u32::from_str_radix(digits, radix).map_err(|_| BuilderError::InvalidAddress {
        value: text.to_string(),
    })
}

/// Application configuration
///
/// Built once at startup with [`Builder`] and passed by reference to the
/// display driver, sensor reader and scheduler.
#[cfg(feature = "std")]
#[derive(Clone, Debug)]
pub struct Config {
    /// Bus device node, e.g. `/dev/i2c-1`
    pub device: PathBuf,
    /// 7-bit expander address
    pub address: u8,
    /// Sensor to read, if any
    pub sensor_id: Option<SensorId>,
    /// Expander wiring
    pub pin_layout: PinLayout,
    /// Keep the backlight bit set on every write
    pub backlight: bool,
    /// CRC failure handling
    pub retry: RetryPolicy,
    /// Start even if the sensor is not reachable
    pub allow_missing_sensor: bool,
    /// Root of the 1-wire device tree
    pub w1_root: PathBuf,
}

#[cfg(feature = "std")]
impl Config {
    /// Pin map derived from the layout and backlight settings
    pub fn pin_map(&self) -> PinMap {
        PinMap::new(self.pin_layout, self.backlight)
    }

    /// Path of the sensor's raw data file, `<w1-root>/<sensor-id>/w1_slave`
    pub fn sensor_path(&self) -> Option<PathBuf> {
        self.sensor_id
            .as_ref()
            .map(|id| self.w1_root.join(id.as_str()).join("w1_slave"))
    }
}

/// Builder for constructing the application configuration
///
/// # Example
///
/// ```rust,no_run
/// use lcdclock::{Builder, PinLayout, RetryPolicy};
///
/// let config = match Builder::new()
///     .device("/dev/i2c-1")
///     .address(0x3f)
///     .sensor_id("28-0316a2794aff")
///     .pin_layout(PinLayout::Reversed)
///     .backlight(true)
///     .retry(RetryPolicy::Unbounded)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[cfg(feature = "std")]
#[must_use]
#[derive(Default)]
pub struct Builder {
    device: Option<PathBuf>,
    address: Option<u32>,
    sensor_id: Option<String>,
    pin_layout: PinLayout,
    backlight: bool,
    retry: RetryPolicy,
    allow_missing_sensor: bool,
    w1_root: Option<PathBuf>,
}

#[cfg(feature = "std")]
impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bus device node (required)
    pub fn device(mut self, path: impl AsRef<Path>) -> Self {
        self.device = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the expander address (required)
    pub fn address(mut self, address: u32) -> Self {
        self.address = Some(address);
        self
    }

    /// Set the sensor identifier
    ///
    /// Required unless [`Builder::allow_missing_sensor`] is set.
    pub fn sensor_id(mut self, id: impl Into<String>) -> Self {
        self.sensor_id = Some(id.into());
        self
    }

    /// Set the expander wiring
    pub fn pin_layout(mut self, layout: PinLayout) -> Self {
        self.pin_layout = layout;
        self
    }

    /// Keep the backlight on
    pub fn backlight(mut self, on: bool) -> Self {
        self.backlight = on;
        self
    }

    /// Set the CRC failure handling
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Allow startup when the sensor cannot be reached
    pub fn allow_missing_sensor(mut self, allow: bool) -> Self {
        self.allow_missing_sensor = allow;
        self
    }

    /// Override the 1-wire device tree root
    pub fn w1_root(mut self, root: impl AsRef<Path>) -> Self {
        self.w1_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Build the configuration
    ///
    /// Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns a [`BuilderError`] if a required field is missing, the address
    /// does not fit in 7 bits, or the sensor identifier has the wrong length.
    pub fn build(self) -> Result<Config, BuilderError> {
        let device = self.device.ok_or(BuilderError::MissingDevice)?;
        let raw_address = self.address.ok_or(BuilderError::MissingAddress)?;
        let address = u8::try_from(raw_address)
            .ok()
            .filter(|address| u32::from(*address) <= MAX_BUS_ADDRESS)
            .ok_or_else(|| BuilderError::InvalidAddress {
                value: format!("{raw_address:#x}"),
            })?;
        let sensor_id = match self.sensor_id {
            Some(id) => Some(SensorId::new(&id)?),
            None if self.allow_missing_sensor => None,
            None => return Err(BuilderError::MissingSensorId),
        };

        Ok(Config {
            device,
            address,
            sensor_id,
            pin_layout: self.pin_layout,
            backlight: self.backlight,
            retry: self.retry,
            allow_missing_sensor: self.allow_missing_sensor,
            w1_root: self
                .w1_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_W1_ROOT)),
        })
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_normal_pin_map() {
        let pins = PinMap::new(PinLayout::Normal, false);
        assert_eq!(pins.backlight, 0x00);
        assert_eq!(pins.rs, 0x40);
        assert_eq!(pins.rw, 0x20);
        assert_eq!(pins.en, 0x10);
    }

    #[test]
    fn test_reversed_pin_map_swaps_rs_and_en() {
        let pins = PinMap::new(PinLayout::Reversed, true);
        assert_eq!(pins.backlight, 0x80);
        assert_eq!(pins.rs, 0x10);
        assert_eq!(pins.en, 0x40);
        assert_eq!(pins.data_offset(), 0x90);
        assert_eq!(pins.command_offset(), 0x80);
    }

    #[test]
    fn test_parse_address_bases() {
        assert_eq!(parse_address("0x3f"), Ok(0x3f));
        assert_eq!(parse_address("0X27"), Ok(0x27));
        assert_eq!(parse_address("047"), Ok(0o47));
        assert_eq!(parse_address("63"), Ok(63));
        assert_eq!(parse_address("0"), Ok(0));
        assert!(matches!(
            parse_address("0x"),
            Err(BuilderError::InvalidAddress { .. })
        ));
        assert!(matches!(
            parse_address("08"),
            Err(BuilderError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_build_requires_device_and_address() {
        assert_eq!(
            Builder::new().address(0x3f).build().err(),
            Some(BuilderError::MissingDevice)
        );
        assert_eq!(
            Builder::new().device("/dev/i2c-0").build().err(),
            Some(BuilderError::MissingAddress)
        );
    }

    #[test]
    fn test_build_rejects_wide_address() {
        let result = Builder::new()
            .device("/dev/i2c-0")
            .address(0x80)
            .allow_missing_sensor(true)
            .build();
        assert!(matches!(result, Err(BuilderError::InvalidAddress { .. })));
    }

    #[test]
    fn test_sensor_id_length_is_checked() {
        for id in ["", "28-0316a2794af", "28-0316a2794afff"] {
            let result = Builder::new()
                .device("/dev/i2c-0")
                .address(0x3f)
                .sensor_id(id)
                .build();
            assert_eq!(
                result.err(),
                Some(BuilderError::InvalidSensorId { len: id.len() })
            );
        }
    }

    #[test]
    fn test_sensor_id_required_without_override() {
        let result = Builder::new().device("/dev/i2c-0").address(0x3f).build();
        assert_eq!(result.err(), Some(BuilderError::MissingSensorId));
    }

    #[test]
    fn test_sensor_path() {
        let config = Builder::new()
            .device("/dev/i2c-0")
            .address(0x3f)
            .sensor_id("28-0316a2794aff")
            .build()
            .unwrap();
        assert_eq!(
            config.sensor_path(),
            Some(PathBuf::from(
                "/sys/bus/w1/devices/28-0316a2794aff/w1_slave"
            ))
        );
        assert_eq!(config.pin_map(), PinMap::default());
    }

    #[test]
    fn test_no_sensor_path_when_missing_allowed() {
        let config = Builder::new()
            .device("/dev/i2c-0")
            .address(0x3f)
            .allow_missing_sensor(true)
            .build()
            .unwrap();
        assert_eq!(config.sensor_path(), None);
    }
}
