//! DS1820 readings through the kernel's 1-wire `w1_slave` file
//!
//! The w1 driver exposes each sensor as two lines of text:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
//!
//! Positions in that text are fixed: the CRC byte sits at offset 33, the
//! `YES`/`NO` verdict starts at offset 36, and the temperature in thousandths
//! of a degree starts at offset 69 and runs to the end of the line.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::RetryPolicy;
use crate::display::LINE_WIDTH;
use crate::glyph::DEGREE_CHAR;

const CRC_PAIR_OFFSET: usize = 33;
const CRC_FLAG_OFFSET: usize = 36;
const TEMPERATURE_OFFSET: usize = 69;
const CRC_VALID: u8 = b'Y';

/// Digits after the decimal point in the raw value
const FRACTION_DIGITS: usize = 3;

/// Prefix of the sensor line on the panel
pub const STATUS_PREFIX: &str = "Sensor: ";

/// Source of raw sensor text
///
/// Implemented by [`W1Slave`] for the real device and by in-memory fakes in tests.
pub trait RawSource {
    /// Read the full raw text
    ///
    /// # Errors
    ///
    /// Returns an error when the sensor cannot be reached.
    fn read_raw(&mut self) -> io::Result<String>;
}

/// The kernel's `w1_slave` file for one sensor
#[derive(Clone, Debug)]
pub struct W1Slave {
    path: Option<PathBuf>,
}

impl W1Slave {
    /// Read from `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// A source with no sensor behind it; every read fails
    pub fn absent() -> Self {
        Self { path: None }
    }

    /// Path being read, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the file can currently be opened
    pub fn is_accessible(&self) -> bool {
        self.path
            .as_ref()
            .is_some_and(|path| File::open(path).is_ok())
    }
}

impl RawSource for W1Slave {
    fn read_raw(&mut self) -> io::Result<String> {
        match &self.path {
            Some(path) => Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no sensor configured",
            )),
        }
    }
}

/// Outcome of a sensor query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorStatus {
    /// Valid CRC and a plausible value
    Ok,
    /// The raw file could not be read
    NoSensor,
    /// The driver reported a CRC mismatch, or the text was unreadable
    BadCrc,
    /// CRC reported valid but the CRC byte is `00`
    ///
    /// Happens when the read races a conversion still in progress.
    SuspectCrc,
}

impl SensorStatus {
    /// Panel message for failures, `None` for [`SensorStatus::Ok`]
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::Ok => None,
            Self::NoSensor => Some("NoSensor"),
            Self::BadCrc => Some("FalseCRC"),
            Self::SuspectCrc => Some("TempFail"),
        }
    }

    /// How long to hold before the result is shown, in milliseconds
    pub fn hold_ms(self) -> u32 {
        match self {
            Self::Ok => 200,
            Self::NoSensor => 1000,
            Self::BadCrc => 50,
            Self::SuspectCrc => 0,
        }
    }
}

/// Why raw text could not be split into fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Text ends before a fixed field
    TooShort {
        /// Length of the text
        len: usize,
    },
    /// Temperature field has no terminating newline
    Unterminated,
    /// Temperature field is not an optionally signed run of digits
    InvalidTemperature,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooShort { len } => write!(f, "raw text too short ({len} bytes)"),
            Self::Unterminated => write!(f, "temperature field not terminated"),
            Self::InvalidTemperature => write!(f, "temperature field is not a number"),
        }
    }
}

impl core::error::Error for ParseError {}

/// Named fields of the raw text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFields<'a> {
    /// CRC byte as two hex digits
    pub crc_pair: &'a str,
    /// `b'Y'` when the driver verified the CRC
    pub crc_flag: u8,
    /// Temperature in thousandths of a degree, possibly signed
    pub temperature: &'a str,
}

impl RawFields<'_> {
    /// Classify the fields, ignoring any retry policy
    pub fn status(&self) -> SensorStatus {
        if self.crc_flag != CRC_VALID {
            SensorStatus::BadCrc
        } else if self.crc_pair == "00" {
            SensorStatus::SuspectCrc
        } else {
            SensorStatus::Ok
        }
    }
}

/// Split `w1_slave` text into its fields
///
/// # Errors
///
/// Returns a [`ParseError`] if the text is shorter than the fixed layout, the
/// temperature line is not terminated, or the temperature is not `-?[0-9]+`.
///
/// ```
/// use lcdclock::sensor::{parse_raw, SensorStatus};
///
/// let raw = "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n\
///            72 01 4b 46 7f ff 0e 10 57 t=23125\n";
/// let fields = parse_raw(raw).unwrap();
/// assert_eq!(fields.temperature, "23125");
/// assert_eq!(fields.status(), SensorStatus::Ok);
/// ```
pub fn parse_raw(text: &str) -> Result<RawFields<'_>, ParseError> {
    let too_short = ParseError::TooShort { len: text.len() };
    let crc_pair = text
        .get(CRC_PAIR_OFFSET..CRC_PAIR_OFFSET + 2)
        .ok_or(too_short)?;
    let crc_flag = *text.as_bytes().get(CRC_FLAG_OFFSET).ok_or(too_short)?;
    let tail = text.get(TEMPERATURE_OFFSET..).ok_or(too_short)?;
    let end = tail.find('\n').ok_or(ParseError::Unterminated)?;

    let temperature = &tail[..end];
    let digits = temperature.strip_prefix('-').unwrap_or(temperature);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidTemperature);
    }

    Ok(RawFields {
        crc_pair,
        crc_flag,
        temperature,
    })
}

/// Insert the decimal point three digits from the end
///
/// Short values are zero-padded and a leading minus sign is kept.
///
/// ```
/// use lcdclock::sensor::decimal_string;
///
/// assert_eq!(decimal_string("12345"), "12.345");
/// assert_eq!(decimal_string("-1250"), "-1.250");
/// assert_eq!(decimal_string("500"), "0.500");
/// ```
pub fn decimal_string(raw: &str) -> String {
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    let padded = format!("{digits:0>width$}", width = FRACTION_DIGITS + 1);
    let point = padded
        .char_indices()
        .nth_back(FRACTION_DIGITS - 1)
        .map_or(0, |(index, _)| index);
    let (whole, fraction) = padded.split_at(point);
    format!("{sign}{whole}.{fraction}")
}

/// Result of one sensor query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorReading {
    /// Classification
    pub status: SensorStatus,
    /// Decimal temperature, present for [`SensorStatus::Ok`] and [`SensorStatus::SuspectCrc`]
    pub value: Option<String>,
    /// Text the sensor returned, `None` when the read itself failed
    pub raw: Option<String>,
}

impl SensorReading {
    fn failed(status: SensorStatus, raw: Option<String>) -> Self {
        Self {
            status,
            value: None,
            raw,
        }
    }

    /// Temperature with the degree glyph, the value cut to `max_chars`
    ///
    /// ```
    /// use lcdclock::{SensorReading, SensorStatus};
    ///
    /// let reading = SensorReading {
    ///     status: SensorStatus::Ok,
    ///     value: Some("21.375".to_string()),
    ///     raw: None,
    /// };
    /// assert_eq!(reading.formatted(usize::MAX).as_deref(), Some("21.375 \u{1}C"));
    /// assert_eq!(reading.formatted(5).as_deref(), Some("21.37 \u{1}C"));
    /// ```
    pub fn formatted(&self, max_chars: usize) -> Option<String> {
        self.value.as_deref().map(|value| {
            let clipped: String = value.chars().take(max_chars).collect();
            format!("{clipped} {DEGREE_CHAR}C")
        })
    }

    /// The full second-line text, padded to the panel width
    ///
    /// The value is clipped so the unit still fits on a 16-column line.
    pub fn status_line(&self) -> String {
        let room = LINE_WIDTH - STATUS_PREFIX.len() - 3;
        let body = match (self.status, self.formatted(room)) {
            (SensorStatus::Ok, Some(text)) => text,
            (status, _) => status.message().unwrap_or_default().to_string(),
        };
        format!("{STATUS_PREFIX}{body:<width$}", width = LINE_WIDTH - STATUS_PREFIX.len())
    }
}

/// Queries a sensor and classifies the result
///
/// Faults never escape: every outcome is folded into a [`SensorReading`].
pub struct SensorReader<S> {
    source: S,
    retry: RetryPolicy,
}

impl<S> SensorReader<S>
where
    S: RawSource,
{
    /// Create a reader
    pub fn new(source: S, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    /// Access the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Read and classify one reading
    pub fn query(&mut self) -> SensorReading {
        let mut retries = 0u32;
        loop {
            let raw = match self.source.read_raw() {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("sensor: read failed: {e}");
                    return SensorReading::failed(SensorStatus::NoSensor, None);
                }
            };

            let fields = match parse_raw(&raw) {
                Ok(fields) => Some(fields),
                Err(e) => {
                    warn!("sensor: {e}");
                    None
                }
            };
            let status = fields.map_or(SensorStatus::BadCrc, |fields| fields.status());

            if status == SensorStatus::BadCrc && self.should_retry(retries) {
                retries += 1;
                debug!("sensor: bad CRC, re-reading (attempt {retries})");
                continue;
            }

            let value = match (status, fields) {
                (SensorStatus::Ok | SensorStatus::SuspectCrc, Some(fields)) => {
                    decimal_string(fields.temperature)
                }
                _ => {
                    warn!("sensor: CRC check failed");
                    debug!("sensor: raw {raw:?}");
                    return SensorReading::failed(SensorStatus::BadCrc, Some(raw));
                }
            };
            if status == SensorStatus::SuspectCrc {
                warn!("sensor: suspicious CRC 00, value {value} discarded");
            } else {
                debug!("sensor: {value}");
            }
            return SensorReading {
                status,
                value: Some(value),
                raw: Some(raw),
            };
        }
    }

    fn should_retry(&self, retries: u32) -> bool {
        match self.retry {
            RetryPolicy::Disabled => false,
            RetryPolicy::Unbounded => true,
            RetryPolicy::Limited(limit) => retries < limit,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    pub(crate) const GOOD: &str = "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n\
                                   72 01 4b 46 7f ff 0e 10 57 t=23125\n";
    pub(crate) const BAD: &str = "72 01 4b 46 7f ff 0e 10 57 : crc=ab NO\n\
                                  72 01 4b 46 7f ff 0e 10 57 t=23125\n";
    pub(crate) const SUSPECT: &str = "50 05 4b 46 7f ff 0c 10 1c : crc=00 YES\n\
                                      50 05 4b 46 7f ff 0c 10 1c t=85000\n";

    /// Replays canned results, then fails like an unplugged sensor
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        pub(crate) reads: VecDeque<io::Result<String>>,
        pub(crate) calls: usize,
    }

    impl ScriptedSource {
        pub(crate) fn new(texts: &[&str]) -> Self {
            Self {
                reads: texts.iter().map(|text| Ok(text.to_string())).collect(),
                calls: 0,
            }
        }
    }

    impl RawSource for ScriptedSource {
        fn read_raw(&mut self) -> io::Result<String> {
            self.calls += 1;
            self.reads
                .pop_front()
                .unwrap_or_else(|| Err(io::Error::from(io::ErrorKind::NotFound)))
        }
    }

    #[test]
    fn test_parse_named_fields() {
        let fields = parse_raw(GOOD).unwrap();
        assert_eq!(fields.crc_pair, "57");
        assert_eq!(fields.crc_flag, b'Y');
        assert_eq!(fields.temperature, "23125");
    }

    #[test]
    fn test_parse_short_text() {
        assert_eq!(parse_raw("72 01"), Err(ParseError::TooShort { len: 5 }));
        assert_eq!(
            parse_raw(&GOOD[..60]),
            Err(ParseError::TooShort { len: 60 })
        );
    }

    #[test]
    fn test_parse_unterminated_temperature() {
        let raw = GOOD.trim_end();
        assert_eq!(parse_raw(raw), Err(ParseError::Unterminated));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(parse_raw(GOOD).unwrap().status(), SensorStatus::Ok);
        assert_eq!(parse_raw(BAD).unwrap().status(), SensorStatus::BadCrc);
        assert_eq!(
            parse_raw(SUSPECT).unwrap().status(),
            SensorStatus::SuspectCrc
        );
    }

    #[test]
    fn test_decimal_point_is_three_from_end() {
        for raw in ["1234", "12345", "123456"] {
            let text = decimal_string(raw);
            assert_eq!(text.find('.'), Some(raw.len() - 3));
            assert_eq!(text.replace('.', ""), raw);
        }
        assert_eq!(decimal_string("12345"), "12.345");
        assert_eq!(decimal_string("0"), "0.000");
        assert_eq!(decimal_string("-62"), "-0.062");
    }

    #[test]
    fn test_query_ok() {
        let mut reader = SensorReader::new(ScriptedSource::new(&[GOOD]), RetryPolicy::Disabled);
        let reading = reader.query();
        assert_eq!(reading.status, SensorStatus::Ok);
        assert_eq!(reading.value.as_deref(), Some("23.125"));
        assert_eq!(reading.formatted(usize::MAX).as_deref(), Some("23.125 \u{1}C"));
        assert_eq!(reading.raw.as_deref(), Some(GOOD));
        assert_eq!(reading.status_line(), "Sensor: 23.12 \u{1}C");
    }

    #[test]
    fn test_query_bad_crc_without_retry() {
        let mut reader =
            SensorReader::new(ScriptedSource::new(&[BAD, GOOD]), RetryPolicy::Disabled);
        let reading = reader.query();
        assert_eq!(reading.status, SensorStatus::BadCrc);
        assert_eq!(reading.value, None);
        assert_eq!(reading.status_line(), "Sensor: FalseCRC");
        assert_eq!(reading.raw.as_deref(), Some(BAD));
        assert_eq!(reader.source().calls, 1);
    }

    #[test]
    fn test_query_retries_until_valid() {
        let source = ScriptedSource::new(&[BAD, BAD, BAD, GOOD]);
        let mut reader = SensorReader::new(source, RetryPolicy::Unbounded);
        let reading = reader.query();
        assert_eq!(reading.status, SensorStatus::Ok);
        assert_eq!(reader.source().calls, 4);
    }

    #[test]
    fn test_query_limited_retry_gives_up() {
        let source = ScriptedSource::new(&[BAD, BAD, BAD, GOOD]);
        let mut reader = SensorReader::new(source, RetryPolicy::Limited(2));
        let reading = reader.query();
        assert_eq!(reading.status, SensorStatus::BadCrc);
        assert_eq!(reader.source().calls, 3);
    }

    #[test]
    fn test_query_retry_stops_when_sensor_vanishes() {
        let source = ScriptedSource::new(&[BAD]);
        let mut reader = SensorReader::new(source, RetryPolicy::Unbounded);
        assert_eq!(reader.query().status, SensorStatus::NoSensor);
    }

    #[test]
    fn test_query_suspect_keeps_value_but_shows_message() {
        let mut reader =
            SensorReader::new(ScriptedSource::new(&[SUSPECT]), RetryPolicy::Disabled);
        let reading = reader.query();
        assert_eq!(reading.status, SensorStatus::SuspectCrc);
        assert_eq!(reading.value.as_deref(), Some("85.000"));
        assert_eq!(reading.status_line(), "Sensor: TempFail");
    }

    /// `GOOD` with the temperature field replaced by `tail`
    fn with_temperature(tail: &str) -> String {
        format!("{}{tail}", &GOOD[..TEMPERATURE_OFFSET])
    }

    #[test]
    fn test_parse_rejects_malformed_temperature() {
        for tail in ["éé\n", "abc\n", "-\n", "\n", "12a4\n", "--5\n"] {
            assert_eq!(
                parse_raw(&with_temperature(tail)),
                Err(ParseError::InvalidTemperature),
                "{tail:?}"
            );
        }
        assert_eq!(
            parse_raw(&with_temperature("-1250\n")).unwrap().temperature,
            "-1250"
        );
    }

    #[test]
    fn test_query_malformed_temperature_is_bad_crc() {
        for tail in ["éé\n", "abc\n", "-\n", "\n"] {
            let raw = with_temperature(tail);
            let mut reader =
                SensorReader::new(ScriptedSource::new(&[raw.as_str()]), RetryPolicy::Disabled);
            let reading = reader.query();
            assert_eq!(reading.status, SensorStatus::BadCrc, "{tail:?}");
            assert_eq!(reading.value, None);
            assert_eq!(reading.status_line(), "Sensor: FalseCRC");
        }
    }

    #[test]
    fn test_decimal_string_non_ascii_does_not_panic() {
        assert_eq!(decimal_string("éé"), "0.0éé");
    }

    #[test]
    fn test_query_garbage_is_bad_crc() {
        let mut reader =
            SensorReader::new(ScriptedSource::new(&["garbage\n"]), RetryPolicy::Disabled);
        assert_eq!(reader.query().status, SensorStatus::BadCrc);
    }

    #[test]
    fn test_query_missing_sensor() {
        let mut reader = SensorReader::new(W1Slave::absent(), RetryPolicy::Disabled);
        let reading = reader.query();
        assert_eq!(reading.status, SensorStatus::NoSensor);
        assert_eq!(reading.status_line(), "Sensor: NoSensor");
        assert!(!reader.source().is_accessible());
        assert_eq!(reading.raw, None);
    }

    #[test]
    fn test_w1_slave_reads_file() {
        let dir = std::env::temp_dir().join(format!("lcdclock-w1-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("w1_slave");
        fs::write(&path, GOOD).unwrap();

        let mut source = W1Slave::new(&path);
        assert!(source.is_accessible());
        assert_eq!(source.read_raw().unwrap(), GOOD);

        fs::remove_dir_all(&dir).unwrap();
        assert!(!source.is_accessible());
        assert!(source.read_raw().is_err());
    }

    #[test]
    fn test_w1_slave_invalid_utf8_is_bad_crc() {
        let dir = std::env::temp_dir().join(format!("lcdclock-w1-utf8-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("w1_slave");
        let mut bytes = GOOD.as_bytes()[..TEMPERATURE_OFFSET].to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE, b'\n']);
        fs::write(&path, bytes).unwrap();

        let mut reader = SensorReader::new(W1Slave::new(&path), RetryPolicy::Disabled);
        let reading = reader.query();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(reading.status, SensorStatus::BadCrc);
        assert!(reading.raw.is_some());
    }

    #[test]
    fn test_hold_times() {
        assert_eq!(SensorStatus::NoSensor.hold_ms(), 1000);
        assert_eq!(SensorStatus::BadCrc.hold_ms(), 50);
        assert_eq!(SensorStatus::SuspectCrc.hold_ms(), 0);
        assert_eq!(SensorStatus::Ok.hold_ms(), 200);
    }

    #[test]
    fn test_status_line_is_padded() {
        let reading = SensorReading {
            status: SensorStatus::Ok,
            value: Some("1.5".to_string()),
            raw: None,
        };
        assert_eq!(reading.status_line(), "Sensor: 1.5 \u{1}C  ");
        assert_eq!(reading.status_line().len(), LINE_WIDTH);
    }
}
