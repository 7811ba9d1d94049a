//! Startup sequence and the per-second refresh loop
//!
//! The loop is tied to wall-clock seconds: every second the clock line is
//! redrawn, and on seconds divisible by [`LEAP_SECONDS`](crate::clock::LEAP_SECONDS)
//! the sensor is queried first. Waiting is done by polling the clock.

use core::convert::Infallible;

use chrono::{NaiveDateTime, SubsecRound, Timelike};
use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::clock::{WallClock, format_clock, is_leap_second};
use crate::display::Lcd;
use crate::error::Error;
use crate::glyph::{DEGREE, DEGREE_SLOT};
use crate::interface::Bus;
use crate::sensor::{RawSource, SensorReader, SensorReading};

type SchedulerResult<T, B> = core::result::Result<T, Error<B>>;

const BANNER: [&str; 2] = [" LCD Clock with ", "DS1820 Extension"];
const SENSOR_LABEL: &str = "Sensor: *DS1820*";
const READING_LABEL: &str = "Read temperature";

const GLYPH_SETTLE_MS: u32 = 5;
const BANNER_HOLD_MS: u32 = 5_000;
const LABEL_HOLD_MS: u32 = 1_000;
const SECOND_POLL_MS: u32 = 100;

/// Ties the display, sensor and clock together
pub struct Scheduler<B, S, C, D>
where
    B: Bus,
{
    lcd: Lcd<B>,
    sensor: SensorReader<S>,
    clock: C,
    delay: D,
}

impl<B, S, C, D> Scheduler<B, S, C, D>
where
    B: Bus,
    S: RawSource,
    C: WallClock,
    D: DelayNs,
{
    /// Create a scheduler; nothing is sent until [`Scheduler::startup`]
    pub fn new(lcd: Lcd<B>, sensor: SensorReader<S>, clock: C, delay: D) -> Self {
        Self {
            lcd,
            sensor,
            clock,
            delay,
        }
    }

    /// Run the startup sequence, then refresh forever
    ///
    /// # Errors
    ///
    /// Only returns when a bus write fails.
    pub fn run(&mut self) -> SchedulerResult<Infallible, B> {
        self.startup()?;
        loop {
            self.tick()?;
        }
    }

    /// One-shot startup: init, degree glyph, banner, clock, first reading
    pub fn startup(&mut self) -> SchedulerResult<SensorReading, B> {
        info!("scheduler: starting display");
        self.lcd.initialize(&mut self.delay)?;
        self.lcd
            .load_glyph(DEGREE_SLOT, &DEGREE, &mut self.delay)?;
        self.delay.delay_ms(GLYPH_SETTLE_MS);

        self.lcd.write_string(BANNER[0])?;
        self.lcd.goto_second_line()?;
        self.lcd.write_string(BANNER[1])?;
        self.lcd.home_and_clean()?;
        self.delay.delay_ms(BANNER_HOLD_MS);

        self.show_clock()?;
        self.lcd.goto_second_line()?;
        self.lcd.write_string(SENSOR_LABEL)?;
        self.lcd.home_and_clean()?;
        self.delay.delay_ms(LABEL_HOLD_MS);

        self.show_temperature()
    }

    /// One steady-state iteration
    ///
    /// Re-queries the sensor on leap seconds, then waits for the next
    /// wall-clock second and redraws the clock.
    pub fn tick(&mut self) -> SchedulerResult<(), B> {
        if is_leap_second(self.clock.now().second()) {
            self.show_temperature()?;
            self.show_clock()?;
        }
        self.wait_next_second();
        self.show_clock()
    }

    /// Draw the clock on the first line
    pub fn show_clock(&mut self) -> SchedulerResult<(), B> {
        let text = format_clock(&self.clock.now());
        self.lcd.write_string(&text)?;
        self.lcd.home_and_clean()
    }

    /// Query the sensor and draw the result on the second line
    ///
    /// The first line shows a progress label until the clock is redrawn.
    pub fn show_temperature(&mut self) -> SchedulerResult<SensorReading, B> {
        self.lcd.write_string(READING_LABEL)?;
        let reading = self.sensor.query();
        debug!("scheduler: sensor {:?}", reading.status);
        self.delay.delay_ms(reading.status.hold_ms());

        self.lcd.goto_second_line()?;
        self.lcd.write_string(&reading.status_line())?;
        self.lcd.home_and_clean()?;
        Ok(reading)
    }

    /// Access the sensor reader
    pub fn sensor(&self) -> &SensorReader<S> {
        &self.sensor
    }

    /// Block until the wall-clock second changes
    fn wait_next_second(&mut self) {
        let start = whole_second(self.clock.now());
        while whole_second(self.clock.now()) == start {
            self.delay.delay_ms(SECOND_POLL_MS);
        }
    }
}

fn whole_second(time: NaiveDateTime) -> NaiveDateTime {
    time.trunc_subsecs(0)
}
