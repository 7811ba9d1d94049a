//! LCD Clock daemon
//!
//! Opens the expander's I2C bus, checks the sensor and runs the refresh loop
//! until killed. Any startup failure or lost bus exits with status 1.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::convert::Infallible;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use linux_embedded_hal::{Delay, I2cdev};
use log::{error, info};

use lcdclock::cli::{Args, SensorUnavailable, open_sensor};
use lcdclock::{Config, I2cBus, Lcd, LocalClock, Scheduler, SensorReader};

/// Why the program stopped
enum Fatal {
    /// The bus device node could not be opened
    Device(String),
    /// The sensor is unreachable and `-n` was not given
    Sensor(SensorUnavailable),
    /// A write to the expander failed
    Write(lcdclock::Error<I2cBus<I2cdev>>),
}

impl core::fmt::Display for Fatal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Device(e) => write!(f, "Device Error: {e}"),
            Self::Sensor(e) => write!(f, "{e}"),
            Self::Write(e) => write!(f, "{e}"),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if args.is_empty() {
        let _ = Args::command().print_help();
        return ExitCode::SUCCESS;
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}\n");
            let _ = Args::command().print_help();
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(never) => match never {},
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<Infallible, Fatal> {
    let i2c = I2cdev::new(&config.device).map_err(|e| Fatal::Device(e.to_string()))?;
    let sensor = open_sensor(config).map_err(Fatal::Sensor)?;

    info!("LCD Clock started.");
    let lcd = Lcd::new(I2cBus::new(i2c, config.address), config.pin_map());
    let reader = SensorReader::new(sensor, config.retry);
    let mut scheduler = Scheduler::new(lcd, reader, LocalClock, Delay);
    scheduler.run().map_err(Fatal::Write)
}
