mod config;

use crate::config::Config;
use dotenv::dotenv;
use log::{debug, info, warn};
use pilcd_i2c::delay::StdDelay;
use pilcd_i2c::lcd::hd44780::driver::{HD44780Driver, I2cHD44780Driver};
use pilcd_i2c::raw::RawI2cDriver;
use std::thread::sleep;
use std::time::Duration;
use sysinfo::System;
use time::OffsetDateTime;
use time::macros::format_description;

/// Pads or cuts the text so it fills exactly one line.
fn fit_line(text: &str, width: u8) -> String {
    let width = width as usize;
    format!("{:<width$.width$}", text)
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    let config = if let Some(config) = Config::try_load() {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    debug!("{:?}", config);

    info!("LCD @ BSC{}, address {:#04x}, {}x{}",
        config.bsc, config.address, config.width, config.lines);

    debug!("Initializing I2C driver...");
    let mut bus = RawI2cDriver::new_mem(config.bsc)?;
    bus.set_clock(config.clock_hz)?;
    debug!("{:?} initialized.", bus);

    debug!("Initializing LCD driver...");
    let mut delay = StdDelay::new();
    let mut lcd = I2cHD44780Driver::new(
        &mut bus,
        &mut delay,
        config.address,
        config.width,
        config.lines,
    )?;
    debug!("{:?} initialized.", lcd);

    let host_name = System::host_name();
    lcd.put_str(&fit_line(host_name.as_deref().unwrap_or(UNKNOWN_STR), config.width));
    info!("Hostname {}", host_name.as_deref().unwrap_or(UNKNOWN_STR));

    let clock_format = format_description!("[hour]:[minute]:[second]");
    let mut last_failed_writes = 0;

    loop {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let line = format!("{} up {}s", now.format(&clock_format)?, System::uptime());

        lcd.go_to(0, 1);
        lcd.put_str(&fit_line(&line, config.width));

        if lcd.failed_writes() != last_failed_writes {
            warn!("{} writes dropped, reinitializing", lcd.failed_writes() - last_failed_writes);
            last_failed_writes = lcd.failed_writes();
            lcd.init()?;
            lcd.put_str(&fit_line(host_name.as_deref().unwrap_or(UNKNOWN_STR), config.width));
        }

        sleep(Duration::from_secs(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_line_pads_and_cuts() {
        assert_eq!(fit_line("abc", 5), "abc  ");
        assert_eq!(fit_line("abcdefgh", 5), "abcde");
        assert_eq!(fit_line("", 2), "  ");
    }
}
