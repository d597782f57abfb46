use embedded_hal::delay::DelayNs;
use std::thread::sleep;
use std::time::Duration;

/// Blocking delay backed by [std::thread::sleep].
///
/// The calling thread is parked for at least the requested duration; the OS might keep it asleep
/// longer, which is always fine for the displays driven by this crate.
#[derive(Debug, Default, Copy, Clone)]
pub struct StdDelay;

impl StdDelay {
    pub fn new() -> Self {
        StdDelay
    }
}

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        sleep(Duration::from_millis(ms as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleeps_at_least_requested_time() {
        let mut delay = StdDelay::new();

        let start = Instant::now();
        delay.delay_us(600);
        assert!(start.elapsed() >= Duration::from_micros(600));

        let start = Instant::now();
        delay.delay_ms(2);
        assert!(start.elapsed() >= Duration::from_millis(2));
    }
}
