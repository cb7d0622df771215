use log::{log, Level};
use std::fmt::Display;
use std::time::{Duration, Instant};

/// periodic logging
///
/// useful for long headless runs, to show the simulation is still ticking
/// without logging every single tick.
///
/// let mut periodic = PeriodicLogger::new("simulating", Level::Info);
/// for tick in 0..ticks {
///     simulation.tick()?;
///     periodic.log(format!("{} / {}", tick, ticks));
/// }
pub struct PeriodicLogger {
    last_logged: Instant,
    interval: Duration,
    level: Level,
}

impl PeriodicLogger {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    /// creates a new PeriodicLogger with [`DEFAULT_INTERVAL`](Self::DEFAULT_INTERVAL)
    pub fn new(start_message: &str, level: Level) -> Self {
        Self::new_with_interval(start_message, Self::DEFAULT_INTERVAL, level)
    }

    pub fn new_with_interval(start_message: &str, interval: Duration, level: Level) -> Self {
        log!(level, "{}", start_message);
        Self {
            last_logged: Instant::now(),
            interval,
            level,
        }
    }

    /// logs the message at self.level if self.interval has passed since the
    /// last message
    pub fn log<D: Display>(&mut self, message: D) {
        let now = Instant::now();
        if now - self.last_logged >= self.interval {
            self.last_logged = now;
            log!(self.level, "\t{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use log::{LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    /// Keeps the records emitted from this module
    struct Capture(Mutex<Vec<(Level, String)>>);

    impl Log for Capture {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if record.target() == module_path!() {
                if let Ok(mut records) = self.0.lock() {
                    records.push((record.level(), record.args().to_string()));
                }
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    #[test]
    fn every_message_uses_the_configured_level() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(LevelFilter::Trace);

        let mut eager =
            PeriodicLogger::new_with_interval("warming up", Duration::ZERO, Level::Debug);
        eager.log("1 / 2");

        let hour = Duration::from_secs(3600);
        let mut quiet = PeriodicLogger::new_with_interval("idle", hour, Level::Trace);
        quiet.log("not yet");

        let records = CAPTURE.0.lock().unwrap();
        assert_eq!(
            *records,
            vec![
                (Level::Debug, "warming up".to_string()),
                (Level::Debug, "\t1 / 2".to_string()),
                (Level::Trace, "idle".to_string()),
            ]
        );
    }
}
