//! Console logging through `log4rs`

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

/// Route every `log` record at or above `level` to stdout.
///
/// Worker threads log under their own thread name, so the pattern includes it.
pub fn init_logging(level: LevelFilter) -> anyhow::Result<()> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S%.3f)} {h({l:<5})} [{T}] {t} - {m}{n}")))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        // bevy's render stack is noisy below warn
        .logger(Logger::builder().build("wgpu", LevelFilter::Warn))
        .logger(Logger::builder().build("naga", LevelFilter::Warn))
        .build(Root::builder().appender("stdout").build(level))?;

    log4rs::init_config(config)?;
    Ok(())
}
