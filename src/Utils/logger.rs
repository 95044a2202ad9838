use chrono::Local;
use log::{LevelFilter, warn};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io;

/// `log_<date>_<time>.txt` in the working directory
pub fn default_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Install the terminal logger and, if `log_file` is given, a file logger next to it.
/// Calling it again keeps the first logger.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> io::Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(name) = log_file {
        let file = File::create(name)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    if CombinedLogger::init(loggers).is_err() {
        warn!("logger is already initialized, keeping the existing one");
    }
    Ok(())
}
