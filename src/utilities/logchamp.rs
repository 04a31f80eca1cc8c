//! joe: logchamp
//! joe: call it logchamp
//! joe: please

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use colored::{Color, Colorize};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::macros::format_description;

struct Logger {
    file: Option<Mutex<BufWriter<File>>>,
}

impl Logger {
    fn new(filename: Option<&Path>) -> io::Result<Self> {
        let file = match filename {
            Some(filename) => Some(Mutex::new(BufWriter::new(
                OpenOptions::new().append(true).create(true).open(filename)?,
            ))),
            None => None,
        };

        Ok(Self { file })
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let max_level = match metadata.target().split("::").next() {
            Some("storyteller") => Level::Debug,
            _ => Level::Info,
        };
        metadata.level() <= max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = time::OffsetDateTime::now_utc()
            .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
            .unwrap_or_default();
        let target = record.target();
        let level = record.level().as_str();
        let args = record.args();

        let color = match record.level() {
            Level::Error => Color::BrightRed,
            Level::Warn => Color::BrightYellow,
            Level::Info => Color::BrightCyan,
            Level::Debug => Color::BrightMagenta,
            Level::Trace => Color::BrightGreen,
        };

        println!("{} {} {args}", timestamp.color(Color::BrightBlack), level.color(color));

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{timestamp} [{target} {level}] {args}");
                let _ = file.flush();
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

#[derive(Debug)]
pub enum InitError {
    Io(io::Error),
    SetLogger(SetLoggerError),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot open log file: {err}"),
            Self::SetLogger(err) => write!(f, "cannot install logger: {err}"),
        }
    }
}

pub fn init(filename: Option<&Path>) -> Result<(), InitError> {
    let logger = Logger::new(filename).map_err(InitError::Io)?;
    log::set_boxed_logger(Box::new(logger)).map_err(InitError::SetLogger)?;
    log::set_max_level(LevelFilter::Debug);

    Ok(())
}
