mod app;
mod calendar;
mod chart;
mod config;
mod daylist;
mod debounce;
mod detail;
mod help;
mod store;
#[cfg(test)]
mod test_util;
mod theme;
use crate::app::App;
use crate::calendar::Gregorian;
use crate::config::Config;
use crate::debounce::DebouncedWriter;
use crate::store::{JsonStore, MeasurementStore};
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::{
    format_description::FormatItem, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};
use tracing_subscriber::EnvFilter;

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Environment variable holding the log filter directives
const LOG_ENV: &str = "THERMOLOG_LOG";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct RunOptions {
    date: Option<Date>,
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    in_memory: bool,
    clear: bool,
    sample: bool,
    log: Option<PathBuf>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = RunOptions::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    opts.config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('d') | Arg::Long("data") => {
                    opts.data = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("in-memory") => opts.in_memory = true,
                Arg::Long("clear") => opts.clear = true,
                Arg::Long("sample") => opts.sample = true,
                Arg::Long("log") => opts.log = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if opts.date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => opts.date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => run(opts),
            Command::Help => {
                println!("Usage: thermolog [OPTIONS] [YYYY-MM-DD]");
                println!();
                println!("Terminal body-temperature log with a month calendar");
                println!();
                println!("Options:");
                println!("  -c, --config FILE Read settings from the given TOML file");
                println!("  -d, --data FILE   Store measurements in the given JSON file");
                println!("      --in-memory   Keep measurements in memory only");
                println!("      --clear       Delete all stored measurements first");
                println!("      --sample      Add sample measurements for today");
                println!("      --log FILE    Write log messages to the given file");
                println!("                    (filter with ${LOG_ENV}; default: info)");
                println!("  -h, --help        Display this help message and exit");
                println!("  -V, --version     Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn run(opts: RunOptions) -> anyhow::Result<()> {
    if let Some(path) = &opts.log {
        init_logging(path)?;
    }
    let config = match &opts.config {
        Some(path) => Config::load(path).context("failed to load configuration")?,
        None => Config::default(),
    };
    let mut store = if opts.in_memory {
        JsonStore::in_memory()
    } else {
        let path = opts.data.as_deref().unwrap_or(config.data_file.as_path());
        JsonStore::open(path).context("failed to open measurement store")?
    };
    let now = OffsetDateTime::now_local().context("failed to determine local date")?;
    if opts.clear {
        store.delete_all();
    }
    if opts.sample {
        store.create_sample_data(PrimitiveDateTime::new(now.date(), now.time()));
    }
    if store.has_changes() {
        store.save_now().context("failed to save measurements")?;
    }
    tracing::info!(
        path = ?store.path(),
        count = store.count(),
        week_start = ?config.week_start,
        "starting"
    );
    let writer = DebouncedWriter::new(store, config.debounce());
    tracing::debug!(delay = ?writer.delay(), "saving edits after a quiet period");
    let mut app = App::new(
        writer,
        Gregorian::new(config.week_start),
        config.temperature,
        now.date(),
    );
    if let Some(date) = opts.date {
        app = app.start_date(date);
    }
    with_terminal(|mut terminal| {
        terminal.hide_cursor().context("failed to hide cursor")?;
        app.run(terminal)?;
        Ok(())
    })
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
